//! Errors surfaced by `step` and `trigger_state`.

use crate::core::ActionError;
use crate::transform::TransformError;
use crate::traverser::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Failure of a single engine call.
///
/// The engine neither retries nor rolls back. After an error the traverser
/// record may be partially updated; re-fetch it before acting again.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Traverser {uuid} not found")]
    TraverserNotFound { uuid: Uuid },

    #[error("Traverser {uuid} references unknown state '{slug}'")]
    UnknownState { uuid: Uuid, slug: String },

    #[error("Store operation '{operation}' failed for traverser {uuid}: {source}")]
    Store {
        operation: &'static str,
        uuid: Uuid,
        #[source]
        source: StoreError,
    },

    #[error("Entry of state '{slug}' failed for traverser {uuid}: {source}")]
    Entry {
        slug: String,
        uuid: Uuid,
        #[source]
        source: ActionError,
    },

    #[error("Classifying input in state '{slug}' failed for traverser {uuid}: {source}")]
    Transform {
        slug: String,
        uuid: Uuid,
        #[source]
        source: TransformError,
    },

    #[error("Redirect limit ({limit}) exceeded for traverser {uuid}: {}", .chain.join(" -> "))]
    RedirectCycle {
        uuid: Uuid,
        chain: Vec<String>,
        limit: usize,
    },
}

impl EngineError {
    /// True when the traverser or a state could not be found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TraverserNotFound { .. }
                | Self::UnknownState { .. }
                | Self::Store {
                    source: StoreError::NotFound(_),
                    ..
                }
        )
    }

    pub fn uuid(&self) -> Uuid {
        match self {
            Self::TraverserNotFound { uuid }
            | Self::UnknownState { uuid, .. }
            | Self::Store { uuid, .. }
            | Self::Entry { uuid, .. }
            | Self::Transform { uuid, .. }
            | Self::RedirectCycle { uuid, .. } => *uuid,
        }
    }

    pub(crate) fn store(operation: &'static str, uuid: Uuid) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store {
            operation,
            uuid,
            source,
        }
    }

    pub(crate) fn unknown_state(uuid: Uuid, slug: &str) -> Self {
        Self::UnknownState {
            uuid,
            slug: slug.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_kinds_are_distinguished() {
        let uuid = Uuid::new_v4();

        assert!(EngineError::TraverserNotFound { uuid }.is_not_found());
        assert!(EngineError::unknown_state(uuid, "ghost").is_not_found());
        assert!(EngineError::store("fetch", uuid)(StoreError::NotFound("x".into())).is_not_found());
        assert!(!EngineError::store("fetch", uuid)(StoreError::Io("disk".into())).is_not_found());
        assert!(!EngineError::RedirectCycle {
            uuid,
            chain: vec![],
            limit: 1
        }
        .is_not_found());
    }

    #[test]
    fn messages_carry_context() {
        let uuid = Uuid::nil();
        let err = EngineError::store("set_current_state", uuid)(StoreError::Io("timeout".into()));
        assert_eq!(
            err.to_string(),
            "Store operation 'set_current_state' failed for traverser \
             00000000-0000-0000-0000-000000000000: IO error: timeout"
        );

        let err = EngineError::RedirectCycle {
            uuid,
            chain: vec!["a".into(), "b".into(), "a".into()],
            limit: 2,
        };
        assert!(err.to_string().ends_with("a -> b -> a"));
        assert_eq!(err.uuid(), uuid);

        let err = EngineError::Transform {
            slug: "ask_age".into(),
            uuid,
            source: TransformError::new("classifier offline"),
        };
        assert!(!err.is_not_found());
        assert!(err.to_string().starts_with("Classifying input in state 'ask_age'"));
        assert!(err.to_string().ends_with(": classifier offline"));
    }
}
