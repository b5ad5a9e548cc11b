//! Declaring state machines and compiling them into lookup tables.
//!
//! A `StateMachine` is an ordered list of state definitions. Compiling it
//! checks every startup invariant at once, using Stillwater's `Validation`
//! to report all violations instead of the first one:
//! - no empty slugs
//! - no duplicate slugs
//! - the reserved start slug is present
//!
//! # Example
//!
//! ```rust
//! use traversal::machine::{define_state, StateMachine};
//!
//! let states = StateMachine::new()
//!     .state(define_state("start", true, |state, _| state))
//!     .state(define_state("middle", false, |state, _| state))
//!     .compile()
//!     .unwrap();
//!
//! assert_eq!(states.len(), 2);
//! assert!(states.contains("middle"));
//! ```

mod definition;
mod error;
mod map;

pub use definition::{define_state, FnState, StateContext, StateDefinition};
pub use error::BuildError;
pub use map::StateMap;

use crate::core::StateMetadata;
use crate::traverser::START_STATE;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::debug;

/// Ordered declaration of a machine's states.
#[derive(Default)]
pub struct StateMachine {
    definitions: Vec<Arc<dyn StateDefinition>>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a state definition.
    pub fn state(mut self, definition: Arc<dyn StateDefinition>) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Add several state definitions at once.
    pub fn states<It>(mut self, definitions: It) -> Self
    where
        It: IntoIterator<Item = Arc<dyn StateDefinition>>,
    {
        self.definitions.extend(definitions);
        self
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Check every startup invariant, accumulating ALL violations.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<BuildError>> {
        let metadata: Vec<StateMetadata> = self.definitions.iter().map(|d| d.metadata()).collect();
        validate_metadata(&metadata)
    }

    /// Compile into a `StateMap`.
    ///
    /// Each definition's metadata is read exactly once. A single violation
    /// is returned as-is; several are wrapped in `BuildError::Invalid`.
    pub fn compile(self) -> Result<StateMap, BuildError> {
        let metadata: Vec<StateMetadata> = self.definitions.iter().map(|d| d.metadata()).collect();

        match validate_metadata(&metadata) {
            Validation::Success(_) => {
                debug!(states = metadata.len(), "compiled state machine");
                Ok(StateMap::from_validated(
                    metadata.into_iter().zip(self.definitions).collect(),
                ))
            }
            Validation::Failure(errors) => {
                let mut errors: Vec<BuildError> = errors.iter().cloned().collect();
                if errors.len() == 1 {
                    Err(errors.remove(0))
                } else {
                    Err(BuildError::Invalid(errors))
                }
            }
        }
    }
}

impl FromIterator<Arc<dyn StateDefinition>> for StateMachine {
    fn from_iter<T: IntoIterator<Item = Arc<dyn StateDefinition>>>(iter: T) -> Self {
        Self::new().states(iter)
    }
}

fn validate_metadata(metadata: &[StateMetadata]) -> Validation<(), NonEmptyVec<BuildError>> {
    let mut checks: Vec<Validation<(), NonEmptyVec<BuildError>>> = Vec::new();

    for (index, meta) in metadata.iter().enumerate() {
        if meta.slug().is_empty() {
            checks.push(Validation::fail(BuildError::EmptySlug { index }));
        }
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for meta in metadata {
        *counts.entry(meta.slug()).or_insert(0) += 1;
    }

    // Report each duplicate once, in declaration order.
    let mut reported = HashSet::new();
    for meta in metadata {
        let count = counts[meta.slug()];
        if count > 1 && !meta.slug().is_empty() && reported.insert(meta.slug()) {
            checks.push(Validation::fail(BuildError::DuplicateSlug {
                slug: meta.slug().to_string(),
                count,
            }));
        }
    }

    if !counts.contains_key(START_STATE) {
        checks.push(Validation::fail(BuildError::MissingStartState {
            start: START_STATE.to_string(),
        }));
    }

    Validation::all_vec(checks).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(slug: &str, exitable: bool) -> Arc<dyn StateDefinition> {
        define_state(slug, exitable, |state, _| state)
    }

    #[test]
    fn compile_indexes_every_state() {
        let states = StateMachine::new()
            .state(noop("start", true))
            .state(noop("middle", false))
            .state(noop("end", true))
            .compile()
            .unwrap();

        assert_eq!(states.len(), 3);
        assert_eq!(states.slugs().collect::<Vec<_>>(), vec!["start", "middle", "end"]);
        assert!(!states.metadata("middle").unwrap().is_exitable());
        assert!(states.metadata("missing").is_none());
    }

    #[test]
    fn duplicate_slug_is_rejected() {
        let result = StateMachine::new()
            .state(noop("start", true))
            .state(noop("middle", false))
            .state(noop("middle", true))
            .compile();

        assert_eq!(
            result.unwrap_err(),
            BuildError::DuplicateSlug {
                slug: "middle".to_string(),
                count: 2
            }
        );
    }

    #[test]
    fn missing_start_state_is_rejected() {
        let result = StateMachine::new().state(noop("middle", false)).compile();

        assert!(matches!(result, Err(BuildError::MissingStartState { .. })));
    }

    #[test]
    fn empty_machine_is_rejected() {
        let result = StateMachine::new().compile();
        assert!(matches!(result, Err(BuildError::MissingStartState { .. })));
    }

    #[test]
    fn validation_accumulates_all_violations() {
        let machine: StateMachine = vec![
            noop("", true),
            noop("a", true),
            noop("a", true),
            noop("b", false),
            noop("b", false),
            noop("b", false),
        ]
        .into_iter()
        .collect();

        match machine.validate() {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 4);
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, BuildError::EmptySlug { index: 0 })));
                assert!(errors.iter().any(|e| matches!(
                    e,
                    BuildError::DuplicateSlug { slug, count: 3 } if slug == "b"
                )));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, BuildError::MissingStartState { .. })));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }

        let err = machine.compile().unwrap_err();
        assert!(matches!(&err, BuildError::Invalid(errors) if errors.len() == 4));
        assert!(err.to_string().contains("Duplicate slug 'a'"));
    }

    #[test]
    fn valid_machine_passes_validation() {
        let machine = StateMachine::new()
            .state(noop("start", true))
            .state(noop("other", true));

        assert!(machine.validate().is_success());
        assert_eq!(machine.len(), 2);
    }
}
