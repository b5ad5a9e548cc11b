//! State values handed to the engine.
//!
//! A `State` is data (slug, exitability) plus two behaviors: an async entry
//! action and a synchronous transition function. States are built fresh for
//! every call by a `StateDefinition`, so the behaviors may capture the live
//! emitter and traverser of that call.

use super::intent::{Intent, Params};
use super::transition::Next;
use crate::traverser::{EmitError, StoreError};
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a state's entry behavior.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("emit failed: {0}")]
    Emit(#[from] EmitError),

    #[error("traverser access failed: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Failed(String),
}

impl ActionError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Identity and exitability of a state.
///
/// This is everything the engine needs to know about a state without
/// wiring in live collaborators.
///
/// # Example
///
/// ```rust
/// use traversal::core::StateMetadata;
///
/// let meta = StateMetadata::new("checkout", false);
/// assert_eq!(meta.slug(), "checkout");
/// assert!(!meta.is_exitable());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateMetadata {
    slug: String,
    exitable: bool,
}

impl StateMetadata {
    pub fn new(slug: impl Into<String>, exitable: bool) -> Self {
        Self {
            slug: slug.into(),
            exitable,
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Whether an out-of-band trigger may interrupt this state.
    pub fn is_exitable(&self) -> bool {
        self.exitable
    }
}

/// Future returned by an entry behavior.
pub type EntryFuture = BoxFuture<'static, Result<(), ActionError>>;

type EntryAction = Box<dyn Fn(bool) -> EntryFuture + Send + Sync>;
type TransitionFn = Box<dyn Fn(&Intent, &Params) -> Next + Send + Sync>;

/// A fully wired state for a single engine call.
///
/// Built fluently from its metadata. A state without an entry behavior
/// enters as a no-op, and a state without a transition function always stays.
pub struct State {
    metadata: StateMetadata,
    entry: Option<EntryAction>,
    intents: Vec<Arc<Intent>>,
    transition: Option<TransitionFn>,
}

impl State {
    pub fn new(metadata: StateMetadata) -> Self {
        Self {
            metadata,
            entry: None,
            intents: Vec::new(),
            transition: None,
        }
    }

    /// Set the entry behavior. The flag passed in is `true` on re-entry.
    pub fn on_entry<F, Fut>(mut self, action: F) -> Self
    where
        F: Fn(bool) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        self.entry = Some(Box::new(move |reentry| action(reentry).boxed()));
        self
    }

    /// Add intents this state currently accepts.
    pub fn intents<It>(mut self, intents: It) -> Self
    where
        It: IntoIterator<Item = Arc<Intent>>,
    {
        self.intents.extend(intents);
        self
    }

    /// Set the transition function.
    pub fn on_transition<F>(mut self, transition: F) -> Self
    where
        F: Fn(&Intent, &Params) -> Next + Send + Sync + 'static,
    {
        self.transition = Some(Box::new(transition));
        self
    }

    pub fn metadata(&self) -> &StateMetadata {
        &self.metadata
    }

    pub fn slug(&self) -> &str {
        self.metadata.slug()
    }

    pub fn is_exitable(&self) -> bool {
        self.metadata.is_exitable()
    }

    pub fn valid_intents(&self) -> &[Arc<Intent>] {
        &self.intents
    }

    /// Run the entry behavior.
    pub async fn enter(&self, reentry: bool) -> Result<(), ActionError> {
        match &self.entry {
            Some(action) => action(reentry).await,
            None => Ok(()),
        }
    }

    /// Evaluate the transition function for a classified intent.
    pub fn transition(&self, intent: &Intent, params: &Params) -> Next {
        match &self.transition {
            Some(transition) => transition(intent, params),
            None => Next::Stay,
        }
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("metadata", &self.metadata)
            .field("intents", &self.intents)
            .field("has_entry", &self.entry.is_some())
            .field("has_transition", &self.transition.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn metadata_exposes_slug_and_exitability() {
        let meta = StateMetadata::new("start", true);
        assert_eq!(meta.slug(), "start");
        assert!(meta.is_exitable());
    }

    #[test]
    fn metadata_serializes_correctly() {
        let meta = StateMetadata::new("middle", false);
        let json = serde_json::to_string(&meta).unwrap();
        let deserialized: StateMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(meta, deserialized);
    }

    #[tokio::test]
    async fn state_without_entry_is_a_no_op() {
        let state = State::new(StateMetadata::new("idle", true));
        assert!(state.enter(false).await.is_ok());
        assert!(state.enter(true).await.is_ok());
    }

    #[tokio::test]
    async fn entry_receives_reentry_flag() {
        let reentries = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reentries);
        let state = State::new(StateMetadata::new("ask", false)).on_entry(move |reentry| {
            let counter = Arc::clone(&counter);
            async move {
                if reentry {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
                Ok(())
            }
        });

        state.enter(false).await.unwrap();
        state.enter(true).await.unwrap();
        state.enter(true).await.unwrap();

        assert_eq!(reentries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn entry_errors_propagate() {
        let state = State::new(StateMetadata::new("broken", true))
            .on_entry(|_| async { Err(ActionError::failed("boom")) });

        let err = state.enter(false).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn state_without_transition_stays() {
        let state = State::new(StateMetadata::new("idle", true));
        let intent = Intent::new("anything");
        assert_eq!(state.transition(&intent, &Params::new()), Next::Stay);
    }

    #[test]
    fn transition_sees_intent_and_params() {
        let state = State::new(StateMetadata::new("ask_age", false)).on_transition(
            |intent, params| match (intent.slug(), params.get("age")) {
                ("age", Some(_)) => Next::goto("done"),
                _ => Next::Stay,
            },
        );

        let intent = Intent::new("age");
        let mut params = Params::new();
        assert_eq!(state.transition(&intent, &params), Next::Stay);

        params.insert("age".to_string(), "29".to_string());
        assert_eq!(state.transition(&intent, &params), Next::goto("done"));
    }

    #[test]
    fn intents_accumulate() {
        let state = State::new(StateMetadata::new("menu", true))
            .intents([Arc::new(Intent::new("a"))])
            .intents([Arc::new(Intent::new("b"))]);

        let slugs: Vec<_> = state.valid_intents().iter().map(|i| i.slug()).collect();
        assert_eq!(slugs, vec!["a", "b"]);
    }
}
