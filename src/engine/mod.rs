//! The execution engine.
//!
//! `Engine::step` drives a traverser with its own input; `Engine::trigger_state`
//! moves it from the outside. The engine keeps nothing between calls: the
//! compiled `StateMap`, the input transformer and the configuration are
//! immutable, and every piece of traverser state lives in the injected
//! `Store`.
//!
//! Callers must serialize calls per traverser UUID (see the
//! [`traverser`](crate::traverser) module). The debounce window only narrows
//! the trigger-versus-step race; it does not replace serialization.
//!
//! # Example
//!
//! ```rust
//! use traversal::core::{Intent, Next};
//! use traversal::engine::{Engine, EngineConfig};
//! use traversal::machine::{define_state, StateMachine};
//! use traversal::transform::TextInputTransformer;
//! use traversal::traverser::memory::{MemoryEmitter, MemoryStore};
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let go = Arc::new(Intent::with_patterns("go", ["^go$"]).unwrap());
//!
//! let states = StateMachine::new()
//!     .state(define_state("start", true, move |state, _| {
//!         state
//!             .intents([Arc::clone(&go)])
//!             .on_transition(|_, _| Next::goto("done"))
//!     }))
//!     .state(define_state("done", true, |state, _| state))
//!     .compile()
//!     .unwrap();
//!
//! let engine: Engine<str> = Engine::new(states, TextInputTransformer, EngineConfig::default());
//! let store = MemoryStore::new();
//! let emitter = Arc::new(MemoryEmitter::new());
//! let uuid = Uuid::new_v4();
//!
//! let report = engine.step(&store, emitter, "cli", uuid, "Go!").await.unwrap();
//! assert!(report.created);
//! assert_eq!(report.state(), "done");
//! # }
//! ```

mod config;
mod entry;
mod error;
mod step;
mod trigger;

pub use config::{EngineConfig, DEFAULT_DEBOUNCE_WINDOW_MS, DEFAULT_MAX_REDIRECTS};
pub use error::EngineError;

use crate::core::{DeferReason, TriggerPolicy};
use crate::machine::StateMap;
use crate::transform::InputTransformer;
use std::fmt;
use std::sync::Arc;

/// What a `step` call did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepReport {
    /// The traverser was created by this call.
    pub created: bool,

    /// Target of a queued trigger applied before classifying the input.
    pub dequeued: Option<String>,

    pub outcome: StepOutcome,
}

impl StepReport {
    /// Slug the traverser ended up in.
    pub fn state(&self) -> &str {
        match &self.outcome {
            StepOutcome::Reentered { state, .. } => state,
            StepOutcome::Transitioned { to, .. } => to,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// No transition happened; the active state was re-entered. `intent`
    /// is set when an intent matched but the transition chose to stay.
    Reentered {
        state: String,
        intent: Option<String>,
    },

    /// The traverser moved. `to` is the fixed point after entry redirects.
    Transitioned {
        from: String,
        to: String,
        intent: String,
    },
}

/// What a `trigger_state` call did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The move was applied. `to` is the fixed point after entry redirects.
    Applied { from: String, to: String },

    /// The request was queued for a later `step`.
    Queued { current: String, reason: DeferReason },
}

/// Drives traversers through one compiled state machine.
pub struct Engine<I: ?Sized> {
    states: Arc<StateMap>,
    transformer: Arc<dyn InputTransformer<I>>,
    config: EngineConfig,
}

impl<I: ?Sized> Engine<I> {
    pub fn new<T>(states: StateMap, transformer: T, config: EngineConfig) -> Self
    where
        T: InputTransformer<I> + 'static,
    {
        Self::from_shared(Arc::new(states), Arc::new(transformer), config)
    }

    /// Build an engine around a state map shared with other engines.
    pub fn from_shared(
        states: Arc<StateMap>,
        transformer: Arc<dyn InputTransformer<I>>,
        config: EngineConfig,
    ) -> Self {
        Self {
            states,
            transformer,
            config,
        }
    }

    pub fn states(&self) -> &StateMap {
        &self.states
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn policy(&self) -> TriggerPolicy {
        TriggerPolicy::new(self.config.debounce_window())
    }
}

impl<I: ?Sized> Clone for Engine<I> {
    fn clone(&self) -> Self {
        Self {
            states: Arc::clone(&self.states),
            transformer: Arc::clone(&self.transformer),
            config: self.config.clone(),
        }
    }
}

impl<I: ?Sized> fmt::Debug for Engine<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("states", &self.states)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
