//! Traversal: an execution engine for conversational state machines
//!
//! Traversal drives many independent, persistent actors ("traversers", e.g.
//! one per chat user) through a declared finite-state machine. For every
//! incoming input it decides which state the traverser is in, whether an
//! entry action or a transition fires, and how out-of-band triggers are
//! reconciled with an interaction already in progress.
//!
//! # Core Concepts
//!
//! - **State**: slug, exitability, an async entry behavior and a transition
//!   function, built per call by a `StateDefinition`
//! - **StateMachine / StateMap**: declared definitions compiled into a
//!   slug-keyed table, rejecting duplicate slugs at startup
//! - **Engine**: `step` for direct input, `trigger_state` for out-of-band
//!   moves guarded by exitability and a debounce window
//! - **Collaborators**: `Store`, `Traverser`, `Emitter` and
//!   `InputTransformer` are injected; the engine keeps no state between calls
//!
//! # Example
//!
//! ```rust
//! use traversal::core::{Intent, Next};
//! use traversal::machine::{define_state, StateMachine};
//! use std::sync::Arc;
//!
//! let a = Arc::new(Intent::with_patterns("a", ["^a$"]).unwrap());
//! let b = Arc::new(Intent::with_patterns("b", ["^b$"]).unwrap());
//!
//! let states = StateMachine::new()
//!     .state(define_state("start", true, move |state, _| {
//!         state
//!             .intents([Arc::clone(&a)])
//!             .on_transition(|_, _| Next::goto("middle"))
//!     }))
//!     .state(define_state("middle", false, move |state, _| {
//!         state
//!             .intents([Arc::clone(&b)])
//!             .on_transition(|_, _| Next::goto("start"))
//!     }))
//!     .compile()
//!     .unwrap();
//!
//! assert!(states.metadata("start").unwrap().is_exitable());
//! assert!(!states.metadata("middle").unwrap().is_exitable());
//! ```

pub mod core;
pub mod engine;
pub mod machine;
pub mod transform;
pub mod traverser;

// Re-export commonly used types
pub use crate::core::{Intent, Next, Params, State, StateMetadata};
pub use engine::{Engine, EngineConfig, EngineError, StepOutcome, StepReport, TriggerOutcome};
pub use machine::{define_state, StateContext, StateDefinition, StateMachine, StateMap};
pub use transform::{InputTransformer, IntentMatch, TextInputTransformer, TransformError};
pub use traverser::{Emitter, QueuedState, Store, Traverser, START_STATE, TRANSITION_PAYLOAD_KEY};
