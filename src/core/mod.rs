//! Core value types.
//!
//! This module holds the pieces of a state machine that carry no I/O of
//! their own:
//! - `State` and its `StateMetadata`
//! - `Intent` and extracted `Params`
//! - `Next`, the outcome of a transition function
//! - `TriggerPolicy`, the pure exitability and debounce decision

mod intent;
mod policy;
mod state;
mod transition;

pub use intent::{Intent, Params};
pub use policy::{DeferReason, TriggerDecision, TriggerPolicy};
pub use state::{ActionError, EntryFuture, State, StateMetadata};
pub use transition::Next;
