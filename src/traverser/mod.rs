//! Collaborator interfaces: persistence and output.
//!
//! The engine owns no traverser state. Everything it reads or writes goes
//! through a `Store` and the `Traverser` handles it hands out, and every
//! actor-visible side effect goes through an `Emitter`.
//!
//! # Serialization precondition
//!
//! The engine performs no locking. Callers must serialize `step` and
//! `trigger_state` calls per traverser UUID, or the store must enforce
//! per-record serialization. Two interleaved calls for the same traverser can
//! otherwise corrupt its current state.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Slug every new traverser starts in.
pub const START_STATE: &str = "start";

/// Data key holding the payload of the most recent triggered transition.
pub const TRANSITION_PAYLOAD_KEY: &str = "_transition_payload";

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure reported by an emitter.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct EmitError(pub String);

impl EmitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A trigger waiting for the traverser to become interruptible.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueuedState {
    pub target: String,
    pub payload: Value,
}

impl QueuedState {
    pub fn new(target: impl Into<String>, payload: Value) -> Self {
        Self {
            target: target.into(),
            payload,
        }
    }
}

/// Handle to one persistent traverser record.
///
/// Every method may fail with an I/O error. "Absent" is reported through
/// `Option`, never through `StoreError`.
#[async_trait]
pub trait Traverser: Send + Sync {
    async fn uuid(&self) -> Result<Uuid, StoreError>;
    async fn set_uuid(&self, uuid: Uuid) -> Result<(), StoreError>;

    async fn platform(&self) -> Result<String, StoreError>;
    async fn set_platform(&self, platform: &str) -> Result<(), StoreError>;

    async fn current_state(&self) -> Result<String, StoreError>;
    async fn set_current_state(&self, slug: &str) -> Result<(), StoreError>;

    async fn last_update_time(&self) -> Result<DateTime<Utc>, StoreError>;
    async fn set_last_update_time(&self, at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Append a deferred request to the back of the queue.
    async fn enqueue_state(&self, request: QueuedState) -> Result<(), StoreError>;

    /// Remove and return the oldest deferred request.
    async fn dequeue_state(&self) -> Result<Option<QueuedState>, StoreError>;

    async fn upsert(&self, key: &str, value: Value) -> Result<(), StoreError>;
    async fn fetch(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Fetches and creates traversers.
#[async_trait]
pub trait Store: Send + Sync {
    async fn fetch_traverser(&self, uuid: Uuid) -> Result<Option<Arc<dyn Traverser>>, StoreError>;
    async fn create_traverser(&self, uuid: Uuid) -> Result<Arc<dyn Traverser>, StoreError>;
}

/// Performs an actor-visible side effect: a message send, a log line, etc.
#[async_trait]
pub trait Emitter: Send + Sync {
    async fn emit(&self, payload: Value) -> Result<(), EmitError>;
}
