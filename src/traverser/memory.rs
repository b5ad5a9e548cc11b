//! In-memory collaborators for development and testing.
//!
//! `MemoryStore` keeps every traverser record in process memory and can be
//! snapshotted to JSON, which makes fixtures and post-mortem inspection easy.
//! `MemoryEmitter` records every emitted payload.

use super::{EmitError, Emitter, QueuedState, Store, StoreError, Traverser};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use uuid::Uuid;

/// Version identifier for snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Durable contents of one traverser.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraverserRecord {
    pub uuid: Uuid,
    pub platform: String,
    pub current_state: String,
    pub last_update: DateTime<Utc>,
    pub queue: VecDeque<QueuedState>,
    pub data: HashMap<String, Value>,
}

impl TraverserRecord {
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            platform: String::new(),
            current_state: String::new(),
            last_update: Utc::now(),
            queue: VecDeque::new(),
            data: HashMap::new(),
        }
    }
}

/// Serializable copy of a whole `MemoryStore`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemorySnapshot {
    /// Snapshot format version
    pub version: u32,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    pub records: Vec<TraverserRecord>,
}

/// A traverser whose record lives behind a mutex.
#[derive(Debug)]
pub struct MemoryTraverser {
    record: Mutex<TraverserRecord>,
}

impl MemoryTraverser {
    pub fn new(record: TraverserRecord) -> Self {
        Self {
            record: Mutex::new(record),
        }
    }

    /// Copy of the current record.
    pub fn record(&self) -> Result<TraverserRecord, StoreError> {
        self.with_record(|record| record.clone())
    }

    fn with_record<T>(&self, f: impl FnOnce(&mut TraverserRecord) -> T) -> Result<T, StoreError> {
        let mut record = self
            .record
            .lock()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(f(&mut record))
    }
}

#[async_trait]
impl Traverser for MemoryTraverser {
    async fn uuid(&self) -> Result<Uuid, StoreError> {
        self.with_record(|r| r.uuid)
    }

    async fn set_uuid(&self, uuid: Uuid) -> Result<(), StoreError> {
        self.with_record(|r| r.uuid = uuid)
    }

    async fn platform(&self) -> Result<String, StoreError> {
        self.with_record(|r| r.platform.clone())
    }

    async fn set_platform(&self, platform: &str) -> Result<(), StoreError> {
        self.with_record(|r| r.platform = platform.to_string())
    }

    async fn current_state(&self) -> Result<String, StoreError> {
        self.with_record(|r| r.current_state.clone())
    }

    async fn set_current_state(&self, slug: &str) -> Result<(), StoreError> {
        self.with_record(|r| r.current_state = slug.to_string())
    }

    async fn last_update_time(&self) -> Result<DateTime<Utc>, StoreError> {
        self.with_record(|r| r.last_update)
    }

    async fn set_last_update_time(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.with_record(|r| r.last_update = at)
    }

    async fn enqueue_state(&self, request: QueuedState) -> Result<(), StoreError> {
        self.with_record(|r| r.queue.push_back(request))
    }

    async fn dequeue_state(&self) -> Result<Option<QueuedState>, StoreError> {
        self.with_record(|r| r.queue.pop_front())
    }

    async fn upsert(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.with_record(|r| {
            r.data.insert(key.to_string(), value);
        })
    }

    async fn fetch(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.with_record(|r| r.data.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.with_record(|r| {
            r.data.remove(key);
        })
    }
}

/// In-memory implementation for development and testing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    traversers: RwLock<HashMap<Uuid, Arc<MemoryTraverser>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concrete handle for inspection in tests.
    pub fn traverser(&self, uuid: Uuid) -> Result<Option<Arc<MemoryTraverser>>, StoreError> {
        let traversers = self
            .traversers
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(traversers.get(&uuid).cloned())
    }

    /// Insert or replace a record directly.
    pub fn insert(&self, record: TraverserRecord) -> Result<Arc<MemoryTraverser>, StoreError> {
        let mut traversers = self
            .traversers
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let uuid = record.uuid;
        let traverser = Arc::new(MemoryTraverser::new(record));
        traversers.insert(uuid, Arc::clone(&traverser));
        Ok(traverser)
    }

    /// Number of stored traversers. Reads through a poisoned lock, since a
    /// panic elsewhere leaves the map itself intact.
    pub fn len(&self) -> usize {
        self.traversers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy every record, ordered by UUID.
    pub fn snapshot(&self) -> Result<MemorySnapshot, StoreError> {
        let traversers = self
            .traversers
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let mut records = traversers
            .values()
            .map(|t| t.record())
            .collect::<Result<Vec<_>, _>>()?;
        records.sort_by_key(|r| r.uuid);

        Ok(MemorySnapshot {
            version: SNAPSHOT_VERSION,
            taken_at: Utc::now(),
            records,
        })
    }

    /// Rebuild a store from a snapshot.
    pub fn restore(snapshot: MemorySnapshot) -> Result<Self, StoreError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::Serialization(format!(
                "unsupported snapshot version {}, supported: {}",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        let store = Self::new();
        for record in snapshot.records {
            store.insert(record)?;
        }
        Ok(store)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string(&self.snapshot()?)
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let snapshot: MemorySnapshot =
            serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Self::restore(snapshot)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn fetch_traverser(&self, uuid: Uuid) -> Result<Option<Arc<dyn Traverser>>, StoreError> {
        Ok(self.traverser(uuid)?.map(|t| t as Arc<dyn Traverser>))
    }

    async fn create_traverser(&self, uuid: Uuid) -> Result<Arc<dyn Traverser>, StoreError> {
        let traverser: Arc<dyn Traverser> = self.insert(TraverserRecord::new(uuid))?;
        Ok(traverser)
    }
}

/// Emitter that records payloads, optionally failing every emit.
#[derive(Debug, Default)]
pub struct MemoryEmitter {
    emitted: Mutex<Vec<Value>>,
    failure: Option<String>,
}

impl MemoryEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// An emitter whose every emit fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            emitted: Mutex::new(Vec::new()),
            failure: Some(message.into()),
        }
    }

    /// Payloads emitted so far, oldest first.
    ///
    /// Inspection helpers read through a poisoned lock; `emit` reports it.
    pub fn emitted(&self) -> Vec<Value> {
        self.emitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.emitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[async_trait]
impl Emitter for MemoryEmitter {
    async fn emit(&self, payload: Value) -> Result<(), EmitError> {
        if let Some(message) = &self.failure {
            return Err(EmitError::new(message.clone()));
        }
        self.emitted
            .lock()
            .map_err(|e| EmitError::new(e.to_string()))?
            .push(payload);
        Ok(())
    }
}
