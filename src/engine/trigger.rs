//! Moving a traverser from the outside.

use super::{Engine, EngineError, TriggerOutcome};
use crate::core::TriggerDecision;
use crate::machine::StateContext;
use crate::traverser::{Emitter, QueuedState, Store, TRANSITION_PAYLOAD_KEY};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

impl<I: ?Sized> Engine<I> {
    /// Push a known traverser into `target`, unless that is unsafe right now.
    ///
    /// The request is queued instead of applied when the current state is
    /// not exitable, or when the traverser's last state entry falls inside
    /// the debounce window. A queued request is honored by a later `step`
    /// once the traverser sits in an exitable state.
    ///
    /// When applied, the payload is stashed under
    /// [`TRANSITION_PAYLOAD_KEY`] before the target's entry behavior runs.
    #[instrument(
        name = "trigger_state",
        skip_all,
        fields(uuid = %uuid, platform = %platform, target = %target)
    )]
    pub async fn trigger_state(
        &self,
        store: &dyn Store,
        emitter: Arc<dyn Emitter>,
        platform: &str,
        uuid: Uuid,
        target: &str,
        payload: Value,
    ) -> Result<TriggerOutcome, EngineError> {
        let traverser = store
            .fetch_traverser(uuid)
            .await
            .map_err(EngineError::store("fetch_traverser", uuid))?
            .ok_or(EngineError::TraverserNotFound { uuid })?;

        if !self.states.contains(target) {
            return Err(EngineError::unknown_state(uuid, target));
        }

        let current = traverser
            .current_state()
            .await
            .map_err(EngineError::store("current_state", uuid))?;
        let metadata = self
            .states
            .metadata(&current)
            .ok_or_else(|| EngineError::unknown_state(uuid, &current))?;
        let last_update = traverser
            .last_update_time()
            .await
            .map_err(EngineError::store("last_update_time", uuid))?;

        let now = Utc::now();
        if let TriggerDecision::Defer(reason) = self.policy().decide(metadata, last_update, now) {
            traverser
                .enqueue_state(QueuedState::new(target, payload))
                .await
                .map_err(EngineError::store("enqueue_state", uuid))?;

            info!(current = %current, reason = ?reason, "trigger queued");
            return Ok(TriggerOutcome::Queued { current, reason });
        }

        traverser
            .set_current_state(target)
            .await
            .map_err(EngineError::store("set_current_state", uuid))?;
        traverser
            .set_last_update_time(now)
            .await
            .map_err(EngineError::store("set_last_update_time", uuid))?;
        traverser
            .upsert(TRANSITION_PAYLOAD_KEY, payload)
            .await
            .map_err(EngineError::store("upsert", uuid))?;

        info!(from = %current, "trigger applied");

        let ctx = StateContext::new(emitter, traverser);
        let state = self
            .states
            .build(target, &ctx)
            .ok_or_else(|| EngineError::unknown_state(uuid, target))?;
        let settled = self.resolve_entry(uuid, state, &ctx).await?;

        Ok(TriggerOutcome::Applied {
            from: current,
            to: settled,
        })
    }
}
