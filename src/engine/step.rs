//! Driving a traverser with its own input.

use super::{Engine, EngineError, StepOutcome, StepReport};
use crate::core::{Intent, Next, State};
use crate::machine::StateContext;
use crate::transform::IntentMatch;
use crate::traverser::{Emitter, Store, Traverser, START_STATE, TRANSITION_PAYLOAD_KEY};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

impl<I: ?Sized + Sync> Engine<I> {
    /// Perform a single step for one traverser.
    ///
    /// 1. Fetch the traverser, creating it in the start state if absent.
    /// 2. For an existing traverser sitting in an exitable state, apply the
    ///    oldest queued trigger, if any.
    /// 3. A new traverser has its start state entered (following redirects).
    /// 4. Classify `input` against the active state's valid intents.
    /// 5. With no intent, or a transition that stays, re-enter the active
    ///    state. Otherwise persist the new state, stamp the update time and
    ///    enter it.
    ///
    /// Any collaborator failure, the transformer's included, aborts the step
    /// and is returned unchanged in meaning, wrapped with the operation that
    /// failed.
    #[instrument(name = "step", skip_all, fields(uuid = %uuid, platform = %platform))]
    pub async fn step(
        &self,
        store: &dyn Store,
        emitter: Arc<dyn Emitter>,
        platform: &str,
        uuid: Uuid,
        input: &I,
    ) -> Result<StepReport, EngineError> {
        let (traverser, created) = self.resolve_traverser(store, platform, uuid).await?;
        let ctx = StateContext::new(emitter, Arc::clone(&traverser));

        let mut current = traverser
            .current_state()
            .await
            .map_err(EngineError::store("current_state", uuid))?;

        let mut dequeued = None;
        if !created {
            let exitable = self
                .states
                .metadata(&current)
                .ok_or_else(|| EngineError::unknown_state(uuid, &current))?
                .is_exitable();

            if exitable {
                if let Some(request) = traverser
                    .dequeue_state()
                    .await
                    .map_err(EngineError::store("dequeue_state", uuid))?
                {
                    info!(from = %current, to = %request.target, "applying queued trigger");
                    traverser
                        .set_current_state(&request.target)
                        .await
                        .map_err(EngineError::store("set_current_state", uuid))?;
                    traverser
                        .upsert(TRANSITION_PAYLOAD_KEY, request.payload)
                        .await
                        .map_err(EngineError::store("upsert", uuid))?;
                    current = request.target.clone();
                    dequeued = Some(request.target);
                }
            }
        }

        let mut state = self
            .states
            .build(&current, &ctx)
            .ok_or_else(|| EngineError::unknown_state(uuid, &current))?;

        if created {
            let settled = self.resolve_entry(uuid, state, &ctx).await?;
            state = self
                .states
                .build(&settled, &ctx)
                .ok_or_else(|| EngineError::unknown_state(uuid, &settled))?;
        }

        let classified = self
            .transformer
            .transform(input, state.valid_intents())
            .map_err(|source| EngineError::Transform {
                slug: state.slug().to_string(),
                uuid,
                source,
            })?;

        let outcome = match classified {
            None => Self::reenter(uuid, &state, None).await?,
            Some(IntentMatch { intent, params }) => match state.transition(&intent, &params) {
                Next::Stay => Self::reenter(uuid, &state, Some(intent.as_ref())).await?,
                Next::Goto(target) => {
                    let next = self
                        .states
                        .build(&target, &ctx)
                        .ok_or_else(|| EngineError::unknown_state(uuid, &target))?;

                    traverser
                        .set_current_state(&target)
                        .await
                        .map_err(EngineError::store("set_current_state", uuid))?;
                    traverser
                        .set_last_update_time(Utc::now())
                        .await
                        .map_err(EngineError::store("set_last_update_time", uuid))?;

                    info!(
                        from = %state.slug(),
                        to = %target,
                        intent = %intent.slug(),
                        "transition"
                    );
                    let settled = self.resolve_entry(uuid, next, &ctx).await?;

                    StepOutcome::Transitioned {
                        from: state.slug().to_string(),
                        to: settled,
                        intent: intent.slug().to_string(),
                    }
                }
            },
        };

        Ok(StepReport {
            created,
            dequeued,
            outcome,
        })
    }

    async fn resolve_traverser(
        &self,
        store: &dyn Store,
        platform: &str,
        uuid: Uuid,
    ) -> Result<(Arc<dyn Traverser>, bool), EngineError> {
        if let Some(traverser) = store
            .fetch_traverser(uuid)
            .await
            .map_err(EngineError::store("fetch_traverser", uuid))?
        {
            return Ok((traverser, false));
        }

        let traverser = store
            .create_traverser(uuid)
            .await
            .map_err(EngineError::store("create_traverser", uuid))?;
        traverser
            .set_current_state(START_STATE)
            .await
            .map_err(EngineError::store("set_current_state", uuid))?;
        traverser
            .set_last_update_time(Utc::now())
            .await
            .map_err(EngineError::store("set_last_update_time", uuid))?;
        traverser
            .set_platform(platform)
            .await
            .map_err(EngineError::store("set_platform", uuid))?;

        info!("created traverser");
        Ok((traverser, true))
    }

    async fn reenter(
        uuid: Uuid,
        state: &State,
        intent: Option<&Intent>,
    ) -> Result<StepOutcome, EngineError> {
        state
            .enter(true)
            .await
            .map_err(|source| EngineError::Entry {
                slug: state.slug().to_string(),
                uuid,
                source,
            })?;

        debug!(state = %state.slug(), intent = ?intent.map(Intent::slug), "re-entered");
        Ok(StepOutcome::Reentered {
            state: state.slug().to_string(),
            intent: intent.map(|i| i.slug().to_string()),
        })
    }
}
