//! Entry resolution: run entry behaviors until the traverser stops moving.

use super::{Engine, EngineError};
use crate::core::State;
use crate::machine::StateContext;
use tracing::{debug, warn};
use uuid::Uuid;

impl<I: ?Sized> Engine<I> {
    /// Enter `state` and follow any redirects its entry behavior performs.
    ///
    /// Entering a state may change the traverser's current state. Each time
    /// that happens the newly named state is entered in turn, up to
    /// `max_redirects` times. Returns the slug of the fixed point.
    pub(crate) async fn resolve_entry(
        &self,
        uuid: Uuid,
        state: State,
        ctx: &StateContext,
    ) -> Result<String, EngineError> {
        let mut state = state;
        let mut slug = state.slug().to_string();
        let mut chain = vec![slug.clone()];

        loop {
            state
                .enter(false)
                .await
                .map_err(|source| EngineError::Entry {
                    slug: slug.clone(),
                    uuid,
                    source,
                })?;

            let current = ctx
                .traverser()
                .current_state()
                .await
                .map_err(EngineError::store("current_state", uuid))?;

            if current == slug {
                return Ok(current);
            }

            chain.push(current.clone());
            if chain.len() - 1 > self.config.max_redirects {
                warn!(
                    %uuid,
                    limit = self.config.max_redirects,
                    chain = %chain.join(" -> "),
                    "entry redirect limit exceeded"
                );
                return Err(EngineError::RedirectCycle {
                    uuid,
                    chain,
                    limit: self.config.max_redirects,
                });
            }

            debug!(%uuid, from = %slug, to = %current, "entry redirected");
            state = self
                .states
                .build(&current, ctx)
                .ok_or_else(|| EngineError::unknown_state(uuid, &current))?;
            slug = current;
        }
    }
}
