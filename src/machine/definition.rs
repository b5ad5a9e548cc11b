//! State definitions: metadata without collaborators, behavior with them.

use crate::core::{ActionError, State, StateMetadata};
use crate::traverser::{Emitter, Traverser, TRANSITION_PAYLOAD_KEY};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Live collaborators of one engine call, handed to state factories.
///
/// Cloning is cheap; behaviors usually clone the context into their
/// closures.
#[derive(Clone)]
pub struct StateContext {
    emitter: Arc<dyn Emitter>,
    traverser: Arc<dyn Traverser>,
}

impl StateContext {
    pub fn new(emitter: Arc<dyn Emitter>, traverser: Arc<dyn Traverser>) -> Self {
        Self { emitter, traverser }
    }

    pub fn emitter(&self) -> &Arc<dyn Emitter> {
        &self.emitter
    }

    pub fn traverser(&self) -> &Arc<dyn Traverser> {
        &self.traverser
    }

    pub async fn emit(&self, payload: Value) -> Result<(), ActionError> {
        self.emitter.emit(payload).await?;
        Ok(())
    }

    /// Point the traverser at another state from inside an entry behavior.
    ///
    /// The engine notices the change once the entry behavior returns and
    /// enters the named state next.
    pub async fn redirect(&self, slug: &str) -> Result<(), ActionError> {
        self.traverser.set_current_state(slug).await?;
        Ok(())
    }

    /// Payload stashed by the most recent triggered transition.
    pub async fn transition_payload(&self) -> Result<Option<Value>, ActionError> {
        Ok(self.traverser.fetch(TRANSITION_PAYLOAD_KEY).await?)
    }

    pub async fn data(&self, key: &str) -> Result<Option<Value>, ActionError> {
        Ok(self.traverser.fetch(key).await?)
    }
}

impl fmt::Debug for StateContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateContext").finish_non_exhaustive()
    }
}

/// A declared state.
///
/// `metadata` must not touch collaborators; it is read once when a
/// `StateMachine` is compiled. `build` wires a fresh `State` for a single
/// engine call.
pub trait StateDefinition: Send + Sync {
    fn metadata(&self) -> StateMetadata;

    fn build(&self, ctx: &StateContext) -> State;
}

type BuildFn = Box<dyn Fn(State, &StateContext) -> State + Send + Sync>;

/// Closure-backed definition created by [`define_state`].
pub struct FnState {
    metadata: StateMetadata,
    build: BuildFn,
}

impl StateDefinition for FnState {
    fn metadata(&self) -> StateMetadata {
        self.metadata.clone()
    }

    fn build(&self, ctx: &StateContext) -> State {
        (self.build)(State::new(self.metadata.clone()), ctx)
    }
}

impl fmt::Debug for FnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnState")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Define a state from its slug, exitability and a builder closure.
///
/// The closure receives a `State` already carrying the metadata and adds
/// behaviors to it.
///
/// # Example
///
/// ```rust
/// use traversal::core::{Intent, Next};
/// use traversal::machine::define_state;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let yes = Arc::new(Intent::with_patterns("yes", ["^(yes|yep|sure)$"]).unwrap());
///
/// let confirm = define_state("confirm", false, move |state, ctx| {
///     let ctx = ctx.clone();
///     state
///         .on_entry(move |reentry| {
///             let ctx = ctx.clone();
///             async move {
///                 let text = if reentry { "Please answer yes." } else { "Confirm?" };
///                 ctx.emit(json!(text)).await
///             }
///         })
///         .intents([Arc::clone(&yes)])
///         .on_transition(|intent, _| match intent.slug() {
///             "yes" => Next::goto("done"),
///             _ => Next::Stay,
///         })
/// });
///
/// assert_eq!(confirm.metadata().slug(), "confirm");
/// ```
pub fn define_state<F>(slug: impl Into<String>, exitable: bool, build: F) -> Arc<dyn StateDefinition>
where
    F: Fn(State, &StateContext) -> State + Send + Sync + 'static,
{
    Arc::new(FnState {
        metadata: StateMetadata::new(slug, exitable),
        build: Box::new(build),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traverser::memory::{MemoryEmitter, MemoryTraverser, TraverserRecord};
    use serde_json::json;
    use uuid::Uuid;

    fn context() -> (StateContext, Arc<MemoryEmitter>, Arc<MemoryTraverser>) {
        let emitter = Arc::new(MemoryEmitter::new());
        let traverser = Arc::new(MemoryTraverser::new(TraverserRecord::new(Uuid::new_v4())));
        let ctx = StateContext::new(emitter.clone(), traverser.clone());
        (ctx, emitter, traverser)
    }

    #[test]
    fn metadata_is_available_without_collaborators() {
        let def = define_state("start", true, |state, _| state);
        assert_eq!(def.metadata(), StateMetadata::new("start", true));
    }

    #[test]
    fn build_seeds_metadata() {
        let (ctx, _, _) = context();
        let def = define_state("middle", false, |state, _| state);

        let state = def.build(&ctx);
        assert_eq!(state.slug(), "middle");
        assert!(!state.is_exitable());
    }

    #[tokio::test]
    async fn entry_can_emit_through_context() {
        let (ctx, emitter, _) = context();
        let def = define_state("greet", true, |state, ctx| {
            let ctx = ctx.clone();
            state.on_entry(move |_| {
                let ctx = ctx.clone();
                async move { ctx.emit(json!("hello")).await }
            })
        });

        def.build(&ctx).enter(false).await.unwrap();
        assert_eq!(emitter.emitted(), vec![json!("hello")]);
    }

    #[tokio::test]
    async fn redirect_sets_current_state() {
        let (ctx, _, traverser) = context();
        ctx.redirect("elsewhere").await.unwrap();
        assert_eq!(traverser.current_state().await.unwrap(), "elsewhere");
    }

    #[tokio::test]
    async fn transition_payload_reads_reserved_key() {
        let (ctx, _, traverser) = context();
        assert!(ctx.transition_payload().await.unwrap().is_none());

        traverser
            .upsert(TRANSITION_PAYLOAD_KEY, json!({"order": 7}))
            .await
            .unwrap();
        assert_eq!(
            ctx.transition_payload().await.unwrap(),
            Some(json!({"order": 7}))
        );
    }
}
