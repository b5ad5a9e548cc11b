//! Classifying raw input into intents.
//!
//! An `InputTransformer` is a pure function from raw input and the active
//! state's valid intents to an optional `IntentMatch`. Any
//! `Fn(&I, &[Arc<Intent>]) -> Result<Option<IntentMatch>, TransformError>`
//! closure is a transformer.

mod text;

pub use text::{clean_input, TextInputTransformer};

use crate::core::{Intent, Params};
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by an input transformer, e.g. an unreachable
/// classification backend.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransformError(pub String);

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A classified intent and the parameters extracted with it.
#[derive(Clone, Debug, PartialEq)]
pub struct IntentMatch {
    pub intent: Arc<Intent>,
    pub params: Params,
}

impl IntentMatch {
    pub fn new(intent: Arc<Intent>) -> Self {
        Self {
            intent,
            params: Params::new(),
        }
    }

    pub fn with_params(intent: Arc<Intent>, params: Params) -> Self {
        Self { intent, params }
    }
}

/// Maps raw input to one of the currently valid intents.
pub trait InputTransformer<I: ?Sized>: Send + Sync {
    /// Returns `Ok(None)` when no valid intent matches.
    fn transform(
        &self,
        input: &I,
        valid_intents: &[Arc<Intent>],
    ) -> Result<Option<IntentMatch>, TransformError>;
}

impl<I, F> InputTransformer<I> for F
where
    I: ?Sized,
    F: Fn(&I, &[Arc<Intent>]) -> Result<Option<IntentMatch>, TransformError> + Send + Sync,
{
    fn transform(
        &self,
        input: &I,
        valid_intents: &[Arc<Intent>],
    ) -> Result<Option<IntentMatch>, TransformError> {
        self(input, valid_intents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_transformers() {
        let by_slug = |input: &str, valid: &[Arc<Intent>]| -> Result<_, TransformError> {
            Ok(valid
                .iter()
                .find(|i| i.slug() == input)
                .map(|i| IntentMatch::new(Arc::clone(i))))
        };

        let valid = vec![Arc::new(Intent::new("a")), Arc::new(Intent::new("b"))];
        let matched = by_slug.transform("b", &valid).unwrap().unwrap();
        assert_eq!(matched.intent.slug(), "b");
        assert!(matched.params.is_empty());
        assert!(by_slug.transform("c", &valid).unwrap().is_none());
    }

    #[test]
    fn closures_can_fail() {
        let offline = |_: &str, _: &[Arc<Intent>]| -> Result<Option<IntentMatch>, TransformError> {
            Err(TransformError::new("classifier offline"))
        };

        let err = offline.transform("hi", &[]).unwrap_err();
        assert_eq!(err.to_string(), "classifier offline");
    }
}
