//! Regex-based text classification.

use super::{InputTransformer, IntentMatch, TransformError};
use crate::core::{Intent, Params};
use std::sync::Arc;

/// Normalize free text before matching.
///
/// Lowercases, drops punctuation and collapses runs of whitespace.
///
/// ```rust
/// use traversal::transform::clean_input;
///
/// assert_eq!(clean_input("Hello, World!"), "hello world");
/// ```
pub fn clean_input(input: &str) -> String {
    let stripped: String = input
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Matches cleaned text against each valid intent's patterns.
///
/// Intents are tried in the order given and patterns in declaration order;
/// the first pattern that matches wins. Named capture groups that
/// participated in the match become parameters.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextInputTransformer;

impl TextInputTransformer {
    pub fn new() -> Self {
        Self
    }
}

impl InputTransformer<str> for TextInputTransformer {
    fn transform(
        &self,
        input: &str,
        valid_intents: &[Arc<Intent>],
    ) -> Result<Option<IntentMatch>, TransformError> {
        let cleaned = clean_input(input);

        Ok(valid_intents.iter().find_map(|intent| {
            intent.patterns().iter().find_map(|pattern| {
                let captures = pattern.captures(&cleaned)?;
                let params: Params = pattern
                    .capture_names()
                    .flatten()
                    .filter_map(|name| {
                        captures
                            .name(name)
                            .map(|m| (name.to_string(), m.as_str().to_string()))
                    })
                    .collect();
                Some(IntentMatch::with_params(Arc::clone(intent), params))
            })
        }))
    }
}

impl InputTransformer<String> for TextInputTransformer {
    fn transform(
        &self,
        input: &String,
        valid_intents: &[Arc<Intent>],
    ) -> Result<Option<IntentMatch>, TransformError> {
        InputTransformer::<str>::transform(self, input.as_str(), valid_intents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_intent() -> Arc<Intent> {
        Arc::new(
            Intent::with_patterns(
                "profile",
                [r"i am an? (?P<age>\d+) year old (?P<gender>male|female)"],
            )
            .unwrap(),
        )
    }

    #[test]
    fn clean_input_lowercases_and_strips_punctuation() {
        assert_eq!(clean_input("Hello!"), "hello");
        assert_eq!(clean_input("Hello  World"), "hello world");
        assert_eq!(clean_input("Hello, World"), "hello world");
        assert_eq!(clean_input("  \tYes.\n"), "yes");
        assert_eq!(clean_input(""), "");
    }

    #[test]
    fn matching_input_extracts_named_groups() {
        let valid = vec![profile_intent()];
        let matched = TextInputTransformer
            .transform("I am a 29 year old male.", valid.as_slice())
            .unwrap()
            .unwrap();

        assert_eq!(matched.intent.slug(), "profile");
        assert_eq!(matched.params["age"], "29");
        assert_eq!(matched.params["gender"], "male");
    }

    #[test]
    fn unmatched_input_yields_nothing() {
        let valid = vec![profile_intent()];
        assert!(TextInputTransformer
            .transform("hello world", valid.as_slice())
            .unwrap()
            .is_none());
    }

    #[test]
    fn only_valid_intents_are_considered() {
        let greet = Arc::new(Intent::with_patterns("greet", ["^(hi|hello)$"]).unwrap());
        let bye = Arc::new(Intent::with_patterns("bye", ["^bye$"]).unwrap());

        let valid = vec![Arc::clone(&greet)];
        assert!(TextInputTransformer
            .transform("Bye!", valid.as_slice())
            .unwrap()
            .is_none());

        let valid = vec![greet, bye];
        let matched = TextInputTransformer
            .transform("Bye!", valid.as_slice())
            .unwrap()
            .unwrap();
        assert_eq!(matched.intent.slug(), "bye");
    }

    #[test]
    fn first_matching_intent_wins() {
        let specific = Arc::new(Intent::with_patterns("yes", ["^yes$"]).unwrap());
        let anything = Arc::new(Intent::with_patterns("any", [".*"]).unwrap());

        let valid = vec![specific, anything];
        let matched = TextInputTransformer
            .transform("YES", valid.as_slice())
            .unwrap()
            .unwrap();
        assert_eq!(matched.intent.slug(), "yes");
    }

    #[test]
    fn optional_groups_that_did_not_match_are_omitted() {
        let intent = Arc::new(
            Intent::with_patterns("order", [r"^order (?P<count>\d+)(?: (?P<size>small|large))?$"])
                .unwrap(),
        );
        let valid = vec![intent];

        let matched = TextInputTransformer
            .transform("Order 3", valid.as_slice())
            .unwrap()
            .unwrap();
        assert_eq!(matched.params.get("count").map(String::as_str), Some("3"));
        assert!(!matched.params.contains_key("size"));
    }

    #[test]
    fn string_input_delegates_to_str() {
        let valid = vec![profile_intent()];
        let input = String::from("I am an 80 year old female");
        let matched = TextInputTransformer
            .transform(&input, valid.as_slice())
            .unwrap()
            .unwrap();
        assert_eq!(matched.params["age"], "80");
    }
}
