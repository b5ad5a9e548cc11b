//! Intents: classified meanings extracted from raw input.

use regex::Regex;
use std::collections::HashMap;

/// Parameters extracted from input alongside a matched intent.
pub type Params = HashMap<String, String>;

/// A named meaning plus the patterns used to recognize it in text.
///
/// The engine treats an intent as an opaque matching target. Only the
/// input transformer looks at its patterns; named capture groups in a
/// pattern become extracted parameters.
///
/// # Example
///
/// ```rust
/// use traversal::core::Intent;
///
/// let intent = Intent::with_patterns(
///     "profile",
///     [r"i am a (?P<age>\d+) year old (?P<gender>male|female)"],
/// )
/// .unwrap();
///
/// assert_eq!(intent.slug(), "profile");
/// assert_eq!(intent.patterns().len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct Intent {
    slug: String,
    patterns: Vec<Regex>,
}

impl Intent {
    /// An intent with no patterns, for transformers that match by other means.
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            patterns: Vec::new(),
        }
    }

    /// Compile an intent from regex sources.
    pub fn with_patterns<P, S>(slug: impl Into<String>, patterns: P) -> Result<Self, regex::Error>
    where
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            slug: slug.into(),
            patterns,
        })
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }
}

impl PartialEq for Intent {
    fn eq(&self, other: &Self) -> bool {
        self.slug == other.slug
    }
}

impl Eq for Intent {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_compare_by_slug() {
        let a = Intent::new("greet");
        let b = Intent::with_patterns("greet", ["hello"]).unwrap();
        let c = Intent::new("bye");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(Intent::with_patterns("bad", ["(unclosed"]).is_err());
    }
}
