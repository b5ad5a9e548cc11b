//! Compiled slug-to-definition lookup table.

use super::definition::{StateContext, StateDefinition};
use crate::core::{State, StateMetadata};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

struct Entry {
    metadata: StateMetadata,
    definition: Arc<dyn StateDefinition>,
}

/// Slug-keyed dispatch table produced by `StateMachine::compile`.
///
/// Metadata is captured once at compile time; lookups never call back into
/// the definitions. Built once per machine and shared across calls.
pub struct StateMap {
    entries: HashMap<String, Entry>,
    order: Vec<String>,
}

impl StateMap {
    /// Callers must have validated slug uniqueness beforehand.
    pub(crate) fn from_validated(definitions: Vec<(StateMetadata, Arc<dyn StateDefinition>)>) -> Self {
        let mut entries = HashMap::with_capacity(definitions.len());
        let mut order = Vec::with_capacity(definitions.len());

        for (metadata, definition) in definitions {
            order.push(metadata.slug().to_string());
            entries.insert(
                metadata.slug().to_string(),
                Entry {
                    metadata,
                    definition,
                },
            );
        }

        Self { entries, order }
    }

    pub fn metadata(&self, slug: &str) -> Option<&StateMetadata> {
        self.entries.get(slug).map(|e| &e.metadata)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.entries.contains_key(slug)
    }

    /// Wire a fresh state for the given slug.
    pub fn build(&self, slug: &str, ctx: &StateContext) -> Option<State> {
        self.entries.get(slug).map(|e| e.definition.build(ctx))
    }

    /// Slugs in declaration order.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for StateMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.order.iter().filter_map(|slug| self.metadata(slug)))
            .finish()
    }
}
