//! Outcome of a state's transition function.

use serde::{Deserialize, Serialize};

/// Where a transition function sends the traverser.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Next {
    /// Remain in the current state; the engine re-enters it.
    Stay,

    /// Move to the state with this slug.
    Goto(String),
}

impl Next {
    pub fn goto(slug: impl Into<String>) -> Self {
        Self::Goto(slug.into())
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Stay => None,
            Self::Goto(slug) => Some(slug),
        }
    }
}
