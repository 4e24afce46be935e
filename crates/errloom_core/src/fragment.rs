//! Fragment and context types.

use crate::Ego;
use serde::{Deserialize, Serialize};

/// How a fragment came to be in the tapestry.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum FragmentKind {
    /// Authored or injected text
    #[default]
    #[display("frozen")]
    Frozen,
    /// Text produced by the sampling collaborator
    #[display("sampled")]
    Sampled,
}

/// A role-tagged contiguous piece of text within a context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_getters::Getters)]
pub struct Fragment {
    /// Speaker of this fragment
    ego: Ego,
    /// Fragment text
    text: String,
    /// Origin of the text
    #[serde(default)]
    kind: FragmentKind,
}

impl Fragment {
    /// Creates a frozen fragment.
    pub fn new(ego: Ego, text: impl Into<String>) -> Self {
        Self {
            ego,
            text: text.into(),
            kind: FragmentKind::Frozen,
        }
    }

    /// Creates a fragment holding sampled text.
    pub fn sampled(ego: Ego, text: impl Into<String>) -> Self {
        Self {
            ego,
            text: text.into(),
            kind: FragmentKind::Sampled,
        }
    }
}

/// An ordered group of fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Context {
    fragments: Vec<Fragment>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragments in append order.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Concatenated text of all fragments.
    pub fn text(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }

    pub(crate) fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }
}
