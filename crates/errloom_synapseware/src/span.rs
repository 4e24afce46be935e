//! Span model.
//!
//! A span is one parsed unit of synapseware. Spans are plain data; the
//! [`Synaphor`](crate::Synaphor) gives them meaning.

use derive_getters::Getters;
use errloom_core::Ego;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable identity of one class span occurrence within a program.
///
/// Keys are dense indices assigned in source order at parse time, so they
/// double as slots in the engine's binding arena.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("#{_0}")]
pub struct BindingKey(usize);

impl BindingKey {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Arena slot for this key.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Literal text to append.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct TextSpan {
    text: String,
}

impl TextSpan {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Switches the active speaker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct EgoSpan {
    ego: Ego,
}

impl EgoSpan {
    pub fn new(ego: Ego) -> Self {
        Self { ego }
    }
}

/// Interpolates a variable from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct VarSpan {
    name: String,
}

impl VarSpan {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Invokes the lifecycle of a dynamically bound object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct ClassSpan {
    /// Registered class name
    name: String,
    /// Bare argument tokens, in source order
    positional_args: Vec<String>,
    /// `key=value` argument tokens
    named_args: BTreeMap<String, String>,
    /// Variable receiving the call hook's text
    assign_name: Option<String>,
    /// Identity of this occurrence
    binding_key: BindingKey,
}

impl ClassSpan {
    pub fn new(
        name: impl Into<String>,
        positional_args: Vec<String>,
        named_args: BTreeMap<String, String>,
        assign_name: Option<String>,
        binding_key: BindingKey,
    ) -> Self {
        Self {
            name: name.into(),
            positional_args,
            named_args,
            assign_name,
            binding_key,
        }
    }
}

/// Invokes the sampling collaborator.
///
/// With a tag, the generated text is wrapped in `<tag>`/`</tag>` fragments and
/// generation stops at the closing tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct SampleSpan {
    tag: Option<String>,
    assign_name: Option<String>,
}

impl SampleSpan {
    pub fn new(tag: Option<String>, assign_name: Option<String>) -> Self {
        Self { tag, assign_name }
    }
}

/// One parsed unit of synapseware.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Span {
    Text(TextSpan),
    Ego(EgoSpan),
    ContextBreak,
    Var(VarSpan),
    Class(ClassSpan),
    Sample(SampleSpan),
}

impl Span {
    /// Short name of the span variant, used in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Span::Text(_) => "text",
            Span::Ego(_) => "ego",
            Span::ContextBreak => "context_break",
            Span::Var(_) => "var",
            Span::Class(_) => "class",
            Span::Sample(_) => "sample",
        }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Span::Text(span) => write!(f, "Text({:?})", span.text),
            Span::Ego(span) => write!(f, "Ego({})", span.ego),
            Span::ContextBreak => write!(f, "ContextBreak"),
            Span::Var(span) => write!(f, "Var({})", span.name),
            Span::Class(span) => {
                write!(f, "Class({} ", span.binding_key)?;
                if let Some(target) = &span.assign_name {
                    write!(f, "{}:", target)?;
                }
                write!(f, "{}", span.name)?;
                for arg in &span.positional_args {
                    write!(f, " {}", arg)?;
                }
                for (key, value) in &span.named_args {
                    write!(f, " {}={}", key, value)?;
                }
                write!(f, ")")
            }
            Span::Sample(span) => {
                write!(f, "Sample(")?;
                match &span.tag {
                    Some(tag) => write!(f, "<{}>", tag)?,
                    None => write!(f, "untagged")?,
                }
                if let Some(target) = &span.assign_name {
                    write!(f, " -> {}", target)?;
                }
                write!(f, ")")
            }
        }
    }
}
