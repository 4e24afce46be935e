//! Parsed synapseware programs.

use crate::parser::parse_spans;
use crate::span::Span;
use errloom_error::{ErrloomError, ErrloomResult};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PROGRAM_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of one parsed program.
///
/// Binding keys are only unique within a program, so the engine keys bound
/// objects by program and key together. Clones share their original's id;
/// every parse, [`Synapseware::from_spans`] call or deserialization gets a
/// fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
#[display("program-{_0}")]
pub struct ProgramId(u64);

impl ProgramId {
    /// Allocate an id no other program in this process has.
    pub fn next() -> Self {
        Self(NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// An immutable, parsed synapseware program.
///
/// Programs hold no run state and can be shared freely (e.g. behind an
/// `Arc`) between many concurrent rollouts. Equality compares spans only,
/// never program identity.
///
/// # Examples
///
/// ```
/// use errloom_synapseware::{Span, Synapseware};
///
/// let program: Synapseware = "<|o_o|>Hello <|name|>!".parse().unwrap();
/// assert_eq!(program.spans().len(), 4);
/// assert!(matches!(program.spans()[2], Span::Var(_)));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Synapseware {
    #[serde(skip, default = "ProgramId::next")]
    id: ProgramId,
    spans: Vec<Span>,
    binding_count: usize,
}

impl Synapseware {
    /// Parse synapseware text.
    ///
    /// # Errors
    ///
    /// Fails with a parse error identifying the offset of a malformed marker.
    pub fn parse(source: &str) -> ErrloomResult<Self> {
        let (spans, binding_count) = parse_spans(source)?;
        Ok(Self {
            id: ProgramId::next(),
            spans,
            binding_count,
        })
    }

    /// Build a program directly from spans.
    ///
    /// `binding_count` is one past the highest binding key in use.
    pub fn from_spans(spans: Vec<Span>) -> Self {
        let binding_count = spans
            .iter()
            .filter_map(|span| match span {
                Span::Class(class) => Some(class.binding_key().index().saturating_add(1)),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        Self {
            id: ProgramId::next(),
            spans,
            binding_count,
        }
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    /// Spans in execution order.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Number of binding keys the program hands out.
    pub fn binding_count(&self) -> usize {
        self.binding_count
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

impl Default for Synapseware {
    fn default() -> Self {
        Self::from_spans(Vec::new())
    }
}

impl PartialEq for Synapseware {
    fn eq(&self, other: &Self) -> bool {
        self.spans == other.spans && self.binding_count == other.binding_count
    }
}

impl Eq for Synapseware {}

impl std::hash::Hash for Synapseware {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.spans.hash(state);
        self.binding_count.hash(state);
    }
}

impl std::str::FromStr for Synapseware {
    type Err = ErrloomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Synapseware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, span) in self.spans.iter().enumerate() {
            writeln!(f, "{:>3}: {}", index, span)?;
        }
        Ok(())
    }
}
