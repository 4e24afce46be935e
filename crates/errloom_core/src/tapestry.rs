//! The tapestry ledger.
//!
//! A tapestry records everything a synapseware run produced: an ordered list of
//! contexts made of role-tagged fragments, plus the log of sampled texts. It can
//! be projected to a flat transcript or to chat messages without consulting the
//! engine that filled it.

use crate::{ChatMessage, Context, Ego, Fragment, FragmentKind, Sample};
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

/// Ledger of contexts, fragments and samples produced by one rollout.
///
/// `row` and `sampling_args` are caller metadata; nothing in this crate
/// modifies them after construction.
///
/// # Examples
///
/// ```
/// use errloom_core::{Ego, Tapestry};
///
/// let mut tapestry = Tapestry::default();
/// tapestry.new_context();
/// tapestry.add_frozen(Ego::user(), "Say hi");
/// tapestry.add_frozen(Ego::assistant(), "hi");
///
/// assert_eq!(tapestry.to_text(), "Say hihi");
/// assert_eq!(tapestry.to_chat().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[builder(default, setter(into))]
pub struct Tapestry {
    /// Dataset row this rollout was produced for
    row: serde_json::Value,
    /// Sampling arguments forwarded to the collaborator
    sampling_args: serde_json::Map<String, serde_json::Value>,
    /// Contexts in creation order
    #[builder(setter(skip))]
    contexts: Vec<Context>,
    /// Samples in completion order
    #[builder(setter(skip))]
    samples: Vec<Sample>,
}

impl Tapestry {
    /// Creates an empty tapestry carrying caller metadata.
    pub fn new(
        row: serde_json::Value,
        sampling_args: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            row,
            sampling_args,
            contexts: Vec::new(),
            samples: Vec::new(),
        }
    }

    /// Returns a builder for constructing a Tapestry.
    pub fn builder() -> TapestryBuilder {
        TapestryBuilder::default()
    }

    /// Appends an empty context and returns its index.
    #[instrument(skip(self), fields(contexts = self.contexts.len()))]
    pub fn new_context(&mut self) -> usize {
        self.contexts.push(Context::new());
        debug!(index = self.contexts.len() - 1, "Opened new context");
        self.contexts.len() - 1
    }

    /// Appends a frozen fragment to the last context.
    ///
    /// Used by callers assembling transcripts by hand. A context is created if
    /// the tapestry has none yet.
    pub fn add_frozen(&mut self, ego: impl Into<Ego>, text: impl Into<String>) {
        self.add_fragment(Fragment::new(ego.into(), text));
    }

    /// Appends a fragment to the last context, creating one if needed.
    pub fn add_fragment(&mut self, fragment: Fragment) {
        if self.contexts.is_empty() {
            self.contexts.push(Context::new());
        }
        trace!(
            ego = %fragment.ego(),
            kind = %fragment.kind(),
            len = fragment.text().len(),
            "Appending fragment"
        );
        if let Some(context) = self.contexts.last_mut() {
            context.push(fragment);
        }
    }

    /// Appends a record to the sample log.
    pub fn record_sample(&mut self, role: Ego, content: impl Into<String>) {
        self.samples.push(Sample::new(role, content));
    }

    /// Context at `index`, if any.
    pub fn context(&self, index: usize) -> Option<&Context> {
        self.contexts.get(index)
    }

    /// The context new fragments are appended to.
    pub fn current_context(&self) -> Option<&Context> {
        self.contexts.last()
    }

    pub fn last_sample(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Total number of fragments across all contexts.
    pub fn fragment_count(&self) -> usize {
        self.contexts.iter().map(Context::len).sum()
    }

    /// Iterates over sampled fragments in order.
    pub fn sampled_fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.contexts
            .iter()
            .flat_map(|c| c.fragments())
            .filter(|f| *f.kind() == FragmentKind::Sampled)
    }

    /// Concatenates all fragment text across all contexts.
    pub fn to_text(&self) -> String {
        self.contexts.iter().map(Context::text).collect()
    }

    /// Flattens all contexts into chat messages.
    ///
    /// Consecutive fragments sharing an ego within one context merge into a
    /// single message. Messages never merge across a context boundary.
    pub fn to_chat(&self) -> Vec<ChatMessage> {
        self.contexts.iter().flat_map(context_messages).collect()
    }

    /// Chat messages for a single context.
    pub fn context_to_chat(&self, index: usize) -> Option<Vec<ChatMessage>> {
        self.contexts.get(index).map(context_messages)
    }
}

fn context_messages(context: &Context) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = Vec::new();
    let mut last_ego: Option<&Ego> = None;

    for fragment in context.fragments() {
        if last_ego == Some(fragment.ego())
            && let Some(message) = messages.last_mut()
        {
            message.append(fragment.text());
        } else {
            messages.push(ChatMessage::new(
                fragment.ego().chat_role(),
                fragment.text().as_str(),
            ));
        }
        last_ego = Some(fragment.ego());
    }

    messages
}

impl std::fmt::Display for Tapestry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, context) in self.contexts.iter().enumerate() {
            writeln!(f, "=== context {} ===", index)?;
            for fragment in context.fragments() {
                let marker = match fragment.kind() {
                    FragmentKind::Frozen => "",
                    FragmentKind::Sampled => "*",
                };
                writeln!(f, "[{}{}] {}", fragment.ego(), marker, fragment.text())?;
            }
        }
        if !self.samples.is_empty() {
            writeln!(f, "=== samples ===")?;
            for sample in &self.samples {
                writeln!(f, "[{}] {}", sample.role(), sample.content())?;
            }
        }
        Ok(())
    }
}
