//! Sampling collaborator trait.

use async_trait::async_trait;
use derive_builder::Builder;
use derive_getters::Getters;
use errloom_core::Tapestry;
use errloom_error::ErrloomResult;
use serde::{Deserialize, Serialize};

/// Per-request options forwarded to a [`Loom`].
///
/// # Examples
///
/// ```
/// use errloom_interface::SampleOptions;
///
/// let options = SampleOptions::builder()
///     .max_tokens(Some(32))
///     .build()
///     .unwrap();
/// assert!(*options.sanitize_sampling_args());
/// assert_eq!(*options.max_tokens(), Some(32));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[builder(default)]
#[serde(default)]
pub struct SampleOptions {
    /// Drop sampling arguments the backend does not understand
    sanitize_sampling_args: bool,
    /// Accept a truncated completion when the token limit is reached
    allow_partial_on_length: bool,
    /// Overrides the tapestry's `max_tokens` sampling argument
    max_tokens: Option<u32>,
    /// Overrides the tapestry's `temperature` sampling argument
    temperature: Option<f32>,
}

impl SampleOptions {
    /// Returns a builder for constructing SampleOptions.
    pub fn builder() -> SampleOptionsBuilder {
        SampleOptionsBuilder::default()
    }
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            sanitize_sampling_args: true,
            allow_partial_on_length: true,
            max_tokens: None,
            temperature: None,
        }
    }
}

/// The model-sampling collaborator.
///
/// A loom turns a partial tapestry into generated text. Implementations may
/// block on network I/O, apply their own timeouts and retries, and fail with
/// any error; the engine propagates failures unchanged.
///
/// The closing-tag stop policy lives here too: [`Loom::stop_sequence`]
/// decides which string ends generation for a tagged sample.
#[async_trait]
pub trait Loom: Send + Sync {
    /// Generate text continuing `tapestry`.
    ///
    /// An empty `stop_sequences` slice requests an unconstrained completion.
    async fn sample(
        &self,
        tapestry: &Tapestry,
        stop_sequences: &[String],
        options: &SampleOptions,
    ) -> ErrloomResult<String>;

    /// Stop sequence for a sample wrapped in `tag`.
    ///
    /// Defaults to the literal closing tag `</tag>`. Backends that close tags
    /// with a dedicated token override this; returning `None` samples without
    /// a stop sequence.
    fn stop_sequence(&self, tag: &str) -> Option<String> {
        Some(format!("</{}>", tag))
    }

    /// Name of the backend for logging.
    fn name(&self) -> &str;
}
