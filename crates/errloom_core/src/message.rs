//! Chat message and sample record types.

use crate::Ego;
use serde::{Deserialize, Serialize};

/// A chat-style message projected from a tapestry.
///
/// # Examples
///
/// ```
/// use errloom_core::ChatMessage;
///
/// let message = ChatMessage::new("user", "Hello!");
/// assert_eq!(message.role(), "user");
/// assert_eq!(message.content(), "Hello!");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_getters::Getters)]
pub struct ChatMessage {
    /// Chat role of the sender
    role: String,
    /// Merged text content
    content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub(crate) fn append(&mut self, text: &str) {
        self.content.push_str(text);
    }
}

/// One completed sampling directive.
///
/// Holds the raw generated text without any tag markup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_getters::Getters)]
pub struct Sample {
    /// Ego active when the sample was requested
    role: Ego,
    /// Generated text
    content: String,
}

impl Sample {
    pub fn new(role: Ego, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}
