//! Error types for the Errloom synapseware engine.
//!
//! Every error records the source location where it was raised. Crate-level
//! results use [`ErrloomError`], which wraps an [`ErrloomErrorKind`].

mod config;
mod json;
mod loom;
mod parse;
mod synaphor;

pub use config::ConfigError;
pub use json::JsonError;
pub use loom::LoomError;
pub use parse::{ParseError, ParseErrorKind};
pub use synaphor::{SynaphorError, SynaphorErrorKind};

/// Crate-level error variants.
#[derive(Debug, derive_more::From)]
pub enum ErrloomErrorKind {
    /// Malformed synapseware text
    Parse(ParseError),
    /// Name resolution or lifecycle failure during execution
    Synaphor(SynaphorError),
    /// Failure reported by the sampling collaborator
    Loom(LoomError),
    /// Configuration error
    Config(ConfigError),
    /// JSON serialization/deserialization error
    Json(JsonError),
}

impl std::fmt::Display for ErrloomErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrloomErrorKind::Parse(e) => write!(f, "{}", e),
            ErrloomErrorKind::Synaphor(e) => write!(f, "{}", e),
            ErrloomErrorKind::Loom(e) => write!(f, "{}", e),
            ErrloomErrorKind::Config(e) => write!(f, "{}", e),
            ErrloomErrorKind::Json(e) => write!(f, "{}", e),
        }
    }
}

/// Errloom error with kind discrimination.
///
/// # Examples
///
/// ```
/// use errloom_error::{ErrloomError, ErrloomErrorKind, LoomError};
///
/// let err: ErrloomError = LoomError::new("timeout").into();
/// assert!(matches!(err.kind(), ErrloomErrorKind::Loom(_)));
/// ```
#[derive(Debug)]
pub struct ErrloomError(Box<ErrloomErrorKind>);

impl ErrloomError {
    /// Create a new error from a kind.
    pub fn new(kind: ErrloomErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ErrloomErrorKind {
        &self.0
    }

    /// Consume the error, returning its kind.
    pub fn into_kind(self) -> ErrloomErrorKind {
        *self.0
    }
}

impl std::fmt::Display for ErrloomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Errloom Error: {}", self.0)
    }
}

impl std::error::Error for ErrloomError {}

// Generic From implementation for any type that converts to ErrloomErrorKind
impl<T> From<T> for ErrloomError
where
    T: Into<ErrloomErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Errloom operations.
pub type ErrloomResult<T> = std::result::Result<T, ErrloomError>;
