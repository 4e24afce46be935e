//! Execution error types.

/// Specific error conditions raised while executing a span sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SynaphorErrorKind {
    /// A variable span names something absent from the environment
    UndefinedVariable(String),
    /// A class span names something absent from the class registry
    UnknownClass(String),
    /// A class factory refused to build an instance
    Construction {
        /// Class name
        class: String,
        /// Error message
        message: String,
    },
    /// A rollout task ended without producing a result
    RolloutAborted(String),
    /// A lifecycle hook of a bound object failed
    Hook {
        /// Class name
        class: String,
        /// Hook that failed
        hook: &'static str,
        /// Error message
        message: String,
    },
}

impl std::fmt::Display for SynaphorErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SynaphorErrorKind::UndefinedVariable(name) => {
                write!(f, "Undefined variable '{}'", name)
            }
            SynaphorErrorKind::UnknownClass(name) => write!(f, "Unknown class '{}'", name),
            SynaphorErrorKind::RolloutAborted(message) => {
                write!(f, "Rollout aborted: {}", message)
            }
            SynaphorErrorKind::Construction { class, message } => {
                write!(f, "Failed to construct '{}': {}", class, message)
            }
            SynaphorErrorKind::Hook {
                class,
                hook,
                message,
            } => write!(f, "Hook '{}' of '{}' failed: {}", hook, class, message),
        }
    }
}

/// Error type for span execution.
///
/// # Examples
///
/// ```
/// use errloom_error::{SynaphorError, SynaphorErrorKind};
///
/// let err = SynaphorError::new(SynaphorErrorKind::UndefinedVariable("x".to_string()));
/// assert!(format!("{}", err).contains("Undefined variable 'x'"));
/// ```
#[derive(Debug, Clone)]
pub struct SynaphorError {
    /// The specific error condition
    pub kind: SynaphorErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl SynaphorError {
    /// Create a new SynaphorError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SynaphorErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl std::fmt::Display for SynaphorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Synaphor Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for SynaphorError {}
