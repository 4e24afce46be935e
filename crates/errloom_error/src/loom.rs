//! Sampling collaborator error types.

/// Error raised by a sampling collaborator.
///
/// The engine never inspects or retries these; they reach the caller as-is.
#[derive(Debug, Clone)]
pub struct LoomError {
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl LoomError {
    /// Create a new LoomError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use errloom_error::LoomError;
    ///
    /// let err = LoomError::new("Inference server unavailable");
    /// assert!(err.message.contains("unavailable"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}

impl std::fmt::Display for LoomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Loom Error: {} at line {} in {}",
            self.message, self.line, self.file
        )
    }
}

impl std::error::Error for LoomError {}
