//! Engine configuration errors.

use std::path::{Path, PathBuf};

/// A rejected or unreadable engine configuration.
///
/// Carries the offending config file when one is known, plus the source
/// location that raised the error.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// What was wrong with the configuration
    pub message: String,
    /// Config file being loaded, if any
    pub path: Option<PathBuf>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a config error at the caller's location.
    ///
    /// # Examples
    ///
    /// ```
    /// use errloom_error::ConfigError;
    ///
    /// let err = ConfigError::new("unknown init_policy 'sometimes'").in_file("synaphor.toml");
    /// assert!(err.message.contains("init_policy"));
    /// assert!(err.to_string().contains("synaphor.toml"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            path: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Attach the config file the error came from.
    pub fn in_file(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "Engine config error in {}: {}", path.display(), self.message)?,
            None => write!(f, "Engine config error: {}", self.message)?,
        }
        write!(f, " ({}:{})", self.file, self.line)
    }
}

impl std::error::Error for ConfigError {}
