//! Engine configuration.

use derive_builder::Builder;
use derive_getters::Getters;
use errloom_error::{ConfigError, ErrloomError, ErrloomResult};
use errloom_interface::SampleOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// When a bound object's init hook runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitPolicy {
    /// Run the init hook before every invocation of the span (default)
    #[default]
    EveryInvocation,
    /// Run the init hook only when the object is first bound
    FirstBinding,
}

/// Configuration for a [`Synaphor`](crate::Synaphor).
///
/// # Examples
///
/// ```
/// use errloom_synapseware::{InitPolicy, SynaphorConfig};
///
/// let config: SynaphorConfig = toml::from_str(r#"
///     init_policy = "first_binding"
///
///     [sample_options]
///     max_tokens = 64
/// "#).unwrap();
///
/// assert_eq!(*config.init_policy(), InitPolicy::FirstBinding);
/// assert!(*config.strip_stop_sequence());
/// assert_eq!(*config.sample_options().max_tokens(), Some(64));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[builder(default)]
#[serde(default)]
pub struct SynaphorConfig {
    /// When init hooks of bound objects run
    init_policy: InitPolicy,
    /// Remove a closing tag echoed at the end of generated text
    strip_stop_sequence: bool,
    /// Options forwarded with every sampling request
    sample_options: SampleOptions,
}

impl Default for SynaphorConfig {
    fn default() -> Self {
        Self {
            init_policy: InitPolicy::default(),
            strip_stop_sequence: true,
            sample_options: SampleOptions::default(),
        }
    }
}

impl SynaphorConfig {
    /// Returns a builder for constructing a SynaphorConfig.
    pub fn builder() -> SynaphorConfigBuilder {
        SynaphorConfigBuilder::default()
    }

    /// Load engine configuration from a TOML file.
    #[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> ErrloomResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ErrloomError::from(
                ConfigError::new(format!("Failed to read config file: {}", e)).in_file(path),
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            ErrloomError::from(
                ConfigError::new(format!("Failed to parse config: {}", e)).in_file(path),
            )
        })
    }
}
