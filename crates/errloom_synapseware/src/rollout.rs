//! Concurrent rollouts.
//!
//! Each rollout gets its own [`Synaphor`], tapestry and environment. The only
//! things shared between tasks are the immutable program, the loom and the
//! class registry.

use crate::config::SynaphorConfig;
use crate::env::Environment;
use crate::registry::ClassRegistry;
use crate::synaphor::Synaphor;
use crate::synapseware::Synapseware;
use errloom_core::Tapestry;
use errloom_error::{ErrloomError, ErrloomResult, JsonError, SynaphorError, SynaphorErrorKind};
use errloom_interface::Loom;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

/// Default number of rollouts executing at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Outcome of one rollout.
///
/// The tapestry and environment are kept even when the run failed, holding
/// everything produced before the failing span.
#[derive(Debug)]
pub struct Rollout {
    /// Position of the row this rollout was produced for
    pub row_index: usize,
    /// Ledger produced by the run
    pub tapestry: Tapestry,
    /// Environment after the run
    pub environment: Environment,
    /// Whether the run completed
    pub outcome: ErrloomResult<()>,
}

impl Rollout {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Pretty JSON dump of the rollout for diagnostics.
    ///
    /// Failed rollouts carry the error message under `error`.
    pub fn to_json(&self) -> ErrloomResult<String> {
        let report = RolloutReport {
            row_index: self.row_index,
            tapestry: &self.tapestry,
            environment: &self.environment,
            error: self.outcome.as_ref().err().map(|e| e.to_string()),
        };
        serde_json::to_string_pretty(&report).map_err(|e| {
            ErrloomError::from(JsonError::new(format!(
                "Failed to serialize rollout {}: {}",
                self.row_index, e
            )))
        })
    }
}

#[derive(serde::Serialize)]
struct RolloutReport<'a> {
    row_index: usize,
    tapestry: &'a Tapestry,
    environment: &'a Environment,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Runs one program over many dataset rows.
///
/// # Example
///
/// ```rust,ignore
/// let runner = RolloutRunner::new(Arc::new(program), Arc::new(MockLoom::default()))
///     .with_max_concurrent(4);
/// let rollouts = runner.run(rows).await;
/// ```
#[derive(Clone)]
pub struct RolloutRunner {
    program: Arc<Synapseware>,
    loom: Arc<dyn Loom>,
    registry: Arc<ClassRegistry>,
    config: SynaphorConfig,
    environment: Environment,
    sampling_args: serde_json::Map<String, serde_json::Value>,
    max_concurrent: usize,
}

impl RolloutRunner {
    pub fn new(program: Arc<Synapseware>, loom: Arc<dyn Loom>) -> Self {
        Self {
            program,
            loom,
            registry: Arc::new(ClassRegistry::new()),
            config: SynaphorConfig::default(),
            environment: Environment::new(),
            sampling_args: serde_json::Map::new(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    pub fn with_registry(mut self, registry: Arc<ClassRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_config(mut self, config: SynaphorConfig) -> Self {
        self.config = config;
        self
    }

    /// Environment every rollout starts from. Each rollout gets its own copy.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Sampling arguments recorded on every tapestry.
    pub fn with_sampling_args(
        mut self,
        sampling_args: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        self.sampling_args = sampling_args;
        self
    }

    /// Upper bound on rollouts running at once (at least one).
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Execute one rollout per row. Results come back in row order.
    #[instrument(skip_all, fields(rows = rows.len(), max_concurrent = self.max_concurrent))]
    pub async fn run(&self, rows: Vec<serde_json::Value>) -> Vec<Rollout> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();
        let row_count = rows.len();

        for (row_index, row) in rows.into_iter().enumerate() {
            let runner = self.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                debug!(row_index, "Starting rollout");
                runner.run_one(row_index, row).await
            });
        }

        let mut slots: Vec<Option<Rollout>> = (0..row_count).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(rollout) => {
                    let index = rollout.row_index;
                    slots[index] = Some(rollout);
                }
                Err(e) => warn!(error = %e, "Rollout task failed to complete"),
            }
        }

        let rollouts: Vec<Rollout> = slots
            .into_iter()
            .enumerate()
            .map(|(row_index, slot)| {
                slot.unwrap_or_else(|| Rollout {
                    row_index,
                    tapestry: Tapestry::default(),
                    environment: Environment::new(),
                    outcome: Err(SynaphorError::new(SynaphorErrorKind::RolloutAborted(
                        format!("task for row {} did not complete", row_index),
                    ))
                    .into()),
                })
            })
            .collect();

        info!(
            completed = rollouts.iter().filter(|r| r.is_ok()).count(),
            total = rollouts.len(),
            "Rollouts finished"
        );
        rollouts
    }

    async fn run_one(&self, row_index: usize, row: serde_json::Value) -> Rollout {
        let tapestry = Tapestry::new(row, self.sampling_args.clone());
        let mut synaphor = Synaphor::new(Arc::clone(&self.loom), tapestry, self.environment.clone())
            .with_registry(Arc::clone(&self.registry))
            .with_config(self.config.clone());

        let outcome = synaphor.run(&self.program).await;
        let (tapestry, environment) = synaphor.into_parts();
        Rollout {
            row_index,
            tapestry,
            environment,
            outcome,
        }
    }
}
