//! Errloom: synapseware prompt programs.
//!
//! Synapseware is literal text interleaved with `<|...|>` markers that switch
//! the speaking ego, break the context, interpolate variables, invoke bound
//! objects and request samples from a model. A [`Synaphor`] executes a parsed
//! [`Synapseware`] program into a [`Tapestry`], which projects to a flat
//! transcript or to chat messages.
//!
//! # Example
//!
//! ```
//! use errloom::{Environment, MockLoom, Synaphor, Synapseware, Tapestry};
//! use std::sync::Arc;
//!
//! let program: Synapseware = "<|o_o|>Name a color.<|@_@ <>color|>".parse().unwrap();
//! let mut synaphor = Synaphor::new(
//!     Arc::new(MockLoom::new("teal")),
//!     Tapestry::default(),
//!     Environment::new(),
//! );
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! runtime.block_on(synaphor.run(&program)).unwrap();
//!
//! assert_eq!(synaphor.tapestry().to_text(), "Name a color.<color>teal</color>");
//! ```
//!
//! # Crates
//!
//! - `errloom_error`: error types with source locations
//! - `errloom_core`: the tapestry ledger and tracing setup
//! - `errloom_interface`: the [`Loom`] sampling trait and [`MockLoom`]
//! - `errloom_synapseware`: parser, engine, class registry and rollouts

pub use errloom_error::{
    ConfigError, ErrloomError, ErrloomErrorKind, ErrloomResult, JsonError, LoomError, ParseError,
    ParseErrorKind, SynaphorError, SynaphorErrorKind,
};

pub use errloom_core::{
    ChatMessage, Context, Ego, Fragment, FragmentKind, Sample, Tapestry, TapestryBuilder,
    TapestryBuilderError, init_tracing,
};

pub use errloom_interface::{
    Loom, MockLoom, MockRequest, SampleOptions, SampleOptionsBuilder, SampleOptionsBuilderError,
};

pub use errloom_synapseware::{
    BindingKey, ClassRegistry, ClassSpan, DEFAULT_MAX_CONCURRENT, EgoSpan, Environment,
    InitPolicy, ProgramId, Rollout, RolloutRunner, SampleSpan, Span, Synapse, SynapseFactory,
    Synaphor, SynaphorConfig, SynaphorConfigBuilder, SynaphorConfigBuilderError, Synapseware,
    TextSpan, Value, VarSpan, wrap_object,
};

/// Parse `source` and execute it once against a fresh tapestry.
///
/// Convenience for one-off runs. Returns the filled tapestry and the final
/// environment.
///
/// # Errors
///
/// Fails on a parse error, or with the first execution error. The partial
/// tapestry is discarded in that case; drive a [`Synaphor`] directly to keep
/// it.
#[tracing::instrument(skip_all, fields(loom = loom.name(), len = source.len()))]
pub async fn weave(
    source: &str,
    loom: std::sync::Arc<dyn Loom>,
    registry: std::sync::Arc<ClassRegistry>,
    env: Environment,
) -> ErrloomResult<(Tapestry, Environment)> {
    let program = Synapseware::parse(source)?;
    let mut synaphor = Synaphor::new(loom, Tapestry::default(), env).with_registry(registry);
    synaphor.run(&program).await?;
    Ok(synaphor.into_parts())
}
