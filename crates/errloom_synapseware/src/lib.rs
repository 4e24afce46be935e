//! Synapseware: a templating language for scripted model conversations.
//!
//! A synapseware program is a flat sequence of spans (literal text, ego
//! switches, context breaks, variable interpolation, class invocations and
//! sampling directives). The [`Synaphor`] executes a program against a
//! [`Tapestry`](errloom_core::Tapestry), an [`Environment`] and a
//! [`Loom`](errloom_interface::Loom).
//!
//! ```rust,ignore
//! let program: Synapseware = "<|o_o|>Compress this.<|@_@:compressed <>compress|>".parse()?;
//! let mut synaphor = Synaphor::new(loom, Tapestry::default(), Environment::new());
//! synaphor.run(&program).await?;
//! let chat = synaphor.tapestry().to_chat();
//! ```

mod config;
mod env;
mod parser;
mod registry;
mod rollout;
mod span;
mod synaphor;
mod synapseware;

pub use config::{InitPolicy, SynaphorConfig, SynaphorConfigBuilder, SynaphorConfigBuilderError};
pub use env::{Environment, Value};
pub use parser::{MARKER_CLOSE, MARKER_OPEN, is_identifier, parse_spans};
pub use registry::{ClassRegistry, Synapse, SynapseFactory};
pub use rollout::{DEFAULT_MAX_CONCURRENT, Rollout, RolloutRunner};
pub use span::{BindingKey, ClassSpan, EgoSpan, SampleSpan, Span, TextSpan, VarSpan};
pub use synaphor::{Synaphor, wrap_object};
pub use synapseware::{ProgramId, Synapseware};
