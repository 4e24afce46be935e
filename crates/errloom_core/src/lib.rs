//! Core ledger types for the Errloom synapseware engine.
//!
//! This crate provides the tapestry (contexts, fragments, samples) that a
//! synapseware run writes into, along with its text and chat projections.

mod fragment;
mod message;
mod observability;
mod role;
mod tapestry;

pub use fragment::{Context, Fragment, FragmentKind};
pub use message::{ChatMessage, Sample};
pub use observability::init_tracing;
pub use role::Ego;
pub use tapestry::{Tapestry, TapestryBuilder, TapestryBuilderError};
