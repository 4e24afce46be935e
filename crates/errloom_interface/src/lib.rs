//! Trait definitions for the Errloom synapseware engine.
//!
//! The engine reaches the outside world only through [`Loom`], the sampling
//! collaborator. [`MockLoom`] is a dry-run implementation for tests.

mod loom;
mod mock;

pub use loom::{Loom, SampleOptions, SampleOptionsBuilder, SampleOptionsBuilderError};
pub use mock::{MockLoom, MockRequest};
