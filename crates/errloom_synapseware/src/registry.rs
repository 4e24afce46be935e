//! Dynamic class registry.
//!
//! Class spans name objects that are built on first use and then kept bound to
//! that span occurrence. The registry maps names to factories; objects expose
//! their behavior through [`Synapse`].

use crate::Synaphor;
use crate::span::ClassSpan;
use errloom_error::ErrloomResult;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Lifecycle of an object bound to a class span.
///
/// Only [`Synapse::synapse`] is required. Each hook receives the running
/// engine and the span that triggered it.
///
/// # Example
///
/// ```rust
/// use errloom_synapseware::{ClassSpan, Synapse, Synaphor};
/// use errloom_error::ErrloomResult;
///
/// struct Counter(u32);
///
/// impl Synapse for Counter {
///     fn synapse(&mut self, _synaphor: &mut Synaphor, _span: &ClassSpan) -> ErrloomResult<String> {
///         self.0 += 1;
///         Ok(format!("call {}", self.0))
///     }
/// }
/// ```
pub trait Synapse: Send {
    /// Called before every invocation, or only before the first one,
    /// depending on [`InitPolicy`](crate::InitPolicy).
    fn synapse_init(&mut self, _synaphor: &mut Synaphor, _span: &ClassSpan) -> ErrloomResult<()> {
        Ok(())
    }

    /// Produce the text that becomes a new fragment.
    fn synapse(&mut self, synaphor: &mut Synaphor, span: &ClassSpan) -> ErrloomResult<String>;

    /// Called after every invocation.
    fn synapse_end(&mut self, _synaphor: &mut Synaphor, _span: &ClassSpan) -> ErrloomResult<()> {
        Ok(())
    }
}

/// Builds a bound object from a span's positional and named arguments.
pub type SynapseFactory = Arc<
    dyn Fn(&[String], &BTreeMap<String, String>) -> ErrloomResult<Box<dyn Synapse>> + Send + Sync,
>;

/// Name to factory table consulted when a class span is first executed.
///
/// # Example
///
/// ```rust
/// use errloom_synapseware::{ClassRegistry, ClassSpan, Synapse, Synaphor};
/// use errloom_error::ErrloomResult;
///
/// struct Echo(Vec<String>);
///
/// impl Synapse for Echo {
///     fn synapse(&mut self, _: &mut Synaphor, _: &ClassSpan) -> ErrloomResult<String> {
///         Ok(self.0.join(" "))
///     }
/// }
///
/// let mut registry = ClassRegistry::new();
/// registry.register("Echo", |args, _named| Ok(Echo(args.to_vec())));
/// assert!(registry.contains("Echo"));
/// ```
#[derive(Clone, Default)]
pub struct ClassRegistry {
    factories: HashMap<String, SynapseFactory>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under `name`, replacing any previous one.
    pub fn register<S, F>(&mut self, name: impl Into<String>, factory: F)
    where
        S: Synapse + 'static,
        F: Fn(&[String], &BTreeMap<String, String>) -> ErrloomResult<S> + Send + Sync + 'static,
    {
        let factory: SynapseFactory = Arc::new(move |positional, named| {
            factory(positional, named).map(|object| Box::new(object) as Box<dyn Synapse>)
        });
        self.factories.insert(name.into(), factory);
    }

    /// Register an already type-erased factory.
    pub fn register_factory(&mut self, name: impl Into<String>, factory: SynapseFactory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&SynapseFactory> {
        self.factories.get(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("classes", &self.names())
            .finish()
    }
}
