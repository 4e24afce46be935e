//! Synaphor execution engine.
//!
//! The engine walks a [`Synapseware`] span by span, buffering text for the
//! active ego and flushing it into the tapestry as fragments whenever the ego
//! changes, a context breaks, or a class or sample produces content of its
//! own. Sampling is the only step that awaits.

use crate::config::{InitPolicy, SynaphorConfig};
use crate::env::Environment;
use crate::registry::{ClassRegistry, Synapse};
use crate::span::{BindingKey, ClassSpan, SampleSpan, Span, VarSpan};
use crate::synapseware::{ProgramId, Synapseware};
use errloom_core::{Context, Ego, Fragment, Tapestry};
use errloom_error::{ErrloomResult, SynaphorError, SynaphorErrorKind};
use errloom_interface::Loom;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, trace, warn};

/// Wrap an injected value so a model can tell it apart from authored text.
///
/// # Examples
///
/// ```
/// use errloom_synapseware::wrap_object;
///
/// assert_eq!(wrap_object("my_var", "42"), "<obj id=my_var>42</obj>");
/// ```
pub fn wrap_object(name: &str, value: &str) -> String {
    format!("<obj id={}>{}</obj>", name, value)
}

/// Executes synapseware against one tapestry, one environment and one loom.
///
/// A Synaphor owns all mutable state of a run; nothing is shared with other
/// instances except the program, the loom and the class registry, none of
/// which it mutates. Run one instance per rollout.
///
/// Objects bound to class spans persist across [`Synaphor::run`] calls, so
/// running the same program again reuses them. Bindings are keyed by program
/// and binding key, so different programs never share objects.
pub struct Synaphor {
    loom: Arc<dyn Loom>,
    registry: Arc<ClassRegistry>,
    config: SynaphorConfig,
    tapestry: Tapestry,
    env: Environment,
    bindings: HashMap<(ProgramId, BindingKey), Box<dyn Synapse>>,
    /// Program owning spans passed to [`Synaphor::execute`] directly
    loose_program: ProgramId,
    ego: Ego,
    buffer: Option<String>,
    context_index: usize,
}

impl Synaphor {
    /// Create an engine writing into `tapestry`.
    ///
    /// The tapestry gets an empty context if it has none, and the default
    /// (system) ego is active.
    pub fn new(loom: Arc<dyn Loom>, mut tapestry: Tapestry, env: Environment) -> Self {
        if tapestry.contexts().is_empty() {
            tapestry.new_context();
        }
        let context_index = tapestry.contexts().len() - 1;
        Self {
            loom,
            registry: Arc::new(ClassRegistry::new()),
            config: SynaphorConfig::default(),
            tapestry,
            env,
            bindings: HashMap::new(),
            loose_program: ProgramId::next(),
            ego: Ego::system(),
            buffer: None,
            context_index,
        }
    }

    /// Use `registry` to resolve class spans.
    pub fn with_registry(mut self, registry: Arc<ClassRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_config(mut self, config: SynaphorConfig) -> Self {
        self.config = config;
        self
    }

    /// Execute every span of `program` in order.
    ///
    /// Pending text is flushed when the program ends. On error the run stops
    /// at the failing span; text buffered before it is flushed so the
    /// tapestry shows everything up to the failure.
    ///
    /// # Errors
    ///
    /// - Undefined variables and unknown classes fail with a [`SynaphorError`].
    /// - Errors from the loom and from bound objects propagate unchanged.
    #[instrument(
        skip_all,
        fields(program = %program.id(), spans = program.spans().len(), loom = self.loom.name())
    )]
    pub async fn run(&mut self, program: &Synapseware) -> ErrloomResult<()> {
        for (index, span) in program.spans().iter().enumerate() {
            trace!(index, kind = span.kind_name(), "Executing span");
            if let Err(e) = self.execute_in(program.id(), span).await {
                warn!(index, kind = span.kind_name(), error = %e, "Span failed, stopping run");
                self.flush();
                return Err(e);
            }
        }
        self.flush();

        info!(
            contexts = self.tapestry.contexts().len(),
            fragments = self.tapestry.fragment_count(),
            samples = self.tapestry.samples().len(),
            "Synapseware run complete"
        );
        trace!("\n{}", self.tapestry);
        Ok(())
    }

    /// Execute a single span outside any program.
    ///
    /// Class spans executed this way bind objects in a namespace private to
    /// this engine, separate from every [`Synapseware`] it runs.
    pub async fn execute(&mut self, span: &Span) -> ErrloomResult<()> {
        self.execute_in(self.loose_program, span).await
    }

    async fn execute_in(&mut self, program: ProgramId, span: &Span) -> ErrloomResult<()> {
        match span {
            Span::Text(text) => {
                self.append_text(text.text());
                Ok(())
            }
            Span::Ego(ego) => {
                self.switch_ego(ego.ego().clone());
                Ok(())
            }
            Span::ContextBreak => {
                self.break_context();
                Ok(())
            }
            Span::Var(var) => self.interpolate(var),
            Span::Class(class) => self.invoke_class(program, class),
            Span::Sample(sample) => self.sample(sample).await,
        }
    }

    /// Append text to the fragment being built for the active ego.
    pub fn append_text(&mut self, text: &str) {
        self.buffer.get_or_insert_with(String::new).push_str(text);
    }

    /// Close the pending fragment and make `ego` the active speaker.
    pub fn switch_ego(&mut self, ego: Ego) {
        self.flush();
        debug!(from = %self.ego, to = %ego, "Switching ego");
        self.ego = ego;
        self.buffer = Some(String::new());
    }

    /// Close the pending fragment and start a new context.
    ///
    /// A context without fragments is reused rather than followed by another
    /// empty one.
    pub fn break_context(&mut self) {
        self.flush();
        let current_is_empty = self.tapestry.current_context().is_some_and(Context::is_empty);
        if current_is_empty {
            trace!(index = self.context_index, "Current context is empty, reusing it");
        } else {
            self.context_index = self.tapestry.new_context();
        }
    }

    /// Move pending text into the tapestry as a fragment of the active ego.
    pub fn flush(&mut self) {
        if let Some(text) = self.buffer.take()
            && !text.is_empty()
        {
            self.tapestry.add_fragment(Fragment::new(self.ego.clone(), text));
        }
    }

    fn interpolate(&mut self, span: &VarSpan) -> ErrloomResult<()> {
        let Some(value) = self.env.get(span.name()) else {
            return Err(SynaphorError::new(SynaphorErrorKind::UndefinedVariable(
                span.name().clone(),
            ))
            .into());
        };
        let wrapped = wrap_object(span.name(), &value.render());
        trace!(name = %span.name(), "Interpolating variable");
        self.append_text(&wrapped);
        Ok(())
    }

    #[instrument(skip_all, fields(class = %span.name(), key = %span.binding_key()))]
    fn invoke_class(&mut self, program: ProgramId, span: &ClassSpan) -> ErrloomResult<()> {
        let Some(factory) = self.registry.get(span.name()).cloned() else {
            return Err(
                SynaphorError::new(SynaphorErrorKind::UnknownClass(span.name().clone())).into(),
            );
        };

        let slot = (program, *span.binding_key());
        let (mut object, fresh) = match self.bindings.remove(&slot) {
            Some(object) => (object, false),
            None => {
                let object = factory(span.positional_args().as_slice(), span.named_args())
                    .map_err(|e| {
                        SynaphorError::new(SynaphorErrorKind::Construction {
                            class: span.name().clone(),
                            message: e.to_string(),
                        })
                    })?;
                debug!("Bound new object");
                (object, true)
            }
        };

        self.flush();
        let result = self.run_lifecycle(object.as_mut(), span, fresh);
        self.bindings.insert(slot, object);
        result
    }

    fn run_lifecycle(
        &mut self,
        object: &mut dyn Synapse,
        span: &ClassSpan,
        fresh: bool,
    ) -> ErrloomResult<()> {
        if fresh || *self.config.init_policy() == InitPolicy::EveryInvocation {
            trace!("Calling synapse_init");
            object.synapse_init(self, span)?;
        }

        let text = object.synapse(self, span)?;
        self.flush();
        if !text.is_empty() {
            self.tapestry
                .add_fragment(Fragment::new(self.ego.clone(), text.as_str()));
        }
        if let Some(target) = span.assign_name() {
            self.env.set(target.clone(), text);
        }

        trace!("Calling synapse_end");
        object.synapse_end(self, span)
    }

    #[instrument(skip_all, fields(tag = ?span.tag(), assign = ?span.assign_name()))]
    async fn sample(&mut self, span: &SampleSpan) -> ErrloomResult<()> {
        self.flush();

        let stop_sequences: Vec<String> = match span.tag() {
            Some(tag) => {
                self.tapestry
                    .add_fragment(Fragment::new(self.ego.clone(), format!("<{}>", tag)));
                self.loom.stop_sequence(tag).into_iter().collect()
            }
            None => Vec::new(),
        };

        let loom = Arc::clone(&self.loom);
        let mut generated = loom
            .sample(&self.tapestry, &stop_sequences, self.config.sample_options())
            .await?;

        if *self.config.strip_stop_sequence()
            && let Some(stripped) = stop_sequences
                .iter()
                .find_map(|stop| generated.strip_suffix(stop.as_str()))
        {
            generated = stripped.to_string();
        }
        debug!(len = generated.len(), "Received sample");

        let closing = span
            .tag()
            .as_ref()
            .map(|tag| format!("</{}>", tag))
            .unwrap_or_default();
        let content = format!("{}{}", generated, closing);
        if !content.is_empty() {
            self.tapestry
                .add_fragment(Fragment::sampled(self.ego.clone(), content));
        }
        self.tapestry.record_sample(self.ego.clone(), generated.as_str());

        if let Some(target) = span.assign_name() {
            self.env.set(target.clone(), generated);
        }
        Ok(())
    }

    /// The active ego.
    pub fn ego(&self) -> &Ego {
        &self.ego
    }

    pub fn tapestry(&self) -> &Tapestry {
        &self.tapestry
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn config(&self) -> &SynaphorConfig {
        &self.config
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// Index of the context receiving fragments.
    pub fn context_index(&self) -> usize {
        self.context_index
    }

    /// Text buffered for the active ego and not yet flushed.
    pub fn pending_text(&self) -> Option<&str> {
        self.buffer.as_deref()
    }

    /// Number of bound objects.
    ///
    /// An object whose hook is currently running is not counted.
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the class span `key` of `program` has a bound object.
    pub fn is_bound(&self, program: ProgramId, key: BindingKey) -> bool {
        self.bindings.contains_key(&(program, key))
    }

    /// Hand back the tapestry and environment.
    pub fn into_parts(self) -> (Tapestry, Environment) {
        (self.tapestry, self.env)
    }
}

impl std::fmt::Debug for Synaphor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synaphor")
            .field("loom", &self.loom.name())
            .field("ego", &self.ego)
            .field("context_index", &self.context_index)
            .field("bindings", &self.binding_count())
            .field("buffer", &self.buffer)
            .finish()
    }
}
