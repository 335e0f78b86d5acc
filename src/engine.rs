//! The assertion engine: registration surface and evaluation entry points.

use crate::assertion::Assertion;
use crate::config::EngineConfig;
use crate::errors::{ConfigError, ExpectError, ExpectResult, UnknownAssertion, UnknownAssertionHint};
use crate::pen::Format;
use crate::registry::{AssertionRegistry, Handler};
use crate::suggest;
use crate::types::{Type, TypeRef, TypeRegistry, TypeSpec};
use crate::value::Value;
use std::fmt;
use std::panic::Location;
use std::rc::Rc;
use tracing::{debug, trace};

/// A bundle of types and assertions installed in one go.
pub trait Plugin {
    fn install(self, engine: &mut Engine) -> ExpectResult<()>;

    /// Name used when logging the installation.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Plugin for F
where
    F: FnOnce(&mut Engine) -> ExpectResult<()>,
{
    fn install(self, engine: &mut Engine) -> ExpectResult<()> {
        self(engine)
    }
}

/// An assertion name and its arguments, waiting for a subject.
///
/// Being an ordinary value, it can be wrapped with [`Value::opaque`] and
/// handed to a handler that applies it to parts of its own subject.
#[derive(Debug, Clone)]
pub struct Deferred {
    name: String,
    args: Vec<Value>,
    location: &'static Location<'static>,
}

impl Deferred {
    #[track_caller]
    pub fn new(name: impl Into<String>, args: &[Value]) -> Self {
        Self {
            name: name.into(),
            args: args.to_vec(),
            location: Location::caller(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Evaluate against `subject` as a top-level `expect` made where this
    /// was created.
    pub fn run(&self, engine: &Engine, subject: &Value) -> ExpectResult<()> {
        engine.expect_at(subject, &self.name, &self.args, self.location)
    }
}

/// A configured assertion engine.
///
/// Cloning takes a snapshot of every registration; the copies evolve
/// independently afterwards.
#[derive(Clone, Default)]
pub struct Engine {
    pub(crate) types: TypeRegistry,
    pub(crate) assertions: AssertionRegistry,
    pub(crate) config: EngineConfig,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn output_format(&self) -> Format {
        self.config.format
    }

    pub fn set_output_format(&mut self, format: Format) -> &mut Self {
        self.config.format = format;
        self
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn assertions(&self) -> &AssertionRegistry {
        &self.assertions
    }

    pub fn get_type(&self, name: &str) -> Option<&Rc<Type>> {
        self.types.get(name)
    }

    /// Register a type. It takes precedence over every earlier type.
    pub fn add_type(&mut self, spec: TypeSpec) -> ExpectResult<&mut Self> {
        let ty = self.types.register(spec)?;
        debug!(
            type_name = ty.name(),
            base = ty.base().map(|b| b.name()),
            "registered type"
        );
        Ok(self)
    }

    /// Register `handler` under every expansion of `patterns` for each type
    /// in `types`. An empty `types` slice registers on the universal type.
    pub fn add_assertion<H>(
        &mut self,
        types: &[TypeRef<'_>],
        patterns: &[&str],
        handler: H,
    ) -> ExpectResult<&mut Self>
    where
        H: Fn(&mut Assertion<'_>, &Value, &[Value]) -> ExpectResult<()> + 'static,
    {
        let targets = if types.is_empty() {
            vec![self.types.any().clone()]
        } else {
            types
                .iter()
                .map(|ty| {
                    self.types
                        .get(ty.name())
                        .cloned()
                        .ok_or_else(|| ConfigError::UnknownType(ty.name().to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        let handler: Handler = Rc::new(handler);
        let count = self.assertions.register(&targets, patterns, handler)?;
        debug!(
            patterns = ?patterns,
            types = ?targets.iter().map(|t| t.name()).collect::<Vec<_>>(),
            count,
            "registered assertion"
        );
        Ok(self)
    }

    pub fn install_plugin(&mut self, plugin: impl Plugin) -> ExpectResult<&mut Self> {
        debug!(plugin = plugin.name(), "installing plugin");
        plugin.install(self)?;
        Ok(self)
    }

    /// Evaluate the assertion `name` against `subject`.
    ///
    /// A failure that reaches this point is finalized and records the
    /// caller's location.
    #[track_caller]
    pub fn expect(&self, subject: &Value, name: &str, args: &[Value]) -> ExpectResult<()> {
        self.expect_at(subject, name, args, Location::caller())
    }

    /// Capture `name` and `args` now and evaluate them against a subject
    /// given later. Failures point at this call.
    #[track_caller]
    pub fn deferred(&self, name: &str, args: &[Value]) -> impl Fn(&Value) -> ExpectResult<()> + '_ {
        let deferred = Deferred::new(name, args);
        move |subject: &Value| deferred.run(self, subject)
    }

    fn expect_at(
        &self,
        subject: &Value,
        name: &str,
        args: &[Value],
        location: &'static Location<'static>,
    ) -> ExpectResult<()> {
        self.evaluate(subject, name, args).map_err(|err| match err {
            ExpectError::Failure(mut failure) => {
                if !failure.is_finalized() {
                    self.set_error_message(&mut failure);
                }
                failure.set_location(location);
                ExpectError::Failure(failure)
            }
            other => other,
        })
    }

    /// Evaluate with subject, name and arguments given positionally.
    #[track_caller]
    pub fn expect_values(&self, values: &[Value]) -> ExpectResult<()> {
        let [subject, name, args @ ..] = values else {
            return Err(ConfigError::MissingArguments.into());
        };
        let name = name.as_str().ok_or(ConfigError::NonStringAssertion)?;
        self.expect(subject, name, args)
    }

    pub(crate) fn evaluate(&self, subject: &Value, name: &str, args: &[Value]) -> ExpectResult<()> {
        let subject_type = self.types.resolve(subject);

        let mut ty = subject_type;
        let entry = loop {
            if let Some(entry) = self.assertions.find(ty.name(), name) {
                break entry;
            }
            match ty.base() {
                Some(base) => {
                    trace!(assertion = name, from = ty.name(), to = base.name(), "trying base type");
                    ty = base;
                }
                None => return Err(self.unknown_assertion(subject, subject_type, name).into()),
            }
        };

        trace!(assertion = name, type_name = ty.name(), "resolved assertion");
        let mut assertion = Assertion::new(self, subject, name, entry.flags.clone(), args);
        (entry.handler)(&mut assertion, subject, args)
    }

    fn unknown_assertion(&self, subject: &Value, subject_type: &Type, name: &str) -> UnknownAssertion {
        let defined_for: Vec<String> = self
            .types
            .iter()
            .filter(|ty| self.assertions.find(ty.name(), name).is_some())
            .map(|ty| ty.name().to_string())
            .collect();

        let hint = if defined_for.is_empty() {
            UnknownAssertionHint::DidYouMean(suggest::closest_assertion(
                &self.types,
                &self.assertions,
                subject,
                name,
            ))
        } else {
            UnknownAssertionHint::DefinedFor(defined_for)
        };
        debug!(assertion = name, type_name = subject_type.name(), hint = ?hint, "unknown assertion");

        UnknownAssertion {
            name: name.to_string(),
            type_name: subject_type.name().to_string(),
            hint,
        }
    }

    /// Every registered assertion name, sorted, without duplicates.
    pub fn assertion_names(&self) -> Vec<&str> {
        self.assertions.names().into_iter().collect()
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.assertion_names().join("\n"))
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("types", &self.types.len())
            .field("assertions", &self.assertions.len())
            .field("config", &self.config)
            .finish()
    }
}
