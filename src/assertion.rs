//! The context a handler runs in.
//!
//! An [`Assertion`] carries the resolved subject, the concrete assertion
//! name, its flags and arguments. Nested checks and explicit failures go
//! through it so that a failure coming back from a nested call is rewritten
//! exactly once, at this frame, according to the [`ErrorMode`].

use crate::engine::{Deferred, Engine};
use crate::errors::{ConfigError, ExpectError, ExpectResult};
use crate::failure::{AssertionFailure, FailArg};
use crate::pattern::Flags;
use crate::pen::Pen;
use crate::types::Diff;
use crate::value::Value;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::str::FromStr;
use unicode_width::UnicodeWidthStr;

static FLAG_MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(!?)([^\]]+)\] ?").unwrap());

const PREAMBLE: &str = "expected";

/// How a failure from a nested check is merged into this assertion's message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Only this assertion's standard message.
    #[default]
    Default,
    /// Only the nested failure's message.
    Bubble,
    /// The standard message with the nested message indented below it.
    Nested,
}

impl FromStr for ErrorMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(ErrorMode::Default),
            "bubble" => Ok(ErrorMode::Bubble),
            "nested" => Ok(ErrorMode::Nested),
            other => Err(ConfigError::UnknownErrorMode(other.to_string())),
        }
    }
}

/// Per-evaluation state handed to a handler.
#[derive(Debug)]
pub struct Assertion<'a> {
    engine: &'a Engine,
    subject: &'a Value,
    name: String,
    flags: Flags,
    args: &'a [Value],
    pub error_mode: ErrorMode,
    nesting_level: usize,
}

impl<'a> Assertion<'a> {
    pub(crate) fn new(
        engine: &'a Engine,
        subject: &'a Value,
        name: &str,
        flags: Flags,
        args: &'a [Value],
    ) -> Self {
        Self {
            engine,
            subject,
            name: name.to_string(),
            flags,
            args,
            error_mode: ErrorMode::Default,
            nesting_level: 0,
        }
    }

    pub fn subject(&self) -> &Value {
        self.subject
    }

    /// The concrete name this assertion was invoked under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Value] {
        self.args
    }

    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    /// Whether a flag is switched on. Unknown flags are off.
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn engine(&self) -> &Engine {
        self.engine
    }

    /// Set the error mode from its name.
    pub fn set_error_mode(&mut self, mode: &str) -> Result<(), ConfigError> {
        self.error_mode = mode.parse()?;
        Ok(())
    }

    pub fn equal(&self, a: &Value, b: &Value) -> ExpectResult<bool> {
        self.engine.equal(a, b)
    }

    pub fn inspect(&self, value: &Value) -> Pen {
        self.engine.inspect(value, None)
    }

    pub fn diff(&self, a: &Value, b: &Value) -> Option<Diff> {
        self.engine.diff(a, b)
    }

    /// Run another assertion from inside this one.
    ///
    /// `[flag] ` and `[!flag] ` markers in `name` are replaced by the flag
    /// word when the flag's state matches the marker, and dropped otherwise.
    pub fn expect(&mut self, subject: &Value, name: &str, args: &[Value]) -> ExpectResult<()> {
        let name = rewrite_flag_markup(name, &self.flags);
        self.in_nested_context(|engine| engine.evaluate(subject, &name, args))
    }

    /// Apply a captured assertion to `subject` as a nested check.
    pub fn expect_deferred(&mut self, deferred: &Deferred, subject: &Value) -> ExpectResult<()> {
        self.in_nested_context(|engine| engine.evaluate(subject, deferred.name(), deferred.args()))
    }

    /// Fail with a message rendered from a template.
    pub fn fail(&mut self, template: &str, args: &[FailArg]) -> ExpectResult<()> {
        self.in_nested_context(|engine| engine.fail(template, args))
    }

    /// Fail with a message written by `build`.
    pub fn fail_with(&mut self, build: impl FnOnce(&mut Pen)) -> ExpectResult<()> {
        self.in_nested_context(|engine| engine.fail_with(build))
    }

    /// Raise an error. Assertion failures are composed like nested ones.
    pub fn fail_error(&mut self, error: impl Into<ExpectError>) -> ExpectResult<()> {
        let error = error.into();
        self.in_nested_context(|engine| engine.fail_error(error))
    }

    /// This assertion's own failure message, independent of nested failures.
    pub fn standard_error_message(&self) -> Pen {
        let subject = self.engine.inspect(self.subject, None);
        let mut args = Pen::new();
        for (index, arg) in self.args.iter().enumerate() {
            if index > 0 {
                args.text(", ");
            }
            args.append(&self.engine.inspect(arg, None));
        }

        let subject_size = subject.size();
        let args_size = args.size();
        let width = PREAMBLE.len()
            + subject_size.width
            + args_size.width
            + UnicodeWidthStr::width(self.name.as_str());
        let height = subject_size.height.max(args_size.height);

        let mut output = Pen::new();
        output.error(PREAMBLE);
        if subject_size.height > 1 {
            output.nl();
        } else {
            output.sp();
        }
        output.append(&subject);
        if subject_size.height > 1 || (height == 1 && width > self.engine.config.line_width) {
            output.nl();
        } else {
            output.sp();
        }
        output.error(&self.name);
        if args_size.height > 1 {
            output.nl();
        } else if args_size.width > 0 {
            output.sp();
        }
        output.append(&args);
        output
    }

    fn in_nested_context(
        &mut self,
        call: impl FnOnce(&Engine) -> ExpectResult<()>,
    ) -> ExpectResult<()> {
        self.nesting_level += 1;
        let result = call(self.engine);
        self.nesting_level -= 1;

        match result {
            Err(ExpectError::Failure(failure)) if self.nesting_level == 0 => {
                Err(self.compose(failure))
            }
            other => other,
        }
    }

    fn compose(&self, mut failure: Box<AssertionFailure>) -> ExpectError {
        let inner = std::mem::take(&mut failure.output);
        failure.output = match self.error_mode {
            ErrorMode::Nested => {
                let mut output = self.standard_error_message();
                output.nl().indent_lines().i().block(inner);
                output
            }
            ErrorMode::Default => self.standard_error_message(),
            ErrorMode::Bubble => inner,
        };
        self.engine.set_error_message(&mut failure);
        ExpectError::Failure(failure)
    }
}

/// Resolve `[flag] ` / `[!flag] ` markers against a flag assignment.
pub fn rewrite_flag_markup(name: &str, flags: &Flags) -> String {
    let rewritten = FLAG_MARKUP.replace_all(name, |caps: &Captures<'_>| {
        let negated = !caps[1].is_empty();
        let flag = &caps[2];
        if flags.get(flag).copied().unwrap_or(false) != negated {
            format!("{} ", flag)
        } else {
            String::new()
        }
    });
    rewritten.trim().to_string()
}
