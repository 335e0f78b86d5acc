//! Assertion failures and their rendering.

use crate::engine::Engine;
use crate::errors::{ExpectError, ExpectResult};
use crate::pen::{Format, Pen, Style};
use crate::value::Value;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::panic::Location;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\d+\}").unwrap());

const DEFAULT_TEMPLATE: &str = "explicit failure";

/// An argument substituted into a failure template.
#[derive(Debug, Clone)]
pub enum FailArg {
    Text(String),
    /// A document appended as-is, keeping its styling and line structure.
    Doc(Pen),
}

impl From<&str> for FailArg {
    fn from(text: &str) -> Self {
        FailArg::Text(text.to_string())
    }
}

impl From<String> for FailArg {
    fn from(text: String) -> Self {
        FailArg::Text(text)
    }
}

impl From<Pen> for FailArg {
    fn from(pen: Pen) -> Self {
        FailArg::Doc(pen)
    }
}

impl From<&Pen> for FailArg {
    fn from(pen: &Pen) -> Self {
        FailArg::Doc(pen.clone())
    }
}

impl From<&Value> for FailArg {
    fn from(value: &Value) -> Self {
        FailArg::Text(value.to_string())
    }
}

impl From<Value> for FailArg {
    fn from(value: Value) -> Self {
        FailArg::Text(value.to_string())
    }
}

/// A failed assertion.
///
/// The `output` document is the message body. `actual` and `expected`, when
/// both set, are diffed once as the message is finalized and then dropped.
#[derive(Debug, Clone)]
pub struct AssertionFailure {
    pub output: Pen,
    pub actual: Option<Value>,
    pub expected: Option<Value>,
    message: String,
    html_message: Option<String>,
    finalized: bool,
    location: Option<&'static Location<'static>>,
}

impl AssertionFailure {
    pub fn new(output: Pen) -> Self {
        Self {
            output,
            actual: None,
            expected: None,
            message: String::new(),
            html_message: None,
            finalized: false,
            location: None,
        }
    }

    /// Attach the compared values so a diff is added to the message.
    pub fn with_values(mut self, actual: Value, expected: Value) -> Self {
        self.actual = Some(actual);
        self.expected = Some(expected);
        self
    }

    /// The rendered message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The HTML rendering, present when the engine renders to HTML.
    pub fn html_message(&self) -> Option<&str> {
        self.html_message.as_deref()
    }

    /// Where the top-level evaluation that produced this failure was called.
    pub fn location(&self) -> Option<&'static Location<'static>> {
        self.location
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub(crate) fn set_location(&mut self, location: &'static Location<'static>) {
        self.location = Some(location);
    }
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.finalized {
            f.write_str(&self.message)
        } else {
            write!(f, "{}", self.output)
        }
    }
}

impl std::error::Error for AssertionFailure {}

/// Fill `{n}` placeholders of a template with the matching arguments.
///
/// Placeholders without a matching argument are kept literally.
pub fn render_template(template: &str, args: &[FailArg]) -> Pen {
    let template = if template.is_empty() {
        DEFAULT_TEMPLATE
    } else {
        template
    };

    let mut output = Pen::new();
    let mut last = 0;
    for placeholder in PLACEHOLDER.find_iter(template) {
        output.text(&template[last..placeholder.start()]);
        let token = placeholder.as_str();
        let arg = token[1..token.len() - 1]
            .parse::<usize>()
            .ok()
            .and_then(|idx| args.get(idx));
        match arg {
            Some(FailArg::Text(text)) => output.text(text),
            Some(FailArg::Doc(pen)) => output.append(pen),
            None => output.text(token),
        };
        last = placeholder.end();
    }
    output.text(&template[last..]);
    output
}

impl Engine {
    /// Build an unfinalized failure from a template.
    pub fn failure(&self, template: &str, args: &[FailArg]) -> AssertionFailure {
        AssertionFailure::new(render_template(template, args))
    }

    /// Build an unfinalized failure by writing into a fresh document.
    pub fn failure_with(&self, build: impl FnOnce(&mut Pen)) -> AssertionFailure {
        let mut output = Pen::new();
        build(&mut output);
        AssertionFailure::new(output)
    }

    /// Fail with a message rendered from a template.
    #[track_caller]
    pub fn fail(&self, template: &str, args: &[FailArg]) -> ExpectResult<()> {
        let failure = self.failure(template, args);
        Err(self.finalize(failure, Location::caller()))
    }

    /// Fail with a message written by `build`.
    #[track_caller]
    pub fn fail_with(&self, build: impl FnOnce(&mut Pen)) -> ExpectResult<()> {
        let failure = self.failure_with(build);
        Err(self.finalize(failure, Location::caller()))
    }

    /// Raise an existing error unchanged.
    pub fn fail_error(&self, error: impl Into<ExpectError>) -> ExpectResult<()> {
        Err(error.into())
    }

    fn finalize(&self, mut failure: AssertionFailure, location: &'static Location<'static>) -> ExpectError {
        self.set_error_message(&mut failure);
        failure.set_location(location);
        failure.into()
    }

    /// Render the failure's message, adding a diff section when its values
    /// are comparable.
    pub(crate) fn set_error_message(&self, failure: &mut AssertionFailure) {
        let mut message = failure.output.clone();

        if let (Some(actual), Some(expected)) = (failure.actual.take(), failure.expected.take()) {
            let kind = actual.diff_kind();
            if kind.is_some() && kind == expected.diff_kind() {
                if let Some(diff) = self.diff(&actual, &expected) {
                    message.nl_n(2);
                    if !diff.inline {
                        message.styled(Style::DiffLabel, "Diff:").nl_n(2);
                    }
                    message.append(&diff.output);
                }
            }
        }

        let format = match self.config.format {
            Format::Html => {
                failure.html_message = Some(message.render(Format::Html));
                Format::Text
            }
            other => other,
        };
        failure.message = message.render(format);
        failure.output = message;
        failure.finalized = true;
    }
}
