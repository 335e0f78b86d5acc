//! Error types for the assertion engine.
//!
//! Configuration errors report misuse of the registration surface and are
//! never rewritten by the engine. Assertion failures are the expected outcome
//! of a failing check and are the only errors that nested evaluation composes.

use crate::failure::AssertionFailure;
use std::fmt;
use thiserror::Error;

/// Errors raised while evaluating or configuring assertions.
#[derive(Debug, Error)]
pub enum ExpectError {
    /// Setup code misused the engine.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No assertion with the requested name applies to the subject.
    #[error(transparent)]
    UnknownAssertion(#[from] UnknownAssertion),

    /// Structural equality recursed past its threshold into a cycle.
    #[error("Cannot compare circular structures")]
    CircularStructure,

    /// An assertion failed.
    #[error("{0}")]
    Failure(Box<AssertionFailure>),
}

impl ExpectError {
    /// Whether this is an assertion failure rather than a programming error.
    pub fn is_failure(&self) -> bool {
        matches!(self, ExpectError::Failure(_))
    }

    /// Borrow the assertion failure, if this is one.
    pub fn as_failure(&self) -> Option<&AssertionFailure> {
        match self {
            ExpectError::Failure(failure) => Some(failure),
            _ => None,
        }
    }

    /// Take the assertion failure out, if this is one.
    pub fn into_failure(self) -> Option<Box<AssertionFailure>> {
        match self {
            ExpectError::Failure(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<AssertionFailure> for ExpectError {
    fn from(failure: AssertionFailure) -> Self {
        ExpectError::Failure(Box::new(failure))
    }
}

impl From<PatternError> for ExpectError {
    fn from(error: PatternError) -> Self {
        ExpectError::Config(error.into())
    }
}

/// Result type for engine operations.
pub type ExpectResult<T> = Result<T, ExpectError>;

/// Misuse of the registration or evaluation surface.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error(transparent)]
    InvalidPattern(#[from] PatternError),

    #[error("Cannot redefine assertion: {name}{}", for_type(.type_name))]
    Redefinition { name: String, type_name: String },

    #[error("No such type: {0}")]
    UnknownType(String),

    #[error("Unknown base type: {0}")]
    UnknownBaseType(String),

    #[error("A type must be given a non-empty name")]
    EmptyTypeName,

    #[error("A type named {0} is already registered")]
    DuplicateType(String),

    #[error("Unknown error mode: '{0}'")]
    UnknownErrorMode(String),

    #[error("Unknown output format: '{0}'")]
    UnknownFormat(String),

    #[error("The expect function requires at least two parameters.")]
    MissingArguments,

    #[error("The expect function requires the second parameter to be a string.")]
    NonStringAssertion,

    #[error("invalid engine configuration: {0}")]
    Toml(String),
}

fn for_type(type_name: &str) -> String {
    if type_name == crate::types::ANY {
        String::new()
    } else {
        format!(" for type {}", type_name)
    }
}

/// An assertion pattern that failed validation or expansion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}: '{pattern}'")]
pub struct PatternError {
    pub pattern: String,
    pub reason: PatternErrorKind,
}

impl PatternError {
    pub fn new(pattern: impl Into<String>, reason: PatternErrorKind) -> Self {
        Self {
            pattern: pattern.into(),
            reason,
        }
    }
}

/// Why a pattern was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PatternErrorKind {
    #[error("Assertion patterns must be a non empty string")]
    Empty,
    #[error("Assertion patterns can't start or end with whitespace")]
    SurroundingWhitespace,
    #[error("Assertion patterns must not contain flags with brackets")]
    NestedBracketsInFlag,
    #[error("Assertion patterns must not contain flags with parentheses")]
    ParenthesesInFlag,
    #[error("Assertion patterns must not contain empty flags")]
    EmptyFlag,
    #[error("Assertion patterns must not contain alternations with parentheses")]
    NestedParenthesesInAlternation,
    #[error("Assertion patterns must not contain alternations with brackets")]
    BracketsInAlternation,
    #[error("Assertion patterns must not contain empty alternations")]
    EmptyAlternation,
    #[error("Assertion patterns must not contain unbalanced brackets")]
    UnbalancedBrackets,
    #[error("Assertion patterns must not contain unbalanced parentheses")]
    UnbalancedParentheses,
    #[error("Assertion patterns must not only contain flags")]
    OnlyFlags,
}

/// An assertion name that could not be resolved for a subject.
#[derive(Debug, Clone, Error)]
pub struct UnknownAssertion {
    /// The requested assertion name.
    pub name: String,
    /// The type the subject resolved to.
    pub type_name: String,
    pub hint: UnknownAssertionHint,
}

/// Debugging aid attached to an [`UnknownAssertion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownAssertionHint {
    /// The name exists, but only for these (incompatible) types.
    DefinedFor(Vec<String>),
    /// The closest registered name, if any assertion is registered at all.
    DidYouMean(Option<String>),
}

impl UnknownAssertion {
    /// The suggested replacement name, if one was computed.
    pub fn suggestion(&self) -> Option<&str> {
        match &self.hint {
            UnknownAssertionHint::DidYouMean(suggestion) => suggestion.as_deref(),
            UnknownAssertionHint::DefinedFor(_) => None,
        }
    }
}

impl fmt::Display for UnknownAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hint {
            UnknownAssertionHint::DefinedFor(types) => {
                write!(
                    f,
                    "The assertion \"{}\" is not defined for the type \"{}\", but it is defined for ",
                    self.name, self.type_name
                )?;
                if let [single] = types.as_slice() {
                    write!(f, "the type \"{}\"", single)
                } else {
                    let quoted = types
                        .iter()
                        .map(|t| format!("\"{}\"", t))
                        .collect::<Vec<_>>()
                        .join(", ");
                    write!(f, "these types: {}", quoted)
                }
            }
            UnknownAssertionHint::DidYouMean(Some(suggestion)) => write!(
                f,
                "Unknown assertion \"{}\", did you mean: \"{}\"",
                self.name, suggestion
            ),
            UnknownAssertionHint::DidYouMean(None) => {
                write!(f, "Unknown assertion \"{}\"", self.name)
            }
        }
    }
}
