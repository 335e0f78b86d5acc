#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! An extensible assertion engine.
//!
//! Callers register *types* (named classifiers over [`Value`]s with
//! equality, inspection and diff behavior) and *assertions* (handlers
//! registered under name patterns such as `"[not] to (equal|be)"`), then
//! evaluate an assertion by name against a subject.
//!
//! ```
//! use layered_expect::{Engine, TypeSpec, Value};
//!
//! let mut engine = Engine::new();
//! engine.add_type(TypeSpec::new("number").identify(|v| v.as_number().is_some()))?;
//! engine.add_assertion(&["number".into()], &["[not] to be positive"], |a, subject, _| {
//!     let positive = subject.as_number().map_or(false, |n| n > 0.0);
//!     if positive == a.flag("not") {
//!         a.fail("", &[])
//!     } else {
//!         Ok(())
//!     }
//! })?;
//!
//! engine.expect(&Value::from(3), "to be positive", &[])?;
//! let err = engine.expect(&Value::from(3), "not to be positive", &[]).unwrap_err();
//! assert_eq!(err.to_string(), "expected 3 not to be positive");
//! # Ok::<(), layered_expect::ExpectError>(())
//! ```
//!
//! ## Modules
//!
//! - [`value`] - The dynamic values assertions run against
//! - [`pattern`] - Assertion name patterns and their expansion
//! - [`types`] - The type registry
//! - [`structural`] - Equality, inspection and diffs dispatched by type
//! - [`registry`] - Assertions keyed by type and concrete name
//! - [`engine`] - Registration, evaluation and deferred assertions
//! - [`assertion`] - The context handlers run in, and failure composition
//! - [`failure`] - Failure values and message rendering
//! - [`pen`] - Styled output documents
//! - [`config`] - Engine configuration, loadable from TOML
//! - [`errors`] - Error types

pub mod assertion;
pub mod config;
pub mod engine;
pub mod errors;
pub mod failure;
pub mod pattern;
pub mod pen;
pub mod registry;
pub mod structural;
mod suggest;
pub mod types;
pub mod value;

pub use assertion::{Assertion, ErrorMode};
pub use config::EngineConfig;
pub use engine::{Deferred, Engine, Plugin};
pub use errors::{
    ConfigError, ExpectError, ExpectResult, PatternError, PatternErrorKind, UnknownAssertion,
    UnknownAssertionHint,
};
pub use failure::{AssertionFailure, FailArg};
pub use pattern::{expand, ExpandedPattern, Flags};
pub use pen::{Format, Pen, Style};
pub use structural::{Comparator, Differ, Inspector};
pub use types::{Diff, Type, TypeRef, TypeSpec, ANY};
pub use value::{DiffKind, Value};

#[cfg(test)]
mod tests;
