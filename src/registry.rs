//! Assertion registry keyed by `(type name, concrete assertion name)`.

use crate::assertion::Assertion;
use crate::errors::{ConfigError, ExpectResult};
use crate::pattern::{self, Flags};
use crate::types::Type;
use crate::value::Value;
use indexmap::{Equivalent, IndexMap};
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

/// Handler invoked with the assertion context, the subject and the extra
/// arguments.
pub type Handler = Rc<dyn Fn(&mut Assertion<'_>, &Value, &[Value]) -> ExpectResult<()>>;

/// A registered handler with the flags of the name variant it answers to.
#[derive(Clone)]
pub struct AssertionEntry {
    pub handler: Handler,
    pub flags: Flags,
}

impl fmt::Debug for AssertionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssertionEntry")
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssertionKey {
    pub type_name: String,
    pub name: String,
}

impl AssertionKey {
    fn new(type_name: &str, name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            name: name.to_string(),
        }
    }
}

/// Borrowed form of [`AssertionKey`]; hashes identically.
#[derive(Hash)]
struct KeyRef<'a> {
    type_name: &'a str,
    name: &'a str,
}

impl Equivalent<AssertionKey> for KeyRef<'_> {
    fn equivalent(&self, key: &AssertionKey) -> bool {
        self.type_name == key.type_name && self.name == key.name
    }
}

/// All registered assertions, in registration order.
#[derive(Debug, Clone, Default)]
pub struct AssertionRegistry {
    entries: IndexMap<AssertionKey, AssertionEntry>,
}

impl AssertionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the handler registered for a type under a concrete name.
    pub fn find(&self, type_name: &str, name: &str) -> Option<&AssertionEntry> {
        self.entries.get(&KeyRef { type_name, name })
    }

    /// Concrete names registered directly on a type, in registration order.
    pub fn names_for<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .keys()
            .filter(move |key| key.type_name == type_name)
            .map(|key| key.name.as_str())
    }

    /// Every concrete name across all types, sorted and deduplicated.
    pub fn names(&self) -> BTreeSet<&str> {
        self.entries.keys().map(|key| key.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register a handler for every expansion of every pattern on every type.
    ///
    /// All pairs are checked before any is stored: a failing call leaves the
    /// registry untouched. Expansions that coincide within one call are
    /// registered once, with the flags of the first.
    pub(crate) fn register(
        &mut self,
        types: &[Rc<Type>],
        patterns: &[&str],
        handler: Handler,
    ) -> Result<usize, ConfigError> {
        let mut expansions = Vec::new();
        for pattern in patterns {
            expansions.extend(pattern::expand(pattern)?);
        }

        let mut pending: IndexMap<AssertionKey, AssertionEntry> = IndexMap::new();
        for ty in types {
            for expansion in &expansions {
                let key = AssertionKey::new(ty.name(), &expansion.text);
                if pending.contains_key(&key) {
                    continue;
                }
                if self.entries.contains_key(&key) {
                    return Err(ConfigError::Redefinition {
                        name: key.name,
                        type_name: key.type_name,
                    });
                }
                pending.insert(
                    key,
                    AssertionEntry {
                        handler: handler.clone(),
                        flags: expansion.flags.clone(),
                    },
                );
            }
        }

        let count = pending.len();
        self.entries.extend(pending);
        Ok(count)
    }
}
