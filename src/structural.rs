//! Structural equality, inspection and diffing, dispatched through the type
//! registry.

use crate::engine::Engine;
use crate::errors::{ExpectError, ExpectResult};
use crate::pen::Pen;
use crate::types::Diff;
use crate::value::Value;

/// Recursive comparator handed to a type's `equal`.
pub struct Comparator<'a> {
    engine: &'a Engine,
    depth: usize,
    seen: &'a mut Vec<usize>,
}

impl Comparator<'_> {
    /// Compare two nested values.
    pub fn equal(&mut self, a: &Value, b: &Value) -> ExpectResult<bool> {
        self.engine.equal_at(a, b, self.depth + 1, &mut *self.seen)
    }
}

/// Bounded recursive printer handed to a type's `inspect`.
pub struct Inspector<'a> {
    engine: &'a Engine,
    depth: usize,
    ancestors: Vec<usize>,
}

impl Inspector<'_> {
    /// Print a nested value one level deeper.
    pub fn inspect(&mut self, value: &Value) -> Pen {
        let depth = self.depth.saturating_sub(1);
        self.print(value, depth)
    }

    fn print(&mut self, value: &Value, depth: usize) -> Pen {
        let mut output = Pen::new();
        if depth == 0 && value.is_composite() {
            output.text("...");
            return output;
        }

        let identity = value.identity();
        if let Some(id) = identity {
            if self.ancestors.contains(&id) {
                output.text("[Circular]");
                return output;
            }
            self.ancestors.push(id);
        }

        let ty = self.engine.types.resolve(value).clone();
        let outer_depth = std::mem::replace(&mut self.depth, depth);
        (ty.inspect)(&mut output, value, self);
        self.depth = outer_depth;

        if identity.is_some() {
            self.ancestors.pop();
        }
        output
    }
}

/// Recursive differ handed to a type's `diff`.
pub struct Differ<'a> {
    engine: &'a Engine,
}

impl Differ<'_> {
    pub fn diff(&self, a: &Value, b: &Value) -> Option<Diff> {
        self.engine.diff(a, b)
    }

    /// Print a value without a depth limit.
    pub fn inspect(&self, value: &Value) -> Pen {
        self.engine.inspect(value, Some(usize::MAX))
    }
}

impl Engine {
    /// Structural equality through the first type accepting both values.
    ///
    /// Values no type can compare together are unequal.
    pub fn equal(&self, a: &Value, b: &Value) -> ExpectResult<bool> {
        let mut seen = Vec::new();
        self.equal_at(a, b, 0, &mut seen)
    }

    pub(crate) fn equal_at(
        &self,
        a: &Value,
        b: &Value,
        depth: usize,
        seen: &mut Vec<usize>,
    ) -> ExpectResult<bool> {
        // Past the threshold every composite is remembered, so a cycle
        // eventually meets itself.
        if depth > self.config.circular_check_depth {
            if let Some(id) = a.identity() {
                if seen.contains(&id) {
                    return Err(ExpectError::CircularStructure);
                }
                seen.push(id);
            }
        }

        let Some(ty) = self.types.resolve_pair(a, b) else {
            return Ok(false);
        };
        let mut comparator = Comparator {
            engine: self,
            depth,
            seen,
        };
        (ty.equal)(a, b, &mut comparator)
    }

    /// Render a value, `depth` levels deep (the configured depth by default).
    pub fn inspect(&self, value: &Value, depth: Option<usize>) -> Pen {
        let depth = depth.unwrap_or(self.config.inspect_depth);
        let mut inspector = Inspector {
            engine: self,
            depth,
            ancestors: Vec::new(),
        };
        inspector.print(value, depth)
    }

    /// Diff two values through the first type accepting both.
    pub fn diff(&self, a: &Value, b: &Value) -> Option<Diff> {
        let ty = self.types.resolve_pair(a, b)?;
        (ty.diff)(a, b, Pen::new(), &Differ { engine: self })
    }
}
