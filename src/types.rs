//! Type registry: named classifiers over [`Value`]s.
//!
//! Types are kept newest first behind the universal `any` type. Resolving a
//! value returns the first type whose `identify` accepts it, so a later,
//! narrower registration shadows an earlier, broader one.

use crate::errors::{ConfigError, ExpectResult};
use crate::pen::Pen;
use crate::structural::{Comparator, Differ, Inspector};
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Name of the universal fallback type.
pub const ANY: &str = "any";

pub type IdentifyFn = Rc<dyn Fn(&Value) -> bool>;
pub type EqualFn = Rc<dyn Fn(&Value, &Value, &mut Comparator<'_>) -> ExpectResult<bool>>;
pub type InspectFn = Rc<dyn Fn(&mut Pen, &Value, &mut Inspector<'_>)>;
pub type DiffFn = Rc<dyn Fn(&Value, &Value, Pen, &Differ<'_>) -> Option<Diff>>;

/// A computed difference between two values.
#[derive(Debug, Clone, PartialEq)]
pub struct Diff {
    pub output: Pen,
    /// Shown directly below the message, without a `Diff:` heading.
    pub inline: bool,
}

impl Diff {
    pub fn new(output: Pen) -> Self {
        Self {
            output,
            inline: false,
        }
    }

    pub fn inline(output: Pen) -> Self {
        Self {
            output,
            inline: true,
        }
    }
}

/// A registered type with every behavior resolved.
pub struct Type {
    name: String,
    base: Option<Rc<Type>>,
    identify: IdentifyFn,
    pub(crate) equal: EqualFn,
    pub(crate) inspect: InspectFn,
    pub(crate) diff: DiffFn,
}

impl Type {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parent type. Only the universal type has none.
    pub fn base(&self) -> Option<&Rc<Type>> {
        self.base.as_ref()
    }

    pub fn identify(&self, value: &Value) -> bool {
        (self.identify)(value)
    }

    pub fn is_any(&self) -> bool {
        self.base.is_none()
    }

    fn any() -> Self {
        Self {
            name: ANY.to_string(),
            base: None,
            identify: Rc::new(|_: &Value| true),
            equal: Rc::new(
                |a: &Value, b: &Value, _: &mut Comparator<'_>| -> ExpectResult<bool> {
                    Ok(a.strict_eq(b))
                },
            ),
            inspect: Rc::new(|output: &mut Pen, value: &Value, _: &mut Inspector<'_>| {
                output.text(value.to_string());
            }),
            diff: Rc::new(|_: &Value, _: &Value, _: Pen, _: &Differ<'_>| -> Option<Diff> {
                None
            }),
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Type")
            .field("name", &self.name)
            .field("base", &self.base.as_ref().map(|b| b.name.as_str()))
            .finish()
    }
}

/// Declaration of a type to register. Unset behaviors are inherited from
/// the base type.
#[derive(Default)]
pub struct TypeSpec {
    name: String,
    base: Option<String>,
    identify: Option<IdentifyFn>,
    equal: Option<EqualFn>,
    inspect: Option<InspectFn>,
    diff: Option<DiffFn>,
}

impl TypeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn identify(mut self, identify: impl Fn(&Value) -> bool + 'static) -> Self {
        self.identify = Some(Rc::new(identify));
        self
    }

    pub fn equal(
        mut self,
        equal: impl Fn(&Value, &Value, &mut Comparator<'_>) -> ExpectResult<bool> + 'static,
    ) -> Self {
        self.equal = Some(Rc::new(equal));
        self
    }

    pub fn inspect(mut self, inspect: impl Fn(&mut Pen, &Value, &mut Inspector<'_>) + 'static) -> Self {
        self.inspect = Some(Rc::new(inspect));
        self
    }

    pub fn diff(
        mut self,
        diff: impl Fn(&Value, &Value, Pen, &Differ<'_>) -> Option<Diff> + 'static,
    ) -> Self {
        self.diff = Some(Rc::new(diff));
        self
    }
}

/// Reference to a registered type, by name or by the type itself.
#[derive(Debug, Clone, Copy)]
pub enum TypeRef<'a> {
    Name(&'a str),
    Type(&'a Type),
}

impl TypeRef<'_> {
    pub fn name(&self) -> &str {
        match self {
            TypeRef::Name(name) => name,
            TypeRef::Type(ty) => ty.name(),
        }
    }
}

impl<'a> From<&'a str> for TypeRef<'a> {
    fn from(name: &'a str) -> Self {
        TypeRef::Name(name)
    }
}

impl<'a> From<&'a Type> for TypeRef<'a> {
    fn from(ty: &'a Type) -> Self {
        TypeRef::Type(ty)
    }
}

impl<'a> From<&'a Rc<Type>> for TypeRef<'a> {
    fn from(ty: &'a Rc<Type>) -> Self {
        TypeRef::Type(ty)
    }
}

/// Ordered collection of types, newest first, ending with `any`.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: Vec<Rc<Type>>,
    by_name: HashMap<String, Rc<Type>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let any = Rc::new(Type::any());
        let mut by_name = HashMap::new();
        by_name.insert(ANY.to_string(), any.clone());
        Self {
            types: vec![any],
            by_name,
        }
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first type, newest first, that accepts the value.
    pub fn resolve(&self, value: &Value) -> &Rc<Type> {
        self.types
            .iter()
            .find(|ty| ty.identify(value))
            .unwrap_or_else(|| self.any())
    }

    /// The first type that accepts both values.
    pub fn resolve_pair(&self, a: &Value, b: &Value) -> Option<&Rc<Type>> {
        self.types
            .iter()
            .find(|ty| ty.identify(a) && ty.identify(b))
    }

    pub fn get(&self, name: &str) -> Option<&Rc<Type>> {
        self.by_name.get(name)
    }

    pub fn any(&self) -> &Rc<Type> {
        &self.by_name[ANY]
    }

    /// Types from the most recently registered to `any`.
    pub fn iter(&self) -> std::slice::Iter<'_, Rc<Type>> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub(crate) fn register(&mut self, spec: TypeSpec) -> Result<Rc<Type>, ConfigError> {
        if spec.name.trim().is_empty() {
            return Err(ConfigError::EmptyTypeName);
        }
        if self.by_name.contains_key(&spec.name) {
            return Err(ConfigError::DuplicateType(spec.name));
        }

        let base = match &spec.base {
            Some(name) => self
                .get(name)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownBaseType(name.clone()))?,
            None => self.any().clone(),
        };

        let ty = Rc::new(Type {
            identify: spec.identify.unwrap_or_else(|| base.identify.clone()),
            equal: spec.equal.unwrap_or_else(|| base.equal.clone()),
            inspect: spec.inspect.unwrap_or_else(|| base.inspect.clone()),
            diff: spec.diff.unwrap_or_else(|| base.diff.clone()),
            name: spec.name,
            base: Some(base),
        });

        self.by_name.insert(ty.name.clone(), ty.clone());
        self.types.insert(0, ty.clone());
        Ok(ty)
    }
}
