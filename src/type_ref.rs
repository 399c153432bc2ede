//! Structural type references.
//!
//! The resolver never touches host-compiler symbol handles. Every type it
//! reasons about is a [`TypeRef`]: a comparable value made of a namespace, a
//! name, and nested generic arguments, with structural equality and hashing.
//! Open generic definitions carry [`TypeKind::GenericParam`] placeholders as
//! their arguments; constructed types carry concrete `TypeRef`s.

use std::collections::HashMap;
use std::fmt;

/// Distinguishes concrete named types from unbound generic parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TypeKind {
    /// A named type, possibly a generic instantiation.
    Named,
    /// An unbound type parameter (`T` in `Repo<T>`).
    GenericParam,
}

/// A structural reference to a type.
///
/// Equality, hashing, and ordering are fully structural, so `TypeRef` can be
/// used as a map key and sorted into a locale-independent, reproducible
/// order (plain `String` ordering is ordinal).
///
/// # Examples
///
/// ```
/// use ferrous_graph::TypeRef;
///
/// let user = TypeRef::named("app", "User");
/// let repo = TypeRef::generic("app", "Repository", vec![user.clone()]);
/// assert_eq!(repo.fully_qualified(), "app.Repository<app.User>");
/// assert!(!repo.is_open_generic());
///
/// let open = TypeRef::generic("app", "Repository", vec![TypeRef::param("T")]);
/// assert!(open.is_open_generic());
/// assert!(open.same_generic(&repo));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TypeRef {
    /// Namespace or module path, `None` for global types and parameters.
    pub namespace: Option<String>,
    /// The type's own name, without arity markers.
    pub name: String,
    /// Generic arguments; empty for non-generic types.
    pub args: Vec<TypeRef>,
    /// Named type or generic parameter.
    pub kind: TypeKind,
}

impl TypeRef {
    /// A non-generic named type.
    pub fn named(namespace: &str, name: &str) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            name: name.to_string(),
            args: Vec::new(),
            kind: TypeKind::Named,
        }
    }

    /// A non-generic type without a namespace.
    pub fn global(name: &str) -> Self {
        Self {
            namespace: None,
            name: name.to_string(),
            args: Vec::new(),
            kind: TypeKind::Named,
        }
    }

    /// A generic type. Pass [`TypeRef::param`] arguments to build an open
    /// generic definition, concrete arguments to build an instantiation.
    pub fn generic(namespace: &str, name: &str, args: Vec<TypeRef>) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            name: name.to_string(),
            args,
            kind: TypeKind::Named,
        }
    }

    /// An unbound generic parameter placeholder.
    pub fn param(name: &str) -> Self {
        Self {
            namespace: None,
            name: name.to_string(),
            args: Vec::new(),
            kind: TypeKind::GenericParam,
        }
    }

    /// Number of generic arguments.
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// True if this type still contains unbound generic parameters.
    pub fn is_open_generic(&self) -> bool {
        match self.kind {
            TypeKind::GenericParam => true,
            TypeKind::Named => self.args.iter().any(TypeRef::is_open_generic),
        }
    }

    /// True if `self` and `other` refer to the same generic definition:
    /// same namespace, name, and arity, regardless of arguments.
    pub fn same_generic(&self, other: &TypeRef) -> bool {
        self.kind == TypeKind::Named
            && other.kind == TypeKind::Named
            && self.namespace == other.namespace
            && self.name == other.name
            && self.args.len() == other.args.len()
    }

    /// The names of this definition's generic parameters, in declaration
    /// order. Arguments that are not parameters are skipped, so this is only
    /// meaningful on open generic definitions.
    pub fn param_names(&self) -> Vec<&str> {
        self.args
            .iter()
            .filter(|a| a.kind == TypeKind::GenericParam)
            .map(|a| a.name.as_str())
            .collect()
    }

    /// Replaces generic parameters by name according to `mapping`.
    pub fn substitute(&self, mapping: &HashMap<String, TypeRef>) -> TypeRef {
        match self.kind {
            TypeKind::GenericParam => mapping
                .get(&self.name)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            TypeKind::Named => TypeRef {
                namespace: self.namespace.clone(),
                name: self.name.clone(),
                args: self.args.iter().map(|a| a.substitute(mapping)).collect(),
                kind: TypeKind::Named,
            },
        }
    }

    /// Builds the substitution mapping a definition's parameters to the
    /// request's type arguments, positionally.
    pub fn substitution(definition: &TypeRef, args: &[TypeRef]) -> HashMap<String, TypeRef> {
        definition
            .args
            .iter()
            .zip(args.iter())
            .filter(|(p, _)| p.kind == TypeKind::GenericParam)
            .map(|(p, a)| (p.name.clone(), a.clone()))
            .collect()
    }

    /// Fully qualified display form, `namespace.Name<args...>`. Used for the
    /// deterministic ordering in naming assignment; `String` comparison over
    /// this form is ordinal and locale-independent.
    pub fn fully_qualified(&self) -> String {
        let mut out = String::new();
        self.write_fq(&mut out);
        out
    }

    fn write_fq(&self, out: &mut String) {
        if let Some(ns) = &self.namespace {
            out.push_str(ns);
            out.push('.');
        }
        out.push_str(&self.name);
        if !self.args.is_empty() {
            out.push('<');
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                arg.write_fq(out);
            }
            out.push('>');
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fully_qualified())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitution_closes_open_generic() {
        let open = TypeRef::generic("app", "Repository", vec![TypeRef::param("T")]);
        let user = TypeRef::named("app", "User");
        let mapping = TypeRef::substitution(&open, std::slice::from_ref(&user));
        let closed = open.substitute(&mapping);
        assert_eq!(closed, TypeRef::generic("app", "Repository", vec![user]));
        assert!(!closed.is_open_generic());
    }

    #[test]
    fn nested_open_args_are_detected() {
        let inner = TypeRef::generic("app", "List", vec![TypeRef::param("T")]);
        let outer = TypeRef::generic("app", "Cache", vec![inner]);
        assert!(outer.is_open_generic());
    }

    #[test]
    fn fully_qualified_is_structural() {
        let a = TypeRef::generic(
            "app",
            "Map",
            vec![TypeRef::named("app", "Key"), TypeRef::global("Value")],
        );
        assert_eq!(a.fully_qualified(), "app.Map<app.Key, Value>");
    }
}
