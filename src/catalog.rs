//! Structural type facts supplied by the declaration-parsing collaborator.
//!
//! The resolver needs to know, for every implementation type it may
//! construct: which public constructors exist, which interfaces the type
//! implements, and whether it is disposable. [`TypeCatalog`] holds exactly
//! those facts as plain values, keyed by generic definition, replacing the
//! host compiler's symbol tables.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::type_ref::{TypeKind, TypeRef};

/// Whether the provider must track a constructed instance for disposal.
///
/// `Unknown` covers unconstrained generic parameters and interfaces whose
/// implementors cannot be enumerated statically; such nodes are tracked
/// defensively at construction time instead of getting a declared slot in
/// the disposal plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Disposability {
    /// Provably not disposable; never tracked.
    No,
    /// Implements a disposable capability; tracked per lifetime.
    Yes,
    /// Cannot be decided statically; tracked dynamically at construction.
    Unknown,
}

/// A service key attached to a dependency request.
///
/// Only string keys participate in name-group resolution; anything else is
/// rejected up front with a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKey {
    /// A string key, matched against registration names by exact equality.
    String(String),
    /// A non-string key; carries the key's type name for diagnostics.
    NonString(String),
}

/// One constructor, factory, or delegate parameter.
#[derive(Debug, Clone)]
pub struct Parameter {
    /// Declared parameter name, used for optional named arguments.
    pub name: String,
    /// Requested service type (may mention generic parameters on open
    /// generic definitions).
    pub ty: TypeRef,
    /// True for nullable reference or nullable-of-value requests.
    pub nullable: bool,
    /// True if the declaration supplies a default value, making the
    /// dependency optional.
    pub has_default: bool,
    /// Optional service key qualifying the request.
    pub key: Option<ParameterKey>,
}

impl Parameter {
    pub fn new(name: &str, ty: TypeRef) -> Self {
        Self {
            name: name.to_string(),
            ty,
            nullable: false,
            has_default: false,
            key: None,
        }
    }

    /// Marks the parameter nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the parameter as carrying a default value.
    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// Attaches a string service key.
    pub fn keyed(mut self, key: &str) -> Self {
        self.key = Some(ParameterKey::String(key.to_string()));
        self
    }

    /// Attaches a non-string service key (always rejected by the resolver;
    /// `key_type` only feeds the diagnostic).
    pub fn non_string_key(mut self, key_type: &str) -> Self {
        self.key = Some(ParameterKey::NonString(key_type.to_string()));
        self
    }
}

/// A public constructor of an implementation type.
#[derive(Debug, Clone)]
pub struct Constructor {
    pub parameters: Vec<Parameter>,
}

impl Constructor {
    pub fn new(parameters: Vec<Parameter>) -> Self {
        Self { parameters }
    }
}

/// The kind and signature of a provider member referenced by an instance or
/// factory registration.
#[derive(Debug, Clone)]
pub enum MemberKind {
    /// A field or property holding a ready instance.
    Value { ty: TypeRef },
    /// A method; `type_params` lists its own generic parameters, used when
    /// an open generic registration is backed by a generic factory.
    Method {
        returns: TypeRef,
        parameters: Vec<Parameter>,
        type_params: Vec<String>,
    },
    /// A field or property with a delegate type; invoked like a method.
    Delegate {
        returns: TypeRef,
        parameters: Vec<Parameter>,
    },
}

/// A member declared on the provider, a scope, or an imported module.
#[derive(Debug, Clone)]
pub struct MemberModel {
    pub name: String,
    pub kind: MemberKind,
    pub is_static: bool,
}

impl MemberModel {
    pub fn value(name: &str, ty: TypeRef) -> Self {
        Self {
            name: name.to_string(),
            kind: MemberKind::Value { ty },
            is_static: false,
        }
    }

    pub fn method(name: &str, returns: TypeRef, parameters: Vec<Parameter>) -> Self {
        Self {
            name: name.to_string(),
            kind: MemberKind::Method {
                returns,
                parameters,
                type_params: Vec::new(),
            },
            is_static: false,
        }
    }

    pub fn delegate(name: &str, returns: TypeRef, parameters: Vec<Parameter>) -> Self {
        Self {
            name: name.to_string(),
            kind: MemberKind::Delegate {
                returns,
                parameters,
            },
            is_static: false,
        }
    }

    /// Marks the member static.
    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Declares the method's own generic parameters, in order.
    pub fn generic(mut self, type_params: &[&str]) -> Self {
        if let MemberKind::Method { type_params: tp, .. } = &mut self.kind {
            *tp = type_params.iter().map(|s| s.to_string()).collect();
        }
        self
    }
}

/// Structural facts about one type (or one open generic definition).
#[derive(Debug, Clone)]
pub struct TypeModel {
    /// The type, in definition form for generics (`Repo<T>`, not `Repo<User>`).
    pub ty: TypeRef,
    /// Public constructors, in declaration order.
    pub constructors: Vec<Constructor>,
    /// Implemented interfaces and base types, transitively closed, expressed
    /// in terms of the definition's own parameters.
    pub implements: Vec<TypeRef>,
    /// True for interfaces and abstract types, which cannot be constructed.
    pub is_interface: bool,
    /// True if the type implements a disposable capability.
    pub is_disposable: bool,
}

impl TypeModel {
    pub fn new(ty: TypeRef) -> Self {
        Self {
            ty,
            constructors: Vec::new(),
            implements: Vec::new(),
            is_interface: false,
            is_disposable: false,
        }
    }

    pub fn with_constructor(mut self, ctor: Constructor) -> Self {
        self.constructors.push(ctor);
        self
    }

    pub fn implementing(mut self, iface: TypeRef) -> Self {
        self.implements.push(iface);
        self
    }

    pub fn interface(mut self) -> Self {
        self.is_interface = true;
        self
    }

    pub fn disposable(mut self) -> Self {
        self.is_disposable = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GenericId {
    namespace: Option<String>,
    name: String,
    arity: usize,
}

impl GenericId {
    fn of(ty: &TypeRef) -> Self {
        Self {
            namespace: ty.namespace.clone(),
            name: ty.name.clone(),
            arity: ty.args.len(),
        }
    }
}

/// All type facts known to one generation run, keyed by generic definition.
///
/// Lookups with a constructed generic type (`Repo<User>`) find the model
/// registered for the matching definition (`Repo<T>`).
#[derive(Debug, Default)]
pub struct TypeCatalog {
    types: IndexMap<GenericId, TypeModel>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model. A later model for the same definition replaces the
    /// earlier one.
    pub fn add(&mut self, model: TypeModel) {
        self.types.insert(GenericId::of(&model.ty), model);
    }

    /// Finds the model for a type or its generic definition.
    pub fn get(&self, ty: &TypeRef) -> Option<&TypeModel> {
        self.types.get(&GenericId::of(ty))
    }

    /// Structural assignability: `implementation` is assignable to `service`
    /// if they are equal, or if the implementation's model lists `service`
    /// among its implemented interfaces after substituting the
    /// implementation's type arguments.
    pub fn is_assignable(&self, implementation: &TypeRef, service: &TypeRef) -> bool {
        if implementation == service {
            return true;
        }
        let Some(model) = self.get(implementation) else {
            return false;
        };
        let mapping: HashMap<String, TypeRef> =
            TypeRef::substitution(&model.ty, &implementation.args);
        model
            .implements
            .iter()
            .any(|iface| &iface.substitute(&mapping) == service)
    }

    /// Infers the disposability of an implementation type per the tri-state
    /// rules: provably-no, provably-yes, or unknown for generic parameters,
    /// interfaces, and types absent from the catalog.
    pub fn disposability(&self, ty: &TypeRef) -> Disposability {
        if ty.kind == TypeKind::GenericParam {
            return Disposability::Unknown;
        }
        match self.get(ty) {
            Some(model) if model.is_disposable => Disposability::Yes,
            Some(model) if model.is_interface => Disposability::Unknown,
            Some(_) => Disposability::No,
            None => Disposability::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructed_generic_finds_definition_model() {
        let def = TypeRef::generic("app", "Repo", vec![TypeRef::param("T")]);
        let mut catalog = TypeCatalog::new();
        catalog.add(TypeModel::new(def.clone()));

        let closed = TypeRef::generic("app", "Repo", vec![TypeRef::named("app", "User")]);
        assert!(catalog.get(&closed).is_some());
        assert!(catalog.get(&TypeRef::named("app", "Repo")).is_none());
    }

    #[test]
    fn assignability_substitutes_type_arguments() {
        let def = TypeRef::generic("app", "Repo", vec![TypeRef::param("T")]);
        let iface = TypeRef::generic("app", "IRepo", vec![TypeRef::param("T")]);
        let mut catalog = TypeCatalog::new();
        catalog.add(TypeModel::new(def).implementing(iface));

        let user = TypeRef::named("app", "User");
        let impl_closed = TypeRef::generic("app", "Repo", vec![user.clone()]);
        let service_closed = TypeRef::generic("app", "IRepo", vec![user]);
        assert!(catalog.is_assignable(&impl_closed, &service_closed));

        let other = TypeRef::generic("app", "IRepo", vec![TypeRef::named("app", "Order")]);
        assert!(!catalog.is_assignable(&impl_closed, &other));
    }

    #[test]
    fn disposability_tristate() {
        let mut catalog = TypeCatalog::new();
        catalog.add(TypeModel::new(TypeRef::named("app", "Conn")).disposable());
        catalog.add(TypeModel::new(TypeRef::named("app", "Plain")));
        catalog.add(TypeModel::new(TypeRef::named("app", "IThing")).interface());

        assert_eq!(
            catalog.disposability(&TypeRef::named("app", "Conn")),
            Disposability::Yes
        );
        assert_eq!(
            catalog.disposability(&TypeRef::named("app", "Plain")),
            Disposability::No
        );
        assert_eq!(
            catalog.disposability(&TypeRef::named("app", "IThing")),
            Disposability::Unknown
        );
        assert_eq!(
            catalog.disposability(&TypeRef::param("T")),
            Disposability::Unknown
        );
        assert_eq!(
            catalog.disposability(&TypeRef::named("app", "Elsewhere")),
            Disposability::Unknown
        );
    }
}
