//! Service registration records and provider descriptions.
//!
//! These are the resolver's inputs, produced by the (external) declaration
//! parsing collaborator. Registrations are supplied once and never mutated
//! after the graph is built.

use std::fmt;

use crate::catalog::MemberModel;
use crate::lifetime::Lifetime;
use crate::type_ref::TypeRef;

/// A source location attached to declarations for diagnostics. Opaque to
/// the resolver; rendered verbatim in messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location(pub String);

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the member backing an instance or factory registration lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberLocation {
    /// Declared on the root provider type.
    Root,
    /// Declared on the scope type.
    Scope,
    /// Declared on an imported module.
    Module,
}

/// Declares how one provider can satisfy one service type.
///
/// At most one of `implementation_type`, `instance_member`, and
/// `factory_member` acts as a construction source. When
/// `resolve_from_existing` is set the registration is an alias:
/// `implementation_type` names the target registration to forward to and
/// nothing is constructed directly.
#[derive(Debug, Clone)]
pub struct ServiceRegistration {
    pub lifetime: Lifetime,
    pub service_type: TypeRef,
    /// Optional registration name; must be alphanumeric, starting with a
    /// letter.
    pub name: Option<String>,
    pub implementation_type: Option<TypeRef>,
    /// Name of a provider member holding a ready instance.
    pub instance_member: Option<String>,
    /// Name of a provider member acting as a factory.
    pub factory_member: Option<String>,
    pub location: Option<Location>,
    pub member_location: MemberLocation,
    /// Alias: forward to the registration of `implementation_type` instead
    /// of constructing.
    pub resolve_from_existing: bool,
    /// Set by the parser when an alias target was syntactically absent.
    pub existing_implementation_missing: bool,
}

impl ServiceRegistration {
    pub fn new(lifetime: Lifetime, service_type: TypeRef) -> Self {
        Self {
            lifetime,
            service_type,
            name: None,
            implementation_type: None,
            instance_member: None,
            factory_member: None,
            location: None,
            member_location: MemberLocation::Root,
            resolve_from_existing: false,
            existing_implementation_missing: false,
        }
    }

    pub fn singleton(service_type: TypeRef) -> Self {
        Self::new(Lifetime::Singleton, service_type)
    }

    pub fn scoped(service_type: TypeRef) -> Self {
        Self::new(Lifetime::Scoped, service_type)
    }

    pub fn transient(service_type: TypeRef) -> Self {
        Self::new(Lifetime::Transient, service_type)
    }

    /// Constructs the service through a concrete implementation type.
    pub fn implemented_by(mut self, implementation: TypeRef) -> Self {
        self.implementation_type = Some(implementation);
        self
    }

    /// Reads the service from a declared instance member.
    pub fn from_instance(mut self, member: &str) -> Self {
        self.instance_member = Some(member.to_string());
        self
    }

    /// Produces the service by invoking a declared factory member.
    pub fn from_factory(mut self, member: &str) -> Self {
        self.factory_member = Some(member.to_string());
        self
    }

    /// Makes this an alias that forwards to the existing registration of
    /// `target`.
    pub fn aliased_to(mut self, target: TypeRef) -> Self {
        self.implementation_type = Some(target);
        self.resolve_from_existing = true;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn at(mut self, location: &str) -> Self {
        self.location = Some(Location(location.to_string()));
        self
    }

    pub fn declared_on(mut self, member_location: MemberLocation) -> Self {
        self.member_location = member_location;
        self
    }
}

/// A publicly reachable request the generated provider must answer.
#[derive(Debug, Clone)]
pub struct RootService {
    pub service: TypeRef,
    pub name: Option<String>,
    pub location: Option<Location>,
}

impl RootService {
    pub fn new(service: TypeRef) -> Self {
        Self {
            service,
            name: None,
            location: None,
        }
    }

    pub fn named(service: TypeRef, name: &str) -> Self {
        Self {
            service,
            name: Some(name.to_string()),
            location: None,
        }
    }
}

/// A module type imported by the provider declaration.
#[derive(Debug, Clone)]
pub struct ImportedModule {
    pub ty: TypeRef,
    /// True if the imported type is actually marked as a module.
    pub is_module: bool,
    pub location: Option<Location>,
}

/// The optional provider capabilities active for one provider, and the
/// well-known types the resolver matches structurally.
#[derive(Debug, Clone)]
pub struct KnownTypes {
    /// The provider-self service; parameters of this type short-circuit to
    /// the provider instance.
    pub service_provider: TypeRef,
    /// Scope-factory capability service, when structurally available.
    pub scope_factory: Option<TypeRef>,
    /// Is-service capability service, when structurally available.
    pub is_service: Option<TypeRef>,
    /// The open generic collection definition used for aggregate requests.
    pub enumerable: TypeRef,
    /// The open generic late-bound resolver delegate definition, when
    /// supported.
    pub resolver_delegate: Option<TypeRef>,
    /// Whether the keyed-provider surface is generated.
    pub keyed_provider: bool,
    /// Whether the asynchronous disposal capability is available.
    pub async_disposable: bool,
}

impl KnownTypes {
    /// The conventional capability set, with every optional surface active.
    pub fn standard() -> Self {
        Self {
            service_provider: TypeRef::named("services", "IServiceProvider"),
            scope_factory: Some(TypeRef::named("services", "IServiceScopeFactory")),
            is_service: Some(TypeRef::named("services", "IServiceProviderIsService")),
            enumerable: TypeRef::generic("collections", "IEnumerable", vec![TypeRef::param("T")]),
            resolver_delegate: Some(TypeRef::generic(
                "services",
                "ServiceResolver",
                vec![TypeRef::param("T")],
            )),
            keyed_provider: true,
            async_disposable: true,
        }
    }

    /// True if `ty` is one of the built-in capability services.
    pub fn is_built_in(&self, ty: &TypeRef) -> bool {
        *ty == self.service_provider
            || self.scope_factory.as_ref() == Some(ty)
            || self.is_service.as_ref() == Some(ty)
    }

    /// If `ty` is a closed collection instantiation, returns its element
    /// type.
    pub fn collection_item<'t>(&self, ty: &'t TypeRef) -> Option<&'t TypeRef> {
        if ty.same_generic(&self.enumerable) && !ty.is_open_generic() {
            ty.args.first()
        } else {
            None
        }
    }

    /// If `ty` is a closed resolver-delegate instantiation, returns the
    /// late-bound target type.
    pub fn delegate_item<'t>(&self, ty: &'t TypeRef) -> Option<&'t TypeRef> {
        let delegate = self.resolver_delegate.as_ref()?;
        if ty.same_generic(delegate) && !ty.is_open_generic() {
            ty.args.first()
        } else {
            None
        }
    }
}

/// Everything the resolver needs to know about one provider declaration.
#[derive(Debug, Clone)]
pub struct ProviderDescription {
    /// The provider type itself.
    pub ty: TypeRef,
    /// False when the declaration is not structurally extensible (cannot
    /// receive generated members).
    pub is_extensible: bool,
    pub registrations: Vec<ServiceRegistration>,
    pub root_services: Vec<RootService>,
    /// Members declared on the provider, scopes, and imported modules,
    /// referenced by instance/factory registrations.
    pub members: Vec<MemberModel>,
    pub imports: Vec<ImportedModule>,
    pub known_types: KnownTypes,
    pub location: Option<Location>,
}

impl ProviderDescription {
    pub fn new(ty: TypeRef, known_types: KnownTypes) -> Self {
        Self {
            ty,
            is_extensible: true,
            registrations: Vec::new(),
            root_services: Vec::new(),
            members: Vec::new(),
            imports: Vec::new(),
            known_types,
            location: None,
        }
    }
}
