//! The graph resolver.
//!
//! Walks one provider's root services and recursively turns registrations
//! into call sites. Resolution is memoized per [`ServiceIdentity`], so a
//! service shared by several consumers resolves to one node. Validation
//! failures degrade the failing branch into an error call site and keep
//! going; cycles are broken the same way.

use std::collections::HashMap;

use ahash::{AHashMap, AHashSet};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::call_site::{
    ArrayCallSite, CallSiteKind, CallSiteRef, ConstructorCallSite, ExistingCallSite,
    FactoryCallSite, MemberCallSite, ResolveDelegateCallSite, ServiceCallSite,
};
use crate::catalog::{Disposability, MemberKind, MemberModel, Parameter, ParameterKey, TypeCatalog};
use crate::diagnostics::{descriptors, Diagnostic};
use crate::identity::ServiceIdentity;
use crate::index::RegistrationIndex;
use crate::lifetime::Lifetime;
use crate::registration::{Location, ProviderDescription, ServiceRegistration};
use crate::type_ref::TypeRef;

/// Resolves one provider description into its root call sites.
pub struct GraphResolver<'a> {
    provider: &'a ProviderDescription,
    catalog: &'a TypeCatalog,
    index: RegistrationIndex,
    memo: AHashMap<ServiceIdentity, CallSiteRef>,
    stack: Vec<ServiceIdentity>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> GraphResolver<'a> {
    pub fn new(provider: &'a ProviderDescription, catalog: &'a TypeCatalog) -> Self {
        let mut diagnostics = Vec::new();
        let index = RegistrationIndex::build(provider, &mut diagnostics);
        Self {
            provider,
            catalog,
            index,
            memo: AHashMap::new(),
            stack: Vec::new(),
            diagnostics,
        }
    }

    /// Resolves every root service and returns the root call sites together
    /// with all accumulated diagnostics.
    pub fn run(mut self) -> (Vec<CallSiteRef>, Vec<Diagnostic>) {
        debug!(provider = %self.provider.ty, roots = self.provider.root_services.len(), "resolving provider");
        let mut roots: Vec<CallSiteRef> = Vec::new();
        let mut seen: AHashSet<ServiceIdentity> = AHashSet::new();
        for root in self.provider.root_services.clone() {
            for call_site in self.resolve_root(&root.service, root.name.as_deref(), root.location.as_ref()) {
                if seen.insert(call_site.identity.clone()) {
                    roots.push(call_site);
                }
            }
        }
        debug!(
            provider = %self.provider.ty,
            call_sites = roots.len(),
            diagnostics = self.diagnostics.len(),
            "provider resolved"
        );
        (roots, self.diagnostics)
    }

    fn resolve_root(
        &mut self,
        ty: &TypeRef,
        name: Option<&str>,
        location: Option<&Location>,
    ) -> Vec<CallSiteRef> {
        if self.provider.known_types.is_built_in(ty) && name.is_some() {
            let diag = Diagnostic::new(
                &descriptors::BUILT_IN_SERVICES_NOT_NAMED,
                vec![ty.fully_qualified()],
                location.cloned(),
            );
            self.diagnostics.push(diag.clone());
            let identity = ServiceIdentity::named(ty.clone(), name.unwrap_or_default());
            return vec![ServiceCallSite::error(identity, vec![diag])];
        }
        if self.provider.known_types.collection_item(ty).is_some() && name.is_some() {
            let diag = Diagnostic::new(
                &descriptors::IMPLICIT_COLLECTION_NOT_NAMED,
                vec![ty.fully_qualified()],
                location.cloned(),
            );
            self.diagnostics.push(diag.clone());
            let identity = ServiceIdentity::named(ty.clone(), name.unwrap_or_default());
            return vec![ServiceCallSite::error(identity, vec![diag])];
        }
        if name.is_none() && self.provider.known_types.is_built_in(ty) {
            return vec![self.built_in(ty)];
        }

        // A root request for a multiply-registered service exposes every
        // registration, not just the main one.
        if let Some(group) = self.index.group(ty, name).map(<[usize]>::to_vec) {
            let len = group.len();
            return group
                .into_iter()
                .enumerate()
                .map(|(position, idx)| {
                    let identity = self.group_identity(ty, name, position, len);
                    self.resolve_group_member(idx, identity, false)
                })
                .collect();
        }

        match self.resolve_service(ty, name) {
            Some(call_site) => vec![call_site],
            None => {
                let (diag, identity) = match name {
                    Some(name) => (
                        Diagnostic::new(
                            &descriptors::SERVICE_AND_NAME_NOT_REGISTERED,
                            vec![ty.fully_qualified(), name.to_string()],
                            location.cloned(),
                        ),
                        ServiceIdentity::named(ty.clone(), name),
                    ),
                    None => (
                        Diagnostic::new(
                            &descriptors::SERVICE_NOT_REGISTERED,
                            vec![ty.fully_qualified()],
                            location.cloned(),
                        ),
                        ServiceIdentity::new(ty.clone()),
                    ),
                };
                self.diagnostics.push(diag.clone());
                vec![ServiceCallSite::error(identity, vec![diag])]
            }
        }
    }

    fn group_identity(
        &self,
        ty: &TypeRef,
        name: Option<&str>,
        position: usize,
        group_len: usize,
    ) -> ServiceIdentity {
        let mut identity = match name {
            Some(name) => ServiceIdentity::named(ty.clone(), name),
            None => ServiceIdentity::new(ty.clone()),
        };
        identity.reverse_index = RegistrationIndex::reverse_index(position, group_len);
        identity
    }

    /// The lookup ladder for one requested (type, name) pair. Returns `None`
    /// when nothing can answer the request.
    fn resolve_service(&mut self, ty: &TypeRef, name: Option<&str>) -> Option<CallSiteRef> {
        if name.is_none() && self.provider.known_types.is_built_in(ty) {
            return Some(self.built_in(ty));
        }

        if let Some(group) = self.index.group(ty, name).map(<[usize]>::to_vec) {
            let position = group.len() - 1;
            let identity = self.group_identity(ty, name, position, group.len());
            return Some(self.resolve_group_member(group[position], identity, false));
        }

        if !ty.is_open_generic() && !ty.args.is_empty() {
            if let Some(group) = self.index.open_group(ty, name).map(<[usize]>::to_vec) {
                let idx = *group.last()?;
                let identity = match name {
                    Some(name) => ServiceIdentity::named(ty.clone(), name),
                    None => ServiceIdentity::new(ty.clone()),
                };
                return Some(self.resolve_group_member(idx, identity, true));
            }
        }

        if name.is_none() {
            if let Some(item) = self.provider.known_types.collection_item(ty).cloned() {
                return Some(self.resolve_collection(ty, &item));
            }
        }

        if let Some(item) = self.provider.known_types.delegate_item(ty).cloned() {
            let identity = match name {
                Some(name) => ServiceIdentity::named(ty.clone(), name),
                None => ServiceIdentity::new(ty.clone()),
            };
            if let Some(existing) = self.memo.get(&identity) {
                return Some(existing.clone());
            }
            let call_site = std::sync::Arc::new(ServiceCallSite {
                identity: identity.clone(),
                implementation_type: ty.clone(),
                lifetime: Lifetime::Transient,
                disposability: Disposability::No,
                kind: CallSiteKind::ResolveDelegate(ResolveDelegateCallSite {
                    resolved_type: item,
                    uses_name: name.is_some(),
                }),
            });
            self.memo.insert(identity, call_site.clone());
            return Some(call_site);
        }

        None
    }

    fn built_in(&mut self, ty: &TypeRef) -> CallSiteRef {
        let identity = ServiceIdentity::new(ty.clone());
        if let Some(existing) = self.memo.get(&identity) {
            return existing.clone();
        }
        let known = &self.provider.known_types;
        let kind = if *ty == known.service_provider {
            CallSiteKind::Provider
        } else if known.scope_factory.as_ref() == Some(ty) {
            CallSiteKind::ScopeFactory
        } else {
            CallSiteKind::IsService
        };
        let call_site = std::sync::Arc::new(ServiceCallSite {
            identity: identity.clone(),
            implementation_type: ty.clone(),
            lifetime: Lifetime::Transient,
            disposability: Disposability::No,
            kind,
        });
        self.memo.insert(identity, call_site.clone());
        call_site
    }

    /// A collection request aggregates every registration of the element
    /// type, in declaration order. An element type with no registrations
    /// yields an empty collection, never an error.
    fn resolve_collection(&mut self, collection: &TypeRef, item: &TypeRef) -> CallSiteRef {
        let identity = ServiceIdentity::new(collection.clone());
        if let Some(existing) = self.memo.get(&identity) {
            return existing.clone();
        }
        let group = self
            .index
            .group(item, None)
            .map(<[usize]>::to_vec)
            .unwrap_or_default();
        let len = group.len();
        let items = group
            .into_iter()
            .enumerate()
            .map(|(position, idx)| {
                let item_identity = self.group_identity(item, None, position, len);
                self.resolve_group_member(idx, item_identity, false)
            })
            .collect();
        let call_site = std::sync::Arc::new(ServiceCallSite {
            identity: identity.clone(),
            implementation_type: collection.clone(),
            lifetime: Lifetime::Transient,
            disposability: Disposability::No,
            kind: CallSiteKind::Array(ArrayCallSite {
                item_type: item.clone(),
                items,
            }),
        });
        self.memo.insert(identity, call_site.clone());
        call_site
    }

    /// Memoization and cycle detection around one registration. Cycle error
    /// nodes are intentionally not memoized: the same service reached along
    /// a non-cyclic path later must still resolve normally.
    fn resolve_group_member(
        &mut self,
        idx: usize,
        identity: ServiceIdentity,
        open: bool,
    ) -> CallSiteRef {
        if let Some(existing) = self.memo.get(&identity) {
            return existing.clone();
        }
        if let Some(position) = self.stack.iter().position(|entry| entry == &identity) {
            let chain = self.stack[position..]
                .iter()
                .map(ToString::to_string)
                .chain(std::iter::once(identity.to_string()))
                .collect::<Vec<_>>()
                .join(" -> ");
            let diag = Diagnostic::new(
                &descriptors::CYCLIC_DEPENDENCY,
                vec![identity.ty.fully_qualified(), chain],
                self.index.registration(idx).location.clone(),
            );
            self.diagnostics.push(diag.clone());
            return ServiceCallSite::error(identity, vec![diag]);
        }
        trace!(service = %identity, "resolving");
        self.stack.push(identity.clone());
        let registration = self.index.registration(idx).clone();
        let call_site = if open {
            self.build_open(&registration, &identity)
        } else {
            self.build_closed(&registration, &identity)
        };
        self.stack.pop();
        self.memo.insert(identity, call_site.clone());
        call_site
    }

    fn build_closed(
        &mut self,
        registration: &ServiceRegistration,
        identity: &ServiceIdentity,
    ) -> CallSiteRef {
        if registration.resolve_from_existing {
            return self.build_existing(registration, identity);
        }
        if let Some(member) = &registration.instance_member {
            return self.build_instance(registration, identity, member);
        }
        if let Some(member) = &registration.factory_member {
            return self.build_factory(registration, identity, member);
        }
        let implementation = registration
            .implementation_type
            .clone()
            .unwrap_or_else(|| registration.service_type.clone());
        self.build_constructor(registration, identity, implementation)
    }

    fn build_existing(
        &mut self,
        registration: &ServiceRegistration,
        identity: &ServiceIdentity,
    ) -> CallSiteRef {
        let target_type = match &registration.implementation_type {
            Some(target) if !registration.existing_implementation_missing => target.clone(),
            _ => {
                return self.fail(
                    identity,
                    Diagnostic::new(
                        &descriptors::EXISTING_TARGET_NOT_REGISTERED,
                        vec![
                            "<unknown>".to_string(),
                            registration.service_type.fully_qualified(),
                        ],
                        registration.location.clone(),
                    ),
                );
            }
        };
        if !self
            .catalog
            .is_assignable(&target_type, &registration.service_type)
        {
            return self.fail(
                identity,
                Diagnostic::new(
                    &descriptors::EXISTING_MUST_IMPLEMENT_SERVICE,
                    vec![
                        target_type.fully_qualified(),
                        registration.service_type.fully_qualified(),
                    ],
                    registration.location.clone(),
                ),
            );
        }
        let Some(target) = self.resolve_service(&target_type, None) else {
            return self.fail(
                identity,
                Diagnostic::new(
                    &descriptors::EXISTING_TARGET_NOT_REGISTERED,
                    vec![
                        target_type.fully_qualified(),
                        registration.service_type.fully_qualified(),
                    ],
                    registration.location.clone(),
                ),
            );
        };
        std::sync::Arc::new(ServiceCallSite {
            identity: identity.clone(),
            implementation_type: registration.service_type.clone(),
            lifetime: target.lifetime,
            disposability: target.disposability,
            kind: CallSiteKind::Existing(ExistingCallSite { target }),
        })
    }

    fn build_instance(
        &mut self,
        registration: &ServiceRegistration,
        identity: &ServiceIdentity,
        member: &str,
    ) -> CallSiteRef {
        let model = match self.find_member(registration, identity, member) {
            Ok(model) => model,
            Err(call_site) => return call_site,
        };
        let MemberKind::Value { ty } = &model.kind else {
            return self.fail(
                identity,
                Diagnostic::new(
                    &descriptors::MEMBER_NOT_FOUND,
                    vec![
                        member.to_string(),
                        registration.service_type.fully_qualified(),
                    ],
                    registration.location.clone(),
                ),
            );
        };
        // The instance is owned by whoever declared the member, so the
        // provider never tracks it for disposal.
        std::sync::Arc::new(ServiceCallSite {
            identity: identity.clone(),
            implementation_type: ty.clone(),
            lifetime: registration.lifetime,
            disposability: Disposability::No,
            kind: CallSiteKind::Member(MemberCallSite {
                member: member.to_string(),
                is_static: model.is_static,
                member_location: registration.member_location,
            }),
        })
    }

    fn build_factory(
        &mut self,
        registration: &ServiceRegistration,
        identity: &ServiceIdentity,
        member: &str,
    ) -> CallSiteRef {
        let model = match self.find_member(registration, identity, member) {
            Ok(model) => model.clone(),
            Err(call_site) => return call_site,
        };
        let (returns, parameters) = match &model.kind {
            MemberKind::Method {
                returns,
                parameters,
                type_params,
            } if type_params.is_empty() => (returns.clone(), parameters.clone()),
            MemberKind::Delegate {
                returns,
                parameters,
            } => (returns.clone(), parameters.clone()),
            _ => {
                return self.fail(
                    identity,
                    Diagnostic::new(
                        &descriptors::FACTORY_MUST_BE_METHOD_OR_DELEGATE,
                        vec![
                            member.to_string(),
                            registration.service_type.fully_qualified(),
                        ],
                        registration.location.clone(),
                    ),
                );
            }
        };
        let (positional, optional) = match self.resolve_parameters(
            &parameters,
            None,
            &registration.service_type,
            registration.location.as_ref(),
        ) {
            Ok(resolved) => resolved,
            Err(errors) => return self.fail_all(identity, errors),
        };
        self.check_captive_dependencies(registration, &positional, &optional);
        std::sync::Arc::new(ServiceCallSite {
            identity: identity.clone(),
            implementation_type: returns.clone(),
            lifetime: registration.lifetime,
            disposability: self.catalog.disposability(&returns),
            kind: CallSiteKind::Factory(FactoryCallSite {
                member: member.to_string(),
                is_static: model.is_static,
                member_location: registration.member_location,
                type_args: Vec::new(),
                parameters: positional,
                optional_parameters: optional,
            }),
        })
    }

    fn build_constructor(
        &mut self,
        registration: &ServiceRegistration,
        identity: &ServiceIdentity,
        implementation: TypeRef,
    ) -> CallSiteRef {
        let Some(model) = self.catalog.get(&implementation) else {
            return self.missing_constructor(registration, identity, &implementation);
        };
        if model.is_interface || model.constructors.is_empty() {
            return self.missing_constructor(registration, identity, &implementation);
        }
        // Widest constructor wins; declaration order breaks ties.
        let mut constructor = &model.constructors[0];
        for candidate in &model.constructors[1..] {
            if candidate.parameters.len() > constructor.parameters.len() {
                constructor = candidate;
            }
        }
        let mapping = if implementation.args.is_empty() {
            None
        } else {
            Some(TypeRef::substitution(&model.ty, &implementation.args))
        };
        let (positional, optional) = match self.resolve_parameters(
            &constructor.parameters,
            mapping.as_ref(),
            &implementation,
            registration.location.as_ref(),
        ) {
            Ok(resolved) => resolved,
            Err(errors) => return self.fail_all(identity, errors),
        };
        self.check_captive_dependencies(registration, &positional, &optional);
        std::sync::Arc::new(ServiceCallSite {
            identity: identity.clone(),
            implementation_type: implementation.clone(),
            lifetime: registration.lifetime,
            disposability: self.catalog.disposability(&implementation),
            kind: CallSiteKind::Constructor(ConstructorCallSite {
                parameters: positional,
                optional_parameters: optional,
            }),
        })
    }

    fn build_open(
        &mut self,
        registration: &ServiceRegistration,
        identity: &ServiceIdentity,
    ) -> CallSiteRef {
        let definition = &registration.service_type;
        let requested = &identity.ty;

        if let Some(member) = &registration.factory_member {
            return self.build_open_factory(registration, identity, member, definition, requested);
        }

        let Some(implementation_def) = registration.implementation_type.clone() else {
            return self.fail(
                identity,
                Diagnostic::new(
                    &descriptors::OPEN_GENERIC_REQUIRES_IMPLEMENTATION,
                    vec![definition.fully_qualified()],
                    registration.location.clone(),
                ),
            );
        };
        if !implementation_def.is_open_generic() {
            return self.fail(
                identity,
                Diagnostic::new(
                    &descriptors::OPEN_GENERIC_IMPLEMENTATION_MUST_BE_OPEN,
                    vec![
                        implementation_def.fully_qualified(),
                        definition.fully_qualified(),
                    ],
                    registration.location.clone(),
                ),
            );
        }
        if implementation_def.arity() != definition.arity() {
            return self.fail(
                identity,
                Diagnostic::new(
                    &descriptors::OPEN_GENERIC_ARITY_MISMATCH,
                    vec![
                        implementation_def.fully_qualified(),
                        definition.fully_qualified(),
                        definition.arity().to_string(),
                    ],
                    registration.location.clone(),
                ),
            );
        }
        let mapping = TypeRef::substitution(&implementation_def, &requested.args);
        let implementation = implementation_def.substitute(&mapping);
        if !self.catalog.is_assignable(&implementation, requested) {
            return self.fail(
                identity,
                Diagnostic::new(
                    &descriptors::OPEN_GENERIC_NOT_ASSIGNABLE,
                    vec![
                        implementation_def.fully_qualified(),
                        definition.fully_qualified(),
                    ],
                    registration.location.clone(),
                ),
            );
        }
        self.build_constructor(registration, identity, implementation)
    }

    fn build_open_factory(
        &mut self,
        registration: &ServiceRegistration,
        identity: &ServiceIdentity,
        member: &str,
        definition: &TypeRef,
        requested: &TypeRef,
    ) -> CallSiteRef {
        let model = match self.find_member(registration, identity, member) {
            Ok(model) => model.clone(),
            Err(call_site) => return call_site,
        };
        let MemberKind::Method {
            returns,
            parameters,
            type_params,
        } = &model.kind
        else {
            return self.fail(
                identity,
                Diagnostic::new(
                    &descriptors::OPEN_GENERIC_FACTORY_MUST_BE_GENERIC,
                    vec![
                        member.to_string(),
                        definition.fully_qualified(),
                        definition.arity().to_string(),
                    ],
                    registration.location.clone(),
                ),
            );
        };
        if type_params.len() != definition.arity() {
            return self.fail(
                identity,
                Diagnostic::new(
                    &descriptors::OPEN_GENERIC_FACTORY_MUST_BE_GENERIC,
                    vec![
                        member.to_string(),
                        definition.fully_qualified(),
                        definition.arity().to_string(),
                    ],
                    registration.location.clone(),
                ),
            );
        }
        let mapping: HashMap<String, TypeRef> = type_params
            .iter()
            .cloned()
            .zip(requested.args.iter().cloned())
            .collect();
        let instantiated_return = returns.substitute(&mapping);
        if !self.catalog.is_assignable(&instantiated_return, requested) {
            return self.fail(
                identity,
                Diagnostic::new(
                    &descriptors::OPEN_GENERIC_FACTORY_RETURN_NOT_ASSIGNABLE,
                    vec![
                        member.to_string(),
                        instantiated_return.fully_qualified(),
                        definition.fully_qualified(),
                    ],
                    registration.location.clone(),
                ),
            );
        }
        let (positional, optional) = match self.resolve_parameters(
            parameters,
            Some(&mapping),
            requested,
            registration.location.as_ref(),
        ) {
            Ok(resolved) => resolved,
            Err(errors) => return self.fail_all(identity, errors),
        };
        self.check_captive_dependencies(registration, &positional, &optional);
        std::sync::Arc::new(ServiceCallSite {
            identity: identity.clone(),
            implementation_type: instantiated_return.clone(),
            lifetime: registration.lifetime,
            disposability: self.catalog.disposability(&instantiated_return),
            kind: CallSiteKind::Factory(FactoryCallSite {
                member: member.to_string(),
                is_static: model.is_static,
                member_location: registration.member_location,
                type_args: requested.args.clone(),
                parameters: positional,
                optional_parameters: optional,
            }),
        })
    }

    /// Resolves a parameter list. Non-fatal findings go straight to the
    /// provider's diagnostics; fatal ones are returned so the owner degrades
    /// into a single error call site carrying all of them.
    #[allow(clippy::type_complexity)]
    fn resolve_parameters(
        &mut self,
        parameters: &[Parameter],
        mapping: Option<&HashMap<String, TypeRef>>,
        owner: &TypeRef,
        location: Option<&Location>,
    ) -> Result<(SmallVec<[CallSiteRef; 4]>, Vec<(String, CallSiteRef)>), Vec<Diagnostic>> {
        let mut positional: SmallVec<[CallSiteRef; 4]> = SmallVec::new();
        let mut optional: Vec<(String, CallSiteRef)> = Vec::new();
        let mut errors: Vec<Diagnostic> = Vec::new();

        for parameter in parameters {
            let ty = match mapping {
                Some(mapping) => parameter.ty.substitute(mapping),
                None => parameter.ty.clone(),
            };
            let name = match &parameter.key {
                Some(ParameterKey::String(key)) => Some(key.as_str()),
                Some(ParameterKey::NonString(key_type)) => {
                    errors.push(Diagnostic::new(
                        &descriptors::ONLY_STRING_KEYS_SUPPORTED,
                        vec![key_type.clone()],
                        location.cloned(),
                    ));
                    continue;
                }
                None => None,
            };
            match self.resolve_service(&ty, name) {
                Some(call_site) => {
                    if parameter.has_default {
                        optional.push((parameter.name.clone(), call_site));
                    } else {
                        if parameter.nullable {
                            self.diagnostics.push(Diagnostic::new(
                                &descriptors::NULLABLE_SERVICE_REGISTERED,
                                vec![parameter.name.clone(), owner.fully_qualified()],
                                location.cloned(),
                            ));
                        }
                        positional.push(call_site);
                    }
                }
                None if parameter.has_default => {
                    // Unregistered optional dependency: the declared default
                    // stands in, nothing is passed.
                }
                None if parameter.nullable => {
                    errors.push(Diagnostic::new(
                        &descriptors::NULLABLE_SERVICE_NOT_REGISTERED,
                        vec![ty.fully_qualified(), owner.fully_qualified()],
                        location.cloned(),
                    ));
                }
                None => {
                    errors.push(match name {
                        Some(name) => Diagnostic::new(
                            &descriptors::NAMED_SERVICE_REQUIRED_NOT_REGISTERED,
                            vec![
                                ty.fully_qualified(),
                                name.to_string(),
                                owner.fully_qualified(),
                            ],
                            location.cloned(),
                        ),
                        None => Diagnostic::new(
                            &descriptors::SERVICE_REQUIRED_NOT_REGISTERED,
                            vec![ty.fully_qualified(), owner.fully_qualified()],
                            location.cloned(),
                        ),
                    });
                }
            }
        }

        if errors.is_empty() {
            Ok((positional, optional))
        } else {
            Err(errors)
        }
    }

    /// A singleton holding a scoped dependency pins it past its scope; the
    /// instance silently comes from the default scope.
    fn check_captive_dependencies(
        &mut self,
        registration: &ServiceRegistration,
        positional: &SmallVec<[CallSiteRef; 4]>,
        optional: &[(String, CallSiteRef)],
    ) {
        if registration.lifetime != Lifetime::Singleton {
            return;
        }
        let dependencies = positional
            .iter()
            .chain(optional.iter().map(|(_, cs)| cs));
        for dependency in dependencies {
            if dependency.lifetime == Lifetime::Scoped && !dependency.is_error() {
                self.diagnostics.push(Diagnostic::new(
                    &descriptors::SINGLETON_DEPENDS_ON_SCOPED,
                    vec![
                        registration.service_type.fully_qualified(),
                        dependency.identity.ty.fully_qualified(),
                    ],
                    registration.location.clone(),
                ));
            }
        }
    }

    fn find_member(
        &mut self,
        registration: &ServiceRegistration,
        identity: &ServiceIdentity,
        member: &str,
    ) -> Result<&'a MemberModel, CallSiteRef> {
        let mut matches = self
            .provider
            .members
            .iter()
            .filter(|m| m.name == member);
        match (matches.next(), matches.next()) {
            (Some(model), None) => Ok(model),
            (None, _) => Err(self.fail(
                identity,
                Diagnostic::new(
                    &descriptors::MEMBER_NOT_FOUND,
                    vec![
                        member.to_string(),
                        registration.service_type.fully_qualified(),
                    ],
                    registration.location.clone(),
                ),
            )),
            (Some(_), Some(_)) => Err(self.fail(
                identity,
                Diagnostic::new(
                    &descriptors::MEMBER_AMBIGUOUS,
                    vec![
                        member.to_string(),
                        registration.service_type.fully_qualified(),
                    ],
                    registration.location.clone(),
                ),
            )),
        }
    }

    fn missing_constructor(
        &mut self,
        registration: &ServiceRegistration,
        identity: &ServiceIdentity,
        implementation: &TypeRef,
    ) -> CallSiteRef {
        self.fail(
            identity,
            Diagnostic::new(
                &descriptors::MISSING_PUBLIC_CONSTRUCTOR,
                vec![implementation.fully_qualified()],
                registration.location.clone(),
            ),
        )
    }

    fn fail(&mut self, identity: &ServiceIdentity, diagnostic: Diagnostic) -> CallSiteRef {
        self.fail_all(identity, vec![diagnostic])
    }

    fn fail_all(&mut self, identity: &ServiceIdentity, diagnostics: Vec<Diagnostic>) -> CallSiteRef {
        self.diagnostics.extend(diagnostics.iter().cloned());
        ServiceCallSite::error(identity.clone(), diagnostics)
    }
}
