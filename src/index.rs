//! Registration lookup.
//!
//! Builds the per-provider index over registrations: exact groups keyed by
//! (service type, name) and open generic groups keyed by generic definition.
//! Declaration-shape validation that needs no resolution happens here, so
//! the resolver only sees structurally sane registrations plus a batch of
//! up-front diagnostics.

use indexmap::IndexMap;

use crate::diagnostics::{descriptors, Diagnostic};
use crate::registration::{ProviderDescription, ServiceRegistration};
use crate::type_ref::TypeRef;

/// Key for an open generic group: the definition's identity, ignoring its
/// parameter names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct OpenKey {
    namespace: Option<String>,
    name: String,
    arity: usize,
    registration_name: Option<String>,
}

impl OpenKey {
    fn of(ty: &TypeRef, registration_name: Option<&str>) -> Self {
        Self {
            namespace: ty.namespace.clone(),
            name: ty.name.clone(),
            arity: ty.arity(),
            registration_name: registration_name.map(str::to_string),
        }
    }
}

/// Index over one provider's registrations.
///
/// Groups preserve declaration order; within a group the last registration
/// is the main implementation for that (type, name) pair.
#[derive(Debug)]
pub struct RegistrationIndex {
    registrations: Vec<ServiceRegistration>,
    exact: IndexMap<(TypeRef, Option<String>), Vec<usize>>,
    open: IndexMap<OpenKey, Vec<usize>>,
}

impl RegistrationIndex {
    /// Indexes the provider's registrations and collects the diagnostics for
    /// every declaration-shape rule that can be checked without resolving.
    pub fn build(provider: &ProviderDescription, diagnostics: &mut Vec<Diagnostic>) -> Self {
        if !provider.is_extensible {
            diagnostics.push(Diagnostic::new(
                &descriptors::PROVIDER_NOT_EXTENSIBLE,
                vec![provider.ty.fully_qualified()],
                provider.location.clone(),
            ));
        }
        for import in &provider.imports {
            if !import.is_module {
                diagnostics.push(Diagnostic::new(
                    &descriptors::IMPORTED_TYPE_NOT_MODULE,
                    vec![import.ty.fully_qualified()],
                    import.location.clone(),
                ));
            }
        }

        let mut index = Self {
            registrations: provider.registrations.clone(),
            exact: IndexMap::new(),
            open: IndexMap::new(),
        };

        for (i, reg) in index.registrations.iter().enumerate() {
            validate_shape(reg, diagnostics);
            if reg.service_type.is_open_generic() {
                index
                    .open
                    .entry(OpenKey::of(&reg.service_type, reg.name.as_deref()))
                    .or_default()
                    .push(i);
            } else {
                index
                    .exact
                    .entry((reg.service_type.clone(), reg.name.clone()))
                    .or_default()
                    .push(i);
            }
        }
        index
    }

    pub fn registration(&self, idx: usize) -> &ServiceRegistration {
        &self.registrations[idx]
    }

    /// All registrations for an exact (type, name) pair, in declaration
    /// order.
    pub fn group(&self, ty: &TypeRef, name: Option<&str>) -> Option<&[usize]> {
        self.exact
            .get(&(ty.clone(), name.map(str::to_string)))
            .map(Vec::as_slice)
    }

    /// All open generic registrations whose definition matches `ty`'s
    /// namespace, name, and arity.
    pub fn open_group(&self, ty: &TypeRef, name: Option<&str>) -> Option<&[usize]> {
        self.open.get(&OpenKey::of(ty, name)).map(Vec::as_slice)
    }

    /// The reverse index carried by the `position`-th registration of an
    /// `n`-strong group: `None` for the last (main) one.
    pub fn reverse_index(position: usize, group_len: usize) -> Option<u32> {
        if position + 1 == group_len {
            None
        } else {
            Some((group_len - 1 - position) as u32)
        }
    }
}

fn validate_shape(reg: &ServiceRegistration, diagnostics: &mut Vec<Diagnostic>) {
    let mut sources = 0;
    if reg.implementation_type.is_some() && !reg.resolve_from_existing {
        sources += 1;
    }
    if reg.instance_member.is_some() {
        sources += 1;
    }
    if reg.factory_member.is_some() {
        sources += 1;
    }
    if sources > 1 {
        diagnostics.push(Diagnostic::new(
            &descriptors::IMPLEMENTATION_AND_FACTORY_NOT_ALLOWED,
            vec![reg.service_type.fully_qualified()],
            reg.location.clone(),
        ));
    }

    if let Some(name) = &reg.name {
        if !valid_service_name(name) {
            diagnostics.push(Diagnostic::new(
                &descriptors::SERVICE_NAME_MUST_BE_ALPHANUMERIC,
                vec![name.clone()],
                reg.location.clone(),
            ));
        }
    }

    if reg.service_type.is_open_generic() && reg.instance_member.is_some() {
        diagnostics.push(Diagnostic::new(
            &descriptors::OPEN_GENERIC_INSTANCE_NOT_SUPPORTED,
            vec![reg.service_type.fully_qualified()],
            reg.location.clone(),
        ));
    }
}

/// Names become part of generated member names, so they are restricted to
/// alphanumerics with a leading letter.
fn valid_service_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::KnownTypes;
    use crate::ServiceRegistration;

    fn provider_with(registrations: Vec<ServiceRegistration>) -> ProviderDescription {
        let mut provider = ProviderDescription::new(
            TypeRef::named("app", "Provider"),
            KnownTypes::standard(),
        );
        provider.registrations = registrations;
        provider
    }

    #[test]
    fn groups_preserve_declaration_order() {
        let svc = TypeRef::named("app", "IHandler");
        let provider = provider_with(vec![
            ServiceRegistration::singleton(svc.clone())
                .implemented_by(TypeRef::named("app", "A")),
            ServiceRegistration::singleton(svc.clone())
                .implemented_by(TypeRef::named("app", "B")),
        ]);
        let mut diags = Vec::new();
        let index = RegistrationIndex::build(&provider, &mut diags);
        assert!(diags.is_empty());
        let group = index.group(&svc, None).unwrap();
        assert_eq!(group, &[0, 1]);
        assert_eq!(RegistrationIndex::reverse_index(0, 2), Some(1));
        assert_eq!(RegistrationIndex::reverse_index(1, 2), None);
    }

    #[test]
    fn open_generic_registrations_group_by_definition() {
        let def = TypeRef::generic("app", "IRepo", vec![TypeRef::param("T")]);
        let provider = provider_with(vec![ServiceRegistration::transient(def.clone())
            .implemented_by(TypeRef::generic("app", "Repo", vec![TypeRef::param("T")]))]);
        let mut diags = Vec::new();
        let index = RegistrationIndex::build(&provider, &mut diags);

        let closed = TypeRef::generic("app", "IRepo", vec![TypeRef::named("app", "User")]);
        assert!(index.open_group(&closed, None).is_some());
        assert!(index.group(&closed, None).is_none());
    }

    #[test]
    fn conflicting_sources_are_reported() {
        let svc = TypeRef::named("app", "IThing");
        let provider = provider_with(vec![ServiceRegistration::singleton(svc)
            .implemented_by(TypeRef::named("app", "Thing"))
            .from_instance("ThingInstance")]);
        let mut diags = Vec::new();
        RegistrationIndex::build(&provider, &mut diags);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code(), "FG0011");
    }

    #[test]
    fn bad_service_names_are_reported() {
        let svc = TypeRef::named("app", "IThing");
        for name in ["", "1abc", "has space", "dash-ed"] {
            let provider = provider_with(vec![ServiceRegistration::singleton(svc.clone())
                .implemented_by(TypeRef::named("app", "Thing"))
                .with_name(name)]);
            let mut diags = Vec::new();
            RegistrationIndex::build(&provider, &mut diags);
            assert_eq!(diags.len(), 1, "name {name:?} should be rejected");
            assert_eq!(diags[0].code(), "FG0015");
        }
        let provider = provider_with(vec![ServiceRegistration::singleton(svc)
            .implemented_by(TypeRef::named("app", "Thing"))
            .with_name("primary2")]);
        let mut diags = Vec::new();
        RegistrationIndex::build(&provider, &mut diags);
        assert!(diags.is_empty());
    }
}
