//! Deterministic member naming.
//!
//! Generated accessors and cache slots need short names derived from service
//! types. Base names drop namespaces and flatten generic arguments, so two
//! distinct types can collide (`a.Cache<x.User>` and `b.Cache<y.User>` both
//! flatten to `Cache_User`). Collisions are disambiguated with ordinal
//! suffixes assigned by sorting the colliding types' fully qualified forms,
//! so the result never depends on discovery order.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::call_site::ServiceCallSite;
use crate::identity::ServiceIdentity;
use crate::provider::ServiceProvider;
use crate::type_ref::{TypeKind, TypeRef};

/// The namespace-free base name of a type: the bare name, with generic
/// arguments flattened into an underscore-joined traversal.
pub fn raw_base_name(ty: &TypeRef) -> String {
    let mut out = String::new();
    out.push_str(&ty.name);
    if !ty.args.is_empty() {
        out.push('_');
        for arg in &ty.args {
            append_traversal(arg, &mut out);
        }
    }
    out
}

fn append_traversal(ty: &TypeRef, out: &mut String) {
    out.push_str(&ty.name);
    if !ty.args.is_empty() {
        out.push('_');
        for arg in &ty.args {
            append_traversal(arg, out);
        }
    }
}

/// Collision-free names for every service type of a generation run.
///
/// Built once over all providers; lookups for a type that never collided
/// fall through to its raw base name.
#[derive(Debug, Default)]
pub struct NameMap {
    assigned: BTreeMap<TypeRef, String>,
}

impl NameMap {
    /// Assigns names over an explicit set of types.
    pub fn from_types<I>(types: I) -> Self
    where
        I: IntoIterator<Item = TypeRef>,
    {
        // BTreeMap over the fully qualified form dedupes and fixes the
        // ordinal order at once.
        let mut by_base: BTreeMap<String, BTreeMap<String, TypeRef>> = BTreeMap::new();
        for ty in types {
            if ty.kind == TypeKind::GenericParam {
                continue;
            }
            by_base
                .entry(raw_base_name(&ty))
                .or_default()
                .insert(ty.fully_qualified(), ty);
        }

        let mut assigned = BTreeMap::new();
        for (base, group) in by_base {
            if group.len() < 2 {
                continue;
            }
            for (ordinal, (_, ty)) in group.into_iter().enumerate() {
                assigned.insert(ty, format!("{base}_{ordinal}"));
            }
        }
        Self { assigned }
    }

    /// Assigns names over every service and implementation type reachable
    /// from the given providers' call sites.
    pub fn from_providers(providers: &[ServiceProvider]) -> Self {
        let mut types = Vec::new();
        let mut visited: HashSet<*const ServiceCallSite> = HashSet::new();
        for provider in providers {
            let mut pending: Vec<_> = provider.root_call_sites.iter().cloned().collect();
            while let Some(call_site) = pending.pop() {
                if !visited.insert(Arc::as_ptr(&call_site)) {
                    continue;
                }
                types.push(call_site.identity.ty.clone());
                types.push(call_site.implementation_type.clone());
                pending.extend(call_site.dependencies().into_iter().cloned());
            }
        }
        Self::from_types(types)
    }

    /// The collision-resolved base name for a type.
    pub fn base_name(&self, ty: &TypeRef) -> String {
        match self.assigned.get(ty) {
            Some(name) => name.clone(),
            None => raw_base_name(ty),
        }
    }

    /// The full member-name stem for an identity: base name plus name and
    /// reverse-index qualifiers.
    pub fn expanded_name(&self, identity: &ServiceIdentity) -> String {
        let mut out = self.base_name(&identity.ty);
        if let Some(name) = &identity.name {
            out.push('_');
            out.push_str(name);
        }
        if let Some(index) = identity.reverse_index {
            out.push('_');
            out.push_str(&index.to_string());
        }
        out
    }

    /// Name of the generated cache slot for an identity.
    pub fn cache_slot(&self, identity: &ServiceIdentity) -> String {
        format!("_{}", self.expanded_name(identity))
    }

    /// Name of the generated accessor for an identity.
    pub fn accessor_name(&self, identity: &ServiceIdentity) -> String {
        format!("get_{}", self.expanded_name(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_flattens_generics() {
        let user = TypeRef::named("app", "User");
        assert_eq!(raw_base_name(&user), "User");

        let repo = TypeRef::generic("app", "Repository", vec![user.clone()]);
        assert_eq!(raw_base_name(&repo), "Repository_User");

        let map = TypeRef::generic(
            "app",
            "Map",
            vec![TypeRef::named("app", "Key"), TypeRef::named("app", "Value")],
        );
        assert_eq!(raw_base_name(&map), "Map_KeyValue");

        let nested = TypeRef::generic(
            "app",
            "Cache",
            vec![TypeRef::generic("app", "List", vec![user])],
        );
        assert_eq!(raw_base_name(&nested), "Cache_List_User");
    }

    #[test]
    fn collisions_get_ordinal_suffixes() {
        let a = TypeRef::generic("alpha", "Cache", vec![TypeRef::named("x", "User")]);
        let b = TypeRef::generic("beta", "Cache", vec![TypeRef::named("y", "User")]);
        let lone = TypeRef::named("app", "Config");

        let map = NameMap::from_types(vec![a.clone(), b.clone(), lone.clone()]);
        assert_eq!(map.base_name(&a), "Cache_User_0");
        assert_eq!(map.base_name(&b), "Cache_User_1");
        assert_eq!(map.base_name(&lone), "Config");
    }

    #[test]
    fn assignment_is_order_independent() {
        let a = TypeRef::generic("alpha", "Cache", vec![TypeRef::named("x", "User")]);
        let b = TypeRef::generic("beta", "Cache", vec![TypeRef::named("y", "User")]);

        let forward = NameMap::from_types(vec![a.clone(), b.clone()]);
        let backward = NameMap::from_types(vec![b.clone(), a.clone()]);
        assert_eq!(forward.base_name(&a), backward.base_name(&a));
        assert_eq!(forward.base_name(&b), backward.base_name(&b));
    }

    #[test]
    fn expanded_name_carries_qualifiers() {
        let ty = TypeRef::named("app", "Handler");
        let map = NameMap::from_types(std::iter::empty());

        assert_eq!(map.expanded_name(&ServiceIdentity::new(ty.clone())), "Handler");
        assert_eq!(
            map.expanded_name(&ServiceIdentity::named(ty.clone(), "primary")),
            "Handler_primary"
        );
        assert_eq!(
            map.expanded_name(&ServiceIdentity::indexed(ty.clone(), 2)),
            "Handler_2"
        );
        assert_eq!(map.cache_slot(&ServiceIdentity::new(ty.clone())), "_Handler");
        assert_eq!(map.accessor_name(&ServiceIdentity::new(ty)), "get_Handler");
    }
}
