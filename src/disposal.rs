//! Disposal planning.
//!
//! Decides, per cache level, which resolved services the generated provider
//! must track and dispose when the level is torn down. Transients are never
//! tracked through the plan; services whose disposability cannot be decided
//! statically are tracked dynamically at construction time instead.

use std::collections::HashSet;
use std::sync::Arc;

use crate::call_site::{CallSiteRef, ServiceCallSite};
use crate::catalog::Disposability;
use crate::lifetime::Lifetime;
use crate::provider::ServiceProvider;

/// The cache level a disposal plan belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeLevel {
    /// The provider itself; holds singleton caches.
    Root,
    /// One created scope; holds scoped caches.
    Scope,
}

/// Which services one cache level disposes, in resolution order.
#[derive(Debug)]
pub struct DisposalPlan {
    pub level: ScopeLevel,
    /// Statically known disposable (or possibly disposable) cached services.
    pub tracked: Vec<CallSiteRef>,
    /// Whether the level also needs a dynamic dispose list for instances
    /// whose disposability is only known at construction time.
    pub track_dynamic: bool,
    /// Root level only: the default scope backing captive scoped services
    /// must be disposed with the provider.
    pub dispose_default_scope: bool,
}

impl DisposalPlan {
    /// Builds the plan for one cache level of a resolved provider. Walks the
    /// whole plan, so cached dependencies that never appear as roots are
    /// tracked too.
    pub fn for_level(provider: &ServiceProvider, level: ScopeLevel) -> Self {
        let wanted = match level {
            ScopeLevel::Root => Lifetime::Singleton,
            ScopeLevel::Scope => Lifetime::Scoped,
        };
        let mut visited: HashSet<*const ServiceCallSite> = HashSet::new();
        let mut tracked: Vec<CallSiteRef> = Vec::new();
        let mut pending: Vec<CallSiteRef> = provider.root_call_sites.iter().rev().cloned().collect();
        while let Some(cs) = pending.pop() {
            if !visited.insert(Arc::as_ptr(&cs)) {
                continue;
            }
            pending.extend(cs.dependencies().into_iter().rev().cloned());
            if !cs.is_error() && cs.lifetime == wanted && cs.disposability != Disposability::No {
                tracked.push(cs);
            }
        }
        Self {
            level,
            tracked,
            track_dynamic: true,
            dispose_default_scope: level == ScopeLevel::Root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_site::{CallSiteKind, MemberCallSite, ServiceCallSite};
    use crate::diagnostics::{descriptors, Diagnostic};
    use crate::identity::ServiceIdentity;
    use crate::registration::{KnownTypes, MemberLocation};
    use crate::type_ref::TypeRef;
    use std::sync::Arc;

    fn node(name: &str, lifetime: Lifetime, disposability: Disposability) -> CallSiteRef {
        let ty = TypeRef::named("app", name);
        Arc::new(ServiceCallSite {
            identity: ServiceIdentity::new(ty.clone()),
            implementation_type: ty,
            lifetime,
            disposability,
            kind: CallSiteKind::Member(MemberCallSite {
                member: name.to_string(),
                is_static: false,
                member_location: MemberLocation::Root,
            }),
        })
    }

    fn provider_with(call_sites: Vec<CallSiteRef>) -> ServiceProvider {
        ServiceProvider {
            ty: TypeRef::named("app", "Provider"),
            root_call_sites: call_sites,
            known_types: KnownTypes::standard(),
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn plans_split_by_lifetime() {
        let provider = provider_with(vec![
            node("SingletonDisposable", Lifetime::Singleton, Disposability::Yes),
            node("ScopedDisposable", Lifetime::Scoped, Disposability::Yes),
            node("TransientDisposable", Lifetime::Transient, Disposability::Yes),
            node("SingletonPlain", Lifetime::Singleton, Disposability::No),
            node("ScopedUnknown", Lifetime::Scoped, Disposability::Unknown),
        ]);

        let root = DisposalPlan::for_level(&provider, ScopeLevel::Root);
        assert_eq!(root.tracked.len(), 1);
        assert_eq!(root.tracked[0].identity.ty.name, "SingletonDisposable");
        assert!(root.track_dynamic);
        assert!(root.dispose_default_scope);

        let scope = DisposalPlan::for_level(&provider, ScopeLevel::Scope);
        let names: Vec<&str> = scope
            .tracked
            .iter()
            .map(|cs| cs.identity.ty.name.as_str())
            .collect();
        assert_eq!(names, ["ScopedDisposable", "ScopedUnknown"]);
        assert!(!scope.dispose_default_scope);
    }

    #[test]
    fn error_nodes_are_never_tracked() {
        let ty = TypeRef::named("app", "Broken");
        let diag = Diagnostic::new(
            &descriptors::SERVICE_NOT_REGISTERED,
            vec![ty.fully_qualified()],
            None,
        );
        let error = ServiceCallSite::error(ServiceIdentity::new(ty), vec![diag]);
        let provider = provider_with(vec![error]);
        let plan = DisposalPlan::for_level(&provider, ScopeLevel::Root);
        assert!(plan.tracked.is_empty());
    }
}
