//! Construction-plan nodes.
//!
//! Every resolved service becomes a [`ServiceCallSite`]: a description of how
//! the generated provider obtains an instance of that service. Call sites
//! form a DAG through [`CallSiteRef`] edges; shared dependencies point at the
//! same node, never at copies.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::catalog::Disposability;
use crate::diagnostics::Diagnostic;
use crate::identity::ServiceIdentity;
use crate::lifetime::Lifetime;
use crate::registration::MemberLocation;
use crate::type_ref::TypeRef;

/// Shared handle to a call site. Memoized nodes are aliased, so pointer
/// equality tells shared dependencies apart from duplicated work.
pub type CallSiteRef = Arc<ServiceCallSite>;

/// One node of the construction plan.
#[derive(Debug)]
pub struct ServiceCallSite {
    /// The identity this node answers.
    pub identity: ServiceIdentity,
    /// The concrete type the node produces.
    pub implementation_type: TypeRef,
    pub lifetime: Lifetime,
    pub disposability: Disposability,
    pub kind: CallSiteKind,
}

/// How the instance is obtained.
#[derive(Debug)]
pub enum CallSiteKind {
    /// Invoke a public constructor with resolved dependencies.
    Constructor(ConstructorCallSite),
    /// Read a declared instance member.
    Member(MemberCallSite),
    /// Invoke a declared factory method or delegate member.
    Factory(FactoryCallSite),
    /// Forward to another registration's node.
    Existing(ExistingCallSite),
    /// Materialize a collection of every registration of the element type.
    Array(ArrayCallSite),
    /// Hand out a late-bound resolver delegate.
    ResolveDelegate(ResolveDelegateCallSite),
    /// The provider instance itself.
    Provider,
    /// The is-service capability instance.
    IsService,
    /// The scope-factory capability instance.
    ScopeFactory,
    /// A branch that failed validation; carries its diagnostics.
    Error(ErrorCallSite),
}

#[derive(Debug)]
pub struct ConstructorCallSite {
    /// Positional dependencies, in declared parameter order.
    pub parameters: SmallVec<[CallSiteRef; 4]>,
    /// Registered optional dependencies passed as named arguments, with the
    /// declared parameter name.
    pub optional_parameters: Vec<(String, CallSiteRef)>,
}

#[derive(Debug)]
pub struct MemberCallSite {
    /// Name of the instance member.
    pub member: String,
    pub is_static: bool,
    pub member_location: MemberLocation,
}

#[derive(Debug)]
pub struct FactoryCallSite {
    /// Name of the factory method or delegate member.
    pub member: String,
    pub is_static: bool,
    pub member_location: MemberLocation,
    /// Type arguments applied to a generic factory method, empty otherwise.
    pub type_args: Vec<TypeRef>,
    pub parameters: SmallVec<[CallSiteRef; 4]>,
    pub optional_parameters: Vec<(String, CallSiteRef)>,
}

#[derive(Debug)]
pub struct ExistingCallSite {
    /// The aliased registration's node. Lifetime and disposability of the
    /// alias mirror the target; nothing new is constructed or tracked.
    pub target: CallSiteRef,
}

#[derive(Debug)]
pub struct ArrayCallSite {
    pub item_type: TypeRef,
    /// One node per registration of the element type, in declaration order.
    pub items: Vec<CallSiteRef>,
}

#[derive(Debug)]
pub struct ResolveDelegateCallSite {
    /// The type the delegate resolves when invoked.
    pub resolved_type: TypeRef,
    /// True when the delegate was requested with a name, which it forwards.
    pub uses_name: bool,
}

#[derive(Debug)]
pub struct ErrorCallSite {
    pub diagnostics: Vec<Diagnostic>,
}

impl ServiceCallSite {
    /// A degraded node standing in for a branch that failed validation.
    pub fn error(identity: ServiceIdentity, diagnostics: Vec<Diagnostic>) -> CallSiteRef {
        let implementation_type = identity.ty.clone();
        Arc::new(Self {
            identity,
            implementation_type,
            lifetime: Lifetime::Transient,
            disposability: Disposability::No,
            kind: CallSiteKind::Error(ErrorCallSite { diagnostics }),
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, CallSiteKind::Error(_))
    }

    /// Direct dependencies of this node, in evaluation order.
    pub fn dependencies(&self) -> Vec<&CallSiteRef> {
        match &self.kind {
            CallSiteKind::Constructor(c) => c
                .parameters
                .iter()
                .chain(c.optional_parameters.iter().map(|(_, cs)| cs))
                .collect(),
            CallSiteKind::Factory(f) => f
                .parameters
                .iter()
                .chain(f.optional_parameters.iter().map(|(_, cs)| cs))
                .collect(),
            CallSiteKind::Existing(e) => vec![&e.target],
            CallSiteKind::Array(a) => a.items.iter().collect(),
            CallSiteKind::Member(_)
            | CallSiteKind::ResolveDelegate(_)
            | CallSiteKind::Provider
            | CallSiteKind::IsService
            | CallSiteKind::ScopeFactory
            | CallSiteKind::Error(_) => Vec::new(),
        }
    }
}
