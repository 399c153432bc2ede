//! # ferrous-graph
//!
//! Service graph resolution for generated dependency injection providers, inspired by Jab-style compile-time containers.
//!
//! ## Features
//!
//! - **Declarative inputs**: plain registration records and structural type facts, no compiler symbols
//! - **Construction plans**: every root service resolves to a DAG of call sites with shared nodes
//! - **Three lifetimes**: Singleton, Scoped, and Transient caching strategies
//! - **Open generics**: definition registrations instantiated on demand, including generic factories
//! - **Collections and aliases**: aggregate requests and forward-to-existing registrations
//! - **Diagnostics, not panics**: failing branches degrade to error call sites and keep resolving
//! - **Deterministic naming**: collision-free member names independent of discovery order
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_graph::{
//!     build_service_graph, CallSiteKind, Constructor, GraphRequest, KnownTypes, Parameter,
//!     ProviderDescription, RootService, ServiceRegistration, TypeCatalog, TypeModel, TypeRef,
//! };
//!
//! // Describe the types the provider may construct
//! let config = TypeRef::named("app", "Config");
//! let database = TypeRef::named("app", "Database");
//!
//! let mut catalog = TypeCatalog::new();
//! catalog.add(TypeModel::new(config.clone()).with_constructor(Constructor::new(vec![])));
//! catalog.add(
//!     TypeModel::new(database.clone())
//!         .with_constructor(Constructor::new(vec![Parameter::new("config", config.clone())])),
//! );
//!
//! // Describe the provider declaration
//! let mut provider =
//!     ProviderDescription::new(TypeRef::named("app", "AppProvider"), KnownTypes::standard());
//! provider.registrations.push(ServiceRegistration::singleton(config));
//! provider.registrations.push(ServiceRegistration::scoped(database.clone()));
//! provider.root_services.push(RootService::new(database));
//!
//! // Resolve the graph
//! let graph = build_service_graph(&GraphRequest {
//!     providers: vec![provider],
//!     catalog,
//! });
//! assert!(!graph.has_errors());
//!
//! let root = &graph.providers[0].root_call_sites[0];
//! assert!(matches!(root.kind, CallSiteKind::Constructor(_)));
//! assert_eq!(graph.names.accessor_name(&root.identity), "get_Database");
//! ```
//!
//! ## Service Lifetimes
//!
//! - **Singleton**: one cache slot on the provider, shared by every scope
//! - **Scoped**: one cache slot per created scope
//! - **Transient**: constructed fresh on every resolution, never cached
//!
//! ## Diagnostics
//!
//! Validation never aborts a run. Each failure is reported as a coded
//! [`Diagnostic`] and the failing branch becomes an error call site, so one
//! broken registration surfaces every independent problem in the same pass:
//!
//! ```rust
//! use ferrous_graph::{
//!     build_service_graph, GraphRequest, KnownTypes, ProviderDescription, RootService,
//!     ServiceRegistration, TypeCatalog, TypeRef,
//! };
//!
//! let mut provider =
//!     ProviderDescription::new(TypeRef::named("app", "AppProvider"), KnownTypes::standard());
//! provider
//!     .root_services
//!     .push(RootService::new(TypeRef::named("app", "Missing")));
//!
//! let graph = build_service_graph(&GraphRequest {
//!     providers: vec![provider],
//!     catalog: TypeCatalog::new(),
//! });
//! assert!(graph.has_errors());
//! assert_eq!(graph.providers[0].diagnostics[0].code(), "FG0010");
//! ```

// Module declarations
pub mod call_site;
pub mod catalog;
pub mod diagnostics;
pub mod disposal;
pub mod error;
pub mod identity;
pub mod index;
pub mod lifetime;
pub mod naming;
pub mod provider;
pub mod registration;
pub mod resolver;
pub mod runtime;
pub mod type_ref;

// Re-export core types
pub use call_site::{
    ArrayCallSite, CallSiteKind, CallSiteRef, ConstructorCallSite, ErrorCallSite,
    ExistingCallSite, FactoryCallSite, MemberCallSite, ResolveDelegateCallSite, ServiceCallSite,
};
pub use catalog::{
    Constructor, Disposability, MemberKind, MemberModel, Parameter, ParameterKey, TypeCatalog,
    TypeModel,
};
pub use diagnostics::{descriptors, Diagnostic, DiagnosticDescriptor, Severity};
pub use disposal::{DisposalPlan, ScopeLevel};
pub use error::GraphError;
pub use identity::ServiceIdentity;
pub use index::RegistrationIndex;
pub use lifetime::Lifetime;
pub use naming::{raw_base_name, NameMap};
pub use provider::{build_service_graph, GraphRequest, ServiceGraph, ServiceProvider};
pub use registration::{
    ImportedModule, KnownTypes, Location, MemberLocation, ProviderDescription, RootService,
    ServiceRegistration,
};
pub use resolver::GraphResolver;
pub use runtime::{Dispose, DisposeList, LazySlot};
pub use type_ref::{TypeKind, TypeRef};
