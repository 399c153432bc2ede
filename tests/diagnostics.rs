use ferrous_graph::{
    build_service_graph, Constructor, GraphRequest, ImportedModule, KnownTypes, MemberModel,
    Parameter, ProviderDescription, RootService, ServiceProvider, ServiceRegistration, Severity,
    TypeCatalog, TypeModel, TypeRef,
};

fn ty(name: &str) -> TypeRef {
    TypeRef::named("app", name)
}

fn resolve(provider: ProviderDescription, catalog: TypeCatalog) -> ServiceProvider {
    let graph = build_service_graph(&GraphRequest {
        providers: vec![provider],
        catalog,
    });
    graph.providers.into_iter().next().unwrap()
}

fn codes(provider: &ServiceProvider) -> Vec<&'static str> {
    provider.diagnostics.iter().map(|d| d.code()).collect()
}

#[test]
fn non_extensible_provider_is_reported() {
    let mut provider = ProviderDescription::new(ty("SealedProvider"), KnownTypes::standard());
    provider.is_extensible = false;

    let resolved = resolve(provider, TypeCatalog::new());
    assert_eq!(codes(&resolved), ["FG0005"]);
}

#[test]
fn non_module_import_is_reported() {
    let mut provider = ProviderDescription::new(ty("AppProvider"), KnownTypes::standard());
    provider.imports.push(ImportedModule {
        ty: ty("NotAModule"),
        is_module: false,
        location: None,
    });

    let resolved = resolve(provider, TypeCatalog::new());
    assert_eq!(codes(&resolved), ["FG0006"]);
}

#[test]
fn missing_public_constructor_is_reported() {
    let mut catalog = TypeCatalog::new();
    catalog.add(TypeModel::new(ty("NoCtor")));
    catalog.add(TypeModel::new(ty("IFace")).interface());

    let mut provider = ProviderDescription::new(ty("AppProvider"), KnownTypes::standard());
    provider.registrations.push(ServiceRegistration::singleton(ty("NoCtor")));
    provider.registrations.push(ServiceRegistration::singleton(ty("IFace")));
    provider.registrations.push(ServiceRegistration::singleton(ty("Unmodeled")));
    provider.root_services.push(RootService::new(ty("NoCtor")));
    provider.root_services.push(RootService::new(ty("IFace")));
    provider.root_services.push(RootService::new(ty("Unmodeled")));

    let resolved = resolve(provider, catalog);
    assert_eq!(codes(&resolved), ["FG0007", "FG0007", "FG0007"]);
    assert!(resolved.root_call_sites.iter().all(|cs| cs.is_error()));
}

#[test]
fn conflicting_construction_sources_are_reported() {
    let mut provider = ProviderDescription::new(ty("AppProvider"), KnownTypes::standard());
    provider.registrations.push(
        ServiceRegistration::singleton(ty("Thing"))
            .implemented_by(ty("ThingImpl"))
            .from_factory("CreateThing"),
    );

    let resolved = resolve(provider, TypeCatalog::new());
    assert_eq!(codes(&resolved), ["FG0011"]);
}

#[test]
fn value_member_used_as_factory_is_reported() {
    let mut provider = ProviderDescription::new(ty("AppProvider"), KnownTypes::standard());
    provider.members.push(MemberModel::value("ReadyThing", ty("Thing")));
    provider.registrations.push(
        ServiceRegistration::singleton(ty("Thing")).from_factory("ReadyThing"),
    );
    provider.root_services.push(RootService::new(ty("Thing")));

    let resolved = resolve(provider, TypeCatalog::new());
    assert_eq!(codes(&resolved), ["FG0012"]);
}

#[test]
fn delegate_member_is_a_valid_factory() {
    let mut catalog = TypeCatalog::new();
    catalog.add(TypeModel::new(ty("Thing")));

    let mut provider = ProviderDescription::new(ty("AppProvider"), KnownTypes::standard());
    provider.members.push(MemberModel::delegate("MakeThing", ty("Thing"), vec![]));
    provider.registrations.push(
        ServiceRegistration::singleton(ty("Thing")).from_factory("MakeThing"),
    );
    provider.root_services.push(RootService::new(ty("Thing")));

    let resolved = resolve(provider, catalog);
    assert!(!resolved.has_errors());
}

#[test]
fn open_generic_instance_registration_is_reported() {
    let open = TypeRef::generic("app", "IRepo", vec![TypeRef::param("T")]);
    let mut provider = ProviderDescription::new(ty("AppProvider"), KnownTypes::standard());
    provider
        .members
        .push(MemberModel::value("RepoInstance", open.clone()));
    provider.registrations.push(
        ServiceRegistration::singleton(open).from_instance("RepoInstance"),
    );

    let resolved = resolve(provider, TypeCatalog::new());
    assert_eq!(codes(&resolved), ["FG0021"]);
}

#[test]
fn singleton_depending_on_scoped_warns() {
    let mut catalog = TypeCatalog::new();
    catalog.add(TypeModel::new(ty("Session")).with_constructor(Constructor::new(vec![])));
    catalog.add(
        TypeModel::new(ty("Cache"))
            .with_constructor(Constructor::new(vec![Parameter::new("session", ty("Session"))])),
    );

    let mut provider = ProviderDescription::new(ty("AppProvider"), KnownTypes::standard());
    provider.registrations.push(ServiceRegistration::scoped(ty("Session")));
    provider.registrations.push(ServiceRegistration::singleton(ty("Cache")));
    provider.root_services.push(RootService::new(ty("Cache")));

    let resolved = resolve(provider, catalog);
    // A warning, not an error: the graph still resolves.
    assert!(!resolved.has_errors());
    assert_eq!(codes(&resolved), ["FG0030"]);
    assert_eq!(resolved.diagnostics[0].severity(), Severity::Warning);
    assert!(!resolved.root_call_sites[0].is_error());
}

#[test]
fn independent_failures_are_all_reported_in_one_pass() {
    let mut catalog = TypeCatalog::new();
    catalog.add(TypeModel::new(ty("Multi")).with_constructor(Constructor::new(vec![
        Parameter::new("first", ty("MissingFirst")),
        Parameter::new("second", ty("MissingSecond")),
    ])));

    let mut provider = ProviderDescription::new(ty("AppProvider"), KnownTypes::standard());
    provider.registrations.push(ServiceRegistration::transient(ty("Multi")));
    provider.root_services.push(RootService::new(ty("Multi")));
    provider.root_services.push(RootService::new(ty("AlsoMissing")));

    let resolved = resolve(provider, catalog);
    assert_eq!(codes(&resolved), ["FG0002", "FG0002", "FG0010"]);
}

#[test]
fn diagnostics_carry_registration_locations() {
    let mut provider = ProviderDescription::new(ty("AppProvider"), KnownTypes::standard());
    provider.registrations.push(
        ServiceRegistration::singleton(ty("NoCtor")).at("Services.cs:42"),
    );
    provider.root_services.push(RootService::new(ty("NoCtor")));

    let resolved = resolve(provider, TypeCatalog::new());
    assert_eq!(codes(&resolved), ["FG0007"]);
    assert_eq!(
        resolved.diagnostics[0].location.as_ref().map(|l| l.0.as_str()),
        Some("Services.cs:42")
    );
}
