use proptest::prelude::*;

use ferrous_graph::{
    build_service_graph, raw_base_name, Constructor, GraphRequest, KnownTypes, NameMap,
    ProviderDescription, RootService, ServiceRegistration, TypeCatalog, TypeModel, TypeRef,
};

fn colliding_types() -> Vec<TypeRef> {
    vec![
        TypeRef::generic("alpha", "Cache", vec![TypeRef::named("x", "User")]),
        TypeRef::generic("beta", "Cache", vec![TypeRef::named("y", "User")]),
        TypeRef::generic("gamma", "Cache", vec![TypeRef::named("z", "User")]),
        TypeRef::named("app", "Config"),
        TypeRef::named("app", "Database"),
    ]
}

#[test]
fn collisions_are_suffixed_in_ordinal_order() {
    let types = colliding_types();
    let names = NameMap::from_types(types.clone());

    // alpha < beta < gamma by fully qualified ordinal comparison
    assert_eq!(names.base_name(&types[0]), "Cache_User_0");
    assert_eq!(names.base_name(&types[1]), "Cache_User_1");
    assert_eq!(names.base_name(&types[2]), "Cache_User_2");
    assert_eq!(names.base_name(&types[3]), "Config");
    assert_eq!(names.base_name(&types[4]), "Database");
}

#[test]
fn lone_types_keep_their_raw_base_name() {
    let config = TypeRef::named("app", "Config");
    let names = NameMap::from_types(vec![config.clone()]);
    assert_eq!(names.base_name(&config), raw_base_name(&config));
}

#[test]
fn duplicate_occurrences_do_not_create_suffixes() {
    let config = TypeRef::named("app", "Config");
    let names = NameMap::from_types(vec![config.clone(), config.clone(), config.clone()]);
    assert_eq!(names.base_name(&config), "Config");
}

#[test]
fn graph_names_cover_root_identities() {
    let config = TypeRef::named("app", "Config");
    let mut catalog = TypeCatalog::new();
    catalog.add(TypeModel::new(config.clone()).with_constructor(Constructor::new(vec![])));

    let mut provider =
        ProviderDescription::new(TypeRef::named("app", "AppProvider"), KnownTypes::standard());
    provider.registrations.push(ServiceRegistration::singleton(config.clone()));
    provider.registrations.push(
        ServiceRegistration::singleton(config.clone()).with_name("fallback"),
    );
    provider.root_services.push(RootService::new(config.clone()));
    provider.root_services.push(RootService::named(config, "fallback"));

    let graph = build_service_graph(&GraphRequest {
        providers: vec![provider],
        catalog,
    });
    assert!(!graph.has_errors());

    let provider = &graph.providers[0];
    assert_eq!(graph.names.accessor_name(&provider.root_call_sites[0].identity), "get_Config");
    assert_eq!(
        graph.names.accessor_name(&provider.root_call_sites[1].identity),
        "get_Config_fallback"
    );
    assert_eq!(graph.names.cache_slot(&provider.root_call_sites[0].identity), "_Config");
}

proptest! {
    #[test]
    fn assignment_is_permutation_invariant(shuffled in Just(colliding_types()).prop_shuffle()) {
        let baseline = NameMap::from_types(colliding_types());
        let permuted = NameMap::from_types(shuffled);
        for ty in colliding_types() {
            prop_assert_eq!(baseline.base_name(&ty), permuted.base_name(&ty));
        }
    }

    #[test]
    fn assigned_names_are_unique(shuffled in Just(colliding_types()).prop_shuffle()) {
        let names = NameMap::from_types(shuffled.clone());
        let mut seen = std::collections::HashSet::new();
        for ty in &shuffled {
            prop_assert!(seen.insert(names.base_name(ty)));
        }
    }
}
