//! Bootstrap integration tests: scanning, registration, injection and routing.
//!
//! Each fixture module is its own scan namespace.

use sprig_core::*;
use std::any::type_name;

mod shop {
    use sprig_core::*;

    pub trait Catalog: Send + Sync {
        fn price(&self, item: &str) -> i64;
    }

    pub trait Audit: Send + Sync {
        fn trail(&self) -> &'static str;
    }

    #[derive(Default)]
    pub struct CatalogService;

    impl Component for CatalogService {}

    impl Catalog for CatalogService {
        fn price(&self, item: &str) -> i64 {
            item.len() as i64 * 10
        }
    }

    impl Audit for CatalogService {
        fn trail(&self) -> &'static str {
            "catalog"
        }
    }

    sprig_core::service!(CatalogService: dyn Catalog, dyn Audit);

    // Sorts ahead of CatalogService, so it is registered before its dependency
    #[derive(Default)]
    pub struct CartAction {
        pub catalog: Autowired<dyn Catalog>,
        pub audit: Autowired<dyn Audit>,
    }

    impl Component for CartAction {
        fn injection_points(&self) -> Vec<InjectionPoint<'_>> {
            vec![
                InjectionPoint::by_type("catalog", &self.catalog),
                InjectionPoint::by_name("audit", "catalogService", &self.audit),
            ]
        }
    }

    impl Controller for CartAction {
        fn request_mapping() -> &'static str {
            "/cart/"
        }

        fn handlers() -> Vec<HandlerMethod<Self>> {
            vec![
                HandlerMethod::new("price", "//price", CartAction::price)
                    .param(Param::named("item", TypeTag::Text)),
            ]
        }
    }

    impl CartAction {
        fn price(&self, args: &mut Arguments<'_>) -> HandlerResult {
            let item: String = args.require(0)?;
            Ok(Some(self.catalog.require()?.price(&item).to_string()))
        }
    }

    sprig_core::controller!(CartAction);
}

mod named {
    use sprig_core::*;

    #[derive(Default)]
    pub struct SystemClock;

    impl Component for SystemClock {}

    sprig_core::service!(SystemClock as " wallClock ");
}

mod clash {
    use sprig_core::*;

    pub trait Greeter: Send + Sync {}

    #[derive(Default)]
    pub struct EnglishGreeter;

    impl Component for EnglishGreeter {}
    impl Greeter for EnglishGreeter {}

    sprig_core::service!(EnglishGreeter: dyn Greeter);

    #[derive(Default)]
    pub struct FrenchGreeter;

    impl Component for FrenchGreeter {}
    impl Greeter for FrenchGreeter {}

    sprig_core::service!(FrenchGreeter: dyn Greeter);
}

mod dupes {
    use sprig_core::*;

    #[derive(Default)]
    pub struct Alpha;

    impl Component for Alpha {}

    sprig_core::service!(Alpha as "same");

    #[derive(Default)]
    pub struct Beta;

    impl Component for Beta {}

    sprig_core::service!(Beta as "same");
}

mod fragile {
    use sprig_core::*;

    pub struct Fragile;

    impl Component for Fragile {}

    impl Fragile {
        fn connect() -> Result<Self> {
            panic!("connection refused");
        }
    }

    sprig_core::service!(Fragile; new = Fragile::connect);
}

mod lonely {
    use sprig_core::*;

    pub trait Mailer: Send + Sync {
        fn send(&self) -> String;
    }

    #[derive(Default)]
    pub struct NotifyAction {
        mailer: Autowired<dyn Mailer>,
    }

    impl Component for NotifyAction {
        fn injection_points(&self) -> Vec<InjectionPoint<'_>> {
            vec![InjectionPoint::by_type("mailer", &self.mailer)]
        }
    }

    impl Controller for NotifyAction {
        fn handlers() -> Vec<HandlerMethod<Self>> {
            vec![HandlerMethod::new("notify", "/notify", NotifyAction::notify)]
        }
    }

    impl NotifyAction {
        fn notify(&self, _args: &mut Arguments<'_>) -> HandlerResult {
            Ok(Some(self.mailer.require()?.send()))
        }
    }

    sprig_core::controller!(NotifyAction);
}

fn bootstrap(namespace: &str) -> Result<ApplicationContext> {
    ApplicationContext::bootstrap(ContextConfig::new(namespace))
}

#[test]
fn test_registry_holds_primaries_and_contract_aliases() {
    let context = bootstrap("bootstrap_tests.shop").unwrap();
    let container = context.container();

    // One controller, one service implementing two contracts
    assert_eq!(container.len(), 2);
    assert_eq!(container.alias_count(), 2);
    assert!(container.contains("cartAction"));
    assert!(container.contains("catalogService"));
    assert!(container.contains(type_name::<dyn shop::Catalog>()));
    assert!(container.contains(type_name::<dyn shop::Audit>()));

    let primary = container.get("catalogService").unwrap();
    let alias = container.get(type_name::<dyn shop::Catalog>()).unwrap();
    assert_eq!(primary.instance_addr(), alias.instance_addr());
    assert_eq!(primary.role(), Role::Service);
}

#[test]
fn test_injection_ignores_registration_order() {
    let context = bootstrap("bootstrap_tests::shop").unwrap();
    let cart = context
        .container()
        .resolve::<shop::CartAction>("cartAction")
        .unwrap();

    assert!(cart.catalog.is_wired());
    assert_eq!(cart.audit.require().unwrap().trail(), "catalog");
    assert_eq!(context.injection_report().injected, 2);
}

#[test]
fn test_route_key_collapses_separators() {
    let context = bootstrap("bootstrap_tests.shop").unwrap();
    let route = context.routes().resolve("/cart/price").unwrap();
    assert_eq!(route.controller(), "cartAction");
    assert_eq!(route.method(), "price");
}

#[test]
fn test_explicit_service_name_is_trimmed() {
    let context = bootstrap("bootstrap_tests.named").unwrap();
    assert!(context.container().contains("wallClock"));
    assert!(!context.container().contains("systemClock"));
    assert_eq!(context.container().alias_count(), 0);
}

#[test]
fn test_duplicate_contract_fails_in_either_order() {
    let found = Scanner::new("bootstrap_tests.clash").scan().unwrap();
    assert_eq!(found.len(), 2);

    let forward = Container::from_descriptors(found.iter().copied()).unwrap_err();
    let backward = Container::from_descriptors(found.iter().rev().copied()).unwrap_err();

    for err in [forward, backward] {
        match err {
            Error::DuplicateContractBinding { contract, .. } => {
                assert_eq!(contract, type_name::<dyn clash::Greeter>());
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    let err = bootstrap("bootstrap_tests.clash").unwrap_err();
    assert!(err.is_bootstrap_fatal());
}

#[test]
fn test_duplicate_bean_name_fails() {
    let err = bootstrap("bootstrap_tests.dupes").unwrap_err();
    assert!(matches!(err, Error::DuplicateBeanName { ref name } if name == "same"));
}

#[test]
fn test_constructor_panic_is_instantiation_error() {
    let err = bootstrap("bootstrap_tests.fragile").unwrap_err();
    match err {
        Error::Instantiation { component, reason } => {
            assert_eq!(component, "bootstrap_tests::fragile::Fragile");
            assert!(reason.contains("connection refused"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_unresolved_namespace_is_fatal() {
    let err = bootstrap("bootstrap_tests.nowhere").unwrap_err();
    assert!(matches!(err, Error::UnresolvedNamespace(_)));

    let err = bootstrap("  ").unwrap_err();
    assert!(matches!(err, Error::UnresolvedNamespace(_)));
}

#[test]
fn test_namespace_prefix_is_not_a_module_boundary() {
    // `bootstrap_tests::sho` must not pick up `bootstrap_tests::shop`
    let err = bootstrap("bootstrap_tests.sho").unwrap_err();
    assert!(matches!(err, Error::UnresolvedNamespace(_)));
}

#[test]
fn test_missing_dependency_left_unset_by_default() {
    let context = bootstrap("bootstrap_tests.lonely").unwrap();
    assert_eq!(context.injection_report().unresolved.len(), 1);

    let response = context.handle(WebRequest::new("GET", "/notify"));
    assert_eq!(response.status, 500);
    assert!(response.body_str().contains("was never injected"));
}

#[test]
fn test_missing_dependency_fails_under_strict_policy() {
    let config = ContextConfig::new("bootstrap_tests.lonely")
        .with_missing_dependency(MissingDependencyPolicy::Fail);
    let err = ApplicationContext::bootstrap(config).unwrap_err();
    assert!(matches!(err, Error::MissingDependency { ref field, .. } if field == "mailer"));
}
