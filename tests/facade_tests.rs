//! Tests of the umbrella crate: macros, prelude and optional configuration.

use sprig::prelude::*;

mod clock {
    use sprig::prelude::*;

    pub trait Clock: Send + Sync {
        fn now(&self) -> i64;
    }

    #[derive(Default)]
    pub struct FixedClock;

    impl Component for FixedClock {}

    impl Clock for FixedClock {
        fn now(&self) -> i64 {
            1_700_000_000
        }
    }

    sprig::service!(FixedClock: dyn Clock);

    #[derive(Default)]
    pub struct TimeAction {
        clock: Autowired<dyn Clock>,
    }

    impl Component for TimeAction {
        fn injection_points(&self) -> Vec<InjectionPoint<'_>> {
            vec![InjectionPoint::by_type("clock", &self.clock)]
        }
    }

    impl Controller for TimeAction {
        fn request_mapping() -> &'static str {
            "/time"
        }

        fn handlers() -> Vec<HandlerMethod<Self>> {
            vec![
                HandlerMethod::new("now", "/now", TimeAction::now)
                    .param(Param::named("offset", TypeTag::Integer)),
            ]
        }
    }

    impl TimeAction {
        fn now(&self, args: &mut Arguments<'_>) -> HandlerResult {
            let offset: i64 = args.require(0)?;
            Ok(Some((self.clock.require()?.now() + offset).to_string()))
        }
    }

    sprig::controller!(TimeAction);

    pub const NAMESPACE: &str = module_path!();
}

#[test]
fn test_facade_bootstraps_components() {
    let context = ApplicationContext::bootstrap(ContextConfig::new(clock::NAMESPACE)).unwrap();

    assert_eq!(context.container().len(), 2);
    assert!(context.container().contains("fixedClock"));
    assert!(context.container().contains("timeAction"));

    let response = context.handle(WebRequest::new("GET", "/time/now").with_query("offset=5").unwrap());
    assert_eq!(response.status, 200);
    assert_eq!(response.body_str(), "1700000005");
}

#[test]
fn test_facade_reports_not_found() {
    let context = ApplicationContext::bootstrap(ContextConfig::new(clock::NAMESPACE)).unwrap();
    let response = context.handle(WebRequest::new("GET", "/time/later"));
    assert_eq!(response.status, 404);
}

#[cfg(feature = "config")]
#[test]
fn test_facade_config_manager() {
    let manager = ConfigManager::new();
    manager
        .load_str(
            &format!("scanPackage={}\ncontextPath=/api\n", clock::NAMESPACE),
            FileFormat::Properties,
        )
        .unwrap();

    let context = ApplicationContext::bootstrap(manager.context_config().unwrap()).unwrap();
    let response = context.handle(WebRequest::new("GET", "/api/time/now").with_query("offset=0").unwrap());
    assert_eq!(response.body_str(), "1700000000");
}
