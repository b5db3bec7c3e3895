// Demo controller mounted at /demo

use crate::service::DemoApi;
use sprig_core::{
    Arguments, Autowired, Component, Controller, HandlerMethod, HandlerResult, InjectionPoint,
    Param, TypeTag,
};

#[derive(Default)]
pub struct DemoAction {
    demo_service: Autowired<dyn DemoApi>,
}

impl Component for DemoAction {
    fn injection_points(&self) -> Vec<InjectionPoint<'_>> {
        vec![InjectionPoint::by_type("demo_service", &self.demo_service)]
    }
}

impl Controller for DemoAction {
    fn request_mapping() -> &'static str {
        "/demo"
    }

    fn handlers() -> Vec<HandlerMethod<Self>> {
        vec![
            HandlerMethod::new("query", "/query", DemoAction::query)
                .param(Param::request())
                .param(Param::response())
                .param(Param::named("name", TypeTag::Text)),
            HandlerMethod::new("add", "/add", DemoAction::add)
                .param(Param::response())
                .param(Param::named("a", TypeTag::Integer))
                .param(Param::named("b", TypeTag::Integer))
                .param(Param::request()),
            HandlerMethod::new("sub", "/sub", DemoAction::sub)
                .param(Param::request())
                .param(Param::response())
                .param(Param::named("a", TypeTag::Decimal))
                .param(Param::named("b", TypeTag::Decimal)),
            HandlerMethod::new("remove", "/remove", DemoAction::remove)
                .param(Param::named("id", TypeTag::Integer)),
        ]
    }
}

impl DemoAction {
    fn query(&self, args: &mut Arguments<'_>) -> HandlerResult {
        let name: String = args.require(2)?;
        let result = self.demo_service.require()?.get(&name);
        args.response(1)?.write(&result);
        Ok(None)
    }

    fn add(&self, args: &mut Arguments<'_>) -> HandlerResult {
        let a: i64 = args.require(1)?;
        let b: i64 = args.require(2)?;
        args.response(0)?.write(&format!("{}+{}={}", a, b, a + b));
        Ok(None)
    }

    fn sub(&self, args: &mut Arguments<'_>) -> HandlerResult {
        let a: f64 = args.require(2)?;
        let b: f64 = args.require(3)?;
        args.response(1)?.write(&format!("{:?}-{:?}={:?}", a, b, a - b));
        Ok(None)
    }

    fn remove(&self, args: &mut Arguments<'_>) -> HandlerResult {
        let id: i64 = args.require(0)?;
        Ok(Some(id.to_string()))
    }
}

sprig_core::controller!(DemoAction);
