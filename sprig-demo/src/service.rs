// Demo business service

use sprig_core::Component;

/// Greeting contract resolved by the demo controller
pub trait DemoApi: Send + Sync {
    fn get(&self, name: &str) -> String;
}

#[derive(Debug, Default)]
pub struct DemoService;

impl Component for DemoService {}

impl DemoApi for DemoService {
    fn get(&self, name: &str) -> String {
        format!("My name is {}", name)
    }
}

sprig_core::service!(DemoService: dyn DemoApi);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get() {
        assert_eq!(DemoService.get("World"), "My name is World");
    }
}
