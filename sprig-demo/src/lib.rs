// Demo application for the Sprig container

pub mod action;
pub mod service;

pub use action::DemoAction;
pub use service::{DemoApi, DemoService};

/// Namespace holding the demo components
pub const SCAN_PACKAGE: &str = module_path!();
