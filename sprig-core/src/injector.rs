// Dependency injection over a fully populated container

use crate::config::MissingDependencyPolicy;
use crate::{Container, Error, Result};
use tracing::{debug, warn};

/// Outcome of an injection pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionReport {
    /// Slots that received a bean
    pub injected: usize,
    /// `component.field -> target` for slots left unset
    pub unresolved: Vec<String>,
}

/// Fills every marked slot of every bean from the container
#[derive(Debug, Clone, Copy, Default)]
pub struct Injector {
    policy: MissingDependencyPolicy,
}

impl Injector {
    pub fn new(policy: MissingDependencyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MissingDependencyPolicy {
        self.policy
    }

    /// Wire all beans
    ///
    /// The container is complete before this runs, so the order in which
    /// beans were registered does not matter.
    pub fn inject(&self, container: &Container) -> Result<InjectionReport> {
        let mut report = InjectionReport::default();

        for bean in container.beans() {
            for point in bean.component().injection_points() {
                if point.slot.is_filled() {
                    continue;
                }

                let target = point.target_name();
                let Some(dependency) = container.get(target) else {
                    match self.policy {
                        MissingDependencyPolicy::Fail => {
                            return Err(Error::MissingDependency {
                                component: bean.name().to_string(),
                                field: point.field.to_string(),
                                target: target.to_string(),
                            });
                        }
                        MissingDependencyPolicy::LeaveUnset => {
                            warn!(
                                bean = bean.name(),
                                field = point.field,
                                wanted = target,
                                "No bean for injection point, leaving it unset"
                            );
                            report
                                .unresolved
                                .push(format!("{}.{} -> {}", bean.name(), point.field, target));
                            continue;
                        }
                    }
                };

                if !point.slot.fill(dependency) {
                    return Err(Error::InjectionTypeMismatch {
                        component: bean.name().to_string(),
                        field: point.field.to_string(),
                        target: target.to_string(),
                        expected: point.slot.target_type().to_string(),
                    });
                }

                debug!(
                    bean = bean.name(),
                    field = point.field,
                    dependency = dependency.name(),
                    "Injected dependency"
                );
                report.injected += 1;
            }
        }

        Ok(report)
    }
}
