use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};

use super::provider::DetectionProvider;

/// Resolved vision-service dependencies, indexed by service name.
///
/// Providers are shared behind `Arc` because `DetectionProvider` only needs
/// `&self` and several sensors may depend on the same service.
#[derive(Clone, Default)]
pub struct Dependencies {
    vision: HashMap<String, Arc<dyn DetectionProvider>>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own name. A later registration with the
    /// same name replaces the earlier one.
    pub fn insert<P: DetectionProvider + 'static>(&mut self, provider: P) {
        self.insert_shared(Arc::new(provider));
    }

    pub fn insert_shared(&mut self, provider: Arc<dyn DetectionProvider>) {
        let name = provider.name().to_string();
        if self.vision.insert(name.clone(), provider).is_some() {
            log::debug!("vision service '{}' replaced", name);
        }
    }

    /// Resolve a vision service by name.
    pub fn vision(&self, name: &str) -> Result<Arc<dyn DetectionProvider>> {
        self.vision
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("resource \"rdk:service:vision/{}\" not found", name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vision.contains_key(name)
    }

    /// Registered service names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.vision.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dependencies")
            .field("vision", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::StubProvider;

    #[test]
    fn resolves_registered_vision_service() {
        let mut deps = Dependencies::new();
        deps.insert(StubProvider::new("people"));
        deps.insert(StubProvider::new("animals"));

        assert_eq!(deps.names(), vec!["animals", "people"]);
        assert!(deps.contains("people"));
        assert_eq!(deps.vision("people").unwrap().name(), "people");
    }

    #[test]
    fn missing_vision_service_is_an_error() {
        let deps = Dependencies::new();
        let err = match deps.vision("ghost") {
            Ok(_) => panic!("expected missing dependency"),
            Err(err) => err,
        };
        assert!(err.to_string().contains("ghost"));
        assert!(err.to_string().contains("not found"));
    }
}
