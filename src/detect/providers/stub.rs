use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};

use crate::detect::provider::DetectionProvider;
use crate::detect::result::Detection;

#[derive(Clone, Debug)]
enum Script {
    Detections(Vec<Detection>),
    Failure(String),
}

/// Stub vision service for testing. Returns scripted detections per camera.
///
/// Cameras without a script yield no detections.
pub struct StubProvider {
    name: String,
    scripts: RwLock<HashMap<String, Script>>,
}

impl StubProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scripts: RwLock::new(HashMap::new()),
        }
    }

    /// Builder form of [`StubProvider::set_labels`].
    pub fn with_labels<I, S>(self, camera: &str, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_labels(camera, labels);
        self
    }

    /// Script one full-confidence detection per label for `camera`.
    pub fn set_labels<I, S>(&self, camera: &str, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let detections = labels
            .into_iter()
            .map(|label| Detection::new(label, 1.0))
            .collect();
        self.set_detections(camera, detections);
    }

    pub fn set_detections(&self, camera: &str, detections: Vec<Detection>) {
        self.script(camera, Script::Detections(detections));
    }

    /// Make every fetch for `camera` fail with `message`.
    pub fn fail_with(&self, camera: &str, message: impl Into<String>) {
        self.script(camera, Script::Failure(message.into()));
    }

    fn script(&self, camera: &str, script: Script) {
        let mut scripts = self
            .scripts
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        scripts.insert(camera.to_string(), script);
    }
}

impl DetectionProvider for StubProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn detections_from_camera(&self, camera: &str) -> Result<Vec<Detection>> {
        let scripts = self
            .scripts
            .read()
            .map_err(|_| anyhow!("stub provider lock poisoned"))?;
        match scripts.get(camera) {
            Some(Script::Detections(detections)) => Ok(detections.clone()),
            Some(Script::Failure(message)) => Err(anyhow!("{}", message)),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_returns_scripted_detections() {
        let stub = StubProvider::new("vision").with_labels("front", ["cat", "dog"]);

        let front = stub.detections_from_camera("front").unwrap();
        let labels: Vec<&str> = front.iter().map(Detection::label).collect();
        assert_eq!(labels, vec!["cat", "dog"]);

        assert!(stub.detections_from_camera("back").unwrap().is_empty());
    }

    #[test]
    fn stub_failure_replaces_detections() {
        let stub = StubProvider::new("vision").with_labels("front", ["cat"]);
        stub.fail_with("front", "camera offline");

        let err = stub.detections_from_camera("front").unwrap_err();
        assert_eq!(err.to_string(), "camera offline");
    }
}
