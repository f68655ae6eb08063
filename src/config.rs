use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::error::SensorError;
use crate::resource::ComponentConfig;
use crate::sensor::detections_model;

const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_VISION_ADDR: &str = "stub://vision";
const DEFAULT_VISION_NAME: &str = "vision";
const DEFAULT_COMPONENT_NAME: &str = "detections";

/// Attributes of a detections sensor.
///
/// Missing strings decode as empty so that [`DetectionsConfig::validate`]
/// reports them as required fields instead of a decode error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionsConfig {
    /// Camera the detector runs against.
    #[serde(default, alias = "Camera")]
    pub camera: String,
    /// Vision service providing detections.
    #[serde(default)]
    pub detector: String,
    /// Labels to report. Empty counts every label seen.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

impl DetectionsConfig {
    /// Check required fields. Returns the implicit dependencies
    /// (camera, then detector).
    ///
    /// `path` is the location of the component in the robot config, e.g.
    /// `components.0`.
    pub fn validate(&self, path: &str) -> Result<Vec<String>, SensorError> {
        if self.camera.is_empty() {
            return Err(SensorError::FieldRequired {
                path: path.to_string(),
                field: "camera",
            });
        }
        if self.detector.is_empty() {
            return Err(SensorError::FieldRequired {
                path: path.to_string(),
                field: "detector",
            });
        }
        Ok(vec![self.camera.clone(), self.detector.clone()])
    }

    pub fn to_attributes(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}

/// A vision service the module connects to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    /// `stub://...` or `http(s)://...`
    pub address: String,
}

#[derive(Debug, Deserialize, Default)]
struct ModuleConfigFile {
    poll_interval_ms: Option<u64>,
    services: Option<Vec<ServiceConfig>>,
    components: Option<Vec<ComponentConfig>>,
}

/// Configuration of the module host binary.
#[derive(Debug, Clone)]
pub struct ModuleConfig {
    pub poll_interval: Duration,
    pub services: Vec<ServiceConfig>,
    pub components: Vec<ComponentConfig>,
}

impl ModuleConfig {
    /// Load from the file named by `DETECTIONS_SENSOR_CONFIG`, or from the
    /// environment alone when it is unset.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("DETECTIONS_SENSOR_CONFIG").ok();
        Self::load_from(config_path.as_deref().map(Path::new))
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file_cfg = match path {
            Some(path) => Some(read_config_file(path)?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: ModuleConfigFile) -> Self {
        Self {
            poll_interval: Duration::from_millis(
                file.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            ),
            services: file.services.unwrap_or_default(),
            components: file.components.unwrap_or_default(),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(interval) = std::env::var("DETECTIONS_POLL_INTERVAL_MS") {
            let millis: u64 = interval.parse().map_err(|_| {
                anyhow!("DETECTIONS_POLL_INTERVAL_MS must be an integer number of milliseconds")
            })?;
            self.poll_interval = Duration::from_millis(millis);
        }

        if self.components.is_empty() {
            let attrs = DetectionsConfig {
                camera: env_non_empty("DETECTIONS_CAMERA").unwrap_or_default(),
                detector: env_non_empty("DETECTIONS_DETECTOR").unwrap_or_default(),
                labels: env_non_empty("DETECTIONS_LABELS")
                    .map(|labels| split_labels(&labels))
                    .unwrap_or_default(),
            };
            self.components.push(ComponentConfig::new(
                DEFAULT_COMPONENT_NAME,
                detections_model(),
                attrs.to_attributes(),
            ));
        }

        if self.services.is_empty() {
            let name = env_non_empty("DETECTIONS_DETECTOR")
                .unwrap_or_else(|| DEFAULT_VISION_NAME.to_string());
            let address = env_non_empty("DETECTIONS_VISION_ADDR")
                .unwrap_or_else(|| DEFAULT_VISION_ADDR.to_string());
            self.services.push(ServiceConfig { name, address });
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(anyhow!("poll interval must be greater than zero"));
        }

        let mut seen = HashSet::new();
        for service in &self.services {
            if service.name.trim().is_empty() {
                return Err(anyhow!("vision service with address {} has no name", service.address));
            }
            if !seen.insert(service.name.as_str()) {
                return Err(anyhow!("duplicate vision service '{}'", service.name));
            }
        }

        let mut seen = HashSet::new();
        for component in &self.components {
            if !seen.insert(component.name.as_str()) {
                return Err(anyhow!("duplicate component '{}'", component.name));
            }
        }

        for (index, component) in self.components.iter_mut().enumerate() {
            component.set_path(format!("components.{}", index));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<ModuleConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg = if is_toml {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

pub fn split_labels(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validate_returns_implicit_dependencies() {
        let cfg = DetectionsConfig {
            camera: "front".to_string(),
            detector: "people".to_string(),
            labels: vec![],
        };
        assert_eq!(cfg.validate("components.0").unwrap(), vec!["front", "people"]);
    }

    #[test]
    fn missing_camera_is_reported_first() {
        let cfg = DetectionsConfig::default();
        let err = cfg.validate("components.3").unwrap_err();
        assert_eq!(err.required_field(), Some("camera"));
        assert!(err.to_string().contains("components.3"));
    }

    #[test]
    fn missing_detector_is_reported() {
        let cfg = DetectionsConfig {
            camera: "front".to_string(),
            ..Default::default()
        };
        let err = cfg.validate("components.0").unwrap_err();
        assert_eq!(err.required_field(), Some("detector"));
    }

    #[test]
    fn decodes_legacy_camera_key_and_optional_labels() {
        let cfg: DetectionsConfig =
            serde_json::from_value(json!({"Camera": "front", "detector": "people"})).unwrap();
        assert_eq!(cfg.camera, "front");
        assert!(cfg.labels.is_empty());

        let cfg: DetectionsConfig = serde_json::from_value(json!({
            "camera": "front",
            "detector": "people",
            "labels": ["cat", "dog"]
        }))
        .unwrap();
        assert_eq!(cfg.labels, vec!["cat", "dog"]);
    }

    #[test]
    fn attributes_omit_empty_labels() {
        let cfg = DetectionsConfig {
            camera: "front".to_string(),
            detector: "people".to_string(),
            labels: vec![],
        };
        let attrs = cfg.to_attributes();
        assert_eq!(attrs["camera"], "front");
        assert!(!attrs.contains_key("labels"));
    }

    #[test]
    fn split_labels_trims_and_drops_empty_entries() {
        assert_eq!(split_labels(" cat, dog ,,person "), vec!["cat", "dog", "person"]);
        assert!(split_labels(" , ").is_empty());
    }
}
