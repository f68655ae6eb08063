use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{anyhow, Result};

use crate::config::DetectionsConfig;
use crate::detect::{DetectionProvider, Dependencies};
use crate::error::{ReadingsError, SensorError};
use crate::resource::{Api, ComponentConfig, Model, ModelRegistry, Registration, ResourceName};

use super::readings::{count_into, seed_readings, LabelFilter, ReadingSet};
use super::Sensor;

/// `hipsterbrown:sensor:detections`
pub fn detections_model() -> Model {
    Model::new("hipsterbrown", "sensor", "detections")
}

/// Register every model this crate provides.
pub fn register_builtin_models(registry: &mut ModelRegistry) -> Result<()> {
    registry.register(
        Api::sensor(),
        detections_model(),
        Registration {
            validator: validate_detections,
            constructor: construct_detections,
        },
    )
}

fn validate_detections(conf: &ComponentConfig) -> Result<Vec<String>, SensorError> {
    conf.native_config::<DetectionsConfig>()?.validate(conf.path())
}

fn construct_detections(
    deps: &Dependencies,
    conf: &ComponentConfig,
) -> Result<Arc<dyn Sensor>, SensorError> {
    Ok(Arc::new(DetectionsSensor::new(deps, conf)?))
}

/// Configuration plus the detector resolved for it.
struct SensorState {
    config: DetectionsConfig,
    filter: LabelFilter,
    detector: Arc<dyn DetectionProvider>,
}

impl SensorState {
    fn build(deps: &Dependencies, conf: &ComponentConfig) -> Result<Self, SensorError> {
        let config: DetectionsConfig = conf.native_config()?;
        config.validate(conf.path())?;
        let detector = deps
            .vision(&config.detector)
            .map_err(|e| SensorError::missing_detector(&config.detector, e))?;
        Ok(Self {
            filter: LabelFilter::new(&config.labels),
            config,
            detector,
        })
    }
}

/// Sensor reporting how many objects of each label a vision service detects
/// on a camera.
///
/// Reads take one snapshot of the configuration and detector, so a
/// concurrent [`Sensor::reconfigure`] never mixes two configurations into a
/// single reading.
pub struct DetectionsSensor {
    name: ResourceName,
    state: RwLock<Arc<SensorState>>,
    closed: AtomicBool,
}

impl DetectionsSensor {
    pub fn new(deps: &Dependencies, conf: &ComponentConfig) -> Result<Self, SensorError> {
        let state = SensorState::build(deps, conf)?;
        log::info!(
            "{} counting {} on camera {} via {}",
            conf.resource_name(),
            describe_labels(&state.config.labels),
            state.config.camera,
            state.config.detector
        );
        Ok(Self {
            name: conf.resource_name(),
            state: RwLock::new(Arc::new(state)),
            closed: AtomicBool::new(false),
        })
    }

    /// Current configuration.
    pub fn config(&self) -> DetectionsConfig {
        self.snapshot().config.clone()
    }

    fn snapshot(&self) -> Arc<SensorState> {
        // The slot only ever holds a complete state, so a poisoned lock
        // still guards a consistent value.
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Sensor for DetectionsSensor {
    fn name(&self) -> &ResourceName {
        &self.name
    }

    fn readings(&self) -> Result<ReadingSet, ReadingsError> {
        let state = self.snapshot();
        let mut readings = seed_readings(&state.config.labels);

        if self.closed.load(Ordering::Acquire) {
            return Err(ReadingsError::new(
                &state.config.camera,
                readings,
                anyhow!("{} is closed", self.name),
            ));
        }

        let detections = match state.detector.detections_from_camera(&state.config.camera) {
            Ok(detections) => detections,
            Err(e) => {
                log::info!("detections error: {:?} ({:#})", readings, e);
                return Err(ReadingsError::new(&state.config.camera, readings, e));
            }
        };

        count_into(&mut readings, &state.filter, &detections);
        Ok(readings)
    }

    fn reconfigure(&self, deps: &Dependencies, conf: &ComponentConfig) -> Result<(), SensorError> {
        let next = SensorState::build(deps, conf)?;
        log::info!(
            "{} reconfigured: {} on camera {} via {}",
            self.name,
            describe_labels(&next.config.labels),
            next.config.camera,
            next.config.detector
        );
        let mut slot = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Arc::new(next);
        Ok(())
    }

    fn do_command(
        &self,
        _cmd: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<serde_json::Map<String, serde_json::Value>, SensorError> {
        Err(SensorError::Unimplemented)
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            log::debug!("{} closed", self.name);
        }
    }
}

fn describe_labels(labels: &[String]) -> String {
    if labels.is_empty() {
        "all labels".to_string()
    } else {
        format!("labels [{}]", labels.join(", "))
    }
}
