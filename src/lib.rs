//! Detections Sensor
//!
//! A sensor component that polls a vision service over a configured camera
//! and reports how many objects of each label it detected.
//!
//! # Readings
//!
//! Every read:
//!
//! 1. Seeds each configured label at zero, so "not seen this frame" is
//!    distinguishable from "not tracked".
//! 2. Fetches detections once from the configured detector. No retries.
//! 3. Counts detections per label, skipping labels outside the configured
//!    allow-list (an empty list counts everything).
//!
//! A failed fetch still yields the zero-seeded readings, carried inside the
//! returned [`ReadingsError`].
//!
//! # Module Structure
//!
//! - `config`: component attributes and module host configuration
//! - `detect`: detections, vision-service providers, dependency resolution
//! - `resource`: API/model naming and the model registry
//! - `sensor`: the aggregation and the detections sensor model

pub mod config;
pub mod detect;
pub mod error;
pub mod resource;
pub mod sensor;

pub use config::{DetectionsConfig, ModuleConfig, ServiceConfig};
pub use detect::{connect_vision_service, Dependencies, Detection, DetectionProvider, StubProvider};
pub use error::{ReadingsError, SensorError};
pub use resource::{Api, ComponentConfig, Model, ModelRegistry, ResourceName};
pub use sensor::{
    compute_readings, detections_model, register_builtin_models, DetectionsSensor, ReadingSet,
    Sensor,
};
