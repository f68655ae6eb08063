//! Sensor components.
//!
//! - `readings`: the per-label count aggregation
//! - `detections`: the `hipsterbrown:sensor:detections` model wiring a vision
//!   service to the aggregation

mod detections;
mod readings;

pub use detections::{detections_model, register_builtin_models, DetectionsSensor};
pub use readings::{compute_readings, seed_readings, LabelFilter, ReadingSet};

use crate::detect::Dependencies;
use crate::error::{ReadingsError, SensorError};
use crate::resource::{ComponentConfig, ResourceName};

/// A sensor resource polled on demand by the host.
pub trait Sensor: Send + Sync {
    fn name(&self) -> &ResourceName;

    /// Current readings. Each call returns a fresh mapping.
    fn readings(&self) -> Result<ReadingSet, ReadingsError>;

    /// Replace configuration and re-resolve dependencies in place.
    fn reconfigure(&self, deps: &Dependencies, conf: &ComponentConfig) -> Result<(), SensorError>;

    /// Model-specific commands.
    fn do_command(
        &self,
        cmd: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<serde_json::Map<String, serde_json::Value>, SensorError>;

    fn close(&self);
}
