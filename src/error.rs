//! Error types for the detections sensor.

use std::fmt;

use thiserror::Error;

use crate::sensor::ReadingSet;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Setup, reconfiguration and command errors.
#[derive(Error, Debug)]
pub enum SensorError {
    /// A required configuration attribute is absent or empty.
    #[error("error validating {path}: \"{field}\" is required")]
    FieldRequired { path: String, field: &'static str },

    /// Component attributes could not be decoded.
    #[error("invalid attributes for {path}: {reason}")]
    InvalidAttributes { path: String, reason: String },

    /// The named detector could not be resolved from dependencies.
    #[error("no detector for detections ({detector}): {source}")]
    MissingDetector {
        detector: String,
        #[source]
        source: BoxError,
    },

    /// No registration exists for the requested API/model pair.
    #[error("no registration for model {model} on api {api}")]
    UnknownModel { api: String, model: String },

    #[error("unimplemented")]
    Unimplemented,
}

impl SensorError {
    pub(crate) fn missing_detector(detector: &str, source: anyhow::Error) -> Self {
        SensorError::MissingDetector {
            detector: detector.to_string(),
            source: source.into(),
        }
    }

    /// Field name for required-field errors.
    pub fn required_field(&self) -> Option<&'static str> {
        match self {
            SensorError::FieldRequired { field, .. } => Some(*field),
            _ => None,
        }
    }
}

/// A failed read.
///
/// Carries the readings pre-seeded with every configured label at zero, so a
/// caller that ignores the error still sees a well-formed reading, together
/// with the upstream error exactly as the provider returned it.
#[derive(Debug)]
pub struct ReadingsError {
    camera: String,
    readings: ReadingSet,
    cause: anyhow::Error,
}

impl ReadingsError {
    pub(crate) fn new(camera: &str, readings: ReadingSet, cause: anyhow::Error) -> Self {
        Self {
            camera: camera.to_string(),
            readings,
            cause,
        }
    }

    pub fn camera(&self) -> &str {
        &self.camera
    }

    /// Zero-seeded readings for the configured labels.
    pub fn readings(&self) -> &ReadingSet {
        &self.readings
    }

    /// The upstream error.
    pub fn cause(&self) -> &anyhow::Error {
        &self.cause
    }

    pub fn into_parts(self) -> (ReadingSet, anyhow::Error) {
        (self.readings, self.cause)
    }
}

impl fmt::Display for ReadingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "detections error for camera {}", self.camera)
    }
}

impl std::error::Error for ReadingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let cause: &(dyn std::error::Error + 'static) = &*self.cause;
        Some(cause)
    }
}
