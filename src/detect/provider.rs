use anyhow::Result;

use crate::detect::result::Detection;

/// Vision service able to run a detector against a named camera.
///
/// # Call Boundary
///
/// A provider is queried once per sensor read. Implementations:
/// - May block (network, inference) but must not retain the returned detections
/// - Must be safe to call from several reads at once
/// - Report failures as errors; callers do not retry
pub trait DetectionProvider: Send + Sync {
    /// Service name used to resolve the provider as a dependency.
    fn name(&self) -> &str;

    /// Detections for the current frame of `camera`.
    fn detections_from_camera(&self, camera: &str) -> Result<Vec<Detection>>;
}
