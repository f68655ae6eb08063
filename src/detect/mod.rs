mod provider;
mod providers;
mod registry;
mod result;
pub mod wire;

pub use provider::DetectionProvider;
pub use providers::{connect_vision_service, StubProvider};
pub use registry::Dependencies;
pub use result::{BoundingBox, Detection};

#[cfg(feature = "vision-http")]
pub use providers::HttpVisionClient;
