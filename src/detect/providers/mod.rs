pub mod stub;

#[cfg(feature = "vision-http")]
pub mod http;

pub use stub::StubProvider;

#[cfg(feature = "vision-http")]
pub use http::HttpVisionClient;

use std::sync::Arc;

use anyhow::{anyhow, Result};

use super::provider::DetectionProvider;

/// Connect to a vision service, choosing the client by address scheme.
///
/// `stub://` yields an empty [`StubProvider`]; `http(s)://` requires the
/// `vision-http` feature.
pub fn connect_vision_service(name: &str, address: &str) -> Result<Arc<dyn DetectionProvider>> {
    let scheme = address
        .split_once("://")
        .map(|(scheme, _)| scheme)
        .ok_or_else(|| anyhow!("vision service address '{}' has no scheme", address))?;
    match scheme {
        "stub" => Ok(Arc::new(StubProvider::new(name))),
        "http" | "https" => connect_http(name, address),
        other => Err(anyhow!(
            "unsupported vision service scheme '{}' for {}; expected stub or http(s)",
            other,
            name
        )),
    }
}

#[cfg(feature = "vision-http")]
fn connect_http(name: &str, address: &str) -> Result<Arc<dyn DetectionProvider>> {
    Ok(Arc::new(HttpVisionClient::new(name, address)?))
}

#[cfg(not(feature = "vision-http"))]
fn connect_http(name: &str, address: &str) -> Result<Arc<dyn DetectionProvider>> {
    Err(anyhow!(
        "vision service {} at {} requires the vision-http feature",
        name,
        address
    ))
}
