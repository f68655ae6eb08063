#![cfg(feature = "vision-http")]

use std::io::Read;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use url::Url;

use crate::detect::provider::DetectionProvider;
use crate::detect::result::Detection;
use crate::detect::wire::parse_detections_response;

const MAX_RESPONSE_BYTES: u64 = 4 * 1024 * 1024;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for a remote vision service.
///
/// Each fetch is one `GET <base>/vision/<service>/detections?camera=<camera>`.
/// The client holds no per-request state and can be shared across sensors.
pub struct HttpVisionClient {
    name: String,
    base: Url,
    agent: ureq::Agent,
}

impl HttpVisionClient {
    pub fn new(name: impl Into<String>, base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url).context("parse vision service url")?;
        match base.scheme() {
            "http" | "https" => {}
            other => {
                return Err(anyhow!(
                    "unsupported vision service scheme '{}'; expected http(s)",
                    other
                ))
            }
        }
        let agent = ureq::AgentBuilder::new().timeout(DEFAULT_TIMEOUT).build();
        Ok(Self {
            name: name.into(),
            base,
            agent,
        })
    }

    fn detections_url(&self, camera: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("vision service url {} cannot be a base", self.base))?
            .pop_if_empty()
            .extend(["vision", self.name.as_str(), "detections"]);
        url.query_pairs_mut().append_pair("camera", camera);
        Ok(url)
    }
}

impl DetectionProvider for HttpVisionClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn detections_from_camera(&self, camera: &str) -> Result<Vec<Detection>> {
        let url = self.detections_url(camera)?;
        let response = self
            .agent
            .get(url.as_str())
            .call()
            .with_context(|| format!("fetch detections from {}", url))?;
        let mut body = Vec::new();
        response
            .into_reader()
            .take(MAX_RESPONSE_BYTES)
            .read_to_end(&mut body)
            .context("read detections response")?;
        parse_detections_response(&body)
    }
}
