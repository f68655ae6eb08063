//! JSON wire format of a vision service's detections-from-camera response.
//!
//! The shape follows the vision service's `GetDetectionsFromCameraResponse`:
//! `{ "detections": [{ "x_min": .., "y_min": .., "x_max": .., "y_max": ..,
//! "confidence": .., "class_name": ".." }] }`. Box corners are optional and
//! only kept when all four are present.

use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::detect::result::{BoundingBox, Detection};

#[derive(Debug, Deserialize)]
pub struct DetectionsResponse {
    #[serde(default)]
    pub detections: Vec<WireDetection>,
}

#[derive(Debug, Deserialize)]
pub struct WireDetection {
    #[serde(default)]
    pub x_min: Option<i64>,
    #[serde(default)]
    pub y_min: Option<i64>,
    #[serde(default)]
    pub x_max: Option<i64>,
    #[serde(default)]
    pub y_max: Option<i64>,
    #[serde(default)]
    pub confidence: f64,
    /// Label of the detected object.
    #[serde(alias = "label")]
    pub class_name: String,
}

impl From<WireDetection> for Detection {
    fn from(wire: WireDetection) -> Self {
        let bounding_box = match (wire.x_min, wire.y_min, wire.x_max, wire.y_max) {
            (Some(x_min), Some(y_min), Some(x_max), Some(y_max)) => Some(BoundingBox {
                x_min,
                y_min,
                x_max,
                y_max,
            }),
            _ => None,
        };
        Detection {
            label: wire.class_name,
            confidence: wire.confidence,
            bounding_box,
        }
    }
}

/// Decode a detections response body.
pub fn parse_detections_response(payload: &[u8]) -> Result<Vec<Detection>> {
    let response: DetectionsResponse = serde_json::from_slice(payload)
        .map_err(|e| anyhow!("invalid detections response: {}", e))?;
    Ok(response
        .detections
        .into_iter()
        .map(Detection::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "detections": [
            {"x_min": 10, "y_min": 20, "x_max": 110, "y_max": 220, "confidence": 0.91, "class_name": "cat"},
            {"confidence": 0.42, "class_name": "dog"}
        ]
    }"#;

    #[test]
    fn parses_detections_with_and_without_boxes() {
        let detections = parse_detections_response(RESPONSE.as_bytes()).unwrap();
        assert_eq!(detections.len(), 2);

        assert_eq!(detections[0].label, "cat");
        assert_eq!(
            detections[0].bounding_box,
            Some(BoundingBox {
                x_min: 10,
                y_min: 20,
                x_max: 110,
                y_max: 220,
            })
        );
        assert_eq!(detections[1].label, "dog");
        assert_eq!(detections[1].confidence, 0.42);
        assert!(detections[1].bounding_box.is_none());
    }

    #[test]
    fn partial_box_is_dropped() {
        let body = r#"{"detections": [{"x_min": 1, "y_min": 2, "class_name": "bird"}]}"#;
        let detections = parse_detections_response(body.as_bytes()).unwrap();
        assert!(detections[0].bounding_box.is_none());
        assert_eq!(detections[0].confidence, 0.0);
    }

    #[test]
    fn empty_body_object_means_no_detections() {
        assert!(parse_detections_response(b"{}").unwrap().is_empty());
    }

    #[test]
    fn malformed_body_is_rejected() {
        let err = parse_detections_response(b"not json").unwrap_err();
        assert!(err.to_string().contains("invalid detections response"));

        let missing_label = br#"{"detections": [{"confidence": 0.5}]}"#;
        assert!(parse_detections_response(missing_label).is_err());
    }
}
