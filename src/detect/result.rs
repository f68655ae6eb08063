/// A single labeled detection for one frame.
///
/// Bounding box coordinates are in pixels of the source frame and are
/// absent when the detector only classifies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Detection {
    pub label: String,
    pub confidence: f64,
    pub bounding_box: Option<BoundingBox>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundingBox {
    pub x_min: i64,
    pub y_min: i64,
    pub x_max: i64,
    pub y_max: i64,
}

impl Detection {
    /// Detection with a label and confidence but no bounding box.
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
            bounding_box: None,
        }
    }

    pub fn with_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}
