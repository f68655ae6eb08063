use std::collections::{BTreeMap, HashSet};

use crate::detect::Detection;

/// Per-label detection counts for one read.
pub type ReadingSet = BTreeMap<String, i64>;

/// Allow-list of labels to count. An empty list allows every label.
#[derive(Clone, Debug, Default)]
pub struct LabelFilter {
    allowed: HashSet<String>,
}

impl LabelFilter {
    pub fn new(labels: &[String]) -> Self {
        Self {
            allowed: labels.iter().cloned().collect(),
        }
    }

    pub fn allows(&self, label: &str) -> bool {
        self.allowed.is_empty() || self.allowed.contains(label)
    }

    pub fn is_open(&self) -> bool {
        self.allowed.is_empty()
    }
}

/// Readings with every configured label present at zero.
pub fn seed_readings(labels: &[String]) -> ReadingSet {
    labels.iter().map(|label| (label.clone(), 0)).collect()
}

/// Count detections per label.
///
/// Configured labels are always reported, at zero when nothing matched.
/// With a non-empty `labels`, detections outside it are skipped silently.
pub fn compute_readings(labels: &[String], detections: &[Detection]) -> ReadingSet {
    let filter = LabelFilter::new(labels);
    let mut readings = seed_readings(labels);
    count_into(&mut readings, &filter, detections);
    readings
}

pub(crate) fn count_into(readings: &mut ReadingSet, filter: &LabelFilter, detections: &[Detection]) {
    for detection in detections {
        let label = detection.label();
        if !filter.allows(label) {
            continue;
        }
        match readings.get_mut(label) {
            Some(count) => *count += 1,
            None => {
                readings.insert(label.to_string(), 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn detections(values: &[&str]) -> Vec<Detection> {
        values.iter().map(|v| Detection::new(*v, 0.9)).collect()
    }

    fn readings(pairs: &[(&str, i64)]) -> ReadingSet {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn empty_detections_yield_seeded_zeroes() {
        let out = compute_readings(&labels(&["cat", "dog", "person"]), &[]);
        assert_eq!(out, readings(&[("cat", 0), ("dog", 0), ("person", 0)]));

        assert!(compute_readings(&[], &[]).is_empty());
    }

    #[test]
    fn allow_list_drops_unknown_labels_and_keeps_zeroes() {
        let out = compute_readings(
            &labels(&["cat", "dog"]),
            &detections(&["cat", "cat", "bird"]),
        );
        assert_eq!(out, readings(&[("cat", 2), ("dog", 0)]));
        assert!(!out.contains_key("bird"));
    }

    #[test]
    fn open_filter_counts_every_label() {
        let out = compute_readings(&[], &detections(&["cat", "bird"]));
        assert_eq!(out, readings(&[("bird", 1), ("cat", 1)]));

        let out = compute_readings(&[], &detections(&["car", "car", "car", "person"]));
        assert_eq!(out, readings(&[("car", 3), ("person", 1)]));
    }

    #[test]
    fn repeated_calls_do_not_share_state() {
        let configured = labels(&["cat"]);
        let input = detections(&["cat", "cat"]);
        let first = compute_readings(&configured, &input);
        let second = compute_readings(&configured, &input);
        assert_eq!(first, second);
        assert_eq!(second["cat"], 2);
    }

    #[test]
    fn duplicate_configured_labels_collapse() {
        let out = compute_readings(&labels(&["cat", "cat"]), &detections(&["cat"]));
        assert_eq!(out, readings(&[("cat", 1)]));
    }

    #[test]
    fn labels_match_exactly() {
        let out = compute_readings(&labels(&["Cat"]), &detections(&["cat", "Cat "]));
        assert_eq!(out, readings(&[("Cat", 0)]));
    }

    #[test]
    fn label_filter_open_when_empty() {
        assert!(LabelFilter::new(&[]).is_open());
        assert!(LabelFilter::new(&[]).allows("anything"));

        let filter = LabelFilter::new(&labels(&["dog"]));
        assert!(!filter.is_open());
        assert!(filter.allows("dog"));
        assert!(!filter.allows("cat"));
    }
}
