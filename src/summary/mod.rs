//! Analysis summaries
//!
//! ## Responsibilities
//!
//! - Aggregate raw detections into a `Summary` (label counts + detections)
//! - Confidence filtering (inclusive threshold, done here on behalf of the
//!   acquisition loop)
//! - Deterministic natural-language rendering
//!
//! Invariants: `counts[label]` equals the number of detections carrying that
//! label, `counts` holds no zero entries, and the timestamp is 0 until the
//! first analysis cycle completes.

use crate::detect::Detection;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;

/// Seconds since the Unix epoch, as the summary timestamp base
pub fn epoch_secs() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Result of one analysis cycle
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Epoch seconds when the cycle completed; 0 = never computed
    pub timestamp: f64,
    /// Label -> occurrence count, no zero-valued entries
    pub counts: HashMap<String, u32>,
    /// Detections in model output order
    pub detections: Vec<Detection>,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            timestamp: 0.0,
            counts: HashMap::new(),
            detections: Vec::new(),
        }
    }
}

impl Summary {
    /// Build a summary from raw detections, dropping anything below the
    /// confidence threshold. The boundary case is inclusive: a detection
    /// exactly at the threshold is kept.
    pub fn from_detections(detections: Vec<Detection>, confidence_threshold: f32) -> Self {
        let detections: Vec<Detection> = detections
            .into_iter()
            .filter(|d| d.conf >= confidence_threshold)
            .collect();

        let mut counts: HashMap<String, u32> = HashMap::new();
        for det in &detections {
            *counts.entry(det.label.clone()).or_insert(0) += 1;
        }

        Self {
            timestamp: epoch_secs(),
            counts,
            detections,
        }
    }
}

/// Deterministic natural-language rendering of a summary.
///
/// Labels sort by descending count, then ascending label; "person" counts
/// above one pluralize to "people".
pub fn render_english(summary: &Summary) -> String {
    if summary.counts.is_empty() {
        return "No notable objects detected.".to_string();
    }

    let mut entries: Vec<(&String, &u32)> = summary.counts.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let parts: Vec<String> = entries
        .into_iter()
        .map(|(label, &count)| {
            let name = if label == "person" {
                if count > 1 {
                    "people"
                } else {
                    "person"
                }
            } else {
                label.as_str()
            };
            format!("{} {}", count, name)
        })
        .collect();

    format!("I currently see {}.", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::det;

    fn summary_with_counts(counts: &[(&str, u32)]) -> Summary {
        let mut detections = Vec::new();
        for (label, count) in counts {
            for _ in 0..*count {
                detections.push(det(label, 0.9));
            }
        }
        Summary::from_detections(detections, 0.5)
    }

    #[test]
    fn empty_summary_renders_fixed_sentence() {
        assert_eq!(
            render_english(&Summary::default()),
            "No notable objects detected."
        );
    }

    #[test]
    fn single_person_renders_singular() {
        let summary = summary_with_counts(&[("person", 1)]);
        assert_eq!(render_english(&summary), "I currently see 1 person.");
    }

    #[test]
    fn multiple_people_pluralize() {
        let summary = summary_with_counts(&[("person", 2)]);
        assert_eq!(render_english(&summary), "I currently see 2 people.");
    }

    #[test]
    fn labels_sort_by_count_then_name() {
        let summary = summary_with_counts(&[("car", 1), ("person", 3)]);
        assert_eq!(render_english(&summary), "I currently see 3 people, 1 car.");

        let tied = summary_with_counts(&[("dog", 2), ("car", 2)]);
        assert_eq!(render_english(&tied), "I currently see 2 car, 2 dog.");
    }

    #[test]
    fn counts_match_detections() {
        let summary = summary_with_counts(&[("person", 3), ("car", 1), ("dog", 2)]);
        let total: u32 = summary.counts.values().sum();
        assert_eq!(total as usize, summary.detections.len());
        for (label, count) in &summary.counts {
            assert!(*count > 0, "zero-valued count for {}", label);
            let actual = summary
                .detections
                .iter()
                .filter(|d| &d.label == label)
                .count();
            assert_eq!(actual as u32, *count);
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let detections = vec![
            det("person", 0.5),
            det("person", 0.49),
            det("car", 0.51),
        ];
        let summary = Summary::from_detections(detections, 0.5);
        assert_eq!(summary.detections.len(), 2);
        assert_eq!(summary.counts["person"], 1);
        assert_eq!(summary.counts["car"], 1);
        assert!(summary.counts.values().all(|&c| c > 0));
    }

    #[test]
    fn fresh_summary_carries_current_timestamp() {
        let before = epoch_secs();
        let summary = Summary::from_detections(vec![det("person", 0.9)], 0.5);
        assert!(summary.timestamp >= before);
        assert!(summary.timestamp <= epoch_secs());
    }
}
