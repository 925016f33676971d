//! Severity categories of community reports and their counts.

use geojson::{Feature, JsonValue};
use serde::Serialize;

/// Fixed severity scale of community reports
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

    /// Exact match on the survey's labels (Spanish) or their English names
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Baja" | "Low" => Some(Severity::Low),
            "Media" | "Medium" => Some(Severity::Medium),
            "Alta" | "High" => Some(Severity::High),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Counts per severity, indexed Low, Medium, High
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeverityTally(pub [u64; 3]);

impl SeverityTally {
    pub fn get(&self, severity: Severity) -> u64 {
        self.0[severity.index()]
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }
}

/// Count features by the category in `property`.
/// Values outside the scale, non-strings and missing attributes are not counted.
pub fn tally(features: &[Feature], property: &str) -> SeverityTally {
    let mut counts = SeverityTally::default();
    for feature in features {
        let severity = feature
            .property(property)
            .and_then(JsonValue::as_str)
            .and_then(Severity::from_label);
        if let Some(severity) = severity {
            counts.0[severity.index()] += 1;
        }
    }
    counts
}
