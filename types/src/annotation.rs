//! Leg annotations
//!
//! Parallel per-segment arrays: entry `i` describes the segment between
//! geometry points `i` and `i + 1` of the leg.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::JsonProperties;

/// Per-segment metric arrays of a leg
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LegAnnotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Vec<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Vec<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<Vec<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxspeed: Option<Vec<MaxSpeed>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub congestion: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub congestion_numeric: Option<Vec<Option<i32>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freeflow_speed: Option<Vec<Option<i32>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_speed: Option<Vec<Option<i32>>>,

    /// Annotations this model does not know about (e.g. `state_of_charge`)
    #[serde(flatten)]
    pub unrecognized: JsonProperties,
}

impl LegAnnotation {
    /// Number of segments described by the annotation.
    ///
    /// Taken from the first array that is present; `None` when the
    /// annotation carries no known array at all.
    pub fn size(&self) -> Option<usize> {
        self.distance
            .as_ref()
            .map(Vec::len)
            .or_else(|| self.duration.as_ref().map(Vec::len))
            .or_else(|| self.speed.as_ref().map(Vec::len))
            .or_else(|| self.maxspeed.as_ref().map(Vec::len))
            .or_else(|| self.congestion.as_ref().map(Vec::len))
            .or_else(|| self.congestion_numeric.as_ref().map(Vec::len))
            .or_else(|| self.freeflow_speed.as_ref().map(Vec::len))
            .or_else(|| self.current_speed.as_ref().map(Vec::len))
            .or_else(|| {
                self.unrecognized
                    .values()
                    .find_map(Value::as_array)
                    .map(Vec::len)
            })
    }

    /// Sum of the duration array
    pub fn total_duration(&self) -> Option<f64> {
        self.duration.as_ref().map(|d| d.iter().sum())
    }
}

/// Speed limit of a segment
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MaxSpeed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub none: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_size_prefers_known_arrays() {
        let annotation = LegAnnotation {
            congestion: Some(vec!["low".to_string(); 4]),
            ..Default::default()
        };
        assert_eq!(annotation.size(), Some(4));
    }

    #[test]
    fn test_size_falls_back_to_unrecognized_arrays() {
        let annotation: LegAnnotation =
            serde_json::from_value(json!({ "state_of_charge": [80, 79, 78] })).unwrap();
        assert_eq!(annotation.size(), Some(3));
        assert_eq!(LegAnnotation::default().size(), None);
    }

    #[test]
    fn test_congestion_numeric_accepts_nulls() {
        let annotation: LegAnnotation =
            serde_json::from_value(json!({ "congestion_numeric": [1, null, 30] })).unwrap();
        assert_eq!(annotation.congestion_numeric, Some(vec![Some(1), None, Some(30)]));
    }
}
