//! Ranged road objects attached to a leg
//!
//! Incidents, closures and notifications are keyed by geometry indices
//! relative to the start of their leg.

use serde::{Deserialize, Serialize};

use crate::JsonProperties;

/// `refresh_type` of notifications the backend recomputes on refresh
pub const REFRESH_TYPE_DYNAMIC: &str = "dynamic";

/// Objects positioned along a leg by geometry index
pub trait GeometryRange: Clone {
    /// Inclusive `(start, end)` geometry indices, if the object is positioned
    fn geometry_range(&self) -> Option<(usize, usize)>;

    /// Copy of the object moved `offset` points further along the leg
    fn shifted(&self, offset: usize) -> Self;
}

/// Traffic incident
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_index_start: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_index_end: Option<usize>,

    #[serde(flatten)]
    pub unrecognized: JsonProperties,
}

impl GeometryRange for Incident {
    fn geometry_range(&self) -> Option<(usize, usize)> {
        Some((self.geometry_index_start?, self.geometry_index_end?))
    }

    fn shifted(&self, offset: usize) -> Self {
        Self {
            geometry_index_start: self.geometry_index_start.map(|i| i + offset),
            geometry_index_end: self.geometry_index_end.map(|i| i + offset),
            ..self.clone()
        }
    }
}

/// Road closure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Closure {
    pub geometry_index_start: usize,

    pub geometry_index_end: usize,

    #[serde(flatten)]
    pub unrecognized: JsonProperties,
}

impl Closure {
    pub fn new(geometry_index_start: usize, geometry_index_end: usize) -> Self {
        Self {
            geometry_index_start,
            geometry_index_end,
            unrecognized: JsonProperties::new(),
        }
    }
}

impl GeometryRange for Closure {
    fn geometry_range(&self) -> Option<(usize, usize)> {
        Some((self.geometry_index_start, self.geometry_index_end))
    }

    fn shifted(&self, offset: usize) -> Self {
        Self {
            geometry_index_start: self.geometry_index_start + offset,
            geometry_index_end: self.geometry_index_end + offset,
            unrecognized: self.unrecognized.clone(),
        }
    }
}

/// Route notification (violations, EV alerts, ...)
///
/// Positioned either by a single `geometry_index` or by a
/// `geometry_index_start`/`geometry_index_end` pair.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_index: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_index_start: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_index_end: Option<usize>,

    #[serde(flatten)]
    pub unrecognized: JsonProperties,
}

impl Notification {
    /// Whether the backend recomputes this notification on refresh
    pub fn is_dynamic(&self) -> bool {
        self.refresh_type.as_deref() == Some(REFRESH_TYPE_DYNAMIC)
    }
}

impl GeometryRange for Notification {
    fn geometry_range(&self) -> Option<(usize, usize)> {
        match (self.geometry_index, self.geometry_index_start, self.geometry_index_end) {
            (Some(index), _, _) => Some((index, index)),
            (None, Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    fn shifted(&self, offset: usize) -> Self {
        Self {
            geometry_index: self.geometry_index.map(|i| i + offset),
            geometry_index_start: self.geometry_index_start.map(|i| i + offset),
            geometry_index_end: self.geometry_index_end.map(|i| i + offset),
            ..self.clone()
        }
    }
}
