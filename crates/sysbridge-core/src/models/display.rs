//! Display module payload.
//!
//! The backend's display schema is open-ended: beyond the documented fields it
//! may attach per-platform extras.  Those are preserved in `extra` so nothing
//! the backend sends is lost on the way to the callback.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayLastUpdated {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displays: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Display {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// One entry per connected monitor, shape defined by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displays: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DisplayLastUpdated>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
