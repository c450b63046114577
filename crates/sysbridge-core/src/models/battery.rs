//! Battery module payload.

use serde::{Deserialize, Serialize};

/// Unix timestamps (seconds, fractional) of the last change to each field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatteryLastUpdated {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_charging: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

/// State of the machine's battery.  Every field is optional: desktops
/// without a battery send an empty object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Battery {
    /// Event id assigned by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_charging: Option<bool>,
    /// Charge level in percent, `0.0..=100.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<BatteryLastUpdated>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_battery_decodes_full_payload() {
        let battery: Battery = serde_json::from_value(json!({
            "id": "evt-1",
            "is_charging": true,
            "percentage": 87.5,
            "last_updated": {"is_charging": 1700000000.0, "percentage": 1700000001.5},
        }))
        .expect("decode");

        assert_eq!(battery.is_charging, Some(true));
        assert_eq!(battery.percentage, Some(87.5));
        assert_eq!(
            battery.last_updated.and_then(|l| l.percentage),
            Some(1700000001.5)
        );
    }

    #[test]
    fn test_battery_accepts_empty_object_and_ignores_unknown_keys() {
        let battery: Battery =
            serde_json::from_value(json!({"voltage": 12})).expect("decode");
        assert_eq!(battery, Battery::default());
    }

    #[test]
    fn test_battery_rejects_mistyped_field() {
        let result: Result<Battery, _> = serde_json::from_value(json!({"percentage": "high"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_battery_serializes_without_nulls() {
        let battery = Battery {
            percentage: Some(50.0),
            ..Battery::default()
        };

        assert_eq!(serde_json::to_value(&battery).expect("encode"), json!({"percentage": 50.0}));
    }
}
