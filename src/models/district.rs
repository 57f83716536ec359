use serde::{Deserialize, Serialize};

use super::position::GeoPoint;

/// A registered parking location.
///
/// Field names on disk follow the camelCase shape of the original records,
/// so catalogs exported by older clients load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct District {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub needs_operation: bool,
    /// Hours of free parking.
    #[serde(default = "default_free_duration")]
    pub free_duration: u32,
    /// Minutes allotted to leave after checkout.
    #[serde(default = "default_exit_duration")]
    pub exit_duration: u32,
    #[serde(default)]
    pub payment_account: String,
    /// Opaque image payload, never interpreted here.
    #[serde(default)]
    pub qr_code: String,
}

pub fn default_free_duration() -> u32 {
    2
}

pub fn default_exit_duration() -> u32 {
    30
}

impl District {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    /// Payment account as shown to the user ("none" when empty).
    pub fn payment_label(&self) -> &str {
        if self.payment_account.trim().is_empty() {
            "none"
        } else {
            &self.payment_account
        }
    }
}

/// Districts written on first start, when no catalog has ever been stored.
pub fn seed_districts() -> Vec<District> {
    vec![
        District {
            id: "1".to_string(),
            name: "长江证券停车场".to_string(),
            lat: 30.555,
            lng: 114.333,
            needs_operation: true,
            free_duration: 2,
            exit_duration: 30,
            payment_account: "长江证券停车场".to_string(),
            qr_code: String::new(),
        },
        District {
            id: "2".to_string(),
            name: "SKP".to_string(),
            lat: 1.55,
            lng: 55.33,
            needs_operation: true,
            free_duration: 2,
            exit_duration: 15,
            payment_account: "SKP会员".to_string(),
            qr_code: String::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_original_record_shape() {
        let raw = r#"{
            "id": "1700000000000",
            "name": "Mall",
            "lat": 30.5,
            "lng": 114.3,
            "needsOperation": true,
            "freeDuration": 3,
            "exitDuration": 15,
            "paymentAccount": "mall-vip",
            "qrCode": "data:image/png;base64,AAAA"
        }"#;

        let d: District = serde_json::from_str(raw).unwrap();
        assert_eq!(d.id, "1700000000000");
        assert!(d.needs_operation);
        assert_eq!(d.free_duration, 3);
        assert_eq!(d.exit_duration, 15);
        assert_eq!(d.qr_code, "data:image/png;base64,AAAA");
    }

    #[test]
    fn missing_optional_fields_get_defaults() {
        let raw = r#"{"id":"x","name":"Bare","lat":0.0,"lng":0.0}"#;
        let d: District = serde_json::from_str(raw).unwrap();
        assert!(!d.needs_operation);
        assert_eq!(d.free_duration, 2);
        assert_eq!(d.exit_duration, 30);
        assert_eq!(d.payment_label(), "none");
    }

    #[test]
    fn seed_ids_are_unique() {
        let seeds = seed_districts();
        assert_eq!(seeds.len(), 2);
        assert_ne!(seeds[0].id, seeds[1].id);
    }
}
