//! Catalog editing: add, update and remove districts.
//!
//! The session machine only reads the catalog; these helpers back the
//! `district` command.

use crate::errors::{AppError, AppResult};
use crate::models::district::{District, default_exit_duration, default_free_duration};
use chrono::{DateTime, Utc};

/// Field overrides for a new or edited district. `None` keeps the current
/// value (or the default, for a new district).
#[derive(Debug, Clone, Default)]
pub struct DistrictPatch {
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub needs_operation: Option<bool>,
    pub free_duration: Option<u32>,
    pub exit_duration: Option<u32>,
    pub payment_account: Option<String>,
}

impl DistrictPatch {
    fn apply(&self, d: &mut District) -> AppResult<()> {
        if let Some(name) = &self.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::InvalidDistrict("name cannot be empty".into()));
            }
            d.name = name.to_string();
        }
        if let Some(lat) = self.lat {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(AppError::InvalidDistrict(format!("latitude {} out of range", lat)));
            }
            d.lat = lat;
        }
        if let Some(lng) = self.lng {
            if !(-180.0..=180.0).contains(&lng) {
                return Err(AppError::InvalidDistrict(format!("longitude {} out of range", lng)));
            }
            d.lng = lng;
        }
        if let Some(v) = self.needs_operation {
            d.needs_operation = v;
        }
        if let Some(v) = self.free_duration {
            d.free_duration = v;
        }
        if let Some(v) = self.exit_duration {
            d.exit_duration = v;
        }
        if let Some(v) = &self.payment_account {
            d.payment_account = v.trim().to_string();
        }
        Ok(())
    }
}

/// Build a new district from a patch. The name is mandatory; the id is the
/// creation time in epoch milliseconds, bumped until unique.
pub fn new_district(
    catalog: &[District],
    patch: &DistrictPatch,
    now: DateTime<Utc>,
) -> AppResult<District> {
    if patch.name.as_deref().map(str::trim).unwrap_or("").is_empty() {
        return Err(AppError::InvalidDistrict("a district needs a name".into()));
    }

    let mut stamp = now.timestamp_millis();
    while catalog.iter().any(|d| d.id == stamp.to_string()) {
        stamp += 1;
    }

    let mut d = District {
        id: stamp.to_string(),
        name: String::new(),
        lat: 0.0,
        lng: 0.0,
        needs_operation: false,
        free_duration: default_free_duration(),
        exit_duration: default_exit_duration(),
        payment_account: String::new(),
        qr_code: String::new(),
    };
    patch.apply(&mut d)?;
    Ok(d)
}

/// Apply a patch to the district with `id` and return the updated copy.
pub fn update_district(
    catalog: &mut [District],
    id: &str,
    patch: &DistrictPatch,
) -> AppResult<District> {
    let slot = catalog
        .iter_mut()
        .find(|d| d.id == id)
        .ok_or_else(|| AppError::UnknownDistrict(id.to_string()))?;

    // validate on a copy so a bad field leaves the entry untouched
    let mut edited = slot.clone();
    patch.apply(&mut edited)?;
    *slot = edited.clone();
    Ok(edited)
}

pub fn remove_district(catalog: &mut Vec<District>, id: &str) -> AppResult<District> {
    let idx = catalog
        .iter()
        .position(|d| d.id == id)
        .ok_or_else(|| AppError::UnknownDistrict(id.to_string()))?;
    Ok(catalog.remove(idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::district::seed_districts;
    use chrono::TimeZone;

    fn named(name: &str) -> DistrictPatch {
        DistrictPatch {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn new_district_uses_timestamp_id_and_defaults() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let d = new_district(&[], &named("Mall"), now).unwrap();

        assert_eq!(d.id, "1700000000123");
        assert_eq!(d.free_duration, 2);
        assert_eq!(d.exit_duration, 30);
        assert!(!d.needs_operation);
    }

    #[test]
    fn new_district_requires_a_name() {
        let now = Utc.timestamp_millis_opt(0).unwrap();
        assert!(new_district(&[], &DistrictPatch::default(), now).is_err());
        assert!(new_district(&[], &named("   "), now).is_err());
    }

    #[test]
    fn colliding_ids_are_bumped() {
        let now = Utc.timestamp_millis_opt(5).unwrap();
        let first = new_district(&[], &named("A"), now).unwrap();
        let second = new_district(&[first.clone()], &named("B"), now).unwrap();
        assert_eq!(first.id, "5");
        assert_eq!(second.id, "6");
    }

    #[test]
    fn update_keeps_untouched_fields() {
        let mut cat = seed_districts();
        let patch = DistrictPatch {
            exit_duration: Some(10),
            ..Default::default()
        };
        let d = update_district(&mut cat, "2", &patch).unwrap();

        assert_eq!(d.exit_duration, 10);
        assert_eq!(d.name, "SKP");
        assert_eq!(cat[1], d);
    }

    #[test]
    fn invalid_update_leaves_entry_untouched() {
        let mut cat = seed_districts();
        let patch = DistrictPatch {
            free_duration: Some(9),
            lat: Some(123.0),
            ..Default::default()
        };
        assert!(update_district(&mut cat, "1", &patch).is_err());
        assert_eq!(cat, seed_districts());
    }

    #[test]
    fn remove_unknown_is_an_error() {
        let mut cat = seed_districts();
        assert!(matches!(
            remove_district(&mut cat, "nope"),
            Err(AppError::UnknownDistrict(_))
        ));
        let gone = remove_district(&mut cat, "1").unwrap();
        assert_eq!(gone.id, "1");
        assert_eq!(cat.len(), 1);
    }
}
