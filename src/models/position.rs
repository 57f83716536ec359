use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

/// Parse "LAT,LNG" (spaces allowed around the comma).
impl FromStr for GeoPoint {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat_s, lng_s) = s
            .split_once(',')
            .ok_or_else(|| AppError::InvalidPosition(format!("expected LAT,LNG, got '{}'", s)))?;

        let lat: f64 = lat_s
            .trim()
            .parse()
            .map_err(|_| AppError::InvalidPosition(format!("bad latitude '{}'", lat_s.trim())))?;
        let lng: f64 = lng_s
            .trim()
            .parse()
            .map_err(|_| AppError::InvalidPosition(format!("bad longitude '{}'", lng_s.trim())))?;

        if !(-90.0..=90.0).contains(&lat) {
            return Err(AppError::InvalidPosition(format!(
                "latitude {} out of range",
                lat
            )));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(AppError::InvalidPosition(format!(
                "longitude {} out of range",
                lng
            )));
        }

        Ok(GeoPoint { lat, lng })
    }
}
