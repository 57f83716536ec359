//! Proximity ordering of the district catalog.

use crate::core::geo::distance_between;
use crate::models::district::District;
use crate::models::position::GeoPoint;

/// Order districts by distance from `origin`, nearest first.
///
/// Without a fix the catalog comes back in insertion order. The sort is
/// stable, so equidistant districts keep their relative order.
pub fn rank_by_proximity(districts: &[District], origin: Option<GeoPoint>) -> Vec<District> {
    rank_with_distance(districts, origin)
        .into_iter()
        .map(|(d, _)| d)
        .collect()
}

/// Same ordering as [`rank_by_proximity`], keeping the computed distance
/// (`None` when there is no origin).
pub fn rank_with_distance(
    districts: &[District],
    origin: Option<GeoPoint>,
) -> Vec<(District, Option<f64>)> {
    let Some(o) = origin else {
        return districts.iter().cloned().map(|d| (d, None)).collect();
    };

    let mut ranked: Vec<(District, Option<f64>)> = districts
        .iter()
        .map(|d| {
            let dist = distance_between(o, d.position());
            (d.clone(), Some(dist))
        })
        .collect();

    // Vec::sort_by is stable; NaN (bad coordinates) sinks to the end
    ranked.sort_by(|(_, a), (_, b)| {
        let a = a.unwrap_or(f64::INFINITY);
        let b = b.unwrap_or(f64::INFINITY);
        a.partial_cmp(&b).unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
    });

    ranked
}
