#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic primitives shared by every proximity feature.
//!
//! Defines [`GeoPoint`] (stored and serialized as a GeoJSON `Point`, so
//! coordinates are `[longitude, latitude]` on the wire) and the single
//! Haversine distance implementation used across the system. Distance is
//! computed here rather than trusted from any index: spatial indexes only
//! guarantee radius membership, not the exact value shown to users.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Assumed transfer speed in km/h for travel-time estimates
/// (camp-to-hospital blood transport).
pub const TRANSFER_SPEED_KMH: f64 = 40.0;

/// Errors that can occur when handling geographic input.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeoError {
    /// Longitude or latitude is non-finite or out of range.
    #[error("Invalid coordinates: longitude {longitude}, latitude {latitude}")]
    InvalidCoordinates {
        /// The offending longitude.
        longitude: f64,
        /// The offending latitude.
        latitude: f64,
    },
}

/// A validated WGS-84 point.
///
/// Serialized as a GeoJSON `Point`; the coordinate array is
/// `[longitude, latitude]` — the reverse of spoken `(lat, lon)` order —
/// and that order must be preserved exactly for wire compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoJsonPoint", into = "GeoJsonPoint")]
pub struct GeoPoint {
    longitude: f64,
    latitude: f64,
}

/// GeoJSON wire representation of a [`GeoPoint`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeoJsonPoint {
    #[serde(rename = "type")]
    kind: String,
    coordinates: [f64; 2],
}

impl From<GeoPoint> for GeoJsonPoint {
    fn from(p: GeoPoint) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [p.longitude, p.latitude],
        }
    }
}

impl TryFrom<GeoJsonPoint> for GeoPoint {
    type Error = GeoError;

    fn try_from(p: GeoJsonPoint) -> Result<Self, GeoError> {
        Self::new(p.coordinates[0], p.coordinates[1])
    }
}

impl GeoPoint {
    /// Creates a point from `(longitude, latitude)`.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidCoordinates`] if either component is
    /// non-finite, longitude is outside [-180, 180], or latitude is
    /// outside [-90, 90].
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, GeoError> {
        if !longitude.is_finite()
            || !latitude.is_finite()
            || !(-180.0..=180.0).contains(&longitude)
            || !(-90.0..=90.0).contains(&latitude)
        {
            return Err(GeoError::InvalidCoordinates {
                longitude,
                latitude,
            });
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(self) -> f64 {
        self.longitude
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(self) -> f64 {
        self.latitude
    }

    /// Great-circle distance in kilometers to another point.
    #[must_use]
    pub fn distance_km_to(self, other: Self) -> f64 {
        distance_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Haversine great-circle distance in kilometers.
///
/// Pure; performs no range validation — callers construct [`GeoPoint`]s
/// (or otherwise validate) before calling. Identical points yield 0;
/// antipodal points yield roughly `PI * EARTH_RADIUS_KM` (~20015 km).
#[must_use]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Rounds a distance to 2 decimal places for display.
#[must_use]
pub fn round2(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

/// Estimated travel time in minutes at the assumed transfer speed.
#[must_use]
pub fn travel_minutes(distance_km: f64) -> f64 {
    distance_km / TRANSFER_SPEED_KMH * 60.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_points_are_zero() {
        assert!(distance_km(17.4065, 78.4772, 17.4065, 78.4772).abs() < 1e-9);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            ((17.4065, 78.4772), (17.7231, 83.3012)),
            ((0.0, 0.0), (45.0, 90.0)),
            ((-33.8688, 151.2093), (51.5074, -0.1278)),
        ];
        for ((lat1, lon1), (lat2, lon2)) in pairs {
            let ab = distance_km(lat1, lon1, lat2, lon2);
            let ba = distance_km(lat2, lon2, lat1, lon1);
            assert!((ab - ba).abs() < 1e-9, "asymmetric: {ab} vs {ba}");
        }
    }

    #[test]
    fn triangle_inequality_holds() {
        let a = (17.4065, 78.4772);
        let b = (19.0760, 72.8777);
        let c = (13.0827, 80.2707);
        let ac = distance_km(a.0, a.1, c.0, c.1);
        let via_b = distance_km(a.0, a.1, b.0, b.1) + distance_km(b.0, b.1, c.0, c.1);
        assert!(ac <= via_b + 1e-6, "triangle violated: {ac} > {via_b}");
    }

    #[test]
    fn hyderabad_to_visakhapatnam_regression() {
        // Fixed regression fixture: ~457 km.
        let d = distance_km(17.4065, 78.4772, 17.7231, 83.3012);
        assert!((d - 457.0).abs() < 5.0, "expected ~457 km, got {d}");
    }

    #[test]
    fn antipodal_points_near_half_circumference() {
        let d = distance_km(0.0, 0.0, 0.0, 180.0);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1.0);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(GeoPoint::new(181.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, 91.0).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
        assert!(GeoPoint::new(-180.0, -90.0).is_ok());
    }

    #[test]
    fn geojson_coordinate_order_is_lon_lat() {
        let p = GeoPoint::new(78.4772, 17.4065).unwrap();
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json["type"], "Point");
        assert_eq!(json["coordinates"][0], 78.4772);
        assert_eq!(json["coordinates"][1], 17.4065);

        let back: GeoPoint = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn geojson_rejects_invalid_coordinates() {
        let bad = serde_json::json!({"type": "Point", "coordinates": [200.0, 10.0]});
        assert!(serde_json::from_value::<GeoPoint>(bad).is_err());
    }

    #[test]
    fn travel_time_at_forty_kmh() {
        assert!((travel_minutes(10.0) - 15.0).abs() < 1e-9);
        assert!((travel_minutes(40.0) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn rounding_to_two_decimals() {
        assert!((round2(457.123_456) - 457.12).abs() < 1e-9);
        assert!((round2(0.005) - 0.01).abs() < 1e-9);
    }
}
