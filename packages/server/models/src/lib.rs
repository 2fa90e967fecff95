#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the coordination server.
//!
//! These types are serialized to JSON for the REST API and are separate
//! from the registry entity types so the wire contract can evolve
//! independently. Query-parameter names match the original client exactly
//! (`latitude`/`longitude`/`radius`/`emergencyOnly`/`upcomingOnly`, and
//! `lat`/`lng` with a radius in meters on the public alerts route).
//! Coordinates arrive as strings so the handlers can distinguish a missing
//! parameter from an unparsable one.

use bloodlink_analytics::{CoverageReport, RegionalAnalytics};
use bloodlink_geo::GeoPoint;
use bloodlink_registry::Proximity;
use bloodlink_registry_models::{BloodCamp, BloodStock, CampStatus, CivicAlert, CommunityPost, Hospital};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Standard response envelope. Every endpoint wraps its payload in
/// `{"success": …, "message": …, "data": …}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the request succeeded.
    pub success: bool,
    /// Human-readable status message.
    pub message: String,
    /// Payload; omitted on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Builds a success envelope.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Builds a failure envelope with no payload.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Echo of the caller's search center.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLocation {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl From<GeoPoint> for UserLocation {
    fn from(p: GeoPoint) -> Self {
        Self {
            latitude: p.latitude(),
            longitude: p.longitude(),
        }
    }
}

/// Query parameters for `GET /geolocation/nearby-hospitals`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyHospitalsParams {
    /// Search center latitude.
    pub latitude: Option<String>,
    /// Search center longitude.
    pub longitude: Option<String>,
    /// Search radius in kilometers (default 10).
    pub radius: Option<f64>,
    /// Restrict to emergency-capable hospitals.
    pub emergency_only: Option<bool>,
    /// Maximum number of results (default 20).
    pub limit: Option<usize>,
}

/// Query parameters for `GET /geolocation/nearby-camps`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyCampsParams {
    /// Search center latitude.
    pub latitude: Option<String>,
    /// Search center longitude.
    pub longitude: Option<String>,
    /// Search radius in kilometers (default 20).
    pub radius: Option<f64>,
    /// Restrict to upcoming camps (default true).
    pub upcoming_only: Option<bool>,
    /// Maximum number of results (default 15).
    pub limit: Option<usize>,
}

/// Query parameters for `GET /geolocation/analytics` and
/// `GET /geolocation/map-data`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionParams {
    /// Search center latitude.
    pub latitude: Option<String>,
    /// Search center longitude.
    pub longitude: Option<String>,
    /// Search radius in kilometers.
    pub radius: Option<f64>,
}

/// Query parameters for `GET /public/alerts`. Note the short coordinate
/// names and the radius in meters (default 20000).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAlertsParams {
    /// Search center latitude.
    pub lat: Option<String>,
    /// Search center longitude.
    pub lng: Option<String>,
    /// Search radius in meters.
    pub radius: Option<f64>,
}

/// Query parameters for `GET /community/nearby-posts`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyPostsParams {
    /// Search center latitude.
    pub latitude: Option<String>,
    /// Search center longitude.
    pub longitude: Option<String>,
    /// Search radius in kilometers (default 15).
    pub radius: Option<f64>,
    /// Maximum number of results (default 20).
    pub limit: Option<usize>,
}

/// Payload of `GET /geolocation/nearby-hospitals`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyHospitalsData {
    /// Matched hospitals, ascending by distance.
    pub hospitals: Vec<Proximity<Hospital>>,
    /// Number of matches returned.
    pub count: usize,
    /// Echo of the search center.
    pub user_location: UserLocation,
    /// Echo of the search radius in kilometers.
    pub search_radius: f64,
}

/// Payload of `GET /geolocation/nearby-camps`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyCampsData {
    /// Matched camps, ascending by distance.
    pub camps: Vec<Proximity<BloodCamp>>,
    /// Number of matches returned.
    pub count: usize,
    /// Echo of the search center.
    pub user_location: UserLocation,
    /// Echo of the search radius in kilometers.
    pub search_radius: f64,
}

/// Payload of `GET /geolocation/analytics`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsData {
    /// Coverage counts, score, and insights.
    #[serde(flatten)]
    pub coverage: CoverageReport,
    /// Closest approved emergency-capable hospital, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_emergency: Option<Proximity<Hospital>>,
    /// Closest upcoming camps, ascending by distance.
    pub upcoming_camp_details: Vec<Proximity<BloodCamp>>,
}

impl From<RegionalAnalytics> for AnalyticsData {
    fn from(a: RegionalAnalytics) -> Self {
        Self {
            coverage: a.coverage,
            nearest_emergency: a.nearest_emergency,
            upcoming_camp_details: a.upcoming_camp_details,
        }
    }
}

/// One marker on the map overview.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    /// Entity ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Marker kind: `"hospital"` or `"camp"`.
    pub marker_type: &'static str,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Distance from the search center, 2-decimal km.
    pub distance_km: f64,
    /// Whether the hospital is emergency-capable (hospital markers only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_capable: Option<bool>,
    /// Camp start time (camp markers only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    /// Camp status (camp markers only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CampStatus>,
}

impl From<&Proximity<Hospital>> for MapMarker {
    fn from(hit: &Proximity<Hospital>) -> Self {
        Self {
            id: hit.entity.id,
            name: hit.entity.name.clone(),
            marker_type: "hospital",
            latitude: hit.entity.location.latitude(),
            longitude: hit.entity.location.longitude(),
            distance_km: hit.distance_km,
            emergency_capable: Some(hit.entity.emergency_capable),
            starts_at: None,
            status: None,
        }
    }
}

impl From<&Proximity<BloodCamp>> for MapMarker {
    fn from(hit: &Proximity<BloodCamp>) -> Self {
        Self {
            id: hit.entity.id,
            name: hit.entity.name.clone(),
            marker_type: "camp",
            latitude: hit.entity.location.latitude(),
            longitude: hit.entity.location.longitude(),
            distance_km: hit.distance_km,
            emergency_capable: None,
            starts_at: Some(hit.entity.starts_at),
            status: Some(hit.entity.status),
        }
    }
}

/// Marker counts for the map overview.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapCounts {
    /// Hospital markers returned.
    pub hospitals: usize,
    /// Camp markers returned.
    pub camps: usize,
}

/// Payload of `GET /geolocation/map-data`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    /// Hospital markers, ascending by distance.
    pub hospitals: Vec<MapMarker>,
    /// Camp markers, ascending by distance.
    pub camps: Vec<MapMarker>,
    /// Marker counts.
    pub counts: MapCounts,
}

/// A civic alert annotated with distance for the public alerts feed.
/// The wire name here is `distance` (km), unlike the `distanceKm` used by
/// the geolocation routes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertHit {
    /// The alert.
    #[serde(flatten)]
    pub alert: CivicAlert,
    /// Distance from the search center, 2-decimal km.
    pub distance: f64,
}

impl From<Proximity<CivicAlert>> for AlertHit {
    fn from(hit: Proximity<CivicAlert>) -> Self {
        Self {
            alert: hit.entity,
            distance: hit.distance_km,
        }
    }
}

/// Payload of `GET /public/alerts`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsData {
    /// Alerts sorted by urgency score (desc), then creation time (desc).
    pub alerts: Vec<AlertHit>,
    /// Number of alerts returned.
    pub count: usize,
}

/// Payload of `GET /community/nearby-posts`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyPostsData {
    /// Matched posts, ascending by distance.
    pub posts: Vec<Proximity<CommunityPost>>,
    /// Number of matches returned.
    pub count: usize,
    /// Echo of the search center.
    pub user_location: UserLocation,
    /// Echo of the search radius in kilometers.
    pub search_radius: f64,
}

/// Body of `POST /hospitals`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHospitalRequest {
    /// Display name.
    pub name: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Whether the hospital can receive emergency transfers.
    #[serde(default)]
    pub emergency_capable: bool,
    /// Initial blood stock.
    #[serde(default)]
    pub stock: Vec<BloodStock>,
}

/// Body of `POST /camps`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampRequest {
    /// Display name.
    pub name: String,
    /// Organizing body.
    pub organizer: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Scheduled start time.
    pub starts_at: DateTime<Utc>,
    /// Volunteer slots offered.
    pub available_slots: u32,
}

/// Body of `POST /alerts`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlertRequest {
    /// Short headline.
    pub title: String,
    /// Blood group in clinical notation; unknown values are accepted and
    /// scored with the default rarity weight.
    pub blood_group: Option<String>,
    /// Units requested.
    pub units_required: u32,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// When the need expires, if known.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Body of `POST /community/posts`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPostRequest {
    /// Author display name.
    pub author: String,
    /// Post title.
    pub title: String,
    /// Post body.
    pub body: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// Body of `POST /requests/urgency`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrgencyRequest {
    /// Blood group in clinical notation; unknown values are accepted and
    /// scored with the default rarity weight.
    pub blood_group: String,
    /// Units required.
    pub units_required: u32,
    /// Hours until the need expires, if known.
    pub expiry_hours: Option<f64>,
    /// Latitude for the nearby-stock lookup, if requested.
    pub latitude: Option<f64>,
    /// Longitude for the nearby-stock lookup, if requested.
    pub longitude: Option<f64>,
    /// Nearby-stock lookup radius in kilometers (default 25).
    pub radius: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shapes() {
        let ok = ApiResponse::ok("done", 7);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "done");
        assert_eq!(json["data"], 7);

        let err = ApiResponse::error("Latitude and longitude are required");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn query_params_use_original_names() {
        let params: NearbyHospitalsParams = serde_json::from_str(
            r#"{"latitude":"17.4","longitude":"78.5","radius":12.0,"emergencyOnly":true,"limit":5}"#,
        )
        .unwrap();
        assert_eq!(params.latitude.as_deref(), Some("17.4"));
        assert_eq!(params.emergency_only, Some(true));

        let params: PublicAlertsParams =
            serde_json::from_str(r#"{"lat":"17.4","lng":"78.5","radius":15000.0}"#).unwrap();
        assert_eq!(params.lng.as_deref(), Some("78.5"));
    }

    #[test]
    fn alert_hit_uses_distance_field() {
        let alert = CivicAlert {
            id: Uuid::new_v4(),
            title: "Need O-".to_string(),
            blood_group: None,
            units_required: 2,
            location: GeoPoint::new(78.5, 17.4).unwrap(),
            active: true,
            created_at: Utc::now(),
            expires_at: None,
            urgency_score: 55,
        };
        let hit = AlertHit {
            alert,
            distance: 3.25,
        };
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["distance"], 3.25);
        assert_eq!(json["urgencyScore"], 55);
        assert!(json.get("distanceKm").is_none());
    }
}
