//! HTTP handler functions for the coordination API.
//!
//! Coordinate validation is uniform across routes: missing latitude or
//! longitude is a 400 with `"Latitude and longitude are required"`, a
//! present-but-unparsable or out-of-range pair is a 400 with
//! `"Invalid coordinates"`. Registry failures are logged server-side and
//! reported to clients with generic messages.

use actix_web::{HttpResponse, web};
use bloodlink_blood_models::BloodGroup;
use bloodlink_geo::GeoPoint;
use bloodlink_registry::{HospitalFilter, RegistryError};
use bloodlink_registry_models::{BloodCamp, CampStatus, CivicAlert, CommunityPost, Hospital};
use bloodlink_server_models::{
    AlertHit, AlertsData, AnalyticsData, ApiHealth, ApiResponse, MapCounts, MapData, MapMarker,
    NearbyCampsData, NearbyCampsParams, NearbyHospitalsData, NearbyHospitalsParams,
    NearbyPostsData, NearbyPostsParams, NewAlertRequest, NewCampRequest, NewHospitalRequest,
    NewPostRequest, PublicAlertsParams, RegionParams, UrgencyRequest,
};
use bloodlink_urgency::{RarityTable, UrgencyInput, score_urgency};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::AppState;

const DEFAULT_HOSPITAL_RADIUS_KM: f64 = 10.0;
const DEFAULT_CAMP_RADIUS_KM: f64 = 20.0;
const DEFAULT_ANALYTICS_RADIUS_KM: f64 = 50.0;
const DEFAULT_MAP_RADIUS_KM: f64 = 30.0;
const DEFAULT_POST_RADIUS_KM: f64 = 15.0;
const DEFAULT_ALERT_RADIUS_M: f64 = 20_000.0;
const DEFAULT_HOSPITAL_LIMIT: usize = 20;
const DEFAULT_CAMP_LIMIT: usize = 15;
const DEFAULT_POST_LIMIT: usize = 20;
const ALERT_LIMIT: usize = 50;
const MAP_MARKER_LIMIT: usize = 100;

/// Radius used when looking up nearby stock for scoring, absent an
/// explicit radius in the request.
const DEFAULT_STOCK_RADIUS_KM: f64 = 25.0;

/// Parses a `(latitude, longitude)` query pair into a validated point.
///
/// Both parameters must be present, parse as floats, and fall inside the
/// valid coordinate ranges. On failure the caller returns the `Err`
/// response as-is.
fn parse_center(latitude: Option<&str>, longitude: Option<&str>) -> Result<GeoPoint, HttpResponse> {
    let (Some(lat_raw), Some(lon_raw)) = (latitude, longitude) else {
        return Err(HttpResponse::BadRequest()
            .json(ApiResponse::error("Latitude and longitude are required")));
    };

    let parsed = lat_raw
        .trim()
        .parse::<f64>()
        .ok()
        .zip(lon_raw.trim().parse::<f64>().ok())
        .and_then(|(lat, lon)| GeoPoint::new(lon, lat).ok());

    parsed.ok_or_else(|| {
        HttpResponse::BadRequest().json(ApiResponse::error("Invalid coordinates"))
    })
}

/// Hours from `now` until `expires`, negative when already past.
///
/// Minute counts are clamped to the `i32` range before the lossless
/// `f64` conversion; at that magnitude the expiry factor is saturated
/// anyway.
fn hours_until(expires: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let minutes = (expires - now)
        .num_minutes()
        .clamp(i64::from(i32::MIN), i64::from(i32::MAX));
    f64::from(i32::try_from(minutes).unwrap_or_default()) / 60.0
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /geolocation/nearby-hospitals`
pub async fn nearby_hospitals(
    state: web::Data<AppState>,
    params: web::Query<NearbyHospitalsParams>,
) -> HttpResponse {
    let center = match parse_center(params.latitude.as_deref(), params.longitude.as_deref()) {
        Ok(center) => center,
        Err(resp) => return resp,
    };
    let radius = params.radius.unwrap_or(DEFAULT_HOSPITAL_RADIUS_KM);
    let limit = params.limit.unwrap_or(DEFAULT_HOSPITAL_LIMIT);
    let filter = HospitalFilter {
        approved_only: true,
        emergency_only: params.emergency_only.unwrap_or(false),
    };

    let hospitals = state.registry.nearby_hospitals(center, radius, filter, limit);
    let data = NearbyHospitalsData {
        count: hospitals.len(),
        hospitals,
        user_location: center.into(),
        search_radius: radius,
    };
    HttpResponse::Ok().json(ApiResponse::ok("Nearby hospitals retrieved", data))
}

/// `GET /geolocation/nearby-camps`
pub async fn nearby_camps(
    state: web::Data<AppState>,
    params: web::Query<NearbyCampsParams>,
) -> HttpResponse {
    let center = match parse_center(params.latitude.as_deref(), params.longitude.as_deref()) {
        Ok(center) => center,
        Err(resp) => return resp,
    };
    let radius = params.radius.unwrap_or(DEFAULT_CAMP_RADIUS_KM);
    let limit = params.limit.unwrap_or(DEFAULT_CAMP_LIMIT);
    let upcoming_only = params.upcoming_only.unwrap_or(true);

    let camps = state
        .registry
        .nearby_camps(center, radius, upcoming_only, Utc::now(), limit);
    let data = NearbyCampsData {
        count: camps.len(),
        camps,
        user_location: center.into(),
        search_radius: radius,
    };
    HttpResponse::Ok().json(ApiResponse::ok("Nearby camps retrieved", data))
}

/// `GET /geolocation/analytics`
pub async fn regional_analytics(
    state: web::Data<AppState>,
    params: web::Query<RegionParams>,
) -> HttpResponse {
    let center = match parse_center(params.latitude.as_deref(), params.longitude.as_deref()) {
        Ok(center) => center,
        Err(resp) => return resp,
    };
    let radius = params.radius.unwrap_or(DEFAULT_ANALYTICS_RADIUS_KM);

    let analytics =
        bloodlink_analytics::compute_regional_analytics(&state.registry, center, radius, Utc::now());
    HttpResponse::Ok().json(ApiResponse::ok(
        "Regional analytics computed",
        AnalyticsData::from(analytics),
    ))
}

/// `GET /geolocation/map-data`
pub async fn map_data(
    state: web::Data<AppState>,
    params: web::Query<RegionParams>,
) -> HttpResponse {
    let center = match parse_center(params.latitude.as_deref(), params.longitude.as_deref()) {
        Ok(center) => center,
        Err(resp) => return resp,
    };
    let radius = params.radius.unwrap_or(DEFAULT_MAP_RADIUS_KM);

    let hospitals: Vec<MapMarker> = state
        .registry
        .nearby_hospitals(center, radius, HospitalFilter::default(), MAP_MARKER_LIMIT)
        .iter()
        .map(MapMarker::from)
        .collect();
    let camps: Vec<MapMarker> = state
        .registry
        .nearby_camps(center, radius, true, Utc::now(), MAP_MARKER_LIMIT)
        .iter()
        .map(MapMarker::from)
        .collect();

    let data = MapData {
        counts: MapCounts {
            hospitals: hospitals.len(),
            camps: camps.len(),
        },
        hospitals,
        camps,
    };
    HttpResponse::Ok().json(ApiResponse::ok("Map data retrieved", data))
}

/// `GET /public/alerts`
///
/// Uses the short `lat`/`lng` parameter names and a radius in meters;
/// results are ordered by urgency score (desc), then creation time
/// (desc) — not by distance. The result cap is applied after the urgency
/// sort, so the highest-urgency alerts in radius are always kept.
pub async fn public_alerts(
    state: web::Data<AppState>,
    params: web::Query<PublicAlertsParams>,
) -> HttpResponse {
    let center = match parse_center(params.lat.as_deref(), params.lng.as_deref()) {
        Ok(center) => center,
        Err(resp) => return resp,
    };
    let radius_km = params.radius.unwrap_or(DEFAULT_ALERT_RADIUS_M) / 1000.0;

    let mut alerts: Vec<AlertHit> = state
        .registry
        .nearby_alerts(center, radius_km, usize::MAX)
        .into_iter()
        .map(AlertHit::from)
        .collect();
    alerts.sort_by(|a, b| {
        b.alert
            .urgency_score
            .cmp(&a.alert.urgency_score)
            .then_with(|| b.alert.created_at.cmp(&a.alert.created_at))
    });
    alerts.truncate(ALERT_LIMIT);

    let data = AlertsData {
        count: alerts.len(),
        alerts,
    };
    HttpResponse::Ok().json(ApiResponse::ok("Active alerts retrieved", data))
}

/// `GET /community/nearby-posts`
pub async fn nearby_posts(
    state: web::Data<AppState>,
    params: web::Query<NearbyPostsParams>,
) -> HttpResponse {
    let center = match parse_center(params.latitude.as_deref(), params.longitude.as_deref()) {
        Ok(center) => center,
        Err(resp) => return resp,
    };
    let radius = params.radius.unwrap_or(DEFAULT_POST_RADIUS_KM);
    let limit = params.limit.unwrap_or(DEFAULT_POST_LIMIT);

    let posts = state.registry.nearby_posts(center, radius, limit);
    let data = NearbyPostsData {
        count: posts.len(),
        posts,
        user_location: center.into(),
        search_radius: radius,
    };
    HttpResponse::Ok().json(ApiResponse::ok("Nearby posts retrieved", data))
}

/// `POST /hospitals`
pub async fn create_hospital(
    state: web::Data<AppState>,
    body: web::Json<NewHospitalRequest>,
) -> HttpResponse {
    let Ok(location) = GeoPoint::new(body.longitude, body.latitude) else {
        return HttpResponse::BadRequest().json(ApiResponse::error("Invalid coordinates"));
    };

    let hospital = Hospital {
        id: Uuid::new_v4(),
        name: body.name.clone(),
        location,
        approved: true,
        emergency_capable: body.emergency_capable,
        stock: body.stock.clone(),
    };
    state.registry.insert_hospital(hospital.clone());
    log::info!("Registered hospital {} ({})", hospital.name, hospital.id);

    HttpResponse::Created().json(ApiResponse::ok("Hospital registered", hospital))
}

/// `POST /camps`
pub async fn create_camp(
    state: web::Data<AppState>,
    body: web::Json<NewCampRequest>,
) -> HttpResponse {
    let Ok(location) = GeoPoint::new(body.longitude, body.latitude) else {
        return HttpResponse::BadRequest().json(ApiResponse::error("Invalid coordinates"));
    };

    let camp = BloodCamp {
        id: Uuid::new_v4(),
        name: body.name.clone(),
        organizer: body.organizer.clone(),
        location,
        starts_at: body.starts_at,
        status: CampStatus::Upcoming,
        available_slots: body.available_slots,
        booked_slots: 0,
    };
    state.registry.insert_camp(camp.clone());
    log::info!("Created camp {} ({})", camp.name, camp.id);

    HttpResponse::Created().json(ApiResponse::ok("Camp created", camp))
}

/// `POST /camps/{id}/register`
///
/// Reserves one volunteer slot. The capacity check and increment run in
/// a single critical section, so a full camp can never be oversubscribed
/// by concurrent registrations.
pub async fn register_volunteer(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> HttpResponse {
    let camp_id = path.into_inner();
    match state.registry.reserve_camp_slot(camp_id) {
        Ok(camp) => HttpResponse::Ok().json(ApiResponse::ok("Volunteer slot reserved", camp)),
        Err(RegistryError::CampNotFound(_)) => {
            HttpResponse::NotFound().json(ApiResponse::error("Camp not found"))
        }
        Err(RegistryError::CampFull { .. }) => {
            HttpResponse::Conflict().json(ApiResponse::error("Camp is full"))
        }
        Err(e) => {
            log::error!("Failed to reserve slot on camp {camp_id}: {e}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to reserve volunteer slot"))
        }
    }
}

/// `POST /alerts`
///
/// Computes the alert's urgency snapshot at creation time using the
/// alert rarity table and live nearby stock around the alert location.
pub async fn create_alert(
    state: web::Data<AppState>,
    body: web::Json<NewAlertRequest>,
) -> HttpResponse {
    let Ok(location) = GeoPoint::new(body.longitude, body.latitude) else {
        return HttpResponse::BadRequest().json(ApiResponse::error("Invalid coordinates"));
    };
    let now = Utc::now();

    let group = body
        .blood_group
        .as_deref()
        .and_then(|raw| raw.parse::<BloodGroup>().ok());
    let expiry_hours = body.expires_at.map(|expires| hours_until(expires, now));
    let nearby_stock = group.map(|g| {
        state
            .registry
            .nearby_stock_units(location, DEFAULT_STOCK_RADIUS_KM, g)
    });

    let urgency = score_urgency(
        &UrgencyInput {
            blood_group: group,
            units_required: body.units_required,
            expiry_hours,
            nearby_stock,
        },
        RarityTable::Alert,
    );

    let alert = CivicAlert {
        id: Uuid::new_v4(),
        title: body.title.clone(),
        blood_group: group,
        units_required: body.units_required,
        location,
        active: true,
        created_at: now,
        expires_at: body.expires_at,
        urgency_score: urgency.score,
    };
    state.registry.insert_alert(alert.clone());
    log::info!(
        "Created alert {} ({}) with urgency {}",
        alert.title,
        alert.id,
        alert.urgency_score
    );

    HttpResponse::Created().json(ApiResponse::ok(
        "Alert created",
        serde_json::json!({ "alert": alert, "urgency": urgency }),
    ))
}

/// `POST /community/posts`
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<NewPostRequest>,
) -> HttpResponse {
    let Ok(location) = GeoPoint::new(body.longitude, body.latitude) else {
        return HttpResponse::BadRequest().json(ApiResponse::error("Invalid coordinates"));
    };

    let post = CommunityPost {
        id: Uuid::new_v4(),
        author: body.author.clone(),
        title: body.title.clone(),
        body: body.body.clone(),
        location,
        active: true,
        created_at: Utc::now(),
    };
    state.registry.insert_post(post.clone());

    HttpResponse::Created().json(ApiResponse::ok("Post created", post))
}

/// `POST /requests/urgency`
///
/// Scores an emergency blood request with the request rarity table. When
/// coordinates are supplied, live nearby stock feeds the scarcity factor;
/// otherwise that factor falls back to its no-records maximum.
pub async fn request_urgency(
    state: web::Data<AppState>,
    body: web::Json<UrgencyRequest>,
) -> HttpResponse {
    let group = body.blood_group.parse::<BloodGroup>().ok();

    let nearby_stock = match (body.latitude, body.longitude, group) {
        (Some(lat), Some(lon), Some(g)) => {
            let Ok(center) = GeoPoint::new(lon, lat) else {
                return HttpResponse::BadRequest().json(ApiResponse::error("Invalid coordinates"));
            };
            let radius = body.radius.unwrap_or(DEFAULT_STOCK_RADIUS_KM);
            Some(state.registry.nearby_stock_units(center, radius, g))
        }
        _ => None,
    };

    let urgency = score_urgency(
        &UrgencyInput {
            blood_group: group,
            units_required: body.units_required,
            expiry_hours: body.expiry_hours,
            nearby_stock,
        },
        RarityTable::Request,
    );

    HttpResponse::Ok().json(ApiResponse::ok("Urgency computed", urgency))
}
