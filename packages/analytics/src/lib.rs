#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Regional coverage aggregation over the proximity registry.
//!
//! Combines independent proximity counts (approved hospitals, the
//! emergency-capable subset, upcoming camps) into a composite coverage
//! score with qualitative insights, plus the nearest emergency hospital
//! and upcoming camp details for the analytics endpoint. Each count takes
//! its own registry read, so under concurrent writes the numbers may
//! reflect slightly different instants; that best-effort behavior is
//! intended and must not be "fixed" with a snapshot.

use bloodlink_geo::GeoPoint;
use bloodlink_registry::{HospitalFilter, Proximity, Registry};
use bloodlink_registry_models::{BloodCamp, Hospital};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Camps listed in `upcoming_camp_details`.
const CAMP_DETAIL_LIMIT: usize = 10;

/// Qualitative level used by coverage insights.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum InsightLevel {
    /// Sparse or absent.
    Low,
    /// Some presence.
    Moderate,
    /// Well covered.
    High,
}

/// Threshold-derived qualitative insights for a region.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageInsights {
    /// Hospital density: High above 5, Moderate above 2, else Low.
    pub hospital_density: InsightLevel,
    /// Emergency readiness: High at 3+ capable hospitals, Moderate at 1+,
    /// else Low.
    pub emergency_readiness: InsightLevel,
    /// Camp activity: High above 3 upcoming camps, Moderate above 1,
    /// else Low.
    pub camp_activity: InsightLevel,
}

/// Composite coverage numbers for a region.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    /// Approved hospitals within the radius.
    pub total_hospitals: usize,
    /// Approved, emergency-capable hospitals within the radius.
    pub emergency_hospitals: usize,
    /// Upcoming camps within the radius.
    pub upcoming_camps: usize,
    /// `min(100, hospitals*10 + emergency*20 + camps*5)`.
    pub coverage_score: u32,
    /// Qualitative read on the counts.
    pub insights: CoverageInsights,
}

/// Full analytics payload for a region.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalAnalytics {
    /// Composite coverage numbers.
    pub coverage: CoverageReport,
    /// Closest approved emergency-capable hospital, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_emergency: Option<Proximity<Hospital>>,
    /// Closest upcoming camps, ascending by distance.
    pub upcoming_camp_details: Vec<Proximity<BloodCamp>>,
}

/// Computes the coverage report for a region.
///
/// Issues three independent counts against the registry; no consistency
/// is guaranteed across them.
#[must_use]
pub fn compute_coverage(
    registry: &Registry,
    center: GeoPoint,
    radius_km: f64,
    now: DateTime<Utc>,
) -> CoverageReport {
    let total_hospitals = registry.count_hospitals(center, radius_km, HospitalFilter::default());
    let emergency_hospitals = registry.count_hospitals(
        center,
        radius_km,
        HospitalFilter {
            approved_only: true,
            emergency_only: true,
        },
    );
    let upcoming_camps = registry.count_upcoming_camps(center, radius_km, now);

    let raw_score = total_hospitals * 10 + emergency_hospitals * 20 + upcoming_camps * 5;
    let coverage_score = u32::try_from(raw_score).unwrap_or(u32::MAX).min(100);

    log::debug!(
        "Coverage at ({}, {}) r={radius_km}km: {total_hospitals} hospitals, \
         {emergency_hospitals} emergency, {upcoming_camps} camps, score {coverage_score}",
        center.latitude(),
        center.longitude()
    );

    CoverageReport {
        total_hospitals,
        emergency_hospitals,
        upcoming_camps,
        coverage_score,
        insights: CoverageInsights {
            hospital_density: level(total_hospitals, 5, 2),
            emergency_readiness: level(emergency_hospitals, 2, 0),
            camp_activity: level(upcoming_camps, 3, 1),
        },
    }
}

/// Computes the full analytics payload: coverage plus the nearest
/// emergency hospital and upcoming camp details.
#[must_use]
pub fn compute_regional_analytics(
    registry: &Registry,
    center: GeoPoint,
    radius_km: f64,
    now: DateTime<Utc>,
) -> RegionalAnalytics {
    let coverage = compute_coverage(registry, center, radius_km, now);
    let nearest_emergency = registry.nearest_emergency_hospital(center, radius_km);
    let upcoming_camp_details =
        registry.nearby_camps(center, radius_km, true, now, CAMP_DETAIL_LIMIT);

    RegionalAnalytics {
        coverage,
        nearest_emergency,
        upcoming_camp_details,
    }
}

/// High when `count > high`, Moderate when `count > moderate`, else Low.
const fn level(count: usize, high: usize, moderate: usize) -> InsightLevel {
    if count > high {
        InsightLevel::High
    } else if count > moderate {
        InsightLevel::Moderate
    } else {
        InsightLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloodlink_blood_models::BloodGroup;
    use bloodlink_registry_models::{BloodStock, CampStatus};
    use uuid::Uuid;

    fn point(longitude: f64, latitude: f64) -> GeoPoint {
        GeoPoint::new(longitude, latitude).unwrap()
    }

    fn hospital(longitude: f64, latitude: f64, emergency: bool) -> Hospital {
        Hospital {
            id: Uuid::new_v4(),
            name: "H".to_string(),
            location: point(longitude, latitude),
            approved: true,
            emergency_capable: emergency,
            stock: vec![BloodStock {
                blood_group: BloodGroup::OPositive,
                units: 5,
                expires_at: None,
            }],
        }
    }

    fn camp(longitude: f64, latitude: f64) -> BloodCamp {
        BloodCamp {
            id: Uuid::new_v4(),
            name: "C".to_string(),
            organizer: "Org".to_string(),
            location: point(longitude, latitude),
            starts_at: Utc::now() + chrono::Duration::days(2),
            status: CampStatus::Upcoming,
            available_slots: 20,
            booked_slots: 0,
        }
    }

    #[test]
    fn empty_region_scores_zero() {
        let registry = Registry::new();
        let report = compute_coverage(&registry, point(78.48, 17.41), 50.0, Utc::now());
        assert_eq!(report.coverage_score, 0);
        assert_eq!(report.insights.hospital_density, InsightLevel::Low);
        assert_eq!(report.insights.emergency_readiness, InsightLevel::Low);
        assert_eq!(report.insights.camp_activity, InsightLevel::Low);
    }

    #[test]
    fn score_formula_and_insights() {
        let registry = Registry::new();
        registry.insert_hospital(hospital(78.48, 17.41, true));
        registry.insert_hospital(hospital(78.49, 17.42, false));
        registry.insert_hospital(hospital(78.50, 17.43, false));
        registry.insert_camp(camp(78.48, 17.41));
        registry.insert_camp(camp(78.49, 17.42));

        let report = compute_coverage(&registry, point(78.48, 17.41), 50.0, Utc::now());
        assert_eq!(report.total_hospitals, 3);
        assert_eq!(report.emergency_hospitals, 1);
        assert_eq!(report.upcoming_camps, 2);
        // 3*10 + 1*20 + 2*5 = 60
        assert_eq!(report.coverage_score, 60);
        assert_eq!(report.insights.hospital_density, InsightLevel::Moderate);
        assert_eq!(report.insights.emergency_readiness, InsightLevel::Moderate);
        assert_eq!(report.insights.camp_activity, InsightLevel::Moderate);
    }

    #[test]
    fn score_saturates_at_100() {
        let registry = Registry::new();
        for i in 0..12 {
            let lon = 78.40 + f64::from(i) * 0.01;
            registry.insert_hospital(hospital(lon, 17.41, true));
        }
        let report = compute_coverage(&registry, point(78.45, 17.41), 100.0, Utc::now());
        assert_eq!(report.coverage_score, 100);
        assert_eq!(report.insights.hospital_density, InsightLevel::High);
        assert_eq!(report.insights.emergency_readiness, InsightLevel::High);
    }

    #[test]
    fn regional_analytics_includes_nearest_and_camps() {
        let registry = Registry::new();
        registry.insert_hospital(hospital(78.49, 17.42, true));
        registry.insert_camp(camp(78.48, 17.41));

        let analytics =
            compute_regional_analytics(&registry, point(78.48, 17.41), 50.0, Utc::now());
        assert!(analytics.nearest_emergency.is_some());
        assert_eq!(analytics.upcoming_camp_details.len(), 1);
        assert!(
            analytics.upcoming_camp_details[0]
                .estimated_travel_minutes
                .is_some()
        );
    }
}
