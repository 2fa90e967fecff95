#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory located-entity registry with R-tree proximity queries.
//!
//! Collections are loaded from a seed file at startup and served from
//! memory behind a single `RwLock`. Proximity queries are read-only:
//! candidates come from an R-tree envelope pre-filter, exact distances are
//! recomputed with the shared Haversine implementation, and results are
//! returned sorted ascending by distance. The one mutation with a
//! consistency requirement — camp slot reservation — checks capacity and
//! increments in a single critical section so a full camp can never be
//! oversubscribed.

mod index;
mod seed;

pub use seed::Seed;

use std::sync::RwLock;

use bloodlink_blood_models::BloodGroup;
use bloodlink_geo::{GeoPoint, round2, travel_minutes};
use bloodlink_registry_models::{
    BloodCamp, CivicAlert, CommunityPost, EmergencyEvent, Hospital, Located,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::index::GeoCollection;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No camp exists with the given ID.
    #[error("Camp not found: {0}")]
    CampNotFound(Uuid),

    /// The camp has no remaining volunteer slots.
    #[error("Camp {camp_id} is full ({available_slots} slots)")]
    CampFull {
        /// The full camp.
        camp_id: Uuid,
        /// Its total slot count.
        available_slots: u32,
    },

    /// Seed file could not be read.
    #[error("Seed I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Seed file could not be parsed.
    #[error("Seed parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// An entity annotated with its distance from a query center.
///
/// Derived per query, never persisted. `distance_km` is rounded to two
/// decimals; `estimated_travel_minutes` is present where a transfer
/// estimate makes sense (camps, nearest-emergency lookups).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Proximity<T> {
    /// The matched entity.
    #[serde(flatten)]
    pub entity: T,
    /// Great-circle distance from the query center, 2-decimal km.
    pub distance_km: f64,
    /// Estimated travel time at the assumed transfer speed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_travel_minutes: Option<f64>,
}

/// Equality/range constraints applied to hospital proximity queries.
#[derive(Debug, Clone, Copy)]
pub struct HospitalFilter {
    /// Only hospitals that passed registration review.
    pub approved_only: bool,
    /// Only hospitals that can receive emergency transfers.
    pub emergency_only: bool,
}

impl Default for HospitalFilter {
    fn default() -> Self {
        Self {
            approved_only: true,
            emergency_only: false,
        }
    }
}

impl HospitalFilter {
    fn matches(self, hospital: &Hospital) -> bool {
        (!self.approved_only || hospital.approved)
            && (!self.emergency_only || hospital.emergency_capable)
    }
}

#[derive(Default)]
struct Collections {
    hospitals: GeoCollection<Hospital>,
    camps: GeoCollection<BloodCamp>,
    alerts: GeoCollection<CivicAlert>,
    posts: GeoCollection<CommunityPost>,
    events: GeoCollection<EmergencyEvent>,
}

/// The shared entity registry.
///
/// All query methods take a read lock for the duration of a single
/// collection scan. Aggregations that issue several queries (coverage
/// analytics) therefore see each count at a slightly different instant
/// under concurrent writes; that best-effort behavior is intended.
pub struct Registry {
    inner: RwLock<Collections>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Collections::default()),
        }
    }

    /// Registers a hospital, replacing any previous entry with the same ID.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    pub fn insert_hospital(&self, hospital: Hospital) {
        self.write().hospitals.insert(hospital);
    }

    /// Registers a camp, replacing any previous entry with the same ID.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    pub fn insert_camp(&self, camp: BloodCamp) {
        self.write().camps.insert(camp);
    }

    /// Registers an alert, replacing any previous entry with the same ID.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    pub fn insert_alert(&self, alert: CivicAlert) {
        self.write().alerts.insert(alert);
    }

    /// Registers a community post, replacing any previous entry with the
    /// same ID.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    pub fn insert_post(&self, post: CommunityPost) {
        self.write().posts.insert(post);
    }

    /// Registers an emergency event, replacing any previous entry with the
    /// same ID.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    pub fn insert_event(&self, event: EmergencyEvent) {
        self.write().events.insert(event);
    }

    /// Hospitals within `radius_km` of `center` matching `filter`, sorted
    /// ascending by distance and truncated to `limit`.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    #[must_use]
    pub fn nearby_hospitals(
        &self,
        center: GeoPoint,
        radius_km: f64,
        filter: HospitalFilter,
        limit: usize,
    ) -> Vec<Proximity<Hospital>> {
        let guard = self.read();
        rank(&guard.hospitals, center, radius_km, limit, false, |h| {
            filter.matches(h)
        })
    }

    /// Camps within `radius_km` of `center`, sorted ascending by distance
    /// and truncated to `limit`. When `upcoming_only` is set, only camps
    /// with `UPCOMING` status starting at or after `now` are returned.
    /// Results carry travel-time estimates.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    #[must_use]
    pub fn nearby_camps(
        &self,
        center: GeoPoint,
        radius_km: f64,
        upcoming_only: bool,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Vec<Proximity<BloodCamp>> {
        let guard = self.read();
        rank(&guard.camps, center, radius_km, limit, true, |c| {
            !upcoming_only || c.is_upcoming(now)
        })
    }

    /// Active alerts within `radius_km` of `center`, sorted ascending by
    /// distance and truncated to `limit`.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    #[must_use]
    pub fn nearby_alerts(
        &self,
        center: GeoPoint,
        radius_km: f64,
        limit: usize,
    ) -> Vec<Proximity<CivicAlert>> {
        let guard = self.read();
        rank(&guard.alerts, center, radius_km, limit, false, |a| a.active)
    }

    /// Active community posts within `radius_km` of `center`, sorted
    /// ascending by distance and truncated to `limit`.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    #[must_use]
    pub fn nearby_posts(
        &self,
        center: GeoPoint,
        radius_km: f64,
        limit: usize,
    ) -> Vec<Proximity<CommunityPost>> {
        let guard = self.read();
        rank(&guard.posts, center, radius_km, limit, false, |p| p.active)
    }

    /// Unresolved emergency events within `radius_km` of `center`, sorted
    /// ascending by distance and truncated to `limit`.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    #[must_use]
    pub fn nearby_events(
        &self,
        center: GeoPoint,
        radius_km: f64,
        limit: usize,
    ) -> Vec<Proximity<EmergencyEvent>> {
        let guard = self.read();
        rank(&guard.events, center, radius_km, limit, false, |e| {
            !e.resolved
        })
    }

    /// Per-hospital unit totals of `group` held by approved hospitals
    /// within `radius_km`. Hospitals without a stock line for the group
    /// are omitted, so an empty result means no nearby stock records.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    #[must_use]
    pub fn nearby_stock_units(
        &self,
        center: GeoPoint,
        radius_km: f64,
        group: BloodGroup,
    ) -> Vec<u32> {
        let guard = self.read();
        guard
            .hospitals
            .within_radius(center, radius_km)
            .into_iter()
            .filter(|(h, _)| h.approved && h.stock.iter().any(|s| s.blood_group == group))
            .map(|(h, _)| h.units_of(group))
            .collect()
    }

    /// Number of hospitals matching `filter` within `radius_km`.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    #[must_use]
    pub fn count_hospitals(&self, center: GeoPoint, radius_km: f64, filter: HospitalFilter) -> usize {
        let guard = self.read();
        guard
            .hospitals
            .within_radius(center, radius_km)
            .into_iter()
            .filter(|(h, _)| filter.matches(h))
            .count()
    }

    /// Number of upcoming camps within `radius_km` at `now`.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    #[must_use]
    pub fn count_upcoming_camps(
        &self,
        center: GeoPoint,
        radius_km: f64,
        now: DateTime<Utc>,
    ) -> usize {
        let guard = self.read();
        guard
            .camps
            .within_radius(center, radius_km)
            .into_iter()
            .filter(|(c, _)| c.is_upcoming(now))
            .count()
    }

    /// The closest approved, emergency-capable hospital within
    /// `radius_km`, with a travel-time estimate.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    #[must_use]
    pub fn nearest_emergency_hospital(
        &self,
        center: GeoPoint,
        radius_km: f64,
    ) -> Option<Proximity<Hospital>> {
        let guard = self.read();
        rank(&guard.hospitals, center, radius_km, 1, true, |h| {
            h.approved && h.emergency_capable
        })
        .into_iter()
        .next()
    }

    /// Reserves one volunteer slot on a camp.
    ///
    /// Capacity check and increment happen in one critical section under
    /// the write lock, so concurrent reservations cannot push
    /// `booked_slots` past `available_slots`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::CampNotFound`] if the camp does not exist
    /// and [`RegistryError::CampFull`] if no slots remain.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    pub fn reserve_camp_slot(&self, camp_id: Uuid) -> Result<BloodCamp, RegistryError> {
        let mut guard = self.write();
        let camp = guard
            .camps
            .get_mut(camp_id)
            .ok_or(RegistryError::CampNotFound(camp_id))?;
        if !camp.has_capacity() {
            return Err(RegistryError::CampFull {
                camp_id,
                available_slots: camp.available_slots,
            });
        }
        camp.booked_slots += 1;
        Ok(camp.clone())
    }

    /// Entity counts per collection, for startup logging and health
    /// output.
    ///
    /// # Panics
    ///
    /// Panics if the registry lock is poisoned.
    #[must_use]
    pub fn collection_sizes(&self) -> (usize, usize, usize, usize, usize) {
        let guard = self.read();
        (
            guard.hospitals.len(),
            guard.camps.len(),
            guard.alerts.len(),
            guard.posts.len(),
            guard.events.len(),
        )
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Collections> {
        self.inner.read().expect("Registry lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Collections> {
        self.inner.write().expect("Registry lock poisoned")
    }
}

/// Runs one radius query: envelope pre-filter, entity filter, exact
/// distance sort ascending, limit truncation, display rounding.
fn rank<T: Located + Clone>(
    collection: &GeoCollection<T>,
    center: GeoPoint,
    radius_km: f64,
    limit: usize,
    with_travel_estimate: bool,
    keep: impl Fn(&T) -> bool,
) -> Vec<Proximity<T>> {
    let mut matches: Vec<(&T, f64)> = collection
        .within_radius(center, radius_km)
        .into_iter()
        .filter(|(entity, _)| keep(entity))
        .collect();
    matches.sort_by(|a, b| a.1.total_cmp(&b.1));
    matches.truncate(limit);

    matches
        .into_iter()
        .map(|(entity, d)| Proximity {
            entity: entity.clone(),
            distance_km: round2(d),
            estimated_travel_minutes: with_travel_estimate.then(|| round2(travel_minutes(d))),
        })
        .collect()
}
