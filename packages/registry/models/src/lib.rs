#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Located entity types for the donation coordination registry.
//!
//! Every entity here carries a [`GeoPoint`] and is queryable by proximity.
//! Entities are created by their owning flows (hospital registration, camp
//! creation, alert creation) and are read-only from the perspective of the
//! proximity and urgency logic; the single exception is camp slot
//! reservation, which mutates `booked_slots` through the registry.

use bloodlink_blood_models::BloodGroup;
use bloodlink_geo::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Anything with an identity and a point location.
pub trait Located {
    /// Stable entity identity.
    fn id(&self) -> Uuid;
    /// The entity's position.
    fn location(&self) -> GeoPoint;
}

/// Units of one blood group held by a hospital.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodStock {
    /// Blood group of this stock line.
    pub blood_group: BloodGroup,
    /// Units currently available.
    pub units: u32,
    /// When this stock expires, if tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// A registered hospital.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    /// Unique hospital ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Point location.
    pub location: GeoPoint,
    /// Whether the hospital has passed registration review.
    pub approved: bool,
    /// Whether the hospital can receive emergency transfers.
    pub emergency_capable: bool,
    /// Current blood stock by group.
    #[serde(default)]
    pub stock: Vec<BloodStock>,
}

impl Hospital {
    /// Total units held for one blood group across stock lines.
    #[must_use]
    pub fn units_of(&self, group: BloodGroup) -> u32 {
        self.stock
            .iter()
            .filter(|s| s.blood_group == group)
            .map(|s| s.units)
            .sum()
    }
}

impl Located for Hospital {
    fn id(&self) -> Uuid {
        self.id
    }

    fn location(&self) -> GeoPoint {
        self.location
    }
}

/// Lifecycle state of a blood camp.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CampStatus {
    /// Scheduled but not yet started.
    Upcoming,
    /// Currently running.
    Ongoing,
    /// Finished.
    Completed,
    /// Called off before completion.
    Cancelled,
}

/// A blood donation camp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodCamp {
    /// Unique camp ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Organizing body.
    pub organizer: String,
    /// Point location.
    pub location: GeoPoint,
    /// Scheduled start time.
    pub starts_at: DateTime<Utc>,
    /// Lifecycle state.
    pub status: CampStatus,
    /// Volunteer slots offered.
    pub available_slots: u32,
    /// Volunteer slots taken.
    pub booked_slots: u32,
}

impl BloodCamp {
    /// Whether at least one volunteer slot remains.
    #[must_use]
    pub const fn has_capacity(&self) -> bool {
        self.booked_slots < self.available_slots
    }

    /// Whether this camp counts as upcoming at `now`.
    #[must_use]
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.status == CampStatus::Upcoming && self.starts_at >= now
    }
}

impl Located for BloodCamp {
    fn id(&self) -> Uuid {
        self.id
    }

    fn location(&self) -> GeoPoint {
        self.location
    }
}

/// A civic blood-need alert raised for a locality.
///
/// `urgency_score` is a snapshot computed at creation time from the alert
/// rarity table; it is always recomputable from the other fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CivicAlert {
    /// Unique alert ID.
    pub id: Uuid,
    /// Short headline.
    pub title: String,
    /// Blood group needed, if the alert is group-specific.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<BloodGroup>,
    /// Units requested.
    pub units_required: u32,
    /// Point location.
    pub location: GeoPoint,
    /// Whether the alert is still active.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// When the underlying need expires, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Urgency score snapshot (0-100) taken at creation.
    pub urgency_score: u8,
}

impl Located for CivicAlert {
    fn id(&self) -> Uuid {
        self.id
    }

    fn location(&self) -> GeoPoint {
        self.location
    }
}

/// A community post pinned to a location (donation drives, appeals,
/// thank-you notes).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityPost {
    /// Unique post ID.
    pub id: Uuid,
    /// Author display name.
    pub author: String,
    /// Post title.
    pub title: String,
    /// Post body.
    pub body: String,
    /// Point location.
    pub location: GeoPoint,
    /// Whether the post is visible.
    pub active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Located for CommunityPost {
    fn id(&self) -> Uuid {
        self.id
    }

    fn location(&self) -> GeoPoint {
        self.location
    }
}

/// An emergency blood request raised by a hospital or doctor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// Blood group needed.
    pub blood_group: BloodGroup,
    /// Units needed.
    pub units_required: u32,
    /// Point location.
    pub location: GeoPoint,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// When the need expires, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether the request has been fulfilled or withdrawn.
    pub resolved: bool,
}

impl Located for EmergencyEvent {
    fn id(&self) -> Uuid {
        self.id
    }

    fn location(&self) -> GeoPoint {
        self.location
    }
}
