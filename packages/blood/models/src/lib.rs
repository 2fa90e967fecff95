#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Blood group taxonomy and urgency weighting definitions.
//!
//! This crate defines the canonical ABO/Rh blood group enumeration used
//! across the entire system, the rarity weight tables that feed urgency
//! scoring, and the urgency label thresholds. Two rarity tables exist on
//! purpose: emergency requests and civic alerts weight the same groups
//! differently, and alert scores are persisted as snapshots, so the tables
//! must stay independently addressable.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Rarity weight applied when a blood group is unknown or unparsable.
pub const DEFAULT_RARITY_WEIGHT: u8 = 10;

/// The eight ABO/Rh blood groups.
///
/// Serialized with their clinical notation (`"O-"`, `"AB+"`, ...) both in
/// JSON and via `Display`/`FromStr`.
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
pub enum BloodGroup {
    /// A positive
    #[serde(rename = "A+")]
    #[strum(serialize = "A+")]
    APositive,
    /// A negative
    #[serde(rename = "A-")]
    #[strum(serialize = "A-")]
    ANegative,
    /// B positive
    #[serde(rename = "B+")]
    #[strum(serialize = "B+")]
    BPositive,
    /// B negative
    #[serde(rename = "B-")]
    #[strum(serialize = "B-")]
    BNegative,
    /// AB positive
    #[serde(rename = "AB+")]
    #[strum(serialize = "AB+")]
    AbPositive,
    /// AB negative
    #[serde(rename = "AB-")]
    #[strum(serialize = "AB-")]
    AbNegative,
    /// O positive
    #[serde(rename = "O+")]
    #[strum(serialize = "O+")]
    OPositive,
    /// O negative (universal donor, rarest)
    #[serde(rename = "O-")]
    #[strum(serialize = "O-")]
    ONegative,
}

impl BloodGroup {
    /// `RARITY_WEIGHTS_REQUEST` — rarity weights used when scoring
    /// emergency blood requests (0-30 band).
    #[must_use]
    pub const fn request_rarity_weight(self) -> u8 {
        match self {
            Self::ONegative => 30,
            Self::AbNegative => 27,
            Self::BNegative => 24,
            Self::ANegative => 22,
            Self::AbPositive => 18,
            Self::OPositive => 15,
            Self::BPositive => 12,
            Self::APositive => 10,
        }
    }

    /// `RARITY_WEIGHTS_ALERT` — rarity weights used when scoring civic
    /// alerts at creation time (0-25 band).
    ///
    /// Deliberately distinct from [`Self::request_rarity_weight`]: alert
    /// scores are persisted as snapshots, so changing this table changes
    /// historical orderings.
    #[must_use]
    pub const fn alert_rarity_weight(self) -> u8 {
        match self {
            Self::ONegative => 25,
            Self::AbNegative => 22,
            Self::BNegative => 18,
            Self::ANegative => 16,
            Self::AbPositive => 12,
            Self::OPositive => 10,
            Self::BPositive => 8,
            Self::APositive => 5,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::APositive,
            Self::ANegative,
            Self::BPositive,
            Self::BNegative,
            Self::AbPositive,
            Self::AbNegative,
            Self::OPositive,
            Self::ONegative,
        ]
    }
}

/// Qualitative urgency band derived from a 0-100 urgency score.
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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyLabel {
    /// Score below 40.
    Low,
    /// Score 40-59.
    Medium,
    /// Score 60-79.
    High,
    /// Score 80 and above.
    Critical,
}

impl UrgencyLabel {
    /// Maps a 0-100 urgency score onto its label band.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        match score {
            80.. => Self::Critical,
            60..=79 => Self::High,
            40..=59 => Self::Medium,
            _ => Self::Low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blood_group_roundtrip_notation() {
        for group in BloodGroup::all() {
            let s = group.to_string();
            let parsed: BloodGroup = s.parse().unwrap();
            assert_eq!(*group, parsed, "{s} failed to round-trip");
        }
        assert_eq!("O-".parse::<BloodGroup>().unwrap(), BloodGroup::ONegative);
        assert!("Z+".parse::<BloodGroup>().is_err());
    }

    #[test]
    fn request_weights_rank_o_negative_highest() {
        for group in BloodGroup::all() {
            assert!(group.request_rarity_weight() <= BloodGroup::ONegative.request_rarity_weight());
            assert!(group.request_rarity_weight() <= 30);
            assert!(group.request_rarity_weight() >= 10);
        }
    }

    #[test]
    fn alert_weights_stay_in_band() {
        for group in BloodGroup::all() {
            assert!(group.alert_rarity_weight() <= 25);
            assert!(group.alert_rarity_weight() >= 5);
        }
        assert_eq!(BloodGroup::ONegative.alert_rarity_weight(), 25);
        assert_eq!(BloodGroup::APositive.alert_rarity_weight(), 5);
    }

    #[test]
    fn label_boundaries() {
        assert_eq!(UrgencyLabel::from_score(0), UrgencyLabel::Low);
        assert_eq!(UrgencyLabel::from_score(39), UrgencyLabel::Low);
        assert_eq!(UrgencyLabel::from_score(40), UrgencyLabel::Medium);
        assert_eq!(UrgencyLabel::from_score(59), UrgencyLabel::Medium);
        assert_eq!(UrgencyLabel::from_score(60), UrgencyLabel::High);
        assert_eq!(UrgencyLabel::from_score(79), UrgencyLabel::High);
        assert_eq!(UrgencyLabel::from_score(80), UrgencyLabel::Critical);
        assert_eq!(UrgencyLabel::from_score(100), UrgencyLabel::Critical);
    }

    #[test]
    fn json_uses_clinical_notation() {
        let json = serde_json::to_string(&BloodGroup::AbNegative).unwrap();
        assert_eq!(json, "\"AB-\"");
        let back: BloodGroup = serde_json::from_str("\"O+\"").unwrap();
        assert_eq!(back, BloodGroup::OPositive);
    }
}
