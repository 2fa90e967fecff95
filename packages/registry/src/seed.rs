//! Seed file loading.
//!
//! The registry is populated at startup from a JSON document holding one
//! array per collection. Locations use the GeoJSON `Point` shape, so
//! coordinate arrays are `[longitude, latitude]`.

use std::path::Path;

use bloodlink_registry_models::{BloodCamp, CivicAlert, CommunityPost, EmergencyEvent, Hospital};
use serde::Deserialize;

use crate::{Registry, RegistryError};

/// Root of a seed document. Every collection is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Seed {
    /// Hospitals to register.
    pub hospitals: Vec<Hospital>,
    /// Camps to register.
    pub camps: Vec<BloodCamp>,
    /// Alerts to register (with their urgency snapshots).
    pub alerts: Vec<CivicAlert>,
    /// Community posts to register.
    pub posts: Vec<CommunityPost>,
    /// Emergency events to register.
    pub events: Vec<EmergencyEvent>,
}

impl Seed {
    /// Reads and parses a seed file.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, RegistryError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl Registry {
    /// Builds a registry pre-populated from a seed file.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the seed cannot be read or parsed.
    pub fn from_seed_path(path: &Path) -> Result<Self, RegistryError> {
        let seed = Seed::from_path(path)?;
        Ok(Self::from_seed(seed))
    }

    /// Builds a registry from an in-memory seed.
    #[must_use]
    pub fn from_seed(seed: Seed) -> Self {
        let registry = Self::new();
        log::info!(
            "Seeding registry: {} hospitals, {} camps, {} alerts, {} posts, {} events",
            seed.hospitals.len(),
            seed.camps.len(),
            seed.alerts.len(),
            seed.posts.len(),
            seed.events.len()
        );
        for hospital in seed.hospitals {
            registry.insert_hospital(hospital);
        }
        for camp in seed.camps {
            registry.insert_camp(camp);
        }
        for alert in seed.alerts {
            registry.insert_alert(alert);
        }
        for post in seed.posts {
            registry.insert_post(post);
        }
        for event in seed.events {
            registry.insert_event(event);
        }
        registry
    }
}
