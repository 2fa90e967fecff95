//! R-tree point index over one collection of located entities.
//!
//! The tree stores `[longitude, latitude]` positions keyed by entity ID.
//! Radius queries run in two phases: an envelope pre-filter against the
//! tree, then an exact Haversine check against the requested radius. The
//! envelope only guarantees membership of candidates; the distance shown
//! to callers is always recomputed.

use std::collections::BTreeMap;

use bloodlink_geo::{GeoPoint, distance_km};
use bloodlink_registry_models::Located;
use rstar::{AABB, RTree, RTreeObject};
use uuid::Uuid;

/// Meters spanned by one degree of latitude (and of longitude at the
/// equator).
const METERS_PER_DEGREE: f64 = 111_320.0;

/// One indexed position.
struct PointEntry {
    id: Uuid,
    position: [f64; 2],
}

impl RTreeObject for PointEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

/// A collection of entities with an R-tree over their positions.
pub(crate) struct GeoCollection<T: Located> {
    entities: BTreeMap<Uuid, T>,
    tree: RTree<PointEntry>,
}

impl<T: Located> Default for GeoCollection<T> {
    fn default() -> Self {
        Self {
            entities: BTreeMap::new(),
            tree: RTree::new(),
        }
    }
}

impl<T: Located> GeoCollection<T> {
    /// Inserts an entity, replacing any previous entity with the same ID.
    pub(crate) fn insert(&mut self, entity: T) {
        let id = entity.id();
        let location = entity.location();
        if let Some(previous) = self.entities.insert(id, entity) {
            let position = [previous.location().longitude(), previous.location().latitude()];
            self.tree.remove(&PointEntry { id, position });
        }
        self.tree.insert(PointEntry {
            id,
            position: [location.longitude(), location.latitude()],
        });
    }

    pub(crate) fn get_mut(&mut self, id: Uuid) -> Option<&mut T> {
        self.entities.get_mut(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `(entity, exact_distance_km)` pairs within `radius_km` of
    /// `center`, unordered.
    ///
    /// The radius is converted to meters for the index range query; each
    /// candidate's exact great-circle distance is then recomputed and
    /// checked against the radius.
    pub(crate) fn within_radius(&self, center: GeoPoint, radius_km: f64) -> Vec<(&T, f64)> {
        let radius_m = radius_km * 1000.0;
        let envelopes = search_envelopes(center, radius_m);

        envelopes
            .iter()
            .flat_map(|envelope| self.tree.locate_in_envelope_intersecting(envelope))
            .filter_map(|entry| {
                let entity = self.entities.get(&entry.id)?;
                let d = distance_km(
                    center.latitude(),
                    center.longitude(),
                    entry.position[1],
                    entry.position[0],
                );
                (d <= radius_km + 1e-9).then_some((entity, d))
            })
            .collect()
    }
}

/// Bounding boxes in degrees covering a metric radius around `center`.
///
/// Longitude span widens with latitude (degrees shrink toward the poles);
/// the boxes may over-cover but never under-cover, so the exact distance
/// check after them is authoritative. A box that would cross the
/// antimeridian is split into one box per side of ±180°, and a span of
/// 180° or more (queries near a pole) degrades to the full longitude
/// range. The two split boxes are disjoint, so no candidate is visited
/// twice.
fn search_envelopes(center: GeoPoint, radius_m: f64) -> Vec<AABB<[f64; 2]>> {
    let d_lat = radius_m / METERS_PER_DEGREE;
    let cos_lat = center.latitude().to_radians().cos().abs().max(1e-6);
    let d_lon = radius_m / (METERS_PER_DEGREE * cos_lat);

    let min_lat = center.latitude() - d_lat;
    let max_lat = center.latitude() + d_lat;

    if d_lon >= 180.0 {
        return vec![AABB::from_corners([-180.0, min_lat], [180.0, max_lat])];
    }

    let min_lon = center.longitude() - d_lon;
    let max_lon = center.longitude() + d_lon;
    if min_lon < -180.0 {
        vec![
            AABB::from_corners([min_lon + 360.0, min_lat], [180.0, max_lat]),
            AABB::from_corners([-180.0, min_lat], [max_lon, max_lat]),
        ]
    } else if max_lon > 180.0 {
        vec![
            AABB::from_corners([min_lon, min_lat], [180.0, max_lat]),
            AABB::from_corners([-180.0, min_lat], [max_lon - 360.0, max_lat]),
        ]
    } else {
        vec![AABB::from_corners([min_lon, min_lat], [max_lon, max_lat])]
    }
}

impl PartialEq for PointEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.position == other.position
    }
}
