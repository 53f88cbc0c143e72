//! World geometry and physics queries.
//!
//! Level geometry is a flat list of axis-aligned boxes tagged with collision
//! layers. The AI only ever talks to it through the [`PhysicsProbe`] trait,
//! so tests can swap in hand-built fixture worlds.

use std::ops::BitOr;

use bevy::prelude::*;

/// Bitmask of collision layers a collider belongs to / a query filters on.
///
/// An empty mask matches nothing: probes run against it come back negative
/// instead of erroring, which is how unconfigured sensors degrade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerMask(pub u32);

pub const LAYER_GROUND: LayerMask = LayerMask(1);
pub const LAYER_WALL: LayerMask = LayerMask(1 << 1);
pub const LAYER_HAZARD: LayerMask = LayerMask(1 << 2);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for LayerMask {
    type Output = LayerMask;

    fn bitor(self, rhs: LayerMask) -> LayerMask {
        LayerMask(self.0 | rhs.0)
    }
}

/// A solid axis-aligned box in world space
#[derive(Clone, Copy, Debug)]
pub struct Collider {
    pub min: Vec2,
    pub max: Vec2,
    pub layer: LayerMask,
}

impl Collider {
    /// Create from center position and size
    pub fn from_center_size(center: Vec2, size: Vec2, layer: LayerMask) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
            layer,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Closest point on the box to `point`
    pub fn clamp_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        )
    }
}

/// Result of a raycast query
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    /// Distance from the ray origin to the hit point
    pub distance: f32,
    /// World-space hit point
    pub point: Vec2,
    /// Layers of the collider that was hit
    pub layer: LayerMask,
}

/// Synchronous geometric queries against the current world snapshot.
///
/// `direction` is expected to be normalized. Queries with an empty mask
/// return "no hit" rather than failing.
pub trait PhysicsProbe {
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit>;

    fn overlap_circle(&self, point: Vec2, radius: f32, mask: LayerMask) -> bool;
}

/// Static collision geometry for the loaded level.
///
/// Built once at level start and never mutated afterwards, so any number of
/// agents can query it concurrently.
#[derive(Resource, Default)]
pub struct LevelGeometry {
    colliders: Vec<Collider>,
}

impl LevelGeometry {
    pub fn new(colliders: Vec<Collider>) -> Self {
        Self { colliders }
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    /// Slab test of a ray against one box. Returns the entry distance,
    /// which is 0.0 when the origin starts inside the box.
    fn ray_vs_collider(
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        collider: &Collider,
    ) -> Option<f32> {
        let mut t_enter = 0.0_f32;
        let mut t_exit = max_distance;

        for axis in 0..2 {
            let (o, d, lo, hi) = if axis == 0 {
                (origin.x, direction.x, collider.min.x, collider.max.x)
            } else {
                (origin.y, direction.y, collider.min.y, collider.max.y)
            };

            if d.abs() < 1e-6 {
                // Ray parallel to this slab: must already be inside it
                if o < lo || o > hi {
                    return None;
                }
            } else {
                let inv = 1.0 / d;
                let mut t0 = (lo - o) * inv;
                let mut t1 = (hi - o) * inv;
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                t_enter = t_enter.max(t0);
                t_exit = t_exit.min(t1);
                if t_enter > t_exit {
                    return None;
                }
            }
        }

        Some(t_enter)
    }
}

impl PhysicsProbe for LevelGeometry {
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        if mask.is_empty() {
            return None;
        }

        let mut nearest: Option<RayHit> = None;
        for collider in &self.colliders {
            if !collider.layer.intersects(mask) {
                continue;
            }
            if let Some(distance) = Self::ray_vs_collider(origin, direction, max_distance, collider)
            {
                // Closest-hit wins; ties keep the first collider encountered
                if nearest.is_none_or(|hit| distance < hit.distance) {
                    nearest = Some(RayHit {
                        distance,
                        point: origin + direction * distance,
                        layer: collider.layer,
                    });
                }
            }
        }
        nearest
    }

    fn overlap_circle(&self, point: Vec2, radius: f32, mask: LayerMask) -> bool {
        if mask.is_empty() {
            return false;
        }
        self.colliders.iter().any(|collider| {
            collider.layer.intersects(mask)
                && collider.clamp_point(point).distance_squared(point) <= radius * radius
        })
    }
}

/// What a snapshot entity is, replacing the tag strings the world used to
/// be queried by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Collectible,
    Finish,
    Hazard,
}

/// One live entity as seen by the navigation core this tick
#[derive(Clone, Copy, Debug)]
pub struct SnapshotEntity {
    /// Stable identity across ticks (entity bits)
    pub id: u64,
    pub kind: EntityKind,
    pub position: Vec2,
}

/// Per-tick view of the pursuable entities in the level
#[derive(Clone, Debug, Default)]
pub struct WorldSnapshot {
    pub collectibles: Vec<SnapshotEntity>,
    pub finish: Option<SnapshotEntity>,
}

impl WorldSnapshot {
    /// Nearest live collectible to `position`; ties keep the first one seen
    pub fn nearest_collectible(&self, position: Vec2) -> Option<&SnapshotEntity> {
        let mut nearest: Option<(&SnapshotEntity, f32)> = None;
        for entity in &self.collectibles {
            let distance = entity.position.distance(position);
            if nearest.is_none_or(|(_, best)| distance < best) {
                nearest = Some((entity, distance));
            }
        }
        nearest.map(|(entity, _)| entity)
    }

    pub fn collectible_by_id(&self, id: u64) -> Option<&SnapshotEntity> {
        self.collectibles.iter().find(|entity| entity.id == id)
    }
}

/// Marker for collectible kiwi entities
#[derive(Component)]
pub struct Collectible;

/// Marker for the level finish flag
#[derive(Component)]
pub struct FinishFlag;

#[cfg(test)]
mod tests {
    use super::*;

    fn single_box_world() -> LevelGeometry {
        LevelGeometry::new(vec![Collider::from_center_size(
            Vec2::new(5.0, 0.0),
            Vec2::new(2.0, 2.0),
            LAYER_GROUND,
        )])
    }

    #[test]
    fn test_raycast_hits_box_at_entry_distance() {
        let world = single_box_world();
        let hit = world
            .raycast(Vec2::ZERO, Vec2::X, 10.0, LAYER_GROUND)
            .expect("should hit");
        assert!((hit.distance - 4.0).abs() < 1e-4);
        assert!((hit.point.x - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_raycast_respects_max_distance_and_mask() {
        let world = single_box_world();
        assert!(world.raycast(Vec2::ZERO, Vec2::X, 3.0, LAYER_GROUND).is_none());
        assert!(world.raycast(Vec2::ZERO, Vec2::X, 10.0, LAYER_HAZARD).is_none());
        // Empty mask degrades to "no hit"
        assert!(world.raycast(Vec2::ZERO, Vec2::X, 10.0, LayerMask::NONE).is_none());
    }

    #[test]
    fn test_raycast_origin_inside_reports_zero_distance() {
        let world = single_box_world();
        let hit = world
            .raycast(Vec2::new(5.0, 0.0), Vec2::X, 10.0, LAYER_GROUND)
            .expect("should hit");
        assert_eq!(hit.distance, 0.0);
    }

    #[test]
    fn test_raycast_picks_closest_of_two() {
        let world = LevelGeometry::new(vec![
            Collider::from_center_size(Vec2::new(8.0, 0.0), Vec2::splat(2.0), LAYER_GROUND),
            Collider::from_center_size(Vec2::new(4.0, 0.0), Vec2::splat(2.0), LAYER_GROUND),
        ]);
        let hit = world
            .raycast(Vec2::ZERO, Vec2::X, 20.0, LAYER_GROUND)
            .expect("should hit");
        assert!((hit.distance - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_diagonal_raycast_misses_offset_box() {
        let world = single_box_world();
        let dir = Vec2::new(0.0, 1.0);
        assert!(world.raycast(Vec2::ZERO, dir, 10.0, LAYER_GROUND).is_none());
    }

    #[test]
    fn test_overlap_circle() {
        let world = single_box_world();
        assert!(world.overlap_circle(Vec2::new(3.5, 0.0), 0.6, LAYER_GROUND));
        assert!(!world.overlap_circle(Vec2::new(3.5, 0.0), 0.4, LAYER_GROUND));
        assert!(!world.overlap_circle(Vec2::new(3.5, 0.0), 0.6, LayerMask::NONE));
    }

    #[test]
    fn test_nearest_collectible_prefers_closest() {
        let snapshot = WorldSnapshot {
            collectibles: vec![
                SnapshotEntity {
                    id: 1,
                    kind: EntityKind::Collectible,
                    position: Vec2::new(10.0, 0.0),
                },
                SnapshotEntity {
                    id: 2,
                    kind: EntityKind::Collectible,
                    position: Vec2::new(2.0, 0.0),
                },
            ],
            finish: None,
        };
        assert_eq!(snapshot.nearest_collectible(Vec2::ZERO).unwrap().id, 2);
    }
}
