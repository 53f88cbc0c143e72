//! Objective selection - which entity the agent is currently chasing.
//!
//! Collectibles first, nearest one each time; the finish flag only once
//! nothing is left to pick up. The selector also tracks how long the
//! current objective has been held so the controller can rotate away
//! from one it cannot reach.

use bevy::prelude::*;

use crate::world::WorldSnapshot;

/// What the agent is currently pursuing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Objective {
    /// A specific collectible, by snapshot id
    Collectible(u64),
    /// The finish flag, by snapshot id
    Finish(u64),
}

/// Current objective plus the time it was acquired
#[derive(Clone, Debug, Default)]
pub struct TargetSelector {
    current: Option<Objective>,
    acquired_at: f32,
}

impl TargetSelector {
    pub fn current(&self) -> Option<Objective> {
        self.current
    }

    /// Pick the next objective: nearest collectible if any remain,
    /// otherwise the finish flag. Returns the choice, which may be `None`
    /// when the level holds nothing to pursue.
    pub fn select_next(
        &mut self,
        snapshot: &WorldSnapshot,
        position: Vec2,
        now: f32,
    ) -> Option<Objective> {
        let next = snapshot
            .nearest_collectible(position)
            .map(|entity| Objective::Collectible(entity.id))
            .or_else(|| snapshot.finish.map(|entity| Objective::Finish(entity.id)));

        if next != self.current {
            debug!("Objective switch: {:?} -> {:?}", self.current, next);
        }
        self.current = next;
        self.acquired_at = now;
        next
    }

    /// World position of the current objective, or `None` when it has
    /// disappeared from the snapshot (collected, despawned)
    pub fn position_of(&self, snapshot: &WorldSnapshot) -> Option<Vec2> {
        match self.current? {
            Objective::Collectible(id) => {
                snapshot.collectible_by_id(id).map(|entity| entity.position)
            }
            Objective::Finish(id) => snapshot
                .finish
                .filter(|entity| entity.id == id)
                .map(|entity| entity.position),
        }
    }

    pub fn is_finish(&self) -> bool {
        matches!(self.current, Some(Objective::Finish(_)))
    }

    /// Whether the agent stands within `radius` of the current objective
    pub fn is_reached(&self, snapshot: &WorldSnapshot, position: Vec2, radius: f32) -> bool {
        self.position_of(snapshot)
            .is_some_and(|target| target.distance(position) < radius)
    }

    /// True once the objective has been held longer than `limit` seconds
    pub fn has_timed_out(&self, now: f32, limit: f32) -> bool {
        self.current.is_some() && now - self.acquired_at > limit
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{EntityKind, SnapshotEntity};

    fn collectible(id: u64, x: f32) -> SnapshotEntity {
        SnapshotEntity {
            id,
            kind: EntityKind::Collectible,
            position: Vec2::new(x, 0.0),
        }
    }

    fn snapshot_with(collectibles: Vec<SnapshotEntity>, finish: Option<f32>) -> WorldSnapshot {
        WorldSnapshot {
            collectibles,
            finish: finish.map(|x| SnapshotEntity {
                id: 100,
                kind: EntityKind::Finish,
                position: Vec2::new(x, 0.0),
            }),
        }
    }

    #[test]
    fn test_selects_nearest_collectible_first() {
        let snapshot = snapshot_with(vec![collectible(1, 8.0), collectible(2, 3.0)], Some(20.0));
        let mut selector = TargetSelector::default();

        let picked = selector.select_next(&snapshot, Vec2::ZERO, 0.0);
        assert_eq!(picked, Some(Objective::Collectible(2)));
        assert!(!selector.is_finish());
        assert_eq!(selector.position_of(&snapshot), Some(Vec2::new(3.0, 0.0)));
    }

    #[test]
    fn test_falls_back_to_finish_when_collectibles_gone() {
        let snapshot = snapshot_with(vec![], Some(20.0));
        let mut selector = TargetSelector::default();

        let picked = selector.select_next(&snapshot, Vec2::ZERO, 0.0);
        assert_eq!(picked, Some(Objective::Finish(100)));
        assert!(selector.is_finish());
    }

    #[test]
    fn test_empty_level_selects_nothing() {
        let snapshot = snapshot_with(vec![], None);
        let mut selector = TargetSelector::default();
        assert_eq!(selector.select_next(&snapshot, Vec2::ZERO, 0.0), None);
        assert_eq!(selector.position_of(&snapshot), None);
    }

    #[test]
    fn test_is_reached_uses_radius() {
        let snapshot = snapshot_with(vec![collectible(1, 5.0)], None);
        let mut selector = TargetSelector::default();
        selector.select_next(&snapshot, Vec2::ZERO, 0.0);

        assert!(selector.is_reached(&snapshot, Vec2::new(4.2, 0.0), 1.0));
        assert!(!selector.is_reached(&snapshot, Vec2::new(3.0, 0.0), 1.0));
    }

    #[test]
    fn test_collected_objective_position_is_none() {
        let snapshot = snapshot_with(vec![collectible(1, 5.0)], None);
        let mut selector = TargetSelector::default();
        selector.select_next(&snapshot, Vec2::ZERO, 0.0);

        // The collectible disappears from the next tick's snapshot
        let after = snapshot_with(vec![], None);
        assert_eq!(selector.position_of(&after), None);
    }

    #[test]
    fn test_timeout_counts_from_acquisition() {
        let snapshot = snapshot_with(vec![collectible(1, 5.0)], None);
        let mut selector = TargetSelector::default();
        selector.select_next(&snapshot, Vec2::ZERO, 10.0);

        assert!(!selector.has_timed_out(15.0, 6.0));
        assert!(selector.has_timed_out(16.5, 6.0));

        // Re-selecting resets the clock
        selector.select_next(&snapshot, Vec2::ZERO, 16.5);
        assert!(!selector.has_timed_out(17.0, 6.0));
    }

    #[test]
    fn test_no_objective_never_times_out() {
        let selector = TargetSelector::default();
        assert!(!selector.has_timed_out(100.0, 6.0));
    }
}
