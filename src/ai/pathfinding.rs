//! Waypoint graph and A* pathfinding.
//!
//! Level designers drop a sparse set of waypoints over the walkable
//! surfaces; at level load every ordered pair is tested for jump
//! reachability and the result is frozen into an adjacency list. Path
//! queries snap both endpoints to their nearest waypoint and run A* with
//! a binary-heap open set keyed by f-score.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy::prelude::*;

use crate::world::{LayerMask, PhysicsProbe};

/// Node in the A* priority queue
#[derive(Clone, Copy)]
struct SearchNode {
    /// Index into the waypoint list
    waypoint: usize,
    /// Cost from start to this node
    g_cost: f32,
    /// Estimated total cost (g + straight-line heuristic)
    f_cost: f32,
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.waypoint == other.waypoint
    }
}

impl Eq for SearchNode {}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (lower f_cost = higher priority)
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
    }
}

/// A computed route through the waypoint graph.
///
/// Consumed front to back through a monotone cursor; a finished path is
/// never rewound or replayed.
#[derive(Clone, Debug)]
pub struct NavPath {
    points: Vec<Vec2>,
    cursor: usize,
    total_cost: f32,
}

impl NavPath {
    /// Waypoint currently being tracked, if any remain
    pub fn current(&self) -> Option<Vec2> {
        self.points.get(self.cursor).copied()
    }

    /// Move the cursor past the current waypoint
    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.points.len()
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Summed edge cost of the full route
    pub fn total_cost(&self) -> f32 {
        self.total_cost
    }
}

/// Immutable reachability graph over the level's waypoints.
///
/// Built once per level load; agents only read it afterwards.
#[derive(Resource, Default)]
pub struct NavGraph {
    waypoints: Vec<Vec2>,
    neighbors: Vec<Vec<usize>>,
}

impl NavGraph {
    /// Test every ordered pair of waypoints for reachability. O(n²), run
    /// once per level. Both directions are probed independently so an
    /// asymmetric obstacle query would produce an asymmetric graph.
    pub fn build(
        waypoints: Vec<Vec2>,
        max_jump_distance: f32,
        max_jump_height: f32,
        world: &dyn PhysicsProbe,
        obstacle_mask: LayerMask,
    ) -> Self {
        let mut neighbors = vec![Vec::new(); waypoints.len()];

        for (i, &from) in waypoints.iter().enumerate() {
            for (j, &to) in waypoints.iter().enumerate() {
                if i == j {
                    continue;
                }
                if is_reachable(from, to, max_jump_distance, max_jump_height, world, obstacle_mask)
                {
                    neighbors[i].push(j);
                }
            }
        }

        let edge_count: usize = neighbors.iter().map(|n| n.len()).sum();
        info!(
            "Navigation graph built: {} waypoints, {} edges",
            waypoints.len(),
            edge_count
        );

        Self { waypoints, neighbors }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn waypoint(&self, index: usize) -> Option<Vec2> {
        self.waypoints.get(index).copied()
    }

    pub fn neighbors(&self, index: usize) -> &[usize] {
        self.neighbors.get(index).map_or(&[], |n| n.as_slice())
    }

    /// Nearest waypoint by Euclidean distance; first one wins exact ties
    pub fn nearest_waypoint(&self, position: Vec2) -> Option<usize> {
        let mut nearest: Option<(usize, f32)> = None;
        for (i, &waypoint) in self.waypoints.iter().enumerate() {
            let distance = waypoint.distance_squared(position);
            if nearest.is_none_or(|(_, best)| distance < best) {
                nearest = Some((i, distance));
            }
        }
        nearest.map(|(i, _)| i)
    }

    /// Shortest route between two world positions.
    ///
    /// Returns `None` when no waypoints exist or the endpoints are not
    /// connected; callers fall back to direct sensor-driven navigation in
    /// that case, so absence of a path is not an error.
    pub fn find_path(&self, start: Vec2, target: Vec2) -> Option<NavPath> {
        let start_wp = self.nearest_waypoint(start)?;
        let goal_wp = self.nearest_waypoint(target)?;

        if start_wp == goal_wp {
            return Some(NavPath {
                points: vec![self.waypoints[goal_wp]],
                cursor: 0,
                total_cost: 0.0,
            });
        }

        self.astar(start_wp, goal_wp)
    }

    fn astar(&self, start: usize, goal: usize) -> Option<NavPath> {
        let goal_pos = self.waypoints[goal];

        let mut open_set = BinaryHeap::new();
        let mut came_from: Vec<Option<usize>> = vec![None; self.waypoints.len()];
        let mut g_scores = vec![f32::INFINITY; self.waypoints.len()];

        g_scores[start] = 0.0;
        open_set.push(SearchNode {
            waypoint: start,
            g_cost: 0.0,
            f_cost: self.waypoints[start].distance(goal_pos),
        });

        while let Some(current) = open_set.pop() {
            if current.waypoint == goal {
                return Some(self.reconstruct(&came_from, goal, current.g_cost));
            }

            // Stale heap entry: a better route to this waypoint was found
            if current.g_cost > g_scores[current.waypoint] + 1e-4 {
                continue;
            }

            for &neighbor in &self.neighbors[current.waypoint] {
                let edge = self.waypoints[current.waypoint].distance(self.waypoints[neighbor]);
                let tentative_g = current.g_cost + edge;

                if tentative_g < g_scores[neighbor] {
                    g_scores[neighbor] = tentative_g;
                    came_from[neighbor] = Some(current.waypoint);
                    open_set.push(SearchNode {
                        waypoint: neighbor,
                        g_cost: tentative_g,
                        f_cost: tentative_g + self.waypoints[neighbor].distance(goal_pos),
                    });
                }
            }
        }

        None
    }

    fn reconstruct(&self, came_from: &[Option<usize>], goal: usize, total_cost: f32) -> NavPath {
        let mut indices = vec![goal];
        let mut current = goal;
        while let Some(parent) = came_from[current] {
            indices.push(parent);
            current = parent;
        }
        indices.reverse();

        NavPath {
            points: indices.iter().map(|&i| self.waypoints[i]).collect(),
            cursor: 0,
            total_cost,
        }
    }
}

/// Directed reachability predicate: close enough to jump, not too far to
/// climb, and nothing solid across the straight line between the two.
fn is_reachable(
    from: Vec2,
    to: Vec2,
    max_jump_distance: f32,
    max_jump_height: f32,
    world: &dyn PhysicsProbe,
    obstacle_mask: LayerMask,
) -> bool {
    let distance = from.distance(to);
    if distance > max_jump_distance {
        return false;
    }

    if to.y - from.y > max_jump_height {
        return false;
    }

    if distance < 1e-6 {
        return true;
    }

    let direction = (to - from) / distance;
    world.raycast(from, direction, distance, obstacle_mask).is_none()
}
