//! Locomotion decision controller.
//!
//! One decision pass per tick while grounded: keep or replace the
//! objective, follow the path or steer straight at the target, then let
//! obstacle handling veto the steering. While airborne the controller
//! freezes the direction chosen at lift-off. A "platform lock" commits
//! the agent to mounting one ledge for a few seconds so it stops
//! oscillating between a wall and the ledge above it.

use bevy::prelude::*;

use crate::ai::profiles::NavProfile;
use crate::ai::sensor::EnvironmentSensor;
use crate::ai::targeting::{Objective, TargetSelector};
use crate::ai::{AgentInput, NavGraph, NavPath};
use crate::constants::*;
use crate::world::{PhysicsProbe, WorldSnapshot};

/// Commitment to mount one specific ledge
#[derive(Clone, Copy, Debug)]
struct PlatformLock {
    /// Which way the ledge lies
    direction: f32,
    /// When the lock was engaged, for expiry
    engaged_at: f32,
    /// Cleared once the mounting jump has fired
    needs_jump: bool,
}

/// Per-agent navigation brain. Holds every piece of cross-tick state;
/// the world only comes in through [`PhysicsProbe`] and [`WorldSnapshot`],
/// so the whole decision pass is testable without an ECS world.
#[derive(Component)]
pub struct NavController {
    sensor: EnvironmentSensor,
    profile: NavProfile,
    selector: TargetSelector,
    path: Option<NavPath>,
    last_path_update: f32,
    lock: Option<PlatformLock>,
    /// Direction held while airborne
    move_dir: f32,
    was_grounded: bool,
    last_jump_time: f32,
    stuck_anchor: Option<Vec2>,
    last_stuck_check: f32,
    stuck_events: u32,
}

impl NavController {
    pub fn new(sensor: EnvironmentSensor, profile: NavProfile) -> Self {
        Self {
            sensor,
            profile,
            selector: TargetSelector::default(),
            path: None,
            last_path_update: TIMESTAMP_NEVER,
            lock: None,
            move_dir: 1.0,
            was_grounded: true,
            last_jump_time: TIMESTAMP_NEVER,
            stuck_anchor: None,
            last_stuck_check: 0.0,
            stuck_events: 0,
        }
    }

    /// Forget everything tied to the old position after a respawn
    pub fn reset(&mut self) {
        self.selector.clear();
        self.path = None;
        self.last_path_update = TIMESTAMP_NEVER;
        self.lock = None;
        self.move_dir = 1.0;
        self.was_grounded = true;
        self.stuck_anchor = None;
    }

    pub fn objective(&self) -> Option<Objective> {
        self.selector.current()
    }

    pub fn current_path(&self) -> Option<&NavPath> {
        self.path.as_ref()
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    pub fn stuck_events(&self) -> u32 {
        self.stuck_events
    }

    pub fn profile_name(&self) -> &str {
        &self.profile.name
    }

    /// One decision pass. `now` is level-session time in seconds.
    pub fn tick(
        &mut self,
        world: &dyn PhysicsProbe,
        graph: &NavGraph,
        snapshot: &WorldSnapshot,
        pos: Vec2,
        now: f32,
    ) -> AgentInput {
        let grounded = self.sensor.is_grounded(world, pos);

        if !grounded {
            self.was_grounded = false;
            // Mid-air steering would undo the jump arc the decision was made for
            return AgentInput {
                move_x: self.move_dir,
                jump_requested: false,
            };
        }
        if !self.was_grounded {
            // Just landed; whatever ledge we were committed to, we're on it or past it
            self.was_grounded = true;
            self.lock = None;
        }

        self.check_stuck(snapshot, pos, now);

        if self.selector.has_timed_out(now, self.profile.target_switch_time) {
            debug!("Objective held too long, rotating");
            self.acquire_next(snapshot, pos, now);
        }

        let Some(target) = self.current_target(snapshot, pos, now) else {
            self.move_dir = 0.0;
            return AgentInput::default();
        };

        let mut jump = false;
        let move_dir = match self.lock.take() {
            Some(lock) if now - lock.engaged_at <= self.profile.platform_lock_duration => {
                self.locked_approach(world, pos, lock, now, &mut jump)
            }
            _ => self.free_navigate(world, graph, target, pos, now, &mut jump),
        };

        self.move_dir = move_dir;
        AgentInput {
            move_x: move_dir,
            jump_requested: jump,
        }
    }

    /// Position of the live objective, acquiring a fresh one if the old
    /// one disappeared (collected, despawned)
    fn current_target(&mut self, snapshot: &WorldSnapshot, pos: Vec2, now: f32) -> Option<Vec2> {
        if let Some(target) = self.selector.position_of(snapshot) {
            return Some(target);
        }
        self.acquire_next(snapshot, pos, now);
        self.selector.position_of(snapshot)
    }

    fn acquire_next(&mut self, snapshot: &WorldSnapshot, pos: Vec2, now: f32) {
        self.selector.select_next(snapshot, pos, now);
        self.path = None;
        self.last_path_update = TIMESTAMP_NEVER;
    }

    /// Displacement check on a fixed cadence. An agent that barely moved
    /// since the last check abandons its commitments and re-targets.
    fn check_stuck(&mut self, snapshot: &WorldSnapshot, pos: Vec2, now: f32) {
        let Some(anchor) = self.stuck_anchor else {
            self.stuck_anchor = Some(pos);
            self.last_stuck_check = now;
            return;
        };

        if now - self.last_stuck_check < self.profile.stuck_check_time {
            return;
        }

        if self.selector.current().is_some() && pos.distance(anchor) < self.profile.stuck_distance {
            warn!("Agent stuck near {:?}, re-targeting", pos);
            self.stuck_events += 1;
            self.lock = None;
            self.acquire_next(snapshot, pos, now);
        }

        self.stuck_anchor = Some(pos);
        self.last_stuck_check = now;
    }

    /// Run at the locked ledge and fire the jump once there is enough
    /// run-up; back straight off when the wall is too close for the arc.
    fn locked_approach(
        &mut self,
        world: &dyn PhysicsProbe,
        pos: Vec2,
        mut lock: PlatformLock,
        now: f32,
        jump: &mut bool,
    ) -> f32 {
        let dir = if !lock.needs_jump {
            // Jump already fired for this lock; ride it out
            lock.direction
        } else {
            let wall_dist = self.sensor.wall_distance(world, pos, lock.direction);
            if wall_dist < self.profile.min_wall_clearance {
                -lock.direction
            } else {
                if now - self.last_jump_time > self.profile.jump_cooldown {
                    *jump = true;
                    self.last_jump_time = now;
                    lock.needs_jump = false;
                }
                lock.direction
            }
        };
        self.lock = Some(lock);
        dir
    }

    fn engage_lock(&mut self, direction: f32, now: f32) {
        debug!("Platform lock engaged, direction {}", direction);
        self.lock = Some(PlatformLock {
            direction,
            engaged_at: now,
            needs_jump: true,
        });
    }

    fn free_navigate(
        &mut self,
        world: &dyn PhysicsProbe,
        graph: &NavGraph,
        target: Vec2,
        pos: Vec2,
        now: f32,
        jump: &mut bool,
    ) -> f32 {
        let mut suppress_gap_jump = false;

        let steer = if self.profile.use_pathfinding && !graph.is_empty() {
            self.refresh_path(graph, pos, target, now);
            match self.next_waypoint(pos) {
                Some(waypoint) => {
                    let delta = waypoint - pos;
                    if delta.y > self.profile.vertical_jump_threshold
                        && delta.x.abs() < PLATFORM_CHECK_FORWARD_DIST
                    {
                        // Waypoint almost straight overhead
                        return self.try_vertical_jump(world, pos, now, jump);
                    }
                    step_toward(delta.x, WAYPOINT_DEADBAND)
                }
                None => self.navigate_direct(target, pos, now, jump, &mut suppress_gap_jump),
            }
        } else {
            self.navigate_direct(target, pos, now, jump, &mut suppress_gap_jump)
        };

        if *jump || steer == 0.0 {
            return steer;
        }
        self.handle_obstacles(world, pos, steer, now, suppress_gap_jump, jump)
    }

    /// Recompute the path on the profile's cadence, or immediately after
    /// a re-target or when the old path ran out
    fn refresh_path(&mut self, graph: &NavGraph, pos: Vec2, target: Vec2, now: f32) {
        let path_spent = self.path.as_ref().is_none_or(|p| p.is_finished());
        if !path_spent && now - self.last_path_update < self.profile.path_update_interval {
            return;
        }
        self.path = graph.find_path(pos, target);
        self.last_path_update = now;
    }

    /// Advance past any waypoints already within reach and return the one
    /// to track, if the path has any left
    fn next_waypoint(&mut self, pos: Vec2) -> Option<Vec2> {
        let path = self.path.as_mut()?;
        while let Some(waypoint) = path.current() {
            if pos.distance(waypoint) > self.profile.waypoint_reached_distance {
                return Some(waypoint);
            }
            path.advance();
        }
        None
    }

    /// Straight-line steering with the profile's special moves
    fn navigate_direct(
        &mut self,
        target: Vec2,
        pos: Vec2,
        now: f32,
        jump: &mut bool,
        suppress_gap_jump: &mut bool,
    ) -> f32 {
        let delta = target - pos;

        if self.profile.enable_jump_up_to_target_above
            && delta.y > self.profile.jump_up_vertical_min
            && delta.x.abs() < self.profile.jump_up_threshold
        {
            // Target directly overhead: stop and jump at it
            if now - self.last_jump_time > self.profile.jump_cooldown {
                *jump = true;
                self.last_jump_time = now;
            }
            return 0.0;
        }

        if self.profile.enable_drop_down_at_finish
            && self.selector.is_finish()
            && delta.y < -self.profile.drop_down_threshold
        {
            // Finish is well below: walking off the ledge is the route
            *suppress_gap_jump = true;
        }

        step_toward(delta.x, self.profile.direction_deadband)
    }

    /// Mount a nearby ledge, or jump straight up as the fallback
    fn try_vertical_jump(
        &mut self,
        world: &dyn PhysicsProbe,
        pos: Vec2,
        now: f32,
        jump: &mut bool,
    ) -> f32 {
        for dir in [self.move_dir, -self.move_dir] {
            if dir != 0.0
                && self.sensor.has_platform_above(world, pos, dir)
                && !self.sensor.has_hazard_ahead(world, pos, dir)
            {
                self.engage_lock(dir, now);
                return dir;
            }
        }
        // No ledge to mount; shortened cooldown keeps the hop responsive
        if now - self.last_jump_time > self.profile.jump_cooldown * 0.5 {
            *jump = true;
            self.last_jump_time = now;
        }
        0.0
    }

    /// Veto pass over the chosen steering: hazards first, then walls,
    /// then gaps. May redirect, engage a platform lock, or request a jump.
    fn handle_obstacles(
        &mut self,
        world: &dyn PhysicsProbe,
        pos: Vec2,
        dir: f32,
        now: f32,
        suppress_gap_jump: bool,
        jump: &mut bool,
    ) -> f32 {
        let cooldown_ready = now - self.last_jump_time > self.profile.jump_cooldown;

        if self.sensor.has_hazard_ahead(world, pos, dir) {
            if self.sensor.has_platform_above(world, pos, dir) {
                self.engage_lock(dir, now);
                return dir;
            }
            if self.sensor.has_platform_above(world, pos, -dir)
                && !self.sensor.has_hazard_ahead(world, pos, -dir)
            {
                self.engage_lock(-dir, now);
                return -dir;
            }
            // No route around: jump the hazard
            if cooldown_ready {
                *jump = true;
                self.last_jump_time = now;
            }
            return dir;
        }

        if self.sensor.has_wall_ahead(world, pos, dir) {
            if self.sensor.has_platform_above(world, pos, dir) {
                self.engage_lock(dir, now);
                return dir;
            }
            if self.sensor.has_platform_above(world, pos, -dir) {
                self.engage_lock(-dir, now);
            }
            // Dead end at ground level
            return -dir;
        }

        if !self.sensor.has_ground_ahead(world, pos, dir) && !suppress_gap_jump && cooldown_ready {
            *jump = true;
            self.last_jump_time = now;
        }
        dir
    }
}

fn step_toward(dx: f32, deadband: f32) -> f32 {
    if dx > deadband {
        1.0
    } else if dx < -deadband {
        -1.0
    } else {
        0.0
    }
}
