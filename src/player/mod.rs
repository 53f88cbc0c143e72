//! Agent body - movement, gravity, and collision response.
//!
//! The controller only writes [`AgentInput`]; everything that turns that
//! input into motion lives here. Hazard blocks are not solid, contact
//! with them is handled by the session systems.

use bevy::prelude::*;

use crate::ai::AgentInput;
use crate::constants::*;
use crate::session::LevelSession;
use crate::tuning::NavTuning;
use crate::world::{LAYER_GROUND, LAYER_WALL, LevelGeometry, PhysicsProbe};

/// Marker for the navigating agent
#[derive(Component)]
pub struct Agent;

#[derive(Component, Default, Clone, Copy, Debug)]
pub struct Velocity(pub Vec2);

/// Whether the body stood on ground at the end of the last physics step
#[derive(Component, Clone, Copy, Debug)]
pub struct Grounded(pub bool);

impl Default for Grounded {
    fn default() -> Self {
        Grounded(true)
    }
}

/// Last non-zero horizontal direction
#[derive(Component, Clone, Copy, Debug)]
pub struct Facing(pub f32);

impl Default for Facing {
    fn default() -> Self {
        Facing(1.0)
    }
}

/// Turn the decision output into velocity. The jump flag is consumed
/// here so one request produces exactly one impulse.
pub fn apply_agent_input(
    session: Res<LevelSession>,
    tuning: Res<NavTuning>,
    mut query: Query<(&mut Velocity, &mut AgentInput, &Grounded, &mut Facing), With<Agent>>,
) {
    if !session.running {
        for (mut velocity, _, _, _) in &mut query {
            velocity.0.x = 0.0;
        }
        return;
    }

    for (mut velocity, mut input, grounded, mut facing) in &mut query {
        let control = if grounded.0 {
            1.0
        } else {
            tuning.air_control_multiplier
        };
        velocity.0.x = input.move_x * tuning.move_speed * control;

        if input.move_x != 0.0 {
            facing.0 = input.move_x.signum();
        }

        if input.jump_requested {
            if grounded.0 {
                velocity.0.y = tuning.jump_force;
            }
            input.jump_requested = false;
        }
    }
}

/// Gravity with a heavier fall, for the classic snappy platformer arc
pub fn apply_gravity(
    time: Res<Time>,
    tuning: Res<NavTuning>,
    mut query: Query<(&mut Velocity, &Grounded), With<Agent>>,
) {
    for (mut velocity, grounded) in &mut query {
        if grounded.0 && velocity.0.y <= 0.0 {
            velocity.0.y = 0.0;
            continue;
        }
        let multiplier = if velocity.0.y < 0.0 {
            tuning.fall_multiplier
        } else {
            1.0
        };
        velocity.0.y -= tuning.gravity * multiplier * time.delta_secs();
    }
}

/// Integrate and resolve against the solid level boxes, one axis at a time
pub fn integrate_and_collide(
    time: Res<Time>,
    geometry: Res<LevelGeometry>,
    mut query: Query<(&mut Transform, &mut Velocity, &mut Grounded), With<Agent>>,
) {
    let dt = time.delta_secs();
    for (mut transform, mut velocity, mut grounded) in &mut query {
        let (pos, vel, on_ground) =
            move_and_collide(transform.translation.truncate(), velocity.0, dt, &geometry);
        transform.translation.x = pos.x;
        transform.translation.y = pos.y;
        velocity.0 = vel;
        grounded.0 = on_ground;
    }
}

/// Axis-separated AABB sweep of the agent box through the level.
/// Returns the resolved position, the clipped velocity, and whether the
/// body ended the step standing on ground.
pub fn move_and_collide(
    pos: Vec2,
    vel: Vec2,
    dt: f32,
    geometry: &LevelGeometry,
) -> (Vec2, Vec2, bool) {
    let solid = LAYER_GROUND | LAYER_WALL;
    let half = AGENT_SIZE / 2.0;
    let mut pos = pos;
    let mut vel = vel;

    // Horizontal pass
    pos.x += vel.x * dt;
    for collider in geometry.colliders() {
        if !collider.layer.intersects(solid) {
            continue;
        }
        if overlaps(pos, half, collider.min, collider.max) {
            if vel.x > 0.0 {
                pos.x = collider.min.x - half.x;
            } else if vel.x < 0.0 {
                pos.x = collider.max.x + half.x;
            }
            vel.x = 0.0;
        }
    }

    // Vertical pass
    pos.y += vel.y * dt;
    let mut landed = false;
    for collider in geometry.colliders() {
        if !collider.layer.intersects(solid) {
            continue;
        }
        if overlaps(pos, half, collider.min, collider.max) {
            if vel.y <= 0.0 {
                pos.y = collider.max.y + half.y;
                landed = true;
            } else {
                pos.y = collider.min.y - half.y;
            }
            vel.y = 0.0;
        }
    }

    // Still grounded when resting on a surface without penetrating it
    let on_ground = landed
        || geometry.overlap_circle(
            Vec2::new(pos.x, pos.y - half.y),
            GROUND_CHECK_RADIUS,
            LAYER_GROUND,
        );

    (pos, vel, on_ground)
}

fn overlaps(center: Vec2, half: Vec2, min: Vec2, max: Vec2) -> bool {
    center.x - half.x < max.x
        && center.x + half.x > min.x
        && center.y - half.y < max.y
        && center.y + half.y > min.y
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Collider;

    fn floor_world() -> LevelGeometry {
        LevelGeometry::new(vec![Collider::from_center_size(
            Vec2::new(0.0, -0.5),
            Vec2::new(40.0, 1.0),
            LAYER_GROUND,
        )])
    }

    #[test]
    fn test_falling_body_lands_on_floor_top() {
        let world = floor_world();
        let start = Vec2::new(0.0, 3.0);
        let (pos, vel, grounded) =
            move_and_collide(start, Vec2::new(0.0, -20.0), 0.2, &world);

        assert!((pos.y - AGENT_SIZE.y / 2.0).abs() < 1e-4);
        assert_eq!(vel.y, 0.0);
        assert!(grounded);
    }

    #[test]
    fn test_walking_into_wall_stops_at_face() {
        let world = LevelGeometry::new(vec![
            Collider::from_center_size(Vec2::new(0.0, -0.5), Vec2::new(40.0, 1.0), LAYER_GROUND),
            Collider::from_center_size(Vec2::new(3.0, 1.5), Vec2::new(1.0, 3.0), LAYER_WALL),
        ]);
        let start = Vec2::new(2.0, AGENT_SIZE.y / 2.0);
        let (pos, vel, grounded) = move_and_collide(start, Vec2::new(2.0, 0.0), 0.5, &world);

        assert!((pos.x - (2.5 - AGENT_SIZE.x / 2.0)).abs() < 1e-4);
        assert_eq!(vel.x, 0.0);
        assert!(grounded);
    }

    #[test]
    fn test_hazard_blocks_are_not_solid() {
        let world = LevelGeometry::new(vec![
            Collider::from_center_size(Vec2::new(0.0, -0.5), Vec2::new(40.0, 1.0), LAYER_GROUND),
            Collider::from_center_size(
                Vec2::new(2.0, 0.1),
                Vec2::new(1.0, 0.2),
                crate::world::LAYER_HAZARD,
            ),
        ]);
        let start = Vec2::new(1.0, AGENT_SIZE.y / 2.0);
        let (pos, _, _) = move_and_collide(start, Vec2::new(5.0, 0.0), 0.5, &world);
        assert!((pos.x - 3.5).abs() < 1e-4);
    }

    #[test]
    fn test_jump_request_is_consumed_on_apply() {
        let mut app = App::new();
        app.insert_resource(LevelSession::default());
        app.insert_resource(NavTuning::default());
        app.add_systems(Update, apply_agent_input);

        let grounded = app
            .world_mut()
            .spawn((
                Agent,
                AgentInput {
                    move_x: 1.0,
                    jump_requested: true,
                },
                Velocity::default(),
                Grounded(true),
                Facing::default(),
            ))
            .id();
        let airborne = app
            .world_mut()
            .spawn((
                Agent,
                AgentInput {
                    move_x: 1.0,
                    jump_requested: true,
                },
                Velocity::default(),
                Grounded(false),
                Facing::default(),
            ))
            .id();

        app.update();

        // Grounded: impulse applied, flag consumed
        let input = app.world().get::<AgentInput>(grounded).unwrap();
        let velocity = app.world().get::<Velocity>(grounded).unwrap();
        assert!(!input.jump_requested);
        assert_eq!(velocity.0.y, NavTuning::default().jump_force);

        // Airborne: flag consumed without an impulse, air control applies
        let input = app.world().get::<AgentInput>(airborne).unwrap();
        let velocity = app.world().get::<Velocity>(airborne).unwrap();
        assert!(!input.jump_requested);
        assert_eq!(velocity.0.y, 0.0);
        assert!((velocity.0.x - MOVE_SPEED * AIR_CONTROL_MULTIPLIER).abs() < 1e-4);
    }

    #[test]
    fn test_free_fall_off_ledge_is_not_grounded() {
        let world = floor_world();
        let start = Vec2::new(0.0, 8.0);
        let (_, vel, grounded) = move_and_collide(start, Vec2::new(0.0, -1.0), 0.1, &world);
        assert!(!grounded);
        assert!(vel.y < 0.0);
    }
}
