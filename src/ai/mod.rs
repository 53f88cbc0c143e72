//! AI module - navigation decision making and input generation

mod controller;
mod pathfinding;
mod profiles;
mod sensor;
mod targeting;

pub use controller::*;
pub use pathfinding::*;
pub use profiles::*;
pub use sensor::*;
pub use targeting::*;

use bevy::prelude::*;

use crate::player::Agent;
use crate::session::LevelSession;
use crate::world::{Collectible, EntityKind, FinishFlag, LevelGeometry, SnapshotEntity, WorldSnapshot};

/// Per-agent input buffer written by the controller and consumed by the
/// movement systems. Mirrors what a gamepad would provide: an axis and a
/// jump press.
#[derive(Component, Default, Clone, Debug)]
pub struct AgentInput {
    pub move_x: f32,
    /// Consumed by the movement system on the tick it fires
    pub jump_requested: bool,
}

/// Build this tick's world snapshot and run every agent's decision pass.
/// Runs in Update before the movement systems.
pub fn agent_decision_update(
    session: Res<LevelSession>,
    geometry: Res<LevelGeometry>,
    graph: Res<NavGraph>,
    collectibles: Query<(Entity, &Transform), With<Collectible>>,
    finish: Query<(Entity, &Transform), With<FinishFlag>>,
    mut agents: Query<(&Transform, &mut NavController, &mut AgentInput), With<Agent>>,
) {
    if !session.running {
        return;
    }

    let snapshot = WorldSnapshot {
        collectibles: collectibles
            .iter()
            .map(|(entity, transform)| SnapshotEntity {
                id: entity.to_bits(),
                kind: EntityKind::Collectible,
                position: transform.translation.truncate(),
            })
            .collect(),
        finish: finish.iter().next().map(|(entity, transform)| SnapshotEntity {
            id: entity.to_bits(),
            kind: EntityKind::Finish,
            position: transform.translation.truncate(),
        }),
    };

    for (transform, mut controller, mut input) in &mut agents {
        let pos = transform.translation.truncate();
        *input = controller.tick(&*geometry, &graph, &snapshot, pos, session.elapsed);
    }
}
