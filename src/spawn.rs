//! Level entity spawning

use bevy::prelude::*;
use rand::Rng;

use crate::ai::{AgentInput, EnvironmentSensor, NavController, NavProfileDatabase};
use crate::levels::LevelData;
use crate::player::{Agent, Facing, Grounded, Velocity};
use crate::tuning::NavTuning;
use crate::world::{Collectible, FinishFlag};

/// Which navigation profile newly spawned agents get
#[derive(Resource, Default, Debug, Clone)]
pub struct SelectedProfile(pub String);

fn at(pos: [f32; 2]) -> Transform {
    Transform::from_translation(Vec2::from(pos).extend(0.0))
}

/// Spawn the agent, the collectibles, and the finish flag.
/// The finish position is drawn from the level's candidate list, so
/// consecutive runs do not all end at the same spot.
pub fn spawn_level(
    mut commands: Commands,
    level: Res<LevelData>,
    tuning: Res<NavTuning>,
    profiles: Res<NavProfileDatabase>,
    selected: Res<SelectedProfile>,
) {
    let profile = profiles.by_name(&selected.0).clone();
    info!(
        "Spawning agent with profile '{}' at {:?}",
        profile.name, level.agent_spawn
    );

    commands.spawn((
        Agent,
        AgentInput::default(),
        Velocity::default(),
        Grounded::default(),
        Facing::default(),
        NavController::new(EnvironmentSensor::new(tuning.sensor_config()), profile),
        at(level.agent_spawn),
    ));

    for &pos in &level.collectibles {
        commands.spawn((Collectible, at(pos)));
    }

    if !level.finish_spawns.is_empty() {
        let mut rng = rand::thread_rng();
        let pick = rng.gen_range(0..level.finish_spawns.len());
        let pos = level.finish_spawns[pick];
        info!("Finish flag placed at {:?}", pos);
        commands.spawn((FinishFlag, at(pos)));
    } else {
        warn!("Level '{}' has no finish spawn points", level.name);
    }
}
