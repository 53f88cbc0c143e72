//! Level session - run timer, score, and win/lose bookkeeping.
//!
//! One session spans one attempt at a level: the clock starts at spawn,
//! stops when the agent reaches the finish with every collectible
//! banked, and restarts in place after a hazard death.

use bevy::app::AppExit;
use bevy::prelude::*;

use crate::ai::NavController;
use crate::levels::LevelData;
use crate::player::{Agent, Velocity};
use crate::tuning::NavTuning;
use crate::world::{Collectible, FinishFlag, LAYER_HAZARD, LevelGeometry, PhysicsProbe};

/// Clock and score for the current attempt
#[derive(Resource, Debug, Clone)]
pub struct LevelSession {
    /// Seconds since the attempt started
    pub elapsed: f32,
    /// False once the level is won or the session is otherwise over
    pub running: bool,
    pub score: u32,
    /// Attempts used so far, counting the first
    pub attempts: u32,
    /// Abort the run after this many seconds; zero means no limit
    pub time_limit: f32,
}

impl Default for LevelSession {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            running: true,
            score: 0,
            attempts: 1,
            time_limit: 0.0,
        }
    }
}

impl LevelSession {
    /// Fresh attempt after a hazard death. The clock and score restart;
    /// the time limit and attempt count carry over.
    pub fn restart(&mut self) {
        self.elapsed = 0.0;
        self.score = 0;
        self.running = true;
        self.attempts += 1;
    }

    pub fn out_of_time(&self) -> bool {
        self.time_limit > 0.0 && self.elapsed >= self.time_limit
    }
}

/// Advance the session clock while the attempt is live
pub fn tick_session(time: Res<Time>, mut session: ResMut<LevelSession>) {
    if session.running {
        session.elapsed += time.delta_secs();
    }
}

/// Despawn collectibles the agent touches and bank the score
pub fn collect_targets(
    mut commands: Commands,
    tuning: Res<NavTuning>,
    mut session: ResMut<LevelSession>,
    agents: Query<&Transform, With<Agent>>,
    collectibles: Query<(Entity, &Transform), With<Collectible>>,
) {
    if !session.running {
        return;
    }
    for agent in &agents {
        let agent_pos = agent.translation.truncate();
        for (entity, transform) in &collectibles {
            if agent_pos.distance(transform.translation.truncate()) < tuning.collection_radius {
                commands.entity(entity).despawn();
                session.score += 1;
                info!("Collected ({} total) at t={:.2}s", session.score, session.elapsed);
            }
        }
    }
}

/// Stop the clock once the agent stands at the finish with nothing left
/// to collect
pub fn check_finish(
    tuning: Res<NavTuning>,
    mut session: ResMut<LevelSession>,
    agents: Query<&Transform, With<Agent>>,
    finish: Query<&Transform, With<FinishFlag>>,
    collectibles: Query<(), With<Collectible>>,
) {
    if !session.running || !collectibles.is_empty() {
        return;
    }
    let Ok(flag) = finish.single() else {
        return;
    };
    for agent in &agents {
        let distance = agent
            .translation
            .truncate()
            .distance(flag.translation.truncate());
        if distance < tuning.collection_radius {
            session.running = false;
            info!(
                "Level complete: {} collected in {:.2}s over {} attempt(s)",
                session.score, session.elapsed, session.attempts
            );
        }
    }
}

/// Hazard contact: put the agent back at spawn, respawn the
/// collectibles, and restart the clock
pub fn check_hazard(
    mut commands: Commands,
    geometry: Res<LevelGeometry>,
    level: Res<LevelData>,
    mut session: ResMut<LevelSession>,
    mut agents: Query<(&mut Transform, &mut Velocity, &mut NavController), With<Agent>>,
    collectibles: Query<Entity, With<Collectible>>,
) {
    if !session.running {
        return;
    }
    for (mut transform, mut velocity, mut controller) in &mut agents {
        let pos = transform.translation.truncate();
        if !geometry.overlap_circle(pos, crate::constants::AGENT_SIZE.x / 2.0, LAYER_HAZARD) {
            continue;
        }

        warn!("Agent hit a hazard at t={:.2}s, restarting attempt", session.elapsed);
        transform.translation.x = level.agent_spawn[0];
        transform.translation.y = level.agent_spawn[1];
        velocity.0 = Vec2::ZERO;
        controller.reset();

        for entity in &collectibles {
            commands.entity(entity).despawn();
        }
        for &pos in &level.collectibles {
            commands.spawn((
                Collectible,
                Transform::from_translation(Vec2::from(pos).extend(0.0)),
            ));
        }

        session.restart();
    }
}

/// Shut the app down once the session ends or runs out of time
pub fn exit_when_done(session: Res<LevelSession>, mut exit: MessageWriter<AppExit>) {
    if !session.running {
        exit.write(AppExit::Success);
        return;
    }
    if session.out_of_time() {
        warn!(
            "Time limit of {:.0}s reached with {} collected",
            session.time_limit, session.score
        );
        exit.write(AppExit::Success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restart_keeps_limit_and_counts_attempts() {
        let mut session = LevelSession {
            elapsed: 12.0,
            running: true,
            score: 2,
            attempts: 1,
            time_limit: 60.0,
        };
        session.restart();
        assert_eq!(session.elapsed, 0.0);
        assert_eq!(session.score, 0);
        assert_eq!(session.attempts, 2);
        assert_eq!(session.time_limit, 60.0);
        assert!(session.running);
    }

    #[test]
    fn test_out_of_time_ignores_zero_limit() {
        let mut session = LevelSession::default();
        session.elapsed = 1e6;
        assert!(!session.out_of_time());

        session.time_limit = 30.0;
        assert!(session.out_of_time());
        session.elapsed = 10.0;
        assert!(!session.out_of_time());
    }
}
