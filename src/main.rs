//! Kiwirun binary - headless navigation run
//!
//! Loads a level, builds the waypoint graph, and lets the agent play the
//! level to completion (or until the time limit).
//!
//! Usage:
//!   cargo run
//!   cargo run -- --level assets/levels/meadow.toml --profile rulebased

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;

use kiwirun::ai::{NavGraph, NavProfileDatabase, agent_decision_update};
use kiwirun::constants::*;
use kiwirun::levels::LevelData;
use kiwirun::player::{apply_agent_input, apply_gravity, integrate_and_collide};
use kiwirun::session::{
    LevelSession, check_finish, check_hazard, collect_targets, exit_when_done, tick_session,
};
use kiwirun::spawn::{SelectedProfile, spawn_level};
use kiwirun::tuning::NavTuning;
use kiwirun::world::{LAYER_GROUND, LAYER_WALL};

/// Run settings parsed from the command line
struct RunSettings {
    level_path: String,
    profile: String,
    time_limit: f32,
    fps: f32,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            level_path: DEFAULT_LEVEL_FILE.to_string(),
            profile: "pathfinder".to_string(),
            time_limit: 120.0,
            fps: 60.0,
        }
    }
}

impl RunSettings {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut settings = Self::default();
        settings.apply_cli_overrides(&args);
        settings
    }

    fn apply_cli_overrides(&mut self, args: &[String]) {
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "-l" | "--level" => {
                    if let Some(val) = args.get(i + 1) {
                        self.level_path = val.clone();
                        i += 1;
                    }
                }
                "-p" | "--profile" => {
                    if let Some(val) = args.get(i + 1) {
                        self.profile = val.clone();
                        i += 1;
                    }
                }
                "-t" | "--time-limit" => {
                    if let Some(val) = args.get(i + 1) {
                        if let Ok(n) = val.parse() {
                            self.time_limit = n;
                        }
                        i += 1;
                    }
                }
                "--fps" => {
                    if let Some(val) = args.get(i + 1) {
                        // The run loop divides by this, so zero is not a rate
                        match val.parse::<f32>() {
                            Ok(n) if n > 0.0 => self.fps = n,
                            _ => eprintln!("Ignoring invalid fps '{}'", val),
                        }
                        i += 1;
                    }
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                _ => {}
            }
            i += 1;
        }
    }
}

fn print_help() {
    println!(
        r#"Kiwirun - autonomous platformer navigation

USAGE:
    cargo run [OPTIONS]

OPTIONS:
    -l, --level PATH       Level file (default: assets/levels/meadow.toml)
    -p, --profile NAME     Navigation profile (default: pathfinder)
    -t, --time-limit SECS  Abort the run after SECS (default: 120, 0 = none)
    --fps N                Simulation tick rate (default: 60)
    -h, --help             Show this help

PROFILES:
    pathfinder, rulebased, greedy (plus any defined in assets/nav_profiles.txt)
"#
    );
}

fn main() {
    let settings = RunSettings::from_args();

    println!("========================================");
    println!("       KIWIRUN");
    println!("========================================");
    println!("  Level: {}", settings.level_path);
    println!("  Profile: {}", settings.profile);
    if settings.time_limit > 0.0 {
        println!("  Time Limit: {}s", settings.time_limit);
    }
    println!();

    let mut app = App::new();
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f32(
            1.0 / settings.fps,
        ))),
    );
    app.add_plugins(bevy::transform::TransformPlugin);
    app.add_plugins(bevy::log::LogPlugin::default());

    let level = LevelData::load_from_file(&settings.level_path);
    let geometry = level.to_geometry();
    let graph = NavGraph::build(
        level.waypoint_positions(),
        MAX_JUMP_DISTANCE,
        MAX_JUMP_HEIGHT,
        &geometry,
        LAYER_GROUND | LAYER_WALL,
    );

    app.insert_resource(NavTuning::load_or_default());
    app.insert_resource(NavProfileDatabase::default());
    app.insert_resource(SelectedProfile(settings.profile));
    app.insert_resource(LevelSession {
        time_limit: settings.time_limit,
        ..default()
    });
    app.insert_resource(geometry);
    app.insert_resource(graph);
    app.insert_resource(level);

    app.add_systems(Startup, spawn_level);
    app.add_systems(
        Update,
        (
            tick_session,
            agent_decision_update,
            apply_agent_input,
            apply_gravity,
            integrate_and_collide,
            collect_targets,
            check_finish,
            check_hazard,
            exit_when_done,
        )
            .chain(),
    );

    app.run();
}
