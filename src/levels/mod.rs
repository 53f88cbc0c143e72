//! Level definitions - TOML parsing and geometry construction

use std::fs;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::world::{Collider, LAYER_GROUND, LAYER_HAZARD, LAYER_WALL, LayerMask, LevelGeometry};

/// Which collision layer a block belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockLayer {
    Ground,
    Wall,
    Hazard,
}

impl BlockLayer {
    pub fn mask(self) -> LayerMask {
        match self {
            BlockLayer::Ground => LAYER_GROUND,
            BlockLayer::Wall => LAYER_WALL,
            BlockLayer::Hazard => LAYER_HAZARD,
        }
    }
}

/// One solid box in the level file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockDef {
    pub center: [f32; 2],
    pub size: [f32; 2],
    pub layer: BlockLayer,
}

/// Single level definition loaded from a TOML file
#[derive(Resource, Clone, Debug, Serialize, Deserialize)]
pub struct LevelData {
    pub name: String,
    pub agent_spawn: [f32; 2],
    /// Candidate finish positions; one is picked at random per session
    pub finish_spawns: Vec<[f32; 2]>,
    pub waypoints: Vec<[f32; 2]>,
    pub collectibles: Vec<[f32; 2]>,
    pub blocks: Vec<BlockDef>,
}

impl LevelData {
    /// Load a level from file, returns the built-in level on error
    pub fn load_from_file(path: &str) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to load level from {}: {}, using default", path, e);
                return Self::default_level();
            }
        };
        match toml::from_str::<LevelData>(&content) {
            Ok(level) => {
                info!(
                    "Loaded level '{}': {} blocks, {} collectibles, {} waypoints",
                    level.name,
                    level.blocks.len(),
                    level.collectibles.len(),
                    level.waypoints.len()
                );
                level
            }
            Err(e) => {
                warn!("Failed to parse level {}: {}, using default", path, e);
                Self::default_level()
            }
        }
    }

    /// Built-in fallback level: one long floor, a wall with a platform
    /// behind it, a hazard strip, three collectibles
    pub fn default_level() -> Self {
        Self {
            name: "fallback".to_string(),
            agent_spawn: [-8.0, 1.0],
            finish_spawns: vec![[16.0, 1.0], [-16.0, 1.0]],
            // Floor waypoints at standing height; platform waypoints one
            // unit above its surface so the reachability linecasts clear
            // the platform edge
            waypoints: vec![
                [-16.0, 1.0],
                [-12.0, 1.0],
                [-8.0, 1.0],
                [-4.0, 1.0],
                [1.0, 1.0],
                [3.5, 4.0],
                [5.5, 4.0],
                [8.0, 4.0],
                [9.5, 4.0],
                [10.0, 1.0],
                [14.0, 1.0],
                [16.0, 1.0],
            ],
            collectibles: vec![[-2.0, 1.0], [7.0, 4.0], [12.0, 1.0]],
            blocks: vec![
                BlockDef {
                    center: [0.0, -0.5],
                    size: [40.0, 1.0],
                    layer: BlockLayer::Ground,
                },
                BlockDef {
                    center: [3.0, 1.5],
                    size: [0.5, 3.0],
                    layer: BlockLayer::Wall,
                },
                BlockDef {
                    center: [6.0, 2.75],
                    size: [6.0, 0.5],
                    layer: BlockLayer::Ground,
                },
                BlockDef {
                    center: [-5.0, 0.1],
                    size: [2.0, 0.2],
                    layer: BlockLayer::Hazard,
                },
            ],
        }
    }

    /// Collision geometry for all blocks
    pub fn to_geometry(&self) -> LevelGeometry {
        LevelGeometry::new(
            self.blocks
                .iter()
                .map(|block| {
                    Collider::from_center_size(
                        Vec2::from(block.center),
                        Vec2::from(block.size),
                        block.layer.mask(),
                    )
                })
                .collect(),
        )
    }

    pub fn waypoint_positions(&self) -> Vec<Vec2> {
        self.waypoints.iter().map(|&p| Vec2::from(p)).collect()
    }
}
