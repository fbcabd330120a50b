//! Level generation: static obstacle and foliage placement on the terrain.
//!
//! Obstacles (trunks) are placed at random XZ positions, dropped onto the
//! heightfield, and indexed once in a spatial hash; both are immutable for
//! the rest of the session. Foliage instances carry edible boosts that
//! mutate the body through [`Body::resize`] so mass/radius/inertia stay
//! consistent.

use crate::body::Body;
use crate::collision::Obstacle;
use crate::constants::{OFF_MAP_HEIGHT, TRUNK_DETECTION_MARGIN, TRUNK_RADIUS};
use crate::heightfield::Heightfield;
use crate::spatial_hash::SpatialHash;
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Configuration for level generation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LevelConfig {
    pub tree_count: usize,
    pub foliage_count: usize,
    /// Half-extent of the square world limit.
    pub world_half_extent: f32,
    /// Spawn point; Y is resolved against the terrain at spawn time.
    #[serde(
        serialize_with = "crate::serde_utils::serialize_vec3",
        deserialize_with = "crate::serde_utils::deserialize_vec3"
    )]
    pub spawn: Vec3,
    pub tree_scale_min: f32,
    pub tree_scale_max: f32,
    /// Spatial hash cell size; must cover the largest detection radius.
    pub hash_cell_size: f32,
    pub seed: u64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            tree_count: 300,
            foliage_count: 80,
            world_half_extent: 140.0,
            spawn: Vec3::ZERO,
            tree_scale_min: 0.8,
            tree_scale_max: 1.5,
            hash_cell_size: 4.0,
            seed: 7,
        }
    }
}

/// Stat boost granted by eating a foliage instance.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Boost {
    pub radius_scale: f32,
    pub mass_scale: f32,
    pub speed_bonus: f32,
}

/// A decorative/edible plant instance.
#[derive(Clone, Copy, Debug)]
pub struct Foliage {
    pub position: Vec3,
    pub yaw: f32,
    pub scale: f32,
    pub edible: bool,
    pub boost: Boost,
}

/// A generated level: static trees with their spatial index, plus foliage.
#[derive(Clone, Debug)]
pub struct Level {
    pub config: LevelConfig,
    pub trees: Vec<Obstacle>,
    pub foliage: Vec<Foliage>,
    pub hash: SpatialHash,
}

impl Level {
    /// Place trees and foliage on the terrain and build the obstacle hash.
    pub fn generate(field: &Heightfield, config: LevelConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let half = config.world_half_extent;

        // A degenerate world has no interior to scatter into.
        if half <= 0.0 {
            log::warn!("world half-extent {half} leaves no room, placing nothing");
            return Self {
                hash: SpatialHash::build(&[], config.hash_cell_size),
                config,
                trees: Vec::new(),
                foliage: Vec::new(),
            };
        }

        let mut trees = Vec::with_capacity(config.tree_count);
        let mut attempts = 0;
        while trees.len() < config.tree_count && attempts < config.tree_count * 10 {
            attempts += 1;
            let x = rng.gen_range(-half..half);
            let z = rng.gen_range(-half..half);
            let y = field.height_at(x, z);
            if y <= OFF_MAP_HEIGHT {
                continue;
            }
            // Trees don't take root on bouncy ground.
            if field.material_at(x, z) < -0.25 {
                continue;
            }
            let yaw = rng.gen_range(0.0..TAU);
            let scale = rng.gen_range(config.tree_scale_min..=config.tree_scale_max);
            trees.push(Obstacle::new(Vec3::new(x, y, z), yaw, scale));
        }

        let mut foliage = Vec::with_capacity(config.foliage_count);
        for _ in 0..config.foliage_count {
            let x = rng.gen_range(-half..half);
            let z = rng.gen_range(-half..half);
            let y = field.height_at(x, z);
            if y <= OFF_MAP_HEIGHT {
                continue;
            }
            foliage.push(Foliage {
                position: Vec3::new(x, y, z),
                yaw: rng.gen_range(0.0..TAU),
                scale: rng.gen_range(0.5..1.2),
                edible: true,
                boost: Boost {
                    radius_scale: rng.gen_range(1.0..1.1),
                    mass_scale: rng.gen_range(1.0..1.1),
                    speed_bonus: rng.gen_range(0.0..1.0),
                },
            });
        }

        let positions: Vec<Vec3> = trees.iter().map(|t| t.position).collect();
        let hash = SpatialHash::build(&positions, config.hash_cell_size);

        log::info!(
            "level generated: {} trees, {} foliage (seed {})",
            trees.len(),
            foliage.len(),
            config.seed
        );

        Self {
            config,
            trees,
            foliage,
            hash,
        }
    }

    /// Spawn the body on the terrain at the configured spawn point.
    pub fn spawn_body(&self, field: &Heightfield, scale: f32, mass: f32) -> Body {
        let spawn = self.config.spawn;
        let ground = field.height_at(spawn.x, spawn.z);
        let radius = 1.73 * scale;
        let y = if ground > OFF_MAP_HEIGHT {
            ground + radius
        } else {
            spawn.y + radius
        };
        Body::new(Vec3::new(spawn.x, y, spawn.z), scale, mass)
    }

    /// Consume a foliage instance: marks it eaten and applies its boost to
    /// the body as one atomic size/mass/speed change.
    pub fn eat_foliage(&mut self, index: usize, body: &mut Body) {
        let Some(plant) = self.foliage.get_mut(index) else {
            return;
        };
        if !plant.edible {
            return;
        }
        plant.edible = false;

        let boost = plant.boost;
        // The spatial hash only guarantees no broad-phase misses while the
        // detection radius stays within one cell, so growth caps there.
        let max_radius = (self.config.hash_cell_size
            - TRUNK_RADIUS * self.config.tree_scale_max
            - TRUNK_DETECTION_MARGIN)
            .max(body.radius);
        let new_radius = (body.radius * boost.radius_scale).min(max_radius);
        if new_radius < body.radius * boost.radius_scale {
            log::warn!("radius boost clamped to {new_radius} to keep broad phase sound");
        }
        body.resize(new_radius, boost.mass_scale);
        body.max_speed += boost.speed_bonus;
        log::debug!(
            "foliage {index} eaten: radius {:.2}, mass {:.2}, max_speed {:.1}",
            body.radius,
            body.mass,
            body.max_speed
        );
    }
}
