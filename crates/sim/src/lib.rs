//! Creature locomotion simulation over procedural heightfield terrain.
//!
//! A single rigid body (the creature) moves over a hill-algorithm
//! heightfield, collides with static trunk obstacles indexed in a spatial
//! hash, and is clamped inside a square world limit. A per-frame force
//! model drives locomotion in two physical modes: extended (surface
//! crawler) and retracted (damped free-rolling ball).
//!
//! This crate is framework-agnostic - it handles simulation only. Input
//! polling, rendering and audio live with the caller and communicate
//! through [`MoveInput`] snapshots and read-only body/terrain state.

pub mod body;
pub mod collision;
pub mod constants;
pub mod heightfield;
pub mod level;
pub mod locomotion;
pub mod serde_utils;
pub mod spatial_hash;

pub use body::{Body, ForceProvider};
pub use collision::{resolve_bounds, resolve_obstacles, resolve_terrain, Obstacle};
pub use heightfield::{Heightfield, HillParams};
pub use level::{Boost, Foliage, Level, LevelConfig};
pub use locomotion::{apply_turn, surface_friction, LocomotionForces, MoveInput, SurfaceSample};
pub use spatial_hash::SpatialHash;

use constants::MAX_DT;
use glam::Vec3;

/// The frame-loop orchestrator: owns the terrain, level and body, and runs
/// one synchronous simulation step per frame.
pub struct Simulation {
    pub field: Heightfield,
    pub level: Level,
    pub body: Body,
    pub time: f32,
    /// Grounded flag from the last step, for callers gating locomotion UI.
    pub grounded: bool,
    prev_retract_key: bool,
}

impl Simulation {
    pub fn new(hill_params: &HillParams, level_config: LevelConfig) -> Self {
        let field = Heightfield::generate(hill_params);
        let level = Level::generate(&field, level_config);
        let body = level.spawn_body(&field, 1.0, 1.0);
        Self {
            field,
            level,
            body,
            time: 0.0,
            grounded: false,
            prev_retract_key: false,
        }
    }

    /// Advance one frame.
    ///
    /// Order: retract toggle/animation, obstacle resolution, terrain
    /// resolution (grounded flag), boundary clamp, turn + drive input,
    /// force-model integration, stamina. `dt` is clamped to
    /// [`constants::MAX_DT`] to bound integration error during hitches.
    pub fn step(&mut self, input: MoveInput, dt: f32) {
        let dt = dt.clamp(0.0, MAX_DT);

        // Retract toggles on the key's rising edge only.
        if input.retract && !self.prev_retract_key {
            let target = !self.body.retract_target();
            self.body.set_retract_target(target);
            log::debug!("retract target -> {target}");
        }
        self.prev_retract_key = input.retract;
        self.body.animate_retract(dt);

        let on_obstacle = resolve_obstacles(&mut self.body, &self.level.trees, &self.level.hash);
        self.grounded = resolve_terrain(&mut self.body, &self.field, on_obstacle);
        resolve_bounds(&mut self.body, self.level.config.world_half_extent);

        self.body.moving = input.any_movement();
        self.body.sprinting = input.sprint;

        if self.grounded && !self.body.retracted {
            apply_turn(&mut self.body, input, dt);
            self.apply_drive_kick(input);
        }

        let surface = SurfaceSample {
            grounded: self.grounded,
            normal: self
                .field
                .normal_at(self.body.position.x, self.body.position.z),
            material: self
                .field
                .material_at(self.body.position.x, self.body.position.z),
        };
        let forces = LocomotionForces::new(surface, input);
        self.body.advance(self.time, dt, &forces);
        self.body.update_stamina(dt);

        self.time += dt;
    }

    /// Direct crawl velocity from held keys, capped at `max_speed`.
    /// Terrain resolution stops the body each frame while extended, so
    /// held input re-establishes the crawl velocity here and the force
    /// model layers slope/friction effects on top.
    fn apply_drive_kick(&mut self, input: MoveInput) {
        let forward = self.body.forward();
        let mut velocity = self.body.velocity();
        if input.forward {
            velocity += forward * self.body.move_speed;
        }
        if input.backward {
            velocity -= forward * self.body.move_speed * 0.5;
        }
        let speed = velocity.length();
        if speed > self.body.max_speed {
            velocity *= self.body.max_speed / speed;
        }
        self.body.set_velocity(velocity);
    }

    /// World transform for camera/renderer callers.
    pub fn body_transform(&self) -> (Vec3, glam::Quat, f32) {
        (
            self.body.position,
            self.body.orientation,
            self.body.radius,
        )
    }
}
