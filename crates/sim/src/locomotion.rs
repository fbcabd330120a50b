//! Locomotion force model: the per-frame [`ForceProvider`] fed to the
//! integrator.
//!
//! Three regimes:
//! - retracted: pure damping against linear and angular velocity,
//! - extended airborne: gravity only,
//! - extended grounded: slope-decomposed gravity, input-driven drive force,
//!   static/kinetic Coulomb friction against the combined tangential force,
//!   and a rolling torque toward the rolling-without-slipping target.
//!
//! Friction and rolling resistance coefficients are functions of the
//! terrain material blend (-1 bouncy .. 0 grass .. +1 rock).

use crate::body::{Body, ForceProvider};
use crate::constants::{GRAVITY, RETRACT_DAMPING, RETRACT_SPIN_DAMPING};
use glam::{Quat, Vec3};

/// Poll snapshot of held movement/action keys, consumed once per frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct MoveInput {
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub sprint: bool,
    pub retract: bool,
}

impl MoveInput {
    pub fn any_movement(&self) -> bool {
        self.forward || self.backward || self.turn_left || self.turn_right
    }
}

/// Ground classification for the current frame, produced by collision
/// resolution and terrain queries.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceSample {
    pub grounded: bool,
    pub normal: Vec3,
    /// Material blend under the body: -1 bouncy, 0 grass, +1 rock.
    pub material: f32,
}

impl Default for SurfaceSample {
    fn default() -> Self {
        Self {
            grounded: false,
            normal: Vec3::Y,
            material: 0.0,
        }
    }
}

/// Friction/rolling coefficients for a material blend value.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceFriction {
    pub mu_static: f32,
    pub mu_kinetic: f32,
    pub rolling_resistance: f32,
}

const GRASS_FRICTION: SurfaceFriction = SurfaceFriction {
    mu_static: 0.9,
    mu_kinetic: 0.7,
    rolling_resistance: 0.3,
};

const ROCK_FRICTION: SurfaceFriction = SurfaceFriction {
    mu_static: 0.5,
    mu_kinetic: 0.35,
    rolling_resistance: 0.1,
};

const BOUNCY_FRICTION: SurfaceFriction = SurfaceFriction {
    mu_static: 0.6,
    mu_kinetic: 0.45,
    rolling_resistance: 0.05,
};

/// Linear blend of the class coefficients for a continuous material value.
pub fn surface_friction(material: f32) -> SurfaceFriction {
    let m = material.clamp(-1.0, 1.0);
    let (a, b, t) = if m >= 0.0 {
        (GRASS_FRICTION, ROCK_FRICTION, m)
    } else {
        (GRASS_FRICTION, BOUNCY_FRICTION, -m)
    };
    SurfaceFriction {
        mu_static: a.mu_static * (1.0 - t) + b.mu_static * t,
        mu_kinetic: a.mu_kinetic * (1.0 - t) + b.mu_kinetic * t,
        rolling_resistance: a.rolling_resistance * (1.0 - t) + b.rolling_resistance * t,
    }
}

/// Drive force per unit of `move_speed`, per unit mass.
const DRIVE_GAIN: f32 = 2.0;
/// Sprint multiplier on drive force while stamina remains.
const SPRINT_FACTOR: f32 = 1.8;
/// Reverse moves at half strength.
const REVERSE_FACTOR: f32 = 0.5;
/// Planar speed below which static friction may hold the body.
const STATIC_SPEED_EPS: f32 = 0.05;
/// Gain driving angular velocity toward the rolling target.
const ROLL_GAIN: f32 = 0.8;

/// Per-frame force provider, built fresh from the frame's grounded,
/// retracted and material classification.
#[derive(Clone, Copy, Debug)]
pub struct LocomotionForces {
    pub surface: SurfaceSample,
    pub input: MoveInput,
}

impl LocomotionForces {
    pub fn new(surface: SurfaceSample, input: MoveInput) -> Self {
        Self { surface, input }
    }

    fn grounded_force(&self, body: &Body) -> (Vec3, Vec3) {
        let n = self.surface.normal;
        let friction = surface_friction(self.surface.material);

        let gravity = Vec3::new(0.0, -body.mass * GRAVITY, 0.0);
        let gravity_tangent = gravity - n * gravity.dot(n);

        // Input drive along the slope-projected heading.
        let heading = body.forward();
        let heading_tangent = (heading - n * heading.dot(n)).normalize_or_zero();
        let mut drive_scale = 0.0;
        if self.input.forward {
            drive_scale += 1.0;
        }
        if self.input.backward {
            drive_scale -= REVERSE_FACTOR;
        }
        let sprint = if self.input.sprint && body.stamina > 0.0 {
            SPRINT_FACTOR
        } else {
            1.0
        };
        let drive =
            heading_tangent * (drive_scale * sprint * body.mass * body.move_speed * DRIVE_GAIN);

        // Normal load scales with the surface's alignment to world up.
        let normal_load = (body.mass * GRAVITY * n.dot(Vec3::Y)).max(0.0);
        let static_limit = friction.mu_static * normal_load;
        let kinetic_limit = friction.mu_kinetic * normal_load;

        let velocity = body.velocity();
        let planar_velocity = velocity - n * velocity.dot(n);

        let tangential = drive + gravity_tangent;
        let mut tangential_force =
            if planar_velocity.length() < STATIC_SPEED_EPS && tangential.length() <= static_limit {
                // Static friction holds: the surface cancels the whole
                // tangential load.
                Vec3::ZERO
            } else {
                let opposing = if planar_velocity.length_squared() > 1e-8 {
                    -planar_velocity.normalize() * kinetic_limit
                } else {
                    -tangential.normalize_or_zero() * kinetic_limit.min(tangential.length())
                };
                tangential + opposing
            };
        if tangential_force.length() > kinetic_limit {
            tangential_force = tangential_force.normalize() * kinetic_limit;
        }

        // Torque toward rolling without slipping: w_target = (n x v_t) / r.
        let angular_velocity = body.angular_velocity();
        let roll_target = n.cross(planar_velocity) / body.radius;
        let torque = (roll_target - angular_velocity) * ROLL_GAIN
            - angular_velocity * friction.rolling_resistance;

        (tangential_force, torque)
    }
}

impl ForceProvider for LocomotionForces {
    fn force(&self, _t: f32, body: &Body) -> (Vec3, Vec3) {
        if body.retracted {
            // Critical-style braking, no gravity opposition.
            let force = -body.velocity() * body.mass * RETRACT_DAMPING;
            let torque = -body.angular_velocity() * RETRACT_SPIN_DAMPING;
            return (force, torque);
        }

        if !self.surface.grounded {
            return (Vec3::new(0.0, -body.mass * GRAVITY, 0.0), Vec3::ZERO);
        }

        self.grounded_force(body)
    }
}

/// Yaw turn rate for held turn keys (radians per second).
const TURN_RATE: f32 = 100.0 * std::f32::consts::PI / 180.0;

/// Apply held turn input directly to the orientation. Turning is kinematic
/// in this model, not part of the force integral.
pub fn apply_turn(body: &mut Body, input: MoveInput, dt: f32) {
    let mut angle = 0.0;
    if input.turn_right {
        angle -= TURN_RATE * dt;
    }
    if input.turn_left {
        angle += TURN_RATE * dt;
    }
    if angle != 0.0 {
        let turn = Quat::from_axis_angle(Vec3::Y, angle);
        body.orientation = (body.orientation * turn).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retracted_damping_opposes_velocity() {
        let mut body = Body::new(Vec3::ZERO, 1.0, 2.0);
        body.set_velocity(Vec3::new(3.0, 0.0, -1.0));
        body.retracted = true;

        let forces = LocomotionForces::new(SurfaceSample::default(), MoveInput::default());
        let (force, _) = forces.force(0.0, &body);
        assert!(force.dot(body.velocity()) < 0.0);
        // No gravity term while retracted.
        assert_eq!(force.y, 0.0);
    }

    #[test]
    fn test_airborne_gravity_only() {
        let body = Body::new(Vec3::new(0.0, 50.0, 0.0), 1.0, 2.0);
        let forces = LocomotionForces::new(SurfaceSample::default(), MoveInput::default());
        let (force, torque) = forces.force(0.0, &body);
        assert!((force - Vec3::new(0.0, -2.0 * GRAVITY, 0.0)).length() < 1e-5);
        assert_eq!(torque, Vec3::ZERO);
    }

    #[test]
    fn test_static_friction_holds_on_gentle_slope() {
        // Mild slope, no input, body at rest: static friction cancels the
        // tangential gravity component entirely.
        let mut body = Body::new(Vec3::ZERO, 1.0, 1.0);
        body.set_velocity(Vec3::ZERO);
        let surface = SurfaceSample {
            grounded: true,
            normal: Vec3::new(0.1, 1.0, 0.0).normalize(),
            material: 0.0,
        };
        let forces = LocomotionForces::new(surface, MoveInput::default());
        let (force, _) = forces.force(0.0, &body);
        assert!(force.length() < 1e-6);
    }

    #[test]
    fn test_drive_force_clamped_to_kinetic_limit() {
        let mut body = Body::new(Vec3::ZERO, 1.0, 1.0);
        body.set_velocity(Vec3::new(2.0, 0.0, 0.0));
        let surface = SurfaceSample {
            grounded: true,
            normal: Vec3::Y,
            material: 0.0,
        };
        let input = MoveInput {
            forward: true,
            sprint: true,
            ..Default::default()
        };
        let forces = LocomotionForces::new(surface, input);
        let (force, _) = forces.force(0.0, &body);

        let kinetic_limit = surface_friction(0.0).mu_kinetic * body.mass * GRAVITY;
        assert!(force.length() <= kinetic_limit + 1e-4);
    }

    #[test]
    fn test_material_blend_continuous() {
        let grass = surface_friction(0.0);
        let half_rock = surface_friction(0.5);
        let rock = surface_friction(1.0);
        assert!(half_rock.mu_kinetic < grass.mu_kinetic);
        assert!(half_rock.mu_kinetic > rock.mu_kinetic);

        let bouncy = surface_friction(-1.0);
        assert!(bouncy.rolling_resistance < grass.rolling_resistance);
    }

    #[test]
    fn test_turn_is_yaw_only() {
        let mut body = Body::new(Vec3::ZERO, 1.0, 1.0);
        let input = MoveInput {
            turn_left: true,
            ..Default::default()
        };
        apply_turn(&mut body, input, 0.5);
        let forward = body.forward();
        assert!(forward.y.abs() < 1e-6);
        assert!((body.orientation.length() - 1.0).abs() < 1e-6);
    }
}
