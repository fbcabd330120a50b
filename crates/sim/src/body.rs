//! Rigid body state and the generalized-force integrator.
//!
//! The body carries linear/angular momentum and a unit orientation
//! quaternion, advanced one semi-implicit Euler step per frame from an
//! injected [`ForceProvider`]. Gameplay-side effects (size/mass boosts)
//! go through [`Body::resize`] so radius, mass and inverse inertia always
//! change as a consistent set.

use crate::constants::{ANGULAR_SLEEP_THRESHOLD, RETRACT_SPEED};
use glam::{Mat3, Quat, Vec3};

/// Generalized force: `(force, torque)` evaluated once per integration step.
///
/// Built fresh each frame from whatever external context matters (input,
/// terrain classification, camera heading); the integrator is agnostic to
/// all of it.
pub trait ForceProvider {
    fn force(&self, t: f32, body: &Body) -> (Vec3, Vec3);
}

/// Rigid body state for the one creature instance.
#[derive(Clone, Debug)]
pub struct Body {
    /// World-space center.
    pub position: Vec3,
    /// Linear momentum; velocity is `momentum / mass`.
    pub momentum: Vec3,
    /// Angular momentum; angular velocity is `inertia_inv * L`.
    pub angular_momentum: Vec3,
    /// Always unit length; renormalized after every step and blend.
    pub orientation: Quat,
    pub mass: f32,
    /// Inverse inertia tensor, solid-sphere diagonal `1/(0.4 m r^2)`.
    pub inertia_inv: Mat3,
    /// Collision extent and visual scale.
    pub radius: f32,

    /// Physical mode flag: damped free body instead of driven locomotor.
    pub retracted: bool,
    /// Animated 0..1 value for visuals; the mode flips at the 0 boundary.
    pub retract_progress: f32,
    retract_target: f32,

    pub move_speed: f32,
    pub max_speed: f32,
    pub stamina: f32,
    pub stamina_max: f32,
    pub stamina_depletion_rate: f32,
    pub stamina_repletion_rate: f32,
    pub sprinting: bool,
    pub moving: bool,
}

impl Body {
    /// Spawn a body at `position` with visual scale `scale` and mass `mass`.
    pub fn new(position: Vec3, scale: f32, mass: f32) -> Self {
        debug_assert!(mass > 0.0 && scale > 0.0);
        let radius = 1.73 * scale;
        Self {
            position,
            momentum: Vec3::ZERO,
            angular_momentum: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            mass,
            inertia_inv: sphere_inertia_inv(mass, radius),
            radius,
            retracted: false,
            retract_progress: 0.0,
            retract_target: 0.0,
            move_speed: 5.0,
            max_speed: 25.0,
            stamina: 50.0,
            stamina_max: 100.0,
            stamina_depletion_rate: 20.0,
            stamina_repletion_rate: 15.0,
            sprinting: false,
            moving: false,
        }
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.momentum / self.mass
    }

    #[inline]
    pub fn angular_velocity(&self) -> Vec3 {
        self.inertia_inv * self.angular_momentum
    }

    /// Set velocity directly, keeping momentum in sync.
    #[inline]
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.momentum = velocity * self.mass;
    }

    /// Model forward axis (-Z in body space).
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    /// Advance one semi-implicit Euler step.
    ///
    /// The provider is evaluated once; momenta integrate first, then
    /// position and orientation from the freshly derived velocities.
    /// Orientation is renormalized, and near-zero spin is hard-zeroed to
    /// stop residual jitter. With zero force/torque, momenta are conserved
    /// exactly.
    pub fn advance(&mut self, t: f32, dt: f32, forces: &dyn ForceProvider) {
        let (force, torque) = forces.force(t, self);

        self.momentum += force * dt;
        self.angular_momentum += torque * dt;

        let velocity = self.velocity();
        let angular_velocity = self.angular_velocity();

        self.position += velocity * dt;

        // q' = 0.5 * (0, w) * q
        let spin = Quat::from_xyzw(
            angular_velocity.x,
            angular_velocity.y,
            angular_velocity.z,
            0.0,
        );
        let q_dot = (spin * self.orientation) * 0.5;
        self.orientation = (self.orientation + q_dot * dt).normalize();

        if self.angular_velocity().length() < ANGULAR_SLEEP_THRESHOLD {
            self.angular_momentum = Vec3::ZERO;
        }
    }

    /// Rescale the body. Radius, mass and inverse inertia change together;
    /// changing any of them separately would make the angular response
    /// physically inconsistent.
    pub fn resize(&mut self, new_radius: f32, mass_scale: f32) {
        debug_assert!(new_radius > 0.0 && mass_scale > 0.0);
        self.radius = new_radius;
        self.mass *= mass_scale;
        self.inertia_inv = sphere_inertia_inv(self.mass, self.radius);
    }

    /// Request retraction (true) or extension (false). The animated value
    /// moves toward the target in [`Body::animate_retract`].
    pub fn set_retract_target(&mut self, retract: bool) {
        self.retract_target = if retract { 1.0 } else { 0.0 };
    }

    pub fn retract_target(&self) -> bool {
        self.retract_target > 0.5
    }

    /// Advance the retract animation and flip the physical mode at the
    /// progress boundary (retracted as soon as progress leaves zero).
    pub fn animate_retract(&mut self, dt: f32) {
        if self.retract_progress < self.retract_target {
            self.retract_progress += RETRACT_SPEED * dt;
        } else if self.retract_progress > self.retract_target {
            self.retract_progress -= RETRACT_SPEED * dt;
        }
        self.retract_progress = self.retract_progress.clamp(0.0, 1.0);
        self.retracted = self.retract_progress > 0.0;
    }

    /// Deplete stamina while sprinting and moving, replete otherwise.
    pub fn update_stamina(&mut self, dt: f32) {
        let rate = if self.sprinting && self.moving {
            -self.stamina_depletion_rate
        } else {
            self.stamina_repletion_rate
        };
        self.stamina = (self.stamina + rate * dt).clamp(0.0, self.stamina_max);
    }
}

fn sphere_inertia_inv(mass: f32, radius: f32) -> Mat3 {
    Mat3::from_diagonal(Vec3::splat(1.0 / (0.4 * mass * radius * radius)))
}
