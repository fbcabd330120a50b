//! Collision resolution: terrain, obstacles (trunks), and world bounds.
//!
//! Three independent routines mutate body position/velocity/orientation to
//! enforce non-penetration and contact semantics. Terrain and obstacle
//! resolution report a contact flag consumed by the locomotion force model.
//! Only the first colliding obstacle found per call is resolved; a
//! multi-contact accumulator is a possible future refinement, not the
//! current contract.

use crate::body::Body;
use crate::constants::{
    CONTACT_EPSILON, OFF_MAP_HEIGHT, ORIENT_BLEND, TRUNK_DETECTION_MARGIN, TRUNK_HEIGHT,
    TRUNK_RADIUS, TRUNK_TOP_BAND,
};
use crate::heightfield::Heightfield;
use crate::spatial_hash::SpatialHash;
use glam::{Mat3, Quat, Vec3};

/// A static trunk obstacle: world transform over an implicit cylinder of
/// canonical radius and height.
#[derive(Clone, Copy, Debug)]
pub struct Obstacle {
    pub position: Vec3,
    /// Rotation about Y; render-only, the collision cylinder is symmetric.
    pub yaw: f32,
    pub scale: f32,
}

impl Obstacle {
    pub fn new(position: Vec3, yaw: f32, scale: f32) -> Self {
        Self {
            position,
            yaw,
            scale,
        }
    }

    #[inline]
    pub fn trunk_radius(&self) -> f32 {
        TRUNK_RADIUS * self.scale
    }

    #[inline]
    pub fn height(&self) -> f32 {
        TRUNK_HEIGHT * self.scale
    }

    /// Absolute world Y of the trunk top.
    #[inline]
    pub fn top_y(&self) -> f32 {
        self.position.y + self.height()
    }
}

/// Blend the body's orientation toward an orthonormal frame whose up is
/// `up`, keeping the current forward direction as far as possible.
/// `fallback` seeds the right axis when forward is parallel to `up`.
fn orient_to_surface(body: &mut Body, up: Vec3, fallback: Vec3) {
    let forward = body.forward();

    let new_y = up;
    let mut new_x = forward.cross(new_y);
    if new_x.length() < 1e-3 {
        new_x = fallback.cross(new_y);
    }
    let new_x = new_x.normalize();
    let new_z = new_x.cross(new_y).normalize();

    let target = Quat::from_mat3(&Mat3::from_cols(new_x, new_y, new_z));
    body.orientation = body.orientation.slerp(target, ORIENT_BLEND).normalize();
}

/// Resolve body-vs-terrain contact. Returns the grounded flag.
///
/// Extended bodies are glued to the surface: velocity is fully stopped
/// (locomotion is re-driven by the force model each frame, not carried as
/// residual velocity), position snaps to the surface and orientation blends
/// toward the terrain frame. `on_obstacle` skips the snap while the body
/// rests on an obstacle above the ground. Retracted bodies only get pushed
/// out when interpenetrating, like a free-rolling ball.
pub fn resolve_terrain(body: &mut Body, field: &Heightfield, on_obstacle: bool) -> bool {
    let ground = field.height_at(body.position.x, body.position.z);
    if ground <= OFF_MAP_HEIGHT {
        // Off the map: nothing to stand on.
        return false;
    }

    let bottom = body.position.y - body.radius;

    if !body.retracted {
        body.set_velocity(Vec3::ZERO);

        if on_obstacle && bottom > ground {
            return true;
        }

        body.position.y = ground + body.radius + CONTACT_EPSILON;

        let normal = field.normal_at(body.position.x, body.position.z);
        orient_to_surface(body, normal, Vec3::X);
        return true;
    }

    if bottom < ground {
        body.position.y = ground + body.radius + CONTACT_EPSILON;
        return true;
    }

    false
}

/// Resolve body-vs-obstacle contact using the spatial hash for broad phase.
/// Returns true when the body is in contact with an obstacle this frame.
pub fn resolve_obstacles(body: &mut Body, obstacles: &[Obstacle], hash: &SpatialHash) -> bool {
    if obstacles.is_empty() {
        return false;
    }

    for idx in hash.query_neighborhood(body.position) {
        let obstacle = &obstacles[idx];
        let combined_radius = body.radius + obstacle.trunk_radius();
        let detection = combined_radius + TRUNK_DETECTION_MARGIN;
        let top_y = obstacle.top_y();

        let dx = body.position.x - obstacle.position.x;
        let dz = body.position.z - obstacle.position.z;
        let dist_sq = dx * dx + dz * dz;
        if dist_sq >= detection * detection {
            continue;
        }

        // Zone 1: top cap, a walkable platform.
        if (body.position.y - (top_y + body.radius)).abs() < TRUNK_TOP_BAND {
            body.position.y = top_y - 0.1;
            return true;
        }

        // Zone 2: side trunk.
        if body.position.y < top_y + body.radius {
            let dist = dist_sq.sqrt();
            let normal = if dist > 1e-4 {
                Vec3::new(dx / dist, 0.0, dz / dist)
            } else {
                // Body exactly on the axis; push out along +X.
                Vec3::X
            };

            body.position.x = obstacle.position.x + normal.x * combined_radius;
            body.position.z = obstacle.position.z + normal.z * combined_radius;

            // Controlled fall-off near the base: an extended body pointed
            // steeply downward slides off instead of sticking.
            let height_from_base = body.position.y - obstacle.position.y;
            if !body.retracted && body.forward().y < -0.2 && height_from_base < 2.5 {
                return false;
            }

            if body.retracted {
                let velocity = body.velocity();
                if velocity.dot(normal) < 0.0 {
                    // Elastic bounce off the trunk.
                    body.set_velocity(velocity - 2.0 * velocity.dot(normal) * normal);
                }
            } else {
                orient_to_surface(body, normal, Vec3::Y);
            }
            return true;
        }
    }

    false
}

/// Clamp the body inside the axis-aligned square world of half-extent
/// `half_extent` and reflect velocity off the accumulated wall normal.
/// Returns true when any axis was clamped.
pub fn resolve_bounds(body: &mut Body, half_extent: f32) -> bool {
    let r = body.radius;
    let mut normal = Vec3::ZERO;

    if body.position.x - r < -half_extent {
        body.position.x = -half_extent + r;
        normal += Vec3::X;
    } else if body.position.x + r > half_extent {
        body.position.x = half_extent - r;
        normal -= Vec3::X;
    }

    if body.position.z - r < -half_extent {
        body.position.z = -half_extent + r;
        normal += Vec3::Z;
    } else if body.position.z + r > half_extent {
        body.position.z = half_extent - r;
        normal -= Vec3::Z;
    }

    if normal == Vec3::ZERO {
        return false;
    }

    let n = normal.normalize();
    let velocity = body.velocity();
    body.set_velocity(velocity - 2.0 * velocity.dot(n) * n);
    true
}
