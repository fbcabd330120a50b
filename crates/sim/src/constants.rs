//! Physical constants for the creature simulation.

/// Standard acceleration due to gravity (m/s^2), applied in -Y.
pub const GRAVITY: f32 = 9.80665;

/// Timestep ceiling (s). Frames longer than this are clamped to bound
/// integration error and prevent tunneling through obstacles.
pub const MAX_DT: f32 = 0.1;

/// Angular speed below which angular momentum is hard-zeroed after a step.
/// Prevents residual micro-jitter from accumulating.
pub const ANGULAR_SLEEP_THRESHOLD: f32 = 0.05;

/// Separation left between the body and a surface after a snap, to avoid
/// re-penetration jitter on the next frame.
pub const CONTACT_EPSILON: f32 = 0.01;

/// Per-call slerp ratio used when blending orientation toward a surface
/// frame.
pub const ORIENT_BLEND: f32 = 0.2;

/// Retract/extend animation speed (progress units per second).
pub const RETRACT_SPEED: f32 = 2.0;

/// Linear damping coefficient while retracted (per unit mass).
pub const RETRACT_DAMPING: f32 = 5.0;

/// Angular damping coefficient while retracted.
pub const RETRACT_SPIN_DAMPING: f32 = 0.5;

// =============================================================================
// OBSTACLES (trunks/trees)
// =============================================================================

/// Canonical trunk radius before instance scaling (world units).
pub const TRUNK_RADIUS: f32 = 0.3;

/// Canonical trunk height before instance scaling (world units).
pub const TRUNK_HEIGHT: f32 = 15.0;

/// Extra margin added to the combined radius for contact detection.
pub const TRUNK_DETECTION_MARGIN: f32 = 0.1;

/// Vertical band around (top + radius) treated as a walkable top cap.
pub const TRUNK_TOP_BAND: f32 = 0.5;

// =============================================================================
// HEIGHT FIELD
// =============================================================================

/// Sentinel returned by height queries outside the field: far below any
/// valid terrain, read as "off map / pit" by callers.
pub const OFF_MAP_HEIGHT: f32 = -99999.0;

/// Material classification values. The grid stores continuous blends of
/// these after smoothing.
pub const MATERIAL_BOUNCY: f32 = -1.0;
pub const MATERIAL_GRASS: f32 = 0.0;
pub const MATERIAL_ROCK: f32 = 1.0;

/// Height thresholds for material classification (raw grid units, 0..1).
pub const MATERIAL_BOUNCY_BELOW: f32 = 0.0;
pub const MATERIAL_ROCK_BELOW: f32 = 0.07;
