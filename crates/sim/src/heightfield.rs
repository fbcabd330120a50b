//! Procedurally generated heightfield terrain with material classification.
//!
//! Heights are synthesized as a sum of flattened paraboloid hills on a unit
//! grid, then classified into a co-located material grid (bouncy / grass /
//! rock) that is box-smoothed so material reads as a continuous blend rather
//! than hard seams. World-space queries (height, normal, material) use
//! bilinear interpolation.

use crate::constants::{
    MATERIAL_BOUNCY, MATERIAL_BOUNCY_BELOW, MATERIAL_GRASS, MATERIAL_ROCK, MATERIAL_ROCK_BELOW,
    OFF_MAP_HEIGHT,
};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Configuration for hill-algorithm terrain synthesis.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HillParams {
    pub rows: usize,
    pub cols: usize,
    /// Number of additive hill passes.
    pub num_hills: usize,
    /// Hill radius range, in grid cells.
    pub radius_min: i32,
    pub radius_max: i32,
    /// Peak height range, in raw grid units (grid is clamped to 1.0).
    pub height_min: f32,
    pub height_max: f32,
    /// Horizontal world size the unit grid is stretched to.
    pub scalar: f32,
    /// Vertical world scale applied to raw heights.
    pub scalar_y: f32,
    /// RNG seed; the same seed reproduces the same terrain.
    pub seed: u64,
}

impl Default for HillParams {
    fn default() -> Self {
        Self {
            rows: 100,
            cols: 100,
            num_hills: 200,
            radius_min: 0,
            radius_max: 20,
            height_min: 0.01,
            height_max: 0.6,
            scalar: 300.0,
            scalar_y: 50.0,
            seed: 42,
        }
    }
}

/// Immutable heightfield: raw heights in `[0, 1]` plus a material grid,
/// both `rows * cols`, queried in world space.
#[derive(Clone, Debug)]
pub struct Heightfield {
    pub rows: usize,
    pub cols: usize,
    /// Horizontal world size of the field.
    pub scalar: f32,
    /// Vertical world scale.
    pub scalar_y: f32,
    /// World-space origin of the field center.
    pub position: Vec3,
    /// Raw heights, row-major (`r * cols + c`).
    pub heights: Vec<f32>,
    /// Material blend per cell: -1 bouncy, 0 grass, +1 rock.
    pub materials: Vec<f32>,
}

impl Heightfield {
    /// Generate terrain from hill parameters. Deterministic for a given seed.
    pub fn generate(params: &HillParams) -> Self {
        debug_assert!(params.rows >= 2 && params.cols >= 2);

        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        let mut heights = vec![0.0f32; params.rows * params.cols];

        for _ in 0..params.num_hills {
            let center_r = rng.gen_range(0..params.rows as i32);
            let center_c = rng.gen_range(0..params.cols as i32);
            let rad = rng.gen_range(params.radius_min..=params.radius_max);
            let hill_h = rng.gen_range(params.height_min..=params.height_max);

            if rad <= 0 {
                continue;
            }
            let rad_sq = (rad * rad) as f32;

            // Square bounding box around the center; cells outside the grid
            // are skipped (hills clip at the border, no wraparound).
            for r in (center_r - rad)..(center_r + rad) {
                for c in (center_c - rad)..(center_c + rad) {
                    if r < 0 || r >= params.rows as i32 || c < 0 || c >= params.cols as i32 {
                        continue;
                    }
                    let dx = (center_c - c) as f32;
                    let dy = (center_r - r) as f32;
                    // Flattened paraboloid bump; /5 tames the peaks.
                    let h_val = (rad_sq - dx * dx - dy * dy) / 5.0;
                    if h_val > 0.0 {
                        let idx = r as usize * params.cols + c as usize;
                        heights[idx] = (heights[idx] + hill_h * h_val / rad_sq).min(1.0);
                    }
                }
            }
        }

        log::info!(
            "generated {}x{} heightfield ({} hills, seed {})",
            params.rows,
            params.cols,
            params.num_hills,
            params.seed
        );

        Self::from_heights(
            params.rows,
            params.cols,
            params.scalar,
            params.scalar_y,
            heights,
        )
    }

    /// Build a field from an explicit height grid, deriving the material
    /// grid by thresholding then 3x3 smoothing.
    pub fn from_heights(
        rows: usize,
        cols: usize,
        scalar: f32,
        scalar_y: f32,
        heights: Vec<f32>,
    ) -> Self {
        debug_assert!(rows >= 2 && cols >= 2);
        debug_assert_eq!(heights.len(), rows * cols);

        let materials = classify_materials(rows, cols, &heights);

        Self {
            rows,
            cols,
            scalar,
            scalar_y,
            position: Vec3::ZERO,
            heights,
            materials,
        }
    }

    #[inline]
    fn idx(&self, r: usize, c: usize) -> usize {
        r * self.cols + c
    }

    /// Map world XZ into normalized UV over the field, or None when off map.
    fn world_to_uv(&self, world_x: f32, world_z: f32) -> Option<(f32, f32)> {
        let u = (world_x - self.position.x) / self.scalar + 0.5;
        let v = (world_z - self.position.z) / self.scalar + 0.5;
        if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
            return None;
        }
        Some((u, v))
    }

    /// Bilinear sample of a row-major grid at fractional indices.
    fn bilinear(&self, grid: &[f32], u: f32, v: f32) -> f32 {
        let r_f = v * (self.rows - 1) as f32;
        let c_f = u * (self.cols - 1) as f32;

        let r = (r_f as usize).min(self.rows - 2);
        let c = (c_f as usize).min(self.cols - 2);

        let fu = (c_f - c as f32).clamp(0.0, 1.0);
        let fv = (r_f - r as f32).clamp(0.0, 1.0);

        let g00 = grid[self.idx(r, c)];
        let g01 = grid[self.idx(r, c + 1)];
        let g10 = grid[self.idx(r + 1, c)];
        let g11 = grid[self.idx(r + 1, c + 1)];

        let top = g00 * (1.0 - fu) + g01 * fu;
        let bot = g10 * (1.0 - fu) + g11 * fu;
        top * (1.0 - fv) + bot * fv
    }

    /// World-space terrain height at (x, z). Off-map queries return
    /// [`OFF_MAP_HEIGHT`], far below any valid surface.
    pub fn height_at(&self, world_x: f32, world_z: f32) -> f32 {
        match self.world_to_uv(world_x, world_z) {
            Some((u, v)) => self.bilinear(&self.heights, u, v) * self.scalar_y + self.position.y,
            None => OFF_MAP_HEIGHT,
        }
    }

    /// Unit surface normal at (x, z) via central finite differences.
    /// Off-map queries return straight up.
    pub fn normal_at(&self, world_x: f32, world_z: f32) -> Vec3 {
        // Central differences need an interior cell in both axes; grids
        // smaller than 3x3 are treated as flat.
        if self.rows < 3 || self.cols < 3 {
            return Vec3::Y;
        }

        let local_x = (world_x - self.position.x) / self.scalar;
        let local_z = (world_z - self.position.z) / self.scalar;

        let r = (((local_z + 0.5) * (self.rows - 1) as f32) as i64)
            .clamp(1, self.rows as i64 - 2) as usize;
        let c = (((local_x + 0.5) * (self.cols - 1) as f32) as i64)
            .clamp(1, self.cols as i64 - 2) as usize;

        let h_left = self.heights[self.idx(r, c - 1)];
        let h_right = self.heights[self.idx(r, c + 1)];
        let h_down = self.heights[self.idx(r - 1, c)];
        let h_up = self.heights[self.idx(r + 1, c)];

        // One grid step in world units.
        let unit_step = self.scalar / (self.cols - 1) as f32;

        let tangent_x = Vec3::new(2.0 * unit_step, (h_right - h_left) * self.scalar_y, 0.0);
        let tangent_z = Vec3::new(0.0, (h_up - h_down) * self.scalar_y, 2.0 * unit_step);

        tangent_z.cross(tangent_x).normalize()
    }

    /// Material blend at (x, z): -1 bouncy, 0 grass, +1 rock, continuous
    /// in between. Off-map queries default to grass.
    pub fn material_at(&self, world_x: f32, world_z: f32) -> f32 {
        match self.world_to_uv(world_x, world_z) {
            Some((u, v)) => self.bilinear(&self.materials, u, v),
            None => MATERIAL_GRASS,
        }
    }
}

/// Threshold heights into material classes, then run one 3x3 unweighted
/// average over the interior so material reads as a continuous blend.
/// Border cells keep their raw classification.
fn classify_materials(rows: usize, cols: usize, heights: &[f32]) -> Vec<f32> {
    let raw: Vec<f32> = heights
        .iter()
        .map(|&h| {
            if h < MATERIAL_BOUNCY_BELOW {
                MATERIAL_BOUNCY
            } else if h < MATERIAL_ROCK_BELOW {
                MATERIAL_ROCK
            } else {
                MATERIAL_GRASS
            }
        })
        .collect();

    let mut smoothed = raw.clone();
    for r in 1..rows - 1 {
        for c in 1..cols - 1 {
            let mut sum = 0.0;
            for dr in -1i32..=1 {
                for dc in -1i32..=1 {
                    sum += raw[(r as i32 + dr) as usize * cols + (c as i32 + dc) as usize];
                }
            }
            smoothed[r * cols + c] = sum / 9.0;
        }
    }
    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_deterministic() {
        let params = HillParams {
            rows: 32,
            cols: 32,
            num_hills: 20,
            ..Default::default()
        };
        let a = Heightfield::generate(&params);
        let b = Heightfield::generate(&params);
        assert_eq!(a.heights, b.heights);
        assert_eq!(a.materials, b.materials);
    }

    #[test]
    fn test_heights_bounded() {
        let field = Heightfield::generate(&HillParams::default());
        for &h in &field.heights {
            assert!((0.0..=1.0).contains(&h), "raw height out of range: {h}");
        }
    }

    #[test]
    fn test_off_map_sentinel() {
        let field = Heightfield::generate(&HillParams::default());
        let h = field.height_at(field.scalar, 0.0);
        assert_eq!(h, OFF_MAP_HEIGHT);
        assert_eq!(field.material_at(field.scalar, 0.0), MATERIAL_GRASS);
    }

    #[test]
    fn test_minimal_grid_queries() {
        // 2x2 is the smallest valid grid; height interpolates, normals
        // degrade to flat instead of indexing out of range.
        let field = Heightfield::from_heights(2, 2, 10.0, 5.0, vec![0.0, 0.0, 1.0, 1.0]);
        let h = field.height_at(0.0, 0.0);
        assert!((h - 2.5).abs() < 1e-5);
        assert_eq!(field.normal_at(0.0, 0.0), Vec3::Y);
    }

    #[test]
    fn test_fixed_hill_height_config() {
        // height_min == height_max means "every hill the same height" and
        // must generate, not panic.
        let field = Heightfield::generate(&HillParams {
            rows: 16,
            cols: 16,
            num_hills: 10,
            height_min: 0.3,
            height_max: 0.3,
            ..Default::default()
        });
        assert!(field.heights.iter().any(|&h| h > 0.0));
    }

    #[test]
    fn test_flat_field_height_and_normal() {
        let field = Heightfield::from_heights(8, 8, 100.0, 10.0, vec![0.25; 64]);
        let h = field.height_at(3.0, -7.0);
        assert!((h - 2.5).abs() < 1e-5);
        let n = field.normal_at(3.0, -7.0);
        assert!((n - Vec3::Y).length() < 1e-5);
    }
}
