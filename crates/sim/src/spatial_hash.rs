//! Uniform spatial hash over the XZ plane for broad-phase obstacle queries.
//!
//! Built once from a static obstacle snapshot; queries concatenate the 3x3
//! cell neighborhood around a point. Any obstacle within `cell_size` of the
//! query point is guaranteed to appear in the candidate set, so narrow-phase
//! tests with a detection radius <= `cell_size` see no false negatives.

use glam::Vec3;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct SpatialHash {
    pub cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
    len: usize,
}

impl SpatialHash {
    /// Build from obstacle world positions. O(n) insertion.
    pub fn build(positions: &[Vec3], cell_size: f32) -> Self {
        debug_assert!(cell_size > 0.0);
        let inv_cell_size = 1.0 / cell_size;

        let mut cells: HashMap<(i32, i32), Vec<usize>> = HashMap::new();
        for (idx, pos) in positions.iter().enumerate() {
            let cx = (pos.x * inv_cell_size).floor() as i32;
            let cz = (pos.z * inv_cell_size).floor() as i32;
            cells.entry((cx, cz)).or_default().push(idx);
        }

        Self {
            cell_size,
            cells,
            len: positions.len(),
        }
    }

    /// Candidate indices from the 3x3 neighborhood centered on `point`,
    /// containing cell first.
    pub fn query_neighborhood(&self, point: Vec3) -> Vec<usize> {
        let inv_cell_size = 1.0 / self.cell_size;
        let cx = (point.x * inv_cell_size).floor() as i32;
        let cz = (point.z * inv_cell_size).floor() as i32;

        let mut candidates = Vec::new();
        if let Some(indices) = self.cells.get(&(cx, cz)) {
            candidates.extend_from_slice(indices);
        }
        for dx in -1i32..=1 {
            for dz in -1i32..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                if let Some(indices) = self.cells.get(&(cx + dx, cz + dz)) {
                    candidates.extend_from_slice(indices);
                }
            }
        }
        candidates
    }

    /// Number of indexed obstacles.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
