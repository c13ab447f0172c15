// src/engine/grid.rs
//! Grid geometry, random seeding, and the double-buffer index.
//!
//! Cells are one byte each, `0` dead or `255` alive, laid out row-major so
//! they can be uploaded to the GPU textures without conversion. The grid is
//! toroidal, but wraparound lives entirely in the sampler configuration on
//! the GPU side; nothing here needs to know about it.

use rand::Rng;

pub const ALIVE: u8 = 255;
pub const DEAD: u8 = 0;

/// Grid dimensions in cells, derived from the surface size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    /// Derive grid dimensions from a surface size: `ceil(surface / cell)`,
    /// clamped to at least one cell per axis.
    pub fn from_surface(surface_width: u32, surface_height: u32, cell_size: u32) -> Self {
        debug_assert!(cell_size > 0);
        Self {
            width: surface_width.div_ceil(cell_size).max(1),
            height: surface_height.div_ceil(cell_size).max(1),
        }
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Produce a fresh random field with roughly `density` of cells alive.
pub fn seed_cells(size: GridSize, density: f32, rng: &mut impl Rng) -> Vec<u8> {
    (0..size.cell_count())
        .map(|_| if rng.random::<f32>() < density { ALIVE } else { DEAD })
        .collect()
}

/// Index into the texture pair: which of the two buffers is "current".
///
/// The non-current buffer is always the write target of the next compute
/// pass; the swap happens once, after a completed pass.
#[derive(Debug, Default)]
pub struct PingPong {
    current: usize,
}

impl PingPong {
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn next(&self) -> usize {
        1 - self.current
    }

    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn grid_matches_surface_dimensions() {
        let grid = GridSize::from_surface(800, 600, 6);
        assert_eq!(grid, GridSize { width: 134, height: 100 });

        // Exact multiples need no rounding up
        let grid = GridSize::from_surface(600, 300, 6);
        assert_eq!(grid, GridSize { width: 100, height: 50 });
    }

    #[test]
    fn grid_never_collapses_below_one_cell() {
        let grid = GridSize::from_surface(0, 0, 6);
        assert_eq!(grid, GridSize { width: 1, height: 1 });

        let grid = GridSize::from_surface(5, 3, 6);
        assert_eq!(grid, GridSize { width: 1, height: 1 });
    }

    #[test]
    fn seeding_hits_the_requested_density() {
        let grid = GridSize::from_surface(800, 600, 6);
        for seed in 0..5u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let cells = seed_cells(grid, 0.2, &mut rng);
            assert_eq!(cells.len(), grid.cell_count());
            assert!(cells.iter().all(|&c| c == ALIVE || c == DEAD));

            let alive = cells.iter().filter(|&&c| c == ALIVE).count() as f32;
            let density = alive / cells.len() as f32;
            assert!(
                (density - 0.2).abs() < 0.05,
                "seed {seed}: density {density} too far from 0.2"
            );
        }
    }

    #[test]
    fn buffer_index_strictly_alternates() {
        let mut buffers = PingPong::default();
        assert_eq!(buffers.current(), 0);
        for _ in 0..8 {
            let before = buffers.current();
            assert_eq!(buffers.next(), 1 - before);
            buffers.swap();
            assert_ne!(buffers.current(), before);
        }
        buffers.reset();
        assert_eq!(buffers.current(), 0);
    }
}
