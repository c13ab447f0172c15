// src/engine/inject.rs
//! Pointer-driven pattern injection.
//!
//! Maps surface-pixel pointer positions onto grid cells and builds small
//! alive-cell stamps: a random glider while the pointer hovers, a noisy
//! explosion disc while it drags. Stamps are written into the *current*
//! buffer, so they show up on the next render and feed the next compute
//! pass.

use std::time::{Duration, Instant};

use rand::Rng;

use super::grid::{GridSize, ALIVE};
use super::PointerState;

/// The four rotations of a glider, as `(row, column)` offsets into a 3x3
/// stamp. Rows count from the top of the stamp.
const GLIDER_PATTERNS: [[(u32, u32); 5]; 4] = [
    [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)],
    [(0, 1), (1, 0), (2, 0), (2, 1), (2, 2)],
    [(0, 0), (0, 1), (0, 2), (1, 2), (2, 1)],
    [(0, 0), (0, 1), (0, 2), (1, 0), (2, 1)],
];

const GLIDER_SPAN: u32 = 3;

/// A rectangular block of cell bytes destined for the current buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub cells: Vec<u8>,
}

/// Which injection fires this frame, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spawn {
    Glider,
    Explosion,
}

/// Decide whether an injection is due. The two kinds are mutually
/// exclusive per frame and each is gated by its own interval. A pointer
/// that has never reported a position (the `(-1, -1)` sentinel) spawns
/// nothing.
pub fn due_spawn(
    pointer: &PointerState,
    now: Instant,
    last_glider: Instant,
    last_drag: Instant,
    glider_interval: Duration,
    drag_interval: Duration,
) -> Option<Spawn> {
    if !pointer.has_position() {
        return None;
    }
    if pointer.down {
        if now.duration_since(last_drag) > drag_interval {
            return Some(Spawn::Explosion);
        }
    } else if now.duration_since(last_glider) > glider_interval {
        return Some(Spawn::Glider);
    }
    None
}

/// Map a surface-pixel position to grid-cell coordinates. Grid row 0 is the
/// bottom of the screen, so the vertical axis flips. The result may lie
/// outside the grid; the patch builders clamp.
pub fn cell_under_pointer(px: f32, py: f32, cell_size: u32, grid: GridSize) -> (i64, i64) {
    let cx = (px / cell_size as f32).floor() as i64;
    let cy = grid.height as i64 - 1 - (py / cell_size as f32).floor() as i64;
    (cx, cy)
}

/// Build a glider stamp centered on `(cx, cy)`, choosing one of the four
/// rotations uniformly at random.
pub fn glider_patch(cx: i64, cy: i64, grid: GridSize, rng: &mut impl Rng) -> Patch {
    let choice = rng.random_range(0..GLIDER_PATTERNS.len());
    let cells = glider_cells(choice);
    place(cx - 1, cy - 1, GLIDER_SPAN, GLIDER_SPAN, cells.to_vec(), grid)
}

/// Build an explosion stamp centered on `(cx, cy)`: a disc of radius
/// `radius` where the probability of a cell being alive falls linearly
/// from 0.7 at the center to 0.2 at the rim.
pub fn explosion_patch(cx: i64, cy: i64, radius: u32, grid: GridSize, rng: &mut impl Rng) -> Patch {
    let r = radius as i64;
    let span = radius * 2 + 1;
    let mut cells = vec![0u8; (span * span) as usize];

    for dy in -r..=r {
        for dx in -r..=r {
            let dist = ((dx * dx + dy * dy) as f32).sqrt();
            if dist <= r as f32 && rng.random::<f32>() < 0.7 - (dist / r as f32) * 0.5 {
                // Row order flips: positive dy is up in grid space
                cells[((r - dy) * span as i64 + (dx + r)) as usize] = ALIVE;
            }
        }
    }

    place(cx - r, cy - r, span, span, cells, grid)
}

fn glider_cells(pattern: usize) -> [u8; 9] {
    let mut cells = [0u8; 9];
    for &(row, col) in &GLIDER_PATTERNS[pattern] {
        // Rows in the pattern table count from the top of the stamp; the
        // stamp itself is stored bottom row first like the grid.
        cells[((2 - row) * GLIDER_SPAN + col) as usize] = ALIVE;
    }
    cells
}

/// Clamp the stamp origin so the stamp stays inside the grid, cropping the
/// stamp itself when the grid is smaller than it is.
fn place(x: i64, y: i64, width: u32, height: u32, cells: Vec<u8>, grid: GridSize) -> Patch {
    let cropped_width = width.min(grid.width);
    let cropped_height = height.min(grid.height);
    let x = x.clamp(0, (grid.width - cropped_width) as i64) as u32;
    let y = y.clamp(0, (grid.height - cropped_height) as i64) as u32;

    if cropped_width == width && cropped_height == height {
        return Patch { x, y, width, height, cells };
    }

    let mut cropped = Vec::with_capacity((cropped_width * cropped_height) as usize);
    for row in 0..cropped_height {
        let start = (row * width) as usize;
        cropped.extend_from_slice(&cells[start..start + cropped_width as usize]);
    }
    Patch {
        x,
        y,
        width: cropped_width,
        height: cropped_height,
        cells: cropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const GLIDER_INTERVAL: Duration = Duration::from_millis(1000);
    const DRAG_INTERVAL: Duration = Duration::from_millis(100);

    fn grid() -> GridSize {
        GridSize { width: 134, height: 100 }
    }

    #[test]
    fn pointer_maps_to_cell_with_vertical_flip() {
        let grid = grid();
        assert_eq!(cell_under_pointer(0.0, 0.0, 6, grid), (0, 99));
        assert_eq!(cell_under_pointer(13.0, 595.0, 6, grid), (2, 0));
        // Positions past the surface edge land outside the grid
        assert_eq!(cell_under_pointer(900.0, 0.0, 6, grid).0, 150);
    }

    #[test]
    fn every_glider_rotation_has_five_live_cells() {
        for pattern in 0..4 {
            let cells = glider_cells(pattern);
            let alive = cells.iter().filter(|&&c| c == ALIVE).count();
            let dead = cells.iter().filter(|&&c| c == 0).count();
            assert_eq!(alive, 5, "pattern {pattern}");
            assert_eq!(dead, 4, "pattern {pattern}");
        }
    }

    #[test]
    fn glider_patch_is_clamped_at_grid_edges() {
        let grid = grid();
        let mut rng = StdRng::seed_from_u64(7);

        let patch = glider_patch(0, 0, grid, &mut rng);
        assert_eq!((patch.x, patch.y), (0, 0));
        assert_eq!((patch.width, patch.height), (3, 3));

        let patch = glider_patch(200, 200, grid, &mut rng);
        assert_eq!((patch.x, patch.y), (131, 97));
        assert_eq!(patch.cells.iter().filter(|&&c| c == ALIVE).count(), 5);
    }

    #[test]
    fn glider_patch_crops_on_a_tiny_grid() {
        let tiny = GridSize { width: 2, height: 1 };
        let mut rng = StdRng::seed_from_u64(3);
        let patch = glider_patch(0, 0, tiny, &mut rng);
        assert_eq!((patch.width, patch.height), (2, 1));
        assert_eq!(patch.cells.len(), 2);
    }

    #[test]
    fn explosion_stays_within_the_disc() {
        let grid = grid();
        let radius = 6u32;
        let mut rng = StdRng::seed_from_u64(42);
        let patch = explosion_patch(50, 50, radius, grid, &mut rng);

        let span = radius * 2 + 1;
        assert_eq!((patch.width, patch.height), (span, span));
        for (index, &cell) in patch.cells.iter().enumerate() {
            if cell != ALIVE {
                continue;
            }
            let dx = (index as i64 % span as i64) - radius as i64;
            let dy = (index as i64 / span as i64) - radius as i64;
            let dist = ((dx * dx + dy * dy) as f32).sqrt();
            assert!(dist <= radius as f32, "live cell outside the disc");
        }
        // With these odds some of the disc must be populated
        assert!(patch.cells.iter().any(|&c| c == ALIVE));
    }

    #[test]
    fn explosion_probability_falls_from_center_to_rim() {
        let grid = grid();
        let radius = 6u32;
        let span = radius * 2 + 1;
        // Patch row order puts the stamp center at (r, r); the four cells
        // on the axes at distance exactly r sit on the rim of the disc.
        let center = (radius * span + radius) as usize;
        let rim = [
            (radius * span) as usize,
            (radius * span + 2 * radius) as usize,
            radius as usize,
            (2 * radius * span + radius) as usize,
        ];

        let mut rng = StdRng::seed_from_u64(11);
        let draws = 2000;
        let mut center_alive = 0usize;
        let mut rim_alive = 0usize;
        for _ in 0..draws {
            let patch = explosion_patch(50, 50, radius, grid, &mut rng);
            if patch.cells[center] == ALIVE {
                center_alive += 1;
            }
            rim_alive += rim.iter().filter(|&&i| patch.cells[i] == ALIVE).count();
        }

        // Aliveness falls linearly from 0.7 at the center to 0.2 at the rim
        let center_rate = center_alive as f32 / draws as f32;
        let rim_rate = rim_alive as f32 / (draws * rim.len()) as f32;
        assert!(
            (center_rate - 0.7).abs() < 0.05,
            "center alive rate {center_rate}, expected about 0.7"
        );
        assert!(
            (rim_rate - 0.2).abs() < 0.05,
            "rim alive rate {rim_rate}, expected about 0.2"
        );
    }

    #[test]
    fn sentinel_pointer_spawns_nothing() {
        let now = Instant::now();
        let long_ago = now - Duration::from_secs(10);
        let pointer = PointerState { x: -1.0, y: -1.0, down: true };
        assert_eq!(
            due_spawn(&pointer, now, long_ago, long_ago, GLIDER_INTERVAL, DRAG_INTERVAL),
            None
        );

        let pointer = PointerState { x: -1.0, y: -1.0, down: false };
        assert_eq!(
            due_spawn(&pointer, now, long_ago, long_ago, GLIDER_INTERVAL, DRAG_INTERVAL),
            None
        );
    }

    #[test]
    fn spawn_kind_follows_button_state_and_intervals() {
        let now = Instant::now();
        let long_ago = now - Duration::from_secs(10);

        let dragging = PointerState { x: 10.0, y: 10.0, down: true };
        assert_eq!(
            due_spawn(&dragging, now, long_ago, long_ago, GLIDER_INTERVAL, DRAG_INTERVAL),
            Some(Spawn::Explosion)
        );
        // Drag interval not yet elapsed
        assert_eq!(
            due_spawn(&dragging, now, long_ago, now, GLIDER_INTERVAL, DRAG_INTERVAL),
            None
        );

        let hovering = PointerState { x: 10.0, y: 10.0, down: false };
        assert_eq!(
            due_spawn(&hovering, now, long_ago, long_ago, GLIDER_INTERVAL, DRAG_INTERVAL),
            Some(Spawn::Glider)
        );
        assert_eq!(
            due_spawn(&hovering, now, now, long_ago, GLIDER_INTERVAL, DRAG_INTERVAL),
            None
        );
    }
}
