//! Conway's Life kernel: classic B3/S23 rule over 8 neighbors. Edge pixels
//! (the outermost ring of the grid) are never updated, matching the
//! original's boundary handling, and are seeded dead by every draw pattern.

use rand::Rng;
use scheduler::{Kernel, RowSpan};

const ALIVE: u32 = 0xFFFF00FF;
const DEAD: u32 = 0x00000000;

fn is_alive(px: u32) -> bool {
    px != DEAD
}

fn count_neighbors(current: &[u32], dim: usize, y: usize, x: usize) -> u32 {
    let mut n = 0;
    for dy in [-1i64, 0, 1] {
        for dx in [-1i64, 0, 1] {
            if dy == 0 && dx == 0 {
                continue;
            }
            let ny = y as i64 + dy;
            let nx = x as i64 + dx;
            if ny < 0 || nx < 0 || ny as usize >= dim || nx as usize >= dim {
                continue;
            }
            if is_alive(current[ny as usize * dim + nx as usize]) {
                n += 1;
            }
        }
    }
    n
}

fn next_state(current: &[u32], dim: usize, y: usize, x: usize) -> u32 {
    let n = count_neighbors(current, dim, y, x);
    let alive = is_alive(current[y * dim + x]);
    if alive && (n == 2 || n == 3) {
        ALIVE
    } else if !alive && n == 3 {
        ALIVE
    } else {
        DEAD
    }
}

pub struct Life {
    pattern: String,
}

impl Life {
    pub fn new() -> Self {
        Self {
            pattern: "guns".to_string(),
        }
    }
}

impl Default for Life {
    fn default() -> Self {
        Self::new()
    }
}

fn set(current: &mut [u32], dim: usize, y: usize, x: usize) {
    if y < dim && x < dim {
        current[y * dim + x] = ALIVE;
    }
}

fn draw_blinker(current: &mut [u32], dim: usize) {
    let mid = dim / 2;
    set(current, dim, mid, mid - 1);
    set(current, dim, mid, mid);
    set(current, dim, mid, mid + 1);
}

fn draw_stable(current: &mut [u32], dim: usize) {
    // A 2x2 block: stable under B3/S23 for all generations.
    let mid = dim / 2;
    set(current, dim, mid, mid);
    set(current, dim, mid, mid + 1);
    set(current, dim, mid + 1, mid);
    set(current, dim, mid + 1, mid + 1);
}

fn draw_random(current: &mut [u32], dim: usize) {
    let mut rng = rand::thread_rng();
    for y in 1..dim.saturating_sub(1) {
        for x in 1..dim.saturating_sub(1) {
            if rng.gen_bool(0.2) {
                set(current, dim, y, x);
            }
        }
    }
}

fn draw_clown(current: &mut [u32], dim: usize) {
    // A small glider-like seed, offset from center.
    let (cy, cx) = (dim / 3, dim / 3);
    let cells = [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)];
    for (dy, dx) in cells {
        set(current, dim, cy + dy, cx + dx);
    }
}

fn draw_diehard(current: &mut [u32], dim: usize) {
    let (cy, cx) = (dim / 2, dim / 2);
    let cells: [(i64, i64); 7] = [
        (0, 6),
        (1, 0),
        (1, 1),
        (2, 1),
        (2, 5),
        (2, 6),
        (2, 7),
    ];
    for (dy, dx) in cells {
        let y = (cy as i64 + dy).max(0) as usize;
        let x = (cx as i64 + dx).max(0) as usize;
        set(current, dim, y, x);
    }
}

fn draw_guns(current: &mut [u32], dim: usize) {
    // Gosper glider gun, anchored near the top-left, clipped to the grid.
    const GUN: &[(i64, i64)] = &[
        (0, 24),
        (1, 22),
        (1, 24),
        (2, 12),
        (2, 13),
        (2, 20),
        (2, 21),
        (2, 34),
        (2, 35),
        (3, 11),
        (3, 15),
        (3, 20),
        (3, 21),
        (3, 34),
        (3, 35),
        (4, 0),
        (4, 1),
        (4, 10),
        (4, 16),
        (4, 20),
        (4, 21),
        (5, 0),
        (5, 1),
        (5, 10),
        (5, 14),
        (5, 16),
        (5, 17),
        (5, 22),
        (5, 24),
        (6, 10),
        (6, 16),
        (6, 24),
        (7, 11),
        (7, 15),
        (8, 12),
        (8, 13),
    ];
    for &(dy, dx) in GUN {
        let y = dy as usize + 1;
        let x = dx as usize + 1;
        set(current, dim, y, x);
    }
}

impl Kernel for Life {
    fn name(&self) -> &'static str {
        "life"
    }

    fn init(&mut self, _dim: usize) {}

    fn draw(&mut self, current: &mut [u32], dim: usize, arg: Option<&str>) {
        let pattern = arg.unwrap_or(self.pattern.as_str());
        for c in current.iter_mut() {
            *c = DEAD;
        }
        match pattern {
            "stable" => draw_stable(current, dim),
            "random" => draw_random(current, dim),
            "clown" => draw_clown(current, dim),
            "diehard" => draw_diehard(current, dim),
            "blinker" => draw_blinker(current, dim),
            _ => draw_guns(current, dim),
        }
        self.pattern = pattern.to_string();
    }

    fn compute_tile(&self, current: &[u32], rows: &mut [RowSpan<'_>], dim: usize) -> bool {
        let mut changed = false;
        for row in rows {
            let y = row.y;
            if y == 0 || y == dim - 1 {
                continue;
            }
            for (k, cell) in row.cells.iter_mut().enumerate() {
                let x = row.x_start + k;
                if x == 0 || x == dim - 1 {
                    continue;
                }
                let new = next_state(current, dim, y, x);
                if new != current[y * dim + x] {
                    changed = true;
                }
                *cell = new;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scheduler::TileDispatcher;

    fn step(current: &[u32], dim: usize, grain: usize) -> (Vec<u32>, bool) {
        let life = Life::new();
        let mut next = current.to_vec();
        let mut changed = false;
        let mut tiles = TileDispatcher::split_tiles_mut(&mut next, dim, grain);
        for tile in &mut tiles {
            changed |= life.compute_tile(current, &mut tile.rows, dim);
        }
        drop(tiles);
        (next, changed)
    }

    #[test]
    fn blinker_oscillates_with_period_two() {
        let dim = 8;
        let mut gen0 = vec![DEAD; dim * dim];
        draw_blinker(&mut gen0, dim);

        let (gen1, changed1) = step(&gen0, dim, 1);
        assert!(changed1);
        let (gen2, changed2) = step(&gen1, dim, 1);
        assert!(changed2);
        assert_eq!(gen0, gen2);
    }

    #[test]
    fn stable_block_never_changes() {
        let dim = 8;
        let mut gen0 = vec![DEAD; dim * dim];
        draw_stable(&mut gen0, dim);

        let (gen1, changed) = step(&gen0, dim, 1);
        assert!(!changed);
        assert_eq!(gen0, gen1);
    }

    #[test]
    fn edge_pixels_are_never_updated() {
        let dim = 8;
        let mut gen0 = vec![ALIVE; dim * dim];
        let (gen1, _) = step(&gen0, dim, 1);
        for x in 0..dim {
            assert_eq!(gen1[x], ALIVE);
            assert_eq!(gen1[(dim - 1) * dim + x], ALIVE);
        }
        for y in 0..dim {
            assert_eq!(gen1[y * dim], ALIVE);
            assert_eq!(gen1[y * dim + dim - 1], ALIVE);
        }
        let _ = &mut gen0;
    }

    #[test]
    fn tiled_and_single_tile_agree() {
        let dim = 16;
        let mut life = Life::new();
        let mut gen0 = vec![DEAD; dim * dim];
        life.draw(&mut gen0, dim, Some("random"));

        let (single, _) = step(&gen0, dim, 1);
        let (tiled, _) = step(&gen0, dim, 4);
        assert_eq!(single, tiled);
    }
}
