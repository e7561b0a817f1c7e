//! Mandelbrot-set zoom kernel: every pixel is computed independently of
//! its neighbors from an escape-time iteration, so it never stabilizes
//! and the per-generation transform narrows the complex-plane window.

use std::sync::RwLock;

use scheduler::{Kernel, RowSpan};

const MAX_ITERATIONS: u32 = 4096;
const ZOOM_SPEED: f64 = -0.01;

#[derive(Clone, Copy)]
struct Window {
    left_x: f64,
    right_x: f64,
    top_y: f64,
    bottom_y: f64,
    xstep: f64,
    ystep: f64,
    dim: usize,
}

impl Window {
    fn for_config(name: &str, dim: usize) -> Self {
        let (left_x, right_x, top_y, bottom_y) = match name {
            "config-1" => (-0.744, -0.7439, 0.146, 0.1459),
            "config-3" => (-0.13749, -0.13715, 0.64975, 0.64941),
            _ => (-0.2395, -0.2275, 0.660, 0.648),
        };
        let mut w = Window {
            left_x,
            right_x,
            top_y,
            bottom_y,
            xstep: 0.0,
            ystep: 0.0,
            dim,
        };
        w.recompute_steps();
        w
    }

    fn recompute_steps(&mut self) {
        self.xstep = (self.right_x - self.left_x) / self.dim as f64;
        self.ystep = (self.top_y - self.bottom_y) / self.dim as f64;
    }

    fn zoom(&mut self) {
        let xrange = self.right_x - self.left_x;
        let yrange = self.top_y - self.bottom_y;
        self.left_x += ZOOM_SPEED * xrange;
        self.right_x -= ZOOM_SPEED * xrange;
        self.top_y -= ZOOM_SPEED * yrange;
        self.bottom_y += ZOOM_SPEED * yrange;
        self.recompute_steps();
    }
}

fn iteration_to_color(iter: u32) -> u32 {
    let (mut r, mut g, b) = (0u32, 0u32, 0u32);

    if iter < MAX_ITERATIONS {
        if iter < 64 {
            r = iter * 2;
        } else if iter < 128 {
            r = ((iter - 64) * 128) / 126 + 128;
        } else if iter < 256 {
            r = ((iter - 128) * 62) / 127 + 193;
        } else if iter < 512 {
            r = 255;
            g = ((iter - 256) * 62) / 255 + 1;
        } else if iter < 1024 {
            r = 255;
            g = ((iter - 512) * 63) / 511 + 64;
        } else if iter < 2048 {
            r = 255;
            g = ((iter - 1024) * 63) / 1023 + 128;
        } else {
            r = 255;
            g = ((iter - 2048) * 63) / 2047 + 192;
        }
    }
    (r << 24) | (g << 16) | (b << 8) | 255
}

fn compute_one_pixel(win: &Window, y: usize, x: usize) -> u32 {
    let cr = win.left_x + win.xstep * x as f64;
    let ci = win.top_y - win.ystep * y as f64;
    let (mut zr, mut zi) = (0.0f64, 0.0f64);

    let mut iter = 0u32;
    while iter < MAX_ITERATIONS {
        let x2 = zr * zr;
        let y2 = zi * zi;
        if x2 + y2 > 4.0 {
            break;
        }
        let twoxy = 2.0 * zr * zi;
        zr = x2 - y2 + cr;
        zi = twoxy + ci;
        iter += 1;
    }
    iter
}

fn paint_row(win: &Window, row: &mut RowSpan<'_>) {
    for (k, cell) in row.cells.iter_mut().enumerate() {
        let x = row.x_start + k;
        *cell = iteration_to_color(compute_one_pixel(win, row.y, x));
    }
}

pub struct Mandelbrot {
    window: RwLock<Window>,
}

impl Mandelbrot {
    pub fn new() -> Self {
        Self {
            window: RwLock::new(Window::for_config("config-2", 1)),
        }
    }
}

impl Default for Mandelbrot {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for Mandelbrot {
    fn name(&self) -> &'static str {
        "mandel"
    }

    fn init(&mut self, dim: usize) {
        *self.window.get_mut().unwrap() = Window::for_config("config-2", dim);
    }

    fn draw(&mut self, _current: &mut [u32], dim: usize, arg: Option<&str>) {
        let config = arg.unwrap_or("config-2");
        *self.window.get_mut().unwrap() = Window::for_config(config, dim);
    }

    fn compute_tile(&self, _current: &[u32], rows: &mut [RowSpan<'_>], _dim: usize) -> bool {
        let win = *self.window.read().unwrap();
        for row in rows {
            paint_row(&win, row);
        }
        // Mandelbrot recomputes every pixel every generation; it never
        // reports stabilization.
        true
    }

    fn post_generation(&self, _generation: u64) {
        self.window.write().unwrap().zoom();
    }
}

/// The lane-width-vectorized variant. Shares Mandelbrot's window state and
/// math; the only difference is that a tile's row is processed in fixed
/// lane-width chunks, matching the shape of a SIMD loop without requiring
/// a nightly-only portable-SIMD dependency.
pub struct MandelbrotVec {
    inner: Mandelbrot,
    lanes: usize,
}

impl MandelbrotVec {
    pub fn new(lanes: usize) -> Self {
        Self {
            inner: Mandelbrot::new(),
            lanes,
        }
    }
}

impl Kernel for MandelbrotVec {
    fn name(&self) -> &'static str {
        "mandel"
    }

    fn init(&mut self, dim: usize) {
        self.inner.init(dim);
    }

    fn draw(&mut self, current: &mut [u32], dim: usize, arg: Option<&str>) {
        self.inner.draw(current, dim, arg);
    }

    fn compute_tile(&self, current: &[u32], rows: &mut [RowSpan<'_>], dim: usize) -> bool {
        let win = *self.inner.window.read().unwrap();
        for row in rows {
            let width = row.cells.len();
            let mut k = 0;
            while k < width {
                let lane_end = (k + self.lanes).min(width);
                for x in k..lane_end {
                    let abs_x = row.x_start + x;
                    row.cells[x] = iteration_to_color(compute_one_pixel(&win, row.y, abs_x));
                }
                k = lane_end;
            }
        }
        let _ = current;
        let _ = dim;
        true
    }

    fn post_generation(&self, generation: u64) {
        self.inner.post_generation(generation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scheduler::TileDispatcher;

    #[test]
    fn never_stabilizes_and_zooms_each_generation() {
        let mut k = Mandelbrot::new();
        k.init(16);
        let win_before = *k.window.read().unwrap();

        let mut next = vec![0u32; 16 * 16];
        let current = vec![0u32; 16 * 16];
        let mut tiles = TileDispatcher::split_tiles_mut(&mut next, 16, 2);
        for tile in &mut tiles {
            assert!(k.compute_tile(&current, &mut tile.rows, 16));
        }
        drop(tiles);

        k.post_generation(1);
        let win_after = *k.window.read().unwrap();
        assert!(win_after.right_x - win_after.left_x < win_before.right_x - win_before.left_x);
    }

    #[test]
    fn vectorized_and_scalar_agree() {
        let mut scalar = Mandelbrot::new();
        scalar.init(16);
        let mut vec_k = MandelbrotVec::new(4);
        vec_k.init(16);

        let current = vec![0u32; 16 * 16];
        let mut next_a = vec![0u32; 16 * 16];
        let mut next_b = vec![0u32; 16 * 16];

        for (next, kernel) in [(&mut next_a, &scalar as &dyn Kernel), (&mut next_b, &vec_k as &dyn Kernel)] {
            let mut tiles = TileDispatcher::split_tiles_mut(next, 16, 4);
            for tile in &mut tiles {
                kernel.compute_tile(&current, &mut tile.rows, 16);
            }
        }

        assert_eq!(next_a, next_b);
    }
}
