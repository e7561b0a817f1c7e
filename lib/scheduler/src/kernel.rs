//! The kernel contract implemented by each pluggable compute kernel
//! (Mandelbrot, Life, ...) and driven by the [`crate::executor`] variants.
//!
//! Every kernel writes its pixel result into the `next` buffer and reads
//! only from `current`; the harness always swaps the buffers once a
//! generation's tiles have all completed. A kernel that computes each
//! pixel independently of its neighbors (Mandelbrot) gets exactly the same
//! observable image from this uniform write-then-swap protocol as it
//! would from writing `current` in place and skipping the swap.

use crate::tile::RowSpan;

/// A pluggable compute kernel. Implementations are shared across worker
/// threads (`Send + Sync`); any kernel-private mutable state (e.g.
/// Mandelbrot's zoom window) must use interior mutability.
pub trait Kernel: Send + Sync {
    fn name(&self) -> &'static str;

    /// One-time setup once the grid dimension is known.
    fn init(&mut self, _dim: usize) {}

    /// Seed the initial image. `arg` is the `--arg` CLI payload, if any.
    fn draw(&mut self, current: &mut [u32], dim: usize, arg: Option<&str>);

    /// Whether this kernel supports a first-touch warm-up pass.
    fn supports_first_touch(&self) -> bool {
        false
    }

    /// First-touch warm-up: write (not necessarily meaningfully) to the
    /// region's rows, from the thread that will own them during compute.
    fn first_touch(&self, _rows: &mut [RowSpan<'_>], _dim: usize) {}

    /// Compute one tile/row region for the current generation. Reads
    /// `current` (the full, unsplit buffer), writes the disjoint `rows`.
    /// Returns whether any pixel in the region changed value (used for
    /// stabilization tracking).
    fn compute_tile(&self, current: &[u32], rows: &mut [RowSpan<'_>], dim: usize) -> bool;

    /// Called once per generation, after the buffer swap, before the next
    /// generation's `compute_tile` calls begin. Mandelbrot narrows its
    /// zoom window here; Life is a no-op.
    fn post_generation(&self, _generation: u64) {}

    fn finalize(&mut self) {}
}
