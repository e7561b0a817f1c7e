//! The pluggable compute kernels: Mandelbrot-set zoom and Conway's Life,
//! plus the name-based registry the driver uses to bind a kernel at
//! startup.

pub mod life;
pub mod mandel;
pub mod registry;

pub use life::Life;
pub use mandel::{Mandelbrot, MandelbrotVec};
pub use registry::resolve;
