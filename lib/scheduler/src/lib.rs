//! The parallel stencil compute core: a double-buffered pixel grid, a tile
//! decomposition of it, eight interchangeable executors, a custom
//! CPU-pinned worker-pool scheduler, and the dynamic work distributor that
//! the line/tile dynamic executors share.

pub mod distributor;
pub mod error;
pub mod executor;
pub mod grid;
pub mod kernel;
pub mod tile;
pub mod worker_pool;

pub use distributor::Distributor;
pub use error::HarnessError;
pub use executor::{Executor, ExecutorKind};
pub use grid::Grid;
pub use kernel::Kernel;
pub use tile::{RowSpan, Tile, TileDispatcher, TileMut};
pub use worker_pool::{WorkerPool, ANY, WORK_QUEUE};
