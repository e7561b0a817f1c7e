//! The eight interchangeable ways to drive a kernel's [`compute_tile`](crate::kernel::Kernel::compute_tile)
//! across a generation: sequential, vectorized-sequential, static
//! block-threaded, cyclic-threaded, dynamic line, dynamic tiled,
//! parallel-for, and the custom worker-pool scheduler.
//!
//! All variants share one post-generation protocol: once every tile/row of
//! a generation has been computed into `next`, the grid is swapped and the
//! kernel's `post_generation` hook runs, single-threaded, before the next
//! generation begins. This keeps the swap-then-transform step a clean
//! sequential boundary regardless of how the generation's work was spread
//! across threads, satisfying the ordering guarantee that the transform
//! happens-before the next generation's reads of `current`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::distributor::Distributor;
use crate::error::HarnessError;
use crate::grid::Grid;
use crate::kernel::Kernel;
use crate::tile::{RowSpan, TileDispatcher};
use crate::worker_pool::{WorkerPool, ANY};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutorKind {
    Sequential,
    VectorizedSequential,
    BlockThreaded { threads: usize },
    CyclicThreaded { threads: usize },
    DynamicLine { threads: usize },
    DynamicTiled { threads: usize },
    ParallelFor { threads: usize },
    CustomScheduler { workers: usize, first_touch: bool },
}

impl ExecutorKind {
    /// The two-tier kernel-binding variant token for this executor.
    pub fn variant_name(self) -> &'static str {
        match self {
            ExecutorKind::Sequential => "seq",
            ExecutorKind::VectorizedSequential => "vec",
            ExecutorKind::BlockThreaded { .. } => "block",
            ExecutorKind::CyclicThreaded { .. } => "cyclic",
            ExecutorKind::DynamicLine { .. } => "line",
            ExecutorKind::DynamicTiled { .. } => "tiled",
            ExecutorKind::ParallelFor { .. } => "parfor",
            ExecutorKind::CustomScheduler { .. } => "sched",
        }
    }
}

pub struct Executor {
    kernel: Arc<dyn Kernel>,
    grid: Grid,
    dispatcher: TileDispatcher,
    kind: ExecutorKind,
    generation: u64,
    pool: Option<WorkerPool>,
}

impl Executor {
    pub fn new(
        kernel: Arc<dyn Kernel>,
        dim: usize,
        grain: usize,
        kind: ExecutorKind,
    ) -> Result<Self, HarnessError> {
        let dispatcher = TileDispatcher::new(dim, grain)?;
        let pool = match kind {
            ExecutorKind::CustomScheduler { workers, .. } => Some(WorkerPool::new(workers)?),
            _ => None,
        };
        Ok(Self {
            kernel,
            grid: Grid::new(dim),
            dispatcher,
            kind,
            generation: 0,
            pool,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Run up to `nb_iter` generations. Returns `Some(generation)` (1-based,
    /// relative to this call) the moment a generation produces no change;
    /// returns `None` after running the full `nb_iter` generations without
    /// ever stabilizing.
    pub fn run(&mut self, nb_iter: u64) -> Option<u64> {
        for n in 1..=nb_iter {
            let changed = self.run_one_generation();
            self.generation += 1;
            self.kernel.post_generation(self.generation);
            if !changed {
                return Some(n);
            }
        }
        None
    }

    fn run_one_generation(&mut self) -> bool {
        let changed = match self.kind {
            ExecutorKind::Sequential | ExecutorKind::VectorizedSequential => self.run_sequential(),
            ExecutorKind::BlockThreaded { threads } => self.run_block(threads, false),
            ExecutorKind::CyclicThreaded { threads } => self.run_block(threads, true),
            ExecutorKind::DynamicLine { threads } => self.run_dynamic_line(threads),
            ExecutorKind::DynamicTiled { threads } => self.run_dynamic_tiled(threads),
            ExecutorKind::ParallelFor { threads } => self.run_parallel_for(threads),
            ExecutorKind::CustomScheduler { first_touch, .. } => {
                self.run_custom_scheduler(first_touch)
            }
        };
        self.grid.swap();
        changed
    }

    fn run_sequential(&mut self) -> bool {
        let dim = self.grid.dim();
        let grain = self.dispatcher.grain();
        let kernel = &self.kernel;
        let (current, next) = self.grid.split_mut();
        let mut changed = false;
        for mut tile in TileDispatcher::split_tiles_mut(next, dim, grain) {
            changed |= kernel.compute_tile(current, &mut tile.rows, dim);
        }
        changed
    }

    fn run_block(&mut self, threads: usize, cyclic: bool) -> bool {
        let dim = self.grid.dim();
        let kernel = &self.kernel;
        let (current, next) = self.grid.split_mut();
        let rows = TileDispatcher::split_rows_mut(next, dim);
        let changed = AtomicBool::new(false);

        let per_thread: Vec<Vec<RowSpan<'_>>> = if cyclic {
            let mut buckets: Vec<Vec<RowSpan<'_>>> = (0..threads).map(|_| Vec::new()).collect();
            for (m, row) in rows.into_iter().enumerate() {
                buckets[m % threads].push(row);
            }
            buckets
        } else {
            let base = dim / threads;
            let extra = dim % threads;
            let mut iter = rows.into_iter();
            (0..threads)
                .map(|t| {
                    let len = base + if t == threads - 1 { extra } else { 0 };
                    iter.by_ref().take(len).collect()
                })
                .collect()
        };

        std::thread::scope(|scope| {
            let changed = &changed;
            for mut worker_rows in per_thread {
                scope.spawn(move || {
                    if kernel.compute_tile(current, &mut worker_rows, dim) {
                        changed.store(true, Ordering::Relaxed);
                    }
                });
            }
        });

        changed.load(Ordering::Relaxed)
    }

    fn run_dynamic_line(&mut self, threads: usize) -> bool {
        let dim = self.grid.dim();
        let kernel = &self.kernel;
        let (current, next) = self.grid.split_mut();
        let rows = TileDispatcher::split_rows_mut(next, dim);
        let changed = AtomicBool::new(false);
        let generations_finalized = std::sync::atomic::AtomicUsize::new(0);

        let dist = Distributor::new(threads, dim, || {
            generations_finalized.fetch_add(1, Ordering::Relaxed);
        })
        .expect("dim rows and thread count are both > 0");

        let row_slots: Mutex<Vec<Option<RowSpan<'_>>>> =
            Mutex::new(rows.into_iter().map(Some).collect());

        std::thread::scope(|scope| {
            let dist = &dist;
            let changed = &changed;
            let row_slots = &row_slots;
            for _ in 0..threads {
                scope.spawn(move || {
                    while let Some(y) = dist.get() {
                        let mut row = row_slots.lock().unwrap()[y].take().expect("row taken once");
                        if kernel.compute_tile(current, std::slice::from_mut(&mut row), dim) {
                            changed.store(true, Ordering::Relaxed);
                        }
                    }
                });
            }
        });

        changed.load(Ordering::Relaxed)
    }

    fn run_dynamic_tiled(&mut self, threads: usize) -> bool {
        let dim = self.grid.dim();
        let grain = self.dispatcher.grain();
        let kernel = &self.kernel;
        let (current, next) = self.grid.split_mut();
        let tiles = TileDispatcher::split_tiles_mut(next, dim, grain);
        let changed = AtomicBool::new(false);
        let generations_finalized = std::sync::atomic::AtomicUsize::new(0);

        let dist = Distributor::new(threads, tiles.len(), || {
            generations_finalized.fetch_add(1, Ordering::Relaxed);
        })
        .expect("tile count and thread count are both > 0");

        let tile_slots: Mutex<Vec<Option<_>>> = Mutex::new(tiles.into_iter().map(Some).collect());

        std::thread::scope(|scope| {
            let dist = &dist;
            let changed = &changed;
            let tile_slots = &tile_slots;
            for _ in 0..threads {
                scope.spawn(move || {
                    while let Some(k) = dist.get() {
                        let mut tile = tile_slots.lock().unwrap()[k].take().expect("tile taken once");
                        if kernel.compute_tile(current, &mut tile.rows, dim) {
                            changed.store(true, Ordering::Relaxed);
                        }
                    }
                });
            }
        });

        changed.load(Ordering::Relaxed)
    }

    fn run_parallel_for(&mut self, threads: usize) -> bool {
        let dim = self.grid.dim();
        let grain = self.dispatcher.grain();
        let kernel = &self.kernel;
        let (current, next) = self.grid.split_mut();
        let tiles = TileDispatcher::split_tiles_mut(next, dim, grain);
        let changed = AtomicBool::new(false);

        let chunk = tiles.len().div_ceil(threads).max(1);
        std::thread::scope(|scope| {
            let changed = &changed;
            for chunk_of_tiles in chunk_vec(tiles, chunk) {
                scope.spawn(move || {
                    let mut chunk_of_tiles = chunk_of_tiles;
                    for tile in &mut chunk_of_tiles {
                        if kernel.compute_tile(current, &mut tile.rows, dim) {
                            changed.store(true, Ordering::Relaxed);
                        }
                    }
                });
            }
        });

        changed.load(Ordering::Relaxed)
    }

    /// Submits one task per tile to the long-lived [`WorkerPool`], then
    /// `task_wait()`s for the generation to drain. Because pool tasks must
    /// be `'static` (they may outlive this call on the pool's own
    /// threads, even though `task_wait` always blocks until they haven't),
    /// each task owns its data: a cloned read-only `current` snapshot and
    /// a shared, mutex-guarded `next` buffer that tasks write their
    /// disjoint tile region into before the mutex is released.
    fn run_custom_scheduler(&mut self, first_touch: bool) -> bool {
        let dim = self.grid.dim();
        let grain = self.dispatcher.grain();
        let kernel = self.kernel.clone();
        let pool = self.pool.as_ref().expect("custom-scheduler executor owns a pool");

        let current = Arc::new(self.grid.current().to_vec());
        let next = Arc::new(Mutex::new(vec![0u32; dim * dim]));
        let changed = Arc::new(AtomicBool::new(false));

        if first_touch && kernel.supports_first_touch() {
            for tile in self.dispatcher.iter() {
                let kernel = kernel.clone();
                let next = next.clone();
                pool.submit(ANY, move |_worker_id| {
                    let mut guard = next.lock().unwrap();
                    let mut rows = tile_rows(&mut guard, dim, tile.y_start, tile.y_end, tile.x_start, tile.x_end);
                    kernel.first_touch(&mut rows, dim);
                });
            }
            pool.task_wait();
        }

        for tile in self.dispatcher.iter() {
            let kernel = kernel.clone();
            let current = current.clone();
            let next = next.clone();
            let changed = changed.clone();
            pool.submit(ANY, move |_worker_id| {
                let mut guard = next.lock().unwrap();
                let mut rows = tile_rows(&mut guard, dim, tile.y_start, tile.y_end, tile.x_start, tile.x_end);
                if kernel.compute_tile(&current, &mut rows, dim) {
                    changed.store(true, Ordering::Relaxed);
                }
            });
        }
        pool.task_wait();

        *self.grid.next_mut() = Arc::try_unwrap(next)
            .expect("all tasks have completed")
            .into_inner()
            .unwrap();

        changed.load(Ordering::Relaxed)
    }
}

/// Build row spans for `[y_start, y_end) x [x_start, x_end)` out of a flat
/// `dim`-wide buffer, via safe chained `chunks_mut` slicing.
fn tile_rows(
    buf: &mut [u32],
    dim: usize,
    y_start: usize,
    y_end: usize,
    x_start: usize,
    x_end: usize,
) -> Vec<RowSpan<'_>> {
    buf[y_start * dim..y_end * dim]
        .chunks_mut(dim)
        .enumerate()
        .map(|(r, row)| RowSpan {
            y: y_start + r,
            x_start,
            cells: &mut row[x_start..x_end],
        })
        .collect()
}

fn chunk_vec<T>(mut v: Vec<T>, chunk: usize) -> Vec<Vec<T>> {
    let mut out = Vec::new();
    while !v.is_empty() {
        let take = chunk.min(v.len());
        let rest = v.split_off(take);
        out.push(v);
        v = rest;
    }
    out
}
