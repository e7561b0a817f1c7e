//! Tile decomposition of a `DIM x DIM` grid into `GRAIN x GRAIN` tiles.

use crate::error::HarnessError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub i: usize,
    pub j: usize,
    pub y_start: usize,
    pub y_end: usize,
    pub x_start: usize,
    pub x_end: usize,
}

pub struct TileDispatcher {
    dim: usize,
    grain: usize,
    tranche: usize,
}

impl TileDispatcher {
    pub fn new(dim: usize, grain: usize) -> Result<Self, HarnessError> {
        if grain == 0 || dim % grain != 0 {
            return Err(HarnessError::config(format!(
                "grid size {dim} is not divisible by grain {grain}"
            )));
        }
        Ok(Self {
            dim,
            grain,
            tranche: dim / grain,
        })
    }

    /// Also require that each tile's side be divisible by `lane_width`, for
    /// vectorized kernels.
    pub fn with_lane_width(dim: usize, grain: usize, lane_width: usize) -> Result<Self, HarnessError> {
        let dispatcher = Self::new(dim, grain)?;
        if lane_width != 0 && dispatcher.tranche % lane_width != 0 {
            return Err(HarnessError::config(format!(
                "tile side {} is not divisible by SIMD lane width {lane_width}",
                dispatcher.tranche
            )));
        }
        Ok(dispatcher)
    }

    pub fn grain(&self) -> usize {
        self.grain
    }

    pub fn tranche(&self) -> usize {
        self.tranche
    }

    pub fn num_tiles(&self) -> usize {
        self.grain * self.grain
    }

    pub fn tile_at(&self, i: usize, j: usize) -> Tile {
        let t = self.tranche;
        Tile {
            i,
            j,
            y_start: i * t,
            y_end: (i + 1) * t,
            x_start: j * t,
            x_end: (j + 1) * t,
        }
    }

    /// Decode a tile-work-item index `k` in `[0, GRAIN^2)` to `(i, j)`.
    pub fn tile_from_index(&self, k: usize) -> Tile {
        self.tile_at(k / self.grain, k % self.grain)
    }

    pub fn iter(&self) -> impl Iterator<Item = Tile> + '_ {
        (0..self.grain).flat_map(move |i| (0..self.grain).map(move |j| self.tile_at(i, j)))
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Split a `next` buffer of `dim * dim` pixels into `dim` disjoint
    /// mutable full-width row spans, safely (used by the row-granularity
    /// executors).
    pub fn split_rows_mut(next: &mut [u32], dim: usize) -> Vec<RowSpan<'_>> {
        next.chunks_mut(dim)
            .enumerate()
            .map(|(y, cells)| RowSpan {
                y,
                x_start: 0,
                cells,
            })
            .collect()
    }

    /// Split a `next` buffer into `grain * grain` disjoint mutable tile
    /// regions, in the same row-major `(i, j)` order as [`TileDispatcher::iter`].
    /// Achieved purely with safe, chained `chunks_mut`/`split_at_mut` calls:
    /// no two returned tiles ever alias.
    pub fn split_tiles_mut(next: &mut [u32], dim: usize, grain: usize) -> Vec<TileMut<'_>> {
        let tranche = dim / grain;

        let row_col_pieces: Vec<Vec<&mut [u32]>> = next
            .chunks_mut(dim)
            .map(|row| {
                let mut pieces = Vec::with_capacity(grain);
                let mut rest = row;
                for _ in 0..grain {
                    let (piece, remainder) = rest.split_at_mut(tranche);
                    pieces.push(piece);
                    rest = remainder;
                }
                pieces
            })
            .collect();

        let mut row_iter = row_col_pieces.into_iter().enumerate();
        let mut tiles = Vec::with_capacity(grain * grain);

        for i in 0..grain {
            let mut columns: Vec<Vec<RowSpan<'_>>> = (0..grain).map(|_| Vec::with_capacity(tranche)).collect();
            for _ in 0..tranche {
                let (y, row_pieces) = row_iter.next().expect("row count matches dim");
                for (j, piece) in row_pieces.into_iter().enumerate() {
                    columns[j].push(RowSpan {
                        y,
                        x_start: j * tranche,
                        cells: piece,
                    });
                }
            }
            for (j, rows) in columns.into_iter().enumerate() {
                tiles.push(TileMut {
                    tile: Tile {
                        i,
                        j,
                        y_start: i * tranche,
                        y_end: (i + 1) * tranche,
                        x_start: j * tranche,
                        x_end: (j + 1) * tranche,
                    },
                    rows,
                });
            }
        }

        tiles
    }
}

/// A contiguous, disjoint, mutable slice of one grid row, at absolute
/// position `(y, x_start..x_start + cells.len())`.
pub struct RowSpan<'a> {
    pub y: usize,
    pub x_start: usize,
    pub cells: &'a mut [u32],
}

/// A tile's disjoint mutable region of `next`: `tranche` row spans, each
/// `tranche` pixels wide.
pub struct TileMut<'a> {
    pub tile: Tile,
    pub rows: Vec<RowSpan<'a>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_dividing_grain() {
        assert!(TileDispatcher::new(10, 3).is_err());
    }

    #[test]
    fn exhaustive_and_disjoint_coverage() {
        let dim = 16;
        let d = TileDispatcher::new(dim, 4).unwrap();
        let mut covered = vec![false; dim * dim];
        for tile in d.iter() {
            for y in tile.y_start..tile.y_end {
                for x in tile.x_start..tile.x_end {
                    let idx = y * dim + x;
                    assert!(!covered[idx], "pixel ({y},{x}) covered twice");
                    covered[idx] = true;
                }
            }
        }
        assert!(covered.iter().all(|&c| c));
    }

    #[test]
    fn lane_width_validation() {
        assert!(TileDispatcher::with_lane_width(64, 8, 8).is_ok());
        assert!(TileDispatcher::with_lane_width(64, 8, 16).is_err());
    }

    #[test]
    fn split_tiles_mut_covers_each_pixel_once() {
        let dim = 16;
        let grain = 4;
        let mut next = vec![0u32; dim * dim];
        let tiles = TileDispatcher::split_tiles_mut(&mut next, dim, grain);
        assert_eq!(tiles.len(), grain * grain);

        for t in tiles {
            for row in t.rows {
                for v in row.cells {
                    *v += 1;
                }
            }
        }
        assert!(next.iter().all(|&v| v == 1));
    }
}
