use bitvec::prelude::*;
use num_traits::PrimInt;
use std::fmt::Debug;

use crate::{Error, Result};

/// Occupancy bitmap over every cell of a [Grid], indexed by encoded position.
pub type CellMap = BitVec<u8, Msb0>;

/// A square grid whose cells are addressed by a single integer `x * side_len + y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    side_len: usize,
}

impl Grid {
    pub fn new(side_len: usize) -> Result<Self> {
        if side_len == 0 {
            return Err(Error::InvalidArgument(
                "grid side length must be positive".to_string(),
            ));
        }
        Ok(Self { side_len })
    }

    /// Like [Grid::new], but for any host integer type. Negative side lengths are rejected.
    pub fn from_side_len<T: PrimInt + Debug>(side_len: T) -> Result<Self> {
        match side_len.to_usize() {
            Some(side_len) => Self::new(side_len),
            None => Err(Error::InvalidArgument(format!(
                "grid side length must be positive, got {:?}",
                side_len
            ))),
        }
    }

    pub fn side_len(&self) -> usize {
        self.side_len
    }

    /// Number of cells, or [None] if it does not fit in a `usize`.
    pub fn cells(&self) -> Option<usize> {
        self.side_len.checked_mul(self.side_len)
    }

    pub fn contains(&self, position: usize) -> bool {
        self.cells().map_or(true, |cells| position < cells)
    }

    /// Split a position into its `[x, y]` coordinate.
    ///
    /// Positions outside the grid decode to coordinates with `x >= side_len`.
    pub fn decode(&self, position: usize) -> [usize; 2] {
        [position / self.side_len, position % self.side_len]
    }

    pub fn encode(&self, [x, y]: [usize; 2]) -> Option<usize> {
        if x >= self.side_len || y >= self.side_len {
            return None;
        }
        x.checked_mul(self.side_len)?.checked_add(y)
    }

    /// Rectilinear distance between two encoded positions.
    pub fn manhattan_distance(&self, a: usize, b: usize) -> u64 {
        let [ax, ay] = self.decode(a);
        let [bx, by] = self.decode(b);
        (ax.abs_diff(bx) + ay.abs_diff(by)) as u64
    }

    /// Convert host integers into positions, checking each one lies on the grid.
    pub fn positions<T: PrimInt + Debug>(&self, points: &[T]) -> Result<Vec<usize>> {
        points
            .iter()
            .map(|point| {
                point
                    .to_usize()
                    .filter(|position| self.contains(*position))
                    .ok_or_else(|| self.out_of_range(format!("{:?}", point)))
            })
            .collect()
    }

    /// Mark the given coordinates in a fresh bitmap covering the whole grid.
    pub fn occupancy(&self, coordinates: &[[usize; 2]]) -> Result<CellMap> {
        let cells = self.cells().ok_or_else(|| {
            Error::InvalidArgument(format!(
                "grid with side length {} is too large for a cell map",
                self.side_len
            ))
        })?;
        let mut map = bitvec![u8, Msb0; 0; cells];
        for coordinate in coordinates {
            let position = self
                .encode(*coordinate)
                .ok_or_else(|| self.out_of_range(format!("{:?}", coordinate)))?;
            map.set(position, true);
        }
        Ok(map)
    }

    fn out_of_range(&self, position: String) -> Error {
        Error::OutOfRange {
            position,
            cells: self.cells().unwrap_or(usize::MAX),
        }
    }
}
