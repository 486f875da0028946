//! Minimum spanning tree costs for points on a square grid under the Manhattan metric.
//!
//! Points are single integers `x * side_len + y`. [compute_mst_cost] is the entry point
//! for host callers; [steiner] searches for extra cells that make the tree over a fixed set of pins cheaper.

mod error;
/// Graph algorithms over the implicit complete graph of grid points
pub mod graph;
pub mod grid;
/// Choose [Steiner points](https://en.wikipedia.org/wiki/Rectilinear_Steiner_tree) with a genetic algorithm
pub mod steiner;

pub use error::{Error, Result};
pub use graph::mst::{compute_mst, compute_mst_cost, prim_cost};
pub use grid::{CellMap, Grid};
