use bitvec::prelude::*;
use num_traits::PrimInt;
use std::{cmp::Reverse, collections::BinaryHeap, fmt::Debug};
use tracing::debug;

use crate::{grid::Grid, Error, Result};

/// A candidate edge from the tree built so far to a point outside of it.
///
/// Ordered by weight first, so a min-heap of these always yields the cheapest way to grow the tree.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug)]
struct FrontierEntry {
    weight: u64,
    to: usize,
    from: Option<usize>,
}

/// Validate host input, then compute the rectilinear MST cost of the points.
///
/// Fails with [Error::InvalidArgument] for a non-positive side length or no points,
/// and with [Error::OutOfRange] for a position outside `[0, side_len²)`.
pub fn compute_mst_cost<T>(side_len: T, points: &[T]) -> Result<u64>
where
    T: PrimInt + Debug,
{
    let grid = Grid::from_side_len(side_len)?;
    if points.is_empty() {
        return Err(Error::InvalidArgument(
            "at least one point is required".to_string(),
        ));
    }
    let positions = grid.positions(points)?;
    Ok(prim_cost(&grid, &positions))
}

/// Total weight of the Manhattan-distance MST over `positions`, rooted at index 0.
///
/// Positions are trusted to lie on the grid. An empty slice costs nothing.
pub fn prim_cost(grid: &Grid, positions: &[usize]) -> u64 {
    prim(grid, positions, |_, _| {})
}

/// Like [prim_cost], but returns the tree as `[parent, child]` index pairs in the order they were attached.
pub fn compute_mst(grid: &Grid, positions: &[usize]) -> Vec<[usize; 2]> {
    let mut mst = Vec::with_capacity(positions.len().saturating_sub(1));
    prim(grid, positions, |from, to| mst.push([from, to]));
    mst
}

/// Prim's algorithm on the implicit complete graph, in O(n² log(n)) time.
///
/// There is no decrease-key: every relaxation is pushed and stale entries are skipped when popped.
fn prim<F>(grid: &Grid, positions: &[usize], mut on_attach: F) -> u64
where
    F: FnMut(usize, usize),
{
    if positions.is_empty() {
        return 0;
    }

    let mut in_mst = bitvec![u8, Msb0; 0; positions.len()];
    let mut edge_priority_queue = BinaryHeap::new();
    let mut cost = 0;
    let mut stale = 0usize;

    // Kickstart MST with 1 vertex
    edge_priority_queue.push(Reverse(FrontierEntry {
        weight: 0,
        to: 0,
        from: None,
    }));

    while let Some(Reverse(shortest_edge)) = edge_priority_queue.pop() {
        let u = shortest_edge.to;
        if in_mst[u] {
            stale += 1;
            continue;
        }
        in_mst.set(u, true);
        cost += shortest_edge.weight;
        if let Some(from) = shortest_edge.from {
            on_attach(from, u);
        }

        for v in in_mst.iter_zeros() {
            edge_priority_queue.push(Reverse(FrontierEntry {
                weight: grid.manhattan_distance(positions[u], positions[v]),
                to: v,
                from: Some(u),
            }));
        }
    }

    debug!(
        "MST over {} points costs {} ({} stale entries)",
        positions.len(),
        cost,
        stale
    );
    cost
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

    /// Kruskal over every pair, used as an independent reference.
    fn brute_force_cost(grid: &Grid, positions: &[usize]) -> u64 {
        let mut edges = vec![];
        for i in 0..positions.len() {
            for j in i + 1..positions.len() {
                edges.push((grid.manhattan_distance(positions[i], positions[j]), i, j));
            }
        }
        edges.sort_unstable();
        let mut component = (0..positions.len()).collect::<Vec<_>>();
        let mut cost = 0;
        for (weight, i, j) in edges {
            let (a, b) = (component[i], component[j]);
            if a != b {
                cost += weight;
                component.iter_mut().filter(|c| **c == b).for_each(|c| *c = a);
            }
        }
        cost
    }

    fn random_positions(rng: &mut StdRng, grid: &Grid, n: usize) -> Vec<usize> {
        let cells = grid.cells().unwrap();
        (0..n).map(|_| rng.gen_range(0..cells)).collect()
    }

    #[test]
    fn corners_of_a_square() {
        assert_eq!(compute_mst_cost(4, &[0, 3, 12, 15]), Ok(9));
    }

    #[test]
    fn single_point_costs_nothing() {
        assert_eq!(compute_mst_cost(5, &[0]), Ok(0));
        assert_eq!(compute_mst_cost(5, &[24]), Ok(0));
    }

    #[test]
    fn adjacent_pair() {
        assert_eq!(compute_mst_cost(10, &[0, 1]), Ok(1));
    }

    #[test]
    fn pair_costs_their_distance() {
        let grid = Grid::new(8).unwrap();
        for (a, b) in [(0, 63), (7, 56), (9, 18), (20, 20)] {
            assert_eq!(
                prim_cost(&grid, &[a, b]),
                grid.manhattan_distance(a, b),
                "{} to {}",
                a,
                b
            );
        }
    }

    #[test]
    fn collinear_points_cost_their_span() {
        let side_len = 20usize;
        let grid = Grid::new(side_len).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let x = rng.gen_range(0..side_len);
            let mut ys = (0..side_len).collect::<Vec<_>>();
            ys.shuffle(&mut rng);
            ys.truncate(rng.gen_range(1..side_len));
            let positions = ys.iter().map(|y| x * side_len + y).collect::<Vec<_>>();

            let mut sorted = ys.clone();
            sorted.sort_unstable();
            let gaps = sorted.windows(2).map(|w| (w[1] - w[0]) as u64).sum::<u64>();
            assert_eq!(prim_cost(&grid, &positions), gaps);
        }
    }

    #[test]
    fn matches_brute_force() {
        let grid = Grid::new(16).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for n in 1..40 {
            let positions = random_positions(&mut rng, &grid, n);
            assert_eq!(
                prim_cost(&grid, &positions),
                brute_force_cost(&grid, &positions),
                "{:?}",
                positions
            );
        }
    }

    #[test]
    fn cost_is_independent_of_point_order() {
        let grid = Grid::new(32).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            let mut positions = random_positions(&mut rng, &grid, 25);
            let expected = prim_cost(&grid, &positions);
            for _ in 0..5 {
                positions.shuffle(&mut rng);
                assert_eq!(prim_cost(&grid, &positions), expected);
            }
        }
    }

    #[test]
    fn adding_a_point_never_lowers_the_cost() {
        let grid = Grid::new(12).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let mut positions = random_positions(&mut rng, &grid, 1);
        let mut last = prim_cost(&grid, &positions);
        for _ in 0..30 {
            positions.extend(random_positions(&mut rng, &grid, 1));
            let cost = prim_cost(&grid, &positions);
            assert!(cost >= last, "{} < {} for {:?}", cost, last, positions);
            last = cost;
        }
    }

    #[test]
    fn duplicate_points_are_free() {
        let grid = Grid::new(6).unwrap();
        assert_eq!(prim_cost(&grid, &[7, 7, 7]), 0);
        assert_eq!(prim_cost(&grid, &[0, 35, 0]), 10);
    }

    #[test]
    fn tree_spans_every_point_with_the_same_weight() {
        let grid = Grid::new(10).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let positions = random_positions(&mut rng, &grid, 30);
        let mst = compute_mst(&grid, &positions);

        assert_eq!(mst.len(), positions.len() - 1);
        let mut attached = vec![false; positions.len()];
        attached[0] = true;
        for [from, to] in &mst {
            assert!(attached[*from], "parent {} attached before child", from);
            assert!(!attached[*to], "{} attached twice", to);
            attached[*to] = true;
        }
        assert!(attached.iter().all(|a| *a));

        let weight = mst
            .iter()
            .map(|[from, to]| grid.manhattan_distance(positions[*from], positions[*to]))
            .sum::<u64>();
        assert_eq!(weight, prim_cost(&grid, &positions));
    }

    #[test]
    fn mst_is_correct_for_trivial_case() {
        let grid = Grid::new(3).unwrap();
        // (0, 0), (1, 1), (2, 2)
        assert_eq!(compute_mst(&grid, &[0, 4, 8]), &[[0, 1], [1, 2]]);
        assert!(compute_mst(&grid, &[4]).is_empty());
        assert!(compute_mst(&grid, &[]).is_empty());
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(matches!(
            compute_mst_cost(0, &[0]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            compute_mst_cost(-4, &[0]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            compute_mst_cost::<i32>(4, &[]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            compute_mst_cost(4, &[0, 16]),
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(
            compute_mst_cost(4, &[-1, 3]),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn empty_input_costs_nothing_when_unchecked() {
        let grid = Grid::new(4).unwrap();
        assert_eq!(prim_cost(&grid, &[]), 0);
    }
}
