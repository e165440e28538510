//! # siq-spatial
//!
//! Static nearest-neighbor index over a reference [`SampleSet`].
//!
//! The index replaces explicit Voronoi geometry: assigning each query point
//! to its Euclidean-nearest reference point partitions space into approximate
//! Voronoi cells in any dimension, without combinatorial blow-up.
//!
//! Contract:
//! - built exactly once over an immutable reference set,
//! - batched queries run in parallel against the read-only tree,
//! - distance ties resolve to the lowest reference index.
//!
//! The implementation is a kd-tree with median splits on the widest axis and
//! linear-scan leaf buckets. The leaf scan is also the brute-force fallback:
//! a reference set no larger than the leaf capacity is served entirely by it,
//! with identical tie-break behavior.

#![warn(missing_docs)]
#![warn(clippy::all)]

use rayon::prelude::*;
use siq_core::{Error, Result, SampleSet};

/// Points per leaf bucket before a split is introduced.
const LEAF_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
enum Node {
    /// Range into the permuted index array, scanned linearly.
    Leaf { start: usize, end: usize },
    /// Splitting hyperplane `x[axis] = value` with child node ids.
    Split {
        axis: usize,
        value: f64,
        left: usize,
        right: usize,
    },
}

/// Immutable spatial index answering batched nearest-point queries.
///
/// For each query point, returns the index (into the reference set) of the
/// reference point minimizing Euclidean distance; equidistant candidates
/// resolve to the smallest index. Safe to query concurrently once built.
#[derive(Debug, Clone)]
pub struct NearestNeighborIndex {
    dim: usize,
    points: Vec<f64>,
    order: Vec<usize>,
    nodes: Vec<Node>,
}

impl NearestNeighborIndex {
    /// Build the index over `reference`.
    pub fn build(reference: &SampleSet) -> Result<Self> {
        if reference.is_empty() {
            return Err(Error::EmptyReferenceSet(
                "cannot build a nearest-neighbor index over zero points".to_string(),
            ));
        }

        let mut index = Self {
            dim: reference.dim(),
            points: reference.as_flat().to_vec(),
            order: (0..reference.len()).collect(),
            nodes: Vec::new(),
        };
        let count = reference.len();
        index.split_range(0, count);
        Ok(index)
    }

    /// Number of reference points.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Reference point dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Nearest reference index for a single query point.
    pub fn query_one(&self, point: &[f64]) -> Result<usize> {
        if point.len() != self.dim {
            return Err(Error::MismatchedLengths(format!(
                "query dimension {} does not match index dimension {}",
                point.len(),
                self.dim
            )));
        }
        Ok(self.nearest(point))
    }

    /// Nearest reference indices for a batch of query points.
    ///
    /// Returns one index per query, in query order. Queries are independent
    /// and run in parallel against the immutable tree.
    pub fn query_nearest(&self, queries: &SampleSet) -> Result<Vec<usize>> {
        if queries.dim() != self.dim {
            return Err(Error::MismatchedLengths(format!(
                "query dimension {} does not match index dimension {}",
                queries.dim(),
                self.dim
            )));
        }
        Ok((0..queries.len())
            .into_par_iter()
            .map(|i| self.nearest(queries.point(i)))
            .collect())
    }

    fn point(&self, idx: usize) -> &[f64] {
        &self.points[idx * self.dim..(idx + 1) * self.dim]
    }

    /// Build the subtree for `order[start..end]`, returning its node id.
    fn split_range(&mut self, start: usize, end: usize) -> usize {
        if end - start <= LEAF_CAPACITY {
            self.nodes.push(Node::Leaf { start, end });
            return self.nodes.len() - 1;
        }

        let axis = self.widest_axis(start, end);
        let mid = (end - start) / 2;
        let dim = self.dim;
        let points = &self.points;
        self.order[start..end].select_nth_unstable_by(mid, |&a, &b| {
            points[a * dim + axis].total_cmp(&points[b * dim + axis])
        });
        let median = self.order[start + mid];
        let value = self.points[median * dim + axis];

        // Reserve the split slot before recursing so child ids are stable.
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { start, end });
        let left = self.split_range(start, start + mid);
        let right = self.split_range(start + mid, end);
        self.nodes[id] = Node::Split {
            axis,
            value,
            left,
            right,
        };
        id
    }

    /// Axis with the widest coordinate spread over `order[start..end]`.
    fn widest_axis(&self, start: usize, end: usize) -> usize {
        let mut lo = vec![f64::INFINITY; self.dim];
        let mut hi = vec![f64::NEG_INFINITY; self.dim];
        for &idx in &self.order[start..end] {
            for (d, &x) in self.point(idx).iter().enumerate() {
                lo[d] = lo[d].min(x);
                hi[d] = hi[d].max(x);
            }
        }
        let mut axis = 0;
        let mut spread = hi[0] - lo[0];
        for d in 1..self.dim {
            let s = hi[d] - lo[d];
            if s > spread {
                spread = s;
                axis = d;
            }
        }
        axis
    }

    fn nearest(&self, query: &[f64]) -> usize {
        let mut best = usize::MAX;
        let mut best_d2 = f64::INFINITY;
        self.visit(0, query, &mut best, &mut best_d2);
        best
    }

    fn visit(&self, node: usize, query: &[f64], best: &mut usize, best_d2: &mut f64) {
        match self.nodes[node] {
            Node::Leaf { start, end } => {
                for &idx in &self.order[start..end] {
                    let d2 = squared_distance(self.point(idx), query);
                    if d2 < *best_d2 || (d2 == *best_d2 && idx < *best) {
                        *best_d2 = d2;
                        *best = idx;
                    }
                }
            }
            Node::Split {
                axis,
                value,
                left,
                right,
            } => {
                let delta = query[axis] - value;
                let (near, far) = if delta < 0.0 {
                    (left, right)
                } else {
                    (right, left)
                };
                self.visit(near, query, best, best_d2);
                // Non-strict comparison: an equidistant candidate on the far
                // side of the plane may still win the lowest-index tie-break.
                if delta * delta <= *best_d2 {
                    self.visit(far, query, best, best_d2);
                }
            }
        }
    }
}

#[inline]
fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
