//! Common data types for siq

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Bounded axis-aligned hyperrectangle in n dimensions.
///
/// Both the parameter domain and the data domain are represented this way.
/// Bounds are validated once at construction; every operation downstream may
/// assume finite extents with `min < max` per dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    bounds: Vec<(f64, f64)>,
}

impl Domain {
    /// Create a domain from per-dimension `(min, max)` bounds.
    pub fn new(bounds: Vec<(f64, f64)>) -> Result<Self> {
        if bounds.is_empty() {
            return Err(Error::InvalidDomain(
                "domain must have at least one dimension".to_string(),
            ));
        }
        for (d, &(lo, hi)) in bounds.iter().enumerate() {
            if !(lo.is_finite() && hi.is_finite()) {
                return Err(Error::InvalidDomain(format!(
                    "dimension {d} has non-finite bounds ({lo}, {hi})"
                )));
            }
            if lo >= hi {
                return Err(Error::InvalidDomain(format!(
                    "dimension {d} has min >= max ({lo} >= {hi})"
                )));
            }
        }
        Ok(Self { bounds })
    }

    /// Number of dimensions.
    pub fn dim(&self) -> usize {
        self.bounds.len()
    }

    /// Per-dimension `(min, max)` bounds.
    pub fn bounds(&self) -> &[(f64, f64)] {
        &self.bounds
    }

    /// Lebesgue volume of the hyperrectangle.
    pub fn volume(&self) -> f64 {
        self.bounds.iter().map(|&(lo, hi)| hi - lo).product()
    }

    /// Whether `point` lies within the closed hyperrectangle.
    ///
    /// Returns `false` for points of the wrong dimension.
    pub fn contains(&self, point: &[f64]) -> bool {
        point.len() == self.bounds.len()
            && point
                .iter()
                .zip(&self.bounds)
                .all(|(&x, &(lo, hi))| x >= lo && x <= hi)
    }
}

/// Ordered point set with stable indices `0..len`.
///
/// Points are stored row-major in a flat `Vec<f64>` (`len * dim` entries).
/// A `SampleSet` is immutable once constructed; paired parameter/data sets
/// correspond index-for-index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    dim: usize,
    points: Vec<f64>,
}

impl SampleSet {
    /// Create a sample set from row-major flat storage.
    pub fn from_flat(dim: usize, points: Vec<f64>) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidDomain(
                "sample dimension must be positive".to_string(),
            ));
        }
        if points.len() % dim != 0 {
            return Err(Error::MismatchedLengths(format!(
                "flat length {} is not a multiple of dimension {dim}",
                points.len()
            )));
        }
        if points.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidDomain(
                "sample coordinates must be finite".to_string(),
            ));
        }
        Ok(Self { dim, points })
    }

    /// Create a sample set from one row per point.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let dim = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != dim) {
            return Err(Error::MismatchedLengths(
                "all rows must have the same dimension".to_string(),
            ));
        }
        let mut points = Vec::with_capacity(rows.len() * dim);
        for row in rows {
            points.extend_from_slice(row);
        }
        Self::from_flat(dim, points)
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len() / self.dim
    }

    /// Whether the set holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Coordinates of point `i`.
    ///
    /// Panics if `i >= len()`.
    pub fn point(&self, i: usize) -> &[f64] {
        &self.points[i * self.dim..(i + 1) * self.dim]
    }

    /// Iterator over point rows in index order.
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        self.points.chunks_exact(self.dim)
    }

    /// Row-major flat storage.
    pub fn as_flat(&self) -> &[f64] {
        &self.points
    }
}

/// I.i.d. uniformly emulated volume points over a domain.
///
/// A distinct type from [`SampleSet`] so that emulated points, which exist
/// only to estimate cell volumes, cannot be confused with model-evaluated
/// samples. Regenerated per call unless explicitly supplied back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmulationSet(SampleSet);

impl EmulationSet {
    /// Wrap an emulated point set.
    pub fn new(points: SampleSet) -> Self {
        Self(points)
    }

    /// The emulated points, read-only.
    pub fn points(&self) -> &SampleSet {
        &self.0
    }

    /// Number of emulated points.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Point dimension.
    pub fn dim(&self) -> usize {
        self.0.dim()
    }
}

/// Discretized probability measure on the parameter domain.
///
/// The sole long-lived output of the `prob_*` operations, owned by the
/// caller and suitable for serialization to any array-interchange format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityMeasure {
    /// Per-sample probability mass, summing to 1 across all samples.
    ///
    /// A sample whose cell received no emulated volume points carries mass
    /// exactly 0.0; that is a diagnostic signal, not an error.
    pub mass: Vec<f64>,

    /// Per-sample cell volume. Exact Voronoi volumes for the grid variant,
    /// volume-fraction times domain volume for the Monte Carlo variant,
    /// `None` for the emulated variant.
    pub cell_volume: Option<Vec<f64>>,

    /// For each data point, the index of its nearest data-reference point.
    pub io_ptr: Vec<usize>,

    /// For each emulated volume point, the index of the parameter sample
    /// owning its approximate Voronoi cell. `None` for the grid variant.
    pub emulate_ptr: Option<Vec<usize>>,
}

impl ProbabilityMeasure {
    /// Number of parameter samples the measure is supported on.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.mass.len()
    }

    /// Total mass (1.0 up to floating-point accumulation).
    pub fn total_mass(&self) -> f64 {
        self.mass.iter().sum()
    }
}
