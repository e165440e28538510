//! Discretized data-domain densities.
//!
//! A target density on the data domain reaches the measure engine either as
//! precomputed weights over a reference discretization or as a pointwise
//! callable. Both forms resolve to [`DensityWeights`] exactly once, at the
//! boundary, so the aggregation arithmetic downstream has a single
//! representation to work with.

use siq_core::{Density, Error, Result, SampleSet};

/// Normalized non-negative weights over a data-reference discretization.
///
/// Construction validates and normalizes: entries must be finite and
/// non-negative, and their sum must be positive. After construction the
/// weights sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityWeights {
    weights: Vec<f64>,
}

impl DensityWeights {
    /// Validate and normalize raw weights.
    pub fn new(weights: Vec<f64>) -> Result<Self> {
        for (i, &w) in weights.iter().enumerate() {
            if !w.is_finite() {
                return Err(Error::UnnormalizedWeights(format!(
                    "weight {i} is not finite ({w})"
                )));
            }
            if w < 0.0 {
                return Err(Error::UnnormalizedWeights(format!(
                    "weight {i} is negative ({w})"
                )));
            }
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(Error::UnnormalizedWeights(
                "weights sum to zero".to_string(),
            ));
        }
        let weights = weights.into_iter().map(|w| w / total).collect();
        Ok(Self { weights })
    }

    /// Uniform weights over `count` reference points.
    pub fn uniform(count: usize) -> Result<Self> {
        if count == 0 {
            return Err(Error::InvalidCount(
                "reference count must be positive".to_string(),
            ));
        }
        Ok(Self {
            weights: vec![1.0 / count as f64; count],
        })
    }

    /// Number of reference buckets.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Weight of reference bucket `i`.
    ///
    /// Panics if `i >= len()`.
    pub fn weight(&self, i: usize) -> f64 {
        self.weights[i]
    }

    /// All weights, in reference order.
    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }
}

/// Density input at the measure boundary.
///
/// The tagged variant of "a callable or precomputed weights": resolved once
/// per reference set via [`DensityInput::resolve`].
pub enum DensityInput<'a> {
    /// Precomputed weights over the reference set.
    Weights(DensityWeights),
    /// Pointwise density, evaluated at each reference point on resolution.
    Callable(&'a dyn Density),
}

impl DensityInput<'_> {
    /// Materialize weights over `reference`.
    ///
    /// Precomputed weights must match the reference set's length; a callable
    /// is evaluated once per reference point and the results validated and
    /// normalized as in [`DensityWeights::new`].
    pub fn resolve(self, reference: &SampleSet) -> Result<DensityWeights> {
        match self {
            DensityInput::Weights(w) => {
                if w.len() != reference.len() {
                    return Err(Error::MismatchedLengths(format!(
                        "{} weights supplied for {} reference points",
                        w.len(),
                        reference.len()
                    )));
                }
                Ok(w)
            }
            DensityInput::Callable(density) => {
                DensityWeights::new(reference.iter().map(|p| density.eval(p)).collect())
            }
        }
    }
}
