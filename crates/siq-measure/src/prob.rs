//! Inverse probability measures over approximate Voronoi cells.
//!
//! Three variants share one aggregation contract:
//! - [`prob_emulated`]: Monte Carlo cell volumes from an emulated point set,
//!   with optional reuse of a supplied emulation set and pre-built data index.
//! - [`prob`]: exact cell volumes, applicable only to regular-grid samples.
//! - [`prob_mc`]: the from-scratch Monte Carlo reference implementation with
//!   a caller-controlled emulation count and no index reuse.
//!
//! Every variant assigns each model output to its nearest data-reference
//! bucket (`io_ptr`), weighs each parameter sample by its bucket's density
//! weight times its cell-volume fraction, and normalizes to total mass 1.

use siq_core::{Domain, EmulationSet, Error, ProbabilityMeasure, Result, SampleSet};
use siq_sample::emulate_iid_lebesgue_seeded;
use siq_spatial::NearestNeighborIndex;

use crate::density::{DensityInput, DensityWeights};

/// Emulation count used when the caller supplies neither a set nor a count.
pub const DEFAULT_EMULATION_COUNT: usize = 1_000_000;

/// Relative tolerance for detecting non-uniform grid spacing.
const GRID_SPACING_RTOL: f64 = 1e-9;

/// The fixed inputs shared by every variant.
///
/// `samples` and `data` pair index-for-index: `data.point(i)` is the forward
/// model's output at `samples.point(i)`. `data_reference` is the
/// discretization of the data domain carrying the density weights, and
/// `lam_domain` is the bounded parameter domain.
#[derive(Debug, Clone, Copy)]
pub struct InverseProblem<'a> {
    /// Parameter samples in the parameter domain.
    pub samples: &'a SampleSet,
    /// Forward-model outputs, one per parameter sample.
    pub data: &'a SampleSet,
    /// Reference discretization of the data domain.
    pub data_reference: &'a SampleSet,
    /// Bounded parameter domain.
    pub lam_domain: &'a Domain,
}

impl InverseProblem<'_> {
    /// Validate the pairing and dimensions before any computation.
    fn validate(&self) -> Result<()> {
        if self.samples.is_empty() {
            return Err(Error::EmptyReferenceSet(
                "parameter sample set is empty".to_string(),
            ));
        }
        if self.data_reference.is_empty() {
            return Err(Error::EmptyReferenceSet(
                "data reference set is empty".to_string(),
            ));
        }
        if self.samples.len() != self.data.len() {
            return Err(Error::MismatchedLengths(format!(
                "{} parameter samples paired with {} data points",
                self.samples.len(),
                self.data.len()
            )));
        }
        if self.samples.dim() != self.lam_domain.dim() {
            return Err(Error::MismatchedLengths(format!(
                "sample dimension {} does not match parameter domain dimension {}",
                self.samples.dim(),
                self.lam_domain.dim()
            )));
        }
        if self.data.dim() != self.data_reference.dim() {
            return Err(Error::MismatchedLengths(format!(
                "data dimension {} does not match reference dimension {}",
                self.data.dim(),
                self.data_reference.dim()
            )));
        }
        Ok(())
    }
}

/// Volume-point source for [`prob_emulated`].
pub enum EmulationInput<'a> {
    /// Reuse a previously drawn emulation set; the call's seed is unused and
    /// the output is bit-reproducible.
    Supplied(&'a EmulationSet),
    /// Draw a fresh set of the given size from the call's seed.
    Count(usize),
    /// Draw a fresh set of [`DEFAULT_EMULATION_COUNT`] points.
    Default,
}

/// Compute the inverse measure with Monte Carlo cell volumes.
///
/// Returns the measure together with the emulation set actually used, so a
/// caller can feed it back via [`EmulationInput::Supplied`] for exact
/// reproducibility across related calls. `data_index`, when given, must be
/// built over `data_reference` (checked for length and dimension).
pub fn prob_emulated(
    inputs: &InverseProblem<'_>,
    density: DensityInput<'_>,
    emulation: EmulationInput<'_>,
    data_index: Option<&NearestNeighborIndex>,
    seed: u64,
) -> Result<(ProbabilityMeasure, EmulationSet)> {
    inputs.validate()?;
    validate_data_index(data_index, inputs.data_reference)?;
    let weights = density.resolve(inputs.data_reference)?;

    let emulation_set = match emulation {
        EmulationInput::Supplied(set) => {
            if set.dim() != inputs.samples.dim() {
                return Err(Error::MismatchedLengths(format!(
                    "emulation dimension {} does not match sample dimension {}",
                    set.dim(),
                    inputs.samples.dim()
                )));
            }
            if set.len() == 0 {
                return Err(Error::InvalidCount(
                    "supplied emulation set is empty".to_string(),
                ));
            }
            set.clone()
        }
        EmulationInput::Count(0) => {
            return Err(Error::InvalidCount(
                "emulation count must be positive".to_string(),
            ));
        }
        EmulationInput::Count(n) => emulate_iid_lebesgue_seeded(inputs.lam_domain, n, seed)?,
        EmulationInput::Default => {
            emulate_iid_lebesgue_seeded(inputs.lam_domain, DEFAULT_EMULATION_COUNT, seed)?
        }
    };

    let io_ptr = match data_index {
        Some(index) => index.query_nearest(inputs.data)?,
        None => NearestNeighborIndex::build(inputs.data_reference)?.query_nearest(inputs.data)?,
    };

    let emulate_ptr =
        NearestNeighborIndex::build(inputs.samples)?.query_nearest(emulation_set.points())?;
    let fractions = volume_fractions(inputs.samples.len(), &emulate_ptr);
    let mass = aggregate_mass(&weights, &io_ptr, &fractions)?;

    Ok((
        ProbabilityMeasure {
            mass,
            cell_volume: None,
            io_ptr,
            emulate_ptr: Some(emulate_ptr),
        },
        emulation_set,
    ))
}

/// Compute the inverse measure with exact cell volumes on a regular grid.
///
/// The parameter samples must form a regular axis-aligned grid inside the
/// parameter domain; otherwise [`Error::NotAGrid`] is raised. Cell volumes
/// are the samples' Voronoi intervals clipped to the domain, so they sum to
/// the domain volume and estimate the same quantity as the Monte Carlo
/// variants. The result carries `cell_volume` and no emulation diagnostics.
pub fn prob(
    inputs: &InverseProblem<'_>,
    density: DensityInput<'_>,
    data_index: Option<&NearestNeighborIndex>,
) -> Result<ProbabilityMeasure> {
    inputs.validate()?;
    validate_data_index(data_index, inputs.data_reference)?;
    let weights = density.resolve(inputs.data_reference)?;
    let cell_volume = grid_cell_volumes(inputs.samples, inputs.lam_domain)?;

    let io_ptr = match data_index {
        Some(index) => index.query_nearest(inputs.data)?,
        None => NearestNeighborIndex::build(inputs.data_reference)?.query_nearest(inputs.data)?,
    };

    let domain_volume = inputs.lam_domain.volume();
    let fractions: Vec<f64> = cell_volume.iter().map(|v| v / domain_volume).collect();
    let mass = aggregate_mass(&weights, &io_ptr, &fractions)?;

    Ok(ProbabilityMeasure {
        mass,
        cell_volume: Some(cell_volume),
        io_ptr,
        emulate_ptr: None,
    })
}

/// Compute the inverse measure with explicit Monte Carlo volume estimation.
///
/// The reference implementation for cross-checking the other variants: draws
/// a fresh emulation set of exactly `emulation_count` points from `seed` and
/// rebuilds both nearest-neighbor indices from scratch. `cell_volume` is the
/// volume fraction scaled by the domain volume, directly comparable with the
/// grid variant's exact volumes.
pub fn prob_mc(
    inputs: &InverseProblem<'_>,
    density: DensityInput<'_>,
    emulation_count: usize,
    seed: u64,
) -> Result<(ProbabilityMeasure, EmulationSet)> {
    inputs.validate()?;
    if emulation_count == 0 {
        return Err(Error::InvalidCount(
            "emulation count must be positive".to_string(),
        ));
    }
    let weights = density.resolve(inputs.data_reference)?;

    let emulation_set = emulate_iid_lebesgue_seeded(inputs.lam_domain, emulation_count, seed)?;

    let io_ptr =
        NearestNeighborIndex::build(inputs.data_reference)?.query_nearest(inputs.data)?;
    let emulate_ptr =
        NearestNeighborIndex::build(inputs.samples)?.query_nearest(emulation_set.points())?;
    let fractions = volume_fractions(inputs.samples.len(), &emulate_ptr);
    let mass = aggregate_mass(&weights, &io_ptr, &fractions)?;

    let domain_volume = inputs.lam_domain.volume();
    let cell_volume = fractions.iter().map(|f| f * domain_volume).collect();

    Ok((
        ProbabilityMeasure {
            mass,
            cell_volume: Some(cell_volume),
            io_ptr,
            emulate_ptr: Some(emulate_ptr),
        },
        emulation_set,
    ))
}

fn validate_data_index(
    index: Option<&NearestNeighborIndex>,
    reference: &SampleSet,
) -> Result<()> {
    if let Some(index) = index {
        if index.len() != reference.len() || index.dim() != reference.dim() {
            return Err(Error::MismatchedLengths(format!(
                "pre-built index covers {} points of dimension {}, reference set has {} of dimension {}",
                index.len(),
                index.dim(),
                reference.len(),
                reference.dim()
            )));
        }
    }
    Ok(())
}

/// Fraction of emulated points owned by each parameter sample.
///
/// An unbiased Monte Carlo estimate of each sample's Voronoi cell volume as
/// a fraction of the domain volume. A sample owning zero points gets 0.0.
fn volume_fractions(sample_count: usize, emulate_ptr: &[usize]) -> Vec<f64> {
    let mut counts = vec![0u64; sample_count];
    for &owner in emulate_ptr {
        counts[owner] += 1;
    }
    let total = emulate_ptr.len() as f64;
    counts.into_iter().map(|c| c as f64 / total).collect()
}

/// Shared aggregation contract.
///
/// Unnormalized mass for sample `i` is `weights[io_ptr[i]] * fractions[i]`;
/// samples sharing a bucket each inherit the bucket's full weight (indexed,
/// not pooled) and are differentiated by their volume fractions. The result
/// is normalized to total mass 1.
fn aggregate_mass(
    weights: &DensityWeights,
    io_ptr: &[usize],
    fractions: &[f64],
) -> Result<Vec<f64>> {
    let mut mass: Vec<f64> = io_ptr
        .iter()
        .zip(fractions)
        .map(|(&bucket, &fraction)| weights.weight(bucket) * fraction)
        .collect();
    let total: f64 = mass.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(Error::UnnormalizedWeights(
            "every parameter sample carries zero mass after weighting".to_string(),
        ));
    }
    for m in &mut mass {
        *m /= total;
    }
    Ok(mass)
}

/// Exact Voronoi cell volumes for regular-grid samples, clipped to `domain`.
fn grid_cell_volumes(samples: &SampleSet, domain: &Domain) -> Result<Vec<f64>> {
    let axes = grid_axes(samples, domain)?;

    let lattice_sites: usize = axes.iter().map(Vec::len).product();
    if lattice_sites != samples.len() {
        return Err(Error::NotAGrid(format!(
            "{} samples do not fill the {} lattice sites implied by their coordinates",
            samples.len(),
            lattice_sites
        )));
    }
    reject_duplicate_rows(samples)?;

    let mut volumes = Vec::with_capacity(samples.len());
    for point in samples.iter() {
        let mut volume = 1.0;
        for (d, &x) in point.iter().enumerate() {
            let axis = &axes[d];
            let pos = axis.partition_point(|&c| c < x);
            let (lo, hi) = domain.bounds()[d];
            volume *= cell_width(axis, pos, lo, hi);
        }
        volumes.push(volume);
    }
    Ok(volumes)
}

/// Per-dimension sorted unique coordinates, verified uniform and in-domain.
fn grid_axes(samples: &SampleSet, domain: &Domain) -> Result<Vec<Vec<f64>>> {
    let mut axes = Vec::with_capacity(samples.dim());
    for d in 0..samples.dim() {
        let mut coords: Vec<f64> = samples.iter().map(|p| p[d]).collect();
        coords.sort_by(f64::total_cmp);
        coords.dedup();

        let (lo, hi) = domain.bounds()[d];
        if coords[0] < lo || *coords.last().expect("non-empty axis") > hi {
            return Err(Error::NotAGrid(format!(
                "dimension {d} lattice leaves the parameter domain"
            )));
        }
        if coords.len() >= 3 {
            let spacing = coords[1] - coords[0];
            let tol = GRID_SPACING_RTOL * (hi - lo);
            for pair in coords.windows(2) {
                if (pair[1] - pair[0] - spacing).abs() > tol {
                    return Err(Error::NotAGrid(format!(
                        "dimension {d} has non-uniform spacing"
                    )));
                }
            }
        }
        axes.push(coords);
    }
    Ok(axes)
}

fn reject_duplicate_rows(samples: &SampleSet) -> Result<()> {
    let mut order: Vec<usize> = (0..samples.len()).collect();
    order.sort_by(|&a, &b| {
        samples
            .point(a)
            .iter()
            .zip(samples.point(b))
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for pair in order.windows(2) {
        if samples.point(pair[0]) == samples.point(pair[1]) {
            return Err(Error::NotAGrid(format!(
                "samples {} and {} coincide",
                pair[0].min(pair[1]),
                pair[0].max(pair[1])
            )));
        }
    }
    Ok(())
}

/// Width of the Voronoi interval of `axis[pos]`, clipped to `[lo, hi]`.
fn cell_width(axis: &[f64], pos: usize, lo: f64, hi: f64) -> f64 {
    let left = if pos == 0 {
        lo
    } else {
        0.5 * (axis[pos - 1] + axis[pos])
    };
    let right = if pos + 1 == axis.len() {
        hi
    } else {
        0.5 * (axis[pos] + axis[pos + 1])
    };
    right - left
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_fractions_counts() {
        let fractions = volume_fractions(3, &[0, 0, 2, 0, 2]);
        assert_eq!(fractions, vec![0.6, 0.0, 0.4]);
    }

    #[test]
    fn test_aggregate_mass_normalizes() {
        let weights = DensityWeights::new(vec![1.0, 3.0]).unwrap();
        let mass = aggregate_mass(&weights, &[0, 1], &[0.5, 0.5]).unwrap();
        assert!((mass.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((mass[0] - 0.25).abs() < 1e-12);
        assert!((mass[1] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_mass_all_zero_is_error() {
        let weights = DensityWeights::new(vec![1.0, 1.0]).unwrap();
        // Both samples map to bucket 0 but own zero volume.
        let err = aggregate_mass(&weights, &[0, 0], &[0.0, 0.0]).unwrap_err();
        assert!(matches!(err, Error::UnnormalizedWeights(_)));
    }

    #[test]
    fn test_grid_volumes_1d_interior_and_edge() {
        let domain = Domain::new(vec![(0.0, 1.0)]).unwrap();
        let samples = SampleSet::from_rows(&[vec![0.0], vec![0.5], vec![1.0]]).unwrap();
        let volumes = grid_cell_volumes(&samples, &domain).unwrap();
        // Edge cells span from the domain boundary to the midpoint.
        assert_eq!(volumes, vec![0.25, 0.5, 0.25]);
    }

    #[test]
    fn test_grid_volumes_2d_partition_domain() {
        let domain = Domain::new(vec![(0.0, 1.0), (0.0, 2.0)]).unwrap();
        let rows: Vec<Vec<f64>> = (0..3)
            .flat_map(|i| (0..2).map(move |j| vec![0.25 + 0.25 * i as f64, 0.5 + j as f64]))
            .collect();
        let samples = SampleSet::from_rows(&rows).unwrap();
        let volumes = grid_cell_volumes(&samples, &domain).unwrap();
        let total: f64 = volumes.iter().sum();
        assert!((total - domain.volume()).abs() < 1e-12);
    }

    #[test]
    fn test_single_sample_cell_is_whole_domain() {
        let domain = Domain::new(vec![(0.0, 2.0), (0.0, 0.5)]).unwrap();
        let samples = SampleSet::from_rows(&[vec![1.3, 0.2]]).unwrap();
        let volumes = grid_cell_volumes(&samples, &domain).unwrap();
        assert_eq!(volumes, vec![domain.volume()]);
    }

    #[test]
    fn test_non_uniform_spacing_rejected() {
        let domain = Domain::new(vec![(0.0, 1.0)]).unwrap();
        let samples = SampleSet::from_rows(&[vec![0.0], vec![0.1], vec![0.9]]).unwrap();
        assert!(matches!(
            grid_cell_volumes(&samples, &domain),
            Err(Error::NotAGrid(_))
        ));
    }

    #[test]
    fn test_incomplete_lattice_rejected() {
        // Three corners of a 2x2 lattice.
        let domain = Domain::new(vec![(0.0, 1.0), (0.0, 1.0)]).unwrap();
        let samples =
            SampleSet::from_rows(&[vec![0.2, 0.2], vec![0.2, 0.8], vec![0.8, 0.2]]).unwrap();
        assert!(matches!(
            grid_cell_volumes(&samples, &domain),
            Err(Error::NotAGrid(_))
        ));
    }

    #[test]
    fn test_duplicate_samples_rejected() {
        let domain = Domain::new(vec![(0.0, 1.0), (0.0, 1.0)]).unwrap();
        let samples = SampleSet::from_rows(&[
            vec![0.2, 0.2],
            vec![0.2, 0.8],
            vec![0.8, 0.2],
            vec![0.2, 0.2],
        ])
        .unwrap();
        assert!(matches!(
            grid_cell_volumes(&samples, &domain),
            Err(Error::NotAGrid(_))
        ));
    }

    #[test]
    fn test_off_domain_lattice_rejected() {
        let domain = Domain::new(vec![(0.0, 1.0)]).unwrap();
        let samples = SampleSet::from_rows(&[vec![0.5], vec![1.5]]).unwrap();
        assert!(matches!(
            grid_cell_volumes(&samples, &domain),
            Err(Error::NotAGrid(_))
        ));
    }

    #[test]
    fn test_validate_rejects_mismatched_pairing() {
        let domain = Domain::new(vec![(0.0, 1.0)]).unwrap();
        let samples = SampleSet::from_rows(&[vec![0.25], vec![0.75]]).unwrap();
        let data = SampleSet::from_rows(&[vec![0.25]]).unwrap();
        let reference = SampleSet::from_rows(&[vec![0.5]]).unwrap();
        let inputs = InverseProblem {
            samples: &samples,
            data: &data,
            data_reference: &reference,
            lam_domain: &domain,
        };
        let err = prob_mc(&inputs, DensityInput::Weights(DensityWeights::uniform(1).unwrap()), 10, 0)
            .unwrap_err();
        assert!(matches!(err, Error::MismatchedLengths(_)));
    }
}
