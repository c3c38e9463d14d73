//! Slice increment analysis on a sorted series and splitting of
//! irregularly spaced series into regularly spaced runs.

use crate::error::ConversionError;
use crate::geometry::{INCREMENT_TOLERANCE, allclose, percentile};
use crate::slice::Slice;

use nalgebra::Vector3;

/// Percentile of the pooled run spacings used as the resampling target.
/// A low percentile keeps the finest spacing of the series.
pub const TARGET_SPACING_PERCENTILE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncrementAnalysis {
    /// All consecutive displacements match the first one
    pub consistent: bool,
    /// Largest distance between two consecutive slices
    pub max_increment: f64,
}

/// Consecutive slices of a sorted series sharing one displacement.
///
/// Neighbouring runs share their boundary slice.
#[derive(Debug)]
pub struct IncrementRun<'a> {
    pub slices: Vec<&'a Slice>,
}

impl IncrementRun<'_> {
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

#[derive(Debug)]
pub struct SplitResult<'a> {
    pub runs: Vec<IncrementRun<'a>>,
    pub max_increment: f64,
}

/// Displacement `previous - next` of every consecutive pair
pub fn displacements(sorted: &[Slice]) -> impl Iterator<Item = Vector3<f64>> + '_ {
    sorted
        .windows(2)
        .map(|pair| pair[0].position() - pair[1].position())
}

/// Check whether the series is evenly spaced.
///
/// # Errors
///
/// Returns [`ConversionError::NotAVolume`] for fewer than two slices.
pub fn analyze_increments(sorted: &[Slice]) -> Result<IncrementAnalysis, ConversionError> {
    let mut increments = displacements(sorted);
    let reference = increments.next().ok_or(ConversionError::NotAVolume)?;

    let mut analysis = IncrementAnalysis {
        consistent: true,
        max_increment: reference.norm(),
    };
    for increment in increments {
        analysis.max_increment = analysis.max_increment.max(increment.norm());
        if !allclose(&reference, &increment, INCREMENT_TOLERANCE) {
            analysis.consistent = false;
        }
    }
    Ok(analysis)
}

/// Split a sorted series wherever the displacement changes.
///
/// Each new run starts at the last slice of the previous run and takes the
/// displacement that broke the previous run as its own reference.
///
/// # Errors
///
/// Returns [`ConversionError::NotAVolume`] for fewer than two slices.
pub fn split_increment_runs(sorted: &[Slice]) -> Result<SplitResult<'_>, ConversionError> {
    let [first, second, rest @ ..] = sorted else {
        return Err(ConversionError::NotAVolume);
    };

    let mut reference = first.position() - second.position();
    let mut max_increment = 0.0_f64;
    let mut runs = Vec::new();
    let mut current = vec![first, second];
    let mut previous = second.position();

    for slice in rest {
        let increment = previous - slice.position();
        max_increment = max_increment.max(increment.norm());

        if allclose(&reference, &increment, INCREMENT_TOLERANCE) {
            current.push(slice);
        } else {
            let boundary = current[current.len() - 1];
            runs.push(IncrementRun {
                slices: std::mem::replace(&mut current, vec![boundary, slice]),
            });
            reference = increment;
        }
        previous = slice.position();
    }
    runs.push(IncrementRun { slices: current });

    Ok(SplitResult {
        runs,
        max_increment,
    })
}

/// Choose the voxel spacing all runs are resampled to.
///
/// `runs` holds the voxel spacing of each assembled run and its slice
/// count. Every run contributes its spacing magnitude once per slice
/// interval, and the run whose magnitude lies nearest the
/// [`TARGET_SPACING_PERCENTILE`] of that pool wins, the first one on ties.
pub fn select_target_spacing(runs: &[(Vector3<f64>, usize)]) -> Option<Vector3<f64>> {
    let samples: Vec<f64> = runs
        .iter()
        .flat_map(|(spacing, len)| std::iter::repeat_n(spacing.norm(), len.saturating_sub(1)))
        .collect();
    let target = percentile(&samples, TARGET_SPACING_PERCENTILE)?;

    let mut best: Option<(f64, Vector3<f64>)> = None;
    for (spacing, _) in runs {
        let difference = (spacing.norm() - target).abs();
        if best.is_none_or(|(best_difference, _)| difference < best_difference) {
            best = Some((difference, *spacing));
        }
    }
    best.map(|(_, spacing)| spacing)
}
