//! Geometric checks. Each check is enabled separately by
//! [`ConversionSettings`](crate::ConversionSettings) and aborts the
//! conversion when it fails.

use crate::error::ValidationError;
use crate::geometry::{ORTHOGONALITY_TOLERANCE, allclose};
use crate::increment::IncrementAnalysis;
use crate::slice::Slice;

use tracing::warn;

/// Fewest slices that make up a volume
pub const MIN_SLICE_COUNT: usize = 4;

pub fn validate_slicecount(slices: &[Slice]) -> Result<(), ValidationError> {
    if slices.len() < MIN_SLICE_COUNT {
        warn!(
            slices = slices.len(),
            "Too few slices to form a volume (localizer?)"
        );
        return Err(ValidationError::TooFewSlices {
            found: slices.len(),
            required: MIN_SLICE_COUNT,
        });
    }
    Ok(())
}

/// Every slice must share the orientation of the first slice.
pub fn validate_orientation(slices: &[Slice]) -> Result<(), ValidationError> {
    let Some(first) = slices.first() else {
        return Ok(());
    };
    if let Some(index) = slices
        .iter()
        .position(|slice| !slice.orientation().approx_eq(first.orientation()))
    {
        warn!(index, "Image orientations not consistent through all slices");
        return Err(ValidationError::OrientationInconsistent);
    }
    Ok(())
}

/// The direction cosines must be perpendicular and the slices must be
/// stacked along the slice normal. Gantry tilted acquisitions fail the
/// second condition.
pub fn validate_orthogonal(slices: &[Slice]) -> Result<(), ValidationError> {
    let (Some(first), Some(last)) = (slices.first(), slices.last()) else {
        return Ok(());
    };
    let orientation = first.orientation();

    if orientation.row.dot(&orientation.column).abs() > ORTHOGONALITY_TOLERANCE.absolute {
        warn!("Row and column direction cosines are not perpendicular");
        return Err(ValidationError::NotOrthogonal);
    }

    let normal = orientation.normal();
    let stacking = last.position() - first.position();
    let (normal_norm, stacking_norm) = (normal.norm(), stacking.norm());
    if normal_norm == 0.0 || stacking_norm == 0.0 {
        return Ok(());
    }
    let normal = normal / normal_norm;
    let stacking = stacking / stacking_norm;

    if !allclose(&normal, &stacking, ORTHOGONALITY_TOLERANCE)
        && !allclose(&normal, &-stacking, ORTHOGONALITY_TOLERANCE)
    {
        warn!(
            normal = ?normal.as_slice(),
            stacking = ?stacking.as_slice(),
            "Orthogonality check failed: non cubical image"
        );
        return Err(ValidationError::NotOrthogonal);
    }
    Ok(())
}

/// Every displacement between consecutive sorted slices must match the
/// first one. Takes the result of [`analyze_increments`] on the sorted
/// series.
///
/// [`analyze_increments`]: crate::increment::analyze_increments
pub fn validate_slice_increment(analysis: &IncrementAnalysis) -> Result<(), ValidationError> {
    if !analysis.consistent {
        warn!(
            max_increment = analysis.max_increment,
            "Slice increment not consistent through all slices"
        );
        return Err(ValidationError::SliceIncrementInconsistent);
    }
    Ok(())
}
