use nalgebra::Vector3;

/// Relative and absolute tolerance for component-wise comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub relative: f64,
    pub absolute: f64,
}

impl Tolerance {
    pub const fn new(relative: f64, absolute: f64) -> Self {
        Self { relative, absolute }
    }
}

/// Matching direction cosines between slices
pub const ORIENTATION_TOLERANCE: Tolerance = Tolerance::new(0.001, 0.001);

/// Matching displacements between consecutive slices
pub const INCREMENT_TOLERANCE: Tolerance = Tolerance::new(0.05, 0.1);

/// Matching the stacking direction against the slice normal
pub const ORTHOGONALITY_TOLERANCE: Tolerance = Tolerance::new(0.05, 0.05);

/// Component-wise approximate equality against a reference vector.
///
/// Every component must satisfy `|value - reference| <= absolute + relative * |reference|`,
/// so the comparison is not symmetric: the tolerance scales with `reference`.
pub fn allclose(value: &Vector3<f64>, reference: &Vector3<f64>, tolerance: Tolerance) -> bool {
    value
        .iter()
        .zip(reference.iter())
        .all(|(v, r)| (v - r).abs() <= tolerance.absolute + tolerance.relative * r.abs())
}

/// Row and column direction cosines of a slice (DICOM ImageOrientationPatient).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionCosines {
    pub row: Vector3<f64>,
    pub column: Vector3<f64>,
}

impl DirectionCosines {
    pub fn new(row: Vector3<f64>, column: Vector3<f64>) -> Self {
        Self { row, column }
    }

    /// Build from the six values of ImageOrientationPatient
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        if values.len() != 6 {
            return None;
        }
        Some(Self::new(
            Vector3::new(values[0], values[1], values[2]),
            Vector3::new(values[3], values[4], values[5]),
        ))
    }

    /// Slice normal, `row × column`
    pub fn normal(&self) -> Vector3<f64> {
        self.row.cross(&self.column)
    }

    pub fn approx_eq(&self, reference: &DirectionCosines) -> bool {
        allclose(&self.row, &reference.row, ORIENTATION_TOLERANCE)
            && allclose(&self.column, &reference.column, ORIENTATION_TOLERANCE)
    }
}

/// Percentile of `values` with linear interpolation between the closest ranks.
///
/// Returns `None` for an empty input.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}
