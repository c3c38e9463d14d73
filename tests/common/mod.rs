#![allow(dead_code)]

use dicom_nifti::{DirectionCosines, Slice};
use nalgebra::Vector3;
use ndarray::Array2;

pub const ROWS: usize = 4;
pub const COLUMNS: usize = 5;

/// Pixel values encode row, column and the slice's z position so every
/// voxel of an assembled volume can be traced back to its slice.
pub fn pixels_for(z: f64) -> Array2<f32> {
    Array2::from_shape_fn((ROWS, COLUMNS), |(r, c)| {
        (r * COLUMNS + c) as f32 + z as f32 * 100.0
    })
}

pub fn axial_slice(z: f64) -> Slice {
    Slice::new(
        Vector3::new(-20.0, 10.0, z),
        DirectionCosines::new(Vector3::x(), Vector3::y()),
        [0.8, 0.6],
        pixels_for(z),
    )
    .with_modality("CT")
    .with_image_type(["ORIGINAL", "PRIMARY", "AXIAL"])
}

pub fn sagittal_slice(x: f64) -> Slice {
    Slice::new(
        Vector3::new(x, 0.0, 0.0),
        DirectionCosines::new(Vector3::y(), Vector3::z()),
        [0.8, 0.6],
        Array2::zeros((ROWS, COLUMNS)),
    )
    .with_modality("CT")
}

pub fn axial_series(zs: &[f64]) -> Vec<Slice> {
    zs.iter().map(|&z| axial_slice(z)).collect()
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}
