use crate::error::ConversionError;
use crate::slice::Slice;
use crate::volume::Volume;

use nalgebra::{Matrix4, Vector3};
use ndarray::{Array3, s};

/// Stack an ordered, evenly spaced run of slices into a volume.
///
/// The array is indexed (x, y, z): columns, rows, then slices. Repetition
/// and echo time of the first slice are attached when both are present.
///
/// # Errors
///
/// Returns error if there are fewer than two slices, the slices do not
/// share one pixel grid size, or all slices lie at the same position.
pub fn assemble_volume(slices: &[&Slice]) -> Result<Volume, ConversionError> {
    if slices.len() < 2 {
        return Err(ConversionError::NotAVolume);
    }
    validate_dimensions(slices)?;

    let affine = create_affine(slices)?;
    let data = build_volume_array(slices);
    let timing = slices[0].timing();

    Ok(Volume::new(data, affine).with_timing(timing))
}

/// Slice-to-physical transform in RAS coordinates.
///
/// DICOM positions are LPS, so the first two rows are negated.
pub fn create_affine(slices: &[&Slice]) -> Result<Matrix4<f64>, ConversionError> {
    let (Some(first), Some(last)) = (slices.first(), slices.last()) else {
        return Err(ConversionError::NotAVolume);
    };
    if slices.len() < 2 {
        return Err(ConversionError::NotAVolume);
    }

    let step: Vector3<f64> = (last.position() - first.position()) / (slices.len() - 1) as f64;
    if step.norm() == 0.0 {
        return Err(ConversionError::NotAVolume);
    }

    let orientation = first.orientation();
    let [row_spacing, column_spacing] = first.pixel_spacing();
    let x = orientation.row * column_spacing;
    let y = orientation.column * row_spacing;
    let origin = first.position();

    #[rustfmt::skip]
    let affine = Matrix4::new(
        -x.x, -y.x, -step.x, -origin.x,
        -x.y, -y.y, -step.y, -origin.y,
         x.z,  y.z,  step.z,  origin.z,
         0.0,  0.0,  0.0,     1.0,
    );
    Ok(affine)
}

fn validate_dimensions(slices: &[&Slice]) -> Result<(), ConversionError> {
    let first_dim = slices[0].pixels().dim();
    if slices.iter().any(|slice| slice.pixels().dim() != first_dim) {
        return Err(ConversionError::InconsistentDimensions);
    }
    Ok(())
}

fn build_volume_array(slices: &[&Slice]) -> Array3<f32> {
    let (rows, columns) = slices[0].pixels().dim();
    let mut volume = Array3::<f32>::zeros((columns, rows, slices.len()));

    for (z, slice) in slices.iter().enumerate() {
        volume.slice_mut(s![.., .., z]).assign(&slice.pixels().t());
    }

    volume
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DirectionCosines;
    use ndarray::Array2;

    fn axial(z: f64, rows: usize, columns: usize) -> Slice {
        let pixels = Array2::from_shape_fn((rows, columns), |(r, c)| {
            (r * 10 + c) as f32 + z as f32 * 100.0
        });
        Slice::new(
            Vector3::new(-10.0, 20.0, z),
            DirectionCosines::new(Vector3::x(), Vector3::y()),
            [0.5, 0.25],
            pixels,
        )
    }

    #[test]
    fn array_is_transposed_to_xyz() {
        let slices = [axial(0.0, 2, 3), axial(1.0, 2, 3)];
        let refs: Vec<&Slice> = slices.iter().collect();
        let volume = assemble_volume(&refs).unwrap();

        assert_eq!(volume.dim(), (3, 2, 2));
        // x = column 2, y = row 1, z = slice 1
        assert_eq!(volume.data()[[2, 1, 1]], 112.0);
        assert_eq!(volume.data()[[0, 1, 0]], 10.0);
    }

    #[test]
    fn affine_flips_to_ras() {
        let slices = [axial(0.0, 2, 2), axial(2.0, 2, 2), axial(4.0, 2, 2)];
        let refs: Vec<&Slice> = slices.iter().collect();
        let affine = create_affine(&refs).unwrap();

        #[rustfmt::skip]
        let expected = Matrix4::new(
            -0.25, 0.0,  0.0, 10.0,
             0.0, -0.5,  0.0, -20.0,
             0.0,  0.0,  2.0,  0.0,
             0.0,  0.0,  0.0,  1.0,
        );
        assert_eq!(affine, expected);

        let volume = assemble_volume(&refs).unwrap();
        assert_eq!(volume.spacing(), Vector3::new(0.25, 0.5, 2.0));
    }

    #[test]
    fn stacked_slices_are_not_a_volume() {
        let slices = [axial(1.0, 2, 2), axial(1.0, 2, 2)];
        let refs: Vec<&Slice> = slices.iter().collect();
        assert!(matches!(
            assemble_volume(&refs),
            Err(ConversionError::NotAVolume)
        ));
        assert!(matches!(
            assemble_volume(&refs[..1]),
            Err(ConversionError::NotAVolume)
        ));
    }

    #[test]
    fn mismatched_grids_are_rejected() {
        let slices = [axial(0.0, 2, 2), axial(1.0, 2, 3)];
        let refs: Vec<&Slice> = slices.iter().collect();
        assert!(matches!(
            assemble_volume(&refs),
            Err(ConversionError::InconsistentDimensions)
        ));
    }

    #[test]
    fn timing_comes_from_first_slice() {
        let slices = [
            axial(0.0, 1, 1).with_repetition_time(500.0).with_echo_time(12.0),
            axial(1.0, 1, 1),
        ];
        let refs: Vec<&Slice> = slices.iter().collect();
        let volume = assemble_volume(&refs).unwrap();
        assert_eq!(volume.timing().map(|t| t.echo_time), Some(12.0));

        let refs: Vec<&Slice> = slices.iter().rev().collect();
        assert!(assemble_volume(&refs).unwrap().timing().is_none());
    }
}
