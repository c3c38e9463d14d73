//! Merging of sub-volumes onto one regular grid.

use crate::enums::Interpolation;
use crate::error::ConversionError;
use crate::interpolator::Interpolator;
use crate::volume::Volume;

use nalgebra::{Matrix3, Matrix4, Vector3};
use ndarray::{Array3, Zip};

/// Index tolerance for deciding whether a point lies inside a sub-volume
const INSIDE_EPSILON: f64 = 1e-3;

/// Merges volumes that cover parts of one acquisition into a single volume.
///
/// Implementations must cover the union of all inputs, place each input by
/// its affine rather than by list position, and return a single input
/// unchanged up to floating point tolerance.
pub trait Resampler {
    fn resample(
        &self,
        volumes: &[Volume],
        voxel_size: Vector3<f64>,
    ) -> Result<Volume, ConversionError>;
}

/// CPU resampler onto a grid aligned with the first volume's in-plane axes.
///
/// Voxels covered by several inputs take the mean of their samples, so the
/// result does not depend on the order of the inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridResampler {
    pub interpolation: Interpolation,
    /// Value of voxels outside every input
    pub padding: f32,
}

impl GridResampler {
    pub fn new(interpolation: Interpolation, padding: f32) -> Self {
        Self {
            interpolation,
            padding,
        }
    }

    fn sample(&self, volume: &Array3<f32>, index: &Vector3<f64>) -> f32 {
        match self.interpolation {
            Interpolation::Nearest => Interpolator::nearest(volume, index.x, index.y, index.z),
            Interpolation::Linear => {
                Interpolator::trilinear_interpolate(volume, index.x, index.y, index.z)
            }
        }
    }
}

/// Orientation and scale of the output grid, without translation.
///
/// In-plane axes come from the reference affine; the slice axis is their
/// cross product, which keeps a right-handed reference unchanged.
fn grid_axes(reference: &Matrix4<f64>, voxel_size: &Vector3<f64>) -> Option<Matrix3<f64>> {
    let x_axis = reference.fixed_view::<3, 1>(0, 0).into_owned();
    let y_axis = reference.fixed_view::<3, 1>(0, 1).into_owned();
    let x_axis = x_axis.try_normalize(f64::EPSILON)?;
    let y_axis = y_axis.try_normalize(f64::EPSILON)?;
    let z_axis = x_axis.cross(&y_axis).try_normalize(f64::EPSILON)?;

    Some(Matrix3::from_columns(&[
        x_axis * voxel_size.x,
        y_axis * voxel_size.y,
        z_axis * voxel_size.z,
    ]))
}

fn corners(volume: &Volume) -> impl Iterator<Item = Vector3<f64>> + '_ {
    let (nx, ny, nz) = volume.dim();
    let last = |n: usize| n.saturating_sub(1) as f64;
    (0..8).map(move |bits| {
        let index = Vector3::new(
            if bits & 1 == 0 { 0.0 } else { last(nx) },
            if bits & 2 == 0 { 0.0 } else { last(ny) },
            if bits & 4 == 0 { 0.0 } else { last(nz) },
        );
        volume.voxel_to_world(index)
    })
}

fn is_inside(index: &Vector3<f64>, dim: (usize, usize, usize)) -> bool {
    let (nx, ny, nz) = dim;
    [(index.x, nx), (index.y, ny), (index.z, nz)]
        .iter()
        .all(|&(value, n)| {
            value >= -INSIDE_EPSILON && value <= (n as f64 - 1.0) + INSIDE_EPSILON
        })
}

impl Resampler for GridResampler {
    fn resample(
        &self,
        volumes: &[Volume],
        voxel_size: Vector3<f64>,
    ) -> Result<Volume, ConversionError> {
        let reference = volumes
            .first()
            .ok_or_else(|| ConversionError::Resample("no volumes to resample".into()))?;

        let axes = grid_axes(&reference.affine, &voxel_size)
            .ok_or_else(|| ConversionError::Resample("degenerate reference affine".into()))?;
        let axes_inverse = axes
            .try_inverse()
            .ok_or_else(|| ConversionError::Resample("degenerate target voxel size".into()))?;

        // bounding box of every input, in output grid units
        let mut lower = Vector3::repeat(f64::INFINITY);
        let mut upper = Vector3::repeat(f64::NEG_INFINITY);
        for corner in volumes.iter().flat_map(corners) {
            let grid = axes_inverse * corner;
            lower = lower.inf(&grid);
            upper = upper.sup(&grid);
        }
        let extent = upper - lower;
        let shape = extent.map(|e| ((e - INSIDE_EPSILON).ceil().max(0.0)) as usize + 1);

        let mut affine = Matrix4::<f64>::identity();
        affine.fixed_view_mut::<3, 3>(0, 0).copy_from(&axes);
        affine
            .fixed_view_mut::<3, 1>(0, 3)
            .copy_from(&(axes * lower));

        let inverses = volumes
            .iter()
            .map(|volume| {
                volume
                    .affine
                    .try_inverse()
                    .ok_or_else(|| ConversionError::Resample("singular input affine".into()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut data = Array3::<f32>::zeros((shape.x, shape.y, shape.z));
        Zip::indexed(&mut data).par_for_each(|(x, y, z), value| {
            let world = affine * Vector3::new(x as f64, y as f64, z as f64).push(1.0);
            let mut sum = 0.0_f64;
            let mut count = 0_usize;
            for (volume, inverse) in volumes.iter().zip(&inverses) {
                let index = (inverse * world).xyz();
                if is_inside(&index, volume.dim()) {
                    sum += self.sample(&volume.data, &index) as f64;
                    count += 1;
                }
            }
            *value = if count == 0 {
                self.padding
            } else {
                (sum / count as f64) as f32
            };
        });

        let timing = volumes.iter().find_map(Volume::timing);
        Ok(Volume::new(data, affine).with_timing(timing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume(nz: usize, z_spacing: f64, z_origin: f64, fill: impl Fn(usize) -> f32) -> Volume {
        let data = Array3::from_shape_fn((2, 2, nz), |(_, _, z)| fill(z));
        #[rustfmt::skip]
        let affine = Matrix4::new(
            -1.0, 0.0, 0.0, 5.0,
            0.0, -1.0, 0.0, 5.0,
            0.0, 0.0, z_spacing, z_origin,
            0.0, 0.0, 0.0, 1.0,
        );
        Volume::new(data, affine)
    }

    #[test]
    fn single_volume_is_identity() {
        let input = volume(4, 2.0, -3.0, |z| z as f32 * 10.0);
        for interpolation in [Interpolation::Nearest, Interpolation::Linear] {
            let output = GridResampler::new(interpolation, 0.0)
                .resample(std::slice::from_ref(&input), input.spacing())
                .unwrap();
            assert_eq!(output.dim(), input.dim());
            assert!((output.affine - input.affine).abs().max() < 1e-9);
            assert!(
                output
                    .data
                    .iter()
                    .zip(input.data.iter())
                    .all(|(a, b)| (a - b).abs() < 1e-4)
            );
        }
    }

    #[test]
    fn merges_coarse_run_onto_fine_grid() {
        // z = 0, 1, 2 then 2, 4
        let fine = volume(3, 1.0, 0.0, |z| z as f32);
        let coarse = volume(2, 2.0, 2.0, |z| 2.0 + 2.0 * z as f32);
        let merged = GridResampler::new(Interpolation::Linear, -1.0)
            .resample(&[fine, coarse], Vector3::new(1.0, 1.0, 1.0))
            .unwrap();

        assert_eq!(merged.dim(), (2, 2, 5));
        let column: Vec<f32> = (0..5).map(|z| merged.data[[0, 0, z]]).collect();
        for (value, expected) in column.iter().zip([0.0, 1.0, 2.0, 3.0, 4.0]) {
            assert!((value - expected).abs() < 1e-4, "{column:?}");
        }
        assert!((merged.voxel_to_world(Vector3::new(0.0, 0.0, 4.0)).z - 4.0).abs() < 1e-9);
    }

    #[test]
    fn input_order_does_not_matter() {
        let a = volume(3, 1.0, 0.0, |z| z as f32);
        let b = volume(2, 2.0, 2.0, |z| 2.0 + 2.0 * z as f32);
        let resampler = GridResampler::new(Interpolation::Nearest, 0.0);
        let forward = resampler
            .resample(&[a.clone(), b.clone()], Vector3::new(1.0, 1.0, 1.0))
            .unwrap();
        let backward = resampler
            .resample(&[b, a], Vector3::new(1.0, 1.0, 1.0))
            .unwrap();
        assert_eq!(forward.dim(), backward.dim());
        assert!((forward.affine - backward.affine).abs().max() < 1e-9);
        assert_eq!(forward.data, backward.data);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(
            GridResampler::default()
                .resample(&[], Vector3::new(1.0, 1.0, 1.0))
                .is_err()
        );
    }
}
