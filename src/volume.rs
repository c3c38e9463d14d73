use crate::enums::Orientation;
use crate::slice::Timing;

use image::ImageBuffer;
use image::Luma;
use nalgebra::{Matrix4, Vector3};
use ndarray::Array3;
use ndarray::ArrayView2;
use ndarray::s;
use rayon::prelude::*;

/// A 3-D image indexed (x, y, z) with its voxel-to-physical transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub data: Array3<f32>,
    /// Maps (x, y, z, 1) voxel indices to RAS millimetres
    pub affine: Matrix4<f64>,
    pub timing: Option<Timing>,
}

impl Volume {
    pub fn new(data: Array3<f32>, affine: Matrix4<f64>) -> Self {
        Self {
            data,
            affine,
            timing: None,
        }
    }

    pub fn with_timing(mut self, timing: Option<Timing>) -> Self {
        self.timing = timing;
        self
    }

    /// Get the dimensions of the volume (x, y, z)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// Get a mutable reference to the underlying data
    pub fn data_mut(&mut self) -> &mut Array3<f32> {
        &mut self.data
    }

    pub fn affine(&self) -> &Matrix4<f64> {
        &self.affine
    }

    pub fn timing(&self) -> Option<Timing> {
        self.timing
    }

    /// Voxel size along each array axis, the lengths of the affine's columns
    pub fn spacing(&self) -> Vector3<f64> {
        let linear = self.affine.fixed_view::<3, 3>(0, 0);
        Vector3::new(
            linear.column(0).norm(),
            linear.column(1).norm(),
            linear.column(2).norm(),
        )
    }

    /// Physical position of a (possibly fractional) voxel index
    pub fn voxel_to_world(&self, index: Vector3<f64>) -> Vector3<f64> {
        (self.affine * index.push(1.0)).xyz()
    }

    pub fn get_slice_from_axis(
        &self,
        index: usize,
        orientation: &Orientation,
    ) -> Option<ArrayView2<'_, f32>> {
        if !self.is_valid_index(index, orientation) {
            return None;
        }
        let slice_result = match orientation {
            Orientation::Axial => self.data().slice(s![.., .., index]),
            Orientation::Coronal => self.data().slice(s![.., index, ..]),
            Orientation::Sagittal => self.data().slice(s![index, .., ..]),
        };
        Some(slice_result)
    }

    /// Render one plane as an 8-bit image, windowed to the volume's value range.
    ///
    /// The first remaining array axis becomes the image width.
    pub fn get_image_from_axis(
        &self,
        index: usize,
        orientation: Orientation,
    ) -> Option<ImageBuffer<Luma<u8>, Vec<u8>>> {
        let slice = self.get_slice_from_axis(index, &orientation)?;
        let (min, max) = self.value_range();
        Self::slice_to_image(&slice, min, max)
    }

    fn value_range(&self) -> (f32, f32) {
        self.data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &v| {
                (min.min(v), max.max(v))
            })
    }

    #[inline]
    fn normalize_to_u8(value: f32, min: f32, max: f32) -> u8 {
        if max <= min {
            return 0;
        }
        (((value - min) / (max - min)) * 255.0).clamp(0.0, 255.0) as u8
    }

    fn slice_to_image(
        slice: &ArrayView2<'_, f32>,
        min: f32,
        max: f32,
    ) -> Option<ImageBuffer<Luma<u8>, Vec<u8>>> {
        let (width, height) = slice.dim();
        // row-major image buffer: iterate the image row (second axis) outermost
        let transposed = slice.t();
        let pixel_data: Vec<u8> = transposed
            .as_standard_layout()
            .as_slice()?
            .par_iter()
            .map(|&v| Self::normalize_to_u8(v, min, max))
            .collect();
        ImageBuffer::from_raw(width as u32, height as u32, pixel_data)
    }

    fn is_valid_index(&self, index: usize, orientation: &Orientation) -> bool {
        let dim = self.data.dim();
        let max_index = match orientation {
            Orientation::Axial => dim.2,
            Orientation::Coronal => dim.1,
            Orientation::Sagittal => dim.0,
        };
        index < max_index
    }
}
