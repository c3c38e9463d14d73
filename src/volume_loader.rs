use crate::config::ConversionSettings;
use crate::converter::{Conversion, convert_slices};
use crate::error::ConversionError;
use crate::geometry::DirectionCosines;
use crate::slice::Slice;

use dicom::{
    core::Tag,
    object::{FileDicomObject, InMemDicomObject, open_file},
    pixeldata::{ConvertOptions, PixelDecoder, VoiLutOption},
};
use dicom_dictionary_std::tags;
use nalgebra::Vector3;
use ndarray::{Array2, s};
use rayon::prelude::*;
use std::{fs, path::Path};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum VolumeLoaderError {
    #[error("No valid DICOM images found")]
    NoValidImages,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DICOM error: {0}")]
    Dicom(#[from] dicom::object::ReadError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

pub struct VolumeLoader;

impl VolumeLoader {
    /// Convert DICOM objects of one series into a volume
    ///
    /// # Arguments
    ///
    /// * `dicom_objects` - Slice of DICOM file objects
    /// * `settings` - Checks and resampling behaviour of the conversion
    ///
    /// # Errors
    ///
    /// Returns error if no object carries a usable image, or if the
    /// conversion of the resulting slices fails
    pub fn load_from_dicom_objects(
        dicom_objects: &[FileDicomObject<InMemDicomObject>],
        settings: &ConversionSettings,
    ) -> Result<Conversion, VolumeLoaderError> {
        let slices = Self::read_slices(dicom_objects);
        if slices.is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }
        Ok(convert_slices(slices, settings)?)
    }

    /// Load a volume from file paths
    pub fn load_from_file_paths(
        paths: &[impl AsRef<Path> + Sync],
        settings: &ConversionSettings,
    ) -> Result<Conversion, VolumeLoaderError> {
        let objects: Result<Vec<_>, _> = paths
            .par_iter()
            .map(|path| open_file(path.as_ref()))
            .collect();

        Self::load_from_dicom_objects(&objects?, settings)
    }

    /// Load a volume from a directory containing .dcm files
    pub fn load_from_directory(
        path: impl AsRef<Path>,
        settings: &ConversionSettings,
    ) -> Result<Conversion, VolumeLoaderError> {
        let mut paths: Vec<_> = fs::read_dir(path.as_ref())?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"))
            })
            .collect();

        if paths.is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }
        paths.sort();
        debug!(files = paths.len(), "Found DICOM files");

        Self::load_from_file_paths(&paths, settings)
    }

    /// Read every object that carries geometry and pixel data, in input order
    pub fn read_slices(dicom_objects: &[FileDicomObject<InMemDicomObject>]) -> Vec<Slice> {
        let slices: Vec<Slice> = dicom_objects
            .par_iter()
            .filter_map(Self::extract_slice)
            .collect();
        if slices.len() != dicom_objects.len() {
            warn!(
                skipped = dicom_objects.len() - slices.len(),
                "Skipped DICOM objects without image geometry or pixel data"
            );
        }
        slices
    }

    fn extract_slice(dicom_object: &FileDicomObject<InMemDicomObject>) -> Option<Slice> {
        let position = Self::get_floats(dicom_object, tags::IMAGE_POSITION_PATIENT)?;
        let orientation = Self::get_floats(dicom_object, tags::IMAGE_ORIENTATION_PATIENT)?;
        let spacing = Self::get_floats(dicom_object, tags::PIXEL_SPACING)?;
        if position.len() != 3 || spacing.len() != 2 {
            return None;
        }
        let orientation = DirectionCosines::from_slice(&orientation)?;
        let pixels = Self::decode_image(dicom_object)?;

        let mut slice = Slice::new(
            Vector3::new(position[0], position[1], position[2]),
            orientation,
            [spacing[0], spacing[1]],
            pixels,
        )
        .with_modality(Self::get_string(dicom_object, tags::MODALITY).unwrap_or_default());

        if let Some(image_type) = dicom_object
            .element(tags::IMAGE_TYPE)
            .ok()
            .and_then(|element| element.to_multi_str().ok())
        {
            slice = slice.with_image_type(image_type.iter());
        }
        if let Some(repetition_time) = Self::get_float(dicom_object, tags::REPETITION_TIME) {
            slice = slice.with_repetition_time(repetition_time);
        }
        if let Some(echo_time) = Self::get_float(dicom_object, tags::ECHO_TIME) {
            slice = slice.with_echo_time(echo_time);
        }
        Some(slice)
    }

    fn get_floats(dicom_object: &FileDicomObject<InMemDicomObject>, tag: Tag) -> Option<Vec<f64>> {
        dicom_object.element(tag).ok()?.to_multi_float64().ok()
    }

    fn get_float(dicom_object: &FileDicomObject<InMemDicomObject>, tag: Tag) -> Option<f64> {
        dicom_object.element(tag).ok()?.to_float64().ok()
    }

    fn get_string(dicom_object: &FileDicomObject<InMemDicomObject>, tag: Tag) -> Option<String> {
        let value = dicom_object.element(tag).ok()?.to_str().ok()?;
        Some(value.trim().to_string())
    }

    /// First frame, first sample, with the modality LUT applied
    fn decode_image(dicom_object: &FileDicomObject<InMemDicomObject>) -> Option<Array2<f32>> {
        let pixel_data = dicom_object.decode_pixel_data().ok()?;
        let options = ConvertOptions::new().with_voi_lut(VoiLutOption::Identity);
        pixel_data
            .to_ndarray_with_options::<f32>(&options)
            .ok()
            .map(|arr| arr.slice_move(s![0, .., .., 0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom::core::header::Header;
    use dicom::core::{DataElement, PrimitiveValue, VR, dicom_value};
    use dicom::object::FileMetaTableBuilder;
    use dicom_dictionary_std::uids;

    const ROWS: u16 = 2;
    const COLUMNS: u16 = 3;

    fn image_elements(offset: u8) -> Vec<DataElement<InMemDicomObject>> {
        let pixels: Vec<u8> = (0..ROWS * COLUMNS).map(|i| i as u8 + offset).collect();
        vec![
            DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(ROWS)),
            DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(COLUMNS)),
            DataElement::new(tags::SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1_u16)),
            DataElement::new(tags::BITS_ALLOCATED, VR::US, PrimitiveValue::from(8_u16)),
            DataElement::new(tags::BITS_STORED, VR::US, PrimitiveValue::from(8_u16)),
            DataElement::new(tags::HIGH_BIT, VR::US, PrimitiveValue::from(7_u16)),
            DataElement::new(tags::PIXEL_REPRESENTATION, VR::US, PrimitiveValue::from(0_u16)),
            DataElement::new(
                tags::PHOTOMETRIC_INTERPRETATION,
                VR::CS,
                PrimitiveValue::from("MONOCHROME2"),
            ),
            DataElement::new(
                tags::PIXEL_DATA,
                VR::OB,
                PrimitiveValue::U8(pixels.into_iter().collect()),
            ),
        ]
    }

    fn file_object(
        elements: Vec<DataElement<InMemDicomObject>>,
    ) -> FileDicomObject<InMemDicomObject> {
        InMemDicomObject::from_element_iter(elements)
            .with_meta(
                FileMetaTableBuilder::new()
                    .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                    .media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
                    .media_storage_sop_instance_uid("1.2.826.0.1.3680043.2.1125.1"),
            )
            .unwrap()
    }

    fn geometry(z: f64) -> Vec<DataElement<InMemDicomObject>> {
        vec![
            DataElement::new(
                tags::IMAGE_POSITION_PATIENT,
                VR::DS,
                dicom_value!(F64, [-20.0, 10.0, z]),
            ),
            DataElement::new(
                tags::IMAGE_ORIENTATION_PATIENT,
                VR::DS,
                dicom_value!(F64, [1.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
            ),
            DataElement::new(tags::PIXEL_SPACING, VR::DS, dicom_value!(F64, [0.8, 0.6])),
        ]
    }

    fn mr_object(z: f64) -> FileDicomObject<InMemDicomObject> {
        let mut elements = geometry(z);
        elements.extend([
            DataElement::new(tags::MODALITY, VR::CS, PrimitiveValue::from("MR")),
            DataElement::new(
                tags::IMAGE_TYPE,
                VR::CS,
                dicom_value!(Strs, ["ORIGINAL", "primary ", "m"]),
            ),
            DataElement::new(tags::REPETITION_TIME, VR::DS, dicom_value!(F64, [2000.0])),
            DataElement::new(tags::ECHO_TIME, VR::DS, dicom_value!(F64, [30.0])),
        ]);
        elements.extend(image_elements(z as u8));
        file_object(elements)
    }

    fn ct_localizer() -> FileDicomObject<InMemDicomObject> {
        let mut elements = geometry(0.0);
        elements.extend([
            DataElement::new(tags::MODALITY, VR::CS, PrimitiveValue::from("CT")),
            DataElement::new(
                tags::IMAGE_TYPE,
                VR::CS,
                dicom_value!(Strs, ["ORIGINAL", "PRIMARY", "projection image"]),
            ),
        ]);
        elements.extend(image_elements(0));
        file_object(elements)
    }

    #[test]
    fn test_read_slice_attributes() {
        let slices = VolumeLoader::read_slices(&[mr_object(3.0)]);
        assert_eq!(slices.len(), 1);
        let slice = &slices[0];

        assert_eq!(*slice.position(), Vector3::new(-20.0, 10.0, 3.0));
        assert_eq!(slice.orientation().row, Vector3::x());
        assert_eq!(slice.orientation().column, Vector3::y());
        assert_eq!(slice.pixel_spacing(), [0.8, 0.6]);
        assert_eq!(slice.modality(), "MR");
        assert_eq!(slice.image_type(), ["ORIGINAL", "PRIMARY", "M"]);
        assert!(!slice.is_localizer());

        let timing = slice.timing().unwrap();
        assert_eq!(timing.repetition_time, 2000.0);
        assert_eq!(timing.echo_time, 30.0);
    }

    #[test]
    fn test_decode_pixels_row_major() {
        let slices = VolumeLoader::read_slices(&[mr_object(10.0)]);
        let pixels = slices[0].pixels();
        assert_eq!(pixels.dim(), (ROWS as usize, COLUMNS as usize));
        assert_eq!(pixels[[0, 0]], 10.0);
        assert_eq!(pixels[[0, 2]], 12.0);
        assert_eq!(pixels[[1, 0]], 13.0);
    }

    #[test]
    fn test_ct_projection_image_is_localizer() {
        let slices = VolumeLoader::read_slices(&[ct_localizer()]);
        assert_eq!(slices.len(), 1);
        assert!(slices[0].is_localizer());
        assert!(!slices[0].has_timing());
    }

    #[test]
    fn test_objects_without_geometry_are_skipped() {
        let mut elements = geometry(0.0);
        elements.retain(|element| element.tag() != tags::IMAGE_POSITION_PATIENT);
        elements.extend(image_elements(0));
        let objects = [mr_object(1.0), file_object(elements), mr_object(2.0)];

        let slices = VolumeLoader::read_slices(&objects);
        let zs: Vec<f64> = slices.iter().map(|slice| slice.position().z).collect();
        assert_eq!(zs, [1.0, 2.0]);
    }
}
