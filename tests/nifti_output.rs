//! Writing converted volumes to disk.

mod common;

use common::{COLUMNS, ROWS, axial_series, axial_slice};
use dicom_nifti::{ConversionSettings, Orientation, convert_slices};
use nifti::{NiftiObject, ReaderOptions};
use tempfile::tempdir;

#[test]
fn test_save_roundtrip_preserves_geometry() {
    let mut series = axial_series(&[0.0, 2.0, 4.0, 6.0]);
    series[0] = axial_slice(0.0)
        .with_repetition_time(2000.0)
        .with_echo_time(30.0);
    let conversion = convert_slices(series, &ConversionSettings::default()).unwrap();

    let dir = tempdir().unwrap();
    for name in ["volume.nii", "volume.nii.gz"] {
        let path = dir.path().join(name);
        conversion.save(&path).unwrap();

        let object = ReaderOptions::new().read_file(&path).unwrap();
        let header = object.header();
        assert_eq!(header.dim[0], 3);
        assert_eq!(header.dim[1] as usize, COLUMNS);
        assert_eq!(header.dim[2] as usize, ROWS);
        assert_eq!(header.dim[3], 4);
        assert!((header.pixdim[1] - 0.6).abs() < 1e-6);
        assert!((header.pixdim[2] - 0.8).abs() < 1e-6);
        assert!((header.pixdim[3] - 2.0).abs() < 1e-6);
        assert!((header.pixdim[4] - 2.0).abs() < 1e-6);
        assert_eq!(header.sform_code, 1);
        assert_eq!(header.srow_x[3], 20.0);
        assert_eq!(header.srow_y[3], -10.0);
    }
}

#[test]
fn test_preview_image_is_written() {
    let conversion = convert_slices(
        axial_series(&[0.0, 1.0, 2.0, 3.0]),
        &ConversionSettings::default(),
    )
    .unwrap();
    let image = conversion
        .volume
        .get_image_from_axis(2, Orientation::Axial)
        .unwrap();
    assert_eq!(image.dimensions(), (COLUMNS as u32, ROWS as u32));

    let dir = tempdir().unwrap();
    let path = dir.path().join("preview.png");
    image.save(&path).unwrap();
    assert!(path.exists());
}
