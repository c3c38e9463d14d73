use crate::error::ConversionError;
use crate::slice::Timing;
use crate::volume::Volume;

use nifti::NiftiHeader;
use nifti::writer::WriterOptions;
use std::path::Path;

/// NIFTI_XFORM_SCANNER_ANAT
const XFORM_SCANNER_ANAT: i16 = 1;
/// NIFTI_UNITS_MM | NIFTI_UNITS_SEC
const UNITS_MM_SEC: u8 = 2 | 8;

/// Header describing `volume`'s geometry and timing.
///
/// The affine is stored as sform. Repetition time goes to `pixdim[4]` in
/// seconds, and both times are recorded in `db_name` as `?TR:<tr> TE:<te>`.
pub fn nifti_header(volume: &Volume) -> NiftiHeader {
    let mut header = NiftiHeader::default();
    let spacing = volume.spacing();

    header.pixdim[0] = 1.0;
    header.pixdim[1] = spacing.x as f32;
    header.pixdim[2] = spacing.y as f32;
    header.pixdim[3] = spacing.z as f32;
    header.xyzt_units = UNITS_MM_SEC;

    header.sform_code = XFORM_SCANNER_ANAT;
    let affine = volume.affine();
    let row = |r: usize| {
        [
            affine[(r, 0)] as f32,
            affine[(r, 1)] as f32,
            affine[(r, 2)] as f32,
            affine[(r, 3)] as f32,
        ]
    };
    header.srow_x = row(0);
    header.srow_y = row(1);
    header.srow_z = row(2);

    if let Some(timing) = volume.timing() {
        set_tr_te(&mut header, timing);
    }
    header
}

fn set_tr_te(header: &mut NiftiHeader, timing: Timing) {
    header.pixdim[4] = (timing.repetition_time / 1000.0) as f32;

    let text = format!(
        "?TR:{:.3} TE:{}",
        timing.repetition_time,
        timing.echo_time.trunc() as i64
    );
    // db_name is fixed width; longer descriptions are cut off
    header.db_name.iter_mut().for_each(|byte| *byte = 0);
    for (dst, src) in header.db_name.iter_mut().zip(text.bytes()) {
        *dst = src;
    }
}

/// Write `volume` to `path` as `.nii`, or gzip compressed for `.nii.gz`.
pub fn write_nifti(volume: &Volume, path: impl AsRef<Path>) -> Result<(), ConversionError> {
    let header = nifti_header(volume);
    WriterOptions::new(path.as_ref())
        .reference_header(&header)
        .write_nifti(volume.data())?;
    Ok(())
}
