//! The conversion pipeline from a slice series to one volume.

use crate::assembler::assemble_volume;
use crate::config::ConversionSettings;
use crate::error::ConversionError;
use crate::filters::{
    remove_duplicate_slices, remove_localizers_by_image_type, remove_localizers_by_orientation,
};
use crate::increment::{analyze_increments, select_target_spacing, split_increment_runs};
use crate::nifti_writer::write_nifti;
use crate::resample::{GridResampler, Resampler};
use crate::slice::Slice;
use crate::sorting::sort_slices;
use crate::validation::{
    validate_orientation, validate_orthogonal, validate_slice_increment, validate_slicecount,
};
use crate::volume::Volume;

use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Result of a successful conversion
#[derive(Debug, Clone)]
pub struct Conversion {
    pub volume: Volume,
    /// Largest distance between consecutive slices of the input
    pub max_slice_increment: f64,
}

impl Conversion {
    /// Write the volume as NIfTI; a `.gz` extension compresses the file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConversionError> {
        info!(path = %path.as_ref().display(), "Saving nifti to disk");
        write_nifti(&self.volume, path)
    }
}

/// Convert a slice series with the default [`GridResampler`] configured from
/// `settings`.
pub fn convert_slices(
    slices: Vec<Slice>,
    settings: &ConversionSettings,
) -> Result<Conversion, ConversionError> {
    let resampler = GridResampler::new(settings.resample_interpolation, settings.resample_padding);
    convert_slices_with(slices, settings, &resampler)
}

/// Convert a slice series into a single volume.
///
/// Duplicates and localizers are removed, the enabled geometric checks are
/// run and the remaining slices are sorted along their normal. An evenly
/// spaced series is stacked directly. An irregular one is rejected, unless
/// the slice increment check is disabled and `settings.resample` is set, in
/// which case it is split into evenly spaced runs that `resampler` merges.
///
/// # Errors
///
/// Returns [`ConversionError::NoSlicesFound`] for an empty series, a
/// [`ConversionError::Validation`] for the first failing check, and
/// [`ConversionError::NotAVolume`] when fewer than two distinct slices remain.
pub fn convert_slices_with(
    slices: Vec<Slice>,
    settings: &ConversionSettings,
    resampler: &dyn Resampler,
) -> Result<Conversion, ConversionError> {
    if slices.is_empty() {
        return Err(ConversionError::NoSlicesFound);
    }
    debug!(slices = slices.len(), "Starting conversion");

    let slices = remove_duplicate_slices(slices);
    let mut slices = remove_localizers_by_image_type(slices);

    if settings.validate_slicecount {
        slices = remove_localizers_by_orientation(slices);
        validate_slicecount(&slices)?;
    }
    if settings.validate_orientation {
        validate_orientation(&slices)?;
    }
    if settings.validate_orthogonal {
        validate_orthogonal(&slices)?;
    }

    let slices = sort_slices(slices);
    debug!(slices = slices.len(), "Sorted slices along the normal");

    let analysis = analyze_increments(&slices)?;
    if settings.validate_slice_increment {
        validate_slice_increment(&analysis)?;
    }

    if !analysis.consistent && settings.resample {
        debug!("Slice increment inconsistent, resampling");
        return convert_inconsistent_increments(&slices, resampler);
    }

    let refs: Vec<&Slice> = slices.iter().collect();
    let volume = assemble_volume(&refs)?;
    Ok(Conversion {
        volume,
        max_slice_increment: analysis.max_increment,
    })
}

/// Split into evenly spaced runs, stack each run and merge the runs at the
/// finest common spacing.
fn convert_inconsistent_increments(
    sorted: &[Slice],
    resampler: &dyn Resampler,
) -> Result<Conversion, ConversionError> {
    let split = split_increment_runs(sorted)?;
    debug!(runs = split.runs.len(), "Split series into sub-volumes");

    let volumes = split
        .runs
        .par_iter()
        .map(|run| assemble_volume(&run.slices))
        .collect::<Result<Vec<_>, _>>()?;

    let spacings: Vec<_> = volumes
        .iter()
        .zip(&split.runs)
        .map(|(volume, run)| (volume.spacing(), run.len()))
        .collect();
    let voxel_size = select_target_spacing(&spacings).ok_or(ConversionError::NotAVolume)?;
    debug!(voxel_size = ?voxel_size.as_slice(), "Selected target voxel size");

    let mut volume = resampler.resample(&volumes, voxel_size)?;
    if let Some(timing) = sorted[0].timing() {
        volume.timing = Some(timing);
    }

    Ok(Conversion {
        volume,
        max_slice_increment: split.max_increment,
    })
}
