//! # DICOM-NIfTI library
//!
//! This crate assembles the slices of one DICOM series into a single,
//! geometrically consistent 3-D volume and writes it as NIfTI.
//!
//! Raw acquisitions often contain things that silently corrupt a naively
//! stacked volume. Before stacking, the series goes through these steps:
//!  - Duplicate slices (same position, same pixel data) are removed
//!  - Localizers are removed by image type, and by orientation when the
//!    slice count is validated
//!  - Slice count, orientation, orthogonality and slice increment are
//!    validated, each check can be switched off in [`ConversionSettings`]
//!  - Slices are sorted along the slice normal
//!
//! A series with irregular slice spacing is either rejected or, with
//! resampling enabled and the increment check disabled, split into evenly
//! spaced sub-volumes that are merged on one grid at the finest spacing
//! found in the series.
//!
//! The DICOM files are decoded in parallel using rayon, as are the
//! sub-volumes and the resampling. DICOM files are assumed to have the
//! following attributes:
//!   - No multiframe (always the first frame is used)
//!   - Images from the same series (Series Instance UID)
//!
//! # Examples
//!
//! ## Converting a directory of DICOM files
//!
//! ```no_run
//! # use dicom_nifti::{ConversionSettings, VolumeLoader};
//! let settings = ConversionSettings::new()
//!     .with_validate_slice_increment(false)
//!     .with_resample(true);
//! let conversion = VolumeLoader::load_from_directory("dicom", &settings)
//!     .expect("should have converted files from directory");
//! println!("max slice increment: {}", conversion.max_slice_increment);
//! conversion
//!     .save("volume.nii.gz")
//!     .expect("should have written the volume");
//! ```
//!
//! ## Converting slices from another source
//!
//! ```
//! # use dicom_nifti::{ConversionSettings, DirectionCosines, Slice, convert_slices};
//! # use nalgebra::Vector3;
//! # use ndarray::Array2;
//! let slices: Vec<Slice> = (0..4)
//!     .map(|z| {
//!         Slice::new(
//!             Vector3::new(0.0, 0.0, z as f64 * 2.0),
//!             DirectionCosines::new(Vector3::x(), Vector3::y()),
//!             [0.5, 0.5],
//!             Array2::zeros((8, 8)),
//!         )
//!     })
//!     .collect();
//! let conversion = convert_slices(slices, &ConversionSettings::default()).unwrap();
//! assert_eq!(conversion.volume.dim(), (8, 8, 4));
//! ```

mod assembler;
pub mod config;
pub mod converter;
pub mod enums;
pub mod error;
pub mod filters;
pub mod geometry;
pub mod increment;
mod interpolator;
pub mod nifti_writer;
pub mod resample;
pub mod slice;
pub mod sorting;
pub mod validation;
pub mod volume;
pub mod volume_loader;

pub use assembler::{assemble_volume, create_affine};
pub use config::ConversionSettings;
pub use converter::{Conversion, convert_slices, convert_slices_with};
pub use enums::{Interpolation, Orientation};
pub use error::{ConversionError, ValidationError};
pub use geometry::DirectionCosines;
pub use resample::{GridResampler, Resampler};
pub use slice::{Slice, Timing};
pub use volume::Volume;
pub use volume_loader::{VolumeLoader, VolumeLoaderError};
