use thiserror::Error;

/// A geometric check on the slice series failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Too few slices to form a volume ({found}, need at least {required})")]
    TooFewSlices { found: usize, required: usize },

    #[error("Image orientations are not consistent through all slices")]
    OrientationInconsistent,

    #[error("Image is not orthogonal (non cubical image or gantry tilt)")]
    NotOrthogonal,

    #[error("Slice increment is not consistent through all slices")]
    SliceIncrementInconsistent,
}

impl ValidationError {
    /// Symbolic code identifying the check that failed
    pub fn reason_code(&self) -> &'static str {
        match self {
            ValidationError::TooFewSlices { .. } => "TOO_FEW_SLICES/LOCALIZER",
            ValidationError::OrientationInconsistent => "IMAGE_ORIENTATION_INCONSISTENT",
            ValidationError::NotOrthogonal => "NON_CUBICAL_IMAGE/GANTRY_TILT",
            ValidationError::SliceIncrementInconsistent => "SLICE_INCREMENT_INCONSISTENT",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("No slices found in the input series")]
    NoSlicesFound,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Slices do not span a volume")]
    NotAVolume,

    #[error("Inconsistent image dimensions")]
    InconsistentDimensions,

    #[error("Resampling failed: {0}")]
    Resample(String),

    #[error("NIfTI error: {0}")]
    Nifti(#[from] nifti::error::NiftiError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl ConversionError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            ConversionError::NoSlicesFound => "NO_DICOM_FILES_FOUND",
            ConversionError::Validation(err) => err.reason_code(),
            ConversionError::NotAVolume => "NOT_A_VOLUME",
            ConversionError::InconsistentDimensions => "INCONSISTENT_DIMENSIONS",
            ConversionError::Resample(_) => "RESAMPLE_FAILED",
            ConversionError::Nifti(_) => "NIFTI_WRITE_FAILED",
            ConversionError::Image(_) => "IMAGE_WRITE_FAILED",
        }
    }
}
