use crate::enums::Interpolation;

/// Switches for the conversion pipeline.
///
/// The defaults validate everything and never resample, so an irregular
/// series is rejected rather than silently reshaped:
///
/// ```
/// # use dicom_nifti::ConversionSettings;
/// let settings = ConversionSettings::new()
///     .with_validate_slice_increment(false)
///     .with_resample(true);
/// assert!(settings.validate_slicecount);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionSettings {
    /// Require a minimum slice count and drop minority orientations
    pub validate_slicecount: bool,
    /// Require one orientation for every slice
    pub validate_orientation: bool,
    /// Reject gantry tilt and non-orthogonal direction cosines
    pub validate_orthogonal: bool,
    /// Reject irregular slice spacing instead of handling it
    pub validate_slice_increment: bool,
    /// Split and resample series with irregular slice spacing
    pub resample: bool,
    pub resample_interpolation: Interpolation,
    /// Value for voxels outside every sub-volume
    pub resample_padding: f32,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            validate_slicecount: true,
            validate_orientation: true,
            validate_orthogonal: true,
            validate_slice_increment: true,
            resample: false,
            resample_interpolation: Interpolation::Nearest,
            resample_padding: 0.0,
        }
    }
}

impl ConversionSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validate_slicecount(mut self, enabled: bool) -> Self {
        self.validate_slicecount = enabled;
        self
    }

    pub fn with_validate_orientation(mut self, enabled: bool) -> Self {
        self.validate_orientation = enabled;
        self
    }

    pub fn with_validate_orthogonal(mut self, enabled: bool) -> Self {
        self.validate_orthogonal = enabled;
        self
    }

    pub fn with_validate_slice_increment(mut self, enabled: bool) -> Self {
        self.validate_slice_increment = enabled;
        self
    }

    pub fn with_resample(mut self, enabled: bool) -> Self {
        self.resample = enabled;
        self
    }

    pub fn with_resample_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.resample_interpolation = interpolation;
        self
    }

    pub fn with_resample_padding(mut self, padding: f32) -> Self {
        self.resample_padding = padding;
        self
    }

    /// Every check disabled
    pub fn permissive() -> Self {
        Self::default()
            .with_validate_slicecount(false)
            .with_validate_orientation(false)
            .with_validate_orthogonal(false)
            .with_validate_slice_increment(false)
    }
}
