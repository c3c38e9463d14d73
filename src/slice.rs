use crate::geometry::DirectionCosines;

use nalgebra::Vector3;
use ndarray::Array2;

pub const LOCALIZER: &str = "LOCALIZER";
pub const PROJECTION_IMAGE: &str = "PROJECTION IMAGE";

/// Repetition and echo time of an acquisition, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub repetition_time: f64,
    pub echo_time: f64,
}

/// One 2-D cross-sectional image and its spatial metadata.
///
/// Slices are read once and never mutated by the pipeline; filters move
/// them between series and the assembler only borrows them.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    position: Vector3<f64>,
    orientation: DirectionCosines,
    pixel_spacing: [f64; 2],
    pixels: Array2<f32>,
    modality: String,
    image_type: Option<Vec<String>>,
    repetition_time: Option<f64>,
    echo_time: Option<f64>,
}

impl Slice {
    /// Create a slice from its geometry and pixel grid
    ///
    /// # Arguments
    ///
    /// * `position` - ImagePositionPatient, the centre of the first pixel
    /// * `orientation` - ImageOrientationPatient row/column cosines
    /// * `pixel_spacing` - PixelSpacing as (row spacing, column spacing)
    /// * `pixels` - pixel grid indexed (row, column)
    pub fn new(
        position: Vector3<f64>,
        orientation: DirectionCosines,
        pixel_spacing: [f64; 2],
        pixels: Array2<f32>,
    ) -> Self {
        Self {
            position,
            orientation,
            pixel_spacing,
            pixels,
            modality: String::new(),
            image_type: None,
            repetition_time: None,
            echo_time: None,
        }
    }

    pub fn with_modality(mut self, modality: impl Into<String>) -> Self {
        self.modality = modality.into();
        self
    }

    /// Image type values are stored trimmed and upper-case
    pub fn with_image_type<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.image_type = Some(
            values
                .into_iter()
                .map(|value| value.as_ref().trim().to_ascii_uppercase())
                .collect(),
        );
        self
    }

    pub fn with_repetition_time(mut self, repetition_time: f64) -> Self {
        self.repetition_time = Some(repetition_time);
        self
    }

    pub fn with_echo_time(mut self, echo_time: f64) -> Self {
        self.echo_time = Some(echo_time);
        self
    }

    pub fn position(&self) -> &Vector3<f64> {
        &self.position
    }

    pub fn orientation(&self) -> &DirectionCosines {
        &self.orientation
    }

    pub fn pixel_spacing(&self) -> [f64; 2] {
        self.pixel_spacing
    }

    pub fn pixels(&self) -> &Array2<f32> {
        &self.pixels
    }

    pub fn modality(&self) -> &str {
        &self.modality
    }

    pub fn image_type(&self) -> &[String] {
        self.image_type.as_deref().unwrap_or_default()
    }

    pub fn has_image_type(&self) -> bool {
        self.image_type.is_some()
    }

    pub fn has_timing(&self) -> bool {
        self.repetition_time.is_some() && self.echo_time.is_some()
    }

    /// Both timing values, only when both are present
    pub fn timing(&self) -> Option<Timing> {
        Some(Timing {
            repetition_time: self.repetition_time?,
            echo_time: self.echo_time?,
        })
    }

    pub fn has_image_type_value(&self, value: &str) -> bool {
        self.image_type().iter().any(|v| v == value)
    }

    /// Scout/reference image that is not part of the diagnostic volume.
    ///
    /// CT localizers are sometimes only flagged as projection images.
    pub fn is_localizer(&self) -> bool {
        if !self.has_image_type() {
            return false;
        }
        self.has_image_type_value(LOCALIZER)
            || (self.modality.contains("CT") && self.has_image_type_value(PROJECTION_IMAGE))
    }

    /// Signed distance along the slice normal
    pub fn normal_projection(&self) -> f64 {
        self.position.dot(&self.orientation.normal())
    }
}
