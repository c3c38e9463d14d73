use clap::ValueEnum;

/// Anatomical viewing axis of a volume preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Orientation {
    Axial,
    Coronal,
    Sagittal,
}

/// Sampling used when sub-volumes are resampled onto a common grid
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Interpolation {
    #[default]
    Nearest,
    Linear,
}
