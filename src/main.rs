use std::path::PathBuf;

use clap::Parser;
use dicom_nifti::{ConversionSettings, Interpolation, Orientation, VolumeLoader, VolumeLoaderError};
use tracing::{error, info};

/// Convert a directory holding one DICOM series into a NIfTI volume
#[derive(Parser, Debug)]
#[command(author, about, version, long_about = None)]
struct Args {
    /// Directory containing the .dcm files of one series
    input_dir: PathBuf,

    /// Output file, `.nii` or `.nii.gz`
    #[arg(short, long, default_value = "volume.nii.gz")]
    output: PathBuf,

    /// Keep series with fewer than four slices and minority orientations
    #[arg(long)]
    no_validate_slicecount: bool,

    /// Allow slices with differing orientations
    #[arg(long)]
    no_validate_orientation: bool,

    /// Allow gantry tilt and non-orthogonal orientations
    #[arg(long)]
    no_validate_orthogonal: bool,

    /// Allow irregular slice spacing
    #[arg(long)]
    no_validate_slice_increment: bool,

    /// Resample irregularly spaced series (requires --no-validate-slice-increment)
    #[arg(long)]
    resample: bool,

    /// Interpolation used when resampling
    #[arg(long, value_enum, default_value_t = Interpolation::Nearest)]
    interpolation: Interpolation,

    /// Value for voxels outside the acquired data after resampling
    #[arg(long, default_value_t = 0.0)]
    padding: f32,

    /// Also write the centre plane of the volume as PNG
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Axis of the preview plane
    #[arg(long, value_enum, default_value_t = Orientation::Axial)]
    preview_axis: Orientation,

    /// Log every pipeline stage
    #[arg(short, long)]
    verbose: bool,
}

impl From<&Args> for ConversionSettings {
    fn from(args: &Args) -> Self {
        ConversionSettings::new()
            .with_validate_slicecount(!args.no_validate_slicecount)
            .with_validate_orientation(!args.no_validate_orientation)
            .with_validate_orthogonal(!args.no_validate_orthogonal)
            .with_validate_slice_increment(!args.no_validate_slice_increment)
            .with_resample(args.resample)
            .with_resample_interpolation(args.interpolation)
            .with_resample_padding(args.padding)
    }
}

fn run(args: &Args) -> Result<(), VolumeLoaderError> {
    let settings = ConversionSettings::from(args);
    let conversion = VolumeLoader::load_from_directory(&args.input_dir, &settings)?;
    info!(
        dim = ?conversion.volume.dim(),
        spacing = ?conversion.volume.spacing().as_slice(),
        max_slice_increment = conversion.max_slice_increment,
        "Converted series"
    );
    conversion.save(&args.output)?;

    if let Some(preview) = &args.preview {
        let volume = &conversion.volume;
        let (x, y, z) = volume.dim();
        let center = match args.preview_axis {
            Orientation::Axial => z / 2,
            Orientation::Coronal => y / 2,
            Orientation::Sagittal => x / 2,
        };
        if let Some(image) = volume.get_image_from_axis(center, args.preview_axis) {
            image
                .save(preview)
                .map_err(dicom_nifti::ConversionError::from)?;
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(e) = run(&args) {
        match &e {
            VolumeLoaderError::Conversion(conversion) => {
                error!(reason = conversion.reason_code(), "{e}")
            }
            _ => error!("{e}"),
        }
        std::process::exit(1);
    }
}
