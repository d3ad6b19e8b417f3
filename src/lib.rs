//! Composure: photographic composition scoring.
//!
//! Composure relates detected subjects to classical framing guides
//! (rule-of-thirds lines, the golden spiral) and, separately, ranks images
//! by keypoint-descriptor similarity to a query.
//!
//! # Modules
//!
//! - [`geometry`]: points, typed boxes and detector output
//! - [`guides`]: thirds-grid and golden-spiral guide generation
//! - [`proximity`]: nearest-guide-point scoring per subject
//! - [`features`]: binary descriptors, extraction and cross-check matching
//! - [`similarity`]: corpus ranking against a query image
//! - [`detect`]: detector seam and the shared analysis context
//! - [`render`]: annotated output images
//! - [`config`]: YAML settings
//! - [`error`]: error types for composure operations

pub mod config;
pub mod detect;
pub mod error;
pub mod features;
pub mod geometry;
pub mod guides;
pub mod logging;
pub mod proximity;
pub mod render;
pub mod similarity;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use config::Settings;
use detect::{Context, JsonDetector};
use features::{FeatureExtractor, OrbExtractor};
use guides::{GuideSet, Orientation, ThirdsLayout};
use proximity::{score_detections, CompositionReport};
use similarity::SimilarityRanker;

pub use error::ComposureError;

/// The composure CLI application.
#[derive(Parser)]
#[command(name = "composure")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// YAML settings file with defaults for spiral, matching and extractor tunables.
    #[arg(long, global = true, env = "COMPOSURE_CONFIG")]
    config: Option<PathBuf>,

    /// More log output (repeat for trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Less log output (repeat for errors only).
    #[arg(long, global = true, action = clap::ArgAction::Count)]
    quiet: u8,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Score subjects against rule-of-thirds lines.
    Rot(RotArgs),
    /// Score subjects against the golden spiral.
    Spiral(SpiralArgs),
    /// Rank a folder of images by similarity to a query image.
    Similarity(SimilarityArgs),
}

/// Report format on stdout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Descriptor extractor used for similarity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ExtractorModel {
    /// Oriented FAST corners with steered BRIEF descriptors.
    Orb,
    /// FAST corners with upright BRIEF descriptors.
    Brief,
}

/// Detection input and annotated-image options shared by `rot` and `spiral`.
#[derive(clap::Args)]
struct SubjectArgs {
    /// Image to analyse.
    #[arg(short, long)]
    image: PathBuf,

    /// Detections JSON written by an object detector
    /// (default: `<image stem>.detections.json` next to the image).
    #[arg(short, long)]
    detections: Option<PathBuf>,

    /// Ignore detections below this confidence.
    #[arg(long, default_value_t = 0.0)]
    min_confidence: f64,

    /// Do not write an annotated copy of the image.
    #[arg(long)]
    no_render: bool,

    /// Where to write the annotated image (default: `<image stem>-bounded.<ext>`).
    #[arg(long, conflicts_with = "no_render")]
    render_to: Option<PathBuf>,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

/// Arguments for the rot subcommand.
#[derive(clap::Args)]
struct RotArgs {
    #[command(flatten)]
    subject: SubjectArgs,

    /// Which thirds lines to use.
    #[arg(short, long, value_enum, default_value_t = Orientation::Vertical)]
    orient: Orientation,

    /// Grid size: 3 for vertical/horizontal, 9 for blocks.
    #[arg(short, long, default_value_t = 3)]
    grid: u32,
}

/// Arguments for the spiral subcommand.
#[derive(clap::Args)]
struct SpiralArgs {
    #[command(flatten)]
    subject: SubjectArgs,

    /// Number of samples along the spiral.
    #[arg(long)]
    resolution: Option<usize>,

    /// Horizontal anchor position as a fraction of the width.
    #[arg(long)]
    offset_x: Option<f64>,

    /// Vertical anchor position as a fraction of the height.
    #[arg(long)]
    offset_y: Option<f64>,
}

/// Arguments for the similarity subcommand.
#[derive(clap::Args)]
struct SimilarityArgs {
    /// Query image.
    #[arg(short, long)]
    query: PathBuf,

    /// Folder of images to rank (created if missing).
    #[arg(short, long)]
    folder: PathBuf,

    /// Descriptor extractor.
    #[arg(short, long, value_enum, default_value_t = ExtractorModel::Orb)]
    model: ExtractorModel,

    /// Number of closest matches averaged per comparison.
    #[arg(long)]
    top_k: Option<usize>,

    /// Mean match distance that maps to a score of zero.
    #[arg(long)]
    max_distance: Option<f64>,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

/// Run the composure CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), ComposureError> {
    let cli = Cli::parse();
    logging::init(logging::level_from_flags(cli.verbose, cli.quiet));

    match cli.command {
        Some(Commands::Rot(args)) => run_rot(args),
        Some(Commands::Spiral(args)) => run_spiral(args, cli.config.as_deref()),
        Some(Commands::Similarity(args)) => run_similarity(args, cli.config.as_deref()),
        None => {
            println!("composure {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Composition scoring against thirds and golden-spiral guides.");
            println!();
            println!("Run 'composure --help' for usage information.");
            Ok(())
        }
    }
}

fn build_extractor(model: ExtractorModel, settings: &Settings) -> Box<dyn FeatureExtractor> {
    match model {
        ExtractorModel::Orb => Box::new(OrbExtractor::new(settings.extractor)),
        ExtractorModel::Brief => Box::new(OrbExtractor::upright(settings.extractor)),
    }
}

fn subject_context(subject: &SubjectArgs) -> Context {
    let detector = JsonDetector::new(subject.detections.clone(), subject.min_confidence);
    Context::new().with_detector(Box::new(detector))
}

/// Execute the rot subcommand.
fn run_rot(args: RotArgs) -> Result<(), ComposureError> {
    // Reject bad orientation/grid pairs before touching any file.
    let layout = ThirdsLayout::new(args.orient, args.grid).inspect_err(|err| warn!("{err}"))?;

    let context = subject_context(&args.subject);

    let (width, height) = read_image_dimensions(&args.subject.image)?;
    info!("finding rule of thirds");
    let guides = GuideSet::thirds_grid(width, height, layout)?;

    analyse_subjects(&context, &args.subject, guides, Some(layout), (width, height))
}

/// Execute the spiral subcommand.
fn run_spiral(args: SpiralArgs, config: Option<&Path>) -> Result<(), ComposureError> {
    let mut settings = Settings::load_or_default(config)?;
    if let Some(resolution) = args.resolution {
        settings.spiral.resolution = resolution;
    }
    if let Some(offset_x) = args.offset_x {
        settings.spiral.offset_x = offset_x;
    }
    if let Some(offset_y) = args.offset_y {
        settings.spiral.offset_y = offset_y;
    }
    settings
        .spiral
        .validate()
        .inspect_err(|err| warn!("{err}"))?;

    let spiral = settings.spiral;
    let context = subject_context(&args.subject);

    let (width, height) = read_image_dimensions(&args.subject.image)?;
    info!(resolution = spiral.resolution, "computing golden spiral");
    let guides = GuideSet::golden_spiral(width, height, &spiral)?;

    analyse_subjects(&context, &args.subject, guides, None, (width, height))
}

/// Detect, score, render and report for one image and guide set.
fn analyse_subjects(
    context: &Context,
    subject: &SubjectArgs,
    guides: GuideSet,
    layout: Option<ThirdsLayout>,
    (width, height): (u32, u32),
) -> Result<(), ComposureError> {
    let image = &subject.image;
    let detections = context.detector()?.detect(image, width, height)?;
    info!(subjects = detections.len(), "predicted objects in image");

    let results = score_detections(&guides.points, &detections)?;
    for result in &results {
        info!(
            label = %result.detection.label,
            closest_point = %result.closest_point,
            point_index = result.point_index,
            min_distance = result.distance,
            "found the closest guide point"
        );
    }

    let annotated_image = if subject.no_render {
        None
    } else {
        let out = subject
            .render_to
            .clone()
            .unwrap_or_else(|| render::annotated_path(image));
        render::render_annotated(image, &guides, &results, &out)?;
        Some(out)
    };

    let report = CompositionReport {
        image: image.clone(),
        width,
        height,
        guide_kind: guides.kind,
        layout,
        guide_points: guides.len(),
        results,
        annotated_image,
    };

    match subject.output {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            print!("{}", report);
            Ok(())
        }
    }
}

/// Execute the similarity subcommand.
fn run_similarity(args: SimilarityArgs, config: Option<&Path>) -> Result<(), ComposureError> {
    let mut settings = Settings::load_or_default(config)?;
    if let Some(top_k) = args.top_k {
        settings.matching.top_k = top_k;
    }
    if let Some(max_distance) = args.max_distance {
        settings.matching.max_distance = max_distance;
    }
    settings
        .matching
        .validate()
        .inspect_err(|err| warn!("{err}"))?;

    let context = Context::new().with_extractor(build_extractor(args.model, &settings));

    let ranker = SimilarityRanker::new(context.extractor()?, settings.matching);
    let report = ranker.rank(&args.query, &args.folder)?;

    match args.output {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            print!("{}", report);
            Ok(())
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), ComposureError> {
    let json =
        serde_json::to_string_pretty(value).map_err(|source| ComposureError::ReportWrite { source })?;
    println!("{}", json);
    Ok(())
}

/// Reads width and height from the image header without decoding pixels.
pub fn read_image_dimensions(path: &Path) -> Result<(u32, u32), ComposureError> {
    let size = imagesize::size(path).map_err(|source| ComposureError::DimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    let width: u32 = size
        .width
        .try_into()
        .map_err(|_| ComposureError::InvalidInput {
            path: path.to_path_buf(),
            message: format!("image width {} does not fit in u32", size.width),
        })?;

    let height: u32 = size
        .height
        .try_into()
        .map_err(|_| ComposureError::InvalidInput {
            path: path.to_path_buf(),
            message: format!("image height {} does not fit in u32", size.height),
        })?;

    Ok((width, height))
}
