//! stavescan CLI: bar-line and slur extraction on one sheet.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use stavescan::sheet::SheetLayout;
use stavescan::{BarsConfig, SlursBuilder, SlursConfig, SlursReport};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "stavescan")]
#[command(about = "Classify bar lines and retrieve slurs on a binarized music sheet")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the vertical sticks of a layout into bar lines.
    Bars(CliBarsArgs),

    /// Retrieve slurs from a skeleton image.
    Slurs(CliSlursArgs),

    /// Print the default configuration (JSON).
    DefaultConfig,
}

#[derive(Debug, Clone, Args)]
struct CliCommonArgs {
    /// Sheet layout (JSON): scale, skew, staves and sticks.
    #[arg(long)]
    layout: PathBuf,

    /// Stage configuration (JSON). Missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to write the report (JSON). Printed to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliBarsArgs {
    #[command(flatten)]
    common: CliCommonArgs,

    /// Staff-free foreground image, used to detect chunks at stick ends.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Minimum suite grade for a stick to be accepted as a bar.
    #[arg(long)]
    min_grade: Option<f64>,
}

#[derive(Debug, Clone, Args)]
struct CliSlursArgs {
    #[command(flatten)]
    common: CliCommonArgs,

    /// One-pixel-wide skeleton image (dark pixels are foreground).
    #[arg(long)]
    skeleton: PathBuf,

    /// Path to write the tracing state as a gray-level PNG.
    #[arg(long)]
    state_image: Option<PathBuf>,

    /// Maximum distance of slur points to their circle (interline).
    #[arg(long)]
    max_arcs_distance: Option<f64>,
}

/// Configuration of both stages, as read from `--config`.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct StageConfig {
    bars: BarsConfig,
    slurs: SlursConfig,
}

impl StageConfig {
    fn load(path: Option<&Path>) -> CliResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let data = std::fs::read_to_string(path).map_err(|e| -> CliError {
            format!("Failed to read config {}: {}", path.display(), e).into()
        })?;
        Ok(serde_json::from_str(&data)?)
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bars(args) => run_bars(&args),
        Commands::Slurs(args) => run_slurs(&args),
        Commands::DefaultConfig => run_default_config(),
    }
}

fn load_layout(path: &Path) -> CliResult<SheetLayout> {
    tracing::info!("Loading layout: {}", path.display());
    let layout = SheetLayout::from_json_file(path).map_err(|e| -> CliError {
        format!("Failed to load layout {}: {}", path.display(), e).into()
    })?;
    tracing::info!(
        "Layout: interline {} px, {} staves, {} sticks",
        layout.scale.interline,
        layout.staves.len(),
        layout.sticks.len()
    );
    Ok(layout)
}

fn load_gray(path: &Path) -> CliResult<image::GrayImage> {
    tracing::info!("Loading image: {}", path.display());
    let img = image::open(path).map_err(|e| -> CliError {
        format!("Failed to open image {}: {}", path.display(), e).into()
    })?;
    let gray = img.to_luma8();
    let (w, h) = gray.dimensions();
    tracing::info!("Image size: {}x{}", w, h);
    Ok(gray)
}

fn write_json<T: serde::Serialize>(value: &T, out: Option<&Path>) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            std::fs::write(path, &json)?;
            tracing::info!("Results written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

// ── bars ───────────────────────────────────────────────────────────────

fn run_bars(args: &CliBarsArgs) -> CliResult<()> {
    let layout = load_layout(&args.common.layout)?;
    let mut config = StageConfig::load(args.common.config.as_deref())?.bars;
    if let Some(min_grade) = args.min_grade {
        config.min_grade = min_grade;
    }

    let pixels = args.image.as_deref().map(load_gray).transpose()?;
    let source = pixels
        .as_ref()
        .map(|img| img as &dyn stavescan::sheet::PixelSource);

    let report = stavescan::detect_bars(&layout, &config, source)?;
    tracing::info!(
        "{} bar lines in {} systems, {} sticks rejected",
        report.bar_count(),
        report.systems.len(),
        report.rejected.len()
    );

    write_json(&report, args.common.out.as_deref())
}

// ── slurs ──────────────────────────────────────────────────────────────

fn run_slurs(args: &CliSlursArgs) -> CliResult<()> {
    let layout = load_layout(&args.common.layout)?;
    let mut config = StageConfig::load(args.common.config.as_deref())?.slurs;
    if let Some(d) = args.max_arcs_distance {
        config.max_arcs_distance = d;
    }

    let skeleton = load_gray(&args.skeleton)?;
    let mut builder = SlursBuilder::new(
        &config,
        layout.scale,
        layout.skew,
        &layout.staves,
        &skeleton,
    );
    builder.build_slurs();
    let report = SlursReport::from_builder(&builder);

    if let Some(path) = &args.state_image {
        builder.state_image().save(path)?;
        tracing::info!("Tracing state written to {}", path.display());
    }

    write_json(&report, args.common.out.as_deref())
}

// ── default-config ─────────────────────────────────────────────────────

fn run_default_config() -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&StageConfig::default())?);
    Ok(())
}
