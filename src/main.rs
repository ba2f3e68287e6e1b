use std::ops::Range;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rememe::{
    DEFAULT_CLUSTER_RANGE, DEFAULT_THRESHOLD_MAX, DEFAULT_THRESHOLD_MIN, FileCodec, ImageCodec,
    RememeError, SubstitutionConfig, SubstitutionEngine,
};

#[derive(Parser)]
#[command(name = "rememe")]
#[command(about = "Swap the placeholder picture inside a meme template")]
struct Cli {
    /// Template image containing the placeholder
    template: PathBuf,

    /// Image to paste into the placeholder
    substitute: PathBuf,

    /// Output image path (format follows the extension)
    #[arg(short, long)]
    output: PathBuf,

    /// Run a single attempt with this many dominant-color clusters (0 = white)
    #[arg(short, long, conflicts_with = "sweep")]
    clusters: Option<usize>,

    /// Cluster amounts to try in foolproof mode, e.g. "0..6"
    #[arg(short, long, value_parser = parse_range)]
    sweep: Option<Range<usize>>,

    /// Explicit substitute size, e.g. "320x240" (single attempt only)
    #[arg(short, long, value_parser = parse_size, requires = "clusters")]
    resize: Option<(u32, u32)>,

    /// Color match tolerance in RGB units
    #[arg(short, long)]
    tolerance: Option<f64>,

    /// Minimum accepted coverage fraction
    #[arg(long, default_value_t = DEFAULT_THRESHOLD_MIN)]
    min: f64,

    /// Maximum accepted coverage fraction
    #[arg(long, default_value_t = DEFAULT_THRESHOLD_MAX)]
    max: f64,
}

fn parse_range(s: &str) -> Result<Range<usize>, String> {
    let (start, end) = s
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got {s:?}"))?;
    let start = start.trim().parse().map_err(|e| format!("bad range start: {e}"))?;
    let end = end.trim().parse().map_err(|e| format!("bad range end: {e}"))?;
    Ok(start..end)
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let w = w.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let h = h.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    Ok((w, h))
}

fn run(cli: Cli) -> Result<bool, RememeError> {
    let mut config = SubstitutionConfig {
        threshold_min: cli.min,
        threshold_max: cli.max,
        ..SubstitutionConfig::default()
    };
    if let Some(tolerance) = cli.tolerance {
        config.tolerance = tolerance;
    }
    let mut engine = SubstitutionEngine::new(config)?;

    let output = match cli.clusters {
        Some(clusters) => {
            let image = engine.substitute(&cli.template, &cli.substitute, clusters, cli.resize)?;
            let (min, max) = (engine.config().threshold_min, engine.config().threshold_max);
            if !engine.validate_last_substitution(min, max)? {
                error!("placeholder coverage is outside [{min}, {max}]");
                return Ok(false);
            }
            image
        }
        None => {
            let range = cli.sweep.unwrap_or(DEFAULT_CLUSTER_RANGE);
            match engine.substitute_until_valid(&cli.template, &cli.substitute, range)? {
                Some(image) => image,
                None => {
                    error!("no valid placeholder found");
                    return Ok(false);
                }
            }
        }
    };

    if let Some(record) = engine.last_substitution() {
        info!(
            color = %record.dominant_color,
            region = ?record.region,
            coverage = record.coverage(),
            "placeholder replaced"
        );
        if !record.placement_fits() {
            warn!(placement = ?record.placement, "substitute was clipped at the template edge");
        }
    }
    FileCodec.save(&output, &cli.output)?;
    info!(path = %cli.output.display(), "output written");
    Ok(true)
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rememe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
