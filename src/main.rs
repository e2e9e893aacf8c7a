use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use map_extract::overpass::{CancelToken, FallbackPolicy};
use map_extract::types::{ClickPoints, Coord};
use map_extract::{ExtractError, Settings, extract};

#[derive(Parser, Debug)]
#[command(version, about = "Extract OSM features inside a polygon and export them")]
struct Args {
    /// Boundary point as LON,LAT. Repeat for each point, at least three.
    #[arg(
        short,
        long = "point",
        value_name = "LON,LAT",
        value_parser = parse_point,
        required = true,
        allow_hyphen_values = true
    )]
    points: Vec<Coord>,

    /// Tag key to extract, e.g. amenity. Repeatable; defaults to the settings file.
    #[arg(short, long = "category", value_name = "KEY")]
    categories: Vec<String>,

    /// Directory the four export files are written to.
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Settings file; defaults to settings.json in the user config directory.
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Fall back to synthetic data when every endpoint fails.
    #[arg(long)]
    synthetic: bool,

    /// Seed for synthetic data.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn parse_point(s: &str) -> Result<Coord, String> {
    let (lon, lat) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LON,LAT, got {s:?}"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("longitude: {e}"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("latitude: {e}"))?;
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(format!("{s} is not a valid position"));
    }
    Ok(Coord::new(lon, lat))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), ExtractError> {
    let mut settings = match &args.settings {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    if !args.categories.is_empty() {
        settings.categories = args.categories.clone();
    }
    if args.synthetic {
        settings.fallback = FallbackPolicy::Synthetic { seed: args.seed };
    }

    let mut clicks = ClickPoints::new(settings.point_cap);
    for point in &args.points {
        clicks.push(*point)?;
    }
    if !clicks.is_ready() {
        warn!("{} of {} points placed", clicks.len(), clicks.cap());
    }

    let client = settings.client();
    let extraction = extract(
        &clicks.coords(),
        &settings.categories,
        &settings,
        &client,
        &CancelToken::new(),
    )?;
    if extraction.is_degraded() {
        warn!("Results are synthetic, not OpenStreetMap data");
    }

    let stats = serde_json::to_string_pretty(&extraction.stats)
        .map_err(|e| ExtractError::ExportFailure(e.to_string()))?;
    println!("{stats}");

    fs::create_dir_all(&args.out_dir)
        .map_err(|e| ExtractError::ExportFailure(format!("{}: {}", args.out_dir.display(), e)))?;
    for payload in extraction.exports(&settings)? {
        let path = args.out_dir.join(payload.file_name);
        fs::write(&path, &payload.content)
            .map_err(|e| ExtractError::ExportFailure(format!("{}: {}", path.display(), e)))?;
        info!("Wrote {} ({})", path.display(), payload.mime_type);
    }
    Ok(())
}
