//! CLI: analyze a route file and print its classified curves.
//!
//! ```text
//! analyze_route --route route.json
//! ```
//!
//! Input is a JSON array of `{"lat": ..., "lon": ...}` points.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Parser;
use curve_call::{analyze, AnalysisConfig, GeoPoint};

#[derive(Parser, Debug)]
struct Args {
    /// Path to a JSON file containing an array of {lat, lon} points.
    #[arg(long)]
    route: PathBuf,

    /// Enable motorcycle lean-angle narration.
    #[arg(long)]
    motorcycle: bool,

    /// Resample spacing in meters.
    #[arg(long, default_value = "10.0")]
    spacing_m: f64,
}

fn load_points(path: &PathBuf) -> anyhow::Result<Vec<GeoPoint>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let points: Vec<GeoPoint> = serde_json::from_reader(reader)?;
    Ok(points)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let points = load_points(&args.route)?;
    log::info!("loaded {} points from {:?}", points.len(), args.route);

    let config = AnalysisConfig {
        resample_spacing_m: args.spacing_m,
        is_motorcycle_mode: args.motorcycle,
        ..AnalysisConfig::default()
    };

    let output = analyze(&points, &config)?;
    log::info!(
        "analyzed {} segments over {:.0}m",
        output.segments.len(),
        output.total_distance_m
    );

    for segment in &output.segments {
        if let Some(curve) = segment.as_curve() {
            println!(
                "curve @ {:>7.0}m  {:?} {:?}  radius={:>6.0}m  arc={:>5.0}m  confidence={:.2}{}",
                curve.distance_from_start_m,
                curve.direction,
                curve.severity,
                curve.min_radius_m,
                curve.arc_length_m,
                curve.confidence,
                curve
                    .compound_type
                    .map(|k| format!("  compound={k:?}"))
                    .unwrap_or_default(),
            );
        }
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
