//! CLI: replay a GPS log through the map matcher and narration
//! scheduler, printing each phrase as it would be spoken.
//!
//! ```text
//! simulate_drive --route route.json --log drive.json
//! ```
//!
//! `route.json` is the planned route (analyzed once up front).
//! `drive.json` is a JSON array of `{"timestamp", "lat", "lon",
//! "speed_ms"}` fixes, replayed in order with real-time pacing derived
//! from each fix's timestamp delta.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use serde::Deserialize;

use curve_call::config::{Mode, NarrationConfig};
use curve_call::error::SchedulerSignal;
use curve_call::geo::GeoPoint;
use curve_call::map_match::MapMatcher;
use curve_call::narration::NarrationScheduler;
use curve_call::{analyze, AnalysisConfig};

#[derive(Parser, Debug)]
struct Args {
    /// Path to the planned route (JSON array of {lat, lon}).
    #[arg(long)]
    route: PathBuf,

    /// Path to the GPS fix log to replay.
    #[arg(long)]
    log: PathBuf,

    /// Narrate motorcycle lean angles.
    #[arg(long)]
    motorcycle: bool,

    /// Replay as fast as possible instead of honoring fix timestamps.
    #[arg(long)]
    fast: bool,
}

#[derive(Deserialize)]
struct Fix {
    timestamp: f64,
    lat: f64,
    lon: f64,
    speed_ms: f64,
}

fn load_json<T: for<'de> Deserialize<'de>>(path: &PathBuf) -> anyhow::Result<T> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let route_points: Vec<GeoPoint> = load_json(&args.route)?;
    let config = AnalysisConfig {
        is_motorcycle_mode: args.motorcycle,
        ..AnalysisConfig::default()
    };
    let output = analyze(&route_points, &config)?;
    log::info!("analyzed route into {} segments", output.segments.len());

    let mode = if args.motorcycle { Mode::Motorcycle } else { Mode::Car };
    let mut matcher = MapMatcher::new(route_points);
    let mut scheduler = NarrationScheduler::new(NarrationConfig::for_mode(mode));
    scheduler.start();

    let fixes: Vec<Fix> = load_json(&args.log)?;
    let mut previous_timestamp = fixes.first().map(|f| f.timestamp).unwrap_or(0.0);

    for fix in &fixes {
        if !args.fast {
            let dt = (fix.timestamp - previous_timestamp).max(0.0);
            tokio::time::sleep(Duration::from_secs_f64(dt)).await;
        }
        previous_timestamp = fix.timestamp;

        let outcome = matcher.match_position(GeoPoint::new(fix.lat, fix.lon));
        if outcome.is_off_route {
            scheduler.handle_signal(SchedulerSignal::OffRoute);
        } else {
            scheduler.handle_signal(SchedulerSignal::BackOnRoute);
        }

        if let Some(event) = scheduler.on_location_update(&output.segments, outcome.route_progress_m, fix.speed_ms) {
            println!("[{}] [{:>7.1}s] {}", Utc::now().format("%H:%M:%S%.3f"), fix.timestamp, event.text);
            // A real speech sink would call this from its own
            // completion callback; this replay pretends every
            // utterance completes instantly.
            scheduler.on_narration_complete();
        }
    }

    Ok(())
}
