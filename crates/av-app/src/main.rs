//! Station availability map entry point
//!
//! Usage: `station-map [data.csv] [config.json]`
//!
//! Loads the dataset once, then reads front-end messages as JSON lines on
//! stdin and writes Plotly figures (and replies) as JSON lines on stdout.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use av_core::events::events::{DatasetLoaded, RenderFailed};
use av_core::{EventBus, StationSource};
use av_data::{CsvStationSource, DashboardConfig, Dataset};
use av_views::{EngineSettings, FigureSurface, UpdateEngine};

mod ui;

use ui::{Options, Reply, UiMessage};

/// Environment variable holding the map provider token
const ACCESS_TOKEN_VAR: &str = "MAPBOX_ACCESS_TOKEN";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; stdout carries figures
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    info!("Starting station availability map");

    let mut args = std::env::args().skip(1);
    let data_arg = args.next().map(PathBuf::from);
    let config_arg = args.next().map(PathBuf::from);

    let mut config = match &config_arg {
        Some(path) => DashboardConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => DashboardConfig::default(),
    };
    if let Some(path) = data_arg {
        config.data_path = path;
    }

    let access_token = std::env::var(ACCESS_TOKEN_VAR).ok();
    if access_token.is_none() {
        warn!("{} is not set; figures cannot be displayed", ACCESS_TOKEN_VAR);
    }

    let event_bus = Arc::new(EventBus::new());
    let render_failures = Arc::new(AtomicUsize::new(0));
    {
        let render_failures = render_failures.clone();
        event_bus.subscribe_fn(move |_: &RenderFailed| {
            render_failures.fetch_add(1, Ordering::Relaxed);
        });
    }
    event_bus.subscribe_fn(|event: &DatasetLoaded| {
        info!(
            "Dataset '{}': kept {} of {} rows, {} time-of-day buckets",
            event.source_name, event.rows_retained, event.rows_read, event.time_of_day_buckets
        );
    });

    // Load the dataset once
    let source = CsvStationSource::from_config(&config);
    let rows = source
        .load_rows()
        .await
        .with_context(|| format!("Failed to load {:?}", config.data_path))?;
    let rows_read = rows.len();
    let dataset = Arc::new(Dataset::load(rows));
    event_bus.publish(DatasetLoaded {
        source_name: source.source_name().to_string(),
        rows_read,
        rows_retained: dataset.len(),
        time_of_day_buckets: dataset.distinct_time_of_day_buckets().len(),
    });

    let mut engine = UpdateEngine::new(dataset, EngineSettings::from(&config))?
        .with_event_bus(event_bus);
    engine.add_surface(Box::new(FigureSurface::new(std::io::stdout(), access_token)));

    // First paint, before any user interaction
    engine.refresh();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        handle_line(&mut engine, &line)?;
    }

    let failures = render_failures.load(Ordering::Relaxed);
    if failures > 0 {
        error!("{} scenes could not be displayed", failures);
    }
    info!("Input closed, shutting down");
    Ok(())
}

/// Handle one front-end message
///
/// Bad input is reported back and logged; only output failures are fatal.
fn handle_line(engine: &mut UpdateEngine, line: &str) -> Result<()> {
    let message: UiMessage = match serde_json::from_str(line) {
        Ok(message) => message,
        Err(e) => {
            warn!("Ignoring malformed message: {}", e);
            return reply(&Reply::Error {
                message: format!("malformed message: {}", e),
            });
        }
    };

    match message.into_engine_event() {
        Some(event) => {
            if let Err(e) = engine.dispatch(event) {
                reply(&Reply::Error {
                    message: e.to_string(),
                })?;
            }
        }
        None => reply(&Reply::Options(Options::from_engine(engine)))?,
    }
    Ok(())
}

fn reply(reply: &Reply) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, reply)?;
    stdout.write_all(b"\n")?;
    stdout.flush()?;
    Ok(())
}
