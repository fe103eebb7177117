//! Basin Connectivity Report
//!
//! Loads a basin definition, resolves each office's streams into a
//! network and reports, for every location, its distance from the network
//! outlet and the drainage area above it.
//!
//! Usage:
//!   cargo run --release                          # Report on ./basin.toml
//!   cargo run --release -- path/to/basin.toml    # Report on another file
//!   cargo run --release -- --json                # Emit the report as JSON
//!
//! Environment:
//!   RUST_LOG - log filter (e.g. RUST_LOG=debug)

use basin_connectivity::config;
use basin_connectivity::network::upstream::by_distance;
use basin_connectivity::network::{BasinNetwork, resolve_by_office};
use serde::Serialize;
use std::env;
use std::thread;

#[derive(Debug, Serialize)]
struct LocationReport {
    stream: String,
    location: String,
    station: f64,
    bank: String,
    cumulative_distance: Option<f64>,
    drainage_area: Option<f64>,
}

#[derive(Debug, Serialize)]
struct OfficeReport {
    office: String,
    streams: usize,
    outlets: Vec<String>,
    locations: Vec<LocationReport>,
    error: Option<String>,
}

fn office_report(office: String, network: &BasinNetwork) -> OfficeReport {
    let mut locations: Vec<LocationReport> = network
        .streams()
        .flat_map(|stream| stream.locations().iter().map(move |l| (stream, l)))
        .map(|(stream, l)| LocationReport {
            stream: stream.stream_id().to_string(),
            location: l.id().name.clone(),
            station: l.station(),
            bank: l.bank().to_string(),
            cumulative_distance: network.cumulative_distance(l.id()).ok(),
            drainage_area: network.aggregate_drainage_area(l.id()).ok(),
        })
        .collect();

    // Outlet first; locations with no defined distance last.
    locations.sort_by(|a, b| {
        by_distance(a.cumulative_distance, b.cumulative_distance)
            .then_with(|| a.location.cmp(&b.location))
    });

    OfficeReport {
        office,
        streams: network.stream_count(),
        outlets: network.outlets().map(|s| s.stream_id().to_string()).collect(),
        locations,
        error: None,
    }
}

fn format_optional(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) => format!("{:.1}{}", v, suffix),
        None => "—".to_string(),
    }
}

fn print_report(reports: &[OfficeReport]) {
    for report in reports {
        println!("📍 Office {}", report.office);

        if let Some(e) = &report.error {
            println!("   ❌ Network rejected: {}\n", e);
            continue;
        }

        println!("   Streams: {}  Outlets: {}", report.streams, report.outlets.join(", "));
        println!(
            "   {:<20} {:<18} {:>8} {:>4} {:>12} {:>14}",
            "Stream", "Location", "Station", "Bank", "To outlet", "Drainage"
        );
        for l in &report.locations {
            println!(
                "   {:<20} {:<18} {:>8.1} {:>4} {:>12} {:>14}",
                l.stream,
                l.location,
                l.station,
                l.bank,
                format_optional(l.cumulative_distance, " mi"),
                format_optional(l.drainage_area, " mi²"),
            );
        }
        println!();
    }
}

fn main() {
    env_logger::init();

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut json = false;
    let mut path: Option<String> = None;

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            a if a.starts_with("--") => {
                eprintln!("Unknown argument: {}", a);
                eprintln!("Usage: {} [--json] [PATH]", args[0]);
                std::process::exit(1);
            }
            a => path = Some(a.to_string()),
        }
    }
    let path = path.unwrap_or_else(|| "basin.toml".to_string());

    if !json {
        println!("🌊 Basin Connectivity Report");
        println!("============================\n");
        println!("📊 Loading {}...", path);
    }

    let streams = match config::load_basin(&path) {
        Ok(streams) => streams,
        Err(e) => {
            eprintln!("\n❌ Failed to load basin: {}\n", e);
            std::process::exit(1);
        }
    };

    if !json {
        println!("✓ Loaded {} streams\n", streams.len());
    }

    let workers = thread::available_parallelism().map(|n| n.get()).unwrap_or(2);
    let reports: Vec<OfficeReport> = resolve_by_office(streams, workers)
        .into_iter()
        .map(|(office, result)| match result {
            Ok(network) => office_report(office, &network),
            Err(e) => OfficeReport {
                office,
                streams: 0,
                outlets: Vec::new(),
                locations: Vec::new(),
                error: Some(e.to_string()),
            },
        })
        .collect();

    if json {
        match serde_json::to_string_pretty(&reports) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("❌ Failed to serialize report: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print_report(&reports);
    }
}
