use anyhow::Context;
use clap::Parser;
use generator::footprint::FootprintConfig;
use gui_bridge::bridge::GuiBridge;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::SessionConfig;
use workflow::runner::{Runner, WorkflowResult};

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Drone building survey planner")]
struct Args {
    /// Load a session (options, gazetteer, scripted steps) from YAML
    #[arg(long)]
    session: Option<PathBuf>,
    /// Outline a synthetic building footprint at the map center and report the flight
    #[arg(long, default_value_t = false)]
    offline: bool,
    #[arg(long, default_value_t = 37.792)]
    lat: f64,
    #[arg(long, default_value_t = -122.403, allow_hyphen_values = true)]
    lng: f64,
    #[arg(long, default_value_t = 17)]
    zoom: u8,
    /// Initial contents of the flight height input, in meters
    #[arg(long, default_value = "0")]
    height: String,
    /// Number of sides of the synthetic footprint
    #[arg(long, default_value_t = 6)]
    sides: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Keep the HTTP bridge alive for interactive clients
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn print_result(title: &str, result: &WorkflowResult) {
    for (index, record) in result.records.iter().enumerate() {
        match &record.alert {
            Some(alert) => println!("{:>3}. {:<32} ALERT {}", index + 1, record.label, alert),
            None => println!(
                "{:>3}. {:<32} perimeter {} m | area {} m2 | laps {} | total {} s",
                index + 1,
                record.label,
                record.board.perimeter,
                record.board.area,
                record.board.num_laps,
                record.board.time_total
            ),
        }
    }

    let board = &result.model.board;
    println!(
        "{} -> perimeter {} m, area {} m2, radius {} m, laps {}, {} s/lap, total {} s (speed {} m/s, lap height {} m)",
        title,
        board.perimeter,
        board.area,
        board.radius,
        board.num_laps,
        board.time_per_lap,
        board.time_total,
        board.drone_speed,
        board.imagery_height
    );
    if !board.landing_location.is_empty() {
        println!("landing location {}", board.landing_location);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let session_config = if let Some(path) = args.session {
        SessionConfig::load(path)?
    } else {
        SessionConfig::from_args(args.lat, args.lng, args.zoom, &args.height)
    };

    let runner = Runner::new(&session_config);

    if !session_config.steps.is_empty() {
        let result = runner.execute(&session_config.steps)?;
        print_result("Scripted session", &result);
    }

    if args.offline {
        let footprint = FootprintConfig {
            sides: args.sides,
            seed: args.seed,
            ..Default::default()
        };
        let result = runner.run_footprint(footprint)?;
        print_result("Offline footprint", &result);

        let report = format!(
            "sides={} seed={} perimeter={} area={} laps={} total={}\n",
            args.sides,
            args.seed,
            result.model.flight.perimeter,
            result.model.flight.area,
            result.model.estimate.num_laps,
            result.model.estimate.time_total
        );
        let report_path = PathBuf::from("tools/data/offline_flight.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)
            .with_context(|| format!("opening report {}", report_path.display()))?;
        file.write_all(report.as_bytes())?;
    }

    if args.serve {
        let gui_bridge = GuiBridge::new(runner.clone());
        gui_bridge.publish_model()?;
        gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
