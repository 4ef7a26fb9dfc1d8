mod input;

use std::path::PathBuf;
use std::process;

use clap::Parser;
use crossbeam_channel::unbounded;
use env_logger::Env;
use log::{debug, error, info, warn};
use oscillators_config::{Config, ConfigLoader};
use oscillators_simulation::{ControlSignal, Pacer, RunReport, SimulationController};
use oscillators_transport::TransportDisplay;

use crate::input::{OperatorInput, USAGE};

#[derive(Parser, Debug)]
#[command(author, version, about = "Three masses and four springs between two walls", long_about = None)]
struct Args {
    /// Path to a JSON or TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override one parameter, e.g. `--set m1=0.5` (repeatable)
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Start a run immediately and exit when it ends
    #[arg(long)]
    once: bool,

    /// Step as fast as possible instead of at the configured tick rate
    #[arg(long)]
    unpaced: bool,
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {}", e);
            process::exit(1);
        }
    };

    let display = match TransportDisplay::from_config(&config.transport) {
        Ok(display) => display,
        Err(e) => {
            error!("Failed to set up transport: {}", e);
            process::exit(1);
        }
    };

    let pacer = if args.unpaced {
        Pacer::unpaced()
    } else {
        Pacer::new(config.run.tick_rate)
    };
    let mut controller = SimulationController::new(display).with_pacer(pacer);

    // Ctrl-C leaves at once, whatever the run is doing.
    if let Err(e) = ctrlc::set_handler(|| {
        warn!("Interrupted, exiting");
        process::exit(130);
    }) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }

    let (tx, rx) = unbounded();
    let operator = OperatorInput::new(config.parameters.clone(), config.run.clamp);
    let _reader = input::spawn_reader(operator, tx);

    if args.once {
        let outcome = config
            .parameter_set()
            .map_err(|e| e.to_string())
            .and_then(|params| controller.start(params).map_err(|e| e.to_string()))
            .and_then(|()| controller.run(&rx).map_err(|e| e.to_string()));
        match outcome {
            Ok(report) => log_report(&report),
            Err(e) => {
                error!("Run failed: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    info!(
        "Ready at {} ticks/s, enter 'r' to start a run",
        if args.unpaced { 0 } else { config.run.tick_rate }
    );
    eprintln!("{}", USAGE);

    // Idle until the operator starts a run; the controller drains the
    // channel itself while a run is active.
    while let Ok(signal) = rx.recv() {
        match signal {
            ControlSignal::Start(params) => {
                if let Err(e) = controller.start(params) {
                    error!("Could not start run: {}", e);
                    continue;
                }
                match controller.run(&rx) {
                    Ok(report) => log_report(&report),
                    Err(e) => error!("Run failed: {}", e),
                }
            }
            other => debug!("No active run, ignoring {:?}", other),
        }
    }

    info!("Operator input closed, shutting down");
}

fn load_config(args: &Args) -> Result<Config, oscillators_config::ConfigError> {
    let mut config = match &args.config {
        Some(path) => {
            let config = ConfigLoader::from_file(path)?;
            info!("Using configuration from {}", path.display());
            config
        }
        None => Config::default(),
    };

    for assignment in &args.overrides {
        config.parameters.apply_override(assignment)?;
    }
    ConfigLoader::validate(&config)?;
    Ok(config)
}

fn log_report(report: &RunReport) {
    let x = report.final_state.x;
    info!(
        "{:?} after {} ticks, final displacements [{:.4}, {:.4}, {:.4}]",
        report.outcome,
        report.ticks_run(),
        x[0],
        x[1],
        x[2]
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use oscillators_config::ConfigError;

    #[test]
    fn args_collect_repeated_overrides() {
        let args = Args::parse_from([
            "oscillators",
            "--set",
            "m1=0.5",
            "-s",
            "k4=3",
            "--once",
        ]);
        assert_eq!(args.overrides, vec!["m1=0.5", "k4=3"]);
        assert!(args.once);
        assert!(!args.unpaced);
        assert!(args.config.is_none());
    }

    #[test]
    fn load_config_applies_overrides_over_defaults() {
        let args = Args::parse_from(["oscillators", "--set", "x2=0.05"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.parameters.x2, Some(0.05));
        assert_eq!(config.parameter_set().unwrap().initial_positions, [0.0, 0.05, 0.0]);
    }

    #[test]
    fn load_config_rejects_unknown_keys() {
        let args = Args::parse_from(["oscillators", "--set", "m9=1"]);
        assert!(matches!(load_config(&args), Err(ConfigError::InvalidOverride(_))));
    }
}
