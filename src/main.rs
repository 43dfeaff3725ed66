use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use vplotter::{
    build_actuator, init_logging, CancellationToken, Config, JobRunner, Plotter, RunState,
    TimeEstimator,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Plot a G-code program
    Run {
        /// Machine configuration (.toml or .json)
        config: PathBuf,
        /// G-code program to plot
        gcode: PathBuf,
        /// Skip all real-time waiting
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the estimated plot time of a program
    Estimate {
        /// Machine configuration (.toml or .json)
        config: PathBuf,
        /// G-code program to estimate
        gcode: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json)?;
    tracing::debug!(
        version = vplotter::VERSION,
        built = vplotter::BUILD_DATE,
        "vplotter starting"
    );

    match cli.command {
        Commands::Run {
            config,
            gcode,
            dry_run,
        } => run(&config, &gcode, dry_run),
        Commands::Estimate { config, gcode } => estimate(&load_config(&config)?, &gcode),
    }
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    Config::load_from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn open_program(path: &Path) -> anyhow::Result<BufReader<File>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open G-code program {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn estimate(config: &Config, gcode: &Path) -> anyhow::Result<()> {
    let estimate = TimeEstimator::new(config)?
        .estimate(open_program(gcode)?)
        .with_context(|| format!("Failed to estimate {}", gcode.display()))?;
    println!(
        "Estimated time: {:.1} minutes ({} segments, {} pen moves)",
        estimate.minutes(),
        estimate.segments,
        estimate.pen_transitions
    );
    Ok(())
}

fn run(config_path: &Path, gcode: &Path, dry_run: bool) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    estimate(&config, gcode)?;

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .context("Failed to install Ctrl-C handler")?;

    let actuator = build_actuator(&config, dry_run).context("Failed to acquire outputs")?;
    let mut plotter = Plotter::new(&config, actuator)?;

    let report = JobRunner::new(&mut plotter, &config.drawing)
        .run(open_program(gcode)?, &cancel)
        .with_context(|| format!("Failed to plot {}", gcode.display()))?;

    match report.outcome {
        RunState::Cancelled => println!(
            "Cancelled after line {}, pen raised and returned to origin",
            report.lines_read
        ),
        _ => println!("DONE"),
    }
    Ok(())
}
