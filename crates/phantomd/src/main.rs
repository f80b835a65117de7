//! Phantom daemon - pain mapping engine
//!
//! Runs a pain mapping session against simulated haptics and prints the
//! clinical report.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use nalgebra::Vector3;
use phantom_shared::report::{format_markdown, format_text};
use phantom_shared::{PainTexture, Position};
use phantomd::model::ReportModel;
use phantomd::{spawn, Config, EngineHandle, GeneratedReport, OllamaReportModel, PainEngine, SimulatedDevice, SurfaceHit};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "phantomd")]
#[command(about = "Phantom - tactile pain mapping engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: /etc/phantom/config.toml, then user config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Report output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the demo session, replay each texture and print the report
    Demo,

    /// Trace a straight stroke across the avatar and print the report
    Trace {
        /// Pain texture (burning, electric, pinsAndNeedles)
        #[arg(long, default_value = "burning")]
        texture: PainTexture,

        /// Start point "x,y,z"
        #[arg(long, value_parser = parse_point)]
        from: Position,

        /// End point "x,y,z"
        #[arg(long, value_parser = parse_point)]
        to: Position,

        /// Touch samples along the line
        #[arg(long, default_value_t = 20)]
        steps: usize,

        /// Slider pressure (clamped to 0.1..=1.0)
        #[arg(long)]
        pressure: Option<f32>,
    },

    /// Show engine status
    Status,

    /// Print the default configuration
    DefaultConfig,
}

fn parse_point(s: &str) -> Result<Position, String> {
    let coords: Vec<f32> = s
        .split(',')
        .map(|c| c.trim().parse::<f32>().map_err(|e| format!("{}: {}", c, e)))
        .collect::<Result<_, _>>()?;
    match coords.as_slice() {
        [x, y, z] => Ok(Position::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got {}", s)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Commands::DefaultConfig = cli.command {
        print!("{}", Config::default_toml()?);
        return Ok(());
    }

    info!("Phantom v{} starting", phantom_shared::VERSION);

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load(),
    };
    let handle = spawn(build_engine(&config));

    let result = match cli.command {
        Commands::Demo => run_demo(&handle, &config, cli.format).await,
        Commands::Trace {
            texture,
            from,
            to,
            steps,
            pressure,
        } => run_trace(&handle, texture, from, to, steps, pressure, cli.format).await,
        Commands::Status => {
            let status = handle.status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        Commands::DefaultConfig => Ok(()),
    };

    handle.shutdown().await?;
    result
}

fn build_engine(config: &Config) -> PainEngine {
    let device = if config.haptics.enabled {
        SimulatedDevice::new()
    } else {
        SimulatedDevice::unsupported()
    };

    let model: Option<Arc<dyn ReportModel>> = if config.model.enabled {
        match OllamaReportModel::from_config(&config.model, config.report.model_timeout()) {
            Ok(model) => Some(Arc::new(model)),
            Err(e) => {
                warn!("Report model unavailable: {}", e);
                None
            }
        }
    } else {
        None
    };

    PainEngine::new(config, Box::new(device), model)
}

async fn run_demo(handle: &EngineHandle, config: &Config, format: OutputFormat) -> Result<()> {
    handle.load_demo().await?;
    let snapshot = handle.snapshot().await?;
    info!(
        "Demo session: {} strokes across {} regions",
        snapshot.total_strokes,
        snapshot.region_count()
    );

    // Replay each texture once, spaced past the cooldown
    let gap = config.haptics.cooldown() + Duration::from_millis(10);
    for (texture, count) in snapshot.textures_by_count() {
        let outcome = handle.play(texture, snapshot.average_intensity as f32).await?;
        info!("{} ({} strokes): {:?}", texture, count, outcome);
        tokio::time::sleep(gap).await;
    }
    handle.stop_haptics().await?;

    let generated = handle.generate_report().await?;
    print_report(&generated, format)
}

async fn run_trace(
    handle: &EngineHandle,
    texture: PainTexture,
    from: Position,
    to: Position,
    steps: usize,
    pressure: Option<f32>,
    format: OutputFormat,
) -> Result<()> {
    if steps == 0 {
        return Err(anyhow!("--steps must be at least 1"));
    }
    if let Some(pressure) = pressure {
        handle.set_slider_pressure(pressure).await?;
    }

    let mut captured = 0;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let position = from + (to - from) * t;
        let hit = SurfaceHit::new(position, Vector3::z(), "avatar");
        if handle.capture(Some(hit), texture, None).await?.is_some() {
            captured += 1;
        }
    }
    info!("Captured {} of {} samples", captured, steps + 1);

    let generated = handle.generate_report().await?;
    print_report(&generated, format)
}

fn print_report(generated: &GeneratedReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", format_text(&generated.report)),
        OutputFormat::Markdown => print!("{}", format_markdown(&generated.report)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(generated).context("serializing report")?
        ),
    }
    info!("Report produced by {}", generated.source);
    Ok(())
}
