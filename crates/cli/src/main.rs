#![deny(unsafe_code)]
//! CLI binary for the constellation particle field.
//!
//! Subcommands:
//! - `render`: simulate N frames headless and write a PNG
//! - `replay <seed.json>`: re-render a saved seed
//! - `inspect`: simulate N frames and print field statistics
//! - `defaults`: print parameter defaults and their schema

mod error;

use clap::{Args, Parser, Subcommand};
use constellation_core::{FieldParams, ParticleField, Seed, Srgb};
use error::CliError;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "constellation", about = "Particle field renderer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Everything needed to build and advance a field.
#[derive(Args)]
struct SceneArgs {
    /// Surface width in pixels.
    #[arg(short = 'W', long, default_value_t = 1280)]
    width: usize,

    /// Surface height in pixels.
    #[arg(short = 'H', long, default_value_t = 720)]
    height: usize,

    /// Number of frames to simulate.
    #[arg(short, long, default_value_t = 600)]
    frames: usize,

    /// PRNG seed for particle placement.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Pointer position held for every frame, as `X,Y`.
    #[arg(long, value_parser = parse_point)]
    pointer: Option<[f64; 2]>,

    /// Field parameters as a JSON string.
    #[arg(long, default_value = "{}")]
    params: String,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate a field and write its last frame as a PNG.
    Render {
        #[command(flatten)]
        scene: SceneArgs,

        /// Background color as hex, or "none" for transparency.
        #[arg(short, long, default_value = "#0f172a")]
        background: String,

        /// Output file path.
        #[arg(short, long, default_value = "constellation.png")]
        output: PathBuf,

        /// Also write the seed that reproduces this frame.
        #[arg(long)]
        save_seed: Option<PathBuf>,
    },
    /// Re-render a seed file written by `render --save-seed`.
    Replay {
        /// Path to the seed JSON.
        seed_file: PathBuf,

        /// Background color as hex, or "none" for transparency.
        #[arg(short, long, default_value = "#0f172a")]
        background: String,

        /// Output file path.
        #[arg(short, long, default_value = "constellation.png")]
        output: PathBuf,
    },
    /// Simulate a field and print particle, link, and energy statistics.
    Inspect {
        #[command(flatten)]
        scene: SceneArgs,
    },
    /// Print parameter defaults and schema.
    Defaults,
}

fn parse_point(s: &str) -> Result<[f64; 2], String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate {v:?}: {e}"))
    };
    Ok([parse(x)?, parse(y)?])
}

fn parse_background(s: &str) -> Result<Option<Srgb>, CliError> {
    if s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Srgb::from_hex(s)
        .map(Some)
        .map_err(|e| CliError::Input(format!("invalid --background: {e}")))
}

impl SceneArgs {
    fn to_seed(&self) -> Result<Seed, CliError> {
        let params: serde_json::Value = serde_json::from_str(&self.params)
            .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
        FieldParams::from_json(&params)?;
        let mut seed = Seed::new(self.width, self.height, self.seed);
        seed.params = params;
        seed.frames = self.frames;
        seed.pointer = self.pointer;
        Ok(seed)
    }
}

fn read_seed(path: &Path) -> Result<Seed, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid seed file {}: {e}", path.display())))
}

fn write_seed(seed: &Seed, path: &Path) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(seed)?;
    std::fs::write(path, text)
        .map_err(|e| CliError::Io(format!("cannot write {}: {e}", path.display())))
}

fn render(seed: &Seed, background: &str, output: &Path, json: bool) -> Result<(), CliError> {
    let background = parse_background(background)?;
    let field = seed.replay()?;
    let surface = constellation_raster::render_field(&field, background)?;
    constellation_raster::snapshot::write_png(&surface, output)?;

    if json {
        let info = serde_json::json!({
            "width": seed.width,
            "height": seed.height,
            "frames": seed.frames,
            "seed": seed.seed,
            "particles": field.len(),
            "output": output.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        eprintln!(
            "rendered {} particles ({}x{}, {} frames, seed {}) -> {}",
            field.len(),
            seed.width,
            seed.height,
            seed.frames,
            seed.seed,
            output.display()
        );
    }
    Ok(())
}

fn inspect(field: &ParticleField, json: bool) -> Result<(), CliError> {
    let stats = field.stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("particles:         {}", stats.particles);
        println!("links:             {}", stats.edges);
        println!("mean displacement: {:.4}", stats.mean_displacement);
        println!("kinetic energy:    {:.6}", stats.kinetic_energy);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Render {
            scene,
            background,
            output,
            save_seed,
        } => {
            let seed = scene.to_seed()?;
            render(&seed, &background, &output, cli.json)?;
            if let Some(path) = save_seed {
                write_seed(&seed, &path)?;
                log::info!("saved seed to {}", path.display());
            }
        }
        Command::Replay {
            seed_file,
            background,
            output,
        } => {
            let seed = read_seed(&seed_file)?;
            render(&seed, &background, &output, cli.json)?;
        }
        Command::Inspect { scene } => {
            let field = scene.to_seed()?.replay()?;
            inspect(&field, cli.json)?;
        }
        Command::Defaults => {
            let info = serde_json::json!({
                "params": FieldParams::default().to_json(),
                "schema": FieldParams::schema(),
            });
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                let defaults = FieldParams::default().to_json();
                if let Some(map) = defaults.as_object() {
                    for (key, value) in map {
                        println!("{key:<22} {value}");
                    }
                }
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
