#![deny(unsafe_code)]
//! CLI binary for the tidemark background.
//!
//! Subcommands:
//! - `render`: run a scripted headless scene, write a PNG of the last frame
//! - `modes`: print the geometry modes and the parameter schema

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use std::path::PathBuf;
use std::process;
use tidemark_core::color::Srgb;
use tidemark_core::DVec2;
use tidemark_field::{FieldConfig, GeometryMode};
use tidemark_stage::{Recorder, Scene};

#[derive(Parser)]
#[command(name = "tidemark", about = "Generative particle background, rendered headless")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a scripted scene and write a PNG of its final frame.
    Render {
        /// Starting geometry mode (chaos, circle, grid, lotus).
        #[arg(short, long, default_value = "chaos")]
        mode: String,

        /// Number of particles.
        #[arg(short, long, default_value_t = 80)]
        count: i64,

        /// Number of frames to simulate.
        #[arg(short, long, default_value_t = 200)]
        frames: usize,

        /// Milliseconds between frames.
        #[arg(long, default_value_t = 16.0)]
        frame_ms: f64,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Accent color as #rrggbb.
        #[arg(long, default_value = "#d4af37")]
        accent: String,

        /// Secondary color as #rrggbb.
        #[arg(long, default_value = "#112240")]
        secondary: String,

        /// Switch to this mode partway through.
        #[arg(long, requires = "switch_at")]
        switch_to: Option<String>,

        /// Frame at which `--switch-to` takes effect.
        #[arg(long)]
        switch_at: Option<usize>,

        /// Frame at which the detail overlay opens.
        #[arg(long)]
        open_at: Option<usize>,

        /// Frame at which the detail overlay closes.
        #[arg(long)]
        close_at: Option<usize>,

        /// Fixed pointer position in viewport pixels, as X,Y.
        #[arg(long, value_parser = parse_point)]
        pointer: Option<DVec2>,

        /// Viewport width in pixels (pointer space).
        #[arg(short = 'W', long, default_value_t = 1280.0)]
        width: f64,

        /// Viewport height in pixels (pointer space).
        #[arg(short = 'H', long, default_value_t = 800.0)]
        height: f64,

        /// Side of the square PNG in pixels.
        #[arg(short, long, default_value_t = 512)]
        size: u32,

        /// Background color of the PNG.
        #[arg(long, default_value = "#020c1b")]
        background: String,

        /// Output file path.
        #[arg(short, long, default_value = "tidemark.png")]
        output: PathBuf,

        /// Extra field parameters as a JSON object (flags above win).
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// List geometry modes.
    Modes,
}

fn parse_point(s: &str) -> Result<DVec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{s}'"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x in '{s}': {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y in '{s}': {e}"))?;
    Ok(DVec2::new(x, y))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Modes => {
            let modes = GeometryMode::list_names();
            if cli.json {
                let info = serde_json::json!({
                    "modes": modes,
                    "params": FieldConfig::schema(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Modes:");
                for name in modes {
                    println!("  {name}");
                }
            }
        }
        Command::Render {
            mode,
            count,
            frames,
            frame_ms,
            seed,
            accent,
            secondary,
            switch_to,
            switch_at,
            open_at,
            close_at,
            pointer,
            width,
            height,
            size,
            background,
            output,
            params,
        } => {
            let mut params: serde_json::Value = serde_json::from_str(&params)
                .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
            let obj = params
                .as_object_mut()
                .ok_or_else(|| CliError::Input("--params must be a JSON object".into()))?;
            obj.insert("mode".into(), mode.clone().into());
            obj.insert("count".into(), count.into());
            obj.insert("seed".into(), seed.into());
            obj.insert("accent".into(), accent.into());
            obj.insert("secondary".into(), secondary.into());
            obj.insert("viewport_width".into(), width.into());
            obj.insert("viewport_height".into(), height.into());

            let switch_mode = match (switch_to, switch_at) {
                (Some(name), Some(at)) => Some((at, name.parse::<GeometryMode>()?)),
                _ => None,
            };
            let background = Srgb::from_hex(&background)?;

            let scene = Scene {
                params,
                frames,
                frame_ms,
                pointer,
                switch_mode,
                open_frame: open_at,
                close_frame: close_at,
            };
            scene.validate()?;

            let mut recorder = Recorder::with_capacity(usize::try_from(count).unwrap_or(0));
            let report = scene.run(&mut recorder)?;
            tidemark_stage::snapshot::write_png(&recorder, size, background, &output)?;

            if cli.json {
                let info = serde_json::json!({
                    "scene": scene,
                    "report": report,
                    "size": size,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {mode} -> {} ({} particles, {frames} frames, seed {seed}, overlay {}) -> {}",
                    report.mode,
                    report.particles,
                    report.overlay,
                    output.display()
                );
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
        log::debug!("exiting with code {}", e.exit_code());
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
