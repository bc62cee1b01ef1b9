#![deny(unsafe_code)]
//! CLI binary for the holofield procedural backgrounds.
//!
//! Subcommands:
//! - `render <field>`: run a field N frames, write a PNG
//! - `trace <field>`: run a field N frames, print the final frame's draw calls
//! - `list`: print available fields and their parameter schemas

mod error;
mod logging;

use clap::{Args, Parser, Subcommand};
use error::CliError;
use holofield_core::{Animation, PointerState, RecordingSurface, Scene, Srgb, ViewportInfo};
use holofield_engines::{run_scene, FieldKind, RasterSurface};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "holofield", about = "Procedural background fields, rendered headless")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Everything that describes a run. `--scene` replaces all other flags.
#[derive(Args)]
struct SceneArgs {
    /// Field name (particles, waves, grain).
    field: Option<String>,

    /// Load the whole run description from a scene JSON file.
    #[arg(long, conflicts_with = "field")]
    scene: Option<PathBuf>,

    /// Logical width.
    #[arg(short = 'W', long, default_value_t = 1280)]
    width: usize,

    /// Logical height.
    #[arg(short = 'H', long, default_value_t = 720)]
    height: usize,

    /// Device pixels per logical unit.
    #[arg(long, default_value_t = 1.0)]
    pixel_scale: f64,

    /// Number of frames to simulate before the final render.
    #[arg(short, long, default_value_t = 120)]
    frames: usize,

    /// PRNG seed for deterministic output.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Field parameters as a JSON object.
    #[arg(long, default_value = "{}")]
    params: String,

    /// Fixed pointer position as `x,y` in logical units.
    #[arg(long)]
    pointer: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a field for N frames and write a PNG of the last one.
    Render {
        #[command(flatten)]
        scene: SceneArgs,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,

        /// Background color as hex.
        #[arg(long, default_value = "#000000")]
        background: String,
    },
    /// Run a field for N frames and report the last frame's draw calls.
    Trace {
        #[command(flatten)]
        scene: SceneArgs,

        /// Include every draw command, not only the per-kind counts.
        #[arg(long)]
        commands: bool,
    },
    /// List available fields and their parameters.
    List,
}

fn parse_pointer(raw: &str) -> Result<PointerState, CliError> {
    let invalid = || CliError::Input(format!("invalid --pointer '{raw}': expected x,y"));
    let (x, y) = raw.split_once(',').ok_or_else(invalid)?;
    let x: f64 = x.trim().parse().map_err(|_| invalid())?;
    let y: f64 = y.trim().parse().map_err(|_| invalid())?;
    if !(x.is_finite() && y.is_finite()) {
        return Err(invalid());
    }
    Ok(PointerState::new(x, y))
}

fn load_scene(path: &Path) -> Result<Scene, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read scene {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid scene {}: {e}", path.display())))
}

fn build_scene(args: &SceneArgs) -> Result<Scene, CliError> {
    let scene = if let Some(path) = &args.scene {
        load_scene(path)?
    } else {
        let field = args
            .field
            .as_deref()
            .ok_or_else(|| CliError::Input("a field name or --scene is required".into()))?;
        let params: Value = serde_json::from_str(&args.params)
            .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
        let mut scene = Scene::new(field, args.width, args.height, args.seed);
        scene.pixel_scale = args.pixel_scale;
        scene.params = params;
        scene.frames = args.frames;
        scene.pointer = args.pointer.as_deref().map(parse_pointer).transpose()?;
        scene
    };
    scene.validate()?;
    Ok(scene)
}

fn list_fields(json_mode: bool) -> Result<(), CliError> {
    let viewport = ViewportInfo::new(1280.0, 720.0, 1.0)?;
    let mut schemas = serde_json::Map::new();
    for name in FieldKind::list_fields() {
        let field = FieldKind::from_name(name, &viewport, 0, &json!({}))?;
        schemas.insert((*name).to_string(), field.param_schema());
    }

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&json!({ "fields": schemas }))?);
        return Ok(());
    }
    for (name, schema) in &schemas {
        println!("{name}");
        let Some(params) = schema.as_object() else {
            continue;
        };
        for (key, entry) in params {
            let default = entry.get("default").map(Value::to_string).unwrap_or_default();
            let description = entry.get("description").and_then(Value::as_str).unwrap_or("");
            println!("  {key:<20} {default:<8} {description}");
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => list_fields(cli.json)?,
        Command::Render {
            scene,
            output,
            background,
        } => {
            let scene = build_scene(&scene)?;
            let background = Srgb::from_hex(&background)?;
            let surface = RasterSurface::new(&scene.viewport()?).with_background(background, 1.0);
            let run = run_scene(&scene, surface)?;
            holofield_engines::snapshot::write_png(&run.surface, &output)?;

            if cli.json {
                let info = json!({
                    "field": run.field,
                    "width": scene.width,
                    "height": scene.height,
                    "pixel_scale": scene.pixel_scale,
                    "frames": run.frames,
                    "seed": scene.seed,
                    "params": run.params,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                tracing::info!(
                    field = run.field,
                    frames = run.frames,
                    seed = scene.seed,
                    output = %output.display(),
                    "rendered {}x{}",
                    run.surface.width(),
                    run.surface.height()
                );
            }
        }
        Command::Trace { scene, commands } => {
            let scene = build_scene(&scene)?;
            let run = run_scene(&scene, RecordingSurface::new())?;
            let summary = run.surface.summary();

            if cli.json {
                let mut info = json!({
                    "field": run.field,
                    "frames": run.frames,
                    "seed": scene.seed,
                    "params": run.params,
                    "summary": summary,
                });
                if commands {
                    info["commands"] = serde_json::to_value(run.surface.commands())?;
                }
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{} after {} frames (seed {})", run.field, run.frames, scene.seed);
                println!("  lines      {}", summary.lines);
                println!("  polylines  {}", summary.polylines);
                println!("  circles    {}", summary.circles);
                println!("  pixel blits {}", summary.pixel_blits);
                if commands {
                    for command in run.surface.commands() {
                        println!("{}", serde_json::to_string(command)?);
                    }
                }
            }
        }
    }

    Ok(())
}

fn main() {
    logging::init_tracing();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            tracing::error!("{e}");
        }
        process::exit(e.exit_code());
    }
}
