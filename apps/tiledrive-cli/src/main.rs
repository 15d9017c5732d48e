use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tiledrive_input::{InputSnapshot, KeyCode};
use tiledrive_kernel::GridWorld;
use tiledrive_physics::RapierBackend;
use tiledrive_render::DebugSceneRenderer;
use tiledrive_scene::{Scene, SceneAssets, SceneConfig};
use tiledrive_tools::SceneInspector;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tiledrive-cli", about = "CLI tool for tiledrive scenes and maps")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and a summary of a map file
    Info {
        /// Map definition (JSON)
        map: PathBuf,
    },
    /// Load a scene config with every asset and build it headlessly
    Validate {
        /// Scene config (YAML)
        #[arg(short, long, default_value = "assets/scene.yaml")]
        scene: PathBuf,
    },
    /// Drive the vehicle for a number of frames with keys held down
    Simulate {
        /// Scene config (YAML)
        #[arg(short, long, default_value = "assets/scene.yaml")]
        scene: PathBuf,
        /// Number of frames to run
        #[arg(short, long, default_value = "120")]
        frames: u64,
        /// Letters of the keys held for the whole run, e.g. "WA"
        #[arg(short, long, default_value = "")]
        keys: String,
        /// Print every scene node at the end
        #[arg(long)]
        dump: bool,
    },
}

type HeadlessScene = Scene<RapierBackend, DebugSceneRenderer>;

fn load_scene(path: &Path) -> Result<(HeadlessScene, SceneConfig)> {
    let base = path.parent().unwrap_or(Path::new("."));
    let config = SceneConfig::load(path)?;
    let world = config
        .load_world(base)
        .with_context(|| format!("loading map {}", config.map.display()))?;
    let assets = SceneAssets::load(&config, base)?;
    let scene = Scene::build(
        world,
        &assets,
        &config,
        RapierBackend::new(config.gravity),
        DebugSceneRenderer::new(),
    )?;
    Ok((scene, config))
}

fn parse_keys(keys: &str) -> Result<InputSnapshot> {
    let codes = keys
        .chars()
        .map(|c| KeyCode::from_letter(c).with_context(|| format!("{c:?} is not a letter key")))
        .collect::<Result<Vec<_>>>()?;
    Ok(InputSnapshot::from_pressed(codes))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info { map } => {
            println!("tiledrive-cli v{}", env!("CARGO_PKG_VERSION"));
            let world = GridWorld::load(&map)
                .with_context(|| format!("loading map {}", map.display()))?;
            println!("{}", SceneInspector::map_summary(&world));
        }
        Commands::Validate { scene } => {
            let (scene, _) = load_scene(&scene)?;
            println!("{}", SceneInspector::summary(&scene));
            scene.teardown()?;
            println!("OK");
        }
        Commands::Simulate {
            scene,
            frames,
            keys,
            dump,
        } => {
            let input = parse_keys(&keys)?;
            let (mut scene, config) = load_scene(&scene)?;
            tracing::info!(frames, keys = %keys, dt = config.timestep, "simulating");
            let start = SceneInspector::inspect_vehicle(&scene);
            for _ in 0..frames {
                scene.frame(&input, config.timestep);
            }
            if let Some(start) = start {
                println!("Start: {start}");
            }
            println!("{}", SceneInspector::summary(&scene));
            if dump {
                print!("{}", scene.render().dump());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_case_insensitively() {
        let input = parse_keys("wA").unwrap();
        assert!(input.is_pressed(KeyCode::W));
        assert!(input.is_pressed(KeyCode::A));
        assert!(parse_keys("").unwrap().is_empty());
        assert!(parse_keys("W1").is_err());
    }
}
