use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tiledrive_kernel::GridWorld;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for tiledrive")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, maps, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Load every map under a directory and report problems
    Maps {
        #[arg(default_value = "assets/maps")]
        dir: PathBuf,
    },
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            run_cargo("fmt --check", &["fmt", "--all", "--", "--check"])?;
            run_clippy()?;
            run_cargo("test", &["test", "--workspace"])?;
            check_maps(Path::new("assets/maps"))?;
            run_cargo("doc", &["doc", "--workspace", "--no-deps"])?;
        }
        Commands::Fmt => run_cargo("fmt --check", &["fmt", "--all", "--", "--check"])?,
        Commands::Clippy => run_clippy()?,
        Commands::Test => run_cargo("test", &["test", "--workspace"])?,
        Commands::Maps { dir } => check_maps(&dir)?,
        Commands::Doc => run_cargo("doc", &["doc", "--workspace", "--no-deps"])?,
        Commands::Build => run_cargo("build", &["build", "--workspace"])?,
    }

    Ok(())
}

fn run_cargo(name: &str, args: &[&str]) -> Result<()> {
    println!("==> Running cargo {name}");
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {name} failed");
    }
    Ok(())
}

fn run_clippy() -> Result<()> {
    run_cargo(
        "clippy",
        &[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
    )
}

fn check_maps(dir: &Path) -> Result<()> {
    println!("==> Validating maps in {}", dir.display());
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut failures = 0;
    for path in &paths {
        match GridWorld::load(path) {
            Ok(world) => println!(
                "    ok   {} ({}x{}, {} obstacles)",
                path.display(),
                world.width(),
                world.height(),
                world.obstacle_count()
            ),
            Err(e) => {
                println!("    FAIL {}: {e}", path.display());
                failures += 1;
            }
        }
    }
    if failures > 0 {
        anyhow::bail!("{failures} of {} maps failed to load", paths.len());
    }
    Ok(())
}
