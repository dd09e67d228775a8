//! nonoverlap CLI
//!
//! Usage:
//!   nonoverlap [OPTIONS] [SCENE]
//!
//! Options:
//!   -c, --config <FILE>  Overlap configuration (TOML format)
//!   -v, --verbose        Log every accepted and rejected separation
//!   -h, --help           Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use nonoverlap::{resolve_scene_with_config, Dim, OverlapConfig, Scene, SceneReport};

#[derive(Parser)]
#[command(name = "nonoverlap")]
#[command(about = "Remove overlaps between rectangles and cluster boundaries")]
struct Cli {
    /// Scene file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Overlap configuration file, replacing the scene's [config] table
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log solver decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let scene = match Scene::from_toml_str(&source) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config = match &cli.config {
        Some(path) => match OverlapConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => scene.config.clone(),
    };

    match resolve_scene_with_config(&scene, config) {
        Ok(report) => print_report(&report),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_report(report: &SceneReport) {
    println!("participants:");
    for p in &report.participants {
        println!(
            "  {} [{}] centre=({:.3}, {:.3}) x={:.3} y={:.3} width={:.3} height={:.3}",
            p.name,
            p.id,
            p.bounds.center(Dim::Horizontal),
            p.bounds.center(Dim::Vertical),
            p.bounds.x,
            p.bounds.y,
            p.bounds.width,
            p.bounds.height
        );
    }

    println!("separations:");
    for c in &report.pass.accepted {
        println!("  {}", c);
    }

    println!("emitted:");
    for c in &report.emitted {
        println!("  {}", c);
    }

    println!(
        "pairs={} satisfied={} unsatisfied={}",
        report.pair_count, report.pass.satisfied, report.pass.unsatisfied
    );
}

fn print_intro() {
    println!(
        r#"nonoverlap - remove overlaps between rectangles and cluster boundaries

USAGE:
    nonoverlap [OPTIONS] [SCENE]
    cat scene.toml | nonoverlap

OPTIONS:
    -c, --config    Overlap configuration (TOML file)
    -v, --verbose   Log solver decisions to stderr
    -h, --help      Print help

SCENE FORMAT:
    [[leaf]]
    name = "a"
    x = 0.0
    y = 0.0
    width = 10.0
    height = 10.0

    [[cluster]]
    name = "group"
    x = -20.0
    y = -20.0
    width = 60.0
    height = 60.0
    margin = {{ left = 2.0, right = 2.0, top = 2.0, bottom = 2.0 }}

    [[exempt]]
    members = ["a", "group"]"#
    );
}
