//! Terminal demo: animate a search across a random grid graph.
//!
//! Run: cargo run --bin grid-search -- --algorithm dijkstra --interval 30
//!
//! Legend: `S` start, `E` end, `#` obstacle, `o` open, `x` closed, `*` path.

use std::io::{self, BufRead, Write};

use clap::{Parser, ValueEnum};
use stepgraph_demos::Scene;
use stepgraph_paths::{Algorithm, Heuristic, RunConfig, SearchEvent, total_cost};

/// Animate A* or Dijkstra over a generated grid graph
#[derive(Parser, Debug)]
#[command(name = "grid-search")]
#[command(about = "Animate a steppable pathfinding search in the terminal", long_about = None)]
struct Args {
    /// Grid columns
    #[arg(long, default_value_t = 24)]
    columns: i32,

    /// Grid rows
    #[arg(long, default_value_t = 12)]
    rows: i32,

    /// Probability that a node is an obstacle
    #[arg(short, long, default_value_t = 0.2)]
    obstacles: f64,

    /// Seed for grid generation (random when omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Search algorithm
    #[arg(short, long, value_enum, default_value_t = AlgorithmArg::Astar)]
    algorithm: AlgorithmArg,

    /// Milliseconds between automatic steps
    #[arg(short, long, default_value_t = 100)]
    interval: u64,

    /// Advance one iteration per Enter instead of running freely
    #[arg(long)]
    stepped: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    /// A* measuring between node corners
    Astar,
    /// A* measuring between node centres
    AstarCenter,
    /// Uniform-cost search
    Dijkstra,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Astar => Algorithm::AStar(Heuristic::Corner),
            AlgorithmArg::AstarCenter => Algorithm::AStar(Heuristic::Center),
            AlgorithmArg::Dijkstra => Algorithm::Dijkstra,
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let algorithm = Algorithm::from(args.algorithm);
    log::info!("seed {seed}, {algorithm}");

    let scene = Scene::generate(algorithm, args.columns, args.rows, args.obstacles, seed)?;
    if !scene.has_endpoints() {
        return Err("grid has fewer than two walkable nodes".into());
    }

    let config = if args.stepped {
        RunConfig::stepped()
    } else {
        RunConfig::auto(args.interval)
    };
    let events = scene.editor.finder().subscribe();
    scene.editor.start_search(config)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();
    for event in events.iter() {
        match event {
            SearchEvent::Stepped { iteration, status } => {
                let mut out = io::stdout().lock();
                write!(out, "\x1b[2J\x1b[H")?;
                writeln!(out, "{algorithm}  seed {seed}  iteration {iteration}")?;
                write!(out, "{}", scene.render())?;
                out.flush()?;
                drop(out);

                if args.stepped && !status.is_finished() {
                    println!("[Enter] step  [q] quit");
                    line.clear();
                    if input.read_line(&mut line)? == 0 || line.trim() == "q" {
                        scene.editor.stop();
                    } else {
                        scene.editor.step();
                    }
                }
            }
            SearchEvent::Finished { found: true } => {
                let path = scene.editor.finder().path();
                println!(
                    "path of {} nodes, cost {:.1}",
                    path.len(),
                    total_cost(&path)
                );
                break;
            }
            SearchEvent::Finished { found: false } => {
                println!("no path");
                break;
            }
            SearchEvent::Stopped => {
                println!("stopped");
                break;
            }
        }
    }
    Ok(())
}
