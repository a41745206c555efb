use anyhow::{bail, Context, Result};
use clap::Parser;
use dla_engine::{
    AttractorType, Coord, LatticeType, Point2, Point3, RunConfig, RunController, RunOutcome,
    Stickiness,
};
use std::fs::{self, File};
use std::io::{BufWriter, Write as _};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "dla-engine")]
#[command(about = "Headless Diffusion-Limited Aggregation runner")]
struct Args {
    // === Simulation Parameters ===
    /// Lattice dimension (2 or 3)
    #[arg(short = 'd', long, default_value = "2")]
    dimension: u32,

    /// Lattice type (square, triangle)
    #[arg(short = 'l', long, default_value = "square")]
    lattice: String,

    /// Attractor geometry (point, line, plane)
    #[arg(short = 'a', long, default_value = "point")]
    attractor: String,

    /// Attractor extent for line/plane geometries
    #[arg(long, default_value = "1")]
    extent: u32,

    /// Stickiness coefficient in (0, 1]
    #[arg(short = 's', long, default_value = "1.0")]
    stickiness: f64,

    /// Number of particles to aggregate (0 = continuous, requires --run-for)
    #[arg(short = 'p', long, default_value = "5000")]
    particles: u32,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Walk steps per particle before respawn (0 = uncapped)
    #[arg(long = "max-walk-steps", default_value = "0")]
    max_walk_steps: usize,

    // === Run Control ===
    /// Raise the abort signal after this many seconds
    #[arg(long = "run-for")]
    run_for: Option<u64>,

    /// Progress report interval in milliseconds (0 = no progress output)
    #[arg(long = "report-every", default_value = "500")]
    report_every: u64,

    // === Configuration Files ===
    /// Load the run configuration from a JSON file (overrides simulation
    /// args; no value = the user config path)
    #[arg(short = 'c', long, num_args = 0..=1)]
    config: Option<Option<PathBuf>>,

    /// Write the effective configuration to a JSON file and exit (no value =
    /// the user config path)
    #[arg(long = "save-config", num_args = 0..=1)]
    save_config: Option<Option<PathBuf>>,

    // === Output ===
    /// Append attached coordinates to this file as they are drained
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

fn parse_lattice(s: &str) -> LatticeType {
    match s.to_lowercase().as_str() {
        "triangle" | "tri" => LatticeType::Triangle,
        _ => LatticeType::Square,
    }
}

fn parse_attractor(s: &str) -> AttractorType {
    match s.to_lowercase().as_str() {
        "line" => AttractorType::Line,
        "plane" => AttractorType::Plane,
        _ => AttractorType::Point,
    }
}

/// Resolve an explicit path, falling back to the per-user config location.
fn config_file_path(choice: &Option<PathBuf>) -> Result<PathBuf> {
    match choice {
        Some(path) => Ok(path.clone()),
        None => RunConfig::default_path()
            .context("no user configuration directory on this platform"),
    }
}

fn build_config(args: &Args) -> Result<RunConfig> {
    if let Some(choice) = &args.config {
        let path = config_file_path(choice)?;
        return RunConfig::load_from_file(&path)
            .with_context(|| format!("loading config from {}", path.display()));
    }
    Ok(RunConfig {
        lattice: parse_lattice(&args.lattice),
        attractor: parse_attractor(&args.attractor),
        attractor_extent: args.extent,
        stickiness: Stickiness::new(args.stickiness)?,
        particles: args.particles,
        rng_seed: args.seed,
        max_walk_steps: args.max_walk_steps,
        ..RunConfig::default()
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = build_config(&args)?;

    if let Some(choice) = &args.save_config {
        let path = config_file_path(choice)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        config.save_to_file(&path)?;
        println!("wrote config to {}", path.display());
        return Ok(());
    }

    if config.particles == 0 && args.run_for.is_none() {
        bail!("continuous mode (--particles 0) requires --run-for");
    }

    match args.dimension {
        2 => run::<Point2>(config, &args),
        3 => run::<Point3>(config, &args),
        other => bail!("dimension must be 2 or 3, got {other}"),
    }
}

fn run<P: Coord>(config: RunConfig, args: &Args) -> Result<()> {
    let target = config.particles;
    let mut controller = RunController::<P>::new(config)?;
    let mut output = match &args.output {
        Some(path) => Some(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => None,
    };

    let deadline = args.run_for.map(|secs| Instant::now() + Duration::from_secs(secs));
    let poll = Duration::from_millis(50);
    let report_every = Duration::from_millis(args.report_every.max(1));
    let mut last_report = Instant::now();

    controller.start(target)?;

    loop {
        thread::sleep(poll);

        for p in controller.drain_new_attachments() {
            if let Some(out) = output.as_mut() {
                writeln!(out, "{p}")?;
            }
        }

        if args.report_every > 0 && last_report.elapsed() >= report_every {
            let m = controller.metrics();
            println!(
                "attached {}  misses {}  radius {:.1}",
                m.attached,
                m.misses,
                m.max_radius_sq.sqrt()
            );
            last_report = Instant::now();
        }

        if deadline.is_some_and(|d| Instant::now() >= d) {
            controller.raise_abort_signal();
        }
        if !controller.is_running() {
            break;
        }
    }

    // pick up anything queued between the last drain and worker exit
    for p in controller.drain_new_attachments() {
        if let Some(out) = output.as_mut() {
            writeln!(out, "{p}")?;
        }
    }
    if let Some(out) = output.as_mut() {
        out.flush()?;
    }

    let outcome = controller.wait()?;
    let m = controller.metrics();
    println!(
        "{}: {} particles, {} misses, radius {:.2}, fractal dimension {:.3}",
        match outcome {
            RunOutcome::Completed => "completed",
            RunOutcome::Aborted => "aborted",
        },
        m.attached,
        m.misses,
        m.max_radius_sq.sqrt(),
        m.fractal_dimension
    );
    Ok(())
}
