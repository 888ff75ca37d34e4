//! Simplify a triangle mesh read from an OBJ file.
//!
//! Usage: qemesh <INPUT> -n <TARGET> [-o <OUTPUT>]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use qemesh::{Simplifier, SimplifyParams, TriMesh};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "qemesh")]
#[command(version, about = "Quadric error metric mesh simplification", long_about = None)]
struct Cli {
    /// Input mesh in OBJ format, triangles only
    input: PathBuf,

    /// Target number of faces
    #[arg(short = 'n', long = "target")]
    target: usize,

    /// Output mesh file
    #[arg(short, long, default_value = "out/out.obj")]
    output: PathBuf,

    /// Determinant threshold for solving the optimal vertex position
    #[arg(long, default_value_t = qemesh::DET_EPSILON)]
    det_epsilon: f64,

    /// Suppress log output
    #[arg(long, short)]
    quiet: bool,

    /// Increase log verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "qemesh=info",
            2 => "qemesh=debug",
            _ => "qemesh=trace",
        })
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut mesh = TriMesh::load_obj(&cli.input)
        .with_context(|| format!("Failed to load mesh from {}", cli.input.display()))?;
    info!(
        vertices = mesh.num_vertices(),
        edges = mesh.num_edges(),
        faces = mesh.num_faces(),
        "Loaded {}",
        cli.input.display()
    );
    let params = SimplifyParams::default()
        .with_target_faces(cli.target)
        .with_det_epsilon(cli.det_epsilon);
    let summary = {
        let mut simplifier = Simplifier::new(&mut mesh, params);
        simplifier.run(params.target_faces);
        simplifier.finish().context("Failed to compact the mesh")?
    };
    info!("{summary}");
    mesh.check_topology()
        .context("Simplified mesh has broken topology")?;
    if let Some(dir) = cli.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    mesh.save_obj(&cli.output)
        .with_context(|| format!("Failed to write mesh to {}", cli.output.display()))?;
    println!(
        "After collapse: {} edges, {} faces",
        mesh.num_edges(),
        mesh.num_faces()
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
