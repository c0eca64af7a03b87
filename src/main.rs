use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;

use meshtour::config::{FileConfig, TourConfig};
use meshtour::report::MeshInfo;
use meshtour::tour::{STEPS, Step};

/// Walk through generating, transforming and drawing hexahedral meshes
///
/// Each step writes grid-<N>.eps and prints a short summary of its mesh.
///
/// Examples:
///   # Run the whole tour, reading untitled.msh from the current directory
///   meshtour
///
///   # Only the refinement and extrusion steps, pictures into out/
///   meshtour --only 3 --only 4 -o out
///
///   # Reproducible random distortion and a JSON summary
///   meshtour --seed 7 --summary tour.json
///
///   # Use a config file
///   meshtour --config my-settings.toml
#[derive(Parser, Debug)]
#[command(name = "meshtour")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches meshtour.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory receiving the grid-<N>.eps pictures
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// gmsh mesh read by step 1 (defaults to untitled.msh)
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// Seed for the random distortion of step 7
    #[arg(long)]
    seed: Option<u64>,

    /// Run only the given step; may be repeated
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=7))]
    only: Vec<u8>,

    /// Picture size in points
    #[arg(long)]
    eps_size: Option<f64>,

    /// Write the summaries of all steps to this JSON file
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let file_config: Option<FileConfig> = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            Some(toml::from_str(&contents).context("Failed to parse config file")?)
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load()
    };

    let mut config = file_config
        .as_ref()
        .map(TourConfig::from_file)
        .unwrap_or_default();
    if let Some(input) = args.input.clone() {
        config.input = input;
    }
    if let Some(output_dir) = args.output_dir.clone() {
        config.output_dir = output_dir;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(size) = args.eps_size {
        if size <= 0.0 {
            bail!("--eps-size must be positive, got {}", size);
        }
        config.eps.size = size;
    }
    let verbose = args.verbose || file_config.as_ref().map(|c| c.verbose).unwrap_or(false);

    let steps: Vec<&Step> = STEPS
        .iter()
        .filter(|step| args.only.is_empty() || args.only.contains(&(step.number as u8)))
        .collect();

    println!("meshtour - Mesh Generation Tour");
    println!("===============================");
    println!();

    if verbose {
        println!("Configuration:");
        println!("  Input: {}", config.input.display());
        println!("  Output directory: {}", config.output_dir.display());
        match config.seed {
            Some(seed) => println!("  Seed: {}", seed),
            None => println!("  Seed: random"),
        }
        println!(
            "  Picture: {} pt ({:?}), line width {}",
            config.eps.size, config.eps.size_type, config.eps.line_width
        );
        println!(
            "  Distortion: factor {}, keep boundary {}",
            config.distortion.factor, config.distortion.keep_boundary
        );
        println!(
            "  Steps: {}",
            steps
                .iter()
                .map(|s| s.number.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!();
    }

    if !config.output_dir.exists() {
        std::fs::create_dir_all(&config.output_dir).context(format!(
            "Failed to create output directory: {:?}",
            config.output_dir
        ))?;
    }

    let mut infos: Vec<MeshInfo> = Vec::new();
    for step in steps {
        let spinner = create_spinner(&format!("Step {}: {}...", step.number, step.title));
        let start = Instant::now();
        let info = match (step.run)(&config) {
            Ok(info) => info,
            Err(e) => {
                spinner.abandon_with_message(format!("Step {} failed", step.number));
                return Err(e.context(format!("Step {} ({}) failed", step.number, step.title)));
            }
        };
        spinner.finish_with_message(format!(
            "Step {}: {} [{:.1}s]",
            step.number,
            step.title,
            start.elapsed().as_secs_f32()
        ));
        println!("{}", info);
        if verbose {
            println!("  boundary faces: {}", info.n_boundary_faces());
        }
        println!();
        infos.push(info);
    }

    if let Some(ref path) = args.summary {
        let json = serde_json::to_string_pretty(&infos).context("Failed to serialize summary")?;
        std::fs::write(path, json)
            .context(format!("Failed to write summary file: {:?}", path))?;
        println!("Summary: {}", path.display());
    }

    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );

    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
