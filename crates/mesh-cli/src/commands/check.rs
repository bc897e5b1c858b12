//! mesh check command - measure the discrepancy between two meshes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use mesh_discrepancy::{
    CheckConfig, DiscrepancyReport, Mesh, MissingDistancePolicy, NormalSpace, SceneObject,
    Transform3D, UNPAINTED, WeightMap, paint_heatmap, run_model_check, save_mesh,
};
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Args)]
pub struct CheckArgs {
    /// The two mesh files to compare
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Distance at or below which the weight is minimal (metres)
    #[arg(long)]
    min_threshold: Option<f64>,

    /// Distance above which the weight is maximal (metres)
    #[arg(long)]
    max_threshold: Option<f64>,

    /// Space the probe normals are measured in
    #[arg(long)]
    normal_space: Option<NormalSpaceArg>,

    /// Translation applied to the first mesh
    #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true, value_name = "X,Y,Z")]
    translate_a: Option<[f64; 3]>,

    /// Translation applied to the second mesh
    #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true, value_name = "X,Y,Z")]
    translate_b: Option<[f64; 3]>,

    /// Uniform scale applied to the first mesh
    #[arg(long)]
    scale_a: Option<f64>,

    /// Uniform scale applied to the second mesh
    #[arg(long)]
    scale_b: Option<f64>,

    /// What to do with vertices that got no distance
    #[arg(long)]
    missing: Option<MissingArg>,

    /// Weight written for unmeasured vertices with `--missing sentinel`
    #[arg(long, default_value = "0.0")]
    sentinel: f64,

    /// Disable parallel search
    #[arg(long)]
    sequential: bool,

    /// TOML or JSON check configuration; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the probe mesh painted with the heat map (PLY or OBJ)
    #[arg(long)]
    heatmap: Option<PathBuf>,

    /// Include per-vertex weights in the output
    #[arg(long)]
    weights: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum NormalSpaceArg {
    /// Transform normals with the object (inverse transpose)
    World,
    /// Use normals as stored in the file
    Local,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MissingArg {
    /// Leave unmeasured vertices unassigned
    Skip,
    /// Assign the `--sentinel` weight
    Sentinel,
}

#[derive(Serialize)]
struct CheckOutput<'a> {
    inputs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    probe: Option<&'a str>,
    report: &'a DiscrepancyReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    weights: Option<&'a WeightMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    heatmap: Option<String>,
}

fn parse_vec3(s: &str) -> std::result::Result<[f64; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected X,Y,Z but got '{}'", s));
    };
    let parse = |v: &str| v.parse::<f64>().map_err(|e| format!("'{}': {}", v, e));
    Ok([parse(x)?, parse(y)?, parse(z)?])
}

fn load_config(path: &Path) -> Result<CheckConfig> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        Ok(CheckConfig::from_json(&text)?)
    } else {
        CheckConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))
    }
}

impl CheckArgs {
    /// Start from the config file (or defaults) and apply flag overrides.
    fn config(&self) -> Result<CheckConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => CheckConfig::default(),
        };

        if let Some(min) = self.min_threshold {
            config.thresholds.min = min;
        }
        if let Some(max) = self.max_threshold {
            config.thresholds.max = max;
        }
        if let Some(space) = self.normal_space {
            config.normal_space = match space {
                NormalSpaceArg::World => NormalSpace::World,
                NormalSpaceArg::Local => NormalSpace::Local,
            };
        }
        if let Some(missing) = self.missing {
            config.missing = match missing {
                MissingArg::Skip => MissingDistancePolicy::Skip,
                MissingArg::Sentinel => MissingDistancePolicy::Sentinel(self.sentinel),
            };
        }
        if self.sequential {
            config.engine.parallel = false;
        }

        Ok(config)
    }

    /// Placement of the input at `index`. Only the first two inputs take
    /// flags; any further input is rejected by the selection check anyway.
    fn transform_for(index: usize, args: &CheckArgs) -> Transform3D {
        match index {
            0 => Self::transform(args.translate_a, args.scale_a),
            1 => Self::transform(args.translate_b, args.scale_b),
            _ => Transform3D::identity(),
        }
    }

    fn transform(translate: Option<[f64; 3]>, scale: Option<f64>) -> Transform3D {
        let scaled = scale.map_or_else(Transform3D::identity, Transform3D::uniform_scale);
        match translate {
            Some([x, y, z]) => scaled.then(&Transform3D::translation(x, y, z)),
            None => scaled,
        }
    }
}

fn load_object(path: &Path, transform: Transform3D) -> Result<SceneObject> {
    let mut mesh =
        Mesh::load(path).with_context(|| format!("Failed to load mesh from {:?}", path))?;
    mesh.ensure_normals();

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SceneObject::from_mesh(name, mesh).with_transform(transform))
}

pub fn run(args: &CheckArgs, cli: &Cli) -> Result<()> {
    let config = args.config()?;

    let objects = args
        .inputs
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let transform = CheckArgs::transform_for(i, args);
            load_object(path, transform)
        })
        .collect::<Result<Vec<_>>>()?;

    let outcome = run_model_check(&objects, &config);
    let probe = outcome.probe_object(&objects);

    let heatmap = match (&args.heatmap, probe) {
        (Some(path), Some(probe)) => {
            let painted = paint_heatmap(&probe.mesh, &outcome.weights, UNPAINTED);
            save_mesh(&painted, path)
                .with_context(|| format!("Failed to write heat map to {:?}", path))?;
            Some(path.display().to_string())
        }
        _ => None,
    };

    match cli.format {
        OutputFormat::Json => {
            let result = CheckOutput {
                inputs: args.inputs.iter().map(|p| p.display().to_string()).collect(),
                probe: probe.map(|p| p.name.as_str()),
                report: &outcome.report,
                weights: args.weights.then_some(&outcome.weights),
                heatmap,
            };
            output::print(&result, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Model Check".bold().underline());
                if let Some(probe) = probe {
                    println!(
                        "  {}: {} ({} vertices)",
                        "Probe".cyan(),
                        probe.name,
                        outcome.report.probe_vertices
                    );
                    println!(
                        "  {}: {} of {}",
                        "Measured".cyan(),
                        outcome.report.measured_vertices,
                        outcome.report.probe_vertices
                    );
                    match outcome.report.angle_threshold {
                        Some(t) => println!("  {}: {} deg", "Angle threshold".cyan(), t),
                        None => println!(
                            "  {}: {}",
                            "Angle threshold".cyan(),
                            "search exhausted".yellow()
                        ),
                    }
                }
                println!();

                let text = outcome.report.to_string();
                if outcome.report.status.is_ok() {
                    println!("{}", text);
                } else {
                    println!("{}", text.as_str().red());
                }

                if args.weights {
                    println!();
                    println!("{}", "Weights".bold());
                    for (index, weight) in outcome.weights.iter() {
                        println!("  {:>6}: {:.4}", index, weight);
                    }
                }

                if let Some(path) = &heatmap {
                    println!();
                    println!("{} Heat map written to {}", "✓".green().bold(), path);
                }
            }
        }
    }

    Ok(())
}
