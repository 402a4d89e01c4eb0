use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use clap::{Args, ValueEnum};
use colored::Colorize;
use lcad_numbering::{
    AttributeEdits, Circuit, ComponentId, LcadToml, NumberingConfig, Placeholder, number_circuit,
    plan_placeholders,
};
use log::debug;
use serde::Serialize;
use tracing::{info_span, instrument};

#[derive(Args, Debug)]
#[command(about = "Assign serial numbers and variants to sub-circuit placements")]
pub struct NumberArgs {
    /// Circuit JSON file to number
    #[arg(value_name = "CIRCUIT", value_hint = clap::ValueHint::FilePath)]
    pub path: PathBuf,

    /// Write the numbered circuit to this file instead of only reporting
    #[arg(short, long, value_name = "OUT", conflicts_with = "in_place")]
    pub output: Option<PathBuf>,

    /// Overwrite CIRCUIT with the numbered circuit
    #[arg(short = 'i', long)]
    pub in_place: bool,

    /// Add a placeholder component for every unused variant
    #[arg(long)]
    pub add_unused: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Config file (defaults to the nearest lcad.toml above CIRCUIT)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// First serial number for new groups; overrides lcad.toml and the circuit
    #[arg(long, value_name = "N")]
    pub starting_serial: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Unused-variant report
    Text,
    /// Report, edits and placeholders as JSON
    Json,
}

impl NumberArgs {
    /// Where the numbered circuit is written, if anywhere.
    fn target(&self) -> Option<&Path> {
        self.output
            .as_deref()
            .or_else(|| self.in_place.then_some(self.path.as_path()))
    }
}

#[derive(Serialize)]
struct NumberOutput<'a> {
    circuit: &'a str,
    report: &'a [String],
    edits: &'a AttributeEdits<ComponentId>,
    placeholders: &'a [Placeholder],
    dropped: Vec<ComponentId>,
}

#[instrument(name = "number", skip_all, fields(path = %args.path.display()))]
pub fn execute(args: NumberArgs) -> Result<()> {
    let mut circuit = Circuit::load(&args.path)
        .with_context(|| format!("Failed to load circuit {}", args.path.display()))?;
    let config = resolve_config(&args)?;

    let run = number_circuit(&circuit, &config);
    let dropped: Vec<ComponentId> = run.dropped().collect();
    for &id in &dropped {
        if let Some(component) = circuit.component(id) {
            eprintln!(
                "{} {} '{}' has non-numeric serial number '{}', left as is",
                "Warning:".yellow(),
                id,
                component.factory,
                component.serial_no
            );
        }
    }

    for id in run.unnumbered() {
        if let Some(component) = circuit.component(id) {
            eprintln!(
                "{} {} '{}' got no serial number, none left above the start",
                "Warning:".yellow(),
                id,
                component.factory
            );
        }
    }

    circuit
        .apply_edits(&run.edits)
        .context("Failed to apply numbering edits")?;

    let placeholders = if args.add_unused {
        let _span = info_span!("plan_placeholders").entered();
        let planned = plan_placeholders(
            &run.prefixes,
            circuit.bounds(),
            |factory| circuit.offset_bounds_of(factory).unwrap_or_default(),
            &config,
        );
        circuit.add_placeholders(&planned);
        planned
    } else {
        Vec::new()
    };

    match args.target() {
        Some(target) => write_circuit(&circuit, target)?,
        None => debug!("No output requested; {} edits discarded", run.edits.len()),
    }

    match args.format {
        OutputFormat::Text => {
            println!("{}", run.report);
            if !placeholders.is_empty() {
                let names: Vec<String> =
                    placeholders.iter().map(Placeholder::designator).collect();
                println!(
                    "{} {} placeholder(s): {}",
                    "Added".green(),
                    placeholders.len(),
                    names.join(", ")
                );
            }
        }
        OutputFormat::Json => {
            let output = NumberOutput {
                circuit: &circuit.name,
                report: run.report.lines(),
                edits: &run.edits,
                placeholders: &placeholders,
                dropped,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Config file settings with the command-line override applied on top.
fn resolve_config(args: &NumberArgs) -> Result<NumberingConfig> {
    let config_path = match &args.config {
        Some(path) => Some(path.clone()),
        None => {
            let circuit_path = std::path::absolute(&args.path)?;
            circuit_path.parent().and_then(LcadToml::find)
        }
    };

    let mut config = match config_path {
        Some(path) => {
            debug!("Using config {}", path.display());
            LcadToml::load(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))?
                .numbering
        }
        None => NumberingConfig::default(),
    };

    if let Some(serial) = args.starting_serial {
        config.starting_serial_no = Some(serial);
    }
    Ok(config)
}

#[instrument(name = "write_circuit", skip_all)]
fn write_circuit(circuit: &Circuit, path: &Path) -> Result<()> {
    let contents = circuit.to_json()?;
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| {
            f.write_all(contents.as_bytes())?;
            f.write_all(b"\n")?;
            f.flush()
        })
        .map_err(|err| anyhow::anyhow!("Failed to write {}: {err}", path.display()))?;
    debug!("Wrote numbered circuit to {}", path.display());
    Ok(())
}
