//! CLI command definitions and dispatch.

pub mod colors;
pub mod convert;
pub mod export_demo;
pub mod inspect;
pub mod units;

use std::path::Path;

use clap::{Parser, Subcommand};
use fea_core::errors::FeaResult;
use fea_core::units::UnitTable;

use crate::output::OutputFormat;

/// Structural model tools: unit conversion and model inspection
#[derive(Debug, Parser)]
#[command(name = "fea_cli", version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert a value between two units
    Convert(convert::ConvertArgs),
    /// List quantity types and their units
    Units(units::UnitsArgs),
    /// Import a model file and show its resolved geometry
    Inspect(inspect::InspectArgs),
    /// Show the colors beams would get per section
    Colors(colors::ColorsArgs),
    /// Write a small sample model file
    ExportDemo(export_demo::ExportDemoArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self) -> FeaResult<()> {
        match &self.command {
            Commands::Convert(args) => convert::execute(args, self.format),
            Commands::Units(args) => units::execute(args, self.format),
            Commands::Inspect(args) => inspect::execute(args, self.format),
            Commands::Colors(args) => colors::execute(args, self.format),
            Commands::ExportDemo(args) => export_demo::execute(args, self.format),
        }
    }
}

/// Helper: the unit table from `path`, or the built-in one
pub(crate) fn load_units(path: Option<&Path>) -> FeaResult<UnitTable> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading unit table");
            UnitTable::load(path)
        }
        None => Ok(UnitTable::builtin().clone()),
    }
}
