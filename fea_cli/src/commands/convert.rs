//! `convert` command.

use std::path::PathBuf;

use clap::Args;
use fea_core::errors::FeaResult;
use serde::Serialize;

use super::load_units;
use crate::output::{self, OutputFormat};

/// Arguments for the convert command
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Value to convert
    #[arg(allow_hyphen_values = true)]
    pub value: f64,
    /// Source unit symbol, e.g. "kN"
    pub from: String,
    /// Target unit symbol, e.g. "N"
    pub to: String,
    /// JSON unit table to use instead of the built-in one
    #[arg(long)]
    pub units: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Conversion<'a> {
    value: f64,
    from: &'a str,
    to: &'a str,
    result: f64,
}

/// Execute the convert command
pub fn execute(args: &ConvertArgs, format: OutputFormat) -> FeaResult<()> {
    let table = load_units(args.units.as_deref())?;
    let result = table.convert(args.value, &args.from, &args.to)?;

    match format {
        OutputFormat::Text => println!("{} {} = {} {}", args.value, args.from, result, args.to),
        OutputFormat::Json => output::print_json(&Conversion {
            value: args.value,
            from: &args.from,
            to: &args.to,
            result,
        })?,
    }
    Ok(())
}
