//! `units` command.

use std::path::PathBuf;

use clap::Args;
use fea_core::errors::{FeaError, FeaResult};
use fea_core::units::{default_unit, Unit};

use super::load_units;
use crate::output::{self, OutputFormat};

/// Arguments for the units command
#[derive(Debug, Args)]
pub struct UnitsArgs {
    /// Only list units of this quantity type
    #[arg(short, long)]
    pub quantity: Option<String>,
    /// JSON unit table to use instead of the built-in one
    #[arg(long)]
    pub units: Option<PathBuf>,
}

/// Execute the units command
pub fn execute(args: &UnitsArgs, format: OutputFormat) -> FeaResult<()> {
    let table = load_units(args.units.as_deref())?;

    let quantities: Vec<&str> = match &args.quantity {
        Some(quantity) if table.units_of(quantity).is_empty() => {
            return Err(FeaError::not_found("Quantity type", quantity.as_str()));
        }
        Some(quantity) => vec![quantity.as_str()],
        None => table.quantity_types(),
    };

    if format == OutputFormat::Json {
        let units: Vec<&Unit> = quantities.iter().flat_map(|q| table.units_of(q)).collect();
        return output::print_json(&units);
    }

    for quantity in quantities {
        let canonical = table
            .canonical_unit(quantity)
            .map(|u| u.symbol.as_str())
            .unwrap_or("?");
        match default_unit(quantity) {
            Some(default) => println!("{} (canonical {}, default {})", quantity, canonical, default),
            None => println!("{} (canonical {})", quantity, canonical),
        }
        for unit in table.units_of(quantity) {
            if unit.has_offset() {
                println!("  {:<8} {:<28} scale {}, offset {}", unit.symbol, unit.name, unit.scale, unit.offset);
            } else {
                println!("  {:<8} {:<28} scale {}", unit.symbol, unit.name, unit.scale);
            }
        }
    }
    Ok(())
}
