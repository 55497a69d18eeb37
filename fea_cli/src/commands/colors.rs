//! `colors` command.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use fea_core::coloring::{color_beams, ColorMode};
use fea_core::errors::FeaResult;
use fea_core::file_io::import_model;

use crate::output::{self, OutputFormat};

/// Coloring mode as spelled on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Hash color per section name
    ByName,
    /// Fixed palette, cycling after 8 sections
    Palette,
    /// Every beam, unassigned ones in gray
    All,
}

impl From<ModeArg> for ColorMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::ByName => ColorMode::BySectionName,
            ModeArg::Palette => ColorMode::Palette,
            ModeArg::All => ColorMode::IncludeUnassigned,
        }
    }
}

/// Arguments for the colors command
#[derive(Debug, Args)]
pub struct ColorsArgs {
    /// Model file to import
    pub path: PathBuf,
    /// How beams are colored
    #[arg(short, long, value_enum, default_value = "by-name")]
    pub mode: ModeArg,
}

/// Execute the colors command
pub fn execute(args: &ColorsArgs, format: OutputFormat) -> FeaResult<()> {
    let (model, _) = import_model(&args.path)?;
    let report = color_beams(&model, args.mode.into());

    if format == OutputFormat::Json {
        return output::print_json(&report);
    }

    if report.assignments.is_empty() {
        output::print_warning("No beams with sections found");
        return Ok(());
    }
    for assignment in &report.assignments {
        let [r, g, b, _] = assignment.color;
        println!(
            "  {:<12} {:<24} rgb({:.3}, {:.3}, {:.3})",
            assignment.beam, assignment.material, r, g, b
        );
    }
    output::print_success(&format!(
        "Colored {} beams across {} sections",
        report.assignments.len(),
        report.distinct_sections
    ));
    Ok(())
}
