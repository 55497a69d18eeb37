//! `export-demo` command.

use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use fea_core::errors::FeaResult;
use fea_core::file_io::{default_export_filename, export_model};
use fea_core::model::{Beam, Shell, StructuralModel};
use fea_core::sections::SectionProfile;

use crate::output::{self, OutputFormat};

/// Arguments for the export-demo command
#[derive(Debug, Args)]
pub struct ExportDemoArgs {
    /// Target file; defaults to a timestamped name in the current directory
    pub path: Option<PathBuf>,
}

/// A portal frame: four columns, a rectangular roof ring and a roof slab.
fn demo_model() -> FeaResult<StructuralModel> {
    let mut model = StructuralModel::new();

    let corners = [(0.0, 0.0), (6.0, 0.0), (6.0, 4.0), (0.0, 4.0)];
    for (i, (x, y)) in corners.iter().enumerate() {
        model.insert_point(format!("G{}", i + 1), *x, *y, 0.0)?;
        model.insert_point(format!("R{}", i + 1), *x, *y, 3.0)?;
    }

    model.insert_section(SectionProfile::rectangular("Column_300x300", 0.3, 0.3))?;
    model.insert_section(SectionProfile::rectangular("Girder_200x400", 0.2, 0.4))?;

    for i in 1..=4 {
        model.insert_beam(
            Beam::new(format!("Column_{}", i), format!("G{}", i), format!("R{}", i)).with_section("Column_300x300"),
        )?;
    }
    for i in 1..=4 {
        let next = i % 4 + 1;
        model.insert_beam(
            Beam::new(format!("Girder_{}", i), format!("R{}", i), format!("R{}", next)).with_section("Girder_200x400"),
        )?;
    }
    model.insert_beam(Beam::new("Brace_1", "G1", "R2").with_diameter(0.05))?;

    model.insert_shell(Shell::new("Roof", ["R1", "R2", "R3", "R4"]).with_thickness(0.2))?;
    Ok(model)
}

/// Execute the export-demo command
pub fn execute(args: &ExportDemoArgs, format: OutputFormat) -> FeaResult<()> {
    let path = args
        .path
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_export_filename(Utc::now())));

    let model = demo_model()?;
    let written = export_model(&model, &path)?;

    match format {
        OutputFormat::Text => output::print_success(&format!("Wrote {}", written.display())),
        OutputFormat::Json => output::print_json(&serde_json::json!({ "path": written.display().to_string() }))?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fea_core::geometry::resolve_model;

    #[test]
    fn test_demo_model_resolves() {
        let model = demo_model().unwrap();
        let geometry = resolve_model(&model);
        assert!(geometry.skipped.is_empty());
        assert_eq!(geometry.beams.len(), 9);
        assert_eq!(geometry.shells.len(), 1);
        assert_eq!(geometry.beam("Column_1").map(|b| b.length), Some(3.0));
    }
}
