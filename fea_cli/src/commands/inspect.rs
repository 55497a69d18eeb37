//! `inspect` command.

use std::path::PathBuf;

use clap::Args;
use fea_core::errors::FeaResult;
use fea_core::file_io::{import_model, ImportReport};
use fea_core::geometry::{resolve_model, ModelGeometry};
use serde::Serialize;

use crate::output::{self, vec3, OutputFormat};

/// Arguments for the inspect command
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Model file to import
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
struct Inspection<'a> {
    import: &'a ImportReport,
    geometry: &'a ModelGeometry,
}

/// Execute the inspect command
pub fn execute(args: &InspectArgs, format: OutputFormat) -> FeaResult<()> {
    let (model, report) = import_model(&args.path)?;
    let geometry = resolve_model(&model);

    if format == OutputFormat::Json {
        return output::print_json(&Inspection {
            import: &report,
            geometry: &geometry,
        });
    }

    println!(
        "{}: {} points, {} sections, {} beams, {} shells",
        args.path.display(),
        report.points,
        report.sections,
        report.beams,
        report.shells
    );
    println!(
        "units: {} ({}, scale {})",
        model.settings.unit_system, model.settings.length_unit, model.settings.scale_length
    );

    if !geometry.beams.is_empty() {
        println!();
        println!("Beams:");
        for beam in &geometry.beams {
            let g = &beam.geometry;
            let section = &g.cross_section;
            println!(
                "  {:<12} length {:.4}  center {}  axis {}  {} {:.4} x {:.4} ({} sides)",
                beam.name,
                g.length,
                vec3(g.center.to_array()),
                vec3(g.axis.to_array()),
                section.kind,
                section.width,
                section.height,
                section.sides
            );
        }
    }

    if !geometry.shells.is_empty() {
        println!();
        println!("Shells:");
        for shell in &geometry.shells {
            let g = &shell.geometry;
            println!(
                "  {:<12} {} vertices  area {:.4}  normal {}  offset {}",
                shell.name,
                g.vertices.len(),
                g.area(),
                vec3(g.face_normal.to_array()),
                vec3(g.extrusion_offset.to_array())
            );
        }
    }

    for entry in &report.ignored {
        output::print_warning(&format!("ignored {} '{}': {}", entry.kind, entry.name, entry.reason));
    }
    for skipped in &geometry.skipped {
        output::print_warning(&format!("no geometry for {:?} '{}': {}", skipped.kind, skipped.name, skipped.reason));
    }
    Ok(())
}
