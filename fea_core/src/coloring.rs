//! Display colors for beams, grouped by section.
//!
//! Colors are pure functions of names so the same section gets the same
//! color every session. The report lists one [`ColorAssignment`] per colored
//! beam; creating the actual materials is left to the caller.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use md5::{Digest, Md5};

use crate::model::StructuralModel;

/// Linear RGBA, each channel in [0, 1]
pub type Rgba = [f64; 4];

/// Color of beams without a section in [`ColorMode::IncludeUnassigned`]
pub const UNASSIGNED_COLOR: Rgba = [0.5, 0.5, 0.5, 1.0];

/// Label used in place of a section name for unassigned beams
pub const UNASSIGNED_LABEL: &str = "Unassigned";

/// Fixed colors handed out to sections in first-seen order.
pub const SECTION_PALETTE: [Rgba; 8] = [
    [0.8, 0.2, 0.2, 1.0], // red
    [0.2, 0.6, 0.8, 1.0], // blue
    [0.2, 0.8, 0.3, 1.0], // green
    [0.8, 0.6, 0.1, 1.0], // yellow
    [0.7, 0.3, 0.8, 1.0], // purple
    [0.1, 0.8, 0.8, 1.0], // cyan
    [0.9, 0.4, 0.1, 1.0], // orange
    [0.6, 0.3, 0.6, 1.0], // magenta
];

const CHANNEL_MIN: f64 = 0.3;
const CHANNEL_MAX: f64 = 0.9;

/// How beams are colored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Hash color per section name; unassigned beams are left alone
    #[default]
    BySectionName,
    /// Palette color per section; unassigned beams are left alone
    Palette,
    /// Every beam; unassigned beams are gray
    IncludeUnassigned,
}

/// Color chosen for one beam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorAssignment {
    pub beam: String,

    /// Section the color belongs to, `None` for unassigned beams
    pub section: Option<String>,

    /// Material the beam should use, `FEA_Section_<section>`
    pub material: String,

    pub color: Rgba,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColoringReport {
    pub assignments: Vec<ColorAssignment>,

    /// Number of different sections (counting "Unassigned") that got a color
    pub distinct_sections: usize,
}

/// Material name for a section
pub fn material_name(section: &str) -> String {
    format!("FEA_Section_{}", section)
}

/// Deterministic color for `name`, channels clamped to [0.3, 0.9].
pub fn color_from_name(name: &str) -> Rgba {
    let [r, g, b, a] = raw_color(name);
    [
        r.clamp(CHANNEL_MIN, CHANNEL_MAX),
        g.clamp(CHANNEL_MIN, CHANNEL_MAX),
        b.clamp(CHANNEL_MIN, CHANNEL_MAX),
        a,
    ]
}

/// First three MD5 digest bytes of the name as RGB
fn raw_color(name: &str) -> Rgba {
    let digest = Md5::digest(name.as_bytes());
    [
        f64::from(digest[0]) / 255.0,
        f64::from(digest[1]) / 255.0,
        f64::from(digest[2]) / 255.0,
        1.0,
    ]
}

/// Pick a color for every beam of `model` according to `mode`.
pub fn color_beams(model: &StructuralModel, mode: ColorMode) -> ColoringReport {
    let mut report = ColoringReport::default();
    // section label -> palette slot, in first-seen order
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for beam in model.beams() {
        let section = beam.assigned_section();
        if section.is_none() && mode != ColorMode::IncludeUnassigned {
            continue;
        }

        let label = section.unwrap_or(UNASSIGNED_LABEL);
        let next_slot = seen.len();
        let slot = *seen.entry(label).or_insert(next_slot);

        let color = match (mode, section) {
            (ColorMode::BySectionName, Some(name)) => color_from_name(name),
            (ColorMode::Palette, Some(_)) => SECTION_PALETTE[slot % SECTION_PALETTE.len()],
            (ColorMode::IncludeUnassigned, Some(name)) => raw_color(name),
            (_, None) => UNASSIGNED_COLOR,
        };

        report.assignments.push(ColorAssignment {
            beam: beam.name.clone(),
            section: section.map(str::to_string),
            material: material_name(label),
            color,
        });
    }

    report.distinct_sections = seen.len();
    tracing::info!(
        beams = report.assignments.len(),
        sections = report.distinct_sections,
        ?mode,
        "colored beams"
    );
    report
}
