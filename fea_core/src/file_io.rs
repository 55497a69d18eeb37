//! # File I/O Module
//!
//! Reads and writes structural models as JSON documents:
//!
//! - **Atomic saves**: write to `.tmp`, sync, rename over the target
//! - **Tolerant imports**: malformed entries are skipped and reported, never fatal
//! - **Version validation**: refuse files written by a newer, incompatible format
//!
//! ## File Format
//!
//! ```json
//! {
//!   "structural_data": {
//!     "points":   { "P1": [0.0, 0.0, 0.0] },
//!     "beams":    { "B1": { "start_point": "P1", "end_point": "P2", "section": "S1" } },
//!     "shells":   { "Sh1": { "points": ["P1", "P2", "P3"], "thickness": 0.05 } },
//!     "sections": { "S1": { "type": "RECTANGULAR", "width": 0.1, "height": 0.15 } },
//!     "metadata": { "version": "0.1.1", "exported_from": "BlenderFEA", "units": "METRIC",
//!                   "scale_length": 1.0, "length_unit": "METERS" }
//!   }
//! }
//! ```
//!
//! Entries keep the order of the model on export and are imported in file
//! order.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fea_core::file_io::{export_model, import_model};
//! use fea_core::model::StructuralModel;
//! use std::path::Path;
//!
//! let mut model = StructuralModel::new();
//! model.insert_point("P1", 0.0, 0.0, 0.0)?;
//!
//! // "frame" becomes "frame.json"
//! let written = export_model(&model, Path::new("frame"))?;
//!
//! let (loaded, report) = import_model(&written)?;
//! assert_eq!(loaded.points().len(), 1);
//! assert!(report.is_clean());
//! # Ok::<(), fea_core::errors::FeaError>(())
//! ```

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{FeaError, FeaResult};
use crate::geometry::{resolve_model, Skipped};
use crate::model::{
    Beam, ModelSettings, Shell, StructuralModel, DEFAULT_BEAM_DIAMETER, DEFAULT_SHELL_THICKNESS, MIN_BEAM_DIAMETER,
};
use crate::sections::{SectionKind, SectionProfile};

/// Version of the file format written by this crate
pub const FORMAT_VERSION: &str = "0.1.1";

/// Value of `metadata.exported_from`
pub const EXPORTED_FROM: &str = "BlenderFEA";

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BeamRecord {
    #[serde(default)]
    start_point: Option<String>,
    #[serde(default)]
    end_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    diameter: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ShellRecord {
    #[serde(default)]
    points: Option<Vec<String>>,
    #[serde(default = "default_thickness")]
    thickness: f64,
}

fn default_thickness() -> f64 {
    DEFAULT_SHELL_THICKNESS
}

/// Only the fields of the section's own type are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SectionRecord {
    #[serde(rename = "type", default)]
    kind: SectionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    diameter: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sides: Option<u32>,
}

impl SectionRecord {
    fn from_profile(profile: &SectionProfile) -> Self {
        let record = SectionRecord {
            kind: profile.kind,
            ..SectionRecord::default()
        };
        match profile.kind {
            SectionKind::Circular => SectionRecord {
                diameter: Some(profile.diameter),
                ..record
            },
            SectionKind::Rectangular => SectionRecord {
                width: Some(profile.width),
                height: Some(profile.height),
                ..record
            },
            SectionKind::Polygonal => SectionRecord {
                diameter: Some(profile.poly_diameter),
                sides: Some(profile.sides),
                ..record
            },
        }
    }

    fn into_profile(self, name: &str) -> SectionProfile {
        let mut profile = SectionProfile::new(name);
        profile.kind = self.kind;
        match self.kind {
            SectionKind::Circular => {
                profile.diameter = self.diameter.unwrap_or(profile.diameter);
            }
            SectionKind::Rectangular => {
                profile.width = self.width.unwrap_or(profile.width);
                profile.height = self.height.unwrap_or(profile.height);
            }
            SectionKind::Polygonal => {
                profile.poly_diameter = self.diameter.unwrap_or(profile.poly_diameter);
                profile.sides = self.sides.unwrap_or(profile.sides);
            }
        }
        profile
    }
}

/// The `metadata` block of a model file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub exported_from: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub scale_length: Option<f64>,
    #[serde(default)]
    pub length_unit: Option<String>,
}

impl FileMetadata {
    fn for_model(model: &StructuralModel) -> Self {
        FileMetadata {
            version: Some(FORMAT_VERSION.to_string()),
            exported_from: Some(EXPORTED_FROM.to_string()),
            units: Some(model.settings.unit_system.clone()),
            scale_length: Some(model.settings.scale_length),
            length_unit: Some(model.settings.length_unit.clone()),
        }
    }

    fn apply_to(&self, settings: &mut ModelSettings) {
        if let Some(units) = &self.units {
            settings.unit_system = units.clone();
        }
        if let Some(scale) = self.scale_length.filter(|s| s.is_finite() && *s > 0.0) {
            settings.scale_length = scale;
        }
        if let Some(unit) = &self.length_unit {
            settings.length_unit = unit.clone();
        }
    }
}

// ============================================================================
// Import report
// ============================================================================

/// A file entry that was not imported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnoredEntry {
    /// "point", "section", "beam" or "shell"
    pub kind: String,
    pub name: String,
    pub reason: String,
}

/// What an import brought in and what it left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub points: usize,
    pub sections: usize,
    pub beams: usize,
    pub shells: usize,

    /// Malformed entries that were dropped
    pub ignored: Vec<IgnoredEntry>,

    /// Imported beams and shells whose geometry cannot be built
    pub unresolved: Vec<Skipped>,

    /// Metadata block as found in the file
    pub metadata: Option<FileMetadata>,
}

impl ImportReport {
    /// True when every entry was imported and resolves
    pub fn is_clean(&self) -> bool {
        self.ignored.is_empty() && self.unresolved.is_empty()
    }

    fn ignore(&mut self, kind: &str, name: &str, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(kind, name, %reason, "ignoring entry");
        self.ignored.push(IgnoredEntry {
            kind: kind.to_string(),
            name: name.to_string(),
            reason,
        });
    }
}

// ============================================================================
// Export
// ============================================================================

/// Build the JSON document for a model.
pub fn to_document(model: &StructuralModel) -> FeaResult<Value> {
    let mut points = Map::new();
    for point in model.points() {
        points.insert(point.name.clone(), serde_json::to_value([point.x, point.y, point.z])?);
    }

    let mut beams = Map::new();
    for beam in model.beams() {
        let section = beam.assigned_section().map(str::to_string);
        let record = BeamRecord {
            start_point: Some(beam.start_point.clone()),
            end_point: Some(beam.end_point.clone()),
            diameter: if section.is_none() { Some(beam.diameter) } else { None },
            section,
        };
        beams.insert(beam.name.clone(), serde_json::to_value(record)?);
    }

    let mut shells = Map::new();
    for shell in model.shells() {
        let record = ShellRecord {
            points: Some(shell.point_names.clone()),
            thickness: shell.thickness,
        };
        shells.insert(shell.name.clone(), serde_json::to_value(record)?);
    }

    let mut sections = Map::new();
    for section in model.sections() {
        sections.insert(section.name.clone(), serde_json::to_value(SectionRecord::from_profile(section))?);
    }

    let mut data = Map::new();
    data.insert("points".to_string(), Value::Object(points));
    data.insert("beams".to_string(), Value::Object(beams));
    data.insert("shells".to_string(), Value::Object(shells));
    data.insert("sections".to_string(), Value::Object(sections));
    data.insert("metadata".to_string(), serde_json::to_value(FileMetadata::for_model(model))?);

    let mut document = Map::new();
    document.insert("structural_data".to_string(), Value::Object(data));
    Ok(Value::Object(document))
}

/// Save a model with atomic write semantics and return the path written.
///
/// `.json` is appended when `path` has another or no extension, and missing
/// parent directories are created. The document goes to a `.tmp` sibling
/// first, is synced to disk, then renamed over the target so an interrupted
/// save never leaves a truncated file behind.
pub fn export_model(model: &StructuralModel, path: &Path) -> FeaResult<PathBuf> {
    let path = with_json_extension(path);
    let json = serde_json::to_string_pretty(&to_document(model)?)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            FeaError::file_error("create directory", parent.display().to_string(), e.to_string())
        })?;
    }

    let tmp_path = path.with_extension("json.tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        FeaError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        FeaError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        FeaError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, &path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        FeaError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    tracing::info!(
        path = %path.display(),
        points = model.points().len(),
        beams = model.beams().len(),
        shells = model.shells().len(),
        sections = model.sections().len(),
        "exported model"
    );
    Ok(path)
}

/// Suggested file name for an export made at `now`
pub fn default_export_filename(now: DateTime<Utc>) -> String {
    format!("structural_data_{}.json", now.format("%Y%m%d-%H%M%S"))
}

fn with_json_extension(path: &Path) -> PathBuf {
    let is_json = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        return path.to_path_buf();
    }
    let mut name = OsString::from(path.as_os_str());
    name.push(".json");
    PathBuf::from(name)
}

// ============================================================================
// Import
// ============================================================================

/// Load a model file.
///
/// # Returns
///
/// * `Ok((model, report))` - the model plus what was skipped along the way
/// * `Err(FeaError::FileError)` - the file cannot be read
/// * `Err(FeaError::SerializationError)` - the file is not a JSON object
/// * `Err(FeaError::VersionMismatch)` - written by an incompatible format version
pub fn import_model(path: &Path) -> FeaResult<(StructuralModel, ImportReport)> {
    let contents = fs::read_to_string(path)
        .map_err(|e| FeaError::file_error("read", path.display().to_string(), e.to_string()))?;

    let (model, report) = import_str(&contents).map_err(|e| match e {
        FeaError::SerializationError { reason } => {
            FeaError::serialization(format!("Invalid JSON in {}: {}", path.display(), reason))
        }
        other => other,
    })?;

    tracing::info!(
        path = %path.display(),
        points = report.points,
        beams = report.beams,
        shells = report.shells,
        sections = report.sections,
        ignored = report.ignored.len(),
        unresolved = report.unresolved.len(),
        "imported model"
    );
    Ok((model, report))
}

/// Build a model from a JSON document.
///
/// Points are read first, then sections, beams and shells, so references
/// always point backwards. Beams without both endpoints and shells without a
/// point list are ignored. A beam or shell whose geometry cannot be built is
/// still imported and listed in [`ImportReport::unresolved`].
pub fn import_str(json: &str) -> FeaResult<(StructuralModel, ImportReport)> {
    let document: Value = serde_json::from_str(json)?;
    let root = document
        .as_object()
        .ok_or_else(|| FeaError::serialization("Top level must be a JSON object"))?;

    let empty = Map::new();
    let data = match root.get("structural_data") {
        Some(Value::Object(data)) => data,
        Some(_) => return Err(FeaError::serialization("'structural_data' must be an object")),
        None => &empty,
    };

    let mut report = ImportReport::default();
    let mut model = StructuralModel::new();

    if let Some(value) = data.get("metadata") {
        match serde_json::from_value::<FileMetadata>(value.clone()) {
            Ok(metadata) => {
                if let Some(version) = &metadata.version {
                    validate_version(version)?;
                }
                metadata.apply_to(&mut model.settings);
                report.metadata = Some(metadata);
            }
            Err(e) => report.ignore("metadata", "metadata", e.to_string()),
        }
    }

    for (name, value) in entries(data, "points") {
        match serde_json::from_value::<[f64; 3]>(value.clone()) {
            Ok([x, y, z]) => match model.insert_point(name.as_str(), x, y, z) {
                Ok(()) => report.points += 1,
                Err(e) => report.ignore("point", name, e.to_string()),
            },
            Err(e) => report.ignore("point", name, format!("expected [x, y, z]: {}", e)),
        }
    }

    for (name, value) in entries(data, "sections") {
        match serde_json::from_value::<SectionRecord>(value.clone()) {
            Ok(record) => match model.insert_section(record.into_profile(name)) {
                Ok(()) => report.sections += 1,
                Err(e) => report.ignore("section", name, e.to_string()),
            },
            Err(e) => report.ignore("section", name, e.to_string()),
        }
    }

    for (name, value) in entries(data, "beams") {
        let record = match serde_json::from_value::<BeamRecord>(value.clone()) {
            Ok(record) => record,
            Err(e) => {
                report.ignore("beam", name, e.to_string());
                continue;
            }
        };
        let (Some(start), Some(end)) = (record.start_point, record.end_point) else {
            report.ignore("beam", name, "missing start_point or end_point");
            continue;
        };
        let diameter = record.diameter.unwrap_or(DEFAULT_BEAM_DIAMETER);
        let diameter = clamp_limit("beam", name, "diameter", diameter, MIN_BEAM_DIAMETER);
        let mut beam = Beam::new(name.as_str(), start, end).with_diameter(diameter);
        if let Some(section) = record.section {
            beam = beam.with_section(section);
        }
        model.push_beam_unchecked(beam);
        report.beams += 1;
    }

    for (name, value) in entries(data, "shells") {
        let record = match serde_json::from_value::<ShellRecord>(value.clone()) {
            Ok(record) => record,
            Err(e) => {
                report.ignore("shell", name, e.to_string());
                continue;
            }
        };
        let Some(points) = record.points else {
            report.ignore("shell", name, "missing points");
            continue;
        };
        let points = points.iter().map(|p| p.trim()).filter(|p| !p.is_empty());
        let thickness = clamp_limit("shell", name, "thickness", record.thickness, 0.0);
        model.push_shell_unchecked(Shell::new(name.as_str(), points).with_thickness(thickness));
        report.shells += 1;
    }

    report.unresolved = resolve_model(&model).skipped;
    Ok((model, report))
}

/// Raise a file value to the property's lower limit.
fn clamp_limit(kind: &str, name: &str, field: &str, value: f64, min: f64) -> f64 {
    if value >= min {
        return value;
    }
    tracing::warn!(kind, name, field, value, min, "clamping value to lower limit");
    min
}

/// Entries of the object stored under `key`, in file order
fn entries<'a>(data: &'a Map<String, Value>, key: &str) -> impl Iterator<Item = (&'a String, &'a Value)> {
    data.get(key).and_then(Value::as_object).into_iter().flat_map(|m| m.iter())
}

/// Validate that a file version is compatible with [`FORMAT_VERSION`].
fn validate_version(file_version: &str) -> FeaResult<()> {
    let mismatch = || FeaError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: FORMAT_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version
        .split('.')
        .filter_map(|p| p.trim().parse().ok())
        .collect();
    let current_parts: Vec<u32> = FORMAT_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // 0.x minors may break the format, so refuse newer ones
    if current_parts[0] == 0 && file_parts.len() > 1 && current_parts.len() > 1 && file_parts[1] > current_parts[1] {
        return Err(mismatch());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ElementKind, NotResolvable};
    use chrono::TimeZone;
    use std::env::temp_dir;

    fn temp_model_path(name: &str) -> PathBuf {
        temp_dir().join(format!("fea_core_test_{}_{}.json", name, std::process::id()))
    }

    fn sample_model() -> StructuralModel {
        let mut model = StructuralModel::new();
        model.insert_point("P1", 0.0, 0.0, 0.0).unwrap();
        model.insert_point("P2", 2.0, 0.0, 0.0).unwrap();
        model.insert_point("P3", 2.0, 2.0, 0.0).unwrap();
        model.insert_section(SectionProfile::rectangular("S1", 0.1, 0.15)).unwrap();
        model.insert_section(SectionProfile::polygonal("Hex", 0.2, 6)).unwrap();
        model
            .insert_beam(Beam::new("B1", "P1", "P2").with_section("S1"))
            .unwrap();
        model
            .insert_beam(Beam::new("B2", "P2", "P3").with_diameter(0.25))
            .unwrap();
        model
            .insert_shell(Shell::new("Sh1", ["P1", "P2", "P3"]).with_thickness(0.05))
            .unwrap();
        model
    }

    #[test]
    fn test_document_layout() {
        let document = to_document(&sample_model()).unwrap();
        let data = &document["structural_data"];

        assert_eq!(data["points"]["P2"], serde_json::json!([2.0, 0.0, 0.0]));
        assert_eq!(data["beams"]["B1"]["section"], "S1");
        assert!(data["beams"]["B1"].get("diameter").is_none());
        assert_eq!(data["beams"]["B2"]["diameter"], 0.25);
        assert!(data["beams"]["B2"].get("section").is_none());
        assert_eq!(data["shells"]["Sh1"]["points"], serde_json::json!(["P1", "P2", "P3"]));
        assert_eq!(
            data["sections"]["S1"],
            serde_json::json!({"type": "RECTANGULAR", "width": 0.1, "height": 0.15})
        );
        assert_eq!(
            data["sections"]["Hex"],
            serde_json::json!({"type": "POLYGONAL", "diameter": 0.2, "sides": 6})
        );
        assert_eq!(data["metadata"]["version"], FORMAT_VERSION);
        assert_eq!(data["metadata"]["exported_from"], "BlenderFEA");
        assert_eq!(data["metadata"]["units"], "METRIC");

        let keys: Vec<&String> = data.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["points", "beams", "shells", "sections", "metadata"]);
    }

    #[test]
    fn test_export_and_import_roundtrip() {
        let path = temp_model_path("roundtrip");
        let model = sample_model();

        let written = export_model(&model, &path).unwrap();
        assert_eq!(written, path);

        let (loaded, report) = import_model(&path).unwrap();
        assert!(report.is_clean(), "{:?}", report);
        assert_eq!(loaded.points(), model.points());
        assert_eq!(loaded.sections(), model.sections());
        assert_eq!(loaded.beams()[0].section_name.as_deref(), Some("S1"));
        assert_eq!(loaded.beams()[1].section_name, None);
        assert_eq!(loaded.beams()[1].diameter, 0.25);
        assert_eq!(loaded.shells(), model.shells());
        assert_eq!(report.points, 3);
        assert_eq!(report.beams, 2);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_export_appends_extension_and_creates_dirs() {
        let dir = temp_dir().join(format!("fea_core_test_dir_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let target = dir.join("nested").join("model");

        let written = export_model(&sample_model(), &target).unwrap();
        assert_eq!(written, dir.join("nested").join("model.json"));
        assert!(written.exists());
        assert!(!written.with_extension("json.tmp").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_import_defaults() {
        let json = r#"{
            "structural_data": {
                "points": {"A": [0, 0, 0], "B": [0, 0, 3]},
                "sections": {"S": {}, "R": {"type": "RECTANGULAR", "width": 0.3}},
                "beams": {"B1": {"start_point": "A", "end_point": "B"}},
                "shells": {}
            }
        }"#;
        let (model, report) = import_str(json).unwrap();
        assert!(report.is_clean());
        assert!(report.metadata.is_none());

        let s = model.section("S").unwrap();
        assert_eq!(s.kind, SectionKind::Circular);
        assert_eq!(s.diameter, 0.1);
        let r = model.section("R").unwrap();
        assert_eq!((r.width, r.height), (0.3, 0.15));

        assert_eq!(model.beam("B1").unwrap().diameter, DEFAULT_BEAM_DIAMETER);
    }

    #[test]
    fn test_import_skips_malformed_entries() {
        let json = r#"{
            "structural_data": {
                "points": {"A": [0, 0, 0], "B": [1, 0, 0], "C": [1, 1, 0], "bad": [1, 2]},
                "beams": {
                    "ok": {"start_point": "A", "end_point": "B"},
                    "half": {"start_point": "A"},
                    "dangling": {"start_point": "A", "end_point": "Z"}
                },
                "shells": {
                    "nopoints": {"thickness": 0.1},
                    "tri": {"points": ["A", "B", "C"]}
                }
            }
        }"#;
        let (model, report) = import_str(json).unwrap();

        assert_eq!(model.points().len(), 3);
        assert_eq!(model.beams().len(), 2);
        assert_eq!(model.shells().len(), 1);
        assert_eq!(model.shell("tri").unwrap().thickness, DEFAULT_SHELL_THICKNESS);

        let ignored: Vec<(&str, &str)> = report
            .ignored
            .iter()
            .map(|e| (e.kind.as_str(), e.name.as_str()))
            .collect();
        assert_eq!(ignored, [("point", "bad"), ("beam", "half"), ("shell", "nopoints")]);

        // The dangling beam is kept but reported
        assert_eq!(report.unresolved.len(), 1);
        assert_eq!(report.unresolved[0].name, "dangling");
        assert_eq!(report.unresolved[0].kind, ElementKind::Beam);
        assert_eq!(
            report.unresolved[0].reason,
            NotResolvable::MissingPoint { point: "Z".to_string() }
        );
    }

    #[test]
    fn test_import_applies_metadata() {
        let json = r#"{"structural_data": {"metadata": {
            "version": "0.1.0", "units": "IMPERIAL", "scale_length": 0.3048, "length_unit": "FEET"
        }}}"#;
        let (model, report) = import_str(json).unwrap();
        assert_eq!(model.settings.unit_system, "IMPERIAL");
        assert_eq!(model.settings.length_unit, "FEET");
        assert_eq!(model.settings.scale_length, 0.3048);
        assert_eq!(report.metadata.unwrap().version.as_deref(), Some("0.1.0"));
    }

    #[test]
    fn test_import_clamps_to_property_limits() {
        let json = r#"{
            "structural_data": {
                "points": {"A": [0, 0, 0], "B": [1, 0, 0], "C": [1, 1, 0]},
                "beams": {
                    "neg": {"start_point": "A", "end_point": "B", "diameter": -0.5},
                    "thin": {"start_point": "B", "end_point": "C", "diameter": 0.001}
                },
                "shells": {"S": {"points": ["A", "B", "C"], "thickness": -0.2}}
            }
        }"#;
        let (model, report) = import_str(json).unwrap();
        assert!(report.is_clean());
        assert_eq!(model.beam("neg").unwrap().diameter, MIN_BEAM_DIAMETER);
        assert_eq!(model.beam("thin").unwrap().diameter, MIN_BEAM_DIAMETER);
        assert_eq!(model.shell("S").unwrap().thickness, 0.0);

        // Clamped values pass the same checks as interactive edits
        let mut copy = StructuralModel::new();
        for point in model.points() {
            copy.insert_point(point.name.as_str(), point.x, point.y, point.z).unwrap();
        }
        copy.insert_beam(model.beam("neg").unwrap().clone()).unwrap();
        copy.insert_shell(model.shell("S").unwrap().clone()).unwrap();
    }

    #[test]
    fn test_import_ignores_malformed_metadata() {
        let json = r#"{"structural_data": {
            "points": {"A": [0, 0, 0]},
            "metadata": {"version": 1}
        }}"#;
        let (model, report) = import_str(json).unwrap();
        assert_eq!(model.points().len(), 1);
        assert!(report.metadata.is_none());
        assert_eq!(model.settings, ModelSettings::default());

        let ignored: Vec<(&str, &str)> = report
            .ignored
            .iter()
            .map(|e| (e.kind.as_str(), e.name.as_str()))
            .collect();
        assert_eq!(ignored, [("metadata", "metadata")]);
    }

    #[test]
    fn test_import_rejects_newer_version() {
        let json = r#"{"structural_data": {"metadata": {"version": "0.2.0"}}}"#;
        let err = import_str(json).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");
    }

    #[test]
    fn test_import_invalid_json() {
        assert_eq!(import_str("{not json").unwrap_err().error_code(), "SERIALIZATION_ERROR");
        assert_eq!(import_str("[1, 2]").unwrap_err().error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_import_missing_file() {
        let err = import_model(Path::new("/nonexistent/dir/model.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(FORMAT_VERSION).is_ok());
        assert!(validate_version("0.1.0").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_default_export_filename() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(default_export_filename(now), "structural_data_20240309-140507.json");
    }

    #[test]
    fn test_json_extension() {
        assert_eq!(with_json_extension(Path::new("a/model")), PathBuf::from("a/model.json"));
        assert_eq!(with_json_extension(Path::new("model.JSON")), PathBuf::from("model.JSON"));
        assert_eq!(with_json_extension(Path::new("model.txt")), PathBuf::from("model.txt.json"));
    }
}
