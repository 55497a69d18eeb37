//! # Structural Model
//!
//! The `StructuralModel` is the root container for one user-authored
//! configuration of points, beams, shells and section profiles.
//!
//! ## Structure
//!
//! ```text
//! StructuralModel
//! ├── settings: ModelSettings (unit system, defaults for new elements)
//! ├── points:   Vec<Point>            (named coordinates)
//! ├── sections: Vec<SectionProfile>   (named cross-sections)
//! ├── beams:    Vec<Beam>             (point pair + section or diameter)
//! └── shells:   Vec<Shell>            (ordered point names + thickness)
//! ```
//!
//! Elements keep their insertion order, which is the order they are listed,
//! exported and colored in. Beams and shells refer to points and sections by
//! name only. Deleting a point that a beam uses is allowed and leaves the
//! beam dangling; its geometry then simply fails to resolve.
//!
//! ## Example
//!
//! ```rust
//! use fea_core::model::StructuralModel;
//!
//! let mut model = StructuralModel::new();
//! model.insert_point("A", 0.0, 0.0, 0.0).unwrap();
//! model.insert_point("B", 3.0, 0.0, 0.0).unwrap();
//! let beam = model.add_beam().unwrap();
//!
//! let geometry = model.update_beam(&beam).unwrap().unwrap();
//! assert_eq!(geometry.length, 3.0);
//! ```

use chrono::{DateTime, Utc};
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::errors::{FeaError, FeaResult};
use crate::geometry::{resolve_beam, resolve_shell, BeamGeometry, ShellGeometry};
use crate::sections::SectionProfile;

/// Default diameter of a beam without a section
pub const DEFAULT_BEAM_DIAMETER: f64 = 0.1;

/// Smallest accepted fallback beam diameter
pub const MIN_BEAM_DIAMETER: f64 = 0.01;

/// Default thickness of a new shell
pub const DEFAULT_SHELL_THICKNESS: f64 = 0.05;

/// A named structural point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(name: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Point {
            name: name.into(),
            x,
            y,
            z,
        }
    }

    /// Coordinates as a vector
    pub fn position(&self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }
}

/// A beam between two named points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    pub name: String,

    /// Name of the start point
    pub start_point: String,

    /// Name of the end point
    pub end_point: String,

    /// Assigned section profile, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,

    /// Round section diameter used when no section is assigned
    pub diameter: f64,
}

impl Beam {
    pub fn new(name: impl Into<String>, start_point: impl Into<String>, end_point: impl Into<String>) -> Self {
        Beam {
            name: name.into(),
            start_point: start_point.into(),
            end_point: end_point.into(),
            section_name: None,
            diameter: DEFAULT_BEAM_DIAMETER,
        }
    }

    pub fn with_section(mut self, section_name: impl Into<String>) -> Self {
        self.section_name = Some(section_name.into());
        self
    }

    pub fn with_diameter(mut self, diameter: f64) -> Self {
        self.diameter = diameter;
        self
    }

    /// Section name, treating an empty string as unassigned
    pub fn assigned_section(&self) -> Option<&str> {
        self.section_name.as_deref().filter(|name| !name.is_empty())
    }

    fn uses_point(&self, point: &str) -> bool {
        self.start_point == point || self.end_point == point
    }
}

/// A shell bounded by an ordered list of named points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shell {
    pub name: String,

    /// Boundary points in winding order
    pub point_names: Vec<String>,

    /// Extrusion thickness along the face normal (0 = flat face)
    pub thickness: f64,
}

impl Shell {
    pub fn new<I, S>(name: impl Into<String>, point_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Shell {
            name: name.into(),
            point_names: point_names.into_iter().map(Into::into).collect(),
            thickness: DEFAULT_SHELL_THICKNESS,
        }
    }

    /// Build a shell from a comma separated point list such as `"P1, P2,P3"`.
    ///
    /// Names are trimmed and empty entries dropped.
    pub fn from_point_list(name: impl Into<String>, point_list: &str) -> Self {
        Shell::new(
            name,
            point_list
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty()),
        )
    }

    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    /// Point names joined back into a comma separated list
    pub fn point_list(&self) -> String {
        self.point_names.join(",")
    }
}

/// Model-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Unit system label written to exported files (e.g. "METRIC")
    pub unit_system: String,

    /// Length unit label written to exported files (e.g. "METERS")
    pub length_unit: String,

    /// Scene scale factor for lengths
    pub scale_length: f64,

    /// Diameter given to new beams
    pub default_beam_diameter: f64,

    /// Thickness given to new shells
    pub default_shell_thickness: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        ModelSettings {
            unit_system: "METRIC".to_string(),
            length_unit: "METERS".to_string(),
            scale_length: 1.0,
            default_beam_diameter: DEFAULT_BEAM_DIAMETER,
            default_shell_thickness: DEFAULT_SHELL_THICKNESS,
        }
    }
}

/// Root container for one structural model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuralModel {
    pub settings: ModelSettings,
    points: Vec<Point>,
    sections: Vec<SectionProfile>,
    beams: Vec<Beam>,
    shells: Vec<Shell>,

    /// When the model was last changed
    pub modified: DateTime<Utc>,
}

impl Default for StructuralModel {
    fn default() -> Self {
        StructuralModel::with_settings(ModelSettings::default())
    }
}

impl StructuralModel {
    /// Create an empty model with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ModelSettings) -> Self {
        StructuralModel {
            settings,
            points: Vec::new(),
            sections: Vec::new(),
            beams: Vec::new(),
            shells: Vec::new(),
            modified: Utc::now(),
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn sections(&self) -> &[SectionProfile] {
        &self.sections
    }

    pub fn beams(&self) -> &[Beam] {
        &self.beams
    }

    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    pub fn point(&self, name: &str) -> Option<&Point> {
        self.points.iter().find(|p| p.name == name)
    }

    pub fn section(&self, name: &str) -> Option<&SectionProfile> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn beam(&self, name: &str) -> Option<&Beam> {
        self.beams.iter().find(|b| b.name == name)
    }

    pub fn shell(&self, name: &str) -> Option<&Shell> {
        self.shells.iter().find(|s| s.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.sections.is_empty() && self.beams.is_empty() && self.shells.is_empty()
    }

    // ------------------------------------------------------------------
    // Points
    // ------------------------------------------------------------------

    /// Add a point named `Point_{n}` at the origin and return its name.
    pub fn add_point(&mut self) -> String {
        let name = next_name("Point", self.points.len(), |n| self.point(n).is_some());
        self.points.push(Point::new(name.clone(), 0.0, 0.0, 0.0));
        self.touch();
        name
    }

    /// Add a point with an explicit name and position.
    pub fn insert_point(&mut self, name: impl Into<String>, x: f64, y: f64, z: f64) -> FeaResult<()> {
        let name = name.into();
        require_name("Point", &name)?;
        if self.point(&name).is_some() {
            return Err(FeaError::duplicate_name("Point", name));
        }
        for (field, value) in [("x", x), ("y", y), ("z", z)] {
            if !value.is_finite() {
                return Err(FeaError::invalid_input(field, value.to_string(), "Coordinate must be finite"));
            }
        }
        self.points.push(Point::new(name, x, y, z));
        self.touch();
        Ok(())
    }

    /// Remove a point. Beams and shells that use it are left in place.
    pub fn delete_point(&mut self, name: &str) -> FeaResult<Point> {
        let index = self
            .points
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| FeaError::not_found("Point", name))?;
        let point = self.points.remove(index);
        self.touch();

        let dangling = self.elements_using_point(name);
        if !dangling.is_empty() {
            tracing::debug!(point = name, ?dangling, "deleted point is still referenced");
        }
        Ok(point)
    }

    /// Move a point.
    ///
    /// Returns the names of beams and shells whose geometry depends on the
    /// point and therefore needs to be regenerated.
    pub fn update_point_position(&mut self, name: &str, x: f64, y: f64, z: f64) -> FeaResult<Vec<String>> {
        for (field, value) in [("x", x), ("y", y), ("z", z)] {
            if !value.is_finite() {
                return Err(FeaError::invalid_input(field, value.to_string(), "Coordinate must be finite"));
            }
        }
        let point = self
            .points
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| FeaError::not_found("Point", name))?;
        point.x = x;
        point.y = y;
        point.z = z;
        self.touch();
        Ok(self.elements_using_point(name))
    }

    /// Names of beams, then shells, that reference `point`
    pub fn elements_using_point(&self, point: &str) -> Vec<String> {
        let beams = self.beams.iter().filter(|b| b.uses_point(point)).map(|b| b.name.clone());
        let shells = self
            .shells
            .iter()
            .filter(|s| s.point_names.iter().any(|p| p == point))
            .map(|s| s.name.clone());
        beams.chain(shells).collect()
    }

    // ------------------------------------------------------------------
    // Sections
    // ------------------------------------------------------------------

    /// Add a section named `Section_{n}` with default dimensions.
    pub fn add_section(&mut self) -> String {
        let name = next_name("Section", self.sections.len(), |n| self.section(n).is_some());
        self.sections.push(SectionProfile::new(name.clone()));
        self.touch();
        name
    }

    /// Add a fully specified section profile.
    pub fn insert_section(&mut self, section: SectionProfile) -> FeaResult<()> {
        section.validate()?;
        if self.section(&section.name).is_some() {
            return Err(FeaError::duplicate_name("Section", section.name));
        }
        self.sections.push(section);
        self.touch();
        Ok(())
    }

    /// Replace the dimensions of an existing section, keeping its name.
    pub fn update_section(&mut self, section: SectionProfile) -> FeaResult<()> {
        section.validate()?;
        let existing = self
            .sections
            .iter_mut()
            .find(|s| s.name == section.name)
            .ok_or_else(|| FeaError::not_found("Section", section.name.clone()))?;
        *existing = section;
        self.touch();
        Ok(())
    }

    /// Remove a section. Refused while any beam references it.
    pub fn delete_section(&mut self, name: &str) -> FeaResult<SectionProfile> {
        let index = self
            .sections
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| FeaError::not_found("Section", name))?;

        let users = self.beams_using_section(name);
        if !users.is_empty() {
            return Err(FeaError::InUse {
                kind: "Section".to_string(),
                name: name.to_string(),
                users,
            });
        }

        let section = self.sections.remove(index);
        self.touch();
        Ok(section)
    }

    /// Names of beams assigned to `section`
    pub fn beams_using_section(&self, section: &str) -> Vec<String> {
        self.beams
            .iter()
            .filter(|b| b.assigned_section() == Some(section))
            .map(|b| b.name.clone())
            .collect()
    }

    // ------------------------------------------------------------------
    // Beams
    // ------------------------------------------------------------------

    /// Add a beam named `Beam_{n}` between the first two points.
    pub fn add_beam(&mut self) -> FeaResult<String> {
        if self.points.len() < 2 {
            return Err(FeaError::invalid_input(
                "points",
                self.points.len().to_string(),
                "Need at least 2 points to create a beam",
            ));
        }
        let name = next_name("Beam", self.beams.len(), |n| self.beam(n).is_some());
        let beam = Beam::new(name.clone(), self.points[0].name.clone(), self.points[1].name.clone())
            .with_diameter(self.settings.default_beam_diameter);
        self.beams.push(beam);
        self.touch();
        Ok(name)
    }

    /// Add a beam whose endpoints (and section, if set) already exist.
    pub fn insert_beam(&mut self, beam: Beam) -> FeaResult<()> {
        require_name("Beam", &beam.name)?;
        if self.beam(&beam.name).is_some() {
            return Err(FeaError::duplicate_name("Beam", beam.name));
        }
        for point in [&beam.start_point, &beam.end_point] {
            if self.point(point).is_none() {
                return Err(FeaError::not_found("Point", point.clone()));
            }
        }
        if let Some(section) = beam.assigned_section() {
            if self.section(section).is_none() {
                return Err(FeaError::not_found("Section", section));
            }
        }
        if !(beam.diameter >= MIN_BEAM_DIAMETER) {
            return Err(FeaError::invalid_input(
                "diameter",
                beam.diameter.to_string(),
                format!("Beam diameter must be at least {}", MIN_BEAM_DIAMETER),
            ));
        }
        self.beams.push(beam);
        self.touch();
        Ok(())
    }

    /// Insert a beam as found in a file, without checking its references.
    pub(crate) fn push_beam_unchecked(&mut self, beam: Beam) {
        self.beams.push(beam);
        self.touch();
    }

    pub fn delete_beam(&mut self, name: &str) -> FeaResult<Beam> {
        let index = self
            .beams
            .iter()
            .position(|b| b.name == name)
            .ok_or_else(|| FeaError::not_found("Beam", name))?;
        let beam = self.beams.remove(index);
        self.touch();
        Ok(beam)
    }

    /// Assign a section to a beam, or clear it with `None`.
    pub fn assign_section(&mut self, beam: &str, section: Option<&str>) -> FeaResult<()> {
        if let Some(section) = section {
            if self.section(section).is_none() {
                return Err(FeaError::not_found("Section", section));
            }
        }
        let beam = self
            .beams
            .iter_mut()
            .find(|b| b.name == beam)
            .ok_or_else(|| FeaError::not_found("Beam", beam))?;
        beam.section_name = section.map(str::to_string);
        self.touch();
        Ok(())
    }

    /// Recompute a beam's geometry.
    ///
    /// `Ok(None)` means the beam exists but cannot be built right now (for
    /// example a referenced point was deleted); the caller should drop any
    /// previous geometry and carry on.
    pub fn update_beam(&self, name: &str) -> FeaResult<Option<BeamGeometry>> {
        let beam = self.beam(name).ok_or_else(|| FeaError::not_found("Beam", name))?;
        match resolve_beam(beam, self, self) {
            Ok(geometry) => Ok(Some(geometry)),
            Err(reason) => {
                tracing::warn!(beam = name, %reason, "skipping beam geometry");
                Ok(None)
            }
        }
    }

    // ------------------------------------------------------------------
    // Shells
    // ------------------------------------------------------------------

    /// Add a shell named `Shell_{n}` over the first three points.
    pub fn add_shell(&mut self) -> FeaResult<String> {
        if self.points.len() < 3 {
            return Err(FeaError::invalid_input(
                "points",
                self.points.len().to_string(),
                "Need at least 3 points to create a shell",
            ));
        }
        let name = next_name("Shell", self.shells.len(), |n| self.shell(n).is_some());
        let shell = Shell::new(name.clone(), self.points[..3].iter().map(|p| p.name.clone()))
            .with_thickness(self.settings.default_shell_thickness);
        self.shells.push(shell);
        self.touch();
        Ok(name)
    }

    /// Add a shell whose points all exist.
    pub fn insert_shell(&mut self, shell: Shell) -> FeaResult<()> {
        require_name("Shell", &shell.name)?;
        if self.shell(&shell.name).is_some() {
            return Err(FeaError::duplicate_name("Shell", shell.name));
        }
        if shell.point_names.len() < 3 {
            return Err(FeaError::invalid_input(
                "point_names",
                shell.point_list(),
                "A shell needs at least 3 points",
            ));
        }
        if let Some(missing) = shell.point_names.iter().find(|p| self.point(p).is_none()) {
            return Err(FeaError::not_found("Point", missing.clone()));
        }
        if !(shell.thickness >= 0.0) {
            return Err(FeaError::invalid_input(
                "thickness",
                shell.thickness.to_string(),
                "Thickness cannot be negative",
            ));
        }
        self.shells.push(shell);
        self.touch();
        Ok(())
    }

    /// Insert a shell as found in a file, without checking its references.
    pub(crate) fn push_shell_unchecked(&mut self, shell: Shell) {
        self.shells.push(shell);
        self.touch();
    }

    pub fn delete_shell(&mut self, name: &str) -> FeaResult<Shell> {
        let index = self
            .shells
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| FeaError::not_found("Shell", name))?;
        let shell = self.shells.remove(index);
        self.touch();
        Ok(shell)
    }

    /// Recompute a shell's geometry. See [`StructuralModel::update_beam`].
    pub fn update_shell(&self, name: &str) -> FeaResult<Option<ShellGeometry>> {
        let shell = self.shell(name).ok_or_else(|| FeaError::not_found("Shell", name))?;
        match resolve_shell(shell, self) {
            Ok(geometry) => Ok(Some(geometry)),
            Err(reason) => {
                tracing::warn!(shell = name, %reason, "skipping shell geometry");
                Ok(None)
            }
        }
    }

    // ------------------------------------------------------------------
    // Whole model
    // ------------------------------------------------------------------

    /// Remove every point, section, beam and shell. Settings are kept.
    pub fn clear_all(&mut self) {
        self.points.clear();
        self.sections.clear();
        self.beams.clear();
        self.shells.clear();
        self.touch();
    }
}

/// `{prefix}_{count + 1}`, bumped until it does not collide with an existing name
fn next_name(prefix: &str, count: usize, taken: impl Fn(&str) -> bool) -> String {
    let mut index = count + 1;
    loop {
        let name = format!("{}_{}", prefix, index);
        if !taken(&name) {
            return name;
        }
        index += 1;
    }
}

fn require_name(kind: &str, name: &str) -> FeaResult<()> {
    if name.trim().is_empty() {
        return Err(FeaError::invalid_input(
            "name",
            name,
            format!("{} name cannot be empty", kind),
        ));
    }
    Ok(())
}
