//! # Geometry Resolution
//!
//! Turns the topological description of beams and shells (point names,
//! section names, thickness) into the concrete geometry a mesh layer needs:
//! placement, length, orientation and cross-section for beams, ordered
//! vertices, face normal and extrusion for shells.
//!
//! Resolution is a pure function of the element and two lookups supplied by
//! the caller:
//!
//! - [`PointLookup`] - point name to coordinate
//! - [`SectionLookup`] - section name to [`SectionProfile`]
//!
//! Both are implemented for the usual map types and for
//! [`StructuralModel`], so a model can be passed directly.
//!
//! An element that cannot be built yields [`NotResolvable`]. That is an
//! expected outcome (a point was deleted, a beam has zero length), not a
//! failure: the caller skips the element and keeps going.
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use glam::DVec3;
//! use fea_core::geometry::{resolve_beam, NoSections};
//! use fea_core::model::Beam;
//!
//! let points = HashMap::from([
//!     ("A".to_string(), DVec3::ZERO),
//!     ("B".to_string(), DVec3::new(0.0, 4.0, 0.0)),
//! ]);
//! let beam = Beam::new("B1", "A", "B").with_diameter(0.2);
//!
//! let geometry = resolve_beam(&beam, &points, &NoSections).unwrap();
//! assert_eq!(geometry.length, 4.0);
//! assert_eq!(geometry.center, DVec3::new(0.0, 2.0, 0.0));
//! ```

pub mod beam;
pub mod shell;

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use glam::{DMat3, DQuat, DVec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Point, StructuralModel};
use crate::sections::SectionProfile;

pub use beam::{resolve_beam, BeamGeometry, CrossSection};
pub use shell::{resolve_shell, ShellGeometry};

/// Lengths below this are treated as zero
pub const LENGTH_TOLERANCE: f64 = 1e-9;

/// Why an element produced no geometry.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum NotResolvable {
    /// A referenced point does not exist
    #[error("point '{point}' not found")]
    MissingPoint { point: String },

    /// Start and end coincide, so the beam has no direction
    #[error("beam has zero length")]
    ZeroLength,

    /// The assigned section cannot be built
    #[error("section '{section}' is invalid: {reason}")]
    InvalidSection { section: String, reason: String },

    /// Not enough resolvable points to form a face
    #[error("only {found} of the shell points resolved, at least 3 are needed")]
    TooFewVertices { found: usize },

    /// The vertices do not span a face
    #[error("could not create face: {reason}")]
    DegenerateFace { reason: String },
}

/// Point name to coordinate lookup.
pub trait PointLookup {
    fn point_position(&self, name: &str) -> Option<DVec3>;
}

/// Section name to profile lookup.
pub trait SectionLookup {
    fn section_profile(&self, name: &str) -> Option<&SectionProfile>;
}

/// A section lookup that never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSections;

impl SectionLookup for NoSections {
    fn section_profile(&self, _name: &str) -> Option<&SectionProfile> {
        None
    }
}

impl<K, H> PointLookup for HashMap<K, DVec3, H>
where
    K: Borrow<str> + Eq + Hash,
    H: BuildHasher,
{
    fn point_position(&self, name: &str) -> Option<DVec3> {
        self.get(name).copied()
    }
}

impl<K, H> PointLookup for HashMap<K, Point, H>
where
    K: Borrow<str> + Eq + Hash,
    H: BuildHasher,
{
    fn point_position(&self, name: &str) -> Option<DVec3> {
        self.get(name).map(Point::position)
    }
}

impl<K> PointLookup for BTreeMap<K, DVec3>
where
    K: Borrow<str> + Ord,
{
    fn point_position(&self, name: &str) -> Option<DVec3> {
        self.get(name).copied()
    }
}

impl<K, V, H> SectionLookup for HashMap<K, V, H>
where
    K: Borrow<str> + Eq + Hash,
    V: Borrow<SectionProfile>,
    H: BuildHasher,
{
    fn section_profile(&self, name: &str) -> Option<&SectionProfile> {
        self.get(name).map(|v| Borrow::<SectionProfile>::borrow(v))
    }
}

impl<K, V> SectionLookup for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: Borrow<SectionProfile>,
{
    fn section_profile(&self, name: &str) -> Option<&SectionProfile> {
        self.get(name).map(|v| Borrow::<SectionProfile>::borrow(v))
    }
}

impl PointLookup for StructuralModel {
    fn point_position(&self, name: &str) -> Option<DVec3> {
        self.point(name).map(Point::position)
    }
}

impl SectionLookup for StructuralModel {
    fn section_profile(&self, name: &str) -> Option<&SectionProfile> {
        self.section(name)
    }
}

/// Rotation that points local +Z along `axis`.
///
/// World +Z is the up reference: local +Y ends up as close to world up as the
/// direction allows, which fixes the roll of the profile around the axis.
/// When `axis` is (anti)parallel to world Z that reference is useless and
/// world +Y is used instead. `axis` must be non-zero.
pub fn track_to(axis: DVec3) -> DQuat {
    let z = axis.normalize();
    let reference = if z.cross(DVec3::Z).length_squared() < 1e-12 {
        DVec3::Y
    } else {
        DVec3::Z
    };
    let x = reference.cross(z).normalize();
    let y = z.cross(x);
    DQuat::from_mat3(&DMat3::from_cols(x, y, z))
}

/// Kind of model element a geometry record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Beam,
    Shell,
}

/// Geometry of one named element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved<T> {
    pub name: String,
    #[serde(flatten)]
    pub geometry: T,
}

/// An element that produced no geometry, and why
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skipped {
    pub name: String,
    pub kind: ElementKind,
    #[serde(flatten)]
    pub reason: NotResolvable,
}

/// Geometry of a whole model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelGeometry {
    pub beams: Vec<Resolved<BeamGeometry>>,
    pub shells: Vec<Resolved<ShellGeometry>>,
    pub skipped: Vec<Skipped>,
}

impl ModelGeometry {
    pub fn beam(&self, name: &str) -> Option<&BeamGeometry> {
        self.beams.iter().find(|b| b.name == name).map(|b| &b.geometry)
    }

    pub fn shell(&self, name: &str) -> Option<&ShellGeometry> {
        self.shells.iter().find(|s| s.name == name).map(|s| &s.geometry)
    }
}

/// Resolve every beam and shell of `model`.
///
/// Elements that cannot be built are listed in [`ModelGeometry::skipped`]
/// and logged; they never stop the rest of the model from resolving.
pub fn resolve_model(model: &StructuralModel) -> ModelGeometry {
    let points: HashMap<&str, DVec3> = model
        .points()
        .iter()
        .map(|p| (p.name.as_str(), p.position()))
        .collect();
    let sections: HashMap<&str, &SectionProfile> = model
        .sections()
        .iter()
        .map(|s| (s.name.as_str(), s))
        .collect();

    let mut geometry = ModelGeometry::default();

    for beam in model.beams() {
        match resolve_beam(beam, &points, &sections) {
            Ok(resolved) => geometry.beams.push(Resolved {
                name: beam.name.clone(),
                geometry: resolved,
            }),
            Err(reason) => {
                tracing::warn!(beam = %beam.name, %reason, "skipping beam geometry");
                geometry.skipped.push(Skipped {
                    name: beam.name.clone(),
                    kind: ElementKind::Beam,
                    reason,
                });
            }
        }
    }

    for shell in model.shells() {
        match resolve_shell(shell, &points) {
            Ok(resolved) => geometry.shells.push(Resolved {
                name: shell.name.clone(),
                geometry: resolved,
            }),
            Err(reason) => {
                tracing::warn!(shell = %shell.name, %reason, "skipping shell geometry");
                geometry.skipped.push(Skipped {
                    name: shell.name.clone(),
                    kind: ElementKind::Shell,
                    reason,
                });
            }
        }
    }

    tracing::debug!(
        beams = geometry.beams.len(),
        shells = geometry.shells.len(),
        skipped = geometry.skipped.len(),
        "resolved model geometry"
    );
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Beam, Shell};

    #[test]
    fn test_track_to_horizontal() {
        let rotation = track_to(DVec3::X);
        assert!((rotation * DVec3::Z).abs_diff_eq(DVec3::X, 1e-12));
        // Profile height direction points up
        assert!((rotation * DVec3::Y).abs_diff_eq(DVec3::Z, 1e-12));
    }

    #[test]
    fn test_track_to_vertical_is_finite() {
        let up = track_to(DVec3::Z);
        assert!(up.is_finite());
        assert!((up * DVec3::Z).abs_diff_eq(DVec3::Z, 1e-12));

        let down = track_to(-DVec3::Z);
        assert!(down.is_finite());
        assert!((down * DVec3::Z).abs_diff_eq(-DVec3::Z, 1e-12));
    }

    #[test]
    fn test_track_to_sloped_keeps_up_positive() {
        let axis = DVec3::new(1.0, 2.0, 3.0).normalize();
        let rotation = track_to(axis);
        assert!((rotation * DVec3::Z).abs_diff_eq(axis, 1e-12));
        assert!((rotation * DVec3::Y).z > 0.0);
        // Profile width direction stays horizontal
        assert!((rotation * DVec3::X).z.abs() < 1e-12);
    }

    #[test]
    fn test_lookup_impls() {
        let by_vec: BTreeMap<String, DVec3> = BTreeMap::from([("A".to_string(), DVec3::ONE)]);
        assert_eq!(by_vec.point_position("A"), Some(DVec3::ONE));
        assert_eq!(by_vec.point_position("B"), None);

        let by_point: HashMap<String, Point> =
            HashMap::from([("P".to_string(), Point::new("P", 1.0, 2.0, 3.0))]);
        assert_eq!(by_point.point_position("P"), Some(DVec3::new(1.0, 2.0, 3.0)));

        let section = SectionProfile::circular("S", 0.3);
        let by_ref: HashMap<&str, &SectionProfile> = HashMap::from([("S", &section)]);
        assert_eq!(by_ref.section_profile("S").unwrap().diameter, 0.3);
        assert!(NoSections.section_profile("S").is_none());
    }

    #[test]
    fn test_resolve_model_skips_and_continues() {
        let mut model = StructuralModel::new();
        model.insert_point("A", 0.0, 0.0, 0.0).unwrap();
        model.insert_point("B", 1.0, 0.0, 0.0).unwrap();
        model.insert_point("C", 1.0, 1.0, 0.0).unwrap();
        model.insert_point("D", 0.0, 0.0, 0.0).unwrap();
        model.insert_beam(Beam::new("good", "A", "B")).unwrap();
        model.insert_beam(Beam::new("zero", "A", "D")).unwrap();
        model.insert_beam(Beam::new("gone", "B", "C")).unwrap();
        model.insert_shell(Shell::new("face", ["A", "B", "C"])).unwrap();
        model.delete_point("C").unwrap();

        let geometry = resolve_model(&model);
        assert_eq!(geometry.beams.len(), 1);
        assert!(geometry.beam("good").is_some());
        assert!(geometry.shell("face").is_none());

        let skipped: Vec<(&str, &NotResolvable)> = geometry
            .skipped
            .iter()
            .map(|s| (s.name.as_str(), &s.reason))
            .collect();
        assert_eq!(
            skipped,
            vec![
                ("zero", &NotResolvable::ZeroLength),
                ("gone", &NotResolvable::MissingPoint { point: "C".to_string() }),
                ("face", &NotResolvable::TooFewVertices { found: 2 }),
            ]
        );
    }

    #[test]
    fn test_skipped_serialization() {
        let skipped = Skipped {
            name: "B1".to_string(),
            kind: ElementKind::Beam,
            reason: NotResolvable::ZeroLength,
        };
        let json = serde_json::to_value(&skipped).unwrap();
        assert_eq!(json["kind"], "beam");
        assert_eq!(json["cause"], "zero_length");
    }
}
