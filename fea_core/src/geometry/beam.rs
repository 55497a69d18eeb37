//! Beam geometry: placement, orientation and cross-section of the solid
//! between two points.
//!
//! The beam solid is described in a local frame centered on the beam's
//! midpoint, with local +Z running from start to end and the cross-section in
//! the local XY plane (width along X, height along Y).
//! [`BeamGeometry::orientation`] maps that frame into world space.

use std::f64::consts::TAU;

use glam::{DQuat, DVec2, DVec3};
use serde::{Deserialize, Serialize};

use super::{track_to, NotResolvable, PointLookup, SectionLookup, LENGTH_TOLERANCE};
use crate::model::Beam;
use crate::sections::{SectionKind, SectionProfile, CIRCLE_SIDES, POLYGON_SIDES};

/// Cross-section shape and size of a resolved beam.
///
/// Round and polygonal sections use `width == height == diameter`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    pub kind: SectionKind,
    pub width: f64,
    pub height: f64,
    pub sides: u32,
}

impl CrossSection {
    /// Round section approximated with 8 sides
    pub fn circular(diameter: f64) -> Self {
        CrossSection {
            kind: SectionKind::Circular,
            width: diameter,
            height: diameter,
            sides: CIRCLE_SIDES,
        }
    }

    pub fn rectangular(width: f64, height: f64) -> Self {
        CrossSection {
            kind: SectionKind::Rectangular,
            width,
            height,
            sides: 4,
        }
    }

    pub fn polygonal(diameter: f64, sides: u32) -> Self {
        CrossSection {
            kind: SectionKind::Polygonal,
            width: diameter,
            height: diameter,
            sides,
        }
    }

    /// Build the cross-section a profile describes.
    pub fn from_profile(profile: &SectionProfile) -> Result<Self, NotResolvable> {
        match profile.kind {
            SectionKind::Circular => Ok(CrossSection::circular(profile.diameter)),
            SectionKind::Rectangular => Ok(CrossSection::rectangular(profile.width, profile.height)),
            SectionKind::Polygonal => {
                if !POLYGON_SIDES.contains(&profile.sides) {
                    return Err(NotResolvable::InvalidSection {
                        section: profile.name.clone(),
                        reason: format!("{} sides, expected 3 to 12", profile.sides),
                    });
                }
                Ok(CrossSection::polygonal(profile.poly_diameter, profile.sides))
            }
        }
    }

    /// Profile outline in the local XY plane, counter-clockwise.
    ///
    /// Round and polygonal outlines are inscribed in a circle of the section
    /// diameter, with the first vertex on +X.
    pub fn outline(&self) -> Vec<DVec2> {
        match self.kind {
            SectionKind::Rectangular => {
                let (hw, hh) = (self.width / 2.0, self.height / 2.0);
                vec![
                    DVec2::new(-hw, -hh),
                    DVec2::new(hw, -hh),
                    DVec2::new(hw, hh),
                    DVec2::new(-hw, hh),
                ]
            }
            SectionKind::Circular | SectionKind::Polygonal => {
                let radius = self.width / 2.0;
                (0..self.sides)
                    .map(|i| {
                        let angle = TAU * f64::from(i) / f64::from(self.sides);
                        DVec2::new(radius * angle.cos(), radius * angle.sin())
                    })
                    .collect()
            }
        }
    }

    /// Area enclosed by [`CrossSection::outline`]
    pub fn area(&self) -> f64 {
        match self.kind {
            SectionKind::Rectangular => self.width * self.height,
            SectionKind::Circular | SectionKind::Polygonal => {
                let n = f64::from(self.sides);
                let radius = self.width / 2.0;
                0.5 * n * radius * radius * (TAU / n).sin()
            }
        }
    }
}

/// Resolved geometry of one beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamGeometry {
    pub start: DVec3,
    pub end: DVec3,

    /// Midpoint between start and end
    pub center: DVec3,

    /// Distance from start to end
    pub length: f64,

    /// Unit vector from start to end
    pub axis: DVec3,

    /// Rotation from the local beam frame to world space
    pub orientation: DQuat,

    pub cross_section: CrossSection,
}

impl BeamGeometry {
    /// Map a point from the local beam frame to world space.
    pub fn to_world(&self, local: DVec3) -> DVec3 {
        self.center + self.orientation * local
    }

    /// Cross-section outline placed at the start (`at_end == false`) or end of the beam.
    pub fn outline_at(&self, at_end: bool) -> Vec<DVec3> {
        let z = if at_end { self.length / 2.0 } else { -self.length / 2.0 };
        self.cross_section
            .outline()
            .into_iter()
            .map(|p| self.to_world(p.extend(z)))
            .collect()
    }
}

/// Resolve a beam's geometry from its endpoints and section.
///
/// The section comes from `beam.section_name` when it names a profile in
/// `sections`; otherwise (unassigned or dangling) the beam is drawn round
/// with its own `diameter`.
///
/// # Errors
///
/// * `NotResolvable::MissingPoint` - an endpoint is not in `points`
/// * `NotResolvable::ZeroLength` - the endpoints coincide
/// * `NotResolvable::InvalidSection` - the profile has an unusable side count
pub fn resolve_beam<P, S>(beam: &Beam, points: &P, sections: &S) -> Result<BeamGeometry, NotResolvable>
where
    P: PointLookup + ?Sized,
    S: SectionLookup + ?Sized,
{
    let start = lookup(points, &beam.start_point)?;
    let end = lookup(points, &beam.end_point)?;

    let delta = end - start;
    let length = delta.length();
    // Negated so a NaN length is rejected too
    if !(length > LENGTH_TOLERANCE) {
        return Err(NotResolvable::ZeroLength);
    }
    let axis = delta / length;

    let cross_section = match beam.assigned_section() {
        Some(name) => match sections.section_profile(name) {
            Some(profile) => CrossSection::from_profile(profile)?,
            None => {
                tracing::debug!(beam = %beam.name, section = name, "section not found, using beam diameter");
                CrossSection::circular(beam.diameter)
            }
        },
        None => CrossSection::circular(beam.diameter),
    };

    Ok(BeamGeometry {
        start,
        end,
        center: (start + end) / 2.0,
        length,
        axis,
        orientation: track_to(axis),
        cross_section,
    })
}

fn lookup<P: PointLookup + ?Sized>(points: &P, name: &str) -> Result<DVec3, NotResolvable> {
    points
        .point_position(name)
        .ok_or_else(|| NotResolvable::MissingPoint { point: name.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::NoSections;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn points() -> HashMap<String, DVec3> {
        HashMap::from([
            ("A".to_string(), DVec3::ZERO),
            ("B".to_string(), DVec3::new(3.0, 4.0, 0.0)),
            ("C".to_string(), DVec3::new(0.0, 0.0, 2.5)),
            ("A2".to_string(), DVec3::ZERO),
        ])
    }

    fn sections() -> HashMap<String, SectionProfile> {
        [
            SectionProfile::circular("round", 0.3),
            SectionProfile::rectangular("rect", 0.2, 0.4),
            SectionProfile::polygonal("hex", 0.25, 6),
            SectionProfile::polygonal("bad", 0.25, 40),
        ]
        .into_iter()
        .map(|s| (s.name.clone(), s))
        .collect()
    }

    #[test]
    fn test_basic_placement() {
        let beam = Beam::new("B1", "A", "B");
        let geometry = resolve_beam(&beam, &points(), &NoSections).unwrap();
        assert_eq!(geometry.length, 5.0);
        assert_eq!(geometry.center, DVec3::new(1.5, 2.0, 0.0));
        assert!(geometry.axis.abs_diff_eq(DVec3::new(0.6, 0.8, 0.0), 1e-12));
        assert!((geometry.orientation * DVec3::Z).abs_diff_eq(geometry.axis, 1e-12));
    }

    #[test]
    fn test_fallback_uses_beam_diameter() {
        let beam = Beam::new("B1", "A", "B").with_diameter(0.2);
        let geometry = resolve_beam(&beam, &points(), &NoSections).unwrap();
        assert_eq!(geometry.cross_section, CrossSection::circular(0.2));
        assert_eq!(geometry.cross_section.kind, SectionKind::Circular);
        assert_eq!(geometry.cross_section.sides, 8);
        assert_eq!(geometry.cross_section.width, 0.2);
        assert_eq!(geometry.cross_section.height, 0.2);
    }

    #[test]
    fn test_zero_length_is_not_resolvable() {
        let beam = Beam::new("B1", "A", "A2");
        assert_eq!(
            resolve_beam(&beam, &points(), &NoSections).unwrap_err(),
            NotResolvable::ZeroLength
        );
        let same = Beam::new("B2", "B", "B");
        assert_eq!(
            resolve_beam(&same, &points(), &NoSections).unwrap_err(),
            NotResolvable::ZeroLength
        );
    }

    #[test]
    fn test_missing_point() {
        let beam = Beam::new("B1", "A", "Z");
        assert_eq!(
            resolve_beam(&beam, &points(), &NoSections).unwrap_err(),
            NotResolvable::MissingPoint { point: "Z".to_string() }
        );
    }

    #[test]
    fn test_section_kinds() {
        let (points, sections) = (points(), sections());

        let round = resolve_beam(&Beam::new("B", "A", "C").with_section("round"), &points, &sections).unwrap();
        assert_eq!(round.cross_section, CrossSection::circular(0.3));

        let rect = resolve_beam(&Beam::new("B", "A", "C").with_section("rect"), &points, &sections).unwrap();
        assert_eq!(rect.cross_section.kind, SectionKind::Rectangular);
        assert_eq!((rect.cross_section.width, rect.cross_section.height), (0.2, 0.4));
        assert_eq!(rect.cross_section.sides, 4);

        let hex = resolve_beam(&Beam::new("B", "A", "C").with_section("hex"), &points, &sections).unwrap();
        assert_eq!(hex.cross_section, CrossSection::polygonal(0.25, 6));
    }

    #[test]
    fn test_section_overrides_diameter() {
        let beam = Beam::new("B", "A", "B").with_section("rect").with_diameter(0.9);
        let geometry = resolve_beam(&beam, &points(), &sections()).unwrap();
        assert_eq!(geometry.cross_section, CrossSection::rectangular(0.2, 0.4));
    }

    #[test]
    fn test_dangling_section_falls_back() {
        let beam = Beam::new("B", "A", "B").with_section("gone").with_diameter(0.15);
        let geometry = resolve_beam(&beam, &points(), &sections()).unwrap();
        assert_eq!(geometry.cross_section, CrossSection::circular(0.15));
    }

    #[test]
    fn test_invalid_polygon_section() {
        let beam = Beam::new("B", "A", "B").with_section("bad");
        let err = resolve_beam(&beam, &points(), &sections()).unwrap_err();
        assert!(matches!(err, NotResolvable::InvalidSection { ref section, .. } if section == "bad"));
    }

    #[test]
    fn test_outline_shapes() {
        let rect = CrossSection::rectangular(0.2, 0.4).outline();
        assert_eq!(rect.len(), 4);
        assert_eq!(rect[2], DVec2::new(0.1, 0.2));

        let round = CrossSection::circular(1.0).outline();
        assert_eq!(round.len(), 8);
        for vertex in &round {
            assert_relative_eq!(vertex.length(), 0.5, max_relative = 1e-12);
        }
        assert_eq!(round[0], DVec2::new(0.5, 0.0));
    }

    #[test]
    fn test_cross_section_area() {
        assert_relative_eq!(CrossSection::rectangular(0.2, 0.4).area(), 0.08, max_relative = 1e-12);
        // A regular hexagon of circumradius r has area 3*sqrt(3)/2 * r^2
        let r: f64 = 0.5;
        assert_relative_eq!(
            CrossSection::polygonal(1.0, 6).area(),
            1.5 * 3f64.sqrt() * r * r,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_outline_at_ends() {
        let beam = Beam::new("B", "A", "C").with_section("rect");
        let geometry = resolve_beam(&beam, &points(), &sections()).unwrap();

        let start = geometry.outline_at(false);
        let end = geometry.outline_at(true);
        assert_eq!(start.len(), 4);
        for (s, e) in start.iter().zip(&end) {
            assert_relative_eq!(s.z, 0.0, epsilon = 1e-12);
            assert_relative_eq!(e.z, 2.5, epsilon = 1e-12);
        }
        assert!(geometry.to_world(DVec3::ZERO).abs_diff_eq(geometry.center, 1e-12));
    }
}
