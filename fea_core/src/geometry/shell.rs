//! Shell geometry: an ordered face, optionally extruded into a slab.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::{NotResolvable, PointLookup, LENGTH_TOLERANCE};
use crate::model::Shell;

/// Resolved geometry of one shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellGeometry {
    /// Face vertices in winding order
    pub vertices: Vec<DVec3>,

    /// Unit normal of the face, right-handed with respect to the winding
    pub face_normal: DVec3,

    /// Displacement of the second vertex layer (zero for a flat face)
    pub extrusion_offset: DVec3,
}

impl ShellGeometry {
    pub fn is_extruded(&self) -> bool {
        self.extrusion_offset != DVec3::ZERO
    }

    /// Average of the face vertices
    pub fn centroid(&self) -> DVec3 {
        centroid(&self.vertices)
    }

    /// Area of the face projected onto its normal plane
    pub fn area(&self) -> f64 {
        newell_normal(&self.vertices).length() / 2.0
    }

    /// The second vertex layer, or `None` for a flat face.
    pub fn extruded_vertices(&self) -> Option<Vec<DVec3>> {
        if !self.is_extruded() {
            return None;
        }
        Some(self.vertices.iter().map(|v| *v + self.extrusion_offset).collect())
    }
}

/// Resolve a shell's face from its point names.
///
/// Names missing from `points` are dropped, so a shell with a deleted point
/// shrinks to the remaining vertices. The face is accepted whether or not it
/// is planar or convex; the normal is the best-fit (Newell) normal, or the
/// normal of the first spanning vertex triple when the outline crosses itself
/// and its Newell normal vanishes.
///
/// # Errors
///
/// * `NotResolvable::TooFewVertices` - fewer than 3 names resolve
/// * `NotResolvable::DegenerateFace` - consecutive vertices coincide or all
///   vertices are collinear
pub fn resolve_shell<P>(shell: &Shell, points: &P) -> Result<ShellGeometry, NotResolvable>
where
    P: PointLookup + ?Sized,
{
    let vertices: Vec<DVec3> = shell
        .point_names
        .iter()
        .filter_map(|name| {
            let position = points.point_position(name);
            if position.is_none() {
                tracing::debug!(shell = %shell.name, point = %name, "dropping unresolved shell point");
            }
            position
        })
        .collect();

    if vertices.len() < 3 {
        return Err(NotResolvable::TooFewVertices { found: vertices.len() });
    }

    for (i, vertex) in vertices.iter().enumerate() {
        let next = vertices[(i + 1) % vertices.len()];
        if vertex.distance(next) <= LENGTH_TOLERANCE {
            return Err(NotResolvable::DegenerateFace {
                reason: format!("vertices {} and {} coincide", i, (i + 1) % vertices.len()),
            });
        }
    }

    // A self-intersecting outline (bow-tie) can cancel its Newell normal out
    let face_normal = unit_normal(newell_normal(&vertices))
        .or_else(|| spanning_normal(&vertices))
        .ok_or_else(|| NotResolvable::DegenerateFace {
            reason: "vertices are collinear".to_string(),
        })?;

    let extrusion_offset = if shell.thickness > 0.0 {
        face_normal * shell.thickness
    } else {
        DVec3::ZERO
    };

    Ok(ShellGeometry {
        vertices,
        face_normal,
        extrusion_offset,
    })
}

fn centroid(vertices: &[DVec3]) -> DVec3 {
    if vertices.is_empty() {
        return DVec3::ZERO;
    }
    vertices.iter().copied().sum::<DVec3>() / vertices.len() as f64
}

/// Twice the vector area of the polygon, taken around its centroid.
fn newell_normal(vertices: &[DVec3]) -> DVec3 {
    let center = centroid(vertices);
    vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| (*a - center).cross(*b - center))
        .sum()
}

/// Normal of the first vertex triple, anchored at vertex 0, that spans a plane
fn spanning_normal(vertices: &[DVec3]) -> Option<DVec3> {
    let (origin, rest) = vertices.split_first()?;
    rest.iter().enumerate().find_map(|(i, a)| {
        rest[i + 1..]
            .iter()
            .find_map(|b| unit_normal((*a - *origin).cross(*b - *origin)))
    })
}

fn unit_normal(normal: DVec3) -> Option<DVec3> {
    if normal.length() > LENGTH_TOLERANCE {
        normal.try_normalize()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn points() -> HashMap<String, DVec3> {
        HashMap::from([
            ("P1".to_string(), DVec3::new(0.0, 0.0, 0.0)),
            ("P2".to_string(), DVec3::new(1.0, 0.0, 0.0)),
            ("P3".to_string(), DVec3::new(1.0, 1.0, 0.0)),
            ("P4".to_string(), DVec3::new(0.0, 1.0, 0.0)),
            ("P5".to_string(), DVec3::new(2.0, 0.0, 0.0)),
            ("Q".to_string(), DVec3::new(0.5, 0.5, 1.0)),
            ("P1b".to_string(), DVec3::new(0.0, 0.0, 0.0)),
        ])
    }

    #[test]
    fn test_triangle_flat() {
        let shell = Shell::new("S1", ["P1", "P2", "P3"]).with_thickness(0.0);
        let geometry = resolve_shell(&shell, &points()).unwrap();

        assert_eq!(
            geometry.vertices,
            vec![DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0), DVec3::new(1.0, 1.0, 0.0)]
        );
        assert_eq!(geometry.extrusion_offset, DVec3::ZERO);
        assert!(!geometry.is_extruded());
        assert!(geometry.extruded_vertices().is_none());
        assert!(geometry.face_normal.abs_diff_eq(DVec3::Z, 1e-12));
        assert_relative_eq!(geometry.area(), 0.5, max_relative = 1e-12);
    }

    #[test]
    fn test_quad_extruded() {
        let shell = Shell::new("S1", ["P1", "P2", "P3", "P4"]).with_thickness(0.1);
        let geometry = resolve_shell(&shell, &points()).unwrap();

        assert_eq!(geometry.vertices.len(), 4);
        assert_relative_eq!(geometry.extrusion_offset.length(), 0.1, max_relative = 1e-12);
        assert!(geometry
            .extrusion_offset
            .normalize()
            .abs_diff_eq(geometry.face_normal, 1e-12));

        let top = geometry.extruded_vertices().unwrap();
        assert_eq!(top.len(), 4);
        assert_relative_eq!(top[2].z, 0.1, max_relative = 1e-12);
        assert_relative_eq!(geometry.area(), 1.0, max_relative = 1e-12);
        assert!(geometry.centroid().abs_diff_eq(DVec3::new(0.5, 0.5, 0.0), 1e-12));
    }

    #[test]
    fn test_winding_flips_normal() {
        let shell = Shell::new("S1", ["P3", "P2", "P1"]);
        let geometry = resolve_shell(&shell, &points()).unwrap();
        assert!(geometry.face_normal.abs_diff_eq(-DVec3::Z, 1e-12));
    }

    #[test]
    fn test_unresolved_names_are_dropped() {
        let shell = Shell::new("S1", ["P1", "gone", "P2", "P3"]);
        let geometry = resolve_shell(&shell, &points()).unwrap();
        assert_eq!(geometry.vertices.len(), 3);

        let short = Shell::new("S2", ["P1", "gone", "P2"]);
        assert_eq!(
            resolve_shell(&short, &points()).unwrap_err(),
            NotResolvable::TooFewVertices { found: 2 }
        );
    }

    #[test]
    fn test_degenerate_faces() {
        let duplicate = Shell::new("S1", ["P1", "P1b", "P2"]);
        assert!(matches!(
            resolve_shell(&duplicate, &points()).unwrap_err(),
            NotResolvable::DegenerateFace { .. }
        ));

        let collinear = Shell::new("S2", ["P1", "P2", "P5"]);
        assert!(matches!(
            resolve_shell(&collinear, &points()).unwrap_err(),
            NotResolvable::DegenerateFace { .. }
        ));
    }

    #[test]
    fn test_bow_tie_is_accepted() {
        let points = HashMap::from([
            ("A".to_string(), DVec3::new(0.0, 0.0, 0.0)),
            ("B".to_string(), DVec3::new(1.0, 1.0, 0.0)),
            ("C".to_string(), DVec3::new(1.0, 0.0, 0.0)),
            ("D".to_string(), DVec3::new(0.0, 1.0, 0.0)),
        ]);
        let shell = Shell::new("S", ["A", "B", "C", "D"]).with_thickness(0.1);
        let geometry = resolve_shell(&shell, &points).unwrap();

        assert_eq!(geometry.vertices.len(), 4);
        // The crossing halves cancel, so the normal comes from A, B, C
        assert!(geometry.face_normal.abs_diff_eq(-DVec3::Z, 1e-12));
        assert_relative_eq!(geometry.extrusion_offset.length(), 0.1, max_relative = 1e-12);
    }

    #[test]
    fn test_non_planar_is_accepted() {
        let shell = Shell::new("S1", ["P1", "P2", "Q", "P4"]).with_thickness(0.2);
        let geometry = resolve_shell(&shell, &points()).unwrap();
        assert_eq!(geometry.vertices.len(), 4);
        assert_relative_eq!(geometry.face_normal.length(), 1.0, max_relative = 1e-12);
        assert_relative_eq!(geometry.extrusion_offset.length(), 0.2, max_relative = 1e-12);
    }
}
