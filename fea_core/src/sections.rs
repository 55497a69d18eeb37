//! Cross-section profiles assignable to beams.
//!
//! A profile stores every dimension field regardless of its kind, mirroring
//! how sections are edited: switching a profile from circular to rectangular
//! keeps the previously typed width and height. Only the fields relevant to
//! [`SectionProfile::kind`] are read when a beam is resolved.

use serde::{Deserialize, Serialize};

use crate::errors::{FeaError, FeaResult};

/// Allowed side counts for polygonal profiles
pub const POLYGON_SIDES: std::ops::RangeInclusive<u32> = 3..=12;

/// Side count used to approximate circular profiles
pub const CIRCLE_SIDES: u32 = 8;

/// Shape family of a cross-section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionKind {
    /// Solid round section, approximated with 8 sides
    #[default]
    Circular,
    /// Width x height rectangle
    Rectangular,
    /// Regular polygon with 3-12 sides
    Polygonal,
}

impl SectionKind {
    pub const ALL: [SectionKind; 3] = [
        SectionKind::Circular,
        SectionKind::Rectangular,
        SectionKind::Polygonal,
    ];

    /// Name used in model files ("CIRCULAR", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Circular => "CIRCULAR",
            SectionKind::Rectangular => "RECTANGULAR",
            SectionKind::Polygonal => "POLYGONAL",
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named cross-section profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionProfile {
    /// Unique name within the model
    pub name: String,

    /// Shape family
    pub kind: SectionKind,

    /// Diameter of a circular section
    pub diameter: f64,

    /// Width of a rectangular section
    pub width: f64,

    /// Height of a rectangular section
    pub height: f64,

    /// Circumscribed diameter of a polygonal section
    pub poly_diameter: f64,

    /// Side count of a polygonal section
    pub sides: u32,
}

impl SectionProfile {
    /// Create a profile with the default dimensions of a new section.
    pub fn new(name: impl Into<String>) -> Self {
        SectionProfile {
            name: name.into(),
            kind: SectionKind::Circular,
            diameter: 0.1,
            width: 0.1,
            height: 0.15,
            poly_diameter: 0.1,
            sides: 6,
        }
    }

    pub fn circular(name: impl Into<String>, diameter: f64) -> Self {
        SectionProfile {
            kind: SectionKind::Circular,
            diameter,
            ..SectionProfile::new(name)
        }
    }

    pub fn rectangular(name: impl Into<String>, width: f64, height: f64) -> Self {
        SectionProfile {
            kind: SectionKind::Rectangular,
            width,
            height,
            ..SectionProfile::new(name)
        }
    }

    pub fn polygonal(name: impl Into<String>, poly_diameter: f64, sides: u32) -> Self {
        SectionProfile {
            kind: SectionKind::Polygonal,
            poly_diameter,
            sides,
            ..SectionProfile::new(name)
        }
    }

    /// Validate the fields relevant to this profile's kind.
    pub fn validate(&self) -> FeaResult<()> {
        if self.name.trim().is_empty() {
            return Err(FeaError::invalid_input("name", "", "Section name cannot be empty"));
        }
        match self.kind {
            SectionKind::Circular => positive("diameter", self.diameter),
            SectionKind::Rectangular => {
                positive("width", self.width)?;
                positive("height", self.height)
            }
            SectionKind::Polygonal => {
                positive("poly_diameter", self.poly_diameter)?;
                if !POLYGON_SIDES.contains(&self.sides) {
                    return Err(FeaError::invalid_input(
                        "sides",
                        self.sides.to_string(),
                        "Polygonal sections need 3 to 12 sides",
                    ));
                }
                Ok(())
            }
        }
    }
}

fn positive(field: &str, value: f64) -> FeaResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FeaError::invalid_input(field, value.to_string(), "Dimension must be positive"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_section_defaults() {
        let section = SectionProfile::new("Section_1");
        assert_eq!(section.kind, SectionKind::Circular);
        assert_eq!(section.diameter, 0.1);
        assert_eq!(section.width, 0.1);
        assert_eq!(section.height, 0.15);
        assert_eq!(section.sides, 6);
        assert!(section.validate().is_ok());
    }

    #[test]
    fn test_polygon_sides_range() {
        assert!(SectionProfile::polygonal("P3", 0.2, 3).validate().is_ok());
        assert!(SectionProfile::polygonal("P12", 0.2, 12).validate().is_ok());
        assert!(SectionProfile::polygonal("P2", 0.2, 2).validate().is_err());
        assert!(SectionProfile::polygonal("P13", 0.2, 13).validate().is_err());
    }

    #[test]
    fn test_only_relevant_fields_validated() {
        // A rectangular profile does not care about a zero diameter
        let mut section = SectionProfile::rectangular("R", 0.2, 0.3);
        section.diameter = 0.0;
        assert!(section.validate().is_ok());

        section.height = -1.0;
        assert!(section.validate().is_err());
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&SectionKind::Rectangular).unwrap();
        assert_eq!(json, "\"RECTANGULAR\"");
        let kind: SectionKind = serde_json::from_str("\"POLYGONAL\"").unwrap();
        assert_eq!(kind, SectionKind::Polygonal);
        assert_eq!(SectionKind::Circular.to_string(), "CIRCULAR");
    }
}
