//! # fea_core - Structural Model Core
//!
//! `fea_core` holds the non-graphical half of a structural modelling tool:
//! named points joined by beams and bounded by shells, cross-section
//! profiles, a table-driven unit converter and the rules that turn this
//! topology into concrete geometry for a mesh layer. Every type is
//! JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Explicit lookups**: geometry is a pure function of an element and the
//!   point/section maps passed in, never of global state
//! - **Recoverable geometry**: an element that cannot be built is skipped and
//!   reported, it never aborts a batch
//! - **Rich Errors**: structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use fea_core::geometry::resolve_model;
//! use fea_core::model::{Beam, StructuralModel};
//! use fea_core::units::{convert, UnitTable};
//!
//! let mut model = StructuralModel::new();
//! model.insert_point("A", 0.0, 0.0, 0.0)?;
//! model.insert_point("B", 0.0, 0.0, 3.0)?;
//! model.insert_beam(Beam::new("Column", "A", "B").with_diameter(0.2))?;
//!
//! let geometry = resolve_model(&model);
//! assert_eq!(geometry.beam("Column").map(|b| b.length), Some(3.0));
//!
//! let newtons = convert(1.0, "kN", "N", UnitTable::builtin())?;
//! assert_eq!(newtons, 1000.0);
//! # Ok::<(), fea_core::errors::FeaError>(())
//! ```
//!
//! ## Modules
//!
//! - [`model`] - Points, beams, shells and the model container
//! - [`sections`] - Cross-section profiles
//! - [`geometry`] - Beam and shell geometry resolution
//! - [`units`] - Unit table and conversion
//! - [`coloring`] - Display colors per section
//! - [`file_io`] - JSON import/export with atomic saves
//! - [`errors`] - Structured error types

pub mod coloring;
pub mod errors;
pub mod file_io;
pub mod geometry;
pub mod model;
pub mod sections;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use errors::{FeaError, FeaResult};
pub use file_io::{export_model, import_model, ImportReport};
pub use geometry::{resolve_beam, resolve_model, resolve_shell, BeamGeometry, NotResolvable, ShellGeometry};
pub use model::{Beam, Point, Shell, StructuralModel};
pub use sections::{SectionKind, SectionProfile};
pub use units::{convert, UnitTable};
