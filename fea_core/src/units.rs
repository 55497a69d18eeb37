//! # Unit Conversion
//!
//! Table-driven conversion between named physical units. Every unit belongs
//! to a quantity type ("length", "force", "temperature", ...) and converts
//! through the canonical unit of that quantity (the one with `scale = 1` and
//! no offset).
//!
//! ## Scale Convention
//!
//! The meaning of `scale` depends on whether the unit has an offset:
//!
//! - **Plain units** (no offset): `scale` is how many of this unit make one
//!   canonical unit. Going to canonical divides by it, coming back multiplies.
//!   `cm` has scale 100, `kN` has scale 0.001.
//! - **Offset units** (temperature scales): `offset` is added first, then the
//!   sum is multiplied by `scale` to reach canonical. `C` is
//!   `(value + 273.15) * 1.0` kelvin, `F` is `(value + 459.67) * 5/9` kelvin.
//!   Coming back divides by the scale and then subtracts the offset, which is
//!   the exact inverse for every offset unit (not only those with scale 1).
//!
//! ## Example
//!
//! ```rust
//! use fea_core::units::{convert, UnitTable};
//!
//! let table = UnitTable::builtin();
//! assert_eq!(convert(1.0, "kN", "N", table).unwrap(), 1000.0);
//! assert_eq!(convert(100.0, "C", "K", table).unwrap(), 373.15);
//! assert!(convert(1.0, "m", "kg", table).is_err());
//! ```

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{FeaError, FeaResult};

/// Quantity type names used by the built-in table
pub mod quantity {
    pub const TIME: &str = "time";
    pub const LENGTH: &str = "length";
    pub const VELOCITY: &str = "velocity";
    pub const ACCELERATION: &str = "acceleration";
    pub const MASS: &str = "mass";
    pub const FORCE: &str = "force";
    pub const LINE_LOAD: &str = "line load";
    pub const MOMENT: &str = "moment";
    pub const PRESSURE: &str = "pressure";
    pub const DENSITY: &str = "density";
    pub const MASS_DENSITY: &str = "mass density";
    pub const AREA: &str = "area";
    pub const VOLUME: &str = "volume";
    pub const ANGLE: &str = "angle";
    pub const ANGULAR_VELOCITY: &str = "angular velocity";
    pub const TEMPERATURE: &str = "temperature";
}

/// A named unit and its relation to the canonical unit of its quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique key, e.g. "kN"
    pub symbol: String,

    /// Human-readable name, e.g. "kilonewtons"
    #[serde(default)]
    pub name: String,

    /// Physical quantity this unit measures
    pub quantity_type: String,

    /// Scale factor, see the module docs for its direction
    pub scale: f64,

    /// Additive offset for affine scales (temperature), zero otherwise
    #[serde(default, skip_serializing_if = "is_zero")]
    pub offset: f64,
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

impl Unit {
    /// Create a plain (linear) unit
    pub fn plain(symbol: &str, name: &str, quantity_type: &str, scale: f64) -> Self {
        Unit {
            symbol: symbol.to_string(),
            name: name.to_string(),
            quantity_type: quantity_type.to_string(),
            scale,
            offset: 0.0,
        }
    }

    /// Create an affine unit with an offset applied before scaling
    pub fn with_offset(symbol: &str, name: &str, quantity_type: &str, scale: f64, offset: f64) -> Self {
        Unit {
            offset,
            ..Unit::plain(symbol, name, quantity_type, scale)
        }
    }

    /// True if this unit uses the affine (offset) conversion path
    pub fn has_offset(&self) -> bool {
        self.offset != 0.0
    }

    /// True if this is the reference unit of its quantity
    pub fn is_canonical(&self) -> bool {
        self.scale == 1.0 && !self.has_offset()
    }

    fn to_canonical(&self, value: f64) -> f64 {
        if self.has_offset() {
            (value + self.offset) * self.scale
        } else {
            value / self.scale
        }
    }

    /// Exact inverse of `to_canonical`. For offset units with scale 1
    /// (°C) this is the same as `(canonical - offset) / scale`; for other
    /// scales (°F) only this form round-trips.
    fn from_canonical(&self, canonical: f64) -> f64 {
        if self.has_offset() {
            canonical / self.scale - self.offset
        } else {
            canonical * self.scale
        }
    }
}

/// A lookup table of units keyed by symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitTable {
    units: HashMap<String, Unit>,
}

static BUILTIN_UNITS: Lazy<UnitTable> = Lazy::new(|| builtin_units().into_iter().collect());

impl UnitTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table, built once on first use
    pub fn builtin() -> &'static UnitTable {
        &BUILTIN_UNITS
    }

    /// Parse a table from a JSON array of units and validate it.
    ///
    /// ```rust
    /// use fea_core::units::UnitTable;
    ///
    /// let table = UnitTable::from_json(r#"[
    ///     {"symbol": "m", "quantity_type": "length", "scale": 1.0},
    ///     {"symbol": "mm", "quantity_type": "length", "scale": 1000.0}
    /// ]"#).unwrap();
    /// assert_eq!(table.convert(1500.0, "mm", "m").unwrap(), 1.5);
    /// ```
    pub fn from_json(json: &str) -> FeaResult<Self> {
        let units: Vec<Unit> = serde_json::from_str(json)?;
        let table: UnitTable = units.into_iter().collect();
        table.validate()?;
        Ok(table)
    }

    /// Load a table from a JSON file
    pub fn load(path: &Path) -> FeaResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| FeaError::file_error("read", path.display().to_string(), e.to_string()))?;
        Self::from_json(&contents)
    }

    /// Add or replace a unit, returning the previous entry for the symbol
    pub fn insert(&mut self, unit: Unit) -> Option<Unit> {
        self.units.insert(unit.symbol.clone(), unit)
    }

    pub fn get(&self, symbol: &str) -> Option<&Unit> {
        self.units.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.units.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// All quantity types present, sorted
    pub fn quantity_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.units.values().map(|u| u.quantity_type.as_str()).collect();
        types.sort_unstable();
        types.dedup();
        types
    }

    /// Units measuring `quantity`, sorted by symbol
    pub fn units_of(&self, quantity: &str) -> Vec<&Unit> {
        let mut units: Vec<&Unit> = self
            .units
            .values()
            .filter(|u| u.quantity_type == quantity)
            .collect();
        units.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        units
    }

    /// The canonical (scale 1, no offset) unit of `quantity`
    pub fn canonical_unit(&self, quantity: &str) -> Option<&Unit> {
        self.units_of(quantity).into_iter().find(|u| u.is_canonical())
    }

    /// Check that scales are usable and every quantity has exactly one canonical unit.
    pub fn validate(&self) -> FeaResult<()> {
        for unit in self.units.values() {
            if !unit.scale.is_finite() || unit.scale == 0.0 {
                return Err(FeaError::invalid_input(
                    format!("{}.scale", unit.symbol),
                    unit.scale.to_string(),
                    "Scale must be finite and non-zero",
                ));
            }
            if !unit.offset.is_finite() {
                return Err(FeaError::invalid_input(
                    format!("{}.offset", unit.symbol),
                    unit.offset.to_string(),
                    "Offset must be finite",
                ));
            }
        }

        for quantity in self.quantity_types() {
            let canonical: Vec<&str> = self
                .units_of(quantity)
                .into_iter()
                .filter(|u| u.is_canonical())
                .map(|u| u.symbol.as_str())
                .collect();
            if canonical.len() != 1 {
                return Err(FeaError::invalid_input(
                    quantity,
                    format!("[{}]", canonical.join(", ")),
                    "Each quantity type needs exactly one unit with scale 1 and no offset",
                ));
            }
        }
        Ok(())
    }

    /// Convert `value` between two units of this table. See [`convert`].
    pub fn convert(&self, value: f64, from_unit: &str, to_unit: &str) -> FeaResult<f64> {
        convert(value, from_unit, to_unit, self)
    }
}

impl FromIterator<Unit> for UnitTable {
    fn from_iter<I: IntoIterator<Item = Unit>>(iter: I) -> Self {
        let mut table = UnitTable::new();
        for unit in iter {
            table.insert(unit);
        }
        table
    }
}

/// Convert `value` from `from_unit` to `to_unit`.
///
/// Converting a unit to itself returns `value` untouched without consulting
/// the table, so even an unknown symbol converts to itself.
///
/// # Errors
///
/// * `FeaError::UnknownUnit` - one or both symbols are missing from `table`
/// * `FeaError::IncompatibleUnits` - the units measure different quantities
pub fn convert(value: f64, from_unit: &str, to_unit: &str, table: &UnitTable) -> FeaResult<f64> {
    if from_unit == to_unit {
        return Ok(value);
    }

    let (from, to) = match (table.get(from_unit), table.get(to_unit)) {
        (Some(from), Some(to)) => (from, to),
        (None, None) => return Err(FeaError::unknown_unit([from_unit, to_unit])),
        (None, Some(_)) => return Err(FeaError::unknown_unit([from_unit])),
        (Some(_), None) => return Err(FeaError::unknown_unit([to_unit])),
    };

    if from.quantity_type != to.quantity_type {
        return Err(FeaError::IncompatibleUnits {
            from: from_unit.to_string(),
            to: to_unit.to_string(),
            from_quantity: from.quantity_type.clone(),
            to_quantity: to.quantity_type.clone(),
        });
    }

    Ok(to.from_canonical(from.to_canonical(value)))
}

/// Default display unit of a quantity type for new models
pub fn default_unit(quantity_type: &str) -> Option<&'static str> {
    let symbol = match quantity_type {
        quantity::TIME => "s",
        quantity::LENGTH => "m",
        quantity::MASS => "kg",
        quantity::FORCE => "N",
        quantity::MOMENT => "Nm",
        quantity::PRESSURE => "Pa",
        quantity::TEMPERATURE => "K",
        quantity::VELOCITY => "m/s",
        quantity::ACCELERATION => "m/s2",
        quantity::ANGLE => "rad",
        _ => return None,
    };
    Some(symbol)
}

fn builtin_units() -> Vec<Unit> {
    use quantity::*;

    vec![
        // Time
        Unit::plain("s", "seconds", TIME, 1.0),
        Unit::plain("min", "minutes", TIME, 1.0 / 60.0),
        Unit::plain("hour", "hours", TIME, 1.0 / 3600.0),
        // Length
        Unit::plain("m", "metres", LENGTH, 1.0),
        Unit::plain("mm", "millimetres", LENGTH, 1000.0),
        Unit::plain("cm", "centimetres", LENGTH, 100.0),
        Unit::plain("km", "kilometres", LENGTH, 1.0 / 1000.0),
        Unit::plain("in", "inches", LENGTH, 1.0 / 0.0254),
        Unit::plain("ft", "feet", LENGTH, 1.0 / 0.3048),
        // Velocity
        Unit::plain("m/s", "metres per second", VELOCITY, 1.0),
        Unit::plain("kph", "kilometres per hour", VELOCITY, 3.6),
        Unit::plain("in/s", "inches per second", VELOCITY, 1.0 / 0.0254),
        Unit::plain("ft/s", "feet per second", VELOCITY, 1.0 / 0.3048),
        // Acceleration
        Unit::plain("m/s2", "metres per second squared", ACCELERATION, 1.0),
        Unit::plain("gn", "standard gravity", ACCELERATION, 1.0 / 9.80665),
        Unit::plain("gal", "centimetres per second squared", ACCELERATION, 100.0),
        Unit::plain("in/s2", "inches per second squared", ACCELERATION, 1.0 / 0.0254),
        Unit::plain("ft/s2", "feet per second squared", ACCELERATION, 1.0 / 0.3048),
        // Mass
        Unit::plain("kg", "kilograms", MASS, 1.0),
        Unit::plain("g", "grams", MASS, 1000.0),
        Unit::plain("t", "tonnes", MASS, 1.0 / 1000.0),
        Unit::plain("tonne", "tonnes", MASS, 1.0 / 1000.0),
        Unit::plain("lb", "pounds", MASS, 1.0 / 0.45359237),
        Unit::plain("lbm", "pounds mass", MASS, 1.0 / 0.45359237),
        Unit::plain("ton", "short tons", MASS, 1.0 / 907.18474),
        // Force
        Unit::plain("N", "newtons", FORCE, 1.0),
        Unit::plain("kN", "kilonewtons", FORCE, 1.0 / 1000.0),
        Unit::plain("MN", "meganewtons", FORCE, 1.0 / 1_000_000.0),
        Unit::plain("kgf", "kilograms-force", FORCE, 1.0 / 9.80665),
        Unit::plain("lbf", "pounds-force", FORCE, 1.0 / 4.4482216152605),
        Unit::plain("kipf", "kilopounds-force", FORCE, 1.0 / 4448.2216152605),
        Unit::plain("tonf", "short tons-force", FORCE, 1.0 / 8896.443230521),
        Unit::plain("dyn", "dynes", FORCE, 100_000.0),
        // Line load
        Unit::plain("N/m", "newtons per metre", LINE_LOAD, 1.0),
        Unit::plain("kN/m", "kilonewtons per metre", LINE_LOAD, 1.0 / 1000.0),
        Unit::plain("plf", "pounds per linear foot", LINE_LOAD, 1.0 / 14.5939),
        // Moment
        Unit::plain("Nm", "newton metres", MOMENT, 1.0),
        Unit::plain("kNm", "kilonewton metres", MOMENT, 1.0 / 1000.0),
        Unit::plain("MNm", "meganewton metres", MOMENT, 1.0 / 1_000_000.0),
        Unit::plain("lbf-ft", "pound-feet", MOMENT, 1.0 / 1.35582),
        Unit::plain("kip-in", "kip-inches", MOMENT, 1.0 / 112.985),
        Unit::plain("kip-ft", "kip-feet", MOMENT, 1.0 / 1355.82),
        // Pressure
        Unit::plain("Pa", "pascals", PRESSURE, 1.0),
        Unit::plain("kPa", "kilopascals", PRESSURE, 1.0 / 1000.0),
        Unit::plain("MPa", "megapascals", PRESSURE, 1.0 / 1_000_000.0),
        Unit::plain("GPa", "gigapascals", PRESSURE, 1.0 / 1_000_000_000.0),
        Unit::plain("psi", "pounds per square inch", PRESSURE, 1.0 / 6894.75729),
        Unit::plain("ksi", "kips per square inch", PRESSURE, 1.0 / 6894757.29),
        Unit::plain("bar", "bar", PRESSURE, 1.0 / 100_000.0),
        Unit::plain("kgf/cm2", "kilograms-force per square centimetre", PRESSURE, 1.0 / 98066.5),
        Unit::plain("ksc", "kilograms-force per square centimetre", PRESSURE, 1.0 / 98066.5),
        Unit::plain("atm", "atmospheres", PRESSURE, 1.0 / 101325.0),
        // Weight density
        Unit::plain("N/m3", "newtons per cubic metre", DENSITY, 1.0),
        Unit::plain("kN/m3", "kilonewtons per cubic metre", DENSITY, 1.0 / 1000.0),
        Unit::plain("pci", "pounds per cubic inch", DENSITY, 1.0 / 271447.0),
        Unit::plain("pcf", "pounds per cubic foot", DENSITY, 1.0 / 157.09),
        // Mass density
        Unit::plain("kg/m3", "kilograms per cubic metre", MASS_DENSITY, 1.0),
        Unit::plain("g/cm3", "grams per cubic centimetre", MASS_DENSITY, 1.0 / 1000.0),
        // Area
        Unit::plain("m2", "square metres", AREA, 1.0),
        Unit::plain("mm2", "square millimetres", AREA, 1_000_000.0),
        Unit::plain("cm2", "square centimetres", AREA, 10_000.0),
        Unit::plain("in2", "square inches", AREA, 1.0 / 0.00064516),
        Unit::plain("ft2", "square feet", AREA, 1.0 / 0.09290304),
        // Volume
        Unit::plain("m3", "cubic metres", VOLUME, 1.0),
        Unit::plain("L", "litres", VOLUME, 1000.0),
        Unit::plain("in3", "cubic inches", VOLUME, 1.0 / 1.6387064e-5),
        Unit::plain("ft3", "cubic feet", VOLUME, 1.0 / 0.028316846592),
        // Angle
        Unit::plain("rad", "radians", ANGLE, 1.0),
        Unit::plain("deg", "degrees", ANGLE, 180.0 / PI),
        // Angular velocity
        Unit::plain("rad/s", "radians per second", ANGULAR_VELOCITY, 1.0),
        Unit::plain("rpm", "revolutions per minute", ANGULAR_VELOCITY, 30.0 / PI),
        // Temperature (kelvin canonical)
        Unit::plain("K", "kelvin", TEMPERATURE, 1.0),
        Unit::with_offset("C", "degrees Celsius", TEMPERATURE, 1.0, 273.15),
        Unit::with_offset("F", "degrees Fahrenheit", TEMPERATURE, 5.0 / 9.0, 459.67),
        Unit::plain("R", "degrees Rankine", TEMPERATURE, 9.0 / 5.0),
    ]
}
