//! Fixed-point math utilities for deterministic combat.
//!
//! Every combat quantity (health, shield, damage, charge) is a fixed-point
//! number. Floating-point results can differ between CPUs and compilers,
//! which would break replay verification.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all combat math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// One hundred, the denominator for every percentage in the engine.
pub const HUNDRED: Fixed = Fixed::const_from_int(100);

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Serde support for hand-written fixed-point values.
///
/// Reads and writes decimals (`0.5`) so config files stay readable. Values
/// pass through `f64` on the way in, so the same text always yields the same
/// bits, but decimals that `f64` cannot represent exactly are rounded twice.
pub mod fixed_decimal {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as a decimal.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_num::<f64>().serialize(serializer)
    }

    /// Deserialize a fixed-point number from a decimal.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Fixed::checked_from_num(value)
            .ok_or_else(|| serde::de::Error::custom(format!("{value} is out of fixed-point range")))
    }
}

/// Build a fixed-point fraction from a whole percentage (`150` -> `1.5`).
#[must_use]
pub fn percent(value: u32) -> Fixed {
    Fixed::from_num(value) / HUNDRED
}

/// `numerator / denominator`, or zero when the denominator is not positive.
#[must_use]
pub fn ratio(numerator: Fixed, denominator: Fixed) -> Fixed {
    if denominator <= Fixed::ZERO {
        Fixed::ZERO
    } else {
        numerator / denominator
    }
}

/// A fixed-point value tagged for human-readable output.
///
/// Simulation records store raw bits; this wrapper is what the headless
/// runner prints in summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readable(#[serde(with = "fixed_serde")] pub Fixed);

impl std::fmt::Display for Readable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.0.to_num::<f64>())
    }
}
