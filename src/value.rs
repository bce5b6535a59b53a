//! # Variant Value Model
//!
//! Every value an expression produces or a variable supplies is a [`Variant`]:
//! exactly one of Number, String, or Boolean. The coercion rules are part of
//! the language contract and are deliberately asymmetric:
//!
//! * `as_boolean` of a String is true only for the exact (case-insensitive)
//!   text `TRUE`. Evaluation failures surface as a string sentinel, and this
//!   rule keeps such sentinels from ever reading as true in a condition.
//! * `compare` coerces the *other* operand into the receiver's kind, so
//!   `"5" < 10` is a lexicographic comparison against `"10"`.
//! * `+` is overloaded for string building: any String or Boolean receiver
//!   concatenates.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A dynamically typed expression value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Variant {
    Number(f64),
    String(String),
    Boolean(bool),
}

/// Raised when a value cannot be read in the requested kind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoercionError {
    #[error("'{text}' is not a number")]
    NotANumber { text: String },
    #[error("a boolean has no numeric form")]
    BooleanAsNumber,
}

impl Variant {
    /// Numeric view of the value.
    ///
    /// Strings are parsed; a non-numeric string and any boolean fail with
    /// [`CoercionError`].
    pub fn as_number(&self) -> Result<f64, CoercionError> {
        match self {
            Variant::Number(n) => Ok(*n),
            Variant::String(s) => s.parse::<f64>().map_err(|_| CoercionError::NotANumber {
                text: s.clone(),
            }),
            Variant::Boolean(_) => Err(CoercionError::BooleanAsNumber),
        }
    }

    /// Canonical textual form of the value.
    pub fn as_string(&self) -> String {
        match self {
            Variant::Number(n) => n.to_string(),
            Variant::String(s) => s.clone(),
            Variant::Boolean(b) => b.to_string(),
        }
    }

    /// Truthiness of the value. Infallible for every kind.
    ///
    /// Only the literal text `TRUE` (any casing) is a true string; nonzero
    /// numbers are true.
    pub fn as_boolean(&self) -> bool {
        match self {
            Variant::Number(n) => *n != 0.0,
            Variant::String(s) => s.eq_ignore_ascii_case("true"),
            Variant::Boolean(b) => *b,
        }
    }

    /// Ordering against `other`, coercing `other` into the receiver's kind.
    pub fn compare(&self, other: &Variant) -> Result<Ordering, CoercionError> {
        match self {
            Variant::Number(n) => Ok(n.total_cmp(&other.as_number()?)),
            Variant::String(s) => Ok(s.as_str().cmp(other.as_string().as_str())),
            Variant::Boolean(b) => Ok(b.cmp(&other.as_boolean())),
        }
    }

    /// Additive operator. Numeric sum for Number+Number, string
    /// concatenation (receiver first) for everything else.
    pub fn add(&self, other: &Variant) -> Variant {
        match (self, other) {
            (Variant::Number(a), Variant::Number(b)) => Variant::Number(a + b),
            _ => Variant::String(format!("{}{}", self.as_string(), other.as_string())),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl From<f64> for Variant {
    fn from(n: f64) -> Self {
        Variant::Number(n)
    }
}

impl From<&str> for Variant {
    fn from(s: &str) -> Self {
        Variant::String(s.to_string())
    }
}

impl From<String> for Variant {
    fn from(s: String) -> Self {
        Variant::String(s)
    }
}

impl From<bool> for Variant {
    fn from(b: bool) -> Self {
        Variant::Boolean(b)
    }
}
