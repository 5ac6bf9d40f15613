//! Numeric coercion for untrusted snapshot fields.
//!
//! The companion service sends prices and quantities as JSON numbers,
//! numeric strings, empty strings, or not at all. Everything numeric that
//! leaves the profile goes through here and comes back as a plain number.

use serde_json::Value;

/// Outcome of coercing one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced<T> {
    Parsed(T),
    Defaulted,
}

impl<T: Default> Coerced<T> {
    /// The parsed value, or the type's zero.
    pub fn value(self) -> T {
        match self {
            Coerced::Parsed(v) => v,
            Coerced::Defaulted => T::default(),
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Coerced::Defaulted)
    }
}

fn as_float(value: Option<&Value>) -> Option<f64> {
    let f = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f)
}

/// Round to the nearest integer via `trunc(x + 0.5)`.
pub fn coerce_int(value: Option<&Value>) -> Coerced<i64> {
    match as_float(value) {
        Some(f) => {
            let rounded = (f + 0.5).trunc();
            if rounded >= i64::MIN as f64 && rounded <= i64::MAX as f64 {
                Coerced::Parsed(rounded as i64)
            } else {
                Coerced::Defaulted
            }
        }
        None => Coerced::Defaulted,
    }
}

pub fn coerce_proportion(value: Option<&Value>) -> Coerced<f64> {
    match as_float(value) {
        Some(f) => Coerced::Parsed(f),
        None => Coerced::Defaulted,
    }
}

/// Coerce a stock/demand bracket; anything outside 0–3 is treated as 0.
pub fn coerce_bracket(value: Option<&Value>) -> u8 {
    match coerce_int(value).value() {
        b @ 0..=3 => b as u8,
        _ => 0,
    }
}
