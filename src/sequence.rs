//! Sequence elements and payload validation
//!
//! A sort request carries a JSON list of numbers. JSON does not distinguish
//! integers from floats at the type level, so each element is kept as an
//! [`Number::Int`], a [`Number::UInt`] (integers above `i64::MAX`) or a
//! [`Number::Float`] and written back in the same form. Ordering is exact and
//! numeric across all kinds: `2 < 2.5 < 3 < 18446744073709551615`.

use crate::error::SortError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// One element of a sequence
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    UInt(u64),
    Float(f64),
}

/// 2^63, the first float above the i64 range
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;
/// 2^64, the first float above the u64 range
const U64_UPPER: f64 = 18_446_744_073_709_551_616.0;

impl Number {
    /// Convert a JSON value, returning `None` for anything that is not a number
    pub fn from_json(value: &Value) -> Option<Self> {
        let Value::Number(n) = value else {
            return None;
        };
        n.as_i64()
            .map(Number::Int)
            .or_else(|| n.as_u64().map(Number::UInt))
            .or_else(|| n.as_f64().map(Number::Float))
    }
}

/// Exact comparison of an integer against a float
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    if f >= I64_UPPER {
        return Ordering::Less;
    }
    if f < -I64_UPPER {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(f - whole)).unwrap_or(Ordering::Equal),
        ord => ord,
    }
}

/// Exact comparison of an unsigned integer against a float
fn cmp_uint_float(u: u64, f: f64) -> Ordering {
    if f >= U64_UPPER {
        return Ordering::Less;
    }
    if f < 0.0 {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    match u.cmp(&(whole as u64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(f - whole)).unwrap_or(Ordering::Equal),
        ord => ord,
    }
}

fn cmp_int_uint(i: i64, u: u64) -> Ordering {
    match u64::try_from(i) {
        Ok(i) => i.cmp(&u),
        Err(_) => Ordering::Less,
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => a.cmp(&b),
            (Number::UInt(a), Number::UInt(b)) => a.cmp(&b),
            (Number::Int(a), Number::UInt(b)) => cmp_int_uint(a, b),
            (Number::UInt(a), Number::Int(b)) => cmp_int_uint(b, a).reverse(),
            (Number::Int(a), Number::Float(b)) => cmp_int_float(a, b),
            (Number::Float(a), Number::Int(b)) => cmp_int_float(b, a).reverse(),
            (Number::UInt(a), Number::Float(b)) => cmp_uint_float(a, b),
            (Number::Float(a), Number::UInt(b)) => cmp_uint_float(b, a).reverse(),
            // JSON floats are finite; total_cmp only breaks the NaN case
            (Number::Float(a), Number::Float(b)) => {
                a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
            }
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Number {}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Number::UInt(value), Number::Int)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::UInt(u) => write!(f, "{}", u),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

impl FromStr for Number {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(i) = s.parse::<i64>() {
            return Ok(Number::Int(i));
        }
        if let Ok(u) = s.parse::<u64>() {
            return Ok(Number::UInt(u));
        }
        match s.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Number::Float(f)),
            _ => Err(SortError::invalid(format!("'{}' is not a number", s))),
        }
    }
}

/// Extract the sequence from a `{ "data": [...] }` payload
///
/// Rejects bodies that are not objects, lack a `data` field, carry a non-list
/// or empty `data`, or contain any element that is not a number.
pub fn parse_sort_payload(body: &Value) -> Result<Vec<Number>, SortError> {
    let object = body
        .as_object()
        .ok_or_else(|| SortError::invalid("Expected a JSON object with a `data` field."))?;

    let data = object
        .get("data")
        .ok_or_else(|| SortError::invalid("Missing `data` field."))?;

    let items = data
        .as_array()
        .ok_or_else(|| SortError::invalid("Expected a list."))?;

    if items.is_empty() {
        return Err(SortError::invalid("Empty list provided."));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            Number::from_json(item)
                .ok_or_else(|| SortError::invalid(format!("Element {} is not a number: {}", i, item)))
        })
        .collect()
}

/// True when every element is <= its successor
pub fn is_sorted<T: Ord>(seq: &[T]) -> bool {
    seq.windows(2).all(|w| w[0] <= w[1])
}
