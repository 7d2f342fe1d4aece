//! Typed list elements and their ordering and multiset-key semantics.
//!
//! Benchmark lists hold integers, floats, or strings. Ordering is fallible:
//! numbers compare numerically (across Int/Float), strings lexicographically,
//! and a string-vs-number comparison is an error that callers funnel into the
//! "could not be scored" path rather than propagating.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SortBenchError};

/// One element of a benchmark list.
///
/// Serializes untagged, so JSON data files read back as plain numbers and
/// strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// Compare two scalars under their natural ordering.
    ///
    /// Int and Float compare numerically with each other; NaN and
    /// string-vs-number comparisons fail with [`SortBenchError::Incomparable`].
    pub fn try_cmp(&self, other: &Scalar) -> Result<Ordering> {
        let ord = match (self, other) {
            (Scalar::Int(a), Scalar::Int(b)) => Some(a.cmp(b)),
            (Scalar::Str(a), Scalar::Str(b)) => Some(a.cmp(b)),
            (Scalar::Int(a), Scalar::Float(b)) => (*a as f64).partial_cmp(b),
            (Scalar::Float(a), Scalar::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Scalar::Float(a), Scalar::Float(b)) => a.partial_cmp(b),
            _ => None,
        };
        ord.ok_or_else(|| SortBenchError::Incomparable {
            left: self.to_string(),
            right: other.to_string(),
        })
    }

    /// Hashable multiset key.
    ///
    /// Integral floats collapse onto the Int key, so `1` and `1.0` count as
    /// the same value when diffing multisets.
    pub fn key(&self) -> Key {
        match self {
            Scalar::Int(n) => Key::Int(*n),
            Scalar::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Key::Int(*f as i64)
                } else {
                    Key::Bits(f.to_bits())
                }
            }
            Scalar::Str(s) => Key::Str(s.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Float(x) => write!(f, "{:?}", x),
            Scalar::Str(s) => {
                write!(f, "'")?;
                for c in s.chars() {
                    match c {
                        '\'' => write!(f, "\\'")?,
                        '\\' => write!(f, "\\\\")?,
                        _ => write!(f, "{}", c)?,
                    }
                }
                write!(f, "'")
            }
        }
    }
}

/// Hashable identity of a [`Scalar`] for multiset counting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Bits(u64),
    Str(String),
}

/// Render a list of scalars in list-literal form, e.g. `[3, 1, 2]`.
///
/// This is the exact representation sent to models in the sort prompt.
pub fn render_list(items: &[Scalar]) -> String {
    let rendered: Vec<String> = items.iter().map(|s| s.to_string()).collect();
    format!("[{}]", rendered.join(", "))
}
