//! Value type and its cross-type total order
//!
//! Ordering is by canonical type class first, then natural order within
//! the class. Integers and doubles share one class and compare
//! numerically, so `Int(1) == Double(1.0)`.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};

use super::document::Document;

/// 2^63 as a double; the first double that does not fit in an i64.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

/// A single value inside a document.
#[derive(Debug, Clone)]
pub enum Value {
    /// Internal sentinel below every other value
    MinKey,
    /// Deprecated undefined marker
    Undefined,
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// 64-bit float
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Opaque byte string
    Binary(Vec<u8>),
    /// Point in time, millisecond precision on the wire
    Timestamp(DateTime<Utc>),
    /// Ordered sequence
    Array(Vec<Value>),
    /// Embedded document
    Object(Document),
    /// Internal sentinel above every other value
    MaxKey,
}

impl Value {
    /// Canonical type class used as the first ordering key.
    pub fn canonical_type(&self) -> u8 {
        match self {
            Value::MinKey => 0,
            Value::Undefined => 1,
            Value::Null => 2,
            Value::Int(_) | Value::Double(_) => 3,
            Value::String(_) => 4,
            Value::Object(_) => 5,
            Value::Array(_) => 6,
            Value::Binary(_) => 7,
            Value::Bool(_) => 8,
            Value::Timestamp(_) => 9,
            Value::MaxKey => 10,
        }
    }

    /// Human-readable type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::MinKey => "minKey",
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Binary(_) => "binData",
            Value::Timestamp(_) => "timestamp",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::MaxKey => "maxKey",
        }
    }

    /// True for MinKey, MaxKey and Undefined.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Value::MinKey | Value::MaxKey | Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Double(_))
    }

    /// Numeric value as a double, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Numeric value as an integer, if it is integral and in range.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Double(d) if d.fract() == 0.0 && *d >= -TWO_POW_63 && *d < TWO_POW_63 => {
                Some(*d as i64)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Object(doc) => Some(doc),
            _ => None,
        }
    }

    /// Deterministic estimate of the encoded size in bytes.
    ///
    /// One tag byte plus the payload; containers add a length prefix and
    /// a terminator, and each element carries its name (array index for
    /// arrays) with a trailing nul.
    pub fn encoded_size(&self) -> usize {
        1 + match self {
            Value::MinKey | Value::MaxKey | Value::Undefined | Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Double(_) | Value::Timestamp(_) => 8,
            Value::String(s) => 5 + s.len(),
            Value::Binary(b) => 5 + b.len(),
            Value::Array(items) => {
                5 + items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| decimal_len(i) + 1 + v.encoded_size())
                    .sum::<usize>()
            }
            Value::Object(doc) => {
                5 + doc
                    .iter()
                    .map(|(k, v)| k.len() + 1 + v.encoded_size())
                    .sum::<usize>()
            }
        }
    }
}

fn decimal_len(mut n: usize) -> usize {
    let mut len = 1;
    while n >= 10 {
        n /= 10;
        len += 1;
    }
    len
}

/// NaN sorts below every other number and equals itself.
fn compare_doubles(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Exact comparison of an integer against a double, without rounding the
/// integer through f64.
fn compare_int_double(i: i64, d: f64) -> Ordering {
    if d.is_nan() {
        return Ordering::Greater;
    }
    if d >= TWO_POW_63 {
        return Ordering::Less;
    }
    if d < -TWO_POW_63 {
        return Ordering::Greater;
    }
    let truncated = d.trunc();
    match i.cmp(&(truncated as i64)) {
        Ordering::Equal if d > truncated => Ordering::Less,
        Ordering::Equal if d < truncated => Ordering::Greater,
        other => other,
    }
}

fn compare_same_class(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Double(x), Value::Double(y)) => compare_doubles(*x, *y),
        (Value::Int(x), Value::Double(y)) => compare_int_double(*x, *y),
        (Value::Double(x), Value::Int(y)) => compare_int_double(*y, *x).reverse(),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Binary(x), Value::Binary(y)) => x.len().cmp(&y.len()).then_with(|| x.cmp(y)),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x.iter().cmp(y.iter()),
        (Value::Object(x), Value::Object(y)) => x.cmp(y),
        // Sentinels and null carry no payload.
        _ => Ordering::Equal,
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical_type()
            .cmp(&other.canonical_type())
            .then_with(|| compare_same_class(self, other))
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<Document> for Value {
    fn from(v: Document) -> Self {
        Value::Object(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_class_order() {
        let ordered = vec![
            Value::MinKey,
            Value::Undefined,
            Value::Null,
            Value::Int(-5),
            Value::Double(2.5),
            Value::from("a"),
            Value::Object(Document::new()),
            Value::Array(vec![]),
            Value::Binary(vec![1]),
            Value::Bool(false),
            Value::Timestamp(DateTime::<Utc>::UNIX_EPOCH),
            Value::MaxKey,
        ];

        for pair in ordered.windows(2) {
            assert!(pair[0] < pair[1], "{:?} should sort before {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_mixed_numbers_compare_numerically() {
        assert_eq!(Value::Int(1), Value::Double(1.0));
        assert!(Value::Int(1) < Value::Double(1.5));
        assert!(Value::Double(-0.5) < Value::Int(0));
        assert!(Value::Int(i64::MAX) < Value::Double(TWO_POW_63));
        assert!(Value::Int(i64::MIN) > Value::Double(-1e300));
    }

    #[test]
    fn test_nan_sorts_first_among_numbers() {
        let nan = Value::Double(f64::NAN);
        assert!(nan < Value::Int(i64::MIN));
        assert!(nan < Value::Double(f64::NEG_INFINITY));
        assert_eq!(nan, Value::Double(f64::NAN));
        assert!(nan > Value::Null);
    }

    #[test]
    fn test_arrays_compare_elementwise() {
        let short = Value::Array(vec![Value::Int(1)]);
        let long = Value::Array(vec![Value::Int(1), Value::Int(0)]);
        let bigger = Value::Array(vec![Value::Int(2)]);
        assert!(short < long);
        assert!(long < bigger);
    }

    #[test]
    fn test_as_i64_rejects_fractions() {
        assert_eq!(Value::Double(3.0).as_i64(), Some(3));
        assert_eq!(Value::Double(3.5).as_i64(), None);
        assert_eq!(Value::from("3").as_i64(), None);
    }

    #[test]
    fn test_encoded_size_grows_with_payload() {
        let small = Value::from("a");
        let large = Value::from("a".repeat(100));
        assert_eq!(large.encoded_size() - small.encoded_size(), 99);
        assert_eq!(Value::Null.encoded_size(), 1);
    }
}
