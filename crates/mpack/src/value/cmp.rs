//! Total order over [`Value`].
//!
//! Values of different categories order by [`Type`](super::Type) rank.
//! Inside the number category every integer and float tag compares by exact
//! mathematical value; NaN equals NaN and sorts above every other number.

use std::cmp::Ordering;

use super::Value;

/// 2^64, the first float past `u64::MAX`.
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;
/// -2^63, i.e. `i64::MIN`, exactly representable.
const NEG_TWO_POW_63: f64 = -9_223_372_036_854_775_808.0;

#[derive(Clone, Copy)]
enum Num {
    Int(i128),
    Float(f64),
}

impl Value {
    fn num(&self) -> Option<Num> {
        Some(match *self {
            Value::Float32(v) => Num::Float(v as f64),
            Value::Float64(v) => Num::Float(v),
            Value::Int8(v) => Num::Int(v as i128),
            Value::Int16(v) => Num::Int(v as i128),
            Value::Int32(v) => Num::Int(v as i128),
            Value::Int64(v) => Num::Int(v as i128),
            Value::UInt8(v) => Num::Int(v as i128),
            Value::UInt16(v) => Num::Int(v as i128),
            Value::UInt32(v) => Num::Int(v as i128),
            Value::UInt64(v) => Num::Int(v as i128),
            _ => return None,
        })
    }
}

fn cmp_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        // -0.0 and 0.0 compare equal here.
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Exact comparison of a float against any 64-bit integer.
fn cmp_float_int(f: f64, i: i128) -> Ordering {
    if f.is_nan() || f >= TWO_POW_64 {
        return Ordering::Greater;
    }
    if f < NEG_TWO_POW_63 {
        return Ordering::Less;
    }
    // In range, so the truncated value converts to i128 exactly.
    let whole = f.trunc();
    match (whole as i128).cmp(&i) {
        Ordering::Equal => cmp_floats(f, whole),
        ord => ord,
    }
}

fn cmp_nums(a: Num, b: Num) -> Ordering {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => x.cmp(&y),
        (Num::Float(x), Num::Float(y)) => cmp_floats(x, y),
        (Num::Float(x), Num::Int(y)) => cmp_float_int(x, y),
        (Num::Int(x), Num::Float(y)) => cmp_float_int(y, x).reverse(),
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        let (ta, tb) = (self.value_type(), other.value_type());
        let rank = ta.rank().cmp(&tb.rank());
        if rank != Ordering::Equal {
            return rank;
        }
        match (self, other) {
            (Value::Nil, Value::Nil) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) | (Value::Binary(a), Value::Binary(b)) => {
                a.cmp(b)
            }
            (Value::Array(a), Value::Array(b)) => a.iter().cmp(b.iter()),
            (Value::Object(a), Value::Object(b)) => a.iter().cmp(b.iter()),
            (Value::Extension(ka, da), Value::Extension(kb, db)) => (ka, da).cmp(&(kb, db)),
            _ => match (self.num(), other.num()) {
                (Some(a), Some(b)) => cmp_nums(a, b),
                _ => Ordering::Equal,
            },
        }
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
