//! In-memory MessagePack value.

mod cmp;
mod convert;
mod shape;
mod types;

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

pub use types::Type;

pub(crate) use convert::insert_last_wins;

/// Map payload of [`Value::Object`]. Keys iterate in [`Value`] order.
pub type Object = BTreeMap<Value, Value>;

/// Shared `Nil`, returned by lookups that miss.
pub static NIL: Value = Value::Nil;

static EMPTY_OBJECT: Object = BTreeMap::new();

/// One MessagePack datum.
///
/// Byte and composite payloads sit behind [`Arc`], so `clone` is cheap and
/// subtrees can be shared. There is no mutation API: a value is built once
/// and then inspected.
///
/// Equality and ordering are numeric across all integer and float tags, so
/// `Value::from(1u8) == Value::from(1i64)` and both are the same key in an
/// [`Object`].
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Float32(f32),
    Float64(f64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    /// String bytes as they appear on the wire; not required to be UTF-8.
    String(Arc<[u8]>),
    Binary(Arc<[u8]>),
    Array(Arc<[Value]>),
    Object(Arc<Object>),
    Extension(i8, Arc<[u8]>),
}

macro_rules! numeric_getter {
    ($(#[$meta:meta])* $name:ident -> $t:ty) => {
        $(#[$meta])*
        pub fn $name(&self) -> $t {
            match *self {
                Value::Float32(v) => v as $t,
                Value::Float64(v) => v as $t,
                Value::Int8(v) => v as $t,
                Value::Int16(v) => v as $t,
                Value::Int32(v) => v as $t,
                Value::Int64(v) => v as $t,
                Value::UInt8(v) => v as $t,
                Value::UInt16(v) => v as $t,
                Value::UInt32(v) => v as $t,
                Value::UInt64(v) => v as $t,
                _ => <$t>::default(),
            }
        }
    };
}

impl Value {
    pub fn value_type(&self) -> Type {
        match self {
            Value::Nil => Type::Nil,
            Value::Bool(_) => Type::Bool,
            Value::Float32(_) => Type::Float32,
            Value::Float64(_) => Type::Float64,
            Value::Int8(_) => Type::Int8,
            Value::Int16(_) => Type::Int16,
            Value::Int32(_) => Type::Int32,
            Value::Int64(_) => Type::Int64,
            Value::UInt8(_) => Type::UInt8,
            Value::UInt16(_) => Type::UInt16,
            Value::UInt32(_) => Type::UInt32,
            Value::UInt64(_) => Type::UInt64,
            Value::String(_) => Type::String,
            Value::Binary(_) => Type::Binary,
            Value::Array(_) => Type::Array,
            Value::Object(_) => Type::Object,
            Value::Extension(..) => Type::Extension,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Nil)
    }
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }
    pub fn is_number(&self) -> bool {
        self.value_type().is_number()
    }
    pub fn is_int(&self) -> bool {
        self.value_type().is_int()
    }
    pub fn is_float32(&self) -> bool {
        matches!(self, Value::Float32(_))
    }
    pub fn is_float64(&self) -> bool {
        matches!(self, Value::Float64(_))
    }
    pub fn is_int8(&self) -> bool {
        matches!(self, Value::Int8(_))
    }
    pub fn is_int16(&self) -> bool {
        matches!(self, Value::Int16(_))
    }
    pub fn is_int32(&self) -> bool {
        matches!(self, Value::Int32(_))
    }
    pub fn is_int64(&self) -> bool {
        matches!(self, Value::Int64(_))
    }
    pub fn is_uint8(&self) -> bool {
        matches!(self, Value::UInt8(_))
    }
    pub fn is_uint16(&self) -> bool {
        matches!(self, Value::UInt16(_))
    }
    pub fn is_uint32(&self) -> bool {
        matches!(self, Value::UInt32(_))
    }
    pub fn is_uint64(&self) -> bool {
        matches!(self, Value::UInt64(_))
    }
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }
    pub fn is_binary(&self) -> bool {
        matches!(self, Value::Binary(_))
    }
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }
    pub fn is_extension(&self) -> bool {
        matches!(self, Value::Extension(..))
    }

    pub fn bool_value(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    numeric_getter!(
        /// Any numeric payload widened or narrowed to `f64`; `0.0` otherwise.
        number_value -> f64
    );
    numeric_getter!(float32_value -> f32);
    numeric_getter!(float64_value -> f64);
    numeric_getter!(int_value -> i32);
    numeric_getter!(int8_value -> i8);
    numeric_getter!(int16_value -> i16);
    numeric_getter!(int32_value -> i32);
    numeric_getter!(int64_value -> i64);
    numeric_getter!(uint8_value -> u8);
    numeric_getter!(uint16_value -> u16);
    numeric_getter!(uint32_value -> u32);
    numeric_getter!(uint64_value -> u64);

    /// String payload as `&str`, or `""` for a non-string or non-UTF-8 payload.
    pub fn string_value(&self) -> &str {
        std::str::from_utf8(self.string_bytes()).unwrap_or("")
    }

    /// Raw bytes of a string payload.
    pub fn string_bytes(&self) -> &[u8] {
        match self {
            Value::String(s) => s,
            _ => &[],
        }
    }

    pub fn binary_items(&self) -> &[u8] {
        match self {
            Value::Binary(b) => b,
            _ => &[],
        }
    }

    pub fn array_items(&self) -> &[Value] {
        match self {
            Value::Array(a) => a,
            _ => &[],
        }
    }

    pub fn object_items(&self) -> &Object {
        match self {
            Value::Object(o) => o,
            _ => &EMPTY_OBJECT,
        }
    }

    /// Extension type id and payload; `(0, [])` for other tags.
    pub fn extension_items(&self) -> (i8, &[u8]) {
        match self {
            Value::Extension(kind, data) => (*kind, data),
            _ => (0, &[]),
        }
    }

    /// Array element at `index`, or [`NIL`].
    pub fn at(&self, index: usize) -> &Value {
        self.array_items().get(index).unwrap_or(&NIL)
    }

    /// Object entry for `key`, or [`NIL`].
    pub fn get(&self, key: &Value) -> &Value {
        self.object_items().get(key).unwrap_or(&NIL)
    }

    /// Array or object length; zero for scalars.
    pub fn len(&self) -> usize {
        match self {
            Value::Array(a) => a.len(),
            Value::Object(o) => o.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        self.at(index)
    }
}

impl Index<&str> for Value {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        match self {
            Value::Object(o) => o.get(&Value::from(key)).unwrap_or(&NIL),
            _ => &NIL,
        }
    }
}

impl Index<&Value> for Value {
    type Output = Value;

    fn index(&self, key: &Value) -> &Value {
        self.get(key)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("Nil"),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Float32(v) => f.debug_tuple("Float32").field(v).finish(),
            Value::Float64(v) => f.debug_tuple("Float64").field(v).finish(),
            Value::Int8(v) => f.debug_tuple("Int8").field(v).finish(),
            Value::Int16(v) => f.debug_tuple("Int16").field(v).finish(),
            Value::Int32(v) => f.debug_tuple("Int32").field(v).finish(),
            Value::Int64(v) => f.debug_tuple("Int64").field(v).finish(),
            Value::UInt8(v) => f.debug_tuple("UInt8").field(v).finish(),
            Value::UInt16(v) => f.debug_tuple("UInt16").field(v).finish(),
            Value::UInt32(v) => f.debug_tuple("UInt32").field(v).finish(),
            Value::UInt64(v) => f.debug_tuple("UInt64").field(v).finish(),
            Value::String(s) => f
                .debug_tuple("String")
                .field(&String::from_utf8_lossy(s))
                .finish(),
            Value::Binary(b) => f.debug_tuple("Binary").field(&&b[..]).finish(),
            Value::Array(a) => f.debug_list().entries(a.iter()).finish(),
            Value::Object(o) => f.debug_map().entries(o.iter()).finish(),
            Value::Extension(kind, data) => f
                .debug_tuple("Extension")
                .field(kind)
                .field(&&data[..])
                .finish(),
        }
    }
}
