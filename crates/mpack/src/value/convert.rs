//! Conversions from native Rust values into [`Value`].

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::Arc;

use super::{Object, Value};

macro_rules! from_scalar {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                #[inline]
                fn from(v: $t) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

from_scalar! {
    bool => Bool,
    f32 => Float32,
    f64 => Float64,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Nil
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s.into_bytes()))
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::from(s.as_str())
    }
}

/// Bytes convert to `Binary`; use [`Value::from_string_bytes`] for a string.
impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Binary(Arc::from(b))
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Binary(Arc::from(b))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Arc::from(items))
    }
}

impl From<(i8, Vec<u8>)> for Value {
    fn from((kind, data): (i8, Vec<u8>)) -> Self {
        Value::Extension(kind, Arc::from(data))
    }
}

impl<K: Into<Value>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(map: BTreeMap<K, V>) -> Self {
        Value::object(map)
    }
}

impl<K: Into<Value>, V: Into<Value>, S: BuildHasher> From<HashMap<K, V, S>> for Value {
    fn from(map: HashMap<K, V, S>) -> Self {
        Value::object(map)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::Array(iter.into_iter().collect())
    }
}

impl FromIterator<(Value, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        Value::object(iter)
    }
}

/// Inserts `key`, replacing both key and value of an equal existing entry.
pub(crate) fn insert_last_wins(map: &mut Object, key: Value, value: Value) {
    map.remove(&key);
    map.insert(key, value);
}

impl Value {
    /// Builds a `String` value from raw bytes, which need not be UTF-8.
    pub fn from_string_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::String(Arc::from(bytes.into()))
    }

    pub fn binary(bytes: impl AsRef<[u8]>) -> Self {
        Value::Binary(Arc::from(bytes.as_ref()))
    }

    pub fn extension(kind: i8, data: impl AsRef<[u8]>) -> Self {
        Value::Extension(kind, Arc::from(data.as_ref()))
    }

    /// Builds an `Array` from anything that yields convertible items.
    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Builds an `Object` from key/value pairs. Later pairs replace earlier
    /// ones with an equal key.
    pub fn object<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        let mut map = Object::new();
        for (k, v) in pairs {
            insert_last_wins(&mut map, k.into(), v.into());
        }
        Value::Object(Arc::new(map))
    }
}
