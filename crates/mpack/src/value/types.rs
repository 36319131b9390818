use std::fmt;

const NUMBER: u8 = 0b01;
const INT: u8 = 0b11;

/// Type tag of a [`Value`](crate::Value).
///
/// Discriminants pack a category in the high bits and two flag bits in the
/// low ones: `0b01` marks numbers, `0b11` marks integers. Declaration order
/// follows the category rank used by `Value` ordering, with all numeric tags
/// sharing one rank.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Nil = 1 << 2,
    Float32 = (2 << 2) | NUMBER,
    Float64 = (3 << 2) | NUMBER,
    Int8 = (4 << 2) | INT,
    Int16 = (5 << 2) | INT,
    Int32 = (6 << 2) | INT,
    Int64 = (7 << 2) | INT,
    UInt8 = (8 << 2) | INT,
    UInt16 = (9 << 2) | INT,
    UInt32 = (10 << 2) | INT,
    UInt64 = (11 << 2) | INT,
    Bool = 12 << 2,
    String = 13 << 2,
    Binary = 14 << 2,
    Array = 15 << 2,
    Object = 16 << 2,
    Extension = 17 << 2,
}

impl Type {
    #[inline]
    pub fn is_number(self) -> bool {
        self as u8 & NUMBER == NUMBER
    }

    #[inline]
    pub fn is_int(self) -> bool {
        self as u8 & INT == INT
    }

    #[inline]
    pub fn is_float(self) -> bool {
        self.is_number() && !self.is_int()
    }

    /// Comparison category. Every numeric tag maps to the same rank.
    pub(crate) fn rank(self) -> u8 {
        match self {
            Type::Nil => 0,
            t if t.is_number() => 1,
            Type::Bool => 2,
            Type::String => 3,
            Type::Binary => 4,
            Type::Array => 5,
            Type::Object => 6,
            _ => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Type::Nil => "nil",
            Type::Float32 => "float32",
            Type::Float64 => "float64",
            Type::Int8 => "int8",
            Type::Int16 => "int16",
            Type::Int32 => "int32",
            Type::Int64 => "int64",
            Type::UInt8 => "uint8",
            Type::UInt16 => "uint16",
            Type::UInt32 => "uint32",
            Type::UInt64 => "uint64",
            Type::Bool => "bool",
            Type::String => "string",
            Type::Binary => "binary",
            Type::Array => "array",
            Type::Object => "object",
            Type::Extension => "extension",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
