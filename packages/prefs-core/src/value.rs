//! The PrefValue type - the closed set of primitive preference kinds.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The primitive type of a stored preference.
///
/// Serializes as its [`as_str`](Self::as_str) name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefType {
    Int,
    Long,
    Float,
    Double,
    Bool,
    String,
    StringSet,
    Bytes,
}

impl PrefType {
    /// All preference types, in declaration order.
    pub const ALL: [PrefType; 8] = [
        PrefType::Int,
        PrefType::Long,
        PrefType::Float,
        PrefType::Double,
        PrefType::Bool,
        PrefType::String,
        PrefType::StringSet,
        PrefType::Bytes,
    ];

    /// Stable lowercase name, also used as the on-disk type tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrefType::Int => "int",
            PrefType::Long => "long",
            PrefType::Float => "float",
            PrefType::Double => "double",
            PrefType::Bool => "bool",
            PrefType::String => "string",
            PrefType::StringSet => "string_set",
            PrefType::Bytes => "bytes",
        }
    }
}

impl fmt::Display for PrefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrefType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrefType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| Error::UnknownType {
                name: s.to_string(),
            })
    }
}

/// A single stored preference value.
///
/// Unlike a general tree value this is deliberately flat: every entry in a
/// preference store is one of these eight primitives, and the variant is part
/// of the entry's identity. An `Int` stored under `"volume"` is not visible
/// through a `Long` key of the same name.
///
/// Floats compare by bit pattern: a stored NaN equals itself, and `0.0` and
/// `-0.0` are different values.
#[derive(Clone, Debug)]
pub enum PrefValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    String(String),
    StringSet(BTreeSet<String>),
    Bytes(Vec<u8>),
}

impl PrefValue {
    pub fn pref_type(&self) -> PrefType {
        match self {
            PrefValue::Int(_) => PrefType::Int,
            PrefValue::Long(_) => PrefType::Long,
            PrefValue::Float(_) => PrefType::Float,
            PrefValue::Double(_) => PrefType::Double,
            PrefValue::Bool(_) => PrefType::Bool,
            PrefValue::String(_) => PrefType::String,
            PrefValue::StringSet(_) => PrefType::StringSet,
            PrefValue::Bytes(_) => PrefType::Bytes,
        }
    }
}

impl PartialEq for PrefValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PrefValue::Int(a), PrefValue::Int(b)) => a.same_value(b),
            (PrefValue::Long(a), PrefValue::Long(b)) => a.same_value(b),
            (PrefValue::Float(a), PrefValue::Float(b)) => a.same_value(b),
            (PrefValue::Double(a), PrefValue::Double(b)) => a.same_value(b),
            (PrefValue::Bool(a), PrefValue::Bool(b)) => a.same_value(b),
            (PrefValue::String(a), PrefValue::String(b)) => a.same_value(b),
            (PrefValue::StringSet(a), PrefValue::StringSet(b)) => a.same_value(b),
            (PrefValue::Bytes(a), PrefValue::Bytes(b)) => a.same_value(b),
            _ => false,
        }
    }
}

impl Eq for PrefValue {}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefValue::Int(v) => write!(f, "{}", v),
            PrefValue::Long(v) => write!(f, "{}", v),
            PrefValue::Float(v) => write!(f, "{}", v),
            PrefValue::Double(v) => write!(f, "{}", v),
            PrefValue::Bool(v) => write!(f, "{}", v),
            PrefValue::String(v) => write!(f, "{:?}", v),
            PrefValue::StringSet(set) => {
                let items: Vec<String> = set.iter().map(|s| format!("{:?}", s)).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
            PrefValue::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A Rust type that maps one-to-one onto a [`PrefValue`] variant.
///
/// Implemented for `i32`, `i64`, `f32`, `f64`, `bool`, `String`,
/// `BTreeSet<String>` and `Vec<u8>`. The trait is sealed; enums are stored
/// through their names as `String` values instead.
pub trait PrefPrimitive:
    Clone + PartialEq + fmt::Debug + Send + Sync + 'static + sealed::Sealed
{
    /// The variant this type is stored as.
    const TYPE: PrefType;

    /// Wrap this value in its `PrefValue` variant.
    fn into_value(self) -> PrefValue;

    /// Extract a value of this type, or `None` if the variant differs.
    fn from_value(value: &PrefValue) -> Option<Self>;

    /// Whether two values would be stored identically.
    ///
    /// Same as `==` except for floats, which compare by bit pattern.
    fn same_value(&self, other: &Self) -> bool;
}

macro_rules! same_value {
    ($a:expr, $b:expr) => {
        $a == $b
    };
    ($a:expr, $b:expr, $bits:ident) => {
        $a.$bits() == $b.$bits()
    };
}

macro_rules! impl_pref_primitive {
    ($($ty:ty => $variant:ident $(by $bits:ident)?),+ $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl PrefPrimitive for $ty {
                const TYPE: PrefType = PrefType::$variant;

                fn into_value(self) -> PrefValue {
                    PrefValue::$variant(self)
                }

                fn from_value(value: &PrefValue) -> Option<Self> {
                    match value {
                        PrefValue::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }

                fn same_value(&self, other: &Self) -> bool {
                    same_value!(self, other $(, $bits)?)
                }
            }

            impl From<$ty> for PrefValue {
                fn from(v: $ty) -> Self {
                    PrefValue::$variant(v)
                }
            }
        )+
    };
}

impl_pref_primitive! {
    i32 => Int,
    i64 => Long,
    f32 => Float by to_bits,
    f64 => Double by to_bits,
    bool => Bool,
    String => String,
    BTreeSet<String> => StringSet,
    Vec<u8> => Bytes,
}

impl From<&str> for PrefValue {
    fn from(v: &str) -> Self {
        PrefValue::String(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pref_type_names_parse_back() {
        for ty in PrefType::ALL {
            assert_eq!(ty.as_str().parse::<PrefType>().unwrap(), ty);
        }
    }

    #[test]
    fn serde_names_match_as_str() {
        for ty in PrefType::ALL {
            let json = serde_json::to_value(ty).unwrap();
            assert_eq!(json, serde_json::Value::String(ty.as_str().to_string()));
            assert_eq!(serde_json::from_value::<PrefType>(json).unwrap(), ty);
        }
    }

    #[test]
    fn unknown_type_name_is_rejected() {
        let err = "integer".parse::<PrefType>().unwrap_err();
        assert!(matches!(err, Error::UnknownType { name } if name == "integer"));
    }

    #[test]
    fn from_value_requires_matching_variant() {
        let value = PrefValue::Int(7);
        assert_eq!(i32::from_value(&value), Some(7));
        assert_eq!(i64::from_value(&value), None);
        assert_eq!(String::from_value(&value), None);
    }

    #[test]
    fn into_value_reports_declared_type() {
        assert_eq!(3.5f32.into_value().pref_type(), f32::TYPE);
        assert_eq!(vec![1u8, 2].into_value().pref_type(), PrefType::Bytes);
        assert_eq!(
            BTreeSet::from(["a".to_string()]).into_value().pref_type(),
            PrefType::StringSet
        );
    }

    #[test]
    fn nan_equals_itself() {
        assert_eq!(PrefValue::Double(f64::NAN), PrefValue::Double(f64::NAN));
        assert_eq!(PrefValue::Float(f32::NAN), PrefValue::Float(f32::NAN));
        assert!(f64::NAN.same_value(&f64::NAN));
        assert_ne!(PrefValue::Double(0.0), PrefValue::Double(-0.0));
        assert_ne!(PrefValue::Float(1.0), PrefValue::Double(1.0));
        assert!(!1.5f32.same_value(&2.5));
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(PrefValue::from("dark").to_string(), "\"dark\"");
        assert_eq!(PrefValue::Bytes(vec![0; 4]).to_string(), "<4 bytes>");
        let set = BTreeSet::from(["b".to_string(), "a".to_string()]);
        assert_eq!(PrefValue::StringSet(set).to_string(), "{\"a\", \"b\"}");
    }
}
