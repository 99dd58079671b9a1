//! Typed preference keys.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::value::{PrefPrimitive, PrefType};
use crate::{Error, Result};

/// A preference name bound to the primitive type stored under it.
///
/// Two keys with the same name but different types address different
/// entries as far as reads are concerned: a read through a key whose type
/// does not match the stored variant sees nothing.
pub struct PrefKey<T> {
    name: String,
    _type: PhantomData<fn() -> T>,
}

impl<T: PrefPrimitive> PrefKey<T> {
    /// Create a key, rejecting empty names.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_key("preference name must not be empty"));
        }
        Ok(Self {
            name,
            _type: PhantomData,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pref_type(&self) -> PrefType {
        T::TYPE
    }
}

impl<T> Clone for PrefKey<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _type: PhantomData,
        }
    }
}

impl<T: PrefPrimitive> fmt::Debug for PrefKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefKey")
            .field("name", &self.name)
            .field("type", &T::TYPE)
            .finish()
    }
}

impl<T: PrefPrimitive> fmt::Display for PrefKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, T::TYPE)
    }
}

impl<T> PartialEq for PrefKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for PrefKey<T> {}

impl<T> Hash for PrefKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

pub fn int_key(name: impl Into<String>) -> Result<PrefKey<i32>> {
    PrefKey::new(name)
}

pub fn long_key(name: impl Into<String>) -> Result<PrefKey<i64>> {
    PrefKey::new(name)
}

pub fn float_key(name: impl Into<String>) -> Result<PrefKey<f32>> {
    PrefKey::new(name)
}

pub fn double_key(name: impl Into<String>) -> Result<PrefKey<f64>> {
    PrefKey::new(name)
}

pub fn bool_key(name: impl Into<String>) -> Result<PrefKey<bool>> {
    PrefKey::new(name)
}

pub fn string_key(name: impl Into<String>) -> Result<PrefKey<String>> {
    PrefKey::new(name)
}

pub fn string_set_key(name: impl Into<String>) -> Result<PrefKey<BTreeSet<String>>> {
    PrefKey::new(name)
}

pub fn bytes_key(name: impl Into<String>) -> Result<PrefKey<Vec<u8>>> {
    PrefKey::new(name)
}
