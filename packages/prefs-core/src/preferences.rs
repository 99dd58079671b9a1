//! Snapshots of a store's key-space.

use std::collections::BTreeMap;

use crate::key::PrefKey;
use crate::value::{PrefPrimitive, PrefValue};
use crate::{Error, Result};

/// An immutable snapshot of every entry in a preference store.
///
/// Snapshots are what the change stream carries. They are cheap to share
/// behind an `Arc` and compare by content, which lets stores skip
/// publishing an edit that changed nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Preferences {
    entries: BTreeMap<String, PrefValue>,
}

impl Preferences {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: BTreeMap<String, PrefValue>) -> Self {
        Self { entries }
    }

    /// Read the value behind a typed key.
    ///
    /// Returns `None` if the name is absent or holds a different primitive
    /// type than the key declares.
    pub fn get<T: PrefPrimitive>(&self, key: &PrefKey<T>) -> Option<T> {
        self.entries.get(key.name()).and_then(T::from_value)
    }

    /// Like [`get`](Self::get), but reports a type mismatch instead of
    /// hiding it.
    pub fn try_get<T: PrefPrimitive>(&self, key: &PrefKey<T>) -> Result<Option<T>> {
        match self.entries.get(key.name()) {
            None => Ok(None),
            Some(value) => T::from_value(value).map(Some).ok_or_else(|| Error::TypeMismatch {
                key: key.name().to_string(),
                expected: T::TYPE,
                found: value.pref_type(),
            }),
        }
    }

    /// Read an entry by name regardless of its type.
    pub fn get_value(&self, name: &str) -> Option<&PrefValue> {
        self.entries.get(name)
    }

    pub fn contains<T: PrefPrimitive>(&self, key: &PrefKey<T>) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PrefValue)> {
        self.entries.iter()
    }

    pub fn as_map(&self) -> &BTreeMap<String, PrefValue> {
        &self.entries
    }

    /// Start an edit from this snapshot.
    pub fn to_mutable(&self) -> MutablePreferences {
        MutablePreferences {
            entries: self.entries.clone(),
        }
    }
}

impl FromIterator<(String, PrefValue)> for Preferences {
    fn from_iter<I: IntoIterator<Item = (String, PrefValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Scratch copy of a snapshot handed to edit transforms.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MutablePreferences {
    entries: BTreeMap<String, PrefValue>,
}

impl MutablePreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: PrefPrimitive>(&self, key: &PrefKey<T>) -> Option<T> {
        self.entries.get(key.name()).and_then(T::from_value)
    }

    /// Store a value, replacing whatever the name held before (of any type).
    pub fn set<T: PrefPrimitive>(&mut self, key: &PrefKey<T>, value: T) {
        self.entries.insert(key.name().to_string(), value.into_value());
    }

    /// Store an untyped value under a name.
    pub fn set_value(&mut self, name: impl Into<String>, value: PrefValue) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_key("preference name must not be empty"));
        }
        self.entries.insert(name, value);
        Ok(())
    }

    /// Remove the entry behind a key, returning it if it held this type.
    pub fn remove<T: PrefPrimitive>(&mut self, key: &PrefKey<T>) -> Option<T> {
        self.entries
            .remove(key.name())
            .and_then(|value| T::from_value(&value))
    }

    pub fn remove_name(&mut self, name: &str) -> Option<PrefValue> {
        self.entries.remove(name)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Finish the edit.
    pub fn freeze(self) -> Preferences {
        Preferences {
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{int_key, long_key, string_key};
    use crate::value::PrefType;
    use collection_literals::btree;

    #[test]
    fn get_falls_back_to_none_for_other_types() {
        let prefs = Preferences::from_entries(btree! {
            "volume".to_string() => PrefValue::Int(7),
        });

        assert_eq!(prefs.get(&int_key("volume").unwrap()), Some(7));
        assert_eq!(prefs.get(&long_key("volume").unwrap()), None);
        assert_eq!(prefs.get(&int_key("missing").unwrap()), None);
    }

    #[test]
    fn try_get_reports_mismatch() {
        let prefs = Preferences::from_entries(btree! {
            "volume".to_string() => PrefValue::Int(7),
        });

        let err = prefs.try_get(&string_key("volume").unwrap()).unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch {
                expected: PrefType::String,
                found: PrefType::Int,
                ..
            }
        ));
        assert_eq!(prefs.try_get(&string_key("other").unwrap()).unwrap(), None);
    }

    #[test]
    fn edit_does_not_touch_original_snapshot() {
        let original = Preferences::new();
        let mut edit = original.to_mutable();
        edit.set(&string_key("theme").unwrap(), "dark".to_string());
        let updated = edit.freeze();

        assert!(original.is_empty());
        assert_eq!(
            updated.get(&string_key("theme").unwrap()),
            Some("dark".to_string())
        );
    }

    #[test]
    fn set_replaces_value_of_another_type() {
        let mut edit = MutablePreferences::new();
        edit.set(&int_key("x").unwrap(), 1);
        edit.set(&string_key("x").unwrap(), "one".to_string());

        let prefs = edit.freeze();
        assert_eq!(prefs.len(), 1);
        assert_eq!(prefs.get(&int_key("x").unwrap()), None);
    }

    #[test]
    fn remove_and_clear() {
        let key = int_key("count").unwrap();
        let mut edit = MutablePreferences::new();
        edit.set(&key, 3);
        edit.set_value("name", PrefValue::from("x")).unwrap();

        assert_eq!(edit.remove(&key), Some(3));
        assert_eq!(edit.remove(&key), None);
        edit.clear();
        assert!(edit.freeze().is_empty());
    }

    #[test]
    fn set_value_rejects_empty_name() {
        let mut edit = MutablePreferences::new();
        assert!(edit.set_value("", PrefValue::Bool(true)).is_err());
    }
}
