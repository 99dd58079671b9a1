//! On-disk JSON representation of a preference snapshot.
//!
//! A file is a single JSON object mapping each preference name to a tagged
//! entry:
//!
//! ```json
//! {
//!   "theme": { "type": "string", "value": "dark" },
//!   "volume": { "type": "int", "value": 7 },
//!   "avatar": { "type": "bytes", "value": "AAEC" }
//! }
//! ```
//!
//! Byte sequences are base64 encoded, string sets are sorted arrays, and
//! non-finite floats are written as the strings `"NaN"`, `"inf"`, `"-inf"`.

use std::collections::{BTreeMap, BTreeSet};

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use prefstore_core::{Error, PrefType, PrefValue, Preferences, Result};

/// One tagged entry of the file.
#[derive(Debug, Serialize, Deserialize)]
struct Entry {
    #[serde(rename = "type")]
    pref_type: PrefType,
    value: JsonValue,
}

impl Entry {
    fn from_value(value: &PrefValue) -> Self {
        let payload = match value {
            PrefValue::Int(v) => json!(v),
            PrefValue::Long(v) => json!(v),
            PrefValue::Float(v) => float_to_json(f64::from(*v)),
            PrefValue::Double(v) => float_to_json(*v),
            PrefValue::Bool(v) => json!(v),
            PrefValue::String(v) => json!(v),
            PrefValue::StringSet(set) => json!(set),
            PrefValue::Bytes(bytes) => {
                JsonValue::String(base64::engine::general_purpose::STANDARD.encode(bytes))
            }
        };
        Entry {
            pref_type: value.pref_type(),
            value: payload,
        }
    }

    fn into_value(self) -> std::result::Result<PrefValue, String> {
        let ty = self.pref_type;
        let payload = self.value;
        let mismatch = || format!("value does not match type {}", ty);

        let value = match ty {
            PrefType::Int => {
                let v = payload.as_i64().ok_or_else(mismatch)?;
                PrefValue::Int(
                    i32::try_from(v).map_err(|_| format!("{} out of range for int", v))?,
                )
            }
            PrefType::Long => PrefValue::Long(payload.as_i64().ok_or_else(mismatch)?),
            PrefType::Float => {
                PrefValue::Float(json_to_float(&payload).ok_or_else(mismatch)? as f32)
            }
            PrefType::Double => PrefValue::Double(json_to_float(&payload).ok_or_else(mismatch)?),
            PrefType::Bool => PrefValue::Bool(payload.as_bool().ok_or_else(mismatch)?),
            PrefType::String => match payload {
                JsonValue::String(s) => PrefValue::String(s),
                _ => return Err(mismatch()),
            },
            PrefType::StringSet => {
                let set: BTreeSet<String> =
                    serde_json::from_value(payload).map_err(|_| mismatch())?;
                PrefValue::StringSet(set)
            }
            PrefType::Bytes => {
                let encoded = payload.as_str().ok_or_else(mismatch)?;
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(encoded)
                    .map_err(|e| format!("invalid base64: {}", e))?;
                PrefValue::Bytes(bytes)
            }
        };
        Ok(value)
    }
}

/// Serialize a snapshot into the file representation.
pub fn encode(prefs: &Preferences) -> Result<String> {
    let entries: BTreeMap<&str, Entry> = prefs
        .iter()
        .map(|(name, value)| (name.as_str(), Entry::from_value(value)))
        .collect();
    serde_json::to_string_pretty(&entries).map_err(Error::serialization)
}

/// Parse the file representation. Blank input is an empty snapshot.
pub fn decode(text: &str) -> Result<Preferences> {
    if text.trim().is_empty() {
        return Ok(Preferences::new());
    }

    let entries: BTreeMap<String, Entry> =
        serde_json::from_str(text).map_err(Error::serialization)?;

    entries
        .into_iter()
        .map(|(name, entry)| {
            let value = entry
                .into_value()
                .map_err(|message| Error::serialization(format!("entry {:?}: {}", name, message)))?;
            Ok((name, value))
        })
        .collect()
}

fn float_to_json(f: f64) -> JsonValue {
    serde_json::Number::from_f64(f)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(f.to_string()))
}

fn json_to_float(payload: &JsonValue) -> Option<f64> {
    match payload {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.parse().ok().filter(|f: &f64| !f.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collection_literals::btree;

    fn sample() -> Preferences {
        Preferences::from_entries(btree! {
            "avatar".to_string() => PrefValue::Bytes(vec![0, 1, 2, 255]),
            "dark_mode".to_string() => PrefValue::Bool(true),
            "launches".to_string() => PrefValue::Long(1 << 40),
            "ratio".to_string() => PrefValue::Float(0.1),
            "scale".to_string() => PrefValue::Double(1.25),
            "tags".to_string() => PrefValue::StringSet(BTreeSet::from([
                "b".to_string(),
                "a".to_string(),
            ])),
            "theme".to_string() => PrefValue::String("dark".to_string()),
            "volume".to_string() => PrefValue::Int(-7),
        })
    }

    #[test]
    fn file_round_trip_preserves_every_type() {
        let prefs = sample();
        let text = encode(&prefs).unwrap();
        assert_eq!(decode(&text).unwrap(), prefs);
    }

    #[test]
    fn entries_are_tagged() {
        let tagged = |value: PrefValue| {
            serde_json::to_value(Entry::from_value(&value)).unwrap()
        };

        assert_eq!(
            tagged(PrefValue::Bytes(vec![0, 1, 2])),
            json!({ "type": "bytes", "value": "AAEC" })
        );
        assert_eq!(
            tagged(PrefValue::StringSet(BTreeSet::from([
                "z".to_string(),
                "a".to_string(),
            ]))),
            json!({ "type": "string_set", "value": ["a", "z"] })
        );
    }

    #[test]
    fn non_finite_floats_survive() {
        let prefs = Preferences::from_entries(btree! {
            "inf".to_string() => PrefValue::Double(f64::INFINITY),
            "neg".to_string() => PrefValue::Float(f32::NEG_INFINITY),
        });
        let decoded = decode(&encode(&prefs).unwrap()).unwrap();
        assert_eq!(decoded, prefs);

        let nan = decode(&encode(&Preferences::from_entries(btree! {
            "nan".to_string() => PrefValue::Double(f64::NAN),
        })).unwrap())
        .unwrap();
        assert!(matches!(nan.get_value("nan"), Some(PrefValue::Double(f)) if f.is_nan()));
    }

    #[test]
    fn blank_file_is_empty() {
        assert!(decode("").unwrap().is_empty());
        assert!(decode("  \n").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_entries() {
        for text in [
            "[]",
            r#"{"a": {"value": 1}}"#,
            r#"{"a": {"type": "int"}}"#,
            r#"{"a": {"type": "integer", "value": 1}}"#,
            r#"{"a": {"type": "int", "value": "1"}}"#,
            r#"{"a": {"type": "int", "value": 4294967296}}"#,
            r#"{"a": {"type": "bytes", "value": "not base64!"}}"#,
            r#"{"a": {"type": "double", "value": "1.5"}}"#,
            "{not json",
        ] {
            assert!(
                matches!(decode(text), Err(Error::Serialization { .. })),
                "{} should be rejected",
                text
            );
        }
    }
}
