//! Command parsing and execution.
//!
//! Commands:
//! - `list` - Show every entry with its type
//! - `get <name>` - Show one entry
//! - `set <name> <type> <value>` - Store a value of the given type
//! - `remove <name>` - Delete an entry

use std::collections::BTreeSet;
use std::str::FromStr;

use base64::Engine;
use nu_ansi_term::{Color, Style};

use prefstore_core::{Error, PrefStore, PrefType, PrefValue, Preferences, Result};

/// A parsed command, ready to run against a store.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    List,
    Get { name: String },
    Set { name: String, value: PrefValue },
    Remove { name: String },
}

impl Command {
    /// Build a `set` command from its textual type and value.
    pub fn set(name: impl Into<String>, type_name: &str, raw: &str) -> Result<Self> {
        let pref_type = PrefType::from_str(type_name)?;
        Ok(Command::Set {
            name: name.into(),
            value: parse_value(pref_type, raw)?,
        })
    }
}

/// Run `command` and return the text to print.
pub async fn execute<S: PrefStore + ?Sized>(store: &S, command: Command) -> Result<String> {
    match command {
        Command::List => Ok(format_list(&store.snapshot())),
        Command::Get { name } => Ok(format_get(&store.snapshot(), &name)),
        Command::Set { name, value } => {
            let shown = format_entry(&name, &value);
            store
                .update_data(Box::new(move |prefs| prefs.set_value(name, value)))
                .await?;
            Ok(format!("{} {}", Color::Green.paint("ok"), shown))
        }
        Command::Remove { name } => {
            if store.snapshot().get_value(&name).is_none() {
                return Ok(not_set(&name));
            }
            let removed = name.clone();
            store
                .update_data(Box::new(move |prefs| {
                    prefs.remove_name(&removed);
                    Ok(())
                }))
                .await?;
            Ok(format!(
                "{} removed {}",
                Color::Green.paint("ok"),
                Color::Cyan.paint(name)
            ))
        }
    }
}

/// Parse `raw` as a value of `pref_type`.
///
/// String sets are comma separated, with surrounding whitespace trimmed and
/// empty items dropped. Byte arrays are standard base64.
pub fn parse_value(pref_type: PrefType, raw: &str) -> Result<PrefValue> {
    let invalid = |err: &dyn std::fmt::Display| Error::Serialization {
        message: format!("invalid {} value {:?}: {}", pref_type, raw, err),
    };

    let value = match pref_type {
        PrefType::Int => PrefValue::Int(raw.trim().parse().map_err(|e| invalid(&e))?),
        PrefType::Long => PrefValue::Long(raw.trim().parse().map_err(|e| invalid(&e))?),
        PrefType::Float => PrefValue::Float(raw.trim().parse().map_err(|e| invalid(&e))?),
        PrefType::Double => PrefValue::Double(raw.trim().parse().map_err(|e| invalid(&e))?),
        PrefType::Bool => PrefValue::Bool(raw.trim().parse().map_err(|e| invalid(&e))?),
        PrefType::String => PrefValue::String(raw.to_string()),
        PrefType::StringSet => PrefValue::StringSet(
            raw.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect::<BTreeSet<_>>(),
        ),
        PrefType::Bytes => PrefValue::Bytes(
            base64::engine::general_purpose::STANDARD
                .decode(raw.trim())
                .map_err(|e| invalid(&e))?,
        ),
    };
    Ok(value)
}

fn format_entry(name: &str, value: &PrefValue) -> String {
    format!(
        "{} {} {}",
        Color::Cyan.paint(name),
        Color::DarkGray.paint(format!("({})", value.pref_type())),
        Color::Yellow.paint(value.to_string())
    )
}

fn format_list(prefs: &Preferences) -> String {
    if prefs.is_empty() {
        return format!("{}", Color::Yellow.paint("no preferences stored"));
    }
    let mut out = format!(
        "{}\n",
        Style::new()
            .bold()
            .paint(format!("{} preference(s)", prefs.len()))
    );
    for (name, value) in prefs.iter() {
        out.push_str("  ");
        out.push_str(&format_entry(name, value));
        out.push('\n');
    }
    out
}

fn format_get(prefs: &Preferences, name: &str) -> String {
    match prefs.get_value(name) {
        Some(value) => format_entry(name, value),
        None => not_set(name),
    }
}

fn not_set(name: &str) -> String {
    format!(
        "{} {}",
        Color::Cyan.paint(name),
        Color::Yellow.paint("null (not set)")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use collection_literals::btree;
    use prefstore_json::InMemoryPrefStore;

    #[test]
    fn parses_numbers_and_bools() {
        assert_eq!(parse_value(PrefType::Int, " 42 ").unwrap(), PrefValue::Int(42));
        assert_eq!(
            parse_value(PrefType::Long, "-9000000000").unwrap(),
            PrefValue::Long(-9_000_000_000)
        );
        assert_eq!(parse_value(PrefType::Double, "0.5").unwrap(), PrefValue::Double(0.5));
        assert_eq!(parse_value(PrefType::Bool, "true").unwrap(), PrefValue::Bool(true));
    }

    #[test]
    fn rejects_out_of_range_int() {
        let err = parse_value(PrefType::Int, "3000000000").unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[test]
    fn parses_string_sets() {
        let value = parse_value(PrefType::StringSet, "b, a,,b ").unwrap();
        let expected: BTreeSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(value, PrefValue::StringSet(expected));
        assert_eq!(
            parse_value(PrefType::StringSet, "").unwrap(),
            PrefValue::StringSet(BTreeSet::new())
        );
    }

    #[test]
    fn parses_base64_bytes() {
        assert_eq!(
            parse_value(PrefType::Bytes, "AQID").unwrap(),
            PrefValue::Bytes(vec![1, 2, 3])
        );
        assert!(parse_value(PrefType::Bytes, "not base64!").is_err());
    }

    #[test]
    fn set_command_checks_type_name() {
        assert!(matches!(
            Command::set("x", "decimal", "1"),
            Err(Error::UnknownType { .. })
        ));
        assert_eq!(
            Command::set("x", "string", " padded ").unwrap(),
            Command::Set {
                name: "x".to_string(),
                value: PrefValue::String(" padded ".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn set_then_get_and_list() {
        let store = InMemoryPrefStore::new();
        execute(&store, Command::set("volume", "int", "7").unwrap())
            .await
            .unwrap();

        let shown = execute(
            &store,
            Command::Get {
                name: "volume".to_string(),
            },
        )
        .await
        .unwrap();
        assert!(shown.contains("volume"));
        assert!(shown.contains('7'));

        let listed = execute(&store, Command::List).await.unwrap();
        assert!(listed.contains("1 preference(s)"));
    }

    #[tokio::test]
    async fn remove_reports_missing_entries() {
        let store = InMemoryPrefStore::with_data(Preferences::from_entries(btree! {
            "theme".to_string() => PrefValue::String("Dark".to_string()),
        }));

        let out = execute(
            &store,
            Command::Remove {
                name: "theme".to_string(),
            },
        )
        .await
        .unwrap();
        assert!(out.contains("removed"));
        assert!(store.snapshot().is_empty());

        let out = execute(
            &store,
            Command::Remove {
                name: "theme".to_string(),
            },
        )
        .await
        .unwrap();
        assert!(out.contains("not set"));
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let store = InMemoryPrefStore::new();
        let err = execute(&store, Command::set("", "bool", "true").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidKey { .. }));
    }
}
