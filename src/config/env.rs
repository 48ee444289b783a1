//! Environment overlay for configuration.
//!
//! # Responsibilities
//! - Map `KERNEL_`-prefixed variables onto the raw TOML table
//! - Read `KERNEL_` lines from a `.env` file
//! - Parse values into booleans, numbers, strings or removals
//!
//! # Design Decisions
//! - `__` separates path segments; segments are lower-cased
//! - A numeric segment indexes an array; indices past the end append
//! - `null` removes the key so the schema default applies
//! - Variables are applied in path order, numeric segments compared as
//!   integers, so `__2` lands before `__10`

use std::cmp::Ordering;
use std::path::Path;

use toml::{Table, Value};

/// Prefix selecting the variables that override configuration.
pub const ENV_PREFIX: &str = "KERNEL_";

/// Apply every `KERNEL_` variable in `vars` to `table`.
pub fn overlay<I>(table: &mut Table, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut overrides: Vec<(Vec<String>, String, String)> = vars
        .into_iter()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .map(|(key, raw)| {
            let path = key[ENV_PREFIX.len()..]
                .split("__")
                .map(str::to_lowercase)
                .collect();
            (path, key, raw)
        })
        .collect();
    overrides.sort_by(|a, b| compare_paths(&a.0, &b.0).then_with(|| a.1.cmp(&b.1)));

    for (path, key, raw) in overrides {
        if path.iter().any(String::is_empty) {
            tracing::warn!(variable = %key, "Ignoring variable with an empty path segment");
            continue;
        }

        tracing::debug!(variable = %key, "Applying environment override");
        let mut root = Value::Table(std::mem::take(table));
        set(&mut root, &path, parse_value(&raw));
        if let Value::Table(updated) = root {
            *table = updated;
        }
    }
}

fn compare_paths(a: &[String], b: &[String]) -> Ordering {
    for (left, right) in a.iter().zip(b) {
        let ordering = match (left.parse::<usize>(), right.parse::<usize>()) {
            (Ok(left), Ok(right)) => left.cmp(&right),
            _ => left.cmp(right),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.len().cmp(&b.len())
}

/// Parse a raw variable value. `None` stands for `null`.
pub fn parse_value(raw: &str) -> Option<Value> {
    let value = raw.trim();
    match value.to_ascii_lowercase().as_str() {
        "true" => return Some(Value::Boolean(true)),
        "false" => return Some(Value::Boolean(false)),
        "null" => return None,
        _ => {}
    }

    if let Ok(integer) = value.parse::<i64>() {
        return Some(Value::Integer(integer));
    }
    if value.contains(['.', 'e', 'E']) {
        if let Some(float) = value.parse::<f64>().ok().filter(|f| f.is_finite()) {
            return Some(Value::Float(float));
        }
    }
    Some(Value::String(value.to_string()))
}

/// Read `KERNEL_` assignments from a `.env` file. A missing file is empty.
pub fn read_dotenv(path: &Path) -> Result<Vec<(String, String)>, dotenvy::Error> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(error) if error.not_found() => return Ok(Vec::new()),
        Err(error) => return Err(error),
    };

    let mut vars = Vec::new();
    for entry in entries {
        let (key, value) = entry?;
        if key.starts_with(ENV_PREFIX) {
            vars.push((key, value));
        }
    }
    Ok(vars)
}

fn set(target: &mut Value, path: &[String], value: Option<Value>) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };

    let index = head.parse::<usize>().ok();
    match (target, index) {
        (Value::Table(map), _) => {
            if rest.is_empty() {
                match value {
                    Some(value) => {
                        map.insert(head.clone(), value);
                    }
                    None => {
                        map.remove(head);
                    }
                }
            } else {
                let child = map
                    .entry(head.clone())
                    .or_insert_with(|| empty_container(&rest[0]));
                set(child, rest, value);
            }
        }
        (Value::Array(items), Some(index)) => {
            if rest.is_empty() {
                match value {
                    Some(value) if index < items.len() => items[index] = value,
                    Some(value) => items.push(value),
                    None if index < items.len() => {
                        items.remove(index);
                    }
                    None => {}
                }
            } else {
                if index >= items.len() {
                    items.push(empty_container(&rest[0]));
                }
                let slot = index.min(items.len() - 1);
                set(&mut items[slot], rest, value);
            }
        }
        (other, _) => {
            *other = empty_container(head);
            set(other, path, value);
        }
    }
}

fn empty_container(segment: &str) -> Value {
    if segment.parse::<usize>().is_ok() {
        Value::Array(Vec::new())
    } else {
        Value::Table(Table::new())
    }
}
