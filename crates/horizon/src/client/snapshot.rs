use std::cmp::Ordering;
use std::path::Path;

use serde_json::{Map, Value};

use avail::snapshot::Entity;

use crate::common::error::error;

/// Top level keys under which PBS `-F json` dumps list their entities.
const SNAPSHOT_SECTIONS: [&str; 4] = ["nodes", "Jobs", "Reservations", "resv"];

/// Loads the entities of a JSON snapshot file.
pub fn load_entities(path: &Path) -> crate::Result<Vec<Entity>> {
    let text = std::fs::read_to_string(path)?;
    parse_entities(&text)
}

/// Parses a JSON snapshot into entities ordered by id.
///
/// The document is either a PBS dump with one of the known sections at the
/// top level, or a plain `id -> attributes` object. Nested attribute objects
/// are flattened into dotted names.
pub fn parse_entities(text: &str) -> crate::Result<Vec<Entity>> {
    let Value::Object(root) = serde_json::from_str::<Value>(text)? else {
        return error("Snapshot has to be a JSON object".to_string());
    };
    let section = SNAPSHOT_SECTIONS
        .iter()
        .find_map(|name| root.get(*name).map(|value| (*name, value)));
    let entries = match section {
        Some((_, Value::Object(entries))) => entries,
        Some((name, _)) => return error(format!("Section `{name}` has to be a JSON object")),
        None => &root,
    };

    let mut entities = Vec::with_capacity(entries.len());
    for (id, attributes) in entries {
        let Value::Object(attributes) = attributes else {
            log::debug!("Ignoring non-object snapshot entry `{id}`");
            continue;
        };
        let mut entity = Entity::new(id.as_str());
        flatten_into(&mut entity, None, attributes);
        entities.push(entity);
    }
    entities.sort_by(|a, b| compare_ids(a.id(), b.id()));
    Ok(entities)
}

fn flatten_into(entity: &mut Entity, prefix: Option<&str>, attributes: &Map<String, Value>) {
    for (name, value) in attributes {
        let name = match prefix {
            Some(prefix) => format!("{prefix}.{name}"),
            None => name.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(entity, Some(&name), nested),
            Value::Null => {}
            value => entity.set(name, scalar_to_string(value)),
        }
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

fn numeric_prefix(id: &str) -> Option<u64> {
    let end = id
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(id.len());
    id[..end].parse().ok()
}

/// Job ids like `12.server` order by their sequence number first.
fn compare_ids(a: &str, b: &str) -> Ordering {
    numeric_prefix(a)
        .cmp(&numeric_prefix(b))
        .then_with(|| a.cmp(b))
}
