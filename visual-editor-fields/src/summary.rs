//! Entity context summary.
//!
//! Builds a flat manifest of every bindable field that currently holds data,
//! expanding into list items, for consumers that need to know what an entity
//! contains rather than how a component should bind to it.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::filter::{EntityFieldFilter, FieldFilter, ResolvedField};
use crate::resolver::value_at_path;
use crate::types::StreamFields;
use crate::walker::is_strict_subpath;

/// One populated field in an [`EntityContext`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContextField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    pub is_list: bool,
    pub value: Value,
}

/// Populated fields of an entity, sorted by path.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntityContext {
    pub fields: Vec<ContextField>,
}

impl EntityContext {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ContextField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Summarize `record` against the schema in `stream`.
pub fn summarize(stream: &StreamFields, record: &Value, filter: &FieldFilter) -> EntityContext {
    let collected = collect_all(stream, filter);

    let rich_text: Vec<&str> = collected
        .values()
        .filter(|field| filter.policy().is_rich_text(field.type_tag()))
        .map(|field| field.path.as_str())
        .collect();

    let mut fields: Vec<ContextField> = collected
        .values()
        .filter(|field| {
            !rich_text
                .iter()
                .any(|ancestor| is_strict_subpath(&field.path, ancestor))
        })
        .filter_map(|field| {
            let value = value_at_path(record, &field.path).filter(|v| has_data(v))?;
            Some(ContextField {
                name: field.path.clone(),
                type_tag: field.type_tag().unwrap_or_default().to_string(),
                is_list: field.is_list(),
                value: value.clone(),
            })
        })
        .collect();

    fields.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(
        candidates = collected.len(),
        populated = fields.len(),
        "summarized entity context"
    );
    EntityContext { fields }
}

/// Every field reachable from the roots, including inside list items, keyed
/// by path with the first sighting kept.
fn collect_all<'a>(
    stream: &'a StreamFields,
    filter: &FieldFilter,
) -> IndexMap<String, ResolvedField<'a>> {
    let mut collected: IndexMap<String, ResolvedField<'a>> = IndexMap::new();
    let mut pending: VecDeque<String> = VecDeque::new();
    let mut visited: HashSet<String> = HashSet::new();

    let mut absorb = |fields: Vec<ResolvedField<'a>>,
                      collected: &mut IndexMap<String, ResolvedField<'a>>,
                      pending: &mut VecDeque<String>| {
        for field in fields {
            if field.is_list() && visited.insert(field.path.clone()) {
                pending.push_back(field.path.clone());
            }
            collected.entry(field.path.clone()).or_insert(field);
        }
    };

    let objects = filter.collect_fields(stream, &EntityFieldFilter::new());
    let lists = filter.collect_fields(stream, &EntityFieldFilter::new().lists_only());
    absorb(objects, &mut collected, &mut pending);
    absorb(lists, &mut collected, &mut pending);

    while let Some(parent) = pending.pop_front() {
        let scope = EntityFieldFilter::new().children_of(parent.as_str());
        let children = filter.collect_fields(stream, &scope);
        let nested_lists = filter.collect_fields(stream, &scope.lists_only());
        absorb(children, &mut collected, &mut pending);
        absorb(nested_lists, &mut collected, &mut pending);
    }

    collected
}

/// Whether a value is worth reporting.
fn has_data(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}
