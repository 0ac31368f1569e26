//! Outbound request preparation for the page-building assistant.

use serde_json::{Map, Value};
use tracing::debug;

use crate::filter::FieldFilter;
use crate::summary::summarize;
use crate::types::StreamFields;

/// Fixed instruction sent with every assistant request.
pub const SYSTEM_PROMPT: &str = "You are building a page for a single entity. \
Each request includes an entityContext listing the entity's populated fields by dot path, \
with their type and current value. Prefer binding component content to these fields \
over writing new copy, and only use components present in the provided configuration.";

/// Everything an assistant request is prepared from.
#[derive(Debug, Clone)]
pub struct AssistantContext<'a> {
    pub stream: &'a StreamFields,
    pub record: &'a Value,
    pub allowed_components: Vec<String>,
}

impl<'a> AssistantContext<'a> {
    pub fn new(stream: &'a StreamFields, record: &'a Value) -> Self {
        Self {
            stream,
            record,
            allowed_components: Vec::new(),
        }
    }

    pub fn allow_components<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_components = names.into_iter().map(Into::into).collect();
        self
    }
}

/// Attach the system prompt and entity context to `body`, and reduce
/// `config.components` to the allowed component names.
///
/// A body that is not a JSON object is replaced by one. A body without
/// `config` is left without one.
pub fn prepare_assistant_request(
    body: Value,
    context: &AssistantContext<'_>,
    filter: &FieldFilter,
) -> Value {
    let mut body = match body {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let entity_context = summarize(context.stream, context.record, filter);
    debug!(fields = entity_context.fields.len(), "prepared assistant entity context");

    body.insert("systemPrompt".into(), Value::String(SYSTEM_PROMPT.into()));
    body.insert(
        "entityContext".into(),
        serde_json::to_value(&entity_context).unwrap_or(Value::Null),
    );

    if let Some(components) = body
        .get_mut("config")
        .and_then(|config| config.get_mut("components"))
        .and_then(Value::as_object_mut)
    {
        let before = components.len();
        components.retain(|name, _| context.allowed_components.iter().any(|a| a == name));
        debug!(
            kept = components.len(),
            dropped = before - components.len(),
            "filtered assistant components"
        );
    }

    Value::Object(body)
}
