//! Core schema and binding types.
//!
//! `SchemaField` mirrors the stream schema a content platform publishes for an
//! entity type: named, typed slots that may nest further slots. `EntityField`
//! is the persisted choice a component makes about what it renders: a live
//! path into the entity record, or a constant authored in the editor.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Well-known effective type tags.
pub mod type_tags {
    pub const STRING: &str = "type.string";
    pub const HOURS: &str = "type.hours";
    pub const ADDRESS: &str = "type.address";
    pub const COORDINATE: &str = "type.coordinate";
    pub const CTA: &str = "type.cta";
    pub const RICH_TEXT_V2: &str = "type.rich_text_v2";
}

/// The structural definition of a schema field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub is_list: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_registry_id: Option<String>,
    /// Primitive type descriptor, e.g. `{ "stringType": "STRING_TYPE_HTML" }`.
    #[serde(default, rename = "type")]
    pub type_: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_id: Option<String>,
}

impl FieldDefinition {
    /// The effective type tag: `typeName`, else `typeRegistryId`, else the
    /// first value of the primitive `type` map. Empty strings do not count.
    pub fn type_tag(&self) -> Option<&str> {
        self.type_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.type_registry_id.as_deref().filter(|s| !s.is_empty()))
            .or_else(|| self.type_.values().next().map(String::as_str))
    }
}

/// Child slots of an object-shaped schema field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SchemaChildren {
    #[serde(default)]
    pub fields: Vec<SchemaField>,
}

/// One addressable slot in an entity schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub definition: FieldDefinition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<SchemaChildren>,
}

impl SchemaField {
    /// A scalar field with the given name and `typeName`.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            definition: FieldDefinition {
                name: Some(name.clone()),
                type_name: Some(type_name.into()),
                ..FieldDefinition::default()
            },
            name,
            display_name: None,
            children: None,
        }
    }

    /// Mark this field as a list.
    pub fn list(mut self) -> Self {
        self.definition.is_list = true;
        self
    }

    /// Attach child fields.
    pub fn with_children(mut self, fields: Vec<SchemaField>) -> Self {
        self.children = Some(SchemaChildren { fields });
        self
    }

    pub fn type_tag(&self) -> Option<&str> {
        self.definition.type_tag()
    }

    pub fn is_list(&self) -> bool {
        self.definition.is_list
    }

    /// Child fields in declaration order; empty for scalar fields.
    pub fn children(&self) -> &[SchemaField] {
        self.children
            .as_ref()
            .map(|c| c.fields.as_slice())
            .unwrap_or(&[])
    }
}

/// The root of an entity schema as published by a stream, plus the
/// display-name side table keyed by full field path.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StreamFields {
    #[serde(default)]
    pub fields: Vec<SchemaField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_names: Option<HashMap<String, String>>,
}

impl StreamFields {
    pub fn new(fields: Vec<SchemaField>) -> Self {
        Self {
            fields,
            display_names: None,
        }
    }

    /// Attach a display name for a full field path.
    pub fn with_display_name(mut self, path: impl Into<String>, name: impl Into<String>) -> Self {
        self.display_names
            .get_or_insert_with(HashMap::new)
            .insert(path.into(), name.into());
        self
    }

    pub fn display_name(&self, path: &str) -> Option<&str> {
        self.display_names
            .as_ref()
            .and_then(|names| names.get(path))
            .map(String::as_str)
    }
}

/// A bound field descriptor, persisted as part of a component's props.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntityField<T> {
    #[serde(default)]
    pub field: String,
    pub constant_value: T,
    #[serde(default)]
    pub constant_value_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disallow_translation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_type: Option<String>,
}

/// Where a descriptor takes its value from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding<'a, T> {
    Constant(&'a T),
    LivePath(&'a str),
}

impl<T> EntityField<T> {
    /// A descriptor bound to a record path, with `fallback` kept as the
    /// authored constant.
    pub fn live(path: impl Into<String>, fallback: T) -> Self {
        Self {
            field: path.into(),
            constant_value: fallback,
            constant_value_enabled: false,
            disallow_translation: None,
            selected_type: None,
        }
    }

    /// A descriptor that always renders `value`.
    pub fn constant(value: T) -> Self {
        Self {
            field: String::new(),
            constant_value: value,
            constant_value_enabled: true,
            disallow_translation: None,
            selected_type: None,
        }
    }

    pub fn binding(&self) -> Binding<'_, T> {
        if self.constant_value_enabled {
            Binding::Constant(&self.constant_value)
        } else {
            Binding::LivePath(&self.field)
        }
    }
}
