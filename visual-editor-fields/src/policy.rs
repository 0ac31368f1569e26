//! Policy tables that shape traversal and filtering.
//!
//! Which root fields are reserved, which type tags hide their internals, and
//! which tag denotes rich text are data, not code. The walker and the filter
//! engine consult a `FieldPolicy` instead of hardcoding them.

use serde::{Deserialize, Serialize};

use crate::types::{type_tags, SchemaField};

/// Root field names that are never offered for binding.
pub const DEFAULT_RESERVED_FIELDS: &[&str] = &["uid", "meta", "slug"];

/// Type tags whose children are never exposed as separate paths.
pub const DEFAULT_TERMINAL_TYPES: &[&str] = &[type_tags::HOURS];

/// Type tags treated as rich text.
pub const DEFAULT_RICH_TEXT_TYPES: &[&str] = &[type_tags::RICH_TEXT_V2];

/// How a schema node is treated during traversal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind<'a> {
    /// Composite type whose structure stays opaque.
    Terminal,
    /// Repeated field; children describe one item.
    List(&'a [SchemaField]),
    /// Record-shaped field with child slots.
    Object(&'a [SchemaField]),
    /// Leaf value.
    Scalar,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldPolicy {
    pub reserved_fields: Vec<String>,
    pub terminal_types: Vec<String>,
    pub rich_text_types: Vec<String>,
}

impl Default for FieldPolicy {
    fn default() -> Self {
        Self {
            reserved_fields: to_owned(DEFAULT_RESERVED_FIELDS),
            terminal_types: to_owned(DEFAULT_TERMINAL_TYPES),
            rich_text_types: to_owned(DEFAULT_RICH_TEXT_TYPES),
        }
    }
}

impl FieldPolicy {
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_fields.iter().any(|r| r == name)
    }

    pub fn is_terminal(&self, type_tag: Option<&str>) -> bool {
        type_tag.is_some_and(|tag| self.terminal_types.iter().any(|t| t == tag))
    }

    pub fn is_rich_text(&self, type_tag: Option<&str>) -> bool {
        type_tag.is_some_and(|tag| self.rich_text_types.iter().any(|t| t == tag))
    }

    /// Classify a node. Terminal types win over list-ness.
    pub fn classify<'a>(&self, field: &'a SchemaField) -> NodeKind<'a> {
        if self.is_terminal(field.type_tag()) {
            return NodeKind::Terminal;
        }
        let children = field.children();
        if field.is_list() {
            NodeKind::List(children)
        } else if children.is_empty() {
            NodeKind::Scalar
        } else {
            NodeKind::Object(children)
        }
    }
}

fn to_owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_tables() {
        let policy = FieldPolicy::default();
        assert!(policy.is_reserved("uid"));
        assert!(policy.is_reserved("slug"));
        assert!(!policy.is_reserved("name"));
        assert!(policy.is_terminal(Some("type.hours")));
        assert!(!policy.is_terminal(None));
        assert!(policy.is_rich_text(Some("type.rich_text_v2")));
    }

    #[test]
    fn classify_terminal_beats_list() {
        let policy = FieldPolicy::default();
        let hours = SchemaField::new("hours", type_tags::HOURS)
            .list()
            .with_children(vec![SchemaField::new("monday", "type.day_hour")]);
        assert_eq!(policy.classify(&hours), NodeKind::Terminal);
    }

    #[test]
    fn classify_list_object_scalar() {
        let policy = FieldPolicy::default();
        let items = SchemaField::new("items", "c_item")
            .list()
            .with_children(vec![SchemaField::new("title", type_tags::STRING)]);
        assert!(matches!(policy.classify(&items), NodeKind::List(c) if c.len() == 1));

        let address = SchemaField::new("address", type_tags::ADDRESS)
            .with_children(vec![SchemaField::new("city", type_tags::STRING)]);
        assert!(matches!(policy.classify(&address), NodeKind::Object(_)));

        let name = SchemaField::new("name", type_tags::STRING);
        assert_eq!(policy.classify(&name), NodeKind::Scalar);
    }

    #[test]
    fn custom_terminal_types() {
        let policy = FieldPolicy {
            terminal_types: vec!["type.address".into()],
            ..FieldPolicy::default()
        };
        let address = SchemaField::new("address", type_tags::ADDRESS)
            .with_children(vec![SchemaField::new("city", type_tags::STRING)]);
        assert_eq!(policy.classify(&address), NodeKind::Terminal);
    }
}
