//! Schema tree walker.
//!
//! Flattens a schema field and its descendants into dot-joined paths in
//! pre-order, stopping at terminal types and, unless asked otherwise, at
//! list fields.

use crate::policy::{FieldPolicy, NodeKind};
use crate::types::SchemaField;

/// A schema node together with its full path from the schema root.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPath<'a> {
    pub path: String,
    pub field: &'a SchemaField,
}

/// Join a parent path and a local name.
pub fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Walk `field` and every reachable descendant.
///
/// The node itself always comes first. Terminal types never descend; list
/// fields descend only when `include_list_children` is set.
pub fn walk<'a>(
    field: &'a SchemaField,
    include_list_children: bool,
    prefix: &str,
    policy: &FieldPolicy,
) -> Vec<FieldPath<'a>> {
    let mut out = Vec::new();
    walk_into(&mut out, field, include_list_children, prefix, policy);
    out
}

fn walk_into<'a>(
    out: &mut Vec<FieldPath<'a>>,
    field: &'a SchemaField,
    include_list_children: bool,
    prefix: &str,
    policy: &FieldPolicy,
) {
    let path = join_path(prefix, &field.name);

    let children = match policy.classify(field) {
        NodeKind::Terminal | NodeKind::Scalar => &[][..],
        NodeKind::List(_) if !include_list_children => &[][..],
        NodeKind::List(children) | NodeKind::Object(children) => children,
    };

    out.push(FieldPath {
        path: path.clone(),
        field,
    });
    for child in children {
        walk_into(out, child, include_list_children, &path, policy);
    }
}

/// Whether `path` lies strictly below `ancestor`.
pub fn is_strict_subpath(path: &str, ancestor: &str) -> bool {
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'.'
}
