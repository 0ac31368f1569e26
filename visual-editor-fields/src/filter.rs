//! Field filter engine.
//!
//! Turns a stream schema into the list of field paths a component may bind
//! to, given the component's `EntityFieldFilter`. The pipeline runs in a
//! fixed order: reserved roots, allow/disallow lists, expansion through the
//! walker, direct-children scoping, type tags, list exactness, and finally
//! display-name decoration.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::policy::FieldPolicy;
use crate::types::{SchemaField, StreamFields};
use crate::walker::{walk, FieldPath};

/// Root-name scoping. Allow and disallow lists are exclusive by construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum NameFilter {
    AllowList(Vec<String>),
    DisallowList(Vec<String>),
}

/// What kind of field a component accepts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntityFieldFilter {
    /// Accepted type tags, OR-ed together.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    /// Return only list fields when set, only non-list fields otherwise.
    #[serde(default)]
    pub include_lists_only: bool,
    /// Restrict to the immediate children of this path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_children_of: Option<String>,
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub names: Option<NameFilter>,
}

impl EntityFieldFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn lists_only(mut self) -> Self {
        self.include_lists_only = true;
        self
    }

    pub fn children_of(mut self, path: impl Into<String>) -> Self {
        self.direct_children_of = Some(path.into());
        self
    }

    pub fn allow<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = Some(NameFilter::AllowList(
            names.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn disallow<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = Some(NameFilter::DisallowList(
            names.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// The direct-children scope, ignoring an empty path.
    fn parent_scope(&self) -> Option<&str> {
        self.direct_children_of
            .as_deref()
            .filter(|parent| !parent.is_empty())
    }
}

/// A candidate field path returned by the filter engine.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedField<'a> {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "schemaField")]
    pub field: &'a SchemaField,
}

impl ResolvedField<'_> {
    pub fn type_tag(&self) -> Option<&str> {
        self.field.type_tag()
    }

    pub fn is_list(&self) -> bool {
        self.field.is_list()
    }

    /// The label a selector shows for this field.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.path)
    }
}

/// Runs the filter pipeline under a fixed `FieldPolicy`.
#[derive(Debug, Clone, Default)]
pub struct FieldFilter {
    policy: FieldPolicy,
}

impl FieldFilter {
    pub fn new(policy: FieldPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FieldPolicy {
        &self.policy
    }

    /// Filter `stream` down to the paths matching `criteria`.
    ///
    /// When `direct_children_of` names a parent with no matching children, the
    /// parent itself is returned instead, provided it is a list of an accepted
    /// type.
    pub fn filter<'a>(
        &self,
        stream: &'a StreamFields,
        criteria: &EntityFieldFilter,
    ) -> Vec<ResolvedField<'a>> {
        let fields = self.collect_fields(stream, criteria);
        match criteria.parent_scope() {
            Some(parent) if fields.is_empty() => {
                debug!(parent = %parent, "no direct children matched, offering the list parent");
                let rescue = EntityFieldFilter {
                    types: criteria.types.clone(),
                    include_lists_only: true,
                    direct_children_of: None,
                    names: Some(NameFilter::AllowList(vec![parent.to_string()])),
                };
                self.collect_fields(stream, &rescue)
            }
            _ => fields,
        }
    }

    /// [`filter`](Self::filter) ordered for display: by label, compared
    /// case-insensitively.
    pub fn fields_for_selector<'a>(
        &self,
        stream: &'a StreamFields,
        criteria: &EntityFieldFilter,
    ) -> Vec<ResolvedField<'a>> {
        let mut fields = self.filter(stream, criteria);
        fields.sort_by_cached_key(|field| field.label().to_uppercase());
        fields
    }

    /// The filter pipeline without the list-parent fallback.
    pub fn collect_fields<'a>(
        &self,
        stream: &'a StreamFields,
        criteria: &EntityFieldFilter,
    ) -> Vec<ResolvedField<'a>> {
        let roots = self.scope_roots(stream, criteria);

        let parent = criteria.parent_scope();
        let include_list_children = parent.is_some();
        let mut candidates: Vec<FieldPath<'a>> = roots
            .into_iter()
            .flat_map(|root| walk(root, include_list_children, "", &self.policy))
            .collect();
        trace!(count = candidates.len(), "expanded schema fields");

        if let Some(parent) = parent {
            candidates.retain(|candidate| is_direct_child(&candidate.path, parent));
        }

        if let Some(types) = &criteria.types {
            candidates = retain_types(candidates, types);
        }

        candidates.retain(|candidate| candidate.field.is_list() == criteria.include_lists_only);

        debug!(
            count = candidates.len(),
            lists = criteria.include_lists_only,
            "filtered entity fields"
        );

        candidates
            .into_iter()
            .map(|candidate| {
                // The side table, when present, replaces node labels entirely.
                let display_name = match &stream.display_names {
                    Some(_) => stream.display_name(&candidate.path),
                    None => candidate.field.display_name.as_deref(),
                };
                ResolvedField {
                    display_name: display_name.map(str::to_string),
                    path: candidate.path,
                    field: candidate.field,
                }
            })
            .collect()
    }

    /// Root fields surviving the reserved set and the name filter.
    fn scope_roots<'a>(
        &self,
        stream: &'a StreamFields,
        criteria: &EntityFieldFilter,
    ) -> Vec<&'a SchemaField> {
        let mut roots: Vec<&SchemaField> = stream
            .fields
            .iter()
            .filter(|field| !self.policy.is_reserved(&field.name))
            .collect();

        match &criteria.names {
            Some(NameFilter::AllowList(allowed)) => {
                for name in allowed {
                    if !roots.iter().any(|root| &root.name == name) {
                        warn!(
                            field = %name,
                            "the entity field filter allowList included {name}, which does not exist in the stream"
                        );
                    }
                }
                roots.retain(|root| allowed.contains(&root.name));
            }
            Some(NameFilter::DisallowList(disallowed)) => {
                roots.retain(|root| !disallowed.contains(&root.name));
            }
            None => {}
        }

        roots
    }
}

/// Whether `path` is exactly one segment below `parent`.
fn is_direct_child(path: &str, parent: &str) -> bool {
    path.strip_prefix(parent)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|rest| !rest.is_empty() && !rest.contains('.'))
}

/// Keep candidates whose type tag is requested, grouped in request order.
fn retain_types<'a>(candidates: Vec<FieldPath<'a>>, types: &[String]) -> Vec<FieldPath<'a>> {
    let mut by_type: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, candidate) in candidates.iter().enumerate() {
        if let Some(tag) = candidate.field.type_tag() {
            by_type.entry(tag).or_default().push(idx);
        }
    }

    let mut keep = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for requested in types {
        if !seen.insert(requested.as_str()) {
            continue;
        }
        if let Some(indexes) = by_type.get(requested.as_str()) {
            keep.extend(indexes.iter().copied());
        }
    }

    let mut slots: Vec<Option<FieldPath<'a>>> = candidates.into_iter().map(Some).collect();
    keep.into_iter().filter_map(|idx| slots[idx].take()).collect()
}
