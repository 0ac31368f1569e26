//! Locale-keyed values and rich text.
//!
//! A translatable value is either plain content or an object of the form
//! `{ "hasLocalizedValue": "true", "en": ..., "fr": ... }`. Rich text carries
//! an `html` rendering and/or a structured `json` form, either directly or
//! under each locale key.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

/// Key marking an object as locale-keyed.
pub const LOCALIZED_MARKER: &str = "hasLocalizedValue";

/// Locale used when nothing else is configured.
pub const DEFAULT_LOCALE: &str = "en";

/// A rich text value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RichText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<String>,
}

impl RichText {
    /// `html` when non-empty, else `json`, else empty.
    pub fn as_display_string(&self) -> &str {
        [self.html.as_deref(), self.json.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }
}

/// Whether `value` is a locale-keyed object.
pub fn is_localized(value: &Value) -> bool {
    value
        .get(LOCALIZED_MARKER)
        .and_then(Value::as_str)
        .is_some_and(|flag| flag == "true")
}

/// Whether `value` looks like rich text.
pub fn is_rich_text(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.contains_key("html") || obj.contains_key("json"))
}

fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Picks the content of a translatable value for a requested locale.
///
/// Lookup order is the requested locale, then the default locale, then the
/// first locale carrying content in declaration order. Plain values pass
/// through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Localizer {
    default_locale: String,
}

impl Default for Localizer {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

impl Localizer {
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
        }
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Content of `value` for `locale`, or `None` if no locale has any.
    pub fn localize<'v>(&self, value: &'v Value, locale: &str) -> Option<&'v Value> {
        if !is_localized(value) {
            return Some(value);
        }
        let map = value.as_object()?;

        if let Some(found) = map.get(locale).filter(|v| has_content(v)) {
            return Some(found);
        }
        if let Some(found) = map.get(&self.default_locale).filter(|v| has_content(v)) {
            trace!(locale = %locale, fallback = %self.default_locale, "using default locale");
            return Some(found);
        }
        let found = map
            .iter()
            .filter(|(key, _)| key.as_str() != LOCALIZED_MARKER)
            .find(|(_, v)| has_content(v));
        if let Some((key, _)) = found {
            trace!(locale = %locale, fallback = %key, "using first available locale");
        }
        found.map(|(_, v)| v)
    }

    /// Replace every locale-keyed value nested anywhere in `value` with its
    /// localized content. Locale-keyed values with no content become `null`.
    pub fn localize_all(&self, value: &Value, locale: &str) -> Value {
        if is_localized(value) {
            return self
                .localize(value, locale)
                .map(|inner| self.localize_all(inner, locale))
                .unwrap_or(Value::Null);
        }
        match value {
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.localize_all(item, locale))
                    .collect(),
            ),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, item)| (key.clone(), self.localize_all(item, locale)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Localized content of a translatable string; empty when absent.
    pub fn resolve_string(&self, value: &Value, locale: &str) -> String {
        match self.localize(value, locale) {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        }
    }

    /// Localized content of translatable rich text. A plain string becomes
    /// rich text with that string as its `html`.
    pub fn resolve_rich_text(&self, value: &Value, locale: &str) -> Option<RichText> {
        match self.localize(value, locale)? {
            Value::String(s) => Some(RichText {
                html: Some(s.clone()),
                json: None,
            }),
            other if is_rich_text(other) => serde_json::from_value(other.clone()).ok(),
            _ => None,
        }
    }
}

/// The string an editor input shows for a translatable string or rich text.
///
/// Exact-locale only: editors show what is stored for the active locale, not
/// a fallback.
pub fn display_value(value: &Value, locale: &str) -> String {
    fn render(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            v if is_rich_text(v) => serde_json::from_value::<RichText>(v.clone())
                .ok()
                .map(|rt| rt.as_display_string().to_string()),
            _ => None,
        }
    }

    if let Some(rendered) = render(value) {
        return rendered;
    }
    value.get(locale).and_then(render).unwrap_or_default()
}

/// The locales a record should be rendered in.
///
/// Collects `record.locale`, the template's locales, and the locales in the
/// record's JSON-encoded `_pageset.scope.locales`, de-duplicated in that
/// order. Falls back to `["en"]`.
pub fn resolve_locales(record: &Value, template_locales: &[String]) -> Vec<String> {
    let mut locales: Vec<String> = Vec::new();
    let mut add = |locale: &str| {
        if !locale.is_empty() && !locales.iter().any(|l| l == locale) {
            locales.push(locale.to_string());
        }
    };

    if let Some(locale) = record.get("locale").and_then(Value::as_str) {
        add(locale);
    }
    for locale in template_locales {
        add(locale.as_str());
    }
    if let Some(pageset) = record.get("_pageset").and_then(Value::as_str) {
        match serde_json::from_str::<Value>(pageset) {
            Ok(parsed) => {
                let scoped = parsed
                    .pointer("/scope/locales")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                    .filter_map(Value::as_str);
                for locale in scoped {
                    add(locale);
                }
            }
            Err(e) => trace!(%e, "ignoring unparsable _pageset"),
        }
    }

    if locales.is_empty() {
        locales.push(DEFAULT_LOCALE.to_string());
    }
    locales
}
