//! Entity value resolution.
//!
//! Turns a bound `EntityField` plus the current entity record into the value a
//! component renders. Constant and live-path bindings resolve through the same
//! locale fallback, and nothing here fails: a missing path, locale, or shape
//! mismatch resolves to `None`.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::translatable::{is_localized, Localizer};
use crate::types::{Binding, EntityField};

/// `[[path]]` tokens embedded in authored text.
static EMBEDDED_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[\s*([^\[\]]+?)\s*\]\]").expect("embedded field pattern is valid")
});

/// Dereference a dot-joined `path` in `record`.
///
/// Array segments may be numeric indexes. Any missing step yields `None`, as
/// does an empty path.
pub fn value_at_path<'v>(record: &'v Value, path: &str) -> Option<&'v Value> {
    if path.is_empty() {
        return None;
    }
    path.split('.').try_fold(record, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Resolves bound field descriptors against entity records.
#[derive(Debug, Clone, Default)]
pub struct EntityResolver {
    localizer: Localizer,
}

impl EntityResolver {
    pub fn new(localizer: Localizer) -> Self {
        Self { localizer }
    }

    pub fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    /// Resolve `descriptor` to the value to render for `locale`.
    ///
    /// A constant binding returns its constant; a live binding dereferences
    /// its path in `record`. Either way a locale-keyed result is narrowed to
    /// one locale's content.
    pub fn resolve_value<T: Serialize>(
        &self,
        descriptor: &EntityField<T>,
        record: &Value,
        locale: &str,
    ) -> Option<Value> {
        let raw = self.bound_value(descriptor, record)?;
        if is_localized(&raw) {
            self.localizer.localize(&raw, locale).cloned()
        } else {
            Some(raw)
        }
    }

    /// [`resolve_value`](Self::resolve_value) deserialized into `R`. A value of
    /// the wrong shape resolves to `None`.
    pub fn resolve<T: Serialize, R: DeserializeOwned>(
        &self,
        descriptor: &EntityField<T>,
        record: &Value,
        locale: &str,
    ) -> Option<R> {
        let value = self.resolve_value(descriptor, record, locale)?;
        match serde_json::from_value(value) {
            Ok(resolved) => Some(resolved),
            Err(e) => {
                debug!(field = %descriptor.field, %e, "resolved value has unexpected shape");
                None
            }
        }
    }

    /// Resolve a descriptor that addresses a field inside one list item.
    ///
    /// `parent` is the item. The last path segment names the key to read;
    /// when the item is not an object it is returned whole, provided it has
    /// the descriptor's value type.
    pub fn resolve_subfield<T: Serialize + DeserializeOwned>(
        &self,
        parent: &Value,
        descriptor: &EntityField<T>,
    ) -> Option<Value> {
        let path = match descriptor.binding() {
            Binding::Constant(value) => return serde_json::to_value(value).ok(),
            Binding::LivePath(path) => path,
        };

        let mut segments = path.rsplit('.');
        let key = segments.next().filter(|key| !key.is_empty())?;
        segments.next()?;

        match parent {
            Value::Object(map) => map.get(key).cloned(),
            other => serde_json::from_value::<T>(other.clone())
                .ok()
                .map(|_| other.clone()),
        }
    }

    /// Resolve `descriptor` for display, the way a component renders its prop.
    ///
    /// With a record, live paths are dereferenced and `[[path]]` tokens in
    /// constants are filled from the record. Without one, only the constant
    /// can be used. Every locale-keyed value in the result, however deeply
    /// nested, is narrowed to `locale`.
    pub fn resolve_component_data<T: Serialize>(
        &self,
        descriptor: &EntityField<T>,
        record: Option<&Value>,
        locale: &str,
    ) -> Option<Value> {
        let raw = match record {
            Some(record) => match descriptor.binding() {
                Binding::Constant(value) => {
                    let value = serde_json::to_value(value).ok()?;
                    self.embed_fields(&value, record, locale)
                }
                Binding::LivePath(path) => value_at_path(record, path)?.clone(),
            },
            None => serde_json::to_value(&descriptor.constant_value).ok()?,
        };
        Some(self.localizer.localize_all(&raw, locale))
    }

    /// Resolve a translatable value that is not behind a descriptor.
    pub fn resolve_translatable(&self, value: &Value, record: Option<&Value>, locale: &str) -> Value {
        match record {
            Some(record) => {
                let embedded = self.embed_fields(value, record, locale);
                self.localizer.localize_all(&embedded, locale)
            }
            None => self.localizer.localize_all(value, locale),
        }
    }

    /// Replace `[[path]]` tokens in `text` with values from `record`.
    ///
    /// Strings are inserted verbatim, other values as compact JSON, and
    /// missing paths as the empty string.
    pub fn interpolate(&self, text: &str, record: &Value, locale: &str) -> String {
        EMBEDDED_FIELD
            .replace_all(text, |caps: &Captures<'_>| {
                let path = &caps[1];
                let Some(found) = value_at_path(record, path) else {
                    trace!(path, "embedded field not in record");
                    return String::new();
                };
                match self.localizer.localize(found, locale) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                }
            })
            .into_owned()
    }

    /// Interpolate every string in `value`, leaving structured rich text
    /// (`json` keys) untouched.
    fn embed_fields(&self, value: &Value, record: &Value, locale: &str) -> Value {
        match value {
            Value::String(s) => Value::String(self.interpolate(s, record, locale)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.embed_fields(item, record, locale))
                    .collect(),
            ),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, item)| {
                        let item = if key == "json" {
                            item.clone()
                        } else {
                            self.embed_fields(item, record, locale)
                        };
                        (key.clone(), item)
                    })
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// The raw bound value: the serialized constant, or the record value at
    /// the live path.
    fn bound_value<T: Serialize>(&self, descriptor: &EntityField<T>, record: &Value) -> Option<Value> {
        match descriptor.binding() {
            Binding::Constant(value) => serde_json::to_value(value).ok(),
            Binding::LivePath(path) => value_at_path(record, path).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Value {
        json!({
            "name": "Yext",
            "c_location": "New York",
            "address": { "city": "potato land", "line1": "" },
            "c_description": {
                "hasLocalizedValue": "true",
                "en": "English Description",
                "es": "Descripción en español"
            },
            "c_details": {
                "hasLocalizedValue": "true",
                "en": { "html": "<strong>English</strong> Details" },
                "es": { "html": "<strong>Detalles</strong> en español" }
            },
            "c_complex": { "address": "123 Main St" },
            "c_employees": 500,
            "c_nullField": null,
            "c_services": ["Cleaning", "Repair"]
        })
    }

    #[test]
    fn value_at_path_walks_objects_and_arrays() {
        let record = record();
        assert_eq!(value_at_path(&record, "address.city"), Some(&json!("potato land")));
        assert_eq!(value_at_path(&record, "c_services.1"), Some(&json!("Repair")));
        assert_eq!(value_at_path(&record, "c_services.x"), None);
        assert_eq!(value_at_path(&record, "name.first"), None);
        assert_eq!(value_at_path(&record, ""), None);
    }

    #[test]
    fn resolves_live_path() {
        let resolver = EntityResolver::default();
        let field = EntityField::live("address.city", String::new());
        let city: Option<String> = resolver.resolve(&field, &record(), "en");
        assert_eq!(city.as_deref(), Some("potato land"));
    }

    #[test]
    fn live_path_keeps_empty_record_value() {
        let resolver = EntityResolver::default();
        let field = EntityField::live("address.line1", "abc".to_string());
        assert_eq!(resolver.resolve_value(&field, &record(), "en"), Some(json!("")));
    }

    #[test]
    fn missing_path_is_none() {
        let resolver = EntityResolver::default();
        let field = EntityField::live("address.zip", "City".to_string());
        assert_eq!(resolver.resolve_value(&field, &record(), "en"), None);
        let empty = EntityField::live("", "City".to_string());
        assert_eq!(resolver.resolve_value(&empty, &record(), "en"), None);
    }

    #[test]
    fn constant_ignores_record() {
        let resolver = EntityResolver::default();
        let field = EntityField::constant("Hi".to_string());
        let resolved: Option<String> = resolver.resolve(&field, &json!({}), "en");
        assert_eq!(resolved.as_deref(), Some("Hi"));
    }

    #[test]
    fn live_translatable_uses_locale() {
        let resolver = EntityResolver::default();
        let field = EntityField::live("c_description", Value::Null);
        assert_eq!(
            resolver.resolve_value(&field, &record(), "es"),
            Some(json!("Descripción en español"))
        );
        assert_eq!(
            resolver.resolve_value(&field, &record(), "fr"),
            Some(json!("English Description"))
        );
    }

    #[test]
    fn constant_translatable_falls_back() {
        let resolver = EntityResolver::new(Localizer::new("en"));
        let field = EntityField::constant(json!({
            "hasLocalizedValue": "true",
            "en": "Hello",
            "es": "Hola"
        }));
        assert_eq!(resolver.resolve_value(&field, &json!({}), "fr"), Some(json!("Hello")));

        let empty = EntityField::constant(json!({ "hasLocalizedValue": "true" }));
        assert_eq!(resolver.resolve_value(&empty, &json!({}), "en"), None);
    }

    #[test]
    fn rich_text_resolves_per_locale() {
        let resolver = EntityResolver::default();
        let field = EntityField::live("c_details", Value::Null);
        assert_eq!(
            resolver.resolve_value(&field, &record(), "es"),
            Some(json!({ "html": "<strong>Detalles</strong> en español" }))
        );
    }

    #[test]
    fn wrong_shape_resolves_to_none() {
        let resolver = EntityResolver::default();
        let field = EntityField::live("c_employees", String::new());
        let resolved: Option<String> = resolver.resolve(&field, &record(), "en");
        assert_eq!(resolved, None);
        let count: Option<u32> = resolver.resolve(&field, &record(), "en");
        assert_eq!(count, Some(500));
    }

    #[test]
    fn null_record_value_is_kept() {
        let resolver = EntityResolver::default();
        let field = EntityField::live("c_nullField", Value::Null);
        assert_eq!(resolver.resolve_value(&field, &record(), "en"), Some(Value::Null));
    }

    #[test]
    fn subfield_constant_and_object_parent() {
        let resolver = EntityResolver::default();
        let item = json!({ "title": "Test Title", "description": "Test Description" });

        let constant = EntityField::constant("Text".to_string());
        assert_eq!(resolver.resolve_subfield(&json!({}), &constant), Some(json!("Text")));

        let field = EntityField::live("c_customSection.items.description", "Text".to_string());
        assert_eq!(
            resolver.resolve_subfield(&item, &field),
            Some(json!("Test Description"))
        );

        let missing = EntityField::live("c_customSection.services.promo", "abc".to_string());
        assert_eq!(resolver.resolve_subfield(&item, &missing), None);
    }

    #[test]
    fn subfield_non_object_parent_checks_type() {
        let resolver = EntityResolver::default();
        let field = EntityField::live("c_customSection.services", "Text".to_string());
        assert_eq!(
            resolver.resolve_subfield(&json!("Example Service"), &field),
            Some(json!("Example Service"))
        );

        let numeric = EntityField::live("c_customSection.services", 123);
        assert_eq!(resolver.resolve_subfield(&json!("abc"), &numeric), None);
    }

    #[test]
    fn subfield_requires_nested_path() {
        let resolver = EntityResolver::default();
        let item = json!({ "title": "Test Title" });
        let empty = EntityField::live("", "Text".to_string());
        assert_eq!(resolver.resolve_subfield(&item, &empty), None);
        let shallow = EntityField::live("c_customSection", "abc".to_string());
        assert_eq!(resolver.resolve_subfield(&item, &shallow), None);
    }

    #[test]
    fn interpolates_embedded_fields() {
        let resolver = EntityResolver::default();
        let record = record();
        assert_eq!(
            resolver.interpolate("Welcome to [[c_location]]!", &record, "en"),
            "Welcome to New York!"
        );
        assert_eq!(
            resolver.interpolate("Data: [[c_complex]]", &record, "en"),
            r#"Data: {"address":"123 Main St"}"#
        );
        assert_eq!(
            resolver.interpolate("[[ c_description ]] / [[nope]]", &record, "es"),
            "Descripción en español / "
        );
    }

    #[test]
    fn component_data_with_record() {
        let resolver = EntityResolver::default();
        let record = record();

        let constant = EntityField::constant(json!({
            "hasLocalizedValue": "true",
            "en": "The city is [[c_location]]."
        }));
        assert_eq!(
            resolver.resolve_component_data(&constant, Some(&record), "en"),
            Some(json!("The city is New York."))
        );

        let rich = EntityField::constant(json!({
            "hasLocalizedValue": "true",
            "en": { "html": "Location: <b>[[c_location]]</b>" }
        }));
        assert_eq!(
            resolver.resolve_component_data(&rich, Some(&record), "en"),
            Some(json!({ "html": "Location: <b>New York</b>" }))
        );

        let live = EntityField::live("c_description", Value::Null);
        assert_eq!(
            resolver.resolve_component_data(&live, Some(&record), "es"),
            Some(json!("Descripción en español"))
        );

        let missing = EntityField::live("nonexistent.path", json!(""));
        assert_eq!(resolver.resolve_component_data(&missing, Some(&record), "en"), None);
    }

    #[test]
    fn component_data_missing_locale_uses_fallback() {
        let resolver = EntityResolver::default();
        let record = record();
        let greeting = EntityField::constant(json!({ "hasLocalizedValue": "true", "en": "Hi" }));
        assert_eq!(
            resolver.resolve_component_data(&greeting, Some(&record), "fr"),
            Some(json!("Hi"))
        );
        assert_eq!(
            resolver.resolve_component_data(&greeting, None, "fr"),
            Some(json!("Hi"))
        );

        let empty = EntityField::constant(json!({ "hasLocalizedValue": "true", "en": "" }));
        assert_eq!(
            resolver.resolve_component_data(&empty, Some(&record), "fr"),
            Some(Value::Null)
        );
    }

    #[test]
    fn component_data_without_record_uses_constant() {
        let resolver = EntityResolver::default();
        let live = EntityField::live("name", json!("constant_value"));
        assert_eq!(
            resolver.resolve_component_data(&live, None, "en"),
            Some(json!("constant_value"))
        );

        let templated = EntityField::constant(json!("Welcome to [[c_location]]!"));
        assert_eq!(
            resolver.resolve_component_data(&templated, None, "en"),
            Some(json!("Welcome to [[c_location]]!"))
        );
    }

    #[test]
    fn translatable_without_descriptor() {
        let resolver = EntityResolver::default();
        let record = record();
        let data = json!({ "hasLocalizedValue": "true", "en": "Direct string with [[name]]" });
        assert_eq!(
            resolver.resolve_translatable(&data, Some(&record), "en"),
            json!("Direct string with Yext")
        );
        assert_eq!(
            resolver.resolve_translatable(&data, None, "en"),
            json!("Direct string with [[name]]")
        );
        assert_eq!(
            resolver.resolve_translatable(&json!("Just a string"), Some(&record), "en"),
            json!("Just a string")
        );
    }
}
