//! Command handlers. Each returns the document to print.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use visual_editor_fields::{
    load_document, resolve_locales, summarize, EngineConfig, EntityField, EntityFieldFilter,
    ResolvedField, StreamFields,
};

use crate::cli::{Commands, OutputFormat};

/// One row of `filter` output.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldRow {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,
    pub is_list: bool,
}

impl From<ResolvedField<'_>> for FieldRow {
    fn from(field: ResolvedField<'_>) -> Self {
        Self {
            type_tag: field.type_tag().map(str::to_string),
            is_list: field.is_list(),
            display_name: field.display_name,
            path: field.path,
        }
    }
}

/// Run `command` and return its result as a JSON value.
pub fn run(command: &Commands, config: &EngineConfig) -> Result<Value> {
    match command {
        Commands::Filter {
            schema,
            criteria,
            selector,
        } => {
            let stream: StreamFields = load_document(schema)
                .with_context(|| format!("failed to load schema {}", schema.display()))?;
            let criteria: EntityFieldFilter =
                serde_json::from_str(criteria).context("invalid filter criteria")?;
            let filter = config.field_filter();
            let fields = if *selector {
                filter.fields_for_selector(&stream, &criteria)
            } else {
                filter.filter(&stream, &criteria)
            };
            debug!(count = fields.len(), "filter complete");
            let rows: Vec<FieldRow> = fields.into_iter().map(FieldRow::from).collect();
            Ok(serde_json::to_value(rows)?)
        }
        Commands::Resolve {
            record,
            descriptor,
            locale,
            render,
        } => {
            let record: Value = load_document(record)
                .with_context(|| format!("failed to load record {}", record.display()))?;
            let descriptor: EntityField<Value> =
                serde_json::from_str(descriptor).context("invalid field descriptor")?;
            let locale = locale.as_deref().unwrap_or(config.default_locale.as_str());
            let resolver = config.resolver();
            let resolved = if *render {
                resolver.resolve_component_data(&descriptor, Some(&record), locale)
            } else {
                resolver.resolve_value(&descriptor, &record, locale)
            };
            Ok(resolved.unwrap_or(Value::Null))
        }
        Commands::Summarize { schema, record } => {
            let stream: StreamFields = load_document(schema)
                .with_context(|| format!("failed to load schema {}", schema.display()))?;
            let record: Value = load_document(record)
                .with_context(|| format!("failed to load record {}", record.display()))?;
            let context = summarize(&stream, &record, &config.field_filter());
            Ok(serde_json::to_value(context)?)
        }
        Commands::Locales {
            record,
            template_locales,
        } => {
            let record: Value = load_document(record)
                .with_context(|| format!("failed to load record {}", record.display()))?;
            Ok(serde_json::to_value(resolve_locales(
                &record,
                template_locales,
            ))?)
        }
    }
}

/// Encode `value` for printing.
pub fn render(value: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => Ok(serde_yaml_ng::to_string(value)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, value.to_string()).unwrap();
        path
    }

    fn schema() -> Value {
        json!({
            "fields": [
                { "name": "uid", "definition": { "typeName": "type.string" } },
                { "name": "name", "definition": { "typeName": "type.string" } },
                { "name": "c_services", "definition": { "typeName": "type.string", "isList": true } }
            ],
            "displayNames": { "name": "Name" }
        })
    }

    #[test]
    fn test_filter_rows() {
        let dir = TempDir::new().unwrap();
        let schema = write(&dir, "schema.json", &schema());
        let command = Commands::Filter {
            schema,
            criteria: r#"{"types":["type.string"]}"#.into(),
            selector: false,
        };
        let output = run(&command, &EngineConfig::default()).unwrap();
        assert_eq!(
            output,
            json!([{ "path": "name", "displayName": "Name", "type": "type.string", "isList": false }])
        );
    }

    #[test]
    fn test_filter_rejects_bad_criteria() {
        let dir = TempDir::new().unwrap();
        let schema = write(&dir, "schema.json", &schema());
        let command = Commands::Filter {
            schema,
            criteria: "not json".into(),
            selector: false,
        };
        let err = run(&command, &EngineConfig::default()).unwrap_err();
        assert!(err.to_string().contains("invalid filter criteria"));
    }

    #[test]
    fn test_resolve_with_locale_fallback() {
        let dir = TempDir::new().unwrap();
        let record = write(
            &dir,
            "record.json",
            &json!({ "title": { "hasLocalizedValue": "true", "en": "Hello", "es": "Hola" } }),
        );
        let command = Commands::Resolve {
            record,
            descriptor: r#"{"field":"title","constantValue":null}"#.into(),
            locale: Some("fr".into()),
            render: false,
        };
        assert_eq!(run(&command, &EngineConfig::default()).unwrap(), json!("Hello"));
    }

    #[test]
    fn test_resolve_missing_is_null() {
        let dir = TempDir::new().unwrap();
        let record = write(&dir, "record.json", &json!({}));
        let command = Commands::Resolve {
            record,
            descriptor: r#"{"field":"nope","constantValue":""}"#.into(),
            locale: None,
            render: true,
        };
        assert_eq!(run(&command, &EngineConfig::default()).unwrap(), Value::Null);
    }

    #[test]
    fn test_summarize_and_render_yaml() {
        let dir = TempDir::new().unwrap();
        let schema = write(&dir, "schema.json", &schema());
        let record = write(&dir, "record.json", &json!({ "name": "Acme", "c_services": [] }));
        let output = run(&Commands::Summarize { schema, record }, &EngineConfig::default()).unwrap();
        assert_eq!(output["fields"][0]["name"], json!("name"));
        assert_eq!(output["fields"].as_array().map(Vec::len), Some(1));

        let yaml = render(&output, OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("value: Acme"));
    }

    #[test]
    fn test_locales() {
        let dir = TempDir::new().unwrap();
        let record = write(&dir, "record.json", &json!({ "locale": "fr" }));
        let command = Commands::Locales {
            record,
            template_locales: vec!["en".into()],
        };
        assert_eq!(run(&command, &EngineConfig::default()).unwrap(), json!(["fr", "en"]));
    }
}
