//! Engine configuration
//!
//! Values are layered with figment, later sources overriding earlier ones:
//! 1. Built-in defaults
//! 2. An optional configuration file (TOML, YAML or JSON, chosen by extension)
//! 3. Environment variables prefixed with `VE_`

use std::fs;
use std::path::Path;

use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{FieldsError, Result};
use crate::filter::FieldFilter;
use crate::policy::FieldPolicy;
use crate::resolver::EntityResolver;
use crate::translatable::{Localizer, DEFAULT_LOCALE};

/// Prefix for environment overrides, e.g. `VE_DEFAULT_LOCALE`.
pub const ENV_PREFIX: &str = "VE_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Toml,
    Yaml,
    Json,
}

impl FileFormat {
    fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("toml") => Ok(Self::Toml),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(FieldsError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Settings shared by the filter engine, resolver and summarizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Locale tried after the requested one.
    pub default_locale: String,
    /// Root field names never offered for binding.
    pub reserved_fields: Vec<String>,
    /// Type tags whose children stay hidden.
    pub terminal_types: Vec<String>,
    /// Type tags treated as rich text.
    pub rich_text_types: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let policy = FieldPolicy::default();
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            reserved_fields: policy.reserved_fields,
            terminal_types: policy.terminal_types,
            rich_text_types: policy.rich_text_types,
        }
    }
}

impl EngineConfig {
    /// Load from defaults, the optional `file`, and the environment.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let config: EngineConfig = Self::figment(file)?.extract()?;
        config.validate()?;
        debug!(
            default_locale = %config.default_locale,
            reserved = config.reserved_fields.len(),
            terminal = config.terminal_types.len(),
            "loaded engine configuration"
        );
        Ok(config)
    }

    fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(EngineConfig::default()));

        if let Some(path) = file {
            trace!(path = %path.display(), "merging configuration file");
            figment = match FileFormat::from_path(path)? {
                FileFormat::Toml => figment.merge(Toml::file(path)),
                FileFormat::Yaml => figment.merge(Yaml::file(path)),
                FileFormat::Json => figment.merge(Json::file(path)),
            };
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    fn validate(&self) -> Result<()> {
        if self.default_locale.trim().is_empty() {
            return Err(FieldsError::InvalidConfig {
                key: "default_locale".into(),
                message: "cannot be empty".into(),
            });
        }
        Ok(())
    }

    pub fn policy(&self) -> FieldPolicy {
        FieldPolicy {
            reserved_fields: self.reserved_fields.clone(),
            terminal_types: self.terminal_types.clone(),
            rich_text_types: self.rich_text_types.clone(),
        }
    }

    pub fn localizer(&self) -> Localizer {
        Localizer::new(self.default_locale.clone())
    }

    pub fn field_filter(&self) -> FieldFilter {
        FieldFilter::new(self.policy())
    }

    pub fn resolver(&self) -> EntityResolver {
        EntityResolver::new(self.localizer())
    }
}

/// Read a schema, record, or other JSON-shaped document from a JSON or YAML
/// file.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = FileFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    trace!(path = %path.display(), bytes = content.len(), "read document");
    match format {
        FileFormat::Json => Ok(serde_json::from_str(&content)?),
        FileFormat::Yaml => Ok(serde_yaml_ng::from_str(&content)?),
        FileFormat::Toml => Err(FieldsError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}
