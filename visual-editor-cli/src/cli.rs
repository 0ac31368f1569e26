//! CLI definition for `ve-fields`.
//!
//! Only depends on `clap` and `std`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output encoding for command results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML
    Yaml,
}

/// ve-fields - entity field filtering and value resolution
///
/// Inspects which entity fields a component may bind to, and what a bound
/// field resolves to for a given record and locale.
#[derive(Parser, Debug)]
#[command(name = "ve-fields")]
#[command(version)]
#[command(about = "Entity field filtering and value resolution for the visual editor")]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Engine configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the schema fields matching an entity field filter
    Filter {
        /// Stream schema file (JSON or YAML)
        #[arg(short, long, value_name = "FILE")]
        schema: PathBuf,
        /// Filter criteria as JSON, e.g. '{"types":["type.string"]}'
        #[arg(long, value_name = "JSON", default_value = "{}")]
        criteria: String,
        /// Order results by display label, as a field selector shows them
        #[arg(long)]
        selector: bool,
    },
    /// Resolve a bound field descriptor against an entity record
    Resolve {
        /// Entity record file (JSON or YAML)
        #[arg(short, long, value_name = "FILE")]
        record: PathBuf,
        /// Field descriptor as JSON, e.g. '{"field":"name","constantValue":""}'
        #[arg(long, value_name = "JSON")]
        descriptor: String,
        /// Locale to resolve for; defaults to the configured default locale
        #[arg(short, long)]
        locale: Option<String>,
        /// Resolve as component data: fill [[path]] tokens and localize nested values
        #[arg(long)]
        render: bool,
    },
    /// Summarize the populated fields of an entity record
    Summarize {
        /// Stream schema file (JSON or YAML)
        #[arg(short, long, value_name = "FILE")]
        schema: PathBuf,
        /// Entity record file (JSON or YAML)
        #[arg(short, long, value_name = "FILE")]
        record: PathBuf,
    },
    /// List the locales an entity record renders in
    Locales {
        /// Entity record file (JSON or YAML)
        #[arg(short, long, value_name = "FILE")]
        record: PathBuf,
        /// Locales declared by the template
        #[arg(short, long = "template-locale", value_name = "LOCALE")]
        template_locales: Vec<String>,
    },
}
