//! Entity field selection and value resolution for the visual editor.
//!
//! Components declare the kind of entity field they accept with an
//! [`EntityFieldFilter`]. The [`FieldFilter`] turns a stream schema into the
//! field paths that satisfy it, walking nested records and, when asked, list
//! items. Once a component is bound to a path through an [`EntityField`], the
//! [`EntityResolver`] turns that binding plus the current entity record into
//! the value to render, applying locale fallback along the way.
//!
//! [`summarize`] builds a flat manifest of populated fields for the page
//! assistant, and [`prepare_assistant_request`] attaches it to an outbound
//! request.
//!
//! Everything except configuration and document loading is a pure function of
//! its inputs.
//!
//! ```
//! use serde_json::json;
//! use visual_editor_fields::{
//!     type_tags, EntityField, EntityFieldFilter, EntityResolver, FieldFilter, SchemaField,
//!     StreamFields,
//! };
//!
//! let stream = StreamFields::new(vec![
//!     SchemaField::new("name", type_tags::STRING),
//!     SchemaField::new("address", type_tags::ADDRESS)
//!         .with_children(vec![SchemaField::new("city", type_tags::STRING)]),
//! ]);
//! let criteria = EntityFieldFilter::new().with_types([type_tags::STRING]);
//! let paths: Vec<String> = FieldFilter::default()
//!     .filter(&stream, &criteria)
//!     .into_iter()
//!     .map(|field| field.path)
//!     .collect();
//! assert_eq!(paths, ["name", "address.city"]);
//!
//! let record = json!({ "address": { "city": "Arlington" } });
//! let city: Option<String> =
//!     EntityResolver::default().resolve(&EntityField::live("address.city", String::new()), &record, "en");
//! assert_eq!(city.as_deref(), Some("Arlington"));
//! ```

pub mod assistant;
pub mod config;
pub mod error;
pub mod filter;
pub mod policy;
pub mod resolver;
pub mod summary;
pub mod translatable;
pub mod types;
pub mod walker;

pub use assistant::{prepare_assistant_request, AssistantContext, SYSTEM_PROMPT};
pub use config::{load_document, EngineConfig};
pub use error::{FieldsError, Result};
pub use filter::{EntityFieldFilter, FieldFilter, NameFilter, ResolvedField};
pub use policy::{FieldPolicy, NodeKind};
pub use resolver::{value_at_path, EntityResolver};
pub use summary::{summarize, ContextField, EntityContext};
pub use translatable::{display_value, resolve_locales, Localizer, RichText};
pub use types::{type_tags, Binding, EntityField, FieldDefinition, SchemaField, StreamFields};
pub use walker::{walk, FieldPath};
