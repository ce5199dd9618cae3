//! Field schema engine for settings pages
//!
//! `settingsgen-fields` declares typed settings fields, sanitizes submitted
//! values against them and renders value-bound form controls. Storage and
//! authorization live in `settingsgen-store`; this crate holds no I/O beyond
//! reading page definitions.
//!
//! # Architecture
//!
//! - **Closed type set**: [`FieldType`] has one variant per field kind, each
//!   carrying its own constraints; anything else goes through [`Extensions`]
//! - **Total dispatch**: sanitizing and rendering never fail; bad input falls
//!   back to the field default
//! - **Explicit request state**: the active tab and capabilities arrive in a
//!   [`RequestContext`] rather than from globals

pub mod definition;
pub mod error;
pub mod extensions;
pub mod markup;
pub mod media;
pub mod page;
pub mod record;
pub mod render;
pub mod sanitize;
pub mod schema;
pub mod types;

pub use definition::PageDefinition;
pub use error::{FieldsError, Result};
pub use extensions::{Extensions, RenderHook, SanitizeHook};
pub use media::{MediaAttachment, MediaResolver, NoMedia};
pub use page::{MenuLocation, PageConfig, RequestContext, SettingsPage};
pub use record::{SettingsRecord, Submission};
pub use render::FieldRenderer;
pub use sanitize::{sanitize, SanitizeContext};
pub use schema::{Section, SchemaBuilder, SettingsSchema, DEFAULT_SECTION};
pub use types::{AttributeValue, FieldDef, FieldSanitizer, FieldType, Options, SettingValue, TabDef};
