//! Settings persistence for settingsgen pages
//!
//! A [`PersistenceStore`] keeps one [`SettingsRecord`](settingsgen_fields::SettingsRecord)
//! per page id. [`PageService`] runs the save lifecycle on top of it:
//! authorize, read the current record, validate and merge the submission,
//! write the result back.

pub mod error;
pub mod service;
pub mod store;

pub use error::{Result, StoreError};
pub use service::PageService;
pub use store::{validate_page_id, FileStore, MemoryStore, PersistenceStore};
