//! Command implementations. Each returns the text to print on stdout.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use settingsgen_config::{SettingsgenConfig, StoreBackend};
use settingsgen_fields::{PageDefinition, RequestContext, SettingsPage, Submission};
use settingsgen_store::{FileStore, MemoryStore, PageService, PersistenceStore};
use tracing::debug;

/// The configured store backend.
pub fn open_store(config: &SettingsgenConfig) -> Arc<dyn PersistenceStore> {
    match config.store.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File => Arc::new(FileStore::new(config.store.directory.clone())),
    }
}

async fn load_page(definition: &Path) -> Result<SettingsPage> {
    let page = PageDefinition::load(definition)
        .await
        .with_context(|| format!("failed to load {}", definition.display()))?
        .into_page()
        .with_context(|| format!("invalid page definition {}", definition.display()))?;
    debug!(page = %page.id(), fields = page.schema().len(), "page ready");
    Ok(page)
}

/// Capabilities from the command line, or the page's own capability.
fn request_for(page: &SettingsPage, capabilities: &[String], tab: Option<String>) -> RequestContext {
    let mut request = RequestContext::new();
    if capabilities.is_empty() {
        request = request.with_capability(page.config().capability.clone());
    }
    for capability in capabilities {
        request = request.with_capability(capability.clone());
    }
    request.tab = tab;
    request
}

pub async fn check(definition: &Path) -> Result<String> {
    let page = load_page(definition).await?;
    let schema = page.schema();
    let mut out = String::new();
    writeln!(out, "page: {} ({})", page.id(), page.config().title)?;
    writeln!(out, "option group: {}", page.config().option_group())?;
    writeln!(out, "capability: {}", page.config().capability)?;
    if schema.has_tabs() {
        let default = schema.default_tab().unwrap_or_default();
        for section in page.sections() {
            let marker = if section.id == default { " (default)" } else { "" };
            writeln!(out, "tab {}{}: {} field(s)", section.id, marker, section.fields.len())?;
        }
    }
    for field in schema.fields() {
        let tab = if field.tab.is_empty() { "-" } else { field.tab.as_str() };
        writeln!(out, "  {} [{}] tab={}", field.id, field.type_.name(), tab)?;
    }
    Ok(out)
}

pub async fn render(
    definition: &Path,
    store: Arc<dyn PersistenceStore>,
    tab: Option<String>,
    capabilities: &[String],
) -> Result<String> {
    let page = load_page(definition).await?;
    let request = request_for(&page, capabilities, tab);
    let service = PageService::new(page, store);
    Ok(service.render(&request).await?)
}

/// Split `FIELD=VALUE` arguments.
pub fn parse_pairs(values: &[String]) -> Result<Vec<(String, String)>> {
    values
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((field, value)) if !field.is_empty() => Ok((field.to_string(), value.to_string())),
            _ => bail!("expected FIELD=VALUE, got '{pair}'"),
        })
        .collect()
}

pub async fn save(
    definition: &Path,
    store: Arc<dyn PersistenceStore>,
    values: &[String],
    json: Option<&str>,
    capabilities: &[String],
) -> Result<String> {
    let page = load_page(definition).await?;
    let submission = match json {
        Some(body) => Submission::from_json(body)?,
        None => Submission::from_pairs(parse_pairs(values)?),
    };
    let request = request_for(&page, capabilities, None);
    let service = PageService::new(page, store);
    let record = service.submit(&request, &submission).await?;
    Ok(serde_yaml_ng::to_string(&record)?)
}

pub async fn show(
    definition: &Path,
    store: Arc<dyn PersistenceStore>,
    capabilities: &[String],
) -> Result<String> {
    let page = load_page(definition).await?;
    let request = request_for(&page, capabilities, None);
    let service = PageService::new(page, store);
    let record = service.read(&request).await?;
    if record.is_empty() {
        return Ok(String::new());
    }
    Ok(serde_yaml_ng::to_string(&record)?)
}
