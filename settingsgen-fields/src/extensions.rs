//! Extension points for field types outside the built-in set.
//!
//! Handlers are registered per type name and looked up at dispatch time. A
//! missing handler means built-in fallback behaviour applies.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::types::{FieldDef, SettingValue};

/// Custom sanitizer: `None` defers to plain-text stripping.
pub type SanitizeHook = Arc<dyn Fn(&Value, &FieldDef) -> Option<SettingValue> + Send + Sync>;

/// Custom renderer: receives the field, its form name and the bound value.
pub type RenderHook = Arc<dyn Fn(&FieldDef, &str, &SettingValue) -> String + Send + Sync>;

/// Registry of custom sanitize and render handlers keyed by type name.
#[derive(Clone, Default)]
pub struct Extensions {
    sanitizers: HashMap<String, SanitizeHook>,
    renderers: HashMap<String, RenderHook>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sanitizer for `type_name`, replacing any previous one.
    pub fn on_sanitize<F>(mut self, type_name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&Value, &FieldDef) -> Option<SettingValue> + Send + Sync + 'static,
    {
        self.sanitizers.insert(type_name.into(), Arc::new(hook));
        self
    }

    /// Register a renderer for `type_name`, replacing any previous one.
    pub fn on_render<F>(mut self, type_name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&FieldDef, &str, &SettingValue) -> String + Send + Sync + 'static,
    {
        self.renderers.insert(type_name.into(), Arc::new(hook));
        self
    }

    pub fn sanitize(&self, type_name: &str, raw: &Value, field: &FieldDef) -> Option<SettingValue> {
        let hook = self.sanitizers.get(type_name)?;
        debug!(field = %field.id, type_name, "dispatching custom sanitizer");
        hook(raw, field)
    }

    pub fn render(
        &self,
        type_name: &str,
        field: &FieldDef,
        name: &str,
        value: &SettingValue,
    ) -> Option<String> {
        let hook = self.renderers.get(type_name)?;
        debug!(field = %field.id, type_name, "dispatching custom renderer");
        Some(hook(field, name, value))
    }

    pub fn has_sanitizer(&self, type_name: &str) -> bool {
        self.sanitizers.contains_key(type_name)
    }

    pub fn has_renderer(&self, type_name: &str) -> bool {
        self.renderers.contains_key(type_name)
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sanitizers: Vec<&String> = self.sanitizers.keys().collect();
        let mut renderers: Vec<&String> = self.renderers.keys().collect();
        sanitizers.sort();
        renderers.sort();
        f.debug_struct("Extensions")
            .field("sanitizers", &sanitizers)
            .field("renderers", &renderers)
            .finish()
    }
}
