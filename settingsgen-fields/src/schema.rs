//! Schema assembly: fields and tabs collected into an immutable [`SettingsSchema`].

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::{FieldsError, Result};
use crate::markup;
use crate::sanitize;
use crate::types::{FieldDef, FieldType, SettingValue, TabDef};

/// Id of the single section used when a schema has no tabs.
pub const DEFAULT_SECTION: &str = "default";

/// Accumulates field and tab definitions.
///
/// ```
/// use settingsgen_fields::{FieldDef, SchemaBuilder};
///
/// let schema = SchemaBuilder::new()
///     .tab("general", "General", "")
///     .field(FieldDef::number("volume", "Volume").default_value(10.0).in_tab("general"))
///     .build()
///     .unwrap();
/// assert_eq!(schema.default_tab(), Some("general"));
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<FieldDef>,
    tabs: Vec<TabDef>,
    default_tab: Option<String>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field. Defaults are normalised to the value shape the field's
    /// sanitizer produces: a list for multiselect, a number for number fields
    /// and text for the other fields that fall back to their default.
    pub fn field(mut self, mut field: FieldDef) -> Self {
        normalize_default(&mut field);
        self.fields.push(field);
        self
    }

    pub fn fields(self, fields: impl IntoIterator<Item = FieldDef>) -> Self {
        fields.into_iter().fold(self, Self::field)
    }

    /// Add a tab. The first tab added becomes the default unless one was set.
    pub fn tab(
        mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let tab = TabDef::new(id, title, description);
        if self.default_tab.is_none() {
            self.default_tab = Some(tab.id.clone());
        }
        self.tabs.push(tab);
        self
    }

    pub fn add_tab(self, tab: TabDef) -> Self {
        self.tab(tab.id, tab.title, tab.description)
    }

    /// Explicitly choose the default tab.
    pub fn default_tab(mut self, id: impl Into<String>) -> Self {
        self.default_tab = Some(id.into());
        self
    }

    /// Replace the default of an existing multiselect field. Any other
    /// target is ignored.
    pub fn set_multiselect_default<I, S>(mut self, field_id: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(field) = self
            .fields
            .iter_mut()
            .find(|f| f.id == field_id && f.type_.is_multiselect())
        {
            field.default = Some(SettingValue::List(
                values.into_iter().map(Into::into).collect(),
            ));
        }
        self
    }

    pub fn build(self) -> Result<SettingsSchema> {
        let mut tabs = IndexMap::with_capacity(self.tabs.len());
        for tab in self.tabs {
            if tabs.contains_key(&tab.id) {
                return Err(FieldsError::DuplicateTab { id: tab.id });
            }
            tabs.insert(tab.id.clone(), tab);
        }

        if let Some(default) = &self.default_tab {
            if !tabs.contains_key(default) {
                return Err(FieldsError::UnknownTab {
                    id: default.clone(),
                });
            }
        }

        let mut fields = IndexMap::with_capacity(self.fields.len());
        for field in self.fields {
            if fields.contains_key(&field.id) {
                return Err(FieldsError::DuplicateField { id: field.id });
            }
            if field.type_.options().is_some_and(|o| o.is_empty()) {
                warn!(field = %field.id, type_name = field.type_.name(), "choice field has no options and will not render");
            }
            if !field.tab.is_empty() && !tabs.contains_key(&field.tab) {
                warn!(field = %field.id, tab = %field.tab, "field belongs to an undeclared tab and will not be shown");
            }
            fields.insert(field.id.clone(), field);
        }

        debug!(
            fields = fields.len(),
            tabs = tabs.len(),
            default_tab = self.default_tab.as_deref().unwrap_or(""),
            "built settings schema"
        );

        Ok(SettingsSchema {
            fields,
            tabs,
            default_tab: self.default_tab,
        })
    }
}

fn normalize_default(field: &mut FieldDef) {
    match &field.type_ {
        FieldType::MultiSelect { .. } => {
            field.default = Some(normalize_multiselect_default(field.default.take()));
        }
        FieldType::Number { .. } => {
            let number = field
                .default
                .as_ref()
                .and_then(|value| sanitize::parse_number(&value.to_raw()));
            if let Some(n) = number {
                field.default = Some(SettingValue::Number(n));
            }
        }
        FieldType::Radio { .. } | FieldType::Select { .. } | FieldType::Color | FieldType::Date => {
            let text = match &field.default {
                Some(
                    value @ (SettingValue::Bool(_)
                    | SettingValue::Integer(_)
                    | SettingValue::Number(_)),
                ) => Some(value.display_string()),
                _ => None,
            };
            if let Some(text) = text {
                field.default = Some(SettingValue::Text(text));
            }
        }
        _ => {}
    }
}

fn normalize_multiselect_default(default: Option<SettingValue>) -> SettingValue {
    match default {
        None => SettingValue::List(Vec::new()),
        Some(SettingValue::List(items)) => SettingValue::List(items),
        Some(SettingValue::Text(text)) if text.is_empty() => SettingValue::List(Vec::new()),
        Some(scalar) => SettingValue::List(vec![scalar.display_string()]),
    }
}

/// One rendered group of fields: a tab, or the single default section.
#[derive(Debug, Clone)]
pub struct Section<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub fields: Vec<&'a FieldDef>,
}

/// An immutable, validated set of fields and tabs.
#[derive(Debug, Clone)]
pub struct SettingsSchema {
    fields: IndexMap<String, FieldDef>,
    tabs: IndexMap<String, TabDef>,
    default_tab: Option<String>,
}

impl SettingsSchema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub fn field(&self, id: &str) -> Option<&FieldDef> {
        self.fields.get(id)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn tabs(&self) -> impl Iterator<Item = &TabDef> {
        self.tabs.values()
    }

    pub fn tab(&self, id: &str) -> Option<&TabDef> {
        self.tabs.get(id)
    }

    pub fn has_tabs(&self) -> bool {
        !self.tabs.is_empty()
    }

    pub fn default_tab(&self) -> Option<&str> {
        self.default_tab.as_deref()
    }

    /// Fields whose tab equals `tab_id`; the empty id selects ungrouped fields.
    pub fn fields_for_tab<'a>(&'a self, tab_id: &'a str) -> impl Iterator<Item = &'a FieldDef> + 'a {
        self.fields.values().filter(move |f| f.tab == tab_id)
    }

    /// Sections in display order. Without tabs there is one `default`
    /// section holding the ungrouped fields.
    pub fn sections(&self) -> Vec<Section<'_>> {
        if !self.has_tabs() {
            return vec![Section {
                id: DEFAULT_SECTION,
                title: "",
                description: "",
                fields: self.fields_for_tab("").collect(),
            }];
        }
        self.tabs
            .values()
            .map(|tab| Section {
                id: &tab.id,
                title: &tab.title,
                description: &tab.description,
                fields: self.fields_for_tab(&tab.id).collect(),
            })
            .collect()
    }

    /// The active tab for a request's `tab` parameter, clamped to the
    /// default when absent or unknown. `None` when the schema has no tabs.
    pub fn resolve_tab(&self, requested: Option<&str>) -> Option<&str> {
        if !self.has_tabs() {
            return None;
        }
        requested
            .map(markup::sanitize_key)
            .and_then(|key| self.tabs.get_key_value(key.as_str()).map(|(id, _)| id.as_str()))
            .or_else(|| self.default_tab())
    }
}
