//! Core field and tab types for settings schemas.
//!
//! Field definitions describe named, typed settings. All data types
//! serialize to/from YAML via serde; the only non-serializable piece is the
//! optional per-field sanitizer capability.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered `value → label` choices for radio, select and multiselect fields.
pub type Options = IndexMap<String, String>;

/// A sanitized setting value as it is stored in a [`SettingsRecord`](crate::SettingsRecord).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Integer(u64),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl SettingValue {
    /// The value as it appears inside a form control.
    ///
    /// Booleans follow form conventions: `true` is `"1"`, `false` is empty.
    pub fn display_string(&self) -> String {
        match self {
            SettingValue::Bool(true) => "1".to_string(),
            SettingValue::Bool(false) => String::new(),
            SettingValue::Integer(n) => n.to_string(),
            SettingValue::Number(n) => n.to_string(),
            SettingValue::Text(s) => s.clone(),
            SettingValue::List(items) => items.join(","),
        }
    }

    /// Whether the value counts as "nothing set": empty text, `"0"`, zero,
    /// `false` or an empty list.
    pub fn is_blank(&self) -> bool {
        match self {
            SettingValue::Bool(b) => !b,
            SettingValue::Integer(n) => *n == 0,
            SettingValue::Number(n) => *n == 0.0,
            SettingValue::Text(s) => s.is_empty() || s == "0",
            SettingValue::List(items) => items.is_empty(),
        }
    }

    /// The list items, if this is a list.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            SettingValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Convert back into the raw form a submission would carry.
    pub fn to_raw(&self) -> Value {
        match self {
            SettingValue::Bool(b) => Value::Bool(*b),
            SettingValue::Integer(n) => Value::from(*n),
            SettingValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            SettingValue::Text(s) => Value::String(s.clone()),
            SettingValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Number(value)
    }
}

impl From<u64> for SettingValue {
    fn from(value: u64) -> Self {
        SettingValue::Integer(value)
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(value: Vec<String>) -> Self {
        SettingValue::List(value)
    }
}

impl From<Vec<&str>> for SettingValue {
    fn from(value: Vec<&str>) -> Self {
        SettingValue::List(value.into_iter().map(str::to_string).collect())
    }
}

/// An extra presentation attribute on a rendered control.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AttributeValue {
    /// `true` renders the bare attribute name, `false` omits it.
    Flag(bool),
    Text(String),
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Flag(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

fn default_textarea_rows() -> u32 {
    5
}

fn default_textarea_cols() -> u32 {
    50
}

fn default_wysiwyg_rows() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

fn default_on_text() -> String {
    "On".to_string()
}

fn default_off_text() -> String {
    "Off".to_string()
}

fn default_multiselect_size() -> u32 {
    5
}

fn default_upload_text() -> String {
    "Select Media".to_string()
}

fn default_remove_text() -> String {
    "Remove".to_string()
}

/// The type of a field, carrying its type-specific constraints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Textarea {
        #[serde(default = "default_textarea_rows")]
        rows: u32,
        #[serde(default = "default_textarea_cols")]
        cols: u32,
    },
    Wysiwyg {
        #[serde(default = "default_wysiwyg_rows")]
        rows: u32,
        #[serde(default = "default_true")]
        media_buttons: bool,
        #[serde(default)]
        teeny: bool,
    },
    Checkbox {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Toggle {
        #[serde(default = "default_on_text")]
        on_text: String,
        #[serde(default = "default_off_text")]
        off_text: String,
    },
    Radio {
        #[serde(default)]
        options: Options,
    },
    Select {
        #[serde(default)]
        options: Options,
    },
    #[serde(rename = "multiselect")]
    MultiSelect {
        #[serde(default)]
        options: Options,
        #[serde(default = "default_multiselect_size")]
        size: u32,
    },
    Media {
        #[serde(default = "default_upload_text")]
        upload_button_text: String,
        #[serde(default = "default_remove_text")]
        remove_button_text: String,
    },
    Email,
    Url,
    Password,
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
    },
    Tel {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
    },
    Date,
    Color,
    /// A type outside the built-in set, handled by registered extensions.
    Custom { name: String },
}

impl FieldType {
    /// The type name used for extension lookup and diagnostics.
    pub fn name(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea { .. } => "textarea",
            FieldType::Wysiwyg { .. } => "wysiwyg",
            FieldType::Checkbox { .. } => "checkbox",
            FieldType::Toggle { .. } => "toggle",
            FieldType::Radio { .. } => "radio",
            FieldType::Select { .. } => "select",
            FieldType::MultiSelect { .. } => "multiselect",
            FieldType::Media { .. } => "media",
            FieldType::Email => "email",
            FieldType::Url => "url",
            FieldType::Password => "password",
            FieldType::Number { .. } => "number",
            FieldType::Tel { .. } => "tel",
            FieldType::Date => "date",
            FieldType::Color => "color",
            FieldType::Custom { name } => name,
        }
    }

    /// Choices for choice-based types, `None` for free-input types.
    pub fn options(&self) -> Option<&Options> {
        match self {
            FieldType::Radio { options }
            | FieldType::Select { options }
            | FieldType::MultiSelect { options, .. } => Some(options),
            _ => None,
        }
    }

    pub fn is_multiselect(&self) -> bool {
        matches!(self, FieldType::MultiSelect { .. })
    }
}

/// Per-field sanitizer capability replacing the built-in dispatch.
#[derive(Clone)]
pub struct FieldSanitizer(Arc<dyn Fn(&Value, &FieldDef) -> SettingValue + Send + Sync>);

impl FieldSanitizer {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &FieldDef) -> SettingValue + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, raw: &Value, field: &FieldDef) -> SettingValue {
        (self.0)(raw, field)
    }
}

impl fmt::Debug for FieldSanitizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FieldSanitizer(..)")
    }
}

impl PartialEq for FieldSanitizer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A field definition: the complete schema for a single setting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDef {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub type_: FieldType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub placeholder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<SettingValue>,
    /// Owning tab id; empty means ungrouped.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tab: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, AttributeValue>,
    #[serde(skip)]
    pub sanitizer: Option<FieldSanitizer>,
}

fn collect_options<K, V>(options: impl IntoIterator<Item = (K, V)>) -> Options
where
    K: Into<String>,
    V: Into<String>,
{
    options
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

impl FieldDef {
    pub fn new(id: impl Into<String>, title: impl Into<String>, type_: FieldType) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            type_,
            description: String::new(),
            placeholder: String::new(),
            default: None,
            tab: String::new(),
            class: None,
            attributes: IndexMap::new(),
            sanitizer: None,
        }
    }

    pub fn text(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, title, FieldType::Text)
    }

    pub fn textarea(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(
            id,
            title,
            FieldType::Textarea {
                rows: default_textarea_rows(),
                cols: default_textarea_cols(),
            },
        )
    }

    pub fn wysiwyg(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(
            id,
            title,
            FieldType::Wysiwyg {
                rows: default_wysiwyg_rows(),
                media_buttons: true,
                teeny: false,
            },
        )
    }

    pub fn checkbox(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, title, FieldType::Checkbox { label: None })
    }

    pub fn toggle(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(
            id,
            title,
            FieldType::Toggle {
                on_text: default_on_text(),
                off_text: default_off_text(),
            },
        )
    }

    pub fn radio<K, V>(
        id: impl Into<String>,
        title: impl Into<String>,
        options: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            id,
            title,
            FieldType::Radio {
                options: collect_options(options),
            },
        )
    }

    pub fn select<K, V>(
        id: impl Into<String>,
        title: impl Into<String>,
        options: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            id,
            title,
            FieldType::Select {
                options: collect_options(options),
            },
        )
    }

    pub fn multiselect<K, V>(
        id: impl Into<String>,
        title: impl Into<String>,
        options: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            id,
            title,
            FieldType::MultiSelect {
                options: collect_options(options),
                size: default_multiselect_size(),
            },
        )
    }

    pub fn media(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(
            id,
            title,
            FieldType::Media {
                upload_button_text: default_upload_text(),
                remove_button_text: default_remove_text(),
            },
        )
    }

    pub fn email(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, title, FieldType::Email)
    }

    pub fn url(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, title, FieldType::Url)
    }

    pub fn password(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, title, FieldType::Password)
    }

    pub fn number(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(
            id,
            title,
            FieldType::Number {
                min: None,
                max: None,
                step: None,
            },
        )
    }

    pub fn tel(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, title, FieldType::Tel { pattern: None })
    }

    pub fn date(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, title, FieldType::Date)
    }

    pub fn color(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, title, FieldType::Color)
    }

    pub fn custom(
        id: impl Into<String>,
        title: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            title,
            FieldType::Custom {
                name: type_name.into(),
            },
        )
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn default_value(mut self, value: impl Into<SettingValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn in_tab(mut self, tab: impl Into<String>) -> Self {
        self.tab = tab.into();
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn sanitizer<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &FieldDef) -> SettingValue + Send + Sync + 'static,
    {
        self.sanitizer = Some(FieldSanitizer::new(f));
        self
    }

    /// The default used when nothing is stored: the declared default, an
    /// empty list for multiselect, otherwise empty text.
    pub fn effective_default(&self) -> SettingValue {
        match (&self.default, &self.type_) {
            (Some(value), _) => value.clone(),
            (None, FieldType::MultiSelect { .. }) => SettingValue::List(Vec::new()),
            (None, _) => SettingValue::Text(String::new()),
        }
    }
}

/// A named group of fields shown as one navigable section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabDef {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl TabDef {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
        }
    }
}
