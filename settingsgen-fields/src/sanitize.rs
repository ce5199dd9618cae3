//! Sanitizer dispatch: raw submitted values to stored [`SettingValue`]s.
//!
//! Every branch is total. Input that fails a type's constraints falls back
//! deterministically (usually to the field's default) so a record is always
//! well-formed after validation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::extensions::Extensions;
use crate::markup::{self, ALLOWED_PROTOCOLS};
use crate::types::{FieldDef, FieldType, Options, SettingValue};

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("valid regex"));

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid regex"));

static NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?$").expect("valid regex")
});

static LEADING_INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+").expect("valid regex"));

/// Per-call inputs to sanitization beyond the field and value.
#[derive(Debug, Clone, Copy)]
pub struct SanitizeContext<'a> {
    /// Whether the page already has a persisted record.
    pub record_exists: bool,
    pub extensions: &'a Extensions,
}

impl<'a> SanitizeContext<'a> {
    pub fn new(record_exists: bool, extensions: &'a Extensions) -> Self {
        Self {
            record_exists,
            extensions,
        }
    }
}

/// Sanitize `raw` for `field`, honouring a per-field sanitizer if present.
pub fn sanitize(field: &FieldDef, raw: &Value, ctx: &SanitizeContext<'_>) -> SettingValue {
    match &field.sanitizer {
        Some(custom) => custom.call(raw, field),
        None => sanitize_builtin(field, raw, ctx),
    }
}

/// The built-in per-type rules.
pub fn sanitize_builtin(field: &FieldDef, raw: &Value, ctx: &SanitizeContext<'_>) -> SettingValue {
    match &field.type_ {
        FieldType::Text => SettingValue::Text(markup::sanitize_text(&scalar_text(raw))),
        FieldType::Textarea { .. } => {
            SettingValue::Text(markup::sanitize_textarea(&scalar_text(raw)))
        }
        FieldType::Wysiwyg { .. } => SettingValue::Text(markup::sanitize_html(&scalar_text(raw))),
        FieldType::Checkbox { .. } | FieldType::Toggle { .. } => SettingValue::Bool(truthy(raw)),
        FieldType::Radio { options } | FieldType::Select { options } => {
            let key = scalar_text(raw);
            if options.contains_key(&key) {
                SettingValue::Text(key)
            } else {
                field.effective_default()
            }
        }
        FieldType::MultiSelect { options, .. } => sanitize_multiselect(field, options, raw, ctx),
        FieldType::Email => SettingValue::Text(sanitize_email(&scalar_text(raw))),
        FieldType::Url => SettingValue::Text(sanitize_url(&scalar_text(raw))),
        FieldType::Number { .. } => match parse_number(raw) {
            Some(n) => SettingValue::Number(n),
            None => field.effective_default(),
        },
        FieldType::Tel { .. } => SettingValue::Text(
            scalar_text(raw)
                .chars()
                .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '))
                .collect(),
        ),
        FieldType::Color => match_or_default(field, &HEX_COLOR, raw),
        FieldType::Date => match_or_default(field, &ISO_DATE, raw),
        FieldType::Media { .. } => SettingValue::Integer(absolute_int(raw)),
        FieldType::Password => SettingValue::Text(scalar_text(raw)),
        FieldType::Custom { name } => match ctx.extensions.sanitize(name, raw, field) {
            Some(value) => value,
            None => {
                debug!(field = %field.id, type_name = %name, "no custom sanitizer, stripping to text");
                SettingValue::Text(markup::sanitize_text(&scalar_text(raw)))
            }
        },
    }
}

/// Scalar input as text. Booleans become `"1"`/`""`; arrays, objects and
/// null become empty.
fn scalar_text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn truthy(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn sanitize_multiselect(
    field: &FieldDef,
    options: &Options,
    raw: &Value,
    ctx: &SanitizeContext<'_>,
) -> SettingValue {
    let selected = match raw {
        Value::Array(items) => list_items(items),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => list_items(&items),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    // First-ever save of the page: an empty submission takes the default.
    if selected.is_empty() && !ctx.record_exists {
        let default = field.effective_default();
        if !default.is_blank() {
            return default;
        }
    }

    let mut kept: Vec<String> = Vec::with_capacity(selected.len());
    for item in selected {
        if options.contains_key(&item) && !kept.contains(&item) {
            kept.push(item);
        }
    }
    SettingValue::List(kept)
}

fn list_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

pub(crate) fn parse_number(raw: &Value) -> Option<f64> {
    let n = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if !NUMERIC.is_match(trimmed) {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn absolute_int(raw: &Value) -> u64 {
    match raw {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u
            } else if let Some(i) = n.as_i64() {
                i.unsigned_abs()
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map_or(0, |f| f.abs().trunc() as u64)
            }
        }
        Value::String(s) => LEADING_INT
            .find(s.trim_start())
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .map_or(0, i64::unsigned_abs),
        Value::Bool(true) => 1,
        _ => 0,
    }
}

fn match_or_default(field: &FieldDef, pattern: &Regex, raw: &Value) -> SettingValue {
    let text = scalar_text(raw);
    if pattern.is_match(&text) {
        SettingValue::Text(text)
    } else {
        field.effective_default()
    }
}

/// Normalise an email address; anything unusable becomes empty.
pub fn sanitize_email(input: &str) -> String {
    let email = input.trim();
    if email.len() < 6 {
        return String::new();
    }
    let Some(at) = email.find('@') else {
        return String::new();
    };
    let (local, domain) = (&email[..at], &email[at + 1..]);

    let local: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~.-".contains(*c))
        .collect();
    if local.is_empty() {
        return String::new();
    }

    let mut domain = domain.to_string();
    while domain.contains("..") {
        domain = domain.replace("..", ".");
    }
    let domain = domain.trim_matches(|c: char| c.is_whitespace() || c == '.' || c == '\0');

    let subs: Vec<String> = domain
        .split('.')
        .map(|sub| {
            sub.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect::<String>()
                .trim_matches('-')
                .to_string()
        })
        .filter(|sub| !sub.is_empty())
        .collect();
    if subs.len() < 2 {
        return String::new();
    }

    let normalized = format!("{local}@{}", subs.join("."));
    if normalized.len() < 6 {
        return String::new();
    }
    normalized
}

/// Normalise a URL for storage. Disallowed schemes and unparseable input
/// become empty; scheme-less hosts are assumed to be `http`.
pub fn sanitize_url(input: &str) -> String {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control() && !matches!(c, '<' | '>' | '"' | '`'))
        .collect();
    if cleaned.is_empty() {
        return String::new();
    }
    if cleaned.starts_with(['/', '#', '?']) {
        return cleaned;
    }

    let candidate = if has_scheme(&cleaned) {
        cleaned
    } else {
        format!("http://{cleaned}")
    };

    match Url::parse(&candidate) {
        Ok(url) if ALLOWED_PROTOCOLS.contains(&url.scheme()) => url.to_string(),
        _ => String::new(),
    }
}

fn has_scheme(value: &str) -> bool {
    if value.contains("://") {
        return true;
    }
    value.split_once(':').is_some_and(|(scheme, _)| {
        ALLOWED_PROTOCOLS.contains(&scheme.to_ascii_lowercase().as_str())
    })
}
