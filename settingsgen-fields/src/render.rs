//! Render dispatch: one value-bound form control per field type.

use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::debug;

use crate::extensions::Extensions;
use crate::markup;
use crate::media::MediaResolver;
use crate::types::{AttributeValue, FieldDef, FieldType, Options, SettingValue};

const DEFAULT_COLOR: &str = "#000000";
const DATE_PLACEHOLDER: &str = "YYYY-MM-DD";

/// Renders fields of one page into HTML form controls.
pub struct FieldRenderer<'a> {
    page_id: &'a str,
    extensions: &'a Extensions,
    media: &'a dyn MediaResolver,
}

impl<'a> FieldRenderer<'a> {
    pub fn new(page_id: &'a str, extensions: &'a Extensions, media: &'a dyn MediaResolver) -> Self {
        Self {
            page_id,
            extensions,
            media,
        }
    }

    /// Form name of a field: `page_id[field_id]`.
    pub fn field_name(&self, field: &FieldDef) -> String {
        format!("{}[{}]", self.page_id, field.id)
    }

    /// The value a control is bound to: the stored value, else the field's
    /// default. An empty stored multiselect also takes the default.
    pub fn bound_value(field: &FieldDef, stored: Option<&SettingValue>) -> SettingValue {
        match stored {
            Some(value) if field.type_.is_multiselect() && value.is_blank() => {
                field.effective_default()
            }
            Some(value) => value.clone(),
            None => field.effective_default(),
        }
    }

    /// Control plus trailing description for `field`, bound to `stored`.
    pub fn render(&self, field: &FieldDef, stored: Option<&SettingValue>) -> String {
        let value = Self::bound_value(field, stored);
        let mut out = self.render_control(field, &value);
        if !field.description.is_empty() {
            out.push_str("<p class=\"description\">");
            out.push_str(&markup::sanitize_html(&field.description));
            out.push_str("</p>");
        }
        out
    }

    /// The bare control for `field` bound to `value`.
    pub fn render_control(&self, field: &FieldDef, value: &SettingValue) -> String {
        let name = self.field_name(field);
        match &field.type_ {
            FieldType::Text => input("text", field, &name, &display(value), "regular-text", &[]),
            FieldType::Email => input("email", field, &name, &display(value), "regular-text", &[]),
            FieldType::Url => input("url", field, &name, &display(value), "regular-text", &[]),
            FieldType::Password => input(
                "password",
                field,
                &name,
                &display(value),
                "regular-text",
                &[("autocomplete", "new-password".to_string())],
            ),
            FieldType::Number { min, max, step } => {
                let mut extra = Vec::new();
                if let Some(min) = min {
                    extra.push(("min", min.to_string()));
                }
                if let Some(max) = max {
                    extra.push(("max", max.to_string()));
                }
                extra.push(("step", step.map_or_else(|| "1".to_string(), |s| s.to_string())));
                input("number", field, &name, &display(value), "regular-text", &extra)
            }
            FieldType::Tel { pattern } => {
                let extra: Vec<(&str, String)> = pattern
                    .iter()
                    .filter(|p| !p.is_empty())
                    .map(|p| ("pattern", p.clone()))
                    .collect();
                input("tel", field, &name, &display(value), "regular-text", &extra)
            }
            FieldType::Date => render_date(field, &name, value),
            FieldType::Color => render_color(field, &name, value),
            FieldType::Textarea { rows, cols } => render_textarea(field, &name, value, *rows, *cols),
            FieldType::Wysiwyg {
                rows,
                media_buttons,
                teeny,
            } => render_wysiwyg(field, &name, value, *rows, *media_buttons, *teeny),
            FieldType::Checkbox { label } => render_checkbox(field, &name, value, label.as_deref()),
            FieldType::Toggle { on_text, off_text } => {
                render_toggle(field, &name, value, on_text, off_text)
            }
            FieldType::Radio { options } => render_radio(field, &name, value, options),
            FieldType::Select { options } => render_select(field, &name, value, options),
            FieldType::MultiSelect { options, size } => {
                render_multiselect(field, &name, value, options, *size)
            }
            FieldType::Media {
                upload_button_text,
                remove_button_text,
            } => self.render_media(field, &name, value, upload_button_text, remove_button_text),
            FieldType::Custom { name: type_name } => {
                match self.extensions.render(type_name, field, &name, value) {
                    Some(markup) => markup,
                    None => {
                        debug!(field = %field.id, type_name = %type_name, "no custom renderer, emitting nothing");
                        String::new()
                    }
                }
            }
        }
    }

    fn render_media(
        &self,
        field: &FieldDef,
        name: &str,
        value: &SettingValue,
        upload_text: &str,
        remove_text: &str,
    ) -> String {
        let attachment_id = match value {
            SettingValue::Integer(n) => *n,
            SettingValue::Text(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        };
        let preview = if attachment_id == 0 {
            String::new()
        } else {
            match self.media.resolve(attachment_id) {
                Some(attachment) if attachment.is_image() => format!(
                    "<img src=\"{}\" alt=\"\" style=\"max-width: 150px; max-height: 150px;\" />",
                    encode_double_quoted_attribute(&attachment.url)
                ),
                Some(attachment) => format!(
                    "<div class=\"media-info\"><strong>Type:</strong> {}<br><strong>Name:</strong> {}</div>",
                    encode_text(&attachment.mime_type),
                    encode_text(attachment.file_name())
                ),
                None => String::new(),
            }
        };

        let mut out = String::from("<div class=\"wp-settings-media-field-container\">");
        out.push_str("<input type=\"hidden\"");
        push_attr(&mut out, "id", &field.id);
        push_attr(&mut out, "name", name);
        push_attr(&mut out, "value", &display(value));
        push_attr(&mut out, "class", "wp-settings-media-field");
        out.push_str(" />");
        out.push_str("<div class=\"wp-settings-media-preview\">");
        out.push_str(&preview);
        out.push_str("</div><div class=\"wp-settings-media-buttons\">");
        out.push_str(&format!(
            "<button class=\"button wp-settings-media-upload\">{}</button>",
            encode_text(upload_text)
        ));
        out.push_str("<button class=\"button wp-settings-media-remove\"");
        if attachment_id == 0 {
            out.push_str(" style=\"display:none;\"");
        }
        out.push('>');
        out.push_str(&encode_text(remove_text));
        out.push_str("</button></div></div>");
        out
    }
}

fn display(value: &SettingValue) -> String {
    value.display_string()
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&encode_double_quoted_attribute(value));
    out.push('"');
}

/// Extra attributes declared on the field: `true` flags render bare, `false`
/// flags are omitted.
fn push_extra_attributes(out: &mut String, field: &FieldDef) {
    for (key, value) in &field.attributes {
        match value {
            AttributeValue::Flag(true) => {
                out.push(' ');
                out.push_str(&encode_double_quoted_attribute(key));
            }
            AttributeValue::Flag(false) => {}
            AttributeValue::Text(text) => push_attr(out, &encode_double_quoted_attribute(key), text),
        }
    }
}

fn class_or(field: &FieldDef, fallback: &str) -> String {
    match field.class.as_deref() {
        Some(class) if !class.is_empty() => class.to_string(),
        _ => fallback.to_string(),
    }
}

/// Field class followed by a fixed marker class.
fn class_with(field: &FieldDef, marker: &str) -> String {
    match field.class.as_deref() {
        Some(class) if !class.is_empty() => format!("{class} {marker}"),
        _ => marker.to_string(),
    }
}

fn input(
    input_type: &str,
    field: &FieldDef,
    name: &str,
    value: &str,
    default_class: &str,
    extra: &[(&str, String)],
) -> String {
    let mut out = format!("<input type=\"{input_type}\"");
    push_attr(&mut out, "id", &field.id);
    push_attr(&mut out, "name", name);
    push_attr(&mut out, "value", value);
    push_attr(&mut out, "class", &class_or(field, default_class));
    push_attr(&mut out, "placeholder", &field.placeholder);
    for (key, val) in extra {
        push_attr(&mut out, key, val);
    }
    push_extra_attributes(&mut out, field);
    out.push_str(" />");
    out
}

fn render_date(field: &FieldDef, name: &str, value: &SettingValue) -> String {
    let placeholder = if field.placeholder.is_empty() {
        DATE_PLACEHOLDER
    } else {
        field.placeholder.as_str()
    };
    let class = match field.class.as_deref() {
        Some(class) if !class.is_empty() => format!("{class} wp-settings-date-field"),
        _ => "regular-text wp-settings-date-field".to_string(),
    };
    let mut out = String::from("<input type=\"text\"");
    push_attr(&mut out, "id", &field.id);
    push_attr(&mut out, "name", name);
    push_attr(&mut out, "value", &display(value));
    push_attr(&mut out, "class", &class);
    push_attr(&mut out, "placeholder", placeholder);
    push_extra_attributes(&mut out, field);
    out.push_str(" />");
    out
}

fn render_color(field: &FieldDef, name: &str, value: &SettingValue) -> String {
    let color = if value.is_blank() {
        field
            .default
            .as_ref()
            .map_or_else(|| DEFAULT_COLOR.to_string(), SettingValue::display_string)
    } else {
        display(value)
    };
    let mut out = String::from("<input type=\"text\"");
    push_attr(&mut out, "id", &field.id);
    push_attr(&mut out, "name", name);
    push_attr(&mut out, "value", &color);
    push_attr(&mut out, "class", &class_with(field, "wp-settings-color-field"));
    push_extra_attributes(&mut out, field);
    out.push_str(" />");
    out
}

fn render_textarea(field: &FieldDef, name: &str, value: &SettingValue, rows: u32, cols: u32) -> String {
    let mut out = String::from("<textarea");
    push_attr(&mut out, "id", &field.id);
    push_attr(&mut out, "name", name);
    push_attr(&mut out, "rows", &rows.to_string());
    push_attr(&mut out, "cols", &cols.to_string());
    push_attr(&mut out, "class", &class_or(field, "large-text"));
    push_attr(&mut out, "placeholder", &field.placeholder);
    push_extra_attributes(&mut out, field);
    out.push('>');
    out.push_str(&encode_text(&display(value)));
    out.push_str("</textarea>");
    out
}

fn render_wysiwyg(
    field: &FieldDef,
    name: &str,
    value: &SettingValue,
    rows: u32,
    media_buttons: bool,
    teeny: bool,
) -> String {
    let mut out = String::from("<div");
    push_attr(&mut out, "id", &format!("wp-{}-wrap", field.id));
    push_attr(
        &mut out,
        "class",
        if teeny {
            "wp-core-ui wp-editor-wrap wp-editor-teeny"
        } else {
            "wp-core-ui wp-editor-wrap"
        },
    );
    out.push('>');
    if media_buttons {
        out.push_str(
            "<div class=\"wp-media-buttons\"><button type=\"button\" class=\"button insert-media add_media\">Add Media</button></div>",
        );
    }
    out.push_str("<textarea");
    push_attr(&mut out, "id", &field.id);
    push_attr(&mut out, "name", name);
    push_attr(&mut out, "rows", &rows.to_string());
    push_attr(&mut out, "class", "wp-editor-area");
    out.push('>');
    out.push_str(&encode_text(&display(value)));
    out.push_str("</textarea></div>");
    out
}

fn render_checkbox(field: &FieldDef, name: &str, value: &SettingValue, label: Option<&str>) -> String {
    let mut out = String::from("<input type=\"checkbox\"");
    push_attr(&mut out, "id", &field.id);
    push_attr(&mut out, "name", name);
    push_attr(&mut out, "value", "1");
    push_attr(&mut out, "class", &class_or(field, ""));
    if display(value) == "1" {
        out.push_str(" checked=\"checked\"");
    }
    push_extra_attributes(&mut out, field);
    out.push_str(" />");
    if let Some(label) = label.filter(|l| !l.is_empty()) {
        out.push_str("<label");
        push_attr(&mut out, "for", &field.id);
        out.push('>');
        out.push_str(&encode_text(label));
        out.push_str("</label>");
    }
    out
}

fn render_toggle(
    field: &FieldDef,
    name: &str,
    value: &SettingValue,
    on_text: &str,
    off_text: &str,
) -> String {
    let mut out = String::from("<label class=\"wp-settings-toggle\"><input type=\"checkbox\"");
    push_attr(&mut out, "id", &field.id);
    push_attr(&mut out, "name", name);
    push_attr(&mut out, "value", "1");
    push_attr(&mut out, "class", &class_or(field, ""));
    if display(value) == "1" {
        out.push_str(" checked=\"checked\"");
    }
    push_attr(&mut out, "data-on-text", on_text);
    push_attr(&mut out, "data-off-text", off_text);
    push_extra_attributes(&mut out, field);
    out.push_str(" /><span class=\"wp-settings-toggle-slider\"></span><span class=\"wp-settings-toggle-text\">");
    out.push_str(&encode_text(if value.is_blank() { off_text } else { on_text }));
    out.push_str("</span></label>");
    out
}

fn render_radio(field: &FieldDef, name: &str, value: &SettingValue, options: &Options) -> String {
    if options.is_empty() {
        return String::new();
    }
    let current = display(value);
    let class = class_or(field, "");
    let mut out = String::from("<div class=\"wp-settings-radio-group\">");
    for (option_value, option_label) in options {
        let radio_id = format!("{}-{}", field.id, markup::sanitize_key(option_value));
        out.push_str("<div class=\"wp-settings-radio-option\"><input type=\"radio\"");
        push_attr(&mut out, "id", &radio_id);
        push_attr(&mut out, "name", name);
        push_attr(&mut out, "value", option_value);
        push_attr(&mut out, "class", &class);
        if current == *option_value {
            out.push_str(" checked=\"checked\"");
        }
        push_extra_attributes(&mut out, field);
        out.push_str(" /><label");
        push_attr(&mut out, "for", &radio_id);
        out.push('>');
        out.push_str(&encode_text(option_label));
        out.push_str("</label></div>");
    }
    out.push_str("</div>");
    out
}

fn render_select(field: &FieldDef, name: &str, value: &SettingValue, options: &Options) -> String {
    if options.is_empty() {
        return String::new();
    }
    let current = display(value);
    let mut out = String::from("<select");
    push_attr(&mut out, "id", &field.id);
    push_attr(&mut out, "name", name);
    push_attr(&mut out, "class", &class_with(field, "wp-settings-select"));
    push_extra_attributes(&mut out, field);
    out.push('>');
    push_options(&mut out, options, |key| current == key);
    out.push_str("</select>");
    out
}

fn render_multiselect(
    field: &FieldDef,
    name: &str,
    value: &SettingValue,
    options: &Options,
    size: u32,
) -> String {
    if options.is_empty() {
        return String::new();
    }
    let selected = value.as_list().unwrap_or_default();
    let mut out = String::from("<select");
    push_attr(&mut out, "id", &field.id);
    push_attr(&mut out, "name", &format!("{name}[]"));
    push_attr(&mut out, "class", &class_with(field, "wp-settings-multiselect"));
    push_attr(&mut out, "multiple", "multiple");
    push_attr(&mut out, "size", &size.to_string());
    push_extra_attributes(&mut out, field);
    out.push('>');
    push_options(&mut out, options, |key| selected.iter().any(|s| s == key));
    out.push_str("</select>");
    out
}

fn push_options(out: &mut String, options: &Options, is_selected: impl Fn(&str) -> bool) {
    for (option_value, option_label) in options {
        out.push_str("<option");
        push_attr(out, "value", option_value);
        if is_selected(option_value) {
            out.push_str(" selected=\"selected\"");
        }
        out.push('>');
        out.push_str(&encode_text(option_label));
        out.push_str("</option>");
    }
}
