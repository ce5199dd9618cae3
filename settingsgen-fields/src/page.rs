//! A settings page: schema plus host configuration, validation and page markup.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extensions::Extensions;
use crate::markup;
use crate::media::{MediaResolver, NoMedia};
use crate::record::{SettingsRecord, Submission};
use crate::render::FieldRenderer;
use crate::sanitize::{self, SanitizeContext};
use crate::schema::{Section, SettingsSchema};

fn default_capability() -> String {
    "manage_options".to_string()
}

fn default_menu_icon() -> String {
    "dashicons-admin-generic".to_string()
}

/// Where the page is placed in the host navigation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MenuLocation {
    Menu {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<u32>,
        #[serde(default = "default_menu_icon")]
        icon: String,
    },
    Submenu {
        parent: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<u32>,
    },
}

impl Default for MenuLocation {
    fn default() -> Self {
        MenuLocation::Menu {
            position: None,
            icon: default_menu_icon(),
        }
    }
}

/// Host-facing description of a settings page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageConfig {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub menu_title: String,
    #[serde(default = "default_capability")]
    pub capability: String,
    #[serde(default)]
    pub location: MenuLocation,
}

impl PageConfig {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            id: id.into(),
            menu_title: title.clone(),
            title,
            capability: default_capability(),
            location: MenuLocation::default(),
        }
    }

    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = capability.into();
        self
    }

    pub fn location(mut self, location: MenuLocation) -> Self {
        self.location = location;
        self
    }

    /// Settings group name posted with the form.
    pub fn option_group(&self) -> String {
        format!("{}_group", self.id)
    }

    /// Title shown in navigation, falling back to the page title.
    pub fn menu_title(&self) -> &str {
        if self.menu_title.is_empty() {
            &self.title
        } else {
            &self.menu_title
        }
    }
}

/// Per-request inputs that would otherwise come from ambient host state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    pub tab: Option<String>,
    pub capabilities: BTreeSet<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tab(mut self, tab: impl Into<String>) -> Self {
        self.tab = Some(tab.into());
        self
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    pub fn can(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}

/// A schema bound to its page configuration and dispatch collaborators.
#[derive(Clone)]
pub struct SettingsPage {
    config: PageConfig,
    schema: SettingsSchema,
    extensions: Extensions,
    media: Arc<dyn MediaResolver>,
}

impl SettingsPage {
    pub fn new(config: PageConfig, schema: SettingsSchema) -> Self {
        Self {
            config,
            schema,
            extensions: Extensions::new(),
            media: Arc::new(NoMedia),
        }
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_media(mut self, media: Arc<dyn MediaResolver>) -> Self {
        self.media = media;
        self
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn schema(&self) -> &SettingsSchema {
        &self.schema
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn renderer(&self) -> FieldRenderer<'_> {
        FieldRenderer::new(&self.config.id, &self.extensions, self.media.as_ref())
    }

    /// Sanitize a submission and merge it over `existing`.
    ///
    /// Fields absent from the submission, or submitted as null, keep their
    /// prior value. Keys that are not schema fields are ignored.
    pub fn validate(&self, submission: &Submission, existing: Option<&SettingsRecord>) -> SettingsRecord {
        let ctx = SanitizeContext::new(existing.is_some(), &self.extensions);
        let mut output = existing.cloned().unwrap_or_default();
        let mut updated = 0usize;
        for field in self.schema.fields() {
            let Some(raw) = submission.get(&field.id) else {
                continue;
            };
            if raw.is_null() {
                continue;
            }
            output.insert(field.id.clone(), sanitize::sanitize(field, raw, &ctx));
            updated += 1;
        }
        debug!(page = %self.config.id, updated, total = output.len(), "validated submission");
        output
    }

    /// Markup for one field bound to `record`, or `None` for an unknown id.
    pub fn render_field(&self, field_id: &str, record: &SettingsRecord) -> Option<String> {
        let field = self.schema.field(field_id)?;
        Some(self.renderer().render(field, record.get(field_id)))
    }

    pub fn active_tab(&self, request: &RequestContext) -> Option<&str> {
        self.schema.resolve_tab(request.tab.as_deref())
    }

    pub fn sections(&self) -> Vec<Section<'_>> {
        self.schema.sections()
    }

    /// Full page markup: heading, tab navigation, and the active section's
    /// fields inside the settings form.
    pub fn render_page(&self, record: &SettingsRecord, request: &RequestContext) -> String {
        let active = self.active_tab(request);
        let page_id = encode_double_quoted_attribute(&self.config.id);
        let mut out = String::from("<div class=\"wrap\">");
        out.push_str(&format!("<h1>{}</h1>", encode_text(&self.config.title)));

        if self.schema.has_tabs() {
            out.push_str("<h2 class=\"nav-tab-wrapper\">");
            for tab in self.schema.tabs() {
                let class = if Some(tab.id.as_str()) == active {
                    "nav-tab nav-tab-active"
                } else {
                    "nav-tab"
                };
                out.push_str(&format!(
                    "<a href=\"?page={page_id}&amp;tab={}\" class=\"{class}\">{}</a>",
                    encode_double_quoted_attribute(&tab.id),
                    encode_text(&tab.title)
                ));
            }
            out.push_str("</h2>");
        }

        out.push_str("<form method=\"post\" action=\"options.php\">");
        out.push_str(&format!(
            "<input type=\"hidden\" name=\"option_page\" value=\"{}\" />",
            encode_double_quoted_attribute(&self.config.option_group())
        ));
        out.push_str("<input type=\"hidden\" name=\"action\" value=\"update\" />");

        let renderer = self.renderer();
        for section in self.sections() {
            if active.is_some_and(|tab| tab != section.id) {
                continue;
            }
            if !section.title.is_empty() {
                out.push_str(&format!("<h2>{}</h2>", encode_text(section.title)));
            }
            if !section.description.is_empty() {
                out.push_str(&format!(
                    "<p>{}</p>",
                    markup::sanitize_html(section.description)
                ));
            }
            out.push_str("<table class=\"form-table\" role=\"presentation\">");
            for field in &section.fields {
                out.push_str(&format!(
                    "<tr><th scope=\"row\"><label for=\"{}\">{}</label></th><td>",
                    encode_double_quoted_attribute(&field.id),
                    encode_text(&field.title)
                ));
                out.push_str(&renderer.render(field, record.get(&field.id)));
                out.push_str("</td></tr>");
            }
            out.push_str("</table>");
        }

        out.push_str(
            "<p class=\"submit\"><input type=\"submit\" name=\"submit\" id=\"submit\" class=\"button button-primary\" value=\"Save Changes\" /></p>",
        );
        out.push_str("</form></div>");
        out
    }
}

impl fmt::Debug for SettingsPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsPage")
            .field("config", &self.config)
            .field("schema", &self.schema)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}
