//! YAML page definitions.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FieldsError, Result};
use crate::page::{PageConfig, SettingsPage};
use crate::schema::SchemaBuilder;
use crate::types::{FieldDef, TabDef};

/// A complete page as written in a definition file.
///
/// ```yaml
/// page:
///   id: demo
///   title: Demo Settings
/// tabs:
///   - id: general
///     title: General
/// fields:
///   - id: volume
///     title: Volume
///     type: { kind: number, min: 0, max: 11 }
///     default: 10
///     tab: general
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageDefinition {
    pub page: PageConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tabs: Vec<TabDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_tab: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl PageDefinition {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let definition: PageDefinition = serde_yaml_ng::from_str(yaml)?;
        if definition.page.id.trim().is_empty() {
            return Err(FieldsError::InvalidDefinition {
                message: "page id must not be empty".to_string(),
            });
        }
        Ok(definition)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        debug!(path = %path.display(), "loaded page definition");
        Self::from_yaml(&content)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Build the schema and bind it to the page configuration.
    pub fn into_page(self) -> Result<SettingsPage> {
        let mut builder = self.tabs.into_iter().fold(SchemaBuilder::new(), SchemaBuilder::add_tab);
        if let Some(default) = self.default_tab {
            builder = builder.default_tab(default);
        }
        let schema = builder.fields(self.fields).build()?;
        Ok(SettingsPage::new(self.page, schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::Extensions;
    use crate::sanitize::{sanitize, SanitizeContext};
    use crate::types::{FieldType, SettingValue};
    use std::io::Write;

    const DEMO: &str = r#"
page:
  id: demo
  title: Demo Settings
  location:
    type: menu
    position: 80
tabs:
  - id: general
    title: General
  - id: advanced
    title: Advanced
    description: For experts
fields:
  - id: volume
    title: Volume
    type: { kind: number, min: 0, max: 11 }
    default: 10
    tab: general
  - id: colors
    title: Colors
    type:
      kind: multiselect
      options: { red: Red, green: Green, blue: Blue }
    default: red
    tab: advanced
"#;

    #[test]
    fn test_parse_and_build() {
        let page = PageDefinition::from_yaml(DEMO).unwrap().into_page().unwrap();
        assert_eq!(page.id(), "demo");
        assert_eq!(page.schema().default_tab(), Some("general"));
        let colors = page.schema().field("colors").unwrap();
        assert!(matches!(colors.type_, FieldType::MultiSelect { size: 5, .. }));
        assert_eq!(colors.default, Some(SettingValue::from(vec!["red"])));
    }

    #[test]
    fn test_number_fallback_is_stable() {
        let page = PageDefinition::from_yaml(DEMO).unwrap().into_page().unwrap();
        let volume = page.schema().field("volume").unwrap();
        assert_eq!(volume.default, Some(SettingValue::Number(10.0)));

        let extensions = Extensions::new();
        let ctx = SanitizeContext::new(true, &extensions);
        let once = sanitize(volume, &serde_json::json!("abc"), &ctx);
        let twice = sanitize(volume, &once.to_raw(), &ctx);
        assert_eq!(once, SettingValue::Number(10.0));
        assert_eq!(twice, once);
    }

    #[test]
    fn test_explicit_default_tab_must_exist() {
        let yaml = format!("{DEMO}default_tab: missing\n");
        let err = PageDefinition::from_yaml(&yaml).unwrap().into_page().unwrap_err();
        assert!(matches!(err, FieldsError::UnknownTab { .. }));
    }

    #[test]
    fn test_empty_page_id_rejected() {
        let err = PageDefinition::from_yaml("page: { id: ' ', title: X }\n").unwrap_err();
        assert!(matches!(err, FieldsError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = PageDefinition::from_yaml("page: [").unwrap_err();
        assert!(matches!(err, FieldsError::Yaml(_)));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DEMO.as_bytes()).unwrap();
        let definition = PageDefinition::load(file.path()).await.unwrap();
        assert_eq!(definition.fields.len(), 2);

        let yaml = definition.to_yaml().unwrap();
        assert_eq!(PageDefinition::from_yaml(&yaml).unwrap(), definition);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = PageDefinition::load("/definitely/not/here.yaml").await.unwrap_err();
        assert!(matches!(err, FieldsError::Io(_)));
    }
}
