//! End-to-end behaviour of a settings page: validate, merge and render.

use serde_json::json;
use settingsgen_fields::{
    FieldDef, PageConfig, RequestContext, SchemaBuilder, SettingValue, SettingsPage,
    SettingsRecord, Submission,
};

fn audio_page() -> SettingsPage {
    let schema = SchemaBuilder::new()
        .field(FieldDef::number("volume", "Volume").default_value(10.0))
        .field(FieldDef::text("station", "Station"))
        .field(FieldDef::multiselect(
            "colors",
            "Colors",
            [("red", "Red"), ("green", "Green"), ("blue", "Blue")],
        ))
        .set_multiselect_default("colors", ["red", "blue"])
        .build()
        .unwrap();
    SettingsPage::new(PageConfig::new("audio", "Audio"), schema)
}

#[test]
fn number_field_accepts_numbers_and_falls_back_to_default() {
    let page = audio_page();

    let record = page.validate(&Submission::new().with("volume", "7.5"), None);
    assert_eq!(record.get("volume"), Some(&SettingValue::Number(7.5)));

    let record = page.validate(&Submission::new().with("volume", "abc"), Some(&record));
    assert_eq!(record.get("volume"), Some(&SettingValue::Number(10.0)));
}

#[test]
fn multiselect_default_applies_only_to_first_save() {
    let page = audio_page();
    let empty = Submission::new().with("colors", json!([]));

    let first = page.validate(&empty, None);
    assert_eq!(first.get("colors"), Some(&SettingValue::from(vec!["red", "blue"])));

    let mut cleared = first.clone();
    cleared.insert("colors", SettingValue::from(vec!["green"]));
    let second = page.validate(&empty, Some(&cleared));
    assert_eq!(second.get("colors"), Some(&SettingValue::List(vec![])));
}

#[test]
fn disjoint_saves_merge() {
    let page = audio_page();
    let first = page.validate(&Submission::new().with("volume", 3), None);
    let second = page.validate(&Submission::new().with("station", "  <b>Jazz</b> FM "), Some(&first));

    assert_eq!(second.get("volume"), Some(&SettingValue::Number(3.0)));
    assert_eq!(second.get("station"), Some(&SettingValue::from("Jazz FM")));
    assert!(second.get("colors").is_none());
}

#[test]
fn form_pairs_feed_multiselect() {
    let page = audio_page();
    let submission = Submission::from_pairs([("colors[]", "blue"), ("colors[]", "pink")]);
    let record = page.validate(&submission, Some(&SettingsRecord::new()));
    assert_eq!(record.get("colors"), Some(&SettingValue::from(vec!["blue"])));
}

#[test]
fn tabs_partition_rendered_fields() {
    let schema = SchemaBuilder::new()
        .tab("general", "General", "")
        .tab("advanced", "Advanced", "")
        .field(FieldDef::text("title", "Title").in_tab("general"))
        .field(FieldDef::toggle("cache", "Cache").in_tab("advanced"))
        .build()
        .unwrap();
    let page = SettingsPage::new(PageConfig::new("site", "Site"), schema);
    let record = SettingsRecord::new();

    let general = page.render_page(&record, &RequestContext::new().with_tab("general"));
    assert!(general.contains("site[title]"));
    assert!(!general.contains("site[cache]"));

    let advanced = page.render_page(&record, &RequestContext::new().with_tab("advanced"));
    assert!(advanced.contains("site[cache]"));
    assert!(!advanced.contains("site[title]"));
}

#[test]
fn rendered_page_reflects_saved_record() {
    let page = audio_page();
    let record = page.validate(
        &Submission::new()
            .with("volume", "4")
            .with("colors", json!(["green"])),
        None,
    );
    let html = page.render_page(&record, &RequestContext::new());
    assert!(html.contains("value=\"4\""));
    assert!(html.contains("<option value=\"green\" selected=\"selected\">Green</option>"));
    assert!(html.contains("<option value=\"red\">Red</option>"));
}
