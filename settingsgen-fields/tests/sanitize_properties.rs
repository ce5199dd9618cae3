//! Property-based tests for sanitizer dispatch.

use proptest::prelude::*;
use serde_json::Value;
use settingsgen_fields::{
    sanitize, Extensions, FieldDef, PageDefinition, SanitizeContext, SettingValue,
};

const COLOR_OPTIONS: [(&str, &str); 4] = [
    ("red", "Red"),
    ("green", "Green"),
    ("blue", "Blue"),
    ("42", "Answer"),
];

/// One field of every built-in type, each with a default that is itself a
/// valid value for the field.
fn builtin_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::text("text", "Text"),
        FieldDef::textarea("textarea", "Textarea"),
        FieldDef::wysiwyg("wysiwyg", "Rich text"),
        FieldDef::checkbox("checkbox", "Checkbox"),
        FieldDef::toggle("toggle", "Toggle"),
        FieldDef::radio("radio", "Radio", COLOR_OPTIONS).default_value("red"),
        FieldDef::select("select", "Select", COLOR_OPTIONS).default_value("blue"),
        FieldDef::multiselect("multiselect", "Multi", COLOR_OPTIONS).default_value(vec!["green"]),
        FieldDef::media("media", "Media"),
        FieldDef::email("email", "Email"),
        FieldDef::url("url", "Url"),
        FieldDef::password("password", "Password"),
        FieldDef::number("number", "Number").default_value(10.0),
        FieldDef::tel("tel", "Tel"),
        FieldDef::date("date", "Date").default_value("2024-01-01"),
        FieldDef::color("color", "Color").default_value("#336699"),
    ]
}

/// The same kinds of field as [`builtin_fields`], read from a page definition
/// with plain YAML scalars as defaults.
const YAML_DEFINITION: &str = r##"
page:
  id: yaml
  title: YAML
fields:
  - { id: text, title: Text, type: { kind: text }, default: 5 }
  - { id: textarea, title: Textarea, type: { kind: textarea } }
  - { id: wysiwyg, title: Rich text, type: { kind: wysiwyg } }
  - { id: checkbox, title: Checkbox, type: { kind: checkbox }, default: true }
  - { id: toggle, title: Toggle, type: { kind: toggle } }
  - id: radio
    title: Radio
    type: { kind: radio, options: { red: Red, green: Green, "42": Answer } }
    default: 42
  - id: select
    title: Select
    type: { kind: select, options: { red: Red, blue: Blue, "42": Answer } }
    default: blue
  - id: multiselect
    title: Multi
    type: { kind: multiselect, options: { red: Red, green: Green, "42": Answer } }
    default: 42
  - { id: media, title: Media, type: { kind: media }, default: 3 }
  - { id: email, title: Email, type: { kind: email } }
  - { id: url, title: Url, type: { kind: url } }
  - { id: password, title: Password, type: { kind: password } }
  - { id: number, title: Number, type: { kind: number, min: 0, max: 11 }, default: 10 }
  - { id: ratio, title: Ratio, type: { kind: number }, default: "0.5" }
  - { id: tel, title: Tel, type: { kind: tel } }
  - { id: date, title: Date, type: { kind: date }, default: "2024-01-01" }
  - { id: color, title: Color, type: { kind: color }, default: "#336699" }
"##;

fn yaml_fields() -> Vec<FieldDef> {
    let page = PageDefinition::from_yaml(YAML_DEFINITION)
        .unwrap()
        .into_page()
        .unwrap();
    page.schema().fields().cloned().collect()
}

fn markup_fragment() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "<p>",
        "</p>",
        "<b>",
        "</b>",
        "plain words",
        "  ",
        "\n",
        "&",
        "<",
        ">",
        "<script>bad()</script>",
        "<!-- note -->",
        "<a href=\"javascript:x\">",
        "<a href=\"javascript&#58;x\">",
        "<a href='javascript&colon;x'>",
        "<a href=\"/q?a=1&amp;b=2\" title=\"&quot;t&quot;\">",
        "<a href='/rel' title='t'>",
        "</a>",
        "<img src='/a.png'/>",
        "<i class=\"c\" onclick=\"y\">",
        "<iframe>",
    ])
    .prop_map(str::to_string)
}

fn raw_value() -> impl Strategy<Value = Value> {
    let scalar = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_map(Value::from),
        "[ -~]{0,24}".prop_map(Value::String),
        prop::collection::vec(markup_fragment(), 0..8).prop_map(|parts| Value::String(parts.concat())),
        "[a-z()]{1,6}@[a-z.-]{1,10}".prop_map(Value::String),
        "(https?://)?[a-z]{1,8}\\.(com|org)(/[a-z]{0,6})?".prop_map(Value::String),
        "#[0-9a-fA-F]{2,7}".prop_map(Value::String),
        "[0-9]{4}-[0-9]{2}-[0-9]{2}".prop_map(Value::String),
        prop::sample::select(vec!["red", "green", "blue", "42", "pink"])
            .prop_map(|s| Value::String(s.to_string())),
    ];
    prop_oneof![
        4 => scalar,
        1 => prop::collection::vec(
            prop::sample::select(vec!["red", "green", "blue", "42", "pink"]),
            0..5
        )
        .prop_map(|items| Value::Array(items.into_iter().map(Value::from).collect())),
    ]
}

fn selection() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::sample::select(vec!["red", "green", "blue", "pink", "teal"]),
        0..6,
    )
    .prop_map(|items| items.into_iter().map(str::to_string).collect())
}

proptest! {
    #[test]
    fn sanitize_is_idempotent(raw in raw_value()) {
        let extensions = Extensions::new();
        let ctx = SanitizeContext::new(true, &extensions);
        for field in builtin_fields() {
            let once = sanitize(&field, &raw, &ctx);
            let twice = sanitize(&field, &once.to_raw(), &ctx);
            prop_assert_eq!(&twice, &once, "field type {}", field.type_.name());
        }
    }

    #[test]
    fn sanitize_is_idempotent_for_yaml_fields(raw in raw_value(), record_exists in any::<bool>()) {
        let extensions = Extensions::new();
        let ctx = SanitizeContext::new(record_exists, &extensions);
        let existing = SanitizeContext::new(true, &extensions);
        for field in yaml_fields() {
            let once = sanitize(&field, &raw, &ctx);
            let twice = sanitize(&field, &once.to_raw(), &existing);
            prop_assert_eq!(&twice, &once, "field {}", field.id);
        }
    }

    #[test]
    fn rich_text_never_keeps_script_links(parts in prop::collection::vec(markup_fragment(), 0..10)) {
        let field = FieldDef::wysiwyg("w", "W");
        let extensions = Extensions::new();
        let ctx = SanitizeContext::new(true, &extensions);
        let out = sanitize(&field, &Value::String(parts.concat()), &ctx).display_string();
        prop_assert!(!out.contains("javascript"), "{}", out);
    }

    #[test]
    fn multiselect_json_string_matches_array(items in selection(), record_exists in any::<bool>()) {
        let extensions = Extensions::new();
        let ctx = SanitizeContext::new(record_exists, &extensions);
        let field = FieldDef::multiselect("colors", "Colors", COLOR_OPTIONS);

        let as_array = Value::Array(items.iter().cloned().map(Value::String).collect());
        let as_json = Value::String(serde_json::to_string(&items).unwrap());

        let from_array = sanitize(&field, &as_array, &ctx);
        let from_json = sanitize(&field, &as_json, &ctx);
        prop_assert_eq!(&from_json, &from_array);
        if let SettingValue::List(kept) = &from_array {
            prop_assert!(kept.iter().all(|item| item != "pink" && item != "teal"));
        }
    }

    #[test]
    fn choice_outside_options_yields_default(value in "[a-z]{1,8}") {
        prop_assume!(!COLOR_OPTIONS.iter().any(|(key, _)| *key == value));
        let extensions = Extensions::new();
        let ctx = SanitizeContext::new(true, &extensions);
        let radio = FieldDef::radio("r", "R", COLOR_OPTIONS).default_value("green");
        let select = FieldDef::select("s", "S", COLOR_OPTIONS);
        prop_assert_eq!(sanitize(&radio, &Value::from(value.clone()), &ctx), SettingValue::from("green"));
        prop_assert_eq!(sanitize(&select, &Value::from(value), &ctx), SettingValue::from(""));
    }

    #[test]
    fn only_iso_dates_survive(value in "[0-9/ -]{0,12}") {
        let extensions = Extensions::new();
        let ctx = SanitizeContext::new(true, &extensions);
        let field = FieldDef::date("d", "D").default_value("1970-01-01");
        let out = sanitize(&field, &Value::from(value.clone()), &ctx);
        let shaped = value.len() == 10
            && value.char_indices().all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
        if shaped {
            prop_assert_eq!(out, SettingValue::from(value));
        } else {
            prop_assert_eq!(out, SettingValue::from("1970-01-01"));
        }
    }
}
