//! Markup filtering used by the text and rich-text sanitizers.
//!
//! Three levels are provided: plain text (all markup removed), a restricted
//! safe-HTML subset for rich text, and key normalisation for identifiers
//! taken from requests. Every filter here is idempotent.

use std::collections::HashSet;

use html_escape::{decode_html_entities, encode_double_quoted_attribute};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static SCRIPT_STYLE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").expect("valid regex")
});

static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));

static LINE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n\t ]+").expect("valid regex"));

static HTML_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<(/?)([A-Za-z][A-Za-z0-9]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
        .expect("valid regex")
});

static HTML_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#,
    )
    .expect("valid regex")
});

/// Attributes allowed on every permitted tag.
const GLOBAL_ATTRIBUTES: &[&str] = &["class", "id", "title", "dir", "lang", "role", "aria-label"];

/// Tags permitted in rich text, with their tag-specific attributes.
const ALLOWED_TAGS: &[(&str, &[&str])] = &[
    ("a", &["href", "target", "rel", "name"]),
    ("abbr", &[]),
    ("b", &[]),
    ("blockquote", &["cite"]),
    ("br", &[]),
    ("caption", &[]),
    ("code", &[]),
    ("del", &["datetime"]),
    ("div", &[]),
    ("em", &[]),
    ("figcaption", &[]),
    ("figure", &[]),
    ("h1", &[]),
    ("h2", &[]),
    ("h3", &[]),
    ("h4", &[]),
    ("h5", &[]),
    ("h6", &[]),
    ("hr", &[]),
    ("i", &[]),
    ("img", &["src", "alt", "width", "height", "loading"]),
    ("ins", &["datetime"]),
    ("li", &[]),
    ("ol", &["start", "type", "reversed"]),
    ("p", &[]),
    ("pre", &[]),
    ("s", &[]),
    ("small", &[]),
    ("span", &[]),
    ("strong", &[]),
    ("sub", &[]),
    ("sup", &[]),
    ("table", &[]),
    ("tbody", &[]),
    ("td", &["colspan", "rowspan"]),
    ("tfoot", &[]),
    ("th", &["colspan", "rowspan", "scope"]),
    ("thead", &[]),
    ("tr", &[]),
    ("u", &[]),
    ("ul", &[]),
];

/// URL schemes accepted in links and in URL fields.
pub const ALLOWED_PROTOCOLS: &[&str] = &[
    "http", "https", "ftp", "ftps", "mailto", "news", "irc", "irc6", "ircs", "gopher", "nntp",
    "feed", "telnet", "mms", "rtsp", "sms", "svn", "tel", "fax", "xmpp", "webcal", "urn",
];

/// Remove every tag, dropping `<script>` and `<style>` blocks with their content.
pub fn strip_all_tags(input: &str) -> String {
    let without_blocks = SCRIPT_STYLE_BLOCK.replace_all(input, "");
    ANY_TAG.replace_all(&without_blocks, "").into_owned()
}

/// Reduce input to plain single-line text.
///
/// Tags are removed, a leftover `<` is encoded, runs of whitespace collapse to
/// one space and the result is trimmed.
pub fn sanitize_text(input: &str) -> String {
    let stripped = strip_all_tags(input).replace('<', "&lt;");
    LINE_WHITESPACE
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

/// Like [`sanitize_text`] but keeps line breaks and inner whitespace.
pub fn sanitize_textarea(input: &str) -> String {
    strip_all_tags(input)
        .replace('<', "&lt;")
        .trim()
        .to_string()
}

/// Normalise an identifier: lowercase, keeping only `[a-z0-9_-]`.
pub fn sanitize_key(input: &str) -> String {
    input
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Filter rich text down to the safe-HTML subset.
///
/// Permitted tags are re-emitted in a canonical form with only their allowed
/// attributes; other tags are removed while their text is kept. Script and
/// style blocks and comments are removed entirely.
pub fn sanitize_html(input: &str) -> String {
    let without_comments = COMMENT.replace_all(input, "");
    let cleaned = SCRIPT_STYLE_BLOCK.replace_all(&without_comments, "");

    let mut out = String::with_capacity(cleaned.len());
    let mut last = 0;
    for caps in HTML_TAG.captures_iter(&cleaned) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&cleaned[last..whole.start()].replace('<', "&lt;"));
        if let Some(tag) = rebuild_tag(&caps) {
            out.push_str(&tag);
        }
        last = whole.end();
    }
    out.push_str(&cleaned[last..].replace('<', "&lt;"));
    out
}

fn allowed_attributes(tag: &str) -> Option<&'static [&'static str]> {
    ALLOWED_TAGS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, attrs)| *attrs)
}

fn rebuild_tag(caps: &Captures<'_>) -> Option<String> {
    let closing = !caps[1].is_empty();
    let name = caps[2].to_ascii_lowercase();
    let tag_attrs = allowed_attributes(&name)?;

    if closing {
        return Some(format!("</{name}>"));
    }

    let raw_attrs = caps.get(3).map_or("", |m| m.as_str()).trim();
    let self_closing = raw_attrs.ends_with('/');
    let raw_attrs = raw_attrs.trim_end_matches('/');

    let mut seen = HashSet::new();
    let mut out = format!("<{name}");
    for attr in HTML_ATTR.captures_iter(raw_attrs) {
        let attr_name = attr[1].to_ascii_lowercase();
        if !(tag_attrs.contains(&attr_name.as_str())
            || GLOBAL_ATTRIBUTES.contains(&attr_name.as_str()))
        {
            continue;
        }
        if !seen.insert(attr_name.clone()) {
            continue;
        }
        let value = attr
            .get(2)
            .or_else(|| attr.get(3))
            .or_else(|| attr.get(4))
            .map(|m| m.as_str());
        match value {
            Some(value) => {
                if (attr_name == "href" || attr_name == "src") && !has_allowed_protocol(value) {
                    continue;
                }
                let decoded = decode_html_entities(value);
                out.push_str(&format!(
                    " {attr_name}=\"{}\"",
                    encode_double_quoted_attribute(&decoded)
                ));
            }
            None => {
                out.push(' ');
                out.push_str(&attr_name);
            }
        }
    }
    if self_closing {
        out.push_str(" /");
    }
    out.push('>');
    Some(out)
}

/// Whether a link target is relative or uses an allowed scheme.
///
/// Character references are decoded first, the way a browser reads an
/// attribute value. A `&` left before the first `:`, `/`, `?` or `#` is an
/// undecoded reference and is rejected.
pub fn has_allowed_protocol(value: &str) -> bool {
    let compact: String = decode_html_entities(value)
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    let boundary = compact.find([':', '/', '?', '#']).unwrap_or(compact.len());
    if compact[..boundary].contains('&') {
        return false;
    }
    if compact[boundary..].chars().next() != Some(':') {
        return true;
    }
    let scheme = compact[..boundary].to_ascii_lowercase();
    ALLOWED_PROTOCOLS.contains(&scheme.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_text_strips_markup_and_whitespace() {
        assert_eq!(
            sanitize_text("  <b>Hello</b>\n\tworld  <script>alert(1)</script> "),
            "Hello world"
        );
    }

    #[test]
    fn test_sanitize_text_encodes_stray_angle_bracket() {
        assert_eq!(sanitize_text("a < b"), "a &lt; b");
        assert_eq!(sanitize_text(&sanitize_text("a < b")), "a &lt; b");
    }

    #[test]
    fn test_sanitize_textarea_keeps_newlines() {
        assert_eq!(
            sanitize_textarea("line one\n<i>line</i> two\n"),
            "line one\nline two"
        );
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("Advanced Tab!"), "advancedtab");
        assert_eq!(sanitize_key("my_tab-2"), "my_tab-2");
    }

    #[test]
    fn test_sanitize_html_keeps_allowed_tags() {
        let input = r#"<p class="intro" onclick="evil()">Hi <strong>there</strong></p>"#;
        assert_eq!(
            sanitize_html(input),
            r#"<p class="intro">Hi <strong>there</strong></p>"#
        );
    }

    #[test]
    fn test_sanitize_html_removes_disallowed_tags_and_scripts() {
        let input = "<div>ok<script>alert(1)</script><iframe src=\"x\"></iframe><!-- c --></div>";
        assert_eq!(sanitize_html(input), "<div>ok</div>");
    }

    #[test]
    fn test_sanitize_html_drops_javascript_links() {
        let input = r#"<a href="javascript:alert(1)" title='t'>x</a><a href="/rel">y</a>"#;
        assert_eq!(
            sanitize_html(input),
            r#"<a title="t">x</a><a href="/rel">y</a>"#
        );
    }

    #[test]
    fn test_sanitize_html_canonicalises_quotes_and_self_closing() {
        let input = r#"<IMG SRC='https://example.com/a.png' alt='say "hi"'/>"#;
        let once = sanitize_html(input);
        assert_eq!(
            once,
            r#"<img src="https://example.com/a.png" alt="say &quot;hi&quot;" />"#
        );
        assert_eq!(sanitize_html(&once), once);
    }

    #[test]
    fn test_has_allowed_protocol() {
        assert!(has_allowed_protocol("https://example.com"));
        assert!(has_allowed_protocol("/path:with-colon"));
        assert!(has_allowed_protocol("mailto:a@example.com"));
        assert!(!has_allowed_protocol("java\tscript:alert(1)"));
        assert!(!has_allowed_protocol("data:text/html,hi"));
        assert!(has_allowed_protocol("/a?x=1&amp;y=2"));
        assert!(has_allowed_protocol("https&#58;//example.com"));
    }

    #[test]
    fn test_has_allowed_protocol_decodes_references() {
        assert!(!has_allowed_protocol("javascript&#58;alert(1)"));
        assert!(!has_allowed_protocol("javascript&#x3a;alert(1)"));
        assert!(!has_allowed_protocol("javascript&#X3A;alert(1)"));
        assert!(!has_allowed_protocol("javascript&colon;alert(1)"));
        assert!(!has_allowed_protocol("javascript&#58alert(1)"));
        assert!(!has_allowed_protocol("jav&#x09;ascript:alert(1)"));
    }

    #[test]
    fn test_sanitize_html_drops_encoded_javascript_links() {
        for href in [
            "javascript&#58;alert(1)",
            "javascript&#x3a;alert(1)",
            "javascript&colon;alert(1)",
        ] {
            let input = format!(r#"<a href="{href}">x</a>"#);
            assert_eq!(sanitize_html(&input), "<a>x</a>", "{href}");
        }
    }

    #[test]
    fn test_sanitize_html_reencodes_ampersands_in_attributes() {
        let once = sanitize_html(r#"<a href="/a?x=1&y=2" title="Tom &amp; Jerry">x</a>"#);
        assert_eq!(
            once,
            r#"<a href="/a?x=1&amp;y=2" title="Tom &amp; Jerry">x</a>"#
        );
        assert_eq!(sanitize_html(&once), once);
    }
}
