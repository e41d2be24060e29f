use crate::html::{attributes_of, rewrite_fragment, ElementAction};

pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, html: &str) -> String;
}

const DROPPED_ELEMENTS: &[&str] = &[
    "script", "style", "iframe", "frame", "frameset", "object", "embed", "applet", "form",
    "input", "button", "textarea", "select", "base", "link", "meta",
];

const URL_ATTRIBUTES: &[&str] = &["href", "src", "poster", "data-src", "data-url", "action"];

/// Conservative allow-everything-else sanitizer.
///
/// Removes active elements, event handler attributes and script URLs; layout and
/// formatting markup passes through.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicSanitizer;

impl Sanitizer for BasicSanitizer {
    fn sanitize(&self, html: &str) -> String {
        rewrite_fragment(html, |element| {
            if DROPPED_ELEMENTS.contains(&element.value().name()) {
                return ElementAction::Drop;
            }
            let attrs = attributes_of(element)
                .into_iter()
                .filter(|(name, value)| is_safe_attribute(name, value))
                .collect();
            ElementAction::Keep(attrs)
        })
    }
}

fn is_safe_attribute(name: &str, value: &str) -> bool {
    let name = name.to_ascii_lowercase();
    if name.starts_with("on") || name == "srcdoc" {
        return false;
    }
    if URL_ATTRIBUTES.contains(&name.as_str()) {
        let compact = value
            .chars()
            .filter(|c| !c.is_whitespace() && !c.is_control())
            .collect::<String>()
            .to_ascii_lowercase();
        return !(compact.starts_with("javascript:") || compact.starts_with("vbscript:"));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::{BasicSanitizer, Sanitizer};

    #[test]
    fn scripts_and_handlers_are_removed() {
        let html = r#"<p onclick="steal()">hi<script>steal()</script></p><a href=" javascript:alert(1)">x</a>"#;
        assert_eq!(BasicSanitizer.sanitize(html), "<p>hi</p><a>x</a>");
    }

    #[test]
    fn formatting_and_media_survive() {
        let html = r#"<p><b>bold</b><img src="https://cdn.example/a.png"></p>"#;
        assert_eq!(BasicSanitizer.sanitize(html), html);
    }
}
