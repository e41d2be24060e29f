//! HTML re-serialization with per-element attribute control.
//!
//! scraper trees are read-only, so rewriting a fragment means walking it and writing
//! it back out while a callback decides what each element's attributes become.

use ego_tree::NodeRef;
use html_escape::{encode_double_quoted_attribute, encode_text};
use scraper::node::Node;
use scraper::{ElementRef, Html};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose text the HTML serializer writes without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

const HIDDEN_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub(crate) type Attributes = Vec<(String, String)>;

/// What to do with one element while writing.
pub(crate) enum ElementAction {
    /// Write the element with these attributes, then its children.
    Keep(Attributes),
    /// Leave the element and everything below it out.
    Drop,
}

pub(crate) fn attributes_of(element: ElementRef<'_>) -> Attributes {
    element
        .value()
        .attrs()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

/// Parse `html` as a fragment and write it back, consulting `on_element` for every element.
pub(crate) fn rewrite_fragment<F>(html: &str, mut on_element: F) -> String
where
    F: FnMut(ElementRef<'_>) -> ElementAction,
{
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    for child in fragment.root_element().children() {
        write_node(child, &mut on_element, false, &mut out);
    }
    out
}

fn write_node<F>(node: NodeRef<'_, Node>, on_element: &mut F, raw_text: bool, out: &mut String)
where
    F: FnMut(ElementRef<'_>) -> ElementAction,
{
    match node.value() {
        Node::Text(text) => {
            if raw_text {
                out.push_str(&**text);
            } else {
                out.push_str(&encode_text(&**text));
            }
        }
        Node::Element(_) => {
            if let Some(element) = ElementRef::wrap(node) {
                write_element(element, on_element, out);
            }
        }
        Node::Document | Node::Fragment => {
            for child in node.children() {
                write_node(child, on_element, raw_text, out);
            }
        }
        // comments, doctypes and processing instructions carry nothing worth keeping
        _ => {}
    }
}

fn write_element<F>(element: ElementRef<'_>, on_element: &mut F, out: &mut String)
where
    F: FnMut(ElementRef<'_>) -> ElementAction,
{
    let attrs = match on_element(element) {
        ElementAction::Keep(attrs) => attrs,
        ElementAction::Drop => return,
    };

    let name = element.value().name();
    out.push('<');
    out.push_str(name);
    for (key, value) in &attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&encode_double_quoted_attribute(value));
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }

    let raw_text = RAW_TEXT_ELEMENTS.contains(&name);
    for child in element.children() {
        write_node(child, on_element, raw_text, out);
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Visible text of a fragment, ignoring script and style bodies.
pub fn strip_markup(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::new();
    collect_text(*fragment.root_element(), &mut out);
    out
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&**text),
            Node::Element(element) if HIDDEN_TEXT_ELEMENTS.contains(&element.name()) => {}
            _ => collect_text(child, out),
        }
    }
}
