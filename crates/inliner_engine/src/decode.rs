use std::borrow::Cow;
use std::sync::LazyLock;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use inliner_logging::inliner_warn;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;

static META_CHARSET: LazyLock<BytesRegex> = LazyLock::new(|| {
    BytesRegex::new(r#"(?i)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#)
        .expect("meta charset pattern")
});

static META_CHARSET_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<meta[^>]*charset[^>]*>").expect("meta tag pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    pub encoding_label: String,
    /// Charset named by the document itself, if any.
    pub declared_charset: Option<String>,
}

/// Decode raw bytes into UTF-8 using: BOM -> Content-Type charset -> meta charset -> chardetng fallback.
///
/// When the document is not UTF-8 (or never says what it is), its `<meta ... charset>`
/// declarations are removed so the re-parsed text is not reinterpreted downstream.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> DecodedHtml {
    let declared_charset = declared_charset(bytes);
    let encoding = resolve_encoding(bytes, content_type, declared_charset.as_deref());

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        inliner_warn!(
            "Malformed {} sequences replaced while decoding {} bytes",
            encoding.name(),
            bytes.len()
        );
    }

    let declared_utf8 = declared_charset
        .as_deref()
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        == Some(UTF_8);
    let html = if encoding == UTF_8 && declared_utf8 {
        text.into_owned()
    } else {
        strip_meta_charset(&text).into_owned()
    };

    DecodedHtml {
        html,
        encoding_label: encoding.name().to_string(),
        declared_charset,
    }
}

fn resolve_encoding(
    bytes: &[u8],
    content_type: Option<&str>,
    declared: Option<&str>,
) -> &'static Encoding {
    // 1) BOM
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    // 2) Content-Type header charset
    if let Some(enc) = content_type
        .and_then(extract_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return enc;
    }

    // 3) In-document declaration
    if let Some(enc) = declared.and_then(|label| Encoding::for_label(label.as_bytes())) {
        return enc;
    }

    // 4) chardetng detection over the full document
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

/// Charset named by the first `<meta charset>` or `<meta http-equiv content="...; charset=">`.
pub fn declared_charset(bytes: &[u8]) -> Option<String> {
    META_CHARSET
        .captures(bytes)
        .and_then(|caps| caps.get(1))
        .map(|m| String::from_utf8_lossy(m.as_bytes()).to_ascii_lowercase())
}

pub fn strip_meta_charset(html: &str) -> Cow<'_, str> {
    META_CHARSET_TAG.replace_all(html, "")
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let part = part.trim();
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim_matches([' ', '"', '\''].as_ref()))
        })
        .next()
        .map(|s| s.to_string())
}
