use std::sync::atomic::{AtomicUsize, Ordering};

use inliner_engine::{
    decode_html, DefaultReadability, ExtractError, FetchMetadata, FetchOutput, GenericExtractor,
    LinkRewriter, ReadabilityEngine, ReadabilityError, ReadabilityOptions,
    DEFAULT_GENERIC_MAX_BYTES,
};
use pretty_assertions::assert_eq;
use scraper::{Html, Selector};

/// Hands the page back unchanged and counts calls.
#[derive(Default)]
struct PassThrough {
    calls: AtomicUsize,
}

impl ReadabilityEngine for PassThrough {
    fn parse(&self, html: &str, options: &ReadabilityOptions) -> Result<String, ReadabilityError> {
        assert!(!options.fix_relative_urls);
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(html.to_string())
    }
}

struct Failing;

impl ReadabilityEngine for Failing {
    fn parse(
        &self,
        _html: &str,
        _options: &ReadabilityOptions,
    ) -> Result<String, ReadabilityError> {
        Err(ReadabilityError("no candidates".into()))
    }
}

fn fetched(body: &[u8], final_url: &str, content_type: Option<&str>) -> FetchOutput {
    FetchOutput {
        bytes: body.to_vec(),
        metadata: FetchMetadata {
            original_url: final_url.to_string(),
            final_url: final_url.to_string(),
            redirect_count: 0,
            content_type: content_type.map(str::to_string),
            byte_len: body.len() as u64,
        },
    }
}

fn attr_of(html: &str, css: &str, attr: &str) -> Option<String> {
    let fragment = Html::parse_fragment(html);
    let selector = Selector::parse(css).unwrap();
    let element = fragment.select(&selector).next()?;
    element.value().attr(attr).map(str::to_string)
}

#[test]
fn decode_respects_charset_header() {
    let bytes = b"caf\xe9"; // iso-8859-1
    let decoded = decode_html(bytes, Some("text/html; charset=ISO-8859-1"));
    assert_eq!(decoded.html, "café");
    assert!(
        decoded.encoding_label.eq_ignore_ascii_case("ISO-8859-1")
            || decoded.encoding_label.eq_ignore_ascii_case("windows-1252")
    );
}

#[test]
fn decode_handles_utf8_bom() {
    let bytes = b"\xEF\xBB\xBFhello";
    let decoded = decode_html(bytes, Some("text/html"));
    assert_eq!(decoded.html, "hello");
    assert_eq!(decoded.encoding_label, "UTF-8");
}

#[test]
fn decode_uses_meta_declaration_and_strips_it() {
    // "中文" in GBK
    let mut bytes = br#"<html><head><meta charset="gbk"></head><body><p>"#.to_vec();
    bytes.extend_from_slice(b"\xd6\xd0\xce\xc4");
    bytes.extend_from_slice(b"</p></body></html>");

    let decoded = decode_html(&bytes, Some("text/html"));
    assert_eq!(decoded.encoding_label, "GBK");
    assert_eq!(decoded.declared_charset.as_deref(), Some("gbk"));
    assert!(decoded.html.contains("中文"));
    assert!(!decoded.html.contains("charset"));
}

#[test]
fn decode_keeps_utf8_declaration() {
    let html = r#"<html><head><meta charset="utf-8"></head><body>ü</body></html>"#;
    let decoded = decode_html(html.as_bytes(), None);
    assert_eq!(decoded.html, html);
}

#[test]
fn data_src_wins_over_src() {
    let html = r#"<p><img src="x.jpg" data-src="https://cdn/y.jpg"></p>"#;
    let out = LinkRewriter::new("https://example.com/post").rewrite(html);
    assert_eq!(attr_of(&out, "img", "src").as_deref(), Some("https://cdn/y.jpg"));
    assert_eq!(
        attr_of(&out, "img", "data-src").as_deref(),
        Some("https://cdn/y.jpg")
    );
}

#[test]
fn relative_data_src_is_resolved_into_src() {
    let html = r#"<img src="placeholder.gif" data-src="/real.png">"#;
    let out = LinkRewriter::new("https://example.com/a/b").rewrite(html);
    assert_eq!(
        attr_of(&out, "img", "src").as_deref(),
        Some("https://example.com/real.png")
    );
    assert_eq!(attr_of(&out, "img", "data-src").as_deref(), Some("/real.png"));
}

#[test]
fn root_relative_image_resolves_against_host() {
    let out = LinkRewriter::new("https://example.com/post").rewrite(r#"<img src="/img/z.png">"#);
    assert_eq!(out, r#"<img src="https://example.com/img/z.png">"#);
}

#[test]
fn absolute_links_are_left_alone() {
    let html = r#"<a href="https://elsewhere.example/x?y=1#z">x</a>"#;
    let out = LinkRewriter::new("https://example.com/post").rewrite(html);
    assert_eq!(out, html);
}

#[test]
fn images_without_src_are_not_touched() {
    let html = r#"<img data-src="lazy.png">"#;
    let out = LinkRewriter::new("https://example.com/post").rewrite(html);
    assert_eq!(out, html);
}

#[test]
fn generic_path_rewrites_relative_link_and_image() {
    let page = br#"<html><head><title>T</title></head><body><article><p>Short article body with a <a href="next">relative link</a>.</p><img src="pic.png"></article></body></html>"#;
    let engine = PassThrough::default();
    let extractor = GenericExtractor::new(&engine, DEFAULT_GENERIC_MAX_BYTES);

    let out = extractor
        .extract(
            "https://site.example/a/b",
            &fetched(page, "https://site.example/a/b", Some("text/html; charset=utf-8")),
        )
        .expect("content");

    assert_eq!(
        attr_of(&out, "a", "href").as_deref(),
        Some("https://site.example/a/next")
    );
    assert_eq!(
        attr_of(&out, "img", "src").as_deref(),
        Some("https://site.example/a/pic.png")
    );
    assert!(out.contains("Short article body"));
    assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn links_resolve_against_effective_url_not_requested_url() {
    let page = br#"<p><a href="sibling">s</a></p>"#;
    let engine = PassThrough::default();
    let extractor = GenericExtractor::new(&engine, DEFAULT_GENERIC_MAX_BYTES);

    let out = extractor
        .extract(
            "https://short.example/x",
            &fetched(page, "https://final.example/dir/page", Some("text/html")),
        )
        .expect("content");
    assert_eq!(
        attr_of(&out, "a", "href").as_deref(),
        Some("https://final.example/dir/sibling")
    );
}

#[test]
fn default_engine_resolves_against_effective_url() {
    let page = br#"<html><head><title>Moved</title></head><body><article>
<p>The article moved to a new home, and every relative reference in it has to follow, because readers open the links from the feed and not from the page.</p>
<p>Here is the <a href="sibling">sibling post</a>, written a week earlier, with plenty of context, detail and commentary to keep the scorer interested.</p>
<p>And the picture that goes with it, taken on the same day, in the same place: <img src="pic.png"> which should load from the new host.</p>
</article></body></html>"#;
    let extractor = GenericExtractor::new(&DefaultReadability, DEFAULT_GENERIC_MAX_BYTES);

    let out = extractor
        .extract(
            "https://short.example/x",
            &fetched(page, "https://final.example/dir/page", Some("text/html")),
        )
        .expect("content");

    assert_eq!(
        attr_of(&out, "a", "href").as_deref(),
        Some("https://final.example/dir/sibling")
    );
    assert_eq!(
        attr_of(&out, "img", "src").as_deref(),
        Some("https://final.example/dir/pic.png")
    );
    assert!(!out.contains("short.example"));
}

#[test]
fn engine_sees_both_urls() {
    struct Recording(std::sync::Mutex<Option<ReadabilityOptions>>);
    impl ReadabilityEngine for Recording {
        fn parse(
            &self,
            html: &str,
            options: &ReadabilityOptions,
        ) -> Result<String, ReadabilityError> {
            *self.0.lock().unwrap() = Some(options.clone());
            Ok(html.to_string())
        }
    }

    let engine = Recording(std::sync::Mutex::new(None));
    GenericExtractor::new(&engine, DEFAULT_GENERIC_MAX_BYTES)
        .extract(
            "https://short.example/x",
            &fetched(b"<p>moved</p>", "https://final.example/dir/page", Some("text/html")),
        )
        .expect("content");

    let options = engine.0.lock().unwrap().clone().expect("engine was called");
    assert_eq!(options.original_url.as_str(), "https://short.example/x");
    assert_eq!(options.base_url.as_str(), "https://final.example/dir/page");
    assert!(!options.fix_relative_urls);
}

#[test]
fn oversized_pages_never_reach_the_engine() {
    let engine = PassThrough::default();
    let extractor = GenericExtractor::new(&engine, DEFAULT_GENERIC_MAX_BYTES);
    let body = vec![b'a'; DEFAULT_GENERIC_MAX_BYTES + 1];

    let err = extractor
        .extract("https://example.com/", &fetched(&body, "https://example.com/", None))
        .unwrap_err();
    assert!(matches!(err, ExtractError::TooLarge { .. }));
    assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn empty_body_is_no_content() {
    let engine = PassThrough::default();
    let extractor = GenericExtractor::new(&engine, DEFAULT_GENERIC_MAX_BYTES);
    let err = extractor
        .extract("https://example.com/", &fetched(b"", "https://example.com/", None))
        .unwrap_err();
    assert!(matches!(err, ExtractError::NoContent));
    assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn engine_failure_is_reported_not_raised() {
    let extractor = GenericExtractor::new(&Failing, DEFAULT_GENERIC_MAX_BYTES);
    let err = extractor
        .extract(
            "https://example.com/",
            &fetched(b"<p>text</p>", "https://example.com/", Some("text/html")),
        )
        .unwrap_err();
    assert!(matches!(err, ExtractError::Readability(_)));
}
