use inliner_logging::inliner_trace;
use scraper::ElementRef;
use url::Url;

use crate::html::{attributes_of, rewrite_fragment, Attributes, ElementAction};

/// Resolve `reference` against `base`.
///
/// Anything that already parses as an absolute URL comes back untouched, byte for byte.
/// References that cannot be resolved are also returned as-is.
pub fn rewrite_relative(base: Option<&Url>, reference: &str) -> String {
    let trimmed = reference.trim();
    if Url::parse(trimmed).is_ok() {
        return reference.to_string();
    }
    base.and_then(|base| base.join(trimmed).ok())
        .map(String::from)
        .unwrap_or_else(|| reference.to_string())
}

/// Makes anchors and images inside an extracted fragment absolute.
pub struct LinkRewriter {
    base_url: Option<Url>,
}

impl LinkRewriter {
    /// `base_url` is the effective URL of the fetch, after redirects.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: Url::parse(base_url).ok(),
        }
    }

    pub fn rewrite(&self, html: &str) -> String {
        rewrite_fragment(html, |element| {
            ElementAction::Keep(match element.value().name() {
                "a" => self.rewrite_anchor(element),
                "img" => self.rewrite_image(element),
                _ => attributes_of(element),
            })
        })
    }

    fn rewrite_anchor(&self, element: ElementRef<'_>) -> Attributes {
        let mut attrs = attributes_of(element);
        if let Some((_, href)) = attrs.iter_mut().find(|(name, _)| name == "href") {
            let resolved = rewrite_relative(self.base_url.as_ref(), href);
            *href = resolved;
        }
        attrs
    }

    fn rewrite_image(&self, element: ElementRef<'_>) -> Attributes {
        let mut attrs = attributes_of(element);
        // lazy-loaded images keep the real source in data-src
        let chosen = element
            .value()
            .attr("data-src")
            .or_else(|| element.value().attr("src"))
            .map(str::to_string);

        if let (Some((_, src)), Some(chosen)) =
            (attrs.iter_mut().find(|(name, _)| name == "src"), chosen)
        {
            *src = if chosen.starts_with("http") {
                chosen
            } else {
                rewrite_relative(self.base_url.as_ref(), &chosen)
            };
            inliner_trace!("image src -> {}", src);
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::rewrite_relative;
    use url::Url;

    #[test]
    fn absolute_urls_are_returned_verbatim() {
        let base = Url::parse("https://base.example/dir/page").unwrap();
        // no normalization (e.g. trailing slash) is applied
        assert_eq!(
            rewrite_relative(Some(&base), "https://other.example"),
            "https://other.example"
        );
        assert_eq!(
            rewrite_relative(Some(&base), "mailto:me@example.com"),
            "mailto:me@example.com"
        );
    }

    #[test]
    fn relative_forms_resolve_against_base() {
        let base = Url::parse("https://base.example/dir/page").unwrap();
        assert_eq!(
            rewrite_relative(Some(&base), "other"),
            "https://base.example/dir/other"
        );
        assert_eq!(
            rewrite_relative(Some(&base), "/root"),
            "https://base.example/root"
        );
        assert_eq!(
            rewrite_relative(Some(&base), "//cdn.example/x.png"),
            "https://cdn.example/x.png"
        );
        assert_eq!(
            rewrite_relative(Some(&base), "../up"),
            "https://base.example/up"
        );
    }

    #[test]
    fn without_base_reference_is_kept() {
        assert_eq!(rewrite_relative(None, "relative/path"), "relative/path");
    }
}
