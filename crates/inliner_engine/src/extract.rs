use std::io::Cursor;

use inliner_logging::{inliner_debug, inliner_trace};
use url::Url;

use crate::decode::decode_html;
use crate::links::LinkRewriter;
use crate::{ExtractError, FetchOutput};

/// Pages at or above this size are not treated as articles.
pub const DEFAULT_GENERIC_MAX_BYTES: usize = 512_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadabilityOptions {
    /// The address the caller asked for; heuristics only.
    pub original_url: Url,
    /// Effective URL of the fetch. Anything the engine resolves must resolve against this.
    pub base_url: Url,
    /// Whether the engine itself should absolutize links. The pipeline rewrites afterwards.
    pub fix_relative_urls: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ReadabilityError(pub String);

/// Main-content extraction engine.
pub trait ReadabilityEngine: Send + Sync {
    /// Returns the serialized HTML of the main content.
    fn parse(&self, html: &str, options: &ReadabilityOptions) -> Result<String, ReadabilityError>;
}

/// Engine backed by the `readability` crate.
///
/// That crate always absolutizes `a[href]` and `img[src]` against the URL it is handed,
/// so it gets `base_url` and `fix_relative_urls` cannot switch it off.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultReadability;

impl ReadabilityEngine for DefaultReadability {
    fn parse(&self, html: &str, options: &ReadabilityOptions) -> Result<String, ReadabilityError> {
        let mut cursor = Cursor::new(html.as_bytes());
        let product = readability::extractor::extract(&mut cursor, &options.base_url)
            .map_err(|err| ReadabilityError(err.to_string()))?;
        inliner_trace!(
            "readability kept {} bytes, title {:?}",
            product.content.len(),
            product.title
        );
        Ok(product.content)
    }
}

/// Readability path: size gate, charset normalization, engine, link rewrite.
pub struct GenericExtractor<'a> {
    engine: &'a dyn ReadabilityEngine,
    max_bytes: usize,
}

impl<'a> GenericExtractor<'a> {
    pub fn new(engine: &'a dyn ReadabilityEngine, max_bytes: usize) -> Self {
        Self { engine, max_bytes }
    }

    /// `url` is the address the caller asked for; links resolve against the fetch's final URL.
    pub fn extract(&self, url: &str, fetched: &FetchOutput) -> Result<String, ExtractError> {
        let len = fetched.bytes.len();
        if len == 0 {
            return Err(ExtractError::NoContent);
        }
        if len >= self.max_bytes {
            return Err(ExtractError::TooLarge {
                limit: self.max_bytes,
                actual: len,
            });
        }

        let decoded = decode_html(&fetched.bytes, fetched.metadata.content_type.as_deref());
        if decoded.html.trim().is_empty() {
            return Err(ExtractError::Parse("document is empty".into()));
        }
        inliner_debug!(
            "decoded {} bytes as {} (declared {:?})",
            len,
            decoded.encoding_label,
            decoded.declared_charset
        );

        let final_url = &fetched.metadata.final_url;
        let base_url = Url::parse(final_url)
            .or_else(|_| Url::parse(url))
            .map_err(|err| ExtractError::Parse(format!("invalid url {final_url}: {err}")))?;
        let original_url = Url::parse(url).unwrap_or_else(|_| base_url.clone());
        let options = ReadabilityOptions {
            original_url,
            base_url,
            fix_relative_urls: false,
        };
        let content = self.engine.parse(&decoded.html, &options)?;

        Ok(LinkRewriter::new(final_url).rewrite(&content))
    }
}
