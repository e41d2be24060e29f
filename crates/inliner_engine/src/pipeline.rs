use std::sync::Arc;

use inliner_core::{apply_extracted, classify, Article, FeedFlags, FilterAction, SourceKind};
use inliner_logging::{inliner_debug, inliner_info, inliner_warn, truncate_for_log};
use serde::Deserialize;

use crate::extract::{
    DefaultReadability, GenericExtractor, ReadabilityEngine, DEFAULT_GENERIC_MAX_BYTES,
};
use crate::fetch::{FetchRequest, FetchSettings, Fetcher, ReqwestFetcher};
use crate::html::strip_markup;
use crate::sanitize::{BasicSanitizer, Sanitizer};
use crate::scrapers::{messaging, microblog, social, SourceEndpoints};
use crate::{EmbedResponse, ExtractError, ExtractedArticle};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub fetch: FetchSettings,
    pub endpoints: SourceEndpoints,
    /// Generic pages at or above this many bytes are skipped.
    pub generic_max_bytes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            endpoints: SourceEndpoints::default(),
            generic_max_bytes: DEFAULT_GENERIC_MAX_BYTES,
        }
    }
}

/// Public entry point: URL in, article fragment (or nothing) out.
///
/// Holds no per-call state, so one instance can serve concurrent extractions.
pub struct Pipeline {
    fetcher: Arc<dyn Fetcher>,
    readability: Arc<dyn ReadabilityEngine>,
    sanitizer: Arc<dyn Sanitizer>,
    endpoints: SourceEndpoints,
    generic_max_bytes: usize,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let fetcher = Arc::new(ReqwestFetcher::new(config.fetch.clone()));
        Self::with_parts(
            fetcher,
            Arc::new(DefaultReadability),
            Arc::new(BasicSanitizer),
            config,
        )
    }

    pub fn with_parts(
        fetcher: Arc<dyn Fetcher>,
        readability: Arc<dyn ReadabilityEngine>,
        sanitizer: Arc<dyn Sanitizer>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            readability,
            sanitizer,
            endpoints: config.endpoints,
            generic_max_bytes: config.generic_max_bytes,
        }
    }

    /// Extract article content for `url`.
    ///
    /// `None` covers every failure as well as fragments with no visible text.
    pub async fn extract(&self, url: &str) -> Option<ExtractedArticle> {
        let kind = classify(url);
        inliner_debug!("extracting {} via {} strategy", url, kind);

        let content = match self.run_strategy(kind, url).await {
            Ok(content) => content,
            Err(err) => {
                inliner_warn!("{} extraction of {} failed: {}", kind, url, err);
                return None;
            }
        };

        if !self.is_usable(&content) {
            inliner_warn!("{} extraction of {} has no visible text", kind, url);
            return None;
        }

        inliner_info!(
            "extracted {} bytes from {}: {}",
            content.len(),
            url,
            truncate_for_log(&content, 120)
        );
        Some(ExtractedArticle {
            content_html: content,
        })
    }

    async fn run_strategy(&self, kind: SourceKind, url: &str) -> Result<String, ExtractError> {
        let fetcher = self.fetcher.as_ref();
        match kind {
            SourceKind::Microblog => Ok(microblog::scrape(fetcher, &self.endpoints, url).await),
            SourceKind::MessagingMirror => messaging::scrape(fetcher, &self.endpoints, url).await,
            SourceKind::SocialMirror => social::scrape(fetcher, &self.endpoints, url).await,
            SourceKind::Generic => {
                let request = FetchRequest::new(url).accept("text/*").expect_html();
                let fetched = fetcher.fetch(&request).await?;
                GenericExtractor::new(self.readability.as_ref(), self.generic_max_bytes)
                    .extract(url, &fetched)
            }
        }
    }

    /// True when the fragment still has non-blank text after sanitizing and stripping tags.
    pub fn is_usable(&self, html: &str) -> bool {
        !strip_markup(&self.sanitizer.sanitize(html)).trim().is_empty()
    }

    /// Feed filter: inline content for articles of enabled feeds.
    pub async fn filter_article(&self, article: Article, flags: FeedFlags) -> Article {
        if !flags.enabled {
            return article;
        }
        self.process_article(article, flags.append).await
    }

    /// Manual filter action, independent of feed flags.
    pub async fn apply_action(&self, article: Article, action: FilterAction) -> Article {
        self.process_article(article, action.append_mode()).await
    }

    async fn process_article(&self, article: Article, append: bool) -> Article {
        let extracted = self.extract(&article.link).await;
        apply_extracted(
            article,
            extracted.as_ref().map(|a| a.content_html.as_str()),
            append,
        )
    }

    /// Full-text service for other consumers; off unless sharing is enabled.
    pub async fn full_text(&self, url: &str, share_enabled: bool) -> Option<String> {
        if !share_enabled {
            inliner_debug!("full text requested for {} but sharing is disabled", url);
            return None;
        }
        self.extract(url).await.map(|article| article.content_html)
    }

    /// Article view payload. Output is sanitized for every source kind.
    pub async fn embed(&self, url: &str) -> EmbedResponse {
        let content = self
            .extract(url)
            .await
            .map(|article| self.sanitizer.sanitize(&article.content_html));
        EmbedResponse { content }
    }
}
