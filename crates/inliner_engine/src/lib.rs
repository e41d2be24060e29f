//! Inliner engine: fetching, extraction strategies and the content pipeline.
mod decode;
mod engine;
mod extract;
mod fetch;
mod html;
mod links;
mod pipeline;
mod sanitize;
pub mod scrapers;
mod types;

pub use decode::{declared_charset, decode_html, strip_meta_charset, DecodedHtml};
pub use engine::EngineHandle;
pub use extract::{
    DefaultReadability, GenericExtractor, ReadabilityEngine, ReadabilityError,
    ReadabilityOptions, DEFAULT_GENERIC_MAX_BYTES,
};
pub use fetch::{FetchRequest, FetchSettings, Fetcher, ReqwestFetcher};
pub use html::strip_markup;
pub use links::{rewrite_relative, LinkRewriter};
pub use pipeline::{Pipeline, PipelineConfig};
pub use sanitize::{BasicSanitizer, Sanitizer};
pub use scrapers::SourceEndpoints;
pub use types::{
    EmbedResponse, EngineEvent, ExtractError, ExtractedArticle, FailureKind, FetchError,
    FetchMetadata, FetchOutput, JobId,
};
