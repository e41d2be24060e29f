use std::fmt;

use inliner_core::{Article, SourceKind};
use serde::Serialize;

pub type JobId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Started {
        job_id: JobId,
        source: SourceKind,
    },
    Completed {
        job_id: JobId,
        url: String,
        result: Option<ExtractedArticle>,
    },
    /// Article after a feed filter or a manual action.
    ArticleFiltered { job_id: JobId, article: Article },
    Embedded {
        job_id: JobId,
        url: String,
        response: EmbedResponse,
    },
    FullText {
        job_id: JobId,
        url: String,
        content: Option<String>,
    },
}

impl EngineEvent {
    pub fn job_id(&self) -> JobId {
        match self {
            Self::Started { job_id, .. }
            | Self::Completed { job_id, .. }
            | Self::ArticleFiltered { job_id, .. }
            | Self::Embedded { job_id, .. }
            | Self::FullText { job_id, .. } => *job_id,
        }
    }
}

/// The only thing the pipeline hands back: a fragment ready to be inserted into a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub content_html: String,
}

/// Body of the article view endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmbedResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    /// Where the request ended up after redirects; the base for relative links.
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Why a strategy produced nothing. Never leaves the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("parse failed: {0}")]
    Parse(String),
    #[error("document too large ({actual} bytes, limit {limit})")]
    TooLarge { limit: usize, actual: usize },
    #[error("readability failed: {0}")]
    Readability(#[from] crate::extract::ReadabilityError),
    #[error("no content")]
    NoContent,
}
