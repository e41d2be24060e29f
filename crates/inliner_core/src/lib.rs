//! Inliner core: pure source classification and article merge rules.
mod article;
mod source;

pub use article::{apply_extracted, Article, FeedFlags, FilterAction, APPEND_SEPARATOR};
pub use source::{classify, SourceKind};
