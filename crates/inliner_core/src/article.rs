use serde::{Deserialize, Serialize};

/// Inserted between the original summary and appended full text.
pub const APPEND_SEPARATOR: &str = "<hr/>";

/// The slice of a feed article the inliner reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub link: String,
    #[serde(default)]
    pub content: String,
}

/// Per-feed switches, passed explicitly with every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeedFlags {
    /// Inline full content for articles of this feed.
    #[serde(default)]
    pub enabled: bool,
    /// Append to the summary instead of replacing it.
    #[serde(default)]
    pub append: bool,
}

/// Manual filter actions a user can attach to a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    Inline,
    Append,
}

impl FilterAction {
    /// Resolve an action name. Both historical spellings of the append action are accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "action_inline" | "inline" => Some(FilterAction::Inline),
            "action_append" | "action_inline_append" | "append" => Some(FilterAction::Append),
            _ => None,
        }
    }

    pub fn append_mode(self) -> bool {
        matches!(self, FilterAction::Append)
    }
}

/// Merge extracted content into an article.
///
/// `None` means the extraction produced nothing usable; the article is returned unchanged.
pub fn apply_extracted(mut article: Article, extracted: Option<&str>, append: bool) -> Article {
    let Some(extracted) = extracted else {
        return article;
    };
    if append {
        article.content.push_str(APPEND_SEPARATOR);
        article.content.push_str(extracted);
    } else {
        article.content = extracted.to_string();
    }
    article
}
