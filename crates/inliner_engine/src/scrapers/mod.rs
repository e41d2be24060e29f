//! Site-specific scrapers.
//!
//! Each scraper owns its fetch, parses the source's own format and assembles a
//! fragment from a set of independently optional fields:
//!
//! | Source | Module | Upstream |
//! |--------|--------|----------|
//! | Microblog status | [`microblog`] | mobile JSON status API |
//! | Messaging article | [`messaging`] | RSS mirror keyed by article token |
//! | Social post | [`social`] | read-only HTML mirror |

pub mod messaging;
pub mod microblog;
pub mod social;

use serde::Deserialize;

/// Upstream hosts the scrapers talk to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceEndpoints {
    /// Base of the microblog mobile API, without trailing slash.
    pub microblog_api: String,
    /// Base of the RSS route that mirrors messaging-platform articles.
    pub messaging_mirror: String,
    /// Base of the read-only social-network mirror.
    pub social_mirror: String,
}

impl Default for SourceEndpoints {
    fn default() -> Self {
        Self {
            microblog_api: "https://m.weibo.cn".to_string(),
            messaging_mirror: "https://ustc.fun/rss/ext-route/wechat".to_string(),
            social_mirror: "https://nitter.net".to_string(),
        }
    }
}

pub(crate) fn join_base(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
