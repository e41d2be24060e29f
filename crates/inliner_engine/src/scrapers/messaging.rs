//! Messaging-platform articles through an RSS mirror.
//!
//! Article links come in two shapes:
//! - short: `https://mp.weixin.qq.com/s/8DmyX-YDRZwONxbXEGCxbw`
//! - long: `https://mp.weixin.qq.com/s?__biz=...&mid=...&idx=1&sn=...&chksm=...`
//!
//! The mirror is keyed by the short token or by the long query minus its checksum.

use std::sync::LazyLock;

use html_escape::encode_text;
use inliner_logging::{inliner_debug, inliner_warn};
use regex::Regex;
use serde::Deserialize;
use url::Url;

use super::{join_base, SourceEndpoints};
use crate::{ExtractError, FetchRequest, Fetcher};

static CHECKSUM_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*)&chksm.*$").expect("checksum pattern"));

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<MirrorItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MirrorItem {
    title: String,
    description: String,
    author: String,
    #[serde(rename = "pubDate")]
    pub_date: String,
    link: String,
}

/// Mirror lookup key for an article URL.
pub fn lookup_token(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let token = match parsed.query() {
        Some(query) => CHECKSUM_SUFFIX.replace(query, "$1").into_owned(),
        None => parsed.path().replace("/s/", ""),
    };
    Some(token)
}

pub async fn scrape(
    fetcher: &dyn Fetcher,
    endpoints: &SourceEndpoints,
    url: &str,
) -> Result<String, ExtractError> {
    let token = lookup_token(url)
        .ok_or_else(|| ExtractError::Parse(format!("not a messaging article url: {url}")))?;
    let api_url = join_base(&endpoints.messaging_mirror, &format!("/{token}/?key="));

    let fetched = fetcher.fetch(&FetchRequest::new(api_url)).await?;
    let xml = String::from_utf8_lossy(&fetched.bytes);
    let item = first_item(&xml)?;

    inliner_debug!(
        "messaging mirror item {:?} ({}), {} bytes of description",
        item.title,
        item.link,
        item.description.len()
    );
    Ok(format!(
        "<p>Author : {}</p><p> Date : {}</p><hr>{}",
        encode_text(&item.author),
        encode_text(&item.pub_date),
        item.description
    ))
}

fn first_item(xml: &str) -> Result<MirrorItem, ExtractError> {
    let rss: Rss = quick_xml::de::from_str(xml).map_err(|err| {
        inliner_warn!("messaging mirror returned unreadable XML: {}", err);
        ExtractError::Parse(err.to_string())
    })?;
    rss.channel
        .items
        .into_iter()
        .next()
        .ok_or(ExtractError::NoContent)
}
