//! Microblog statuses via the mobile status API.
//!
//! Status links look like `https://weibo.com/{user_id}/{post_id}`. The API only
//! answers requests that look like they come from the mobile web app, hence the
//! fixed header set below.

use html_escape::{encode_double_quoted_attribute, encode_text};
use inliner_logging::{inliner_debug, inliner_warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use url::Url;

use super::{join_base, SourceEndpoints};
use crate::{FetchRequest, Fetcher};

/// Shown in place of the article when the API refuses or returns nothing usable.
pub const AUTH_FAILURE_FRAGMENT: &str =
    "<b>Fail to load message - may be authentication error</b>";

/// User agent of the mobile web app.
pub const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 11_0 like Mac OS X) AppleWebKit/604.1.38 (KHTML, like Gecko) Version/11.0 Mobile/15A372 Safari/604.1";

#[derive(Debug, Deserialize)]
struct StatusResponse {
    data: Option<Status>,
}

/// Every field is optional on its own: a null or mistyped value drops that field only.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Status {
    #[serde(deserialize_with = "lenient")]
    user: Option<User>,
    #[serde(deserialize_with = "lenient")]
    created_at: Option<String>,
    #[serde(deserialize_with = "lenient")]
    source: Option<String>,
    #[serde(deserialize_with = "lenient")]
    text: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pics: Option<Vec<Picture>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct User {
    #[serde(deserialize_with = "lenient")]
    screen_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Picture {
    #[serde(deserialize_with = "lenient")]
    large: Option<PictureVariant>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PictureVariant {
    #[serde(deserialize_with = "lenient")]
    url: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// `(user_id, post_id)`: the last two path segments.
pub fn post_ids(url: &str) -> Option<(String, String)> {
    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .collect();
    match segments.as_slice() {
        [.., user_id, post_id] => Some((user_id.to_string(), post_id.to_string())),
        _ => None,
    }
}

/// Never fails: any problem upstream becomes [`AUTH_FAILURE_FRAGMENT`].
pub async fn scrape(fetcher: &dyn Fetcher, endpoints: &SourceEndpoints, url: &str) -> String {
    let Some((user_id, post_id)) = post_ids(url) else {
        inliner_warn!("microblog url without user/post segments: {}", url);
        return AUTH_FAILURE_FRAGMENT.to_string();
    };

    let api_url = join_base(&endpoints.microblog_api, &format!("/statuses/show?id={post_id}"));
    let referer = join_base(&endpoints.microblog_api, &format!("/u/{user_id}"));
    let request = FetchRequest::new(api_url)
        .header("Referer", referer)
        .header("MWeibo-Pwa", "1")
        .header("X-Requested-With", "XMLHttpRequest")
        .header("User-Agent", MOBILE_USER_AGENT);

    let fetched = match fetcher.fetch(&request).await {
        Ok(fetched) => fetched,
        Err(err) => {
            inliner_warn!("microblog status {} fetch failed: {}", post_id, err);
            return AUTH_FAILURE_FRAGMENT.to_string();
        }
    };

    let status = match serde_json::from_slice::<StatusResponse>(&fetched.bytes) {
        Ok(StatusResponse { data: Some(status) }) => status,
        Ok(StatusResponse { data: None }) => {
            inliner_warn!("microblog status {} response has no data", post_id);
            return AUTH_FAILURE_FRAGMENT.to_string();
        }
        Err(err) => {
            inliner_warn!("microblog status {} response is not JSON: {}", post_id, err);
            return AUTH_FAILURE_FRAGMENT.to_string();
        }
    };

    inliner_debug!(
        "microblog status {} has {} pictures",
        post_id,
        status.pics.as_ref().map_or(0, Vec::len)
    );
    render(&status)
}

fn render(status: &Status) -> String {
    let author = status
        .user
        .as_ref()
        .and_then(|user| user.screen_name.as_deref())
        .unwrap_or_default();
    let created = status.created_at.as_deref().unwrap_or_default();
    // source and text arrive as HTML
    let source = status.source.as_deref().unwrap_or_default();
    let text = status.text.as_deref().unwrap_or_default();

    let mut out = format!(
        "<p>Author : {}</p><p>Created : {}</p><p>Source : {}</p><p>{}</p>",
        encode_text(author),
        encode_text(created),
        source,
        text
    );
    for url in status
        .pics
        .iter()
        .flatten()
        .filter_map(|pic| pic.large.as_ref()?.url.as_deref())
    {
        out.push_str(&format!(
            "<img src=\"{}\" />",
            encode_double_quoted_attribute(url)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{post_ids, render, StatusResponse};

    #[test]
    fn ids_come_from_last_two_segments() {
        assert_eq!(
            post_ids("https://weibo.com/1234567/AbCdEf"),
            Some(("1234567".to_string(), "AbCdEf".to_string()))
        );
        assert_eq!(
            post_ids("https://weibo.com/1234567/AbCdEf/?from=feed"),
            Some(("1234567".to_string(), "AbCdEf".to_string()))
        );
    }

    #[test]
    fn single_segment_has_no_ids() {
        assert_eq!(post_ids("https://weibo.com/1234567"), None);
        assert_eq!(post_ids("not a url"), None);
    }

    #[test]
    fn null_or_mistyped_fields_only_drop_themselves() {
        let body = br#"{
            "data": {
                "user": null,
                "created_at": "Sun Oct 19 08:00:00 +0800 2026",
                "source": 42,
                "text": "still here",
                "pics": null
            }
        }"#;
        let response: StatusResponse = serde_json::from_slice(body).unwrap();
        let status = response.data.expect("data survives bad fields");
        assert_eq!(
            render(&status),
            "<p>Author : </p><p>Created : Sun Oct 19 08:00:00 +0800 2026</p><p>Source : </p><p>still here</p>"
        );
    }

    #[test]
    fn pictures_without_large_variant_are_skipped() {
        let body = br#"{"data": {"text": "t", "pics": [{"large": null}, {"large": {"url": "https://img.example/a.jpg"}}]}}"#;
        let status = serde_json::from_slice::<StatusResponse>(body)
            .unwrap()
            .data
            .unwrap();
        assert!(render(&status).ends_with("<p>t</p><img src=\"https://img.example/a.jpg\" />"));
    }
}
