//! Social-network posts rendered from a read-only HTML mirror.
//!
//! The post's path is replayed on the mirror host. Everything is read from inside
//! the page's `#m` container; class lookups match on class membership so extra
//! classes on the mirror's markup do not break them.

use std::sync::LazyLock;

use html_escape::{encode_double_quoted_attribute, encode_text};
use inliner_logging::inliner_debug;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{join_base, SourceEndpoints};
use crate::decode::decode_html;
use crate::links::rewrite_relative;
use crate::{ExtractError, FetchRequest, Fetcher};

struct PostSelectors {
    root: Selector,
    fullname: Selector,
    username: Selector,
    avatar: Selector,
    date_link: Selector,
    content: Selector,
    stat: Selector,
    stat_icon: Selector,
    still_image: Selector,
    video: Selector,
}

static SELECTORS: LazyLock<PostSelectors> = LazyLock::new(|| {
    let parse = |css: &str| Selector::parse(css).expect("static selector");
    PostSelectors {
        root: parse("#m"),
        fullname: parse("a.fullname"),
        username: parse("a.username"),
        avatar: parse("img.avatar"),
        date_link: parse("span.tweet-date a"),
        content: parse("div.tweet-content"),
        stat: parse("span.tweet-stat"),
        stat_icon: parse("span"),
        still_image: parse("a.still-image"),
        video: parse("video"),
    }
});

#[derive(Debug, Clone, PartialEq, Eq)]
struct Stat {
    kind: String,
    value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Video {
    poster: String,
    url: String,
}

/// Fields read from one post. Each lookup stands on its own.
#[derive(Debug, Default)]
struct PostFields {
    fullname: Option<String>,
    username: Option<String>,
    avatar: Option<String>,
    permalink: Option<String>,
    timestamp: Option<String>,
    content_html: Option<String>,
    stats: Vec<Stat>,
    images: Vec<String>,
    videos: Vec<Video>,
}

impl PostFields {
    fn collect(root: ElementRef<'_>, mirror: Option<&Url>) -> Self {
        let sel = &*SELECTORS;
        let text_of = |selector: &Selector| {
            root.select(selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
        };
        let absolute = |value: &str| rewrite_relative(mirror, value);

        let date_link = root.select(&sel.date_link).next();

        Self {
            fullname: text_of(&sel.fullname),
            username: text_of(&sel.username),
            avatar: root
                .select(&sel.avatar)
                .next()
                .and_then(|el| el.value().attr("src"))
                .map(absolute),
            permalink: date_link
                .and_then(|el| el.value().attr("href"))
                .map(absolute),
            timestamp: date_link
                .and_then(|el| el.value().attr("title"))
                .map(str::to_string),
            content_html: root.select(&sel.content).next().map(|el| el.html()),
            stats: root
                .select(&sel.stat)
                .map(|stat| Stat {
                    kind: stat
                        .select(&sel.stat_icon)
                        .next()
                        .and_then(|icon| icon.value().attr("class"))
                        .map(|class| class.replace("icon-", ""))
                        .unwrap_or_default(),
                    value: stat.text().collect::<String>().trim().to_string(),
                })
                .collect(),
            images: root
                .select(&sel.still_image)
                .filter_map(|el| el.value().attr("href"))
                .map(absolute)
                .collect(),
            videos: root
                .select(&sel.video)
                .map(|el| Video {
                    poster: absolute(el.value().attr("poster").unwrap_or_default()),
                    url: absolute(el.value().attr("data-url").unwrap_or_default()),
                })
                .collect(),
        }
    }
}

/// Mirror URL for a post: the original path on the mirror host.
pub fn mirror_url(endpoints: &SourceEndpoints, url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    Some(join_base(&endpoints.social_mirror, parsed.path()))
}

pub async fn scrape(
    fetcher: &dyn Fetcher,
    endpoints: &SourceEndpoints,
    url: &str,
) -> Result<String, ExtractError> {
    let api_url = mirror_url(endpoints, url)
        .ok_or_else(|| ExtractError::Parse(format!("not a social post url: {url}")))?;
    let request = FetchRequest::new(api_url.clone())
        .accept("text/*")
        .expect_html();
    let fetched = fetcher.fetch(&request).await?;
    let decoded = decode_html(&fetched.bytes, fetched.metadata.content_type.as_deref());

    let document = Html::parse_document(&decoded.html);
    let root = document
        .select(&SELECTORS.root)
        .next()
        .ok_or(ExtractError::NoContent)?;

    let mirror = Url::parse(&endpoints.social_mirror).ok();
    let fields = PostFields::collect(root, mirror.as_ref());
    inliner_debug!(
        "social post {:?}: {} stats, {} images, {} videos",
        fields.permalink,
        fields.stats.len(),
        fields.images.len(),
        fields.videos.len()
    );

    let mirror_name = mirror
        .as_ref()
        .and_then(|m| m.host_str().map(str::to_string))
        .unwrap_or_else(|| endpoints.social_mirror.clone());
    Ok(render(&fields, url, &api_url, &mirror_name))
}

fn render(fields: &PostFields, source_url: &str, api_url: &str, mirror_name: &str) -> String {
    let mut out = String::new();

    if let Some(avatar) = &fields.avatar {
        out.push_str(&format!(
            "<img src=\"{}\" style=\"max-width:50px; float:left;\"/>",
            encode_double_quoted_attribute(avatar)
        ));
    }

    let who = [fields.fullname.as_deref(), fields.username.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(&format!(
        "<p><a href=\"{}\">Source</a> - {}</p>",
        encode_double_quoted_attribute(source_url),
        encode_text(&who)
    ));

    let timestamp = fields.timestamp.as_deref().unwrap_or_default();
    out.push_str(&format!(
        "<p>{}, cached via <a href=\"{}\">{}</a></p>",
        encode_text(timestamp),
        encode_double_quoted_attribute(api_url),
        encode_text(mirror_name)
    ));

    if !fields.stats.is_empty() {
        let stats: String = fields
            .stats
            .iter()
            .map(|stat| format!(" | {} : {} | ", stat.kind, stat.value))
            .collect();
        out.push_str(&format!("<p>{}</p>", encode_text(&stats)));
    }

    out.push_str("<hr>");
    if let Some(content) = &fields.content_html {
        out.push_str(&format!("<p>{content}</p>"));
    }
    out.push_str("<hr>");

    for image in &fields.images {
        out.push_str(&format!(
            "<img src=\"{}\" alt=\"\" />",
            encode_double_quoted_attribute(image)
        ));
    }
    for video in &fields.videos {
        out.push_str(&format!(
            "<video poster=\"{}\" data-url=\"{}\" data-autoload=\"false\"></video>",
            encode_double_quoted_attribute(&video.poster),
            encode_double_quoted_attribute(&video.url)
        ));
    }
    out
}
