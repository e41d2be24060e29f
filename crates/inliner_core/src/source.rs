use std::fmt;

/// Which extraction strategy a URL is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Microblog status page, read through the mobile JSON status API.
    Microblog,
    /// Messaging-platform article, read through an RSS mirror.
    MessagingMirror,
    /// Social-network post, read from a read-only HTML mirror.
    SocialMirror,
    /// Anything else; goes through the readability path.
    Generic,
}

const MICROBLOG_MARKERS: &[&str] = &["weibo.com", "weibo.cn"];
const MESSAGING_MARKERS: &[&str] = &["weixin.qq.com"];
const SOCIAL_MARKERS: &[&str] = &["twitter.com", "nitter.net"];

/// Classify a URL by substring markers.
///
/// Markers are checked in a fixed order (microblog, messaging, social) so a URL
/// always maps to the same kind. Unknown URLs are `Generic`.
pub fn classify(url: &str) -> SourceKind {
    let contains_any = |markers: &[&str]| markers.iter().any(|m| url.contains(m));

    if contains_any(MICROBLOG_MARKERS) {
        SourceKind::Microblog
    } else if contains_any(MESSAGING_MARKERS) {
        SourceKind::MessagingMirror
    } else if contains_any(SOCIAL_MARKERS) {
        SourceKind::SocialMirror
    } else {
        SourceKind::Generic
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Microblog => write!(f, "microblog"),
            SourceKind::MessagingMirror => write!(f, "messaging-mirror"),
            SourceKind::SocialMirror => write!(f, "social-mirror"),
            SourceKind::Generic => write!(f, "generic"),
        }
    }
}
