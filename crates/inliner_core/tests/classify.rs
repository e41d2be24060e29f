use std::sync::Once;

use inliner_core::{classify, SourceKind};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(inliner_logging::initialize_for_tests);
}

#[test]
fn microblog_hosts_route_to_microblog() {
    init_logging();
    assert_eq!(
        classify("https://weibo.com/1234567/AbCdEfG"),
        SourceKind::Microblog
    );
    assert_eq!(
        classify("https://m.weibo.cn/status/4890123"),
        SourceKind::Microblog
    );
}

#[test]
fn messaging_articles_route_to_mirror() {
    init_logging();
    assert_eq!(
        classify("https://mp.weixin.qq.com/s/8DmyX-YDRZwONxbXEGCxbw"),
        SourceKind::MessagingMirror
    );
    assert_eq!(
        classify("https://mp.weixin.qq.com/s?__biz=MjM5&mid=265&idx=1&sn=0b48"),
        SourceKind::MessagingMirror
    );
}

#[test]
fn social_hosts_and_mirror_route_to_social() {
    init_logging();
    assert_eq!(
        classify("https://twitter.com/rustlang/status/1"),
        SourceKind::SocialMirror
    );
    assert_eq!(
        classify("https://nitter.net/rustlang/status/1"),
        SourceKind::SocialMirror
    );
}

#[test]
fn everything_else_is_generic() {
    init_logging();
    for url in [
        "https://example.com/post",
        "http://127.0.0.1:8080/a/b",
        "",
        "not a url at all",
        "https://blog.rust-lang.org/2024/01/01/news.html",
    ] {
        assert_eq!(classify(url), SourceKind::Generic, "url: {url}");
    }
}

#[test]
fn classification_is_repeatable() {
    init_logging();
    let urls = [
        "https://weibo.com/1/2",
        "https://mp.weixin.qq.com/s/x",
        "https://twitter.com/a",
        "https://example.org",
    ];
    for url in urls {
        assert_eq!(classify(url), classify(url));
    }
}
