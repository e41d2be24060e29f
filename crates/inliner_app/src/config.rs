use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use inliner_core::FeedFlags;
use inliner_engine::PipelineConfig;
use inliner_logging::inliner_info;
use serde::Deserialize;

/// Everything the binary reads from its RON file. Missing keys fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    /// Offer full text to other consumers (`full-text` command).
    pub enable_share_anything: bool,
    /// Per-feed inline/append flags, keyed by feed id.
    pub feeds: BTreeMap<i64, FeedFlags>,
}

impl AppConfig {
    pub fn feed_flags(&self, feed_id: i64) -> FeedFlags {
        self.feeds.get(&feed_id).copied().unwrap_or_default()
    }
}

pub fn load(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: AppConfig =
        ron::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
    inliner_info!(
        "Loaded config from {:?} ({} feeds configured)",
        path,
        config.feeds.len()
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::load;

    #[test]
    fn no_path_means_defaults() {
        let config = load(None).unwrap();
        assert!(!config.enable_share_anything);
        assert!(config.feeds.is_empty());
        assert_eq!(config.pipeline.generic_max_bytes, 512_000);
        assert_eq!(config.pipeline.endpoints.social_mirror, "https://nitter.net");
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"(
                enable_share_anything: true,
                pipeline: (
                    fetch: (request_timeout: 5),
                    endpoints: (social_mirror: "https://mirror.example"),
                ),
                feeds: {{
                    12: (enabled: true, append: true),
                    40: (enabled: true),
                }},
            )"#
        )
        .unwrap();

        let config = load(Some(file.path())).unwrap();
        assert!(config.enable_share_anything);
        assert_eq!(config.pipeline.fetch.request_timeout, Duration::from_secs(5));
        assert_eq!(config.pipeline.fetch.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.pipeline.endpoints.social_mirror, "https://mirror.example");
        assert_eq!(config.pipeline.endpoints.microblog_api, "https://m.weibo.cn");
        assert!(config.feed_flags(12).append);
        assert!(config.feed_flags(40).enabled);
        assert!(!config.feed_flags(40).append);
        assert!(!config.feed_flags(99).enabled);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(feeds: [").unwrap();
        let err = load(Some(file.path())).unwrap_err();
        assert!(err.to_string().starts_with("parsing config"));
    }
}
