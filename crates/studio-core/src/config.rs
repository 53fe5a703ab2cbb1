//! Studio configuration: defaults, optional TOML file, then `STUDIO__*` env.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | bind_addr | 127.0.0.1:8010 | Gateway listen address. |
//! | api_base | https://generativelanguage.googleapis.com/v1beta | Gemini REST base URL. |
//! | image_model | gemini-2.5-flash-image-preview | Carousel, post images and edits. |
//! | text_model | gemini-2.5-flash | Single post text. |
//! | video_model | veo-2.0-generate-001 | Video clips (long-running operation). |
//! | max_slots | 10 | Slots in list mode. |
//! | poll_interval_ms | 10000 | Video operation poll interval. |
//! | max_polls | 60 | Polls before a video slot gives up. |
//! | request_timeout_secs | 120 | Per-HTTP-request timeout. |

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::prompt_entry::DEFAULT_MAX_SLOTS;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-2.0-generate-001";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioConfig {
    pub bind_addr: String,
    pub api_base: String,
    pub image_model: String,
    pub text_model: String,
    pub video_model: String,
    pub max_slots: usize,
    pub poll_interval_ms: u64,
    pub max_polls: u32,
    pub request_timeout_secs: u64,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8010".to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            max_slots: DEFAULT_MAX_SLOTS,
            poll_interval_ms: 10_000,
            max_polls: 60,
            request_timeout_secs: 120,
        }
    }
}

impl StudioConfig {
    /// Load config from file and environment. Precedence: env > `STUDIO_CONFIG` path
    /// (default `config/studio.toml`, skipped when missing) > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("STUDIO_CONFIG").unwrap_or_else(|_| "config/studio.toml".to_string());
        Self::load_from(Path::new(&config_path))
    }

    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let d = StudioConfig::default();
        let builder = config::Config::builder()
            .set_default("bind_addr", d.bind_addr)?
            .set_default("api_base", d.api_base)?
            .set_default("image_model", d.image_model)?
            .set_default("text_model", d.text_model)?
            .set_default("video_model", d.video_model)?
            .set_default("max_slots", d.max_slots as i64)?
            .set_default("poll_interval_ms", d.poll_interval_ms as i64)?
            .set_default("max_polls", d.max_polls as i64)?
            .set_default("request_timeout_secs", d.request_timeout_secs as i64)?;

        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("STUDIO").separator("__"))
            .build()?;

        let mut cfg: StudioConfig = built.try_deserialize()?;
        cfg.max_slots = cfg.max_slots.max(1);
        // A video slot always gets at least one poll.
        cfg.max_polls = cfg.max_polls.max(1);
        Ok(cfg)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Initial API key from the environment, if any. Priority: GEMINI_API_KEY > API_KEY.
    pub fn api_key_from_env() -> Option<String> {
        std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_missing() {
        let cfg = StudioConfig::load_from(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(cfg.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(cfg.max_slots, DEFAULT_MAX_SLOTS);
        assert_eq!(cfg.poll_interval(), Duration::from_secs(10));
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("studio-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("studio.toml");
        std::fs::write(&path, "max_slots = 4\nvideo_model = \"veo-test\"\n").unwrap();

        let cfg = StudioConfig::load_from(&path).unwrap();
        assert_eq!(cfg.max_slots, 4);
        assert_eq!(cfg.video_model, "veo-test");
        assert_eq!(cfg.text_model, DEFAULT_TEXT_MODEL);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn zero_counts_are_clamped() {
        let dir = std::env::temp_dir().join(format!("studio-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("studio.toml");
        std::fs::write(&path, "max_slots = 0\nmax_polls = 0\n").unwrap();

        let cfg = StudioConfig::load_from(&path).unwrap();
        assert_eq!(cfg.max_slots, 1);
        assert_eq!(cfg.max_polls, 1);

        std::fs::remove_dir_all(&dir).ok();
    }
}
