use crate::error::ConfigError;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_TAGS: &str = r#"["Good", "Bad", "Neutral"]"#;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://video_tagger.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

/// Validated, read-only process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Canonical path of the directory that holds the videos.
    pub video_root: PathBuf,
    pub tags: Vec<String>,
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub static_dir: PathBuf,
    /// Lowercase extensions without the leading dot.
    pub extensions: Vec<String>,
}

/// Raw settings as read from the environment and the optional config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub video_folder_path: Option<String>,
    pub predefined_tags: Option<TagList>,
    pub database_url: Option<String>,
    pub bind_addr: Option<String>,
    pub static_dir: Option<String>,
    pub video_extensions: Option<String>,
}

/// Env vars carry the tag list as a JSON string; config files may also use a
/// native array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagList {
    Json(String),
    List(Vec<String>),
}

impl Settings {
    pub fn validate(self) -> Result<AppConfig, ConfigError> {
        let raw_root = self
            .video_folder_path
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingVideoRoot)?;
        let video_root = resolve_video_root(&raw_root)?;

        let tags = match self.predefined_tags {
            Some(TagList::Json(raw)) => parse_tags(&raw)?,
            Some(TagList::List(list)) => list,
            None => parse_tags(DEFAULT_TAGS)?,
        };
        if tags.is_empty() {
            warn!("PREDEFINED_TAGS is empty; every tag request will be rejected");
        }

        let bind_raw = self
            .bind_addr
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddr(bind_raw.clone()))?;

        Ok(AppConfig {
            video_root,
            tags,
            database_url: self
                .database_url
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr,
            static_dir: PathBuf::from(
                self.static_dir
                    .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
            ),
            extensions: parse_extensions(self.video_extensions.as_deref()),
        })
    }
}

/// Loads settings from an optional file layered under environment variables
/// (`VIDEO_FOLDER_PATH`, `PREDEFINED_TAGS`, `DATABASE_URL`, ...).
pub fn load(path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(config::Environment::default());
    let cfg = settings.build()?;
    let raw: Settings = cfg.try_deserialize()?;
    raw.validate()
}

/// Resolves the root against the current directory and requires a directory.
pub fn resolve_video_root(raw: &str) -> Result<PathBuf, ConfigError> {
    let given = Path::new(raw);
    let joined = if given.is_absolute() {
        given.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(given))
            .unwrap_or_else(|_| given.to_path_buf())
    };
    let invalid = |resolved: PathBuf| ConfigError::InvalidVideoRoot {
        given: raw.to_string(),
        resolved,
    };
    let resolved = joined.canonicalize().map_err(|_| invalid(joined.clone()))?;
    if !resolved.is_dir() {
        return Err(invalid(resolved));
    }
    Ok(resolved)
}

pub fn parse_tags(raw: &str) -> Result<Vec<String>, ConfigError> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(ConfigError::MalformedTags)?;
    let items = value.as_array().ok_or(ConfigError::TagsNotStringArray)?;
    items
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or(ConfigError::TagsNotStringArray)
        })
        .collect()
}

/// Comma-separated list; empty input falls back to the default set.
pub fn parse_extensions(raw: Option<&str>) -> Vec<String> {
    let parsed: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if parsed.is_empty() {
        DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
    } else {
        parsed
    }
}
