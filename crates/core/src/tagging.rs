//! The annotation workflow: hand out unannotated videos, record tags, report
//! progress.

use crate::config::AppConfig;
use crate::error::TaggingError;
use crate::models::{Stats, VideoResponse};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::{Component, Path, PathBuf};
use storage::{VideoRecord, VideoStore};
use tracing::{info, warn};

/// URL prefix under which the video root is served.
pub const VIDEO_MOUNT: &str = "/static_videos";

/// Characters that cannot appear raw in a URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone)]
pub struct TaggingService {
    store: VideoStore,
    video_root: PathBuf,
    tags: Vec<String>,
}

impl TaggingService {
    pub fn new(store: VideoStore, config: &AppConfig) -> Self {
        Self {
            store,
            video_root: config.video_root.clone(),
            tags: config.tags.clone(),
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn video_root(&self) -> &Path {
        &self.video_root
    }

    /// Returns a random unannotated video, or `None` when everything is done.
    ///
    /// Records whose path has left the video root cannot be served; they are
    /// marked annotated (tag left empty) and another candidate is drawn. The
    /// pool shrinks by one on every such hit, so the loop is bounded by the
    /// unannotated count seen on entry.
    pub async fn next_video(&self) -> Result<Option<VideoResponse>, TaggingError> {
        let budget = self.store.count_unannotated().await?.max(0) as u64;
        for _ in 0..=budget {
            let Some(mut record) = self.store.pick_random_unannotated().await? else {
                return Ok(None);
            };
            match web_path(&self.video_root, Path::new(&record.filepath)) {
                Some(path) => return Ok(Some(to_response(record, Some(path)))),
                None => {
                    warn!(
                        id = record.id,
                        filepath = %record.filepath,
                        root = %self.video_root.display(),
                        "video is outside the video root, marking unreachable"
                    );
                    record.is_annotated = true;
                    self.store.update(&record).await?;
                }
            }
        }
        Ok(None)
    }

    /// Assigns `tag` to video `id`. The tag is validated before the record is
    /// looked up, so an invalid tag never touches the store.
    pub async fn tag_video(&self, id: i64, tag: &str) -> Result<VideoResponse, TaggingError> {
        if !self.tags.iter().any(|t| t == tag) {
            return Err(TaggingError::InvalidTag {
                tag: tag.to_string(),
                valid: self.tags.clone(),
            });
        }
        let mut record = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(TaggingError::NotFound(id))?;

        record.tag = Some(tag.to_string());
        record.is_annotated = true;
        self.store.update(&record).await?;
        info!(id, tag, "tagged video");

        let path = web_path(&self.video_root, Path::new(&record.filepath));
        Ok(to_response(record, path))
    }

    pub async fn stats(&self) -> Result<Stats, TaggingError> {
        let total = self.store.count_total().await?;
        let annotated = self.store.count_annotated().await?.min(total);
        Ok(Stats {
            total_videos: total,
            annotated_videos: annotated,
            unannotated_videos: (total - annotated).max(0),
        })
    }
}

/// `/static_videos/<path relative to root>` with `/` separators and each
/// segment percent-encoded, or `None` when `filepath` is not inside `root`.
pub fn web_path(root: &Path, filepath: &Path) -> Option<String> {
    let relative = filepath.strip_prefix(root).ok()?;
    let mut out = String::from(VIDEO_MOUNT);
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                out.push('/');
                out.extend(utf8_percent_encode(&part.to_string_lossy(), SEGMENT));
            }
            Component::CurDir => {}
            _ => return None,
        }
    }
    if out.len() == VIDEO_MOUNT.len() {
        return None;
    }
    Some(out)
}

fn to_response(record: VideoRecord, web_path: Option<String>) -> VideoResponse {
    VideoResponse {
        id: record.id,
        filename: record.filename,
        web_path,
        is_annotated: record.is_annotated,
        tag: record.tag,
    }
}
