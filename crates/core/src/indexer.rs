use crate::config::AppConfig;
use crate::error::{ConfigError, IndexError};
use crate::scanner::{self, ScannedVideo};
use serde::Serialize;
use std::path::Path;
use storage::{StoreError, VideoStore};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    /// Matching files found under the root.
    pub discovered: u64,
    /// Records created by this pass.
    pub added: u64,
    /// Entries skipped because of traversal errors or non UTF-8 paths.
    pub skipped: u64,
}

pub struct Indexer {
    store: VideoStore,
    extensions: Vec<String>,
}

impl Indexer {
    pub fn new(store: VideoStore, extensions: Vec<String>) -> Self {
        Self { store, extensions }
    }

    /// Makes the store reflect the video files under `root`. Safe to re-run:
    /// paths already indexed are left untouched.
    pub async fn index(&self, root: &Path) -> Result<IndexSummary, IndexError> {
        if !root.is_dir() {
            return Err(ConfigError::InvalidVideoRoot {
                given: root.to_string_lossy().into_owned(),
                resolved: root.to_path_buf(),
            }
            .into());
        }

        info!("Starting video indexing in: {}", root.display());
        let (mut rx, walker) = scanner::spawn_walker(root.to_path_buf(), self.extensions.clone());

        let mut summary = IndexSummary::default();
        while let Some(video) = rx.recv().await {
            summary.discovered += 1;
            match self.add_if_missing(&video).await {
                Ok(true) => summary.added += 1,
                Ok(false) => {}
                Err(err) => {
                    drop(rx);
                    let _ = walker.await;
                    return Err(err.into());
                }
            }
        }

        summary.skipped = walker.await?;
        info!(
            discovered = summary.discovered,
            skipped = summary.skipped,
            "Video indexing complete. Added {} new videos.",
            summary.added
        );
        Ok(summary)
    }

    /// Returns `true` when a new record was created.
    pub async fn add_if_missing(&self, video: &ScannedVideo) -> Result<bool, StoreError> {
        if self.store.find_by_path(&video.filepath).await?.is_some() {
            return Ok(false);
        }
        match self.store.insert(&video.filepath, &video.filename).await {
            Ok(_) => Ok(true),
            Err(StoreError::ConstraintViolation { filepath }) => {
                debug!(%filepath, "already indexed");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}

pub async fn index_videos(
    config: &AppConfig,
    store: &VideoStore,
) -> Result<IndexSummary, IndexError> {
    Indexer::new(store.clone(), config.extensions.clone())
        .index(&config.video_root)
        .await
}
