use serde::{Deserialize, Serialize};

/// What the web client sees for one video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoResponse {
    pub id: i64,
    pub filename: String,
    /// `/static_videos/...` reference; `None` when the file is outside the
    /// configured root.
    pub web_path: Option<String>,
    pub is_annotated: bool,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagRequest {
    pub tag: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_videos: i64,
    pub annotated_videos: i64,
    pub unannotated_videos: i64,
}
