use serde::Serialize;
use sqlx::FromRow;

/// A row from the `videos` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct VideoRecord {
    pub id: i64,
    /// Canonical absolute path, unique across the table.
    pub filepath: String,
    pub filename: String,
    pub is_annotated: bool,
    pub tag: Option<String>,
}
