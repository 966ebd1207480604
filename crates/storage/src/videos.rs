use crate::models::VideoRecord;
use crate::{Result, StoreError};
use rand::seq::SliceRandom;
use sqlx::SqlitePool;
use tracing::debug;

const SELECT_VIDEO: &str = "SELECT id, filepath, filename, is_annotated, tag FROM videos";

/// Query surface over the `videos` table. Cheap to clone; every call runs
/// its own statement on the shared pool.
#[derive(Debug, Clone)]
pub struct VideoStore {
    pool: SqlitePool,
}

impl VideoStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_path(&self, filepath: &str) -> Result<Option<VideoRecord>> {
        let row = sqlx::query_as::<_, VideoRecord>(&format!("{SELECT_VIDEO} WHERE filepath = ?1"))
            .bind(filepath)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<VideoRecord>> {
        let row = sqlx::query_as::<_, VideoRecord>(&format!("{SELECT_VIDEO} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Inserts a fresh, unannotated record. A second insert for the same
    /// path fails with [`StoreError::ConstraintViolation`].
    pub async fn insert(&self, filepath: &str, filename: &str) -> Result<VideoRecord> {
        let res = sqlx::query("INSERT INTO videos (filepath, filename, is_annotated) VALUES (?1, ?2, 0)")
            .bind(filepath)
            .bind(filename)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    StoreError::ConstraintViolation {
                        filepath: filepath.to_string(),
                    }
                }
                other => StoreError::Database(other),
            })?;
        let id = res.last_insert_rowid();
        debug!(id, filepath, "inserted video");
        Ok(VideoRecord {
            id,
            filepath: filepath.to_string(),
            filename: filename.to_string(),
            is_annotated: false,
            tag: None,
        })
    }

    /// Picks one unannotated record uniformly at random.
    ///
    /// The candidate ids are fetched and the choice is made here rather than
    /// with `ORDER BY RANDOM()`, which sorts the whole table on every call.
    pub async fn pick_random_unannotated(&self) -> Result<Option<VideoRecord>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM videos WHERE is_annotated = 0")
            .fetch_all(&self.pool)
            .await?;
        let picked = ids.choose(&mut rand::thread_rng()).copied();
        match picked {
            Some(id) => self.find_by_id(id).await,
            None => Ok(None),
        }
    }

    /// Persists `tag` and `is_annotated` for an existing record.
    pub async fn update(&self, record: &VideoRecord) -> Result<()> {
        let res = sqlx::query("UPDATE videos SET tag = ?2, is_annotated = ?3 WHERE id = ?1")
            .bind(record.id)
            .bind(record.tag.as_deref())
            .bind(record.is_annotated)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound { id: record.id });
        }
        Ok(())
    }

    pub async fn count_total(&self) -> Result<i64> {
        let n = sqlx::query_scalar("SELECT COUNT(*) FROM videos")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    pub async fn count_annotated(&self) -> Result<i64> {
        let n = sqlx::query_scalar("SELECT COUNT(*) FROM videos WHERE is_annotated = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    pub async fn count_unannotated(&self) -> Result<i64> {
        let n = sqlx::query_scalar("SELECT COUNT(*) FROM videos WHERE is_annotated = 0")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}
