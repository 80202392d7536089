//! Chapters: named time ranges within an asset.

use sqlx::{QueryBuilder, SqlitePool};

use super::{invalid_pk_msg, map_unique};
use crate::{AssetManagerError, Result};

/// A chapter of an asset.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Chapter {
    pub id: i64,
    pub asset_id: i64,
    pub name: String,
    /// Seconds from the start of the asset.
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChapter {
    pub name: String,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub description: Option<String>,
}

impl NewChapter {
    pub fn new(name: impl Into<String>, start_time: i64) -> Self {
        Self {
            name: name.into(),
            start_time,
            end_time: None,
            description: None,
        }
    }

    pub fn with_end(mut self, end_time: i64) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check the time range.
    pub fn validate(&self) -> Result<()> {
        check_times(self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChapterUpdate {
    pub name: Option<String>,
    pub start_time: Option<i64>,
    pub end_time: Option<Option<i64>>,
    pub description: Option<Option<String>>,
}

impl ChapterUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.description.is_none()
    }
}

fn check_times(start: i64, end: Option<i64>) -> Result<()> {
    if start < 0 {
        return Err(AssetManagerError::Validation(
            "Chapter start time cannot be negative.".to_string(),
        ));
    }
    if matches!(end, Some(end) if end < start) {
        return Err(AssetManagerError::Validation(
            "Chapter end time must not be before its start time.".to_string(),
        ));
    }
    Ok(())
}

fn duplicate_msg(name: &str) -> String {
    format!("Chapter \"{name}\" already exists for this Asset.")
}

const CHAPTER_COLUMNS: &str = "id, asset_id, name, start_time, end_time, description";

pub struct ChapterRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ChapterRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    async fn ensure_asset(&self, asset_id: i64) -> Result<()> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM assets WHERE id = ?)")
            .bind(asset_id)
            .fetch_one(self.pool)
            .await?;
        if exists.0 {
            Ok(())
        } else {
            Err(AssetManagerError::Validation(invalid_pk_msg(asset_id)))
        }
    }

    pub async fn create(&self, asset_id: i64, chapter: &NewChapter) -> Result<Chapter> {
        chapter.validate()?;
        self.ensure_asset(asset_id).await?;

        let result = sqlx::query(
            "INSERT INTO chapters (asset_id, name, start_time, end_time, description)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(asset_id)
        .bind(chapter.name.trim())
        .bind(chapter.start_time)
        .bind(chapter.end_time)
        .bind(&chapter.description)
        .execute(self.pool)
        .await
        .map_err(|e| map_unique(e, || duplicate_msg(chapter.name.trim())))?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| AssetManagerError::NotFound("chapter".to_string()))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Chapter>> {
        let chapter = sqlx::query_as::<_, Chapter>(&format!(
            "SELECT {CHAPTER_COLUMNS} FROM chapters WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(chapter)
    }

    /// List chapters, optionally for one asset, in playback order.
    pub async fn list(&self, asset_id: Option<i64>) -> Result<Vec<Chapter>> {
        let mut query: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new(format!("SELECT {CHAPTER_COLUMNS} FROM chapters"));
        if let Some(asset_id) = asset_id {
            query.push(" WHERE asset_id = ");
            query.push_bind(asset_id);
        }
        query.push(" ORDER BY asset_id, start_time, id");

        let chapters = query.build_query_as::<Chapter>().fetch_all(self.pool).await?;
        Ok(chapters)
    }

    pub async fn list_by_asset(&self, asset_id: i64) -> Result<Vec<Chapter>> {
        self.list(Some(asset_id)).await
    }

    pub async fn update(&self, id: i64, update: &ChapterUpdate) -> Result<Option<Chapter>> {
        let Some(current) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        if update.is_empty() {
            return Ok(Some(current));
        }

        check_times(
            update.start_time.unwrap_or(current.start_time),
            update.end_time.unwrap_or(current.end_time),
        )?;

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE chapters SET ");
        let mut separated = query.separated(", ");

        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name.trim().to_string());
        }

        if let Some(start_time) = update.start_time {
            separated.push("start_time = ");
            separated.push_bind_unseparated(start_time);
        }

        if let Some(end_time) = update.end_time {
            separated.push("end_time = ");
            separated.push_bind_unseparated(end_time);
        }

        if let Some(ref description) = update.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description.clone());
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        query.build().execute(self.pool).await.map_err(|e| {
            map_unique(e, || {
                duplicate_msg(update.name.as_deref().unwrap_or(&current.name))
            })
        })?;

        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM chapters WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace every chapter of an asset in one transaction.
    ///
    /// Callers check the batch for repeated names first.
    pub async fn replace_for_asset(
        &self,
        asset_id: i64,
        chapters: &[NewChapter],
    ) -> Result<Vec<Chapter>> {
        for chapter in chapters {
            chapter.validate()?;
        }
        self.ensure_asset(asset_id).await?;

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM chapters WHERE asset_id = ?")
            .bind(asset_id)
            .execute(&mut *tx)
            .await?;

        for chapter in chapters {
            sqlx::query(
                "INSERT INTO chapters (asset_id, name, start_time, end_time, description)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(asset_id)
            .bind(chapter.name.trim())
            .bind(chapter.start_time)
            .bind(chapter.end_time)
            .bind(&chapter.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_unique(e, || duplicate_msg(chapter.name.trim())))?;
        }

        tx.commit().await?;
        self.list_by_asset(asset_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().await.unwrap();
        sqlx::query("INSERT INTO folders (name) VALUES ('Videos')")
            .execute(db.pool())
            .await
            .unwrap();
        let result = sqlx::query("INSERT INTO assets (name, parent_id) VALUES ('Intro', 1)")
            .execute(db.pool())
            .await
            .unwrap();
        (db, result.last_insert_rowid())
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (db, asset_id) = setup().await;
        let repo = ChapterRepository::new(db.pool());

        repo.create(asset_id, &NewChapter::new("Outro", 300))
            .await
            .unwrap();
        let intro = repo
            .create(asset_id, &NewChapter::new("Opening", 0).with_end(45))
            .await
            .unwrap();

        let chapters = repo.list_by_asset(asset_id).await.unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0], intro);
    }

    #[tokio::test]
    async fn test_time_range_checked() {
        let (db, asset_id) = setup().await;
        let repo = ChapterRepository::new(db.pool());

        let err = repo
            .create(asset_id, &NewChapter::new("Bad", 50).with_end(10))
            .await
            .unwrap_err();
        assert!(matches!(err, AssetManagerError::Validation(_)));

        let chapter = repo
            .create(asset_id, &NewChapter::new("Good", 10).with_end(20))
            .await
            .unwrap();
        let err = repo
            .update(
                chapter.id,
                &ChapterUpdate {
                    start_time: Some(30),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AssetManagerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_asset() {
        let (db, _) = setup().await;
        let repo = ChapterRepository::new(db.pool());

        let err = repo
            .create(99, &NewChapter::new("Intro", 0))
            .await
            .unwrap_err();
        assert_eq!(err.message(), invalid_pk_msg(99));
    }

    #[tokio::test]
    async fn test_replace_for_asset() {
        let (db, asset_id) = setup().await;
        let repo = ChapterRepository::new(db.pool());

        repo.create(asset_id, &NewChapter::new("Old", 0))
            .await
            .unwrap();

        let chapters = repo
            .replace_for_asset(
                asset_id,
                &[NewChapter::new("A", 0), NewChapter::new("B", 60)],
            )
            .await
            .unwrap();
        let names: Vec<_> = chapters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);

        // A duplicate rolls the whole batch back.
        let err = repo
            .replace_for_asset(asset_id, &[NewChapter::new("C", 0), NewChapter::new("C", 5)])
            .await
            .unwrap_err();
        assert!(matches!(err, AssetManagerError::Conflict(_)));
        assert_eq!(repo.list_by_asset(asset_id).await.unwrap().len(), 2);
    }
}
