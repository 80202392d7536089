//! Tags, optionally grouped by a tag group.

use sqlx::{QueryBuilder, SqlitePool};

use super::{invalid_pk_msg, map_unique, NamedRepository};
use crate::{AssetManagerError, Result};

/// A tag that can be attached to assets.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    /// Tag group id, if any.
    pub group_id: Option<i64>,
    /// Deprecated tags stay attached but should not be offered for new assets.
    pub deprecated: bool,
}

#[derive(Debug, Clone)]
pub struct NewTag {
    pub name: String,
    pub group_id: Option<i64>,
    pub deprecated: bool,
}

impl NewTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group_id: None,
            deprecated: false,
        }
    }

    pub fn with_group(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn with_deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct TagUpdate {
    pub name: Option<String>,
    pub group_id: Option<Option<i64>>,
    pub deprecated: Option<bool>,
}

impl TagUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn group_id(mut self, group_id: Option<i64>) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = Some(deprecated);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.group_id.is_none() && self.deprecated.is_none()
    }
}

fn duplicate_msg(name: &str) -> String {
    format!("Tag \"{name}\" already exists in this group.")
}

/// Repository for tags.
pub struct TagRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TagRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    async fn ensure_group(&self, group_id: Option<i64>) -> Result<()> {
        if let Some(id) = group_id {
            if NamedRepository::tag_groups(self.pool)
                .get_by_id(id)
                .await?
                .is_none()
            {
                return Err(AssetManagerError::Validation(invalid_pk_msg(id)));
            }
        }
        Ok(())
    }

    pub async fn create(&self, tag: &NewTag) -> Result<Tag> {
        self.ensure_group(tag.group_id).await?;

        let name = tag.name.trim();
        let result =
            sqlx::query("INSERT INTO tags (name, group_id, deprecated) VALUES (?, ?, ?)")
                .bind(name)
                .bind(tag.group_id)
                .bind(tag.deprecated)
                .execute(self.pool)
                .await
                .map_err(|e| map_unique(e, || duplicate_msg(name)))?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| AssetManagerError::NotFound("tag".to_string()))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>(
            "SELECT id, name, group_id, deprecated FROM tags WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(tag)
    }

    /// List tags, optionally restricted to one group.
    pub async fn list(&self, group_id: Option<i64>) -> Result<Vec<Tag>> {
        let mut query: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new("SELECT id, name, group_id, deprecated FROM tags");
        if let Some(group_id) = group_id {
            query.push(" WHERE group_id = ");
            query.push_bind(group_id);
        }
        query.push(" ORDER BY name, id");

        let tags = query.build_query_as::<Tag>().fetch_all(self.pool).await?;
        Ok(tags)
    }

    pub async fn update(&self, id: i64, update: &TagUpdate) -> Result<Option<Tag>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }
        if let Some(group_id) = update.group_id {
            self.ensure_group(group_id).await?;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE tags SET ");
        let mut separated = query.separated(", ");

        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name.trim().to_string());
        }

        if let Some(group_id) = update.group_id {
            separated.push("group_id = ");
            separated.push_bind_unseparated(group_id);
        }

        if let Some(deprecated) = update.deprecated {
            separated.push("deprecated = ");
            separated.push_bind_unseparated(deprecated);
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query.build().execute(self.pool).await.map_err(|e| {
            map_unique(e, || duplicate_msg(update.name.as_deref().unwrap_or_default()))
        })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_create_and_list_tags() {
        let db = Database::open_in_memory().await.unwrap();
        let group = NamedRepository::tag_groups(db.pool())
            .create("Topic")
            .await
            .unwrap();
        let repo = TagRepository::new(db.pool());

        let tag = repo
            .create(&NewTag::new("Safety").with_group(group.id))
            .await
            .unwrap();
        repo.create(&NewTag::new("Legacy").with_deprecated(true))
            .await
            .unwrap();

        assert_eq!(tag.group_id, Some(group.id));
        assert!(!tag.deprecated);
        assert_eq!(repo.list(None).await.unwrap().len(), 2);
        assert_eq!(repo.list(Some(group.id)).await.unwrap(), vec![tag]);
    }

    #[tokio::test]
    async fn test_same_name_allowed_in_other_group() {
        let db = Database::open_in_memory().await.unwrap();
        let groups = NamedRepository::tag_groups(db.pool());
        let g1 = groups.create("One").await.unwrap();
        let g2 = groups.create("Two").await.unwrap();
        let repo = TagRepository::new(db.pool());

        repo.create(&NewTag::new("Intro").with_group(g1.id))
            .await
            .unwrap();
        repo.create(&NewTag::new("Intro").with_group(g2.id))
            .await
            .unwrap();
        repo.create(&NewTag::new("Intro")).await.unwrap();

        let err = repo.create(&NewTag::new("Intro")).await.unwrap_err();
        assert!(matches!(err, AssetManagerError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_unknown_group_rejected() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = TagRepository::new(db.pool());

        let err = repo
            .create(&NewTag::new("Intro").with_group(5))
            .await
            .unwrap_err();
        assert_eq!(err.message(), invalid_pk_msg(5));
    }

    #[tokio::test]
    async fn test_update_and_group_delete() {
        let db = Database::open_in_memory().await.unwrap();
        let groups = NamedRepository::tag_groups(db.pool());
        let group = groups.create("Topic").await.unwrap();
        let repo = TagRepository::new(db.pool());

        let tag = repo.create(&NewTag::new("Intro")).await.unwrap();
        let updated = repo
            .update(
                tag.id,
                &TagUpdate::new()
                    .name("Introduction")
                    .group_id(Some(group.id))
                    .deprecated(true),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Introduction");
        assert!(updated.deprecated);

        groups.delete(group.id).await.unwrap();
        let ungrouped = repo.get_by_id(tag.id).await.unwrap().unwrap();
        assert!(ungrouped.group_id.is_none());

        assert!(repo.delete(tag.id).await.unwrap());
        assert!(!repo.delete(tag.id).await.unwrap());
    }
}
