//! Catalog entries that carry nothing but a unique name:
//! collections, contributors and tag groups.

use sqlx::SqlitePool;

use super::map_unique;
use crate::{AssetManagerError, Result};

/// Which name-only table a repository works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKind {
    Collection,
    Contributor,
    TagGroup,
}

impl NamedKind {
    fn table(&self) -> &'static str {
        match self {
            NamedKind::Collection => "collections",
            NamedKind::Contributor => "contributors",
            NamedKind::TagGroup => "tag_groups",
        }
    }

    /// Human readable label used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            NamedKind::Collection => "Collection",
            NamedKind::Contributor => "Contributor",
            NamedKind::TagGroup => "Tag group",
        }
    }
}

/// A collection, contributor or tag group.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct NamedEntity {
    pub id: i64,
    pub name: String,
}

/// Repository for a name-only catalog table.
pub struct NamedRepository<'a> {
    pool: &'a SqlitePool,
    kind: NamedKind,
}

impl<'a> NamedRepository<'a> {
    pub fn new(pool: &'a SqlitePool, kind: NamedKind) -> Self {
        Self { pool, kind }
    }

    pub fn collections(pool: &'a SqlitePool) -> Self {
        Self::new(pool, NamedKind::Collection)
    }

    pub fn contributors(pool: &'a SqlitePool) -> Self {
        Self::new(pool, NamedKind::Contributor)
    }

    pub fn tag_groups(pool: &'a SqlitePool) -> Self {
        Self::new(pool, NamedKind::TagGroup)
    }

    fn duplicate(&self, name: &str) -> String {
        format!("{} \"{}\" already exists.", self.kind.label(), name)
    }

    pub async fn create(&self, name: &str) -> Result<NamedEntity> {
        let name = name.trim();
        let result = sqlx::query(&format!("INSERT INTO {} (name) VALUES (?)", self.kind.table()))
            .bind(name)
            .execute(self.pool)
            .await
            .map_err(|e| map_unique(e, || self.duplicate(name)))?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| AssetManagerError::NotFound(self.kind.label().to_lowercase()))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<NamedEntity>> {
        let entity = sqlx::query_as::<_, NamedEntity>(&format!(
            "SELECT id, name FROM {} WHERE id = ?",
            self.kind.table()
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(entity)
    }

    /// All entries ordered by name.
    pub async fn list(&self) -> Result<Vec<NamedEntity>> {
        let entities = sqlx::query_as::<_, NamedEntity>(&format!(
            "SELECT id, name FROM {} ORDER BY name, id",
            self.kind.table()
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(entities)
    }

    /// Rename an entry. Returns None when the id does not exist.
    pub async fn update(&self, id: i64, name: &str) -> Result<Option<NamedEntity>> {
        let name = name.trim();
        let result = sqlx::query(&format!("UPDATE {} SET name = ? WHERE id = ?", self.kind.table()))
            .bind(name)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_unique(e, || self.duplicate(name)))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", self.kind.table()))
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
