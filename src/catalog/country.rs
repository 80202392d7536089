//! Country tags (asset locations).

use sqlx::{QueryBuilder, SqlitePool};

use super::map_unique;
use crate::{AssetManagerError, Result};

/// A country an asset relates to.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CountryTag {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    /// ISO 3166-1 alpha-2 code, upper case.
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct NewCountryTag {
    pub name: String,
    pub display_name: String,
    pub code: String,
}

impl NewCountryTag {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            code: code.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CountryTagUpdate {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub code: Option<String>,
}

impl CountryTagUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.display_name.is_none() && self.code.is_none()
    }
}

/// Upper-case a country code and check it is two ASCII letters.
pub fn normalize_code(code: &str) -> Result<String> {
    let code = code.trim().to_ascii_uppercase();
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(code)
    } else {
        Err(AssetManagerError::Validation(format!(
            "\"{code}\" is not a valid ISO 3166-1 alpha-2 country code."
        )))
    }
}

fn duplicate_msg() -> String {
    "A country tag with this name or code already exists.".to_string()
}

pub struct CountryTagRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CountryTagRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, country: &NewCountryTag) -> Result<CountryTag> {
        let code = normalize_code(&country.code)?;

        let result =
            sqlx::query("INSERT INTO country_tags (name, display_name, code) VALUES (?, ?, ?)")
                .bind(country.name.trim())
                .bind(country.display_name.trim())
                .bind(&code)
                .execute(self.pool)
                .await
                .map_err(|e| map_unique(e, duplicate_msg))?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| AssetManagerError::NotFound("country tag".to_string()))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<CountryTag>> {
        let country = sqlx::query_as::<_, CountryTag>(
            "SELECT id, name, display_name, code FROM country_tags WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(country)
    }

    pub async fn get_by_code(&self, code: &str) -> Result<Option<CountryTag>> {
        let country = sqlx::query_as::<_, CountryTag>(
            "SELECT id, name, display_name, code FROM country_tags WHERE code = ?",
        )
        .bind(code.trim().to_ascii_uppercase())
        .fetch_optional(self.pool)
        .await?;

        Ok(country)
    }

    pub async fn list(&self) -> Result<Vec<CountryTag>> {
        let countries = sqlx::query_as::<_, CountryTag>(
            "SELECT id, name, display_name, code FROM country_tags ORDER BY display_name, id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(countries)
    }

    pub async fn update(&self, id: i64, update: &CountryTagUpdate) -> Result<Option<CountryTag>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let code = update.code.as_deref().map(normalize_code).transpose()?;

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE country_tags SET ");
        let mut separated = query.separated(", ");

        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name.trim().to_string());
        }

        if let Some(ref display_name) = update.display_name {
            separated.push("display_name = ");
            separated.push_bind_unseparated(display_name.trim().to_string());
        }

        if let Some(code) = code {
            separated.push("code = ");
            separated.push_bind_unseparated(code);
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| map_unique(e, duplicate_msg))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM country_tags WHERE id = ?")
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

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" gb ").unwrap(), "GB");
        assert!(normalize_code("GBR").is_err());
        assert!(normalize_code("1A").is_err());
        assert!(normalize_code("").is_err());
    }

    #[tokio::test]
    async fn test_country_crud() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = CountryTagRepository::new(db.pool());

        let kenya = repo
            .create(&NewCountryTag::new("kenya", "Kenya", "ke"))
            .await
            .unwrap();
        assert_eq!(kenya.code, "KE");
        assert_eq!(repo.get_by_code("ke").await.unwrap(), Some(kenya.clone()));

        let updated = repo
            .update(
                kenya.id,
                &CountryTagUpdate {
                    display_name: Some("Republic of Kenya".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.display_name, "Republic of Kenya");
        assert_eq!(updated.code, "KE");

        assert_eq!(repo.list().await.unwrap().len(), 1);
        assert!(repo.delete(kenya.id).await.unwrap());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_code_conflicts() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = CountryTagRepository::new(db.pool());

        repo.create(&NewCountryTag::new("uganda", "Uganda", "UG"))
            .await
            .unwrap();
        let err = repo
            .create(&NewCountryTag::new("uganda2", "Uganda", "ug"))
            .await
            .unwrap_err();
        assert!(matches!(err, AssetManagerError::Conflict(_)));
    }
}
