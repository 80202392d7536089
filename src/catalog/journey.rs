//! Learner journeys: named, ordered sequences of assets.

use std::collections::HashSet;

use sqlx::{Sqlite, SqlitePool, Transaction};

use super::{invalid_pk_msg, map_unique};
use crate::{AssetManagerError, Result};

/// A learner journey.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LearnerJourney {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Asset ids in journey order.
    #[sqlx(skip)]
    pub asset_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct NewJourney {
    pub name: String,
    pub description: Option<String>,
    pub asset_ids: Vec<i64>,
}

impl NewJourney {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_assets(mut self, asset_ids: Vec<i64>) -> Self {
        self.asset_ids = asset_ids;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct JourneyUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub asset_ids: Option<Vec<i64>>,
}

fn duplicate_msg(name: &str) -> String {
    format!("Learner journey \"{name}\" already exists.")
}

pub struct LearnerJourneyRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> LearnerJourneyRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Reject repeated or unknown asset ids.
    async fn check_assets(&self, asset_ids: &[i64]) -> Result<()> {
        let mut seen = HashSet::new();
        for id in asset_ids {
            if !seen.insert(*id) {
                return Err(AssetManagerError::Validation(format!(
                    "Asset {id} appears more than once in this journey."
                )));
            }
            let exists: (bool,) =
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM assets WHERE id = ?)")
                    .bind(id)
                    .fetch_one(self.pool)
                    .await?;
            if !exists.0 {
                return Err(AssetManagerError::Validation(invalid_pk_msg(*id)));
            }
        }
        Ok(())
    }

    async fn write_steps(
        tx: &mut Transaction<'_, Sqlite>,
        journey_id: i64,
        asset_ids: &[i64],
    ) -> Result<()> {
        sqlx::query("DELETE FROM learner_journey_assets WHERE journey_id = ?")
            .bind(journey_id)
            .execute(&mut **tx)
            .await?;

        for (position, asset_id) in asset_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO learner_journey_assets (journey_id, asset_id, position) VALUES (?, ?, ?)",
            )
            .bind(journey_id)
            .bind(*asset_id)
            .bind(position as i64)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    async fn load_steps(&self, journey_id: i64) -> Result<Vec<i64>> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT asset_id FROM learner_journey_assets WHERE journey_id = ? ORDER BY position",
        )
        .bind(journey_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    pub async fn create(&self, journey: &NewJourney) -> Result<LearnerJourney> {
        self.check_assets(&journey.asset_ids).await?;
        let name = journey.name.trim();

        let mut tx = self.pool.begin().await?;
        let result =
            sqlx::query("INSERT INTO learner_journeys (name, description) VALUES (?, ?)")
                .bind(name)
                .bind(&journey.description)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_unique(e, || duplicate_msg(name)))?;
        let id = result.last_insert_rowid();
        Self::write_steps(&mut tx, id, &journey.asset_ids).await?;
        tx.commit().await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| AssetManagerError::NotFound("learner journey".to_string()))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<LearnerJourney>> {
        let journey = sqlx::query_as::<_, LearnerJourney>(
            "SELECT id, name, description FROM learner_journeys WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match journey {
            Some(mut journey) => {
                journey.asset_ids = self.load_steps(id).await?;
                Ok(Some(journey))
            }
            None => Ok(None),
        }
    }

    pub async fn list(&self) -> Result<Vec<LearnerJourney>> {
        let mut journeys = sqlx::query_as::<_, LearnerJourney>(
            "SELECT id, name, description FROM learner_journeys ORDER BY name, id",
        )
        .fetch_all(self.pool)
        .await?;

        for journey in &mut journeys {
            journey.asset_ids = self.load_steps(journey.id).await?;
        }
        Ok(journeys)
    }

    pub async fn update(&self, id: i64, update: &JourneyUpdate) -> Result<Option<LearnerJourney>> {
        let Some(current) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        if let Some(ref asset_ids) = update.asset_ids {
            self.check_assets(asset_ids).await?;
        }

        let name = update
            .name
            .as_deref()
            .map(str::trim)
            .unwrap_or(&current.name)
            .to_string();
        let description = update
            .description
            .clone()
            .unwrap_or(current.description.clone());

        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE learner_journeys SET name = ?, description = ? WHERE id = ?")
            .bind(&name)
            .bind(&description)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_unique(e, || duplicate_msg(&name)))?;
        if let Some(ref asset_ids) = update.asset_ids {
            Self::write_steps(&mut tx, id, asset_ids).await?;
        }
        tx.commit().await?;

        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM learner_journeys WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
