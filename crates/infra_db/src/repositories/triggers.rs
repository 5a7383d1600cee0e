//! Parametric triggers repository
//!
//! `triggered` is a generated column; it is read back but never written.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use domain_parametric::TriggerQuery;

use super::like_pattern;
use crate::error::DatabaseError;

const TRIGGER_COLUMNS: &str = "id, trigger_code, parameter, threshold, current_value, triggered, \
     location_name, date_checked, created_at, updated_at";

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct TriggerRow {
    pub id: Uuid,
    pub trigger_code: String,
    pub parameter: String,
    pub threshold: f64,
    pub current_value: f64,
    pub triggered: bool,
    pub location_name: String,
    pub date_checked: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TriggersRepository {
    pool: PgPool,
}

impl TriggersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a trigger; a taken trigger code fails with `DuplicateEntry`
    pub async fn insert(&self, row: &TriggerRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO parametric_triggers (
                id, trigger_code, parameter, threshold, current_value,
                location_name, date_checked, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(row.id)
        .bind(&row.trigger_code)
        .bind(&row.parameter)
        .bind(row.threshold)
        .bind(row.current_value)
        .bind(&row.location_name)
        .bind(row.date_checked)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update(&self, row: &TriggerRow) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE parametric_triggers SET
                trigger_code = $2,
                parameter = $3,
                threshold = $4,
                current_value = $5,
                location_name = $6,
                date_checked = $7,
                updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(row.id)
        .bind(&row.trigger_code)
        .bind(&row.parameter)
        .bind(row.threshold)
        .bind(row.current_value)
        .bind(&row.location_name)
        .bind(row.date_checked)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("ParametricTrigger", row.id));
        }
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<TriggerRow, DatabaseError> {
        let sql = format!("SELECT {TRIGGER_COLUMNS} FROM parametric_triggers WHERE id = $1");
        sqlx::query_as::<_, TriggerRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("ParametricTrigger", id))
    }

    /// Triggers matching `query`, most recently checked first
    pub async fn find(&self, query: &TriggerQuery) -> Result<Vec<TriggerRow>, DatabaseError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {TRIGGER_COLUMNS} FROM parametric_triggers WHERE TRUE"));

        if let Some(triggered) = query.triggered {
            builder.push(" AND triggered = ").push_bind(triggered);
        }
        if let Some(ref location) = query.location {
            builder.push(" AND location_name ILIKE ").push_bind(like_pattern(location));
        }
        if let Some(ref parameter) = query.parameter {
            builder.push(" AND parameter = ").push_bind(parameter.clone());
        }
        builder.push(" ORDER BY date_checked DESC, updated_at DESC");

        let rows = builder.build_query_as::<TriggerRow>().fetch_all(&self.pool).await?;
        Ok(rows)
    }
}
