//! PostgreSQL trigger repository

use async_trait::async_trait;
use sqlx::PgPool;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError, TriggerId};
use domain_parametric::{ParametricTrigger, TriggerQuery, TriggerRecord, TriggerRepository};

use crate::error::DatabaseError;
use crate::repositories::{TriggerRow, TriggersRepository};

#[derive(Debug, Clone)]
pub struct PgTriggerRepository {
    repository: TriggersRepository,
    pool: PgPool,
}

impl PgTriggerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: TriggersRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PgTriggerRepository {}

#[async_trait]
impl HealthCheckable for PgTriggerRepository {
    async fn health_check(&self) -> HealthCheckResult {
        super::probe(&self.pool, "postgres-trigger-repository").await
    }
}

#[async_trait]
impl TriggerRepository for PgTriggerRepository {
    async fn insert(&self, trigger: &ParametricTrigger) -> Result<(), PortError> {
        Ok(self.repository.insert(&trigger_to_row(trigger)).await?)
    }

    async fn update(&self, trigger: &ParametricTrigger) -> Result<(), PortError> {
        Ok(self.repository.update(&trigger_to_row(trigger)).await?)
    }

    async fn get(&self, id: TriggerId) -> Result<ParametricTrigger, PortError> {
        let row = self.repository.get(*id.as_uuid()).await?;
        Ok(trigger_from_row(row)?)
    }

    async fn find(&self, query: &TriggerQuery) -> Result<Vec<ParametricTrigger>, PortError> {
        let rows = self.repository.find(query).await?;
        let triggers = rows
            .into_iter()
            .map(trigger_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(triggers)
    }
}

fn trigger_to_row(trigger: &ParametricTrigger) -> TriggerRow {
    TriggerRow {
        id: *trigger.id().as_uuid(),
        trigger_code: trigger.trigger_code().to_string(),
        parameter: trigger.parameter().to_string(),
        threshold: trigger.threshold(),
        current_value: trigger.current_value(),
        triggered: trigger.triggered(),
        location_name: trigger.location_name().to_string(),
        date_checked: trigger.date_checked(),
        created_at: trigger.created_at(),
        updated_at: trigger.updated_at(),
    }
}

// The stored flag is ignored; the domain recomputes it from the values.
fn trigger_from_row(row: TriggerRow) -> Result<ParametricTrigger, DatabaseError> {
    let record = TriggerRecord {
        id: TriggerId::from(row.id),
        trigger_code: row.trigger_code,
        parameter: row.parameter,
        threshold: row.threshold,
        current_value: row.current_value,
        triggered: Some(row.triggered),
        location_name: row.location_name,
        date_checked: row.date_checked,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    ParametricTrigger::try_from(record).map_err(|e| DatabaseError::SerializationError(e.to_string()))
}
