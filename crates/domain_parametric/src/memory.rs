//! In-memory trigger repository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError, TriggerId};

use crate::ports::{TriggerQuery, TriggerRepository};
use crate::trigger::ParametricTrigger;

#[derive(Debug, Clone, Default)]
pub struct InMemoryTriggerRepository {
    triggers: Arc<RwLock<HashMap<TriggerId, ParametricTrigger>>>,
}

impl InMemoryTriggerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn code_taken(triggers: &HashMap<TriggerId, ParametricTrigger>, trigger: &ParametricTrigger) -> bool {
    triggers
        .values()
        .any(|t| t.trigger_code() == trigger.trigger_code() && t.id() != trigger.id())
}

impl DomainPort for InMemoryTriggerRepository {}

#[async_trait]
impl HealthCheckable for InMemoryTriggerRepository {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::always_healthy("memory-trigger-repository")
    }
}

#[async_trait]
impl TriggerRepository for InMemoryTriggerRepository {
    async fn insert(&self, trigger: &ParametricTrigger) -> Result<(), PortError> {
        let mut triggers = self.triggers.write().await;
        if triggers.contains_key(&trigger.id()) || code_taken(&triggers, trigger) {
            return Err(PortError::conflict(format!(
                "trigger code {} already exists",
                trigger.trigger_code()
            )));
        }
        triggers.insert(trigger.id(), trigger.clone());
        Ok(())
    }

    async fn update(&self, trigger: &ParametricTrigger) -> Result<(), PortError> {
        let mut triggers = self.triggers.write().await;
        if !triggers.contains_key(&trigger.id()) {
            return Err(PortError::not_found("ParametricTrigger", trigger.id()));
        }
        if code_taken(&triggers, trigger) {
            return Err(PortError::conflict(format!(
                "trigger code {} already exists",
                trigger.trigger_code()
            )));
        }
        triggers.insert(trigger.id(), trigger.clone());
        Ok(())
    }

    async fn get(&self, id: TriggerId) -> Result<ParametricTrigger, PortError> {
        self.triggers
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("ParametricTrigger", id))
    }

    async fn find(&self, query: &TriggerQuery) -> Result<Vec<ParametricTrigger>, PortError> {
        let triggers = self.triggers.read().await;
        let mut results: Vec<_> = triggers.values().filter(|t| query.matches(t)).cloned().collect();
        results.sort_by(|a, b| {
            b.date_checked()
                .cmp(&a.date_checked())
                .then_with(|| b.updated_at().cmp(&a.updated_at()))
        });
        Ok(results)
    }
}
