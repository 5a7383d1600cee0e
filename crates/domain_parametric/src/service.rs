//! Trigger application service

use std::sync::Arc;
use tracing::{info, instrument};

use core_kernel::{PortError, TriggerId};

use crate::error::TriggerError;
use crate::ports::{TriggerQuery, TriggerRepository};
use crate::trigger::{evaluate_trigger, ParametricTrigger, TriggerInput};

pub struct TriggerService {
    triggers: Arc<dyn TriggerRepository>,
}

impl TriggerService {
    pub fn new(triggers: Arc<dyn TriggerRepository>) -> Self {
        Self { triggers }
    }

    pub fn repository(&self) -> &Arc<dyn TriggerRepository> {
        &self.triggers
    }

    #[instrument(skip_all, fields(code = %input.trigger_code))]
    pub async fn create(&self, input: TriggerInput) -> Result<ParametricTrigger, TriggerError> {
        let trigger = evaluate_trigger(input)?;
        self.triggers
            .insert(&trigger)
            .await
            .map_err(|err| storage_error(err, &trigger))?;
        info!(triggered = trigger.triggered(), "Trigger created");
        Ok(trigger)
    }

    #[instrument(skip(self, input), fields(code = %input.trigger_code))]
    pub async fn update(&self, id: TriggerId, input: TriggerInput) -> Result<ParametricTrigger, TriggerError> {
        let mut trigger = self.get(id).await?;
        trigger.apply(input)?;
        self.triggers
            .update(&trigger)
            .await
            .map_err(|err| storage_error(err, &trigger))?;
        info!(triggered = trigger.triggered(), "Trigger updated");
        Ok(trigger)
    }

    pub async fn get(&self, id: TriggerId) -> Result<ParametricTrigger, TriggerError> {
        self.triggers.get(id).await.map_err(|err| {
            if err.is_not_found() {
                TriggerError::TriggerNotFound(id.to_string())
            } else {
                TriggerError::Storage(err)
            }
        })
    }

    pub async fn find(&self, query: &TriggerQuery) -> Result<Vec<ParametricTrigger>, TriggerError> {
        Ok(self.triggers.find(query).await?)
    }

    pub async fn active(&self) -> Result<Vec<ParametricTrigger>, TriggerError> {
        self.find(&TriggerQuery::active()).await
    }
}

fn storage_error(err: PortError, trigger: &ParametricTrigger) -> TriggerError {
    match err {
        PortError::Conflict { .. } => TriggerError::DuplicateCode(trigger.trigger_code().to_string()),
        PortError::NotFound { .. } => TriggerError::TriggerNotFound(trigger.id().to_string()),
        other => TriggerError::Storage(other),
    }
}
