//! Trigger storage port

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, HealthCheckable, PortError, TriggerId};

use crate::trigger::ParametricTrigger;

/// Query parameters for finding triggers
///
/// Results are ordered by most recent check first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerQuery {
    pub triggered: Option<bool>,
    /// Case-insensitive substring of the location name
    pub location: Option<String>,
    pub parameter: Option<String>,
}

impl TriggerQuery {
    pub fn active() -> Self {
        Self {
            triggered: Some(true),
            ..Self::default()
        }
    }

    pub fn matches(&self, trigger: &ParametricTrigger) -> bool {
        if let Some(triggered) = self.triggered {
            if trigger.triggered() != triggered {
                return false;
            }
        }
        if let Some(ref location) = self.location {
            if !trigger
                .location_name()
                .to_lowercase()
                .contains(&location.to_lowercase())
            {
                return false;
            }
        }
        if let Some(ref parameter) = self.parameter {
            if trigger.parameter() != parameter {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait TriggerRepository: DomainPort + HealthCheckable {
    /// Stores a new trigger; a taken trigger code is a `Conflict`
    async fn insert(&self, trigger: &ParametricTrigger) -> Result<(), PortError>;

    /// Replaces an existing trigger
    async fn update(&self, trigger: &ParametricTrigger) -> Result<(), PortError>;

    async fn get(&self, id: TriggerId) -> Result<ParametricTrigger, PortError>;

    async fn find(&self, query: &TriggerQuery) -> Result<Vec<ParametricTrigger>, PortError>;
}
