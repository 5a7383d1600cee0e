//! Parametric trigger DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use domain_parametric::{ParametricTrigger, TriggerQuery};

/// Query string of `GET /api/v1/triggers`
#[derive(Debug, Default, Deserialize)]
pub struct ListTriggersParams {
    pub triggered: Option<bool>,
    pub location: Option<String>,
    pub parameter: Option<String>,
}

impl From<ListTriggersParams> for TriggerQuery {
    fn from(params: ListTriggersParams) -> Self {
        TriggerQuery {
            triggered: params.triggered,
            location: params.location.filter(|l| !l.trim().is_empty()),
            parameter: params.parameter.filter(|p| !p.trim().is_empty()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub id: String,
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

impl From<&ParametricTrigger> for TriggerResponse {
    fn from(trigger: &ParametricTrigger) -> Self {
        Self {
            id: trigger.id().to_string(),
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
}
