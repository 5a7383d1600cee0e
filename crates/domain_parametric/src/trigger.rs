//! Parametric trigger entity

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::TriggerId;

use crate::error::TriggerError;

const MAX_CODE_LEN: usize = 50;
const MAX_PARAMETER_LEN: usize = 100;
const MAX_LOCATION_LEN: usize = 200;

/// A write to a trigger: creation or full update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerInput {
    /// Unique business code (e.g. `TRG-RAIN-042`)
    pub trigger_code: String,
    /// Observed parameter, e.g. "rainfall_mm"
    pub parameter: String,
    pub threshold: f64,
    pub current_value: f64,
    /// Accepted for wire compatibility and discarded
    #[serde(default)]
    pub triggered: Option<bool>,
    pub location_name: String,
    /// Defaults to today
    #[serde(default)]
    pub date_checked: Option<NaiveDate>,
}

impl TriggerInput {
    fn validate(&self) -> Result<(), TriggerError> {
        let required = [
            ("trigger_code", self.trigger_code.trim(), MAX_CODE_LEN),
            ("parameter", self.parameter.trim(), MAX_PARAMETER_LEN),
            ("location_name", self.location_name.trim(), MAX_LOCATION_LEN),
        ];
        for (field, value, max) in required {
            if value.is_empty() {
                return Err(TriggerError::Validation(format!("{field} is required")));
            }
            if value.chars().count() > max {
                return Err(TriggerError::Validation(format!(
                    "{field} must be at most {max} characters"
                )));
            }
        }
        check_finite("threshold", self.threshold)?;
        check_finite("current_value", self.current_value)?;
        Ok(())
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), TriggerError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TriggerError::NonFinite { field, value })
    }
}

/// A threshold trigger whose state is always `current_value >= threshold`
///
/// The compared fields are private so the flag cannot drift from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TriggerRecord")]
pub struct ParametricTrigger {
    id: TriggerId,
    trigger_code: String,
    parameter: String,
    threshold: f64,
    current_value: f64,
    triggered: bool,
    location_name: String,
    date_checked: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Stored shape of a trigger; `triggered` is recomputed on load
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerRecord {
    pub id: TriggerId,
    pub trigger_code: String,
    pub parameter: String,
    pub threshold: f64,
    pub current_value: f64,
    #[serde(default)]
    pub triggered: Option<bool>,
    pub location_name: String,
    pub date_checked: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TriggerRecord> for ParametricTrigger {
    type Error = TriggerError;

    fn try_from(record: TriggerRecord) -> Result<Self, Self::Error> {
        check_finite("threshold", record.threshold)?;
        check_finite("current_value", record.current_value)?;
        Ok(Self {
            id: record.id,
            trigger_code: record.trigger_code,
            parameter: record.parameter,
            threshold: record.threshold,
            current_value: record.current_value,
            triggered: record.current_value >= record.threshold,
            location_name: record.location_name,
            date_checked: record.date_checked,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Creates a trigger from a write, deriving its state
pub fn evaluate_trigger(input: TriggerInput) -> Result<ParametricTrigger, TriggerError> {
    input.validate()?;
    let now = Utc::now();
    Ok(ParametricTrigger {
        id: TriggerId::new_v7(),
        trigger_code: input.trigger_code.trim().to_string(),
        parameter: input.parameter.trim().to_string(),
        threshold: input.threshold,
        current_value: input.current_value,
        triggered: input.current_value >= input.threshold,
        location_name: input.location_name.trim().to_string(),
        date_checked: input.date_checked.unwrap_or_else(|| now.date_naive()),
        created_at: now,
        updated_at: now,
    })
}

impl ParametricTrigger {
    /// Applies a full update; identity and creation time are kept
    pub fn apply(&mut self, input: TriggerInput) -> Result<(), TriggerError> {
        input.validate()?;
        let now = Utc::now();
        self.trigger_code = input.trigger_code.trim().to_string();
        self.parameter = input.parameter.trim().to_string();
        self.threshold = input.threshold;
        self.current_value = input.current_value;
        self.location_name = input.location_name.trim().to_string();
        self.date_checked = input.date_checked.unwrap_or_else(|| now.date_naive());
        self.updated_at = now;
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        self.triggered = self.current_value >= self.threshold;
    }

    pub fn id(&self) -> TriggerId {
        self.id
    }

    pub fn trigger_code(&self) -> &str {
        &self.trigger_code
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    pub fn triggered(&self) -> bool {
        self.triggered
    }

    pub fn location_name(&self) -> &str {
        &self.location_name
    }

    pub fn date_checked(&self) -> NaiveDate {
        self.date_checked
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
