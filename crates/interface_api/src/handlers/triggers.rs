//! Parametric trigger handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use core_kernel::TriggerId;
use domain_parametric::{ParametricTrigger, TriggerInput, TriggerQuery};

use crate::dto::triggers::{ListTriggersParams, TriggerResponse};
use crate::{error::ApiError, AppState};

fn parse_id(raw: &str) -> Result<TriggerId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid trigger id: {raw}")))
}

fn responses(triggers: &[ParametricTrigger]) -> Json<Vec<TriggerResponse>> {
    Json(triggers.iter().map(TriggerResponse::from).collect())
}

/// Creates a trigger; the `triggered` flag in the body is ignored
pub async fn create_trigger(
    State(state): State<AppState>,
    Json(input): Json<TriggerInput>,
) -> Result<(StatusCode, Json<TriggerResponse>), ApiError> {
    let trigger = state.triggers.create(input).await?;
    Ok((StatusCode::CREATED, Json(TriggerResponse::from(&trigger))))
}

pub async fn list_triggers(
    State(state): State<AppState>,
    Query(params): Query<ListTriggersParams>,
) -> Result<Json<Vec<TriggerResponse>>, ApiError> {
    let triggers = state.triggers.find(&TriggerQuery::from(params)).await?;
    Ok(responses(&triggers))
}

pub async fn active_triggers(State(state): State<AppState>) -> Result<Json<Vec<TriggerResponse>>, ApiError> {
    let triggers = state.triggers.active().await?;
    Ok(responses(&triggers))
}

pub async fn get_trigger(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TriggerResponse>, ApiError> {
    let trigger = state.triggers.get(parse_id(&id)?).await?;
    Ok(Json(TriggerResponse::from(&trigger)))
}

/// Replaces a trigger's fields and re-evaluates it
pub async fn update_trigger(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<TriggerInput>,
) -> Result<Json<TriggerResponse>, ApiError> {
    let trigger = state.triggers.update(parse_id(&id)?, input).await?;
    Ok(Json(TriggerResponse::from(&trigger)))
}
