//! Claims handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use core_kernel::ClaimId;
use domain_claims::{Claim, ClaimQuery, DirectClaimRequest};

use crate::dto::claims::*;
use crate::{error::ApiError, AppState};

/// Resolves a path segment given as either a claim id or a claim number
async fn find_claim(state: &AppState, id: &str) -> Result<Claim, ApiError> {
    match id.parse::<ClaimId>() {
        Ok(id) => Ok(state.claims.get_claim(id).await?),
        Err(_) => Ok(state.claims.repository().get_by_number(id).await?),
    }
}

fn responses(claims: &[Claim]) -> Json<Vec<ClaimResponse>> {
    Json(claims.iter().map(ClaimResponse::from).collect())
}

/// Lists claims, newest filing first
pub async fn list_claims(
    State(state): State<AppState>,
    Query(params): Query<ListClaimsParams>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    let query = ClaimQuery::try_from(params)?;
    let claims = state.claims.find_claims(&query).await?;
    Ok(responses(&claims))
}

/// Files a claim with a known damage score
pub async fn create_claim(
    State(state): State<AppState>,
    Json(request): Json<CreateClaimRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    request.validate()?;
    let request = DirectClaimRequest::try_from(request)?;
    let claim = state.claims.file_claim(request).await?;
    Ok((StatusCode::CREATED, Json(ClaimResponse::from(&claim))))
}

pub async fn claims_summary(State(state): State<AppState>) -> Result<Json<SummaryResponse>, ApiError> {
    let summary = state.claims.summary().await?;
    Ok(Json(summary.into()))
}

pub async fn approved_claims(State(state): State<AppState>) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    let claims = state.claims.find_claims(&ClaimQuery::approved()).await?;
    Ok(responses(&claims))
}

/// Pending and under-review claims
pub async fn pending_claims(State(state): State<AppState>) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    let claims = state.claims.find_claims(&ClaimQuery::pending()).await?;
    Ok(responses(&claims))
}

pub async fn get_claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = find_claim(&state, &id).await?;
    Ok(Json(ClaimResponse::from(&claim)))
}

pub async fn approve_claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = find_claim(&state, &id).await?;
    let claim = state.claims.approve(claim.id).await?;
    Ok(Json(ClaimResponse::from(&claim)))
}

pub async fn reject_claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = find_claim(&state, &id).await?;
    let claim = state.claims.reject(claim.id).await?;
    Ok(Json(ClaimResponse::from(&claim)))
}
