//! Damage analysis handler

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use domain_assessment::{DisasterType, ImagePair, LocationContext};

use crate::dto::analysis::{AnalysisResponse, DamageAnalysisResponse, ANALYSIS_COMPLETED};
use crate::dto::claims::ClaimResponse;
use crate::{error::ApiError, AppState};

/// Fields of the multipart upload
#[derive(Debug, Default)]
struct DamageUpload {
    pre_image: Option<Bytes>,
    post_image: Option<Bytes>,
    location_name: Option<String>,
    disaster_type: Option<String>,
    vegetation_dryness: Option<f64>,
    sea_level_rise_m: Option<f64>,
    historical_events: Option<u32>,
}

impl DamageUpload {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut upload = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match name.as_str() {
                "pre_image" => upload.pre_image = Some(field.bytes().await?),
                "post_image" => upload.post_image = Some(field.bytes().await?),
                "location_name" => upload.location_name = Some(field.text().await?),
                "disaster_type" => upload.disaster_type = Some(field.text().await?),
                "vegetation_dryness" => upload.vegetation_dryness = parse_number(&name, &field.text().await?)?,
                "sea_level_rise_m" => upload.sea_level_rise_m = parse_number(&name, &field.text().await?)?,
                "historical_events" => upload.historical_events = parse_number(&name, &field.text().await?)?,
                _ => {}
            }
        }
        Ok(upload)
    }

    fn into_pair(self) -> Result<ImagePair, ApiError> {
        let pre = self.pre_image.ok_or_else(|| ApiError::validation("pre_image is required"))?;
        let post = self.post_image.ok_or_else(|| ApiError::validation("post_image is required"))?;
        let location = self
            .location_name
            .ok_or_else(|| ApiError::validation("location_name is required"))?;
        let disaster = self
            .disaster_type
            .ok_or_else(|| ApiError::validation("disaster_type is required"))?;
        let context = LocationContext::from_readings(
            self.vegetation_dryness,
            self.sea_level_rise_m,
            self.historical_events,
        )?;

        Ok(ImagePair::new(
            pre.to_vec(),
            post.to_vec(),
            location,
            DisasterType::parse(&disaster),
            context,
        )?)
    }
}

/// Blank optional fields count as absent
fn parse_number<T: std::str::FromStr>(field: &str, raw: &str) -> Result<Option<T>, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| ApiError::validation(format!("{field} must be a number, got '{raw}'")))
}

/// Assesses an uploaded image pair and files a claim from the result
pub async fn analyze_damage(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<DamageAnalysisResponse>), ApiError> {
    let pair = DamageUpload::read(multipart).await?.into_pair()?;
    let (claim, assessment) = state.claims.assess_damage(&pair).await?;

    info!(
        claim_number = %claim.claim_number,
        status = %claim.status,
        damage_score = claim.damage_score,
        "damage analysis filed"
    );

    Ok((
        StatusCode::CREATED,
        Json(DamageAnalysisResponse {
            claim: ClaimResponse::from(&claim),
            analysis: AnalysisResponse::from(&assessment),
            message: ANALYSIS_COMPLETED.to_string(),
        }),
    ))
}
