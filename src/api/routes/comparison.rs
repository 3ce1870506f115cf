use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{LevelReport, MatchCriteria, MultiLevelReport, PeerRecord};
use crate::parse_test_numbers;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerGroupParams {
    pub player_id: String,
    pub test_number: Option<u32>,
    pub category: Option<String>,
    pub gender: Option<String>,
    pub age_min: Option<u32>,
    pub age_max: Option<u32>,
    pub handicap_min: Option<f64>,
    pub handicap_max: Option<f64>,
    pub limit: Option<u32>,
}

impl PeerGroupParams {
    fn criteria(&self) -> MatchCriteria {
        MatchCriteria {
            category: self.category.clone(),
            gender: self.gender.clone(),
            age_min: self.age_min,
            age_max: self.age_max,
            handicap_min: self.handicap_min,
            handicap_max: self.handicap_max,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerGroupResponse {
    /// The effective criteria after profile fallbacks
    pub criteria: MatchCriteria,
    pub cohort_size: u32,
    pub peers: Vec<PeerRecord>,
}

pub async fn peer_group(
    State(state): State<AppState>,
    Query(params): Query<PeerGroupParams>,
) -> Result<Json<PeerGroupResponse>, ApiError> {
    let (criteria, peers) = state
        .engine
        .peer_group(
            &params.player_id,
            &params.criteria(),
            params.test_number,
            params.limit,
        )
        .await?;

    Ok(Json(PeerGroupResponse {
        criteria,
        cohort_size: peers.len() as u32,
        peers,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleLevelParams {
    pub player_id: String,
    pub test_number: u32,
    pub category: Option<String>,
    pub gender: Option<String>,
    pub age_min: Option<u32>,
    pub age_max: Option<u32>,
    pub handicap_min: Option<f64>,
    pub handicap_max: Option<f64>,
}

impl SingleLevelParams {
    fn criteria(&self) -> MatchCriteria {
        MatchCriteria {
            category: self.category.clone(),
            gender: self.gender.clone(),
            age_min: self.age_min,
            age_max: self.age_max,
            handicap_min: self.handicap_min,
            handicap_max: self.handicap_max,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleLevelResponse {
    pub player_id: String,
    pub criteria: MatchCriteria,
    #[serde(flatten)]
    pub report: LevelReport,
}

pub async fn single_level(
    State(state): State<AppState>,
    Query(params): Query<SingleLevelParams>,
) -> Result<Json<SingleLevelResponse>, ApiError> {
    let (criteria, report) = state
        .engine
        .compare_single(&params.player_id, params.test_number, &params.criteria())
        .await?;

    Ok(Json(SingleLevelResponse {
        player_id: params.player_id,
        criteria,
        report,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiLevelParams {
    pub player_id: String,

    /// Comma-separated test numbers, e.g. "1,2,3"
    pub test_numbers: String,

    pub category: Option<String>,
    pub gender: Option<String>,
    pub age_min: Option<u32>,
    pub age_max: Option<u32>,
    pub handicap_min: Option<f64>,
    pub handicap_max: Option<f64>,
}

impl MultiLevelParams {
    fn criteria(&self) -> MatchCriteria {
        MatchCriteria {
            category: self.category.clone(),
            gender: self.gender.clone(),
            age_min: self.age_min,
            age_max: self.age_max,
            handicap_min: self.handicap_min,
            handicap_max: self.handicap_max,
        }
    }
}

pub async fn multi_level(
    State(state): State<AppState>,
    Query(params): Query<MultiLevelParams>,
) -> Result<Json<MultiLevelReport>, ApiError> {
    let test_numbers = parse_test_numbers(&params.test_numbers).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "testNumbers must be a comma-separated list of numbers, got {:?}",
            params.test_numbers
        ))
    })?;

    let report = state
        .engine
        .compare_across_levels(&params.player_id, &test_numbers, &params.criteria())
        .await?;

    Ok(Json(report))
}
