//! Wire binding: one axum handler per operation in `spec.md` §6, each a
//! thin `RawParams -> TypedParams -> Service::method -> Json` pipeline. No
//! business logic lives here — see `params` for parsing/validation and
//! `marker-core::engine` for the actual operations.

pub mod params;

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use marker_core::Service;
use marker_model::{MediaItemId, SectionId};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use params::{
    AddParams, EditParams, PurgeTarget, QueryParams, RawAddParams, RawEditParams, RawPurgeTarget,
    RawQueryParams, RawShiftParams, ShiftParams,
};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Service>,
}

pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route("/query", get(query))
        .route("/add", post(add))
        .route("/edit/:marker_id", put(edit))
        .route("/delete/:marker_id", post(delete))
        .route("/shift/:root_id", post(shift))
        .route("/check_shift/:root_id", get(check_shift))
        .route("/sections", get(get_sections))
        .route("/sections/:section_id", get(get_section))
        .route("/seasons/:show_id", get(get_seasons))
        .route("/episodes/:season_id", get(get_episodes))
        .route("/stats/:section_id", get(get_stats))
        .route("/purge_check/:root_id", get(purge_check))
        .route("/purges/:section_id", get(all_purges))
        .route("/restore", post(restore))
        .route("/ignore_purge", post(ignore_purge))
        .route("/suspend", post(suspend))
        .route("/resume", post(resume))
        .with_state(AppState { service })
}

async fn query(State(state): State<AppState>, Query(raw): Query<RawQueryParams>) -> Result<Json<Value>, ApiError> {
    let params = QueryParams::try_from(raw).map_err(ApiError::from)?;
    let markers = state.service.markers_for_parents(&params.parent_ids).await.map_err(ApiError::from)?;
    Ok(Json(json!(markers)))
}

async fn add(State(state): State<AppState>, Json(raw): Json<RawAddParams>) -> Result<Json<Value>, ApiError> {
    let params = AddParams::try_from(raw).map_err(ApiError::from)?;
    let marker = state
        .service
        .add(params.parent_id, params.start, params.end, params.marker_type, params.is_final, true)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(json!(marker)))
}

async fn edit(
    State(state): State<AppState>,
    Path(marker_id): Path<i64>,
    Json(raw): Json<RawEditParams>,
) -> Result<Json<Value>, ApiError> {
    let params = EditParams::try_from_raw(marker_id, raw).map_err(ApiError::from)?;
    let marker = state
        .service
        .edit(params.marker_id, params.start, params.end, params.marker_type, params.is_final, params.created_by_user)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(json!(marker)))
}

async fn delete(State(state): State<AppState>, Path(marker_id): Path<i64>) -> Result<Json<Value>, ApiError> {
    let marker = state.service.delete(marker_id.into()).await.map_err(ApiError::from)?;
    Ok(Json(json!(marker)))
}

async fn shift(
    State(state): State<AppState>,
    Path(root_id): Path<i64>,
    Json(raw): Json<RawShiftParams>,
) -> Result<Json<Value>, ApiError> {
    let params = ShiftParams::try_from_raw(root_id, raw).map_err(ApiError::from)?;
    let result = state
        .service
        .shift(params.root_id, params.d_start, params.d_end, params.force, &params.ignore_ids)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(json!(result)))
}

async fn check_shift(State(state): State<AppState>, Path(root_id): Path<i64>) -> Result<Json<Value>, ApiError> {
    let result = state.service.check_shift(MediaItemId(root_id)).await.map_err(ApiError::from)?;
    Ok(Json(json!(result)))
}

async fn get_sections(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let sections = state.service.libraries().await.map_err(ApiError::from)?;
    Ok(Json(json!(sections)))
}

async fn get_section(State(state): State<AppState>, Path(section_id): Path<i64>) -> Result<Json<Value>, ApiError> {
    let items = state.service.items(SectionId(section_id)).await.map_err(ApiError::from)?;
    Ok(Json(json!(items)))
}

async fn get_seasons(State(state): State<AppState>, Path(show_id): Path<i64>) -> Result<Json<Value>, ApiError> {
    let seasons = state.service.seasons(MediaItemId(show_id)).await.map_err(ApiError::from)?;
    Ok(Json(json!(seasons)))
}

async fn get_episodes(State(state): State<AppState>, Path(season_id): Path<i64>) -> Result<Json<Value>, ApiError> {
    let episodes = state.service.episodes(MediaItemId(season_id)).await.map_err(ApiError::from)?;
    Ok(Json(json!(episodes)))
}

async fn get_stats(State(state): State<AppState>, Path(section_id): Path<i64>) -> Result<Json<Value>, ApiError> {
    let stats = state.service.section_stats(SectionId(section_id)).await.map_err(ApiError::from)?;
    Ok(Json(json!(stats)))
}

async fn purge_check(State(state): State<AppState>, Path(root_id): Path<i64>) -> Result<Json<Value>, ApiError> {
    let candidates = state.service.purge_check(MediaItemId(root_id)).await.map_err(ApiError::from)?;
    Ok(Json(json!(candidates)))
}

async fn all_purges(State(state): State<AppState>, Path(section_id): Path<i64>) -> Result<Json<Value>, ApiError> {
    let candidates = state.service.purges_for_section(SectionId(section_id)).await.map_err(ApiError::from)?;
    Ok(Json(json!(candidates)))
}

async fn restore(State(state): State<AppState>, Json(raw): Json<RawPurgeTarget>) -> Result<Json<Value>, ApiError> {
    let target = PurgeTarget::from(raw);
    let marker = state.service.restore(target.marker_id, target.section_id).await.map_err(ApiError::from)?;
    Ok(Json(json!(marker)))
}

async fn ignore_purge(State(state): State<AppState>, Json(raw): Json<RawPurgeTarget>) -> Result<Json<Value>, ApiError> {
    let target = PurgeTarget::from(raw);
    state.service.ignore_purge(target.marker_id, target.section_id).await.map_err(ApiError::from)?;
    Ok(Json(json!({ "ok": true })))
}

#[derive(Debug, Deserialize)]
struct ResumeBody {
    #[serde(default)]
    section_ids: Vec<i64>,
}

async fn suspend(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.service.suspend().await.map_err(ApiError::from)?;
    Ok(Json(json!({ "ok": true })))
}

async fn resume(State(state): State<AppState>, Json(body): Json<ResumeBody>) -> Result<Json<Value>, ApiError> {
    let sections: Vec<SectionId> = body.section_ids.into_iter().map(SectionId).collect();
    state.service.resume(&sections).await.map_err(ApiError::from)?;
    Ok(Json(json!({ "ok": true })))
}
