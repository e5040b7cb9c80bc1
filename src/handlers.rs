use crate::errors::AppError;
use crate::metrics::build_metrics;
use crate::models::{AppData, MutationOutcome, NewEntry, SaveFailure, SaveResponse, SettingsPatch};
use crate::state::AppState;
use crate::ui::{render_admin, render_dashboard};
use crate::validation::{validate_new_entry, validate_settings_patch};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};

const NO_STORE: &str = "no-store, no-cache, must-revalidate, max-age=0";

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let data = state.client.load().await;
    Html(render_dashboard(&build_metrics(&data)))
}

pub async fn admin() -> Html<String> {
    Html(render_admin())
}

/// Always 200: a store failure reads as the default document.
pub async fn get_data(State(state): State<AppState>) -> impl IntoResponse {
    let data = state.client.load().await;
    ([(header::CACHE_CONTROL, NO_STORE)], Json(data))
}

/// Any failure, including an unreadable body, answers 500 with `{ error, details }`.
pub async fn put_data(
    State(state): State<AppState>,
    payload: Result<Json<AppData>, JsonRejection>,
) -> Response {
    let data = match payload {
        Ok(Json(data)) => data,
        Err(rejection) => return save_failure(rejection.body_text()),
    };

    match state.client.try_save(&data).await {
        Ok(()) => Json(SaveResponse { success: true }).into_response(),
        Err(err) => save_failure(err.to_string()),
    }
}

fn save_failure(details: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(SaveFailure {
            error: "Failed to save data".to_string(),
            details,
        }),
    )
        .into_response()
}

pub async fn get_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let data = state.client.load().await;
    ([(header::CACHE_CONTROL, NO_STORE)], Json(build_metrics(&data)))
}

pub async fn add_entry(
    State(state): State<AppState>,
    Json(payload): Json<NewEntry>,
) -> Result<Json<MutationOutcome>, AppError> {
    let entry = validate_new_entry(payload)?;
    Ok(Json(state.client.add_entry(entry).await))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MutationOutcome>, AppError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::bad_request("entry id must not be empty"));
    }

    Ok(Json(state.client.delete_entry(id).await))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Json(payload): Json<SettingsPatch>,
) -> Result<Json<MutationOutcome>, AppError> {
    let patch = validate_settings_patch(payload)?;
    Ok(Json(state.client.update_settings(patch).await))
}
