use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::{debug, error};

use crate::{
    Roster,
    contact::{ContactError, ContactRequest},
    error::RosterError,
    model::{Profile, SearchPage, SearchParams},
};

pub type AppState = Arc<Roster>;

/// Error body: `{ "error": reason, "field": name? }`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest {
        reason: &'static str,
        field: Option<&'static str>,
    },
    NotFound,
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest { reason, field } => {
                let mut body = json!({ "error": reason });
                if let Some(field) = field {
                    body["field"] = json!(field);
                }
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            Self::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": "not_found" }))).into_response()
            }
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal_error" })),
            )
                .into_response(),
        }
    }
}

impl From<RosterError> for ApiError {
    fn from(e: RosterError) -> Self {
        error!(error = %e, "Request failed");
        Self::Internal
    }
}

/// Bodies that are not JSON, or not shaped like the expected request.
impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        debug!(error = %e, "Rejected request body");
        Self::BadRequest {
            reason: "invalid_body",
            field: None,
        }
    }
}

impl From<ContactError> for ApiError {
    fn from(e: ContactError) -> Self {
        match e.reason() {
            Some(reason) => Self::BadRequest {
                reason,
                field: e.field(),
            },
            None => RosterError::from(e).into(),
        }
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn search_profiles(
    State(roster): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchPage>, ApiError> {
    Ok(Json(roster.search_params(params).await?))
}

pub async fn get_profile(
    State(roster): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Profile>, ApiError> {
    roster.profile(id).await?.map(Json).ok_or(ApiError::NotFound)
}

pub async fn professions(State(roster): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(roster.professions().await?))
}

pub async fn states(State(roster): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(roster.states().await?))
}

pub async fn offices(State(roster): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(roster.offices().await?))
}

pub async fn contact(
    State(roster): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    roster.contact(&request).await?;
    Ok(Json(json!({ "success": true })))
}
