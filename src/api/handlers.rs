use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::model::{User, UserFields};
use crate::api::store::UserStore;

pub type ApiState = Arc<UserStore>;

pub async fn list_users(State(store): State<ApiState>) -> Json<Vec<User>> {
    Json(store.list().await)
}

pub async fn create_user(
    State(store): State<ApiState>,
    body: Bytes,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let fields = UserFields::from_json(&parse_body(&body)?)?;
    let user = store.create(fields).await;

    tracing::debug!(user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(store): State<ApiState>,
    Path(raw_id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&raw_id)?;
    store.get(id).await.map(Json).ok_or(ApiError::UserNotFound)
}

pub async fn update_user(
    State(store): State<ApiState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&raw_id)?;
    if !store.contains(id).await {
        return Err(ApiError::UserNotFound);
    }

    let fields = UserFields::from_json(&parse_body(&body)?)?;
    // A concurrent delete between the check and the write still yields 404.
    store
        .update(id, fields)
        .await
        .map(Json)
        .ok_or(ApiError::UserNotFound)
}

pub async fn delete_user(
    State(store): State<ApiState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&raw_id)?;
    if store.delete(id).await {
        tracing::debug!(user_id = %id, "User deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::UserNotFound)
    }
}

pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// Only the 36-character hyphenated form is an id.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    if raw.len() != 36 {
        return Err(ApiError::InvalidId);
    }
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId)
}

fn parse_body(body: &[u8]) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)
}
