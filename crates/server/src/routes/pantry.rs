//! Pantry item routes.
//!
//! ```text
//! GET    /pantry?userId=      - List a user's items, newest first
//! POST   /pantry              - Add an item
//! DELETE /pantry?id=          - Delete one item
//! DELETE /pantry/clear        - Delete items (all users, or ?userId= for one)
//! ```

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};

use pantry_core::PantryItem;

use crate::error::AppError;
use crate::middleware::require_admin;
use crate::services::CreateItemInput;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub id: Option<String>,
}

/// Body of `POST /pantry`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemBody {
    pub name: Option<String>,
    pub date_added: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub message: String,
    pub deleted_count: u64,
}

/// List the caller's pantry items.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<PantryItem>>, AppError> {
    let items = state.pantry().list(query.user_id.as_deref()).await?;
    Ok(Json(items))
}

/// Add one item to the caller's pantry.
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateItemBody>, JsonRejection>,
) -> Result<(StatusCode, Json<PantryItem>), AppError> {
    let Json(body) = payload?;
    let item = state
        .pantry()
        .create(CreateItemInput {
            user_id: body.user_id,
            name: body.name,
            date_added: body.date_added,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Delete one item by id.
pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    state.pantry().delete(query.id.as_deref()).await?;
    Ok(Json(MessageResponse {
        message: "Item deleted successfully".to_string(),
    }))
}

/// Clear one user's pantry, or every pantry with the admin token.
pub async fn clear(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    headers: HeaderMap,
) -> Result<Json<ClearResponse>, AppError> {
    let deleted_count = match query.user_id.as_deref() {
        Some(user_id) => state.pantry().clear_for_user(Some(user_id)).await?,
        None => {
            require_admin(&headers, state.admin_token())?;
            state.pantry().clear_all().await?
        }
    };

    Ok(Json(ClearResponse {
        message: format!("Successfully deleted {deleted_count} items from pantry"),
        deleted_count,
    }))
}
