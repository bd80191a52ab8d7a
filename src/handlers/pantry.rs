//! Pantry item handlers. Both sit behind the authorization gate.

use crate::app_state::AppState;
use crate::auth_gate::CurrentUser;
use crate::domain::NewItem;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared_types::ApiResponse;

// ============================================================================
// Request/Response Types
// ============================================================================

/// One pantry row with lookup labels resolved for display.
#[derive(Debug, Serialize)]
pub struct PantryItemView {
    // ---
    #[serde(rename = "type")]
    pub item_type: String,
    pub condition: String,
    pub location: String,
    pub category: String,
    /// Days until expiration; negative once expired.
    pub days: i64,
    pub comments: String,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    // ---
    #[serde(rename = "type")]
    pub item_type: String,
    pub category: i32,
    pub condition: i32,
    pub location: i32,
    #[serde(default)]
    pub comments: String,
    /// Defaults to now when the form omits it.
    #[serde(default)]
    pub purchased: Option<DateTime<Utc>>,
    /// Defaults to now when the form omits it.
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    // ---
    pub error: String,
}

// ============================================================================
// Pantry Handlers
// ============================================================================

/// GET /pantry
///
/// Lists the session user's items with category / condition / location ids
/// resolved against the cached lookup tables. Ids that fall outside the
/// current tables render as "unknown" rather than failing the whole page.
pub async fn list_items(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<ApiResponse<Vec<PantryItemView>>, StatusCode> {
    // ---
    let items = state
        .repository()
        .get_items_by_user(user.user_id)
        .await
        .map_err(|e| {
            //
            tracing::error!("Failed to load items for user {}: {:?}", user.username, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let tables = state.lookup_tables().await;
    let now = Utc::now();

    let views = items
        .into_iter()
        .map(|item| PantryItemView {
            //
            item_type: item.product_name,
            condition: label_or_unknown(tables.condition_label(item.storage_condition)),
            location: label_or_unknown(tables.location_label(item.storage_location)),
            category: label_or_unknown(tables.category_label(item.category)),
            days: (item.expiration - now).num_days(),
            comments: item.description,
        })
        .collect();

    Ok(ApiResponse { data: views })
}

/// POST /pantry/add
///
/// Inserts an item for the session user and sends the client back to the
/// pantry listing. Lookup ids are validated against the cached tables.
pub async fn add_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(req): Form<AddItemRequest>,
) -> Result<Redirect, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let tables = state.lookup_tables().await;

    if tables.category_label(req.category).is_none() {
        return Err(bad_lookup_id("category", req.category));
    }
    if tables.condition_label(req.condition).is_none() {
        return Err(bad_lookup_id("condition", req.condition));
    }
    if tables.location_label(req.location).is_none() {
        return Err(bad_lookup_id("location", req.location));
    }

    let now = Utc::now();
    let item = NewItem {
        user_id: user.user_id,
        product_name: req.item_type,
        description: req.comments,
        category: req.category,
        storage_condition: req.condition,
        storage_location: req.location,
        date_purchased: req.purchased.unwrap_or(now),
        expiration: req.expiration.unwrap_or(now),
    };

    state.repository().add_item(item).await.map_err(|e| {
        //
        tracing::error!("Failed to insert item for user {}: {:?}", user.username, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }),
        )
    })?;

    state.metrics().record_item_added();

    Ok(Redirect::to("/pantry"))
}

fn label_or_unknown(label: Option<&str>) -> String {
    // ---
    label.unwrap_or("unknown").to_string()
}

fn bad_lookup_id(field: &str, id: i32) -> (StatusCode, Json<ErrorResponse>) {
    // ---
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: format!("Error: unknown {field} id {id}"),
        }),
    )
}
