//! Unauthenticated JSON endpoints plus the authenticated lookup reload.
//!
//! Required query parameters are expressed as non-optional extractor
//! fields; a missing parameter is rejected before the handler runs.

use crate::app_state::AppState;
use crate::auth_gate::CurrentUser;
use crate::domain::LookupTables;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use super::shared_types::ApiResponse;

// ---

/// Most suggestions returned for one prefix.
const SUGGESTION_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    // ---
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct PrefixQuery {
    // ---
    pub prefix: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/username_exists?name=
///
/// Availability check used by the registration form before submitting.
pub async fn username_exists(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<ApiResponse<bool>, StatusCode> {
    // ---
    let exists = state
        .repository()
        .username_exists(&query.name)
        .await
        .map_err(|e| {
            //
            tracing::error!("Failed to check username availability: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(ApiResponse { data: exists })
}

/// GET /api/suggestions?prefix=
///
/// Product-name autosuggest, capped at [`SUGGESTION_LIMIT`] labels.
pub async fn suggestions(
    State(state): State<AppState>,
    Query(query): Query<PrefixQuery>,
) -> Result<ApiResponse<Vec<String>>, StatusCode> {
    // ---
    let labels = state
        .repository()
        .suggest_products(&query.prefix, SUGGESTION_LIMIT)
        .await
        .map_err(|e| {
            //
            tracing::error!("Failed to load suggestions: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(ApiResponse { data: labels })
}

/// GET /api/lookups
///
/// Current category / condition / location labels for form rendering.
pub async fn lookup_tables(State(state): State<AppState>) -> ApiResponse<LookupTables> {
    // ---
    ApiResponse {
        data: state.lookup_tables().await,
    }
}

/// POST /admin/lookups/reload
///
/// Re-reads the lookup tables from the store into the shared cache. This is
/// the only refresh path after startup.
pub async fn reload_lookup_tables(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<ApiResponse<LookupTables>, StatusCode> {
    // ---
    let tables = state.reload_lookup_tables().await.map_err(|e| {
        //
        tracing::error!("Lookup table reload failed: {:?}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    tracing::info!("Lookup tables reloaded by {}", user.username);

    Ok(ApiResponse { data: tables })
}
