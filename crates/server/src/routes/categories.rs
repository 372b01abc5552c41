//! Category listing endpoint.

use axum::{Json, extract::State};

use crate::db::categories::CategoryRepository;
use crate::error::Result;
use crate::models::Category;
use crate::state::AppState;

/// List all categories.
///
/// GET /category (public)
///
/// # Errors
///
/// Returns `500` if the query fails.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list_all().await?;

    Ok(Json(categories))
}
