use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::ListingSummary;
use crate::routes::AppState;
use crate::services::categories::{self, Category};
use crate::services::listings;

pub async fn list() -> Json<&'static [Category]> {
    Json(categories::CATEGORIES)
}

#[derive(Debug, Serialize)]
pub struct CategoryListings {
    pub category: &'static Category,
    pub listings: Vec<ListingSummary>,
}

pub async fn listings(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<CategoryListings>> {
    let category = categories::find_by_slug(&slug)
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

    let conn = state.db.get()?;
    let listings = listings::find_by_vehicle_type(&conn, category.vehicle_type)?
        .into_iter()
        .map(ListingSummary::from)
        .collect();

    Ok(Json(CategoryListings { category, listings }))
}
