use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use axum_extra::extract::Form;
use serde::{Deserialize, Serialize};

use crate::auth::middleware::AuthUserId;
use crate::error::{redirect_with_error, AppError, AppResult};
use crate::models::{Listing, ListingSummary};
use crate::routes::forms::{ListingForm, StatusForm};
use crate::routes::{paths, AppState};
use crate::services::{codes, listings, users};

// ── Form actions ────────────────────────────────────────────────────

pub async fn create(
    State(state): State<AppState>,
    Extension(AuthUserId(owner_id)): Extension<AuthUserId>,
    Form(form): Form<ListingForm>,
) -> AppResult<Response> {
    let input = match form.into_input(state.config.max_image_bytes) {
        Ok(input) => input,
        Err(code) => return Ok(redirect_with_error(paths::NEW_LISTING, code).into_response()),
    };

    let conn = state.db.get()?;
    match listings::create(&conn, owner_id, input) {
        Ok(listing) => Ok(Redirect::to(&paths::listing(listing.id)).into_response()),
        Err(e) => e.redirect_to(paths::NEW_LISTING),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Extension(AuthUserId(requester_id)): Extension<AuthUserId>,
    Path(id): Path<i64>,
    Form(form): Form<ListingForm>,
) -> AppResult<Response> {
    let input = match form.into_input(state.config.max_image_bytes) {
        Ok(input) => input,
        Err(code) => return Ok(redirect_with_error(&paths::edit_listing(id), code).into_response()),
    };

    let conn = state.db.get()?;
    match listings::update(&conn, requester_id, id, input) {
        Ok(listing) => Ok(Redirect::to(&paths::edit_listing(listing.id)).into_response()),
        Err(e) => e.redirect_to(paths::DASHBOARD),
    }
}

pub async fn set_status(
    State(state): State<AppState>,
    Extension(AuthUserId(requester_id)): Extension<AuthUserId>,
    Path(id): Path<i64>,
    Form(form): Form<StatusForm>,
) -> AppResult<Response> {
    let status = match form.parse() {
        Ok(status) => status,
        Err(code) => return Ok(redirect_with_error(paths::DASHBOARD, code).into_response()),
    };

    let conn = state.db.get()?;
    match listings::set_status(&conn, requester_id, id, status) {
        Ok(()) => Ok(Redirect::to(paths::DASHBOARD).into_response()),
        Err(e) => e.redirect_to(paths::DASHBOARD),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(AuthUserId(requester_id)): Extension<AuthUserId>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    match listings::delete(&conn, requester_id, id) {
        Ok(()) => Ok(Redirect::to(paths::DASHBOARD).into_response()),
        Err(e) => e.redirect_to(paths::DASHBOARD),
    }
}

// ── Reads ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentListings {
    pub total_listings: i64,
    /// Distinct owners among `listings`.
    pub seller_count: usize,
    pub listings: Vec<ListingSummary>,
}

pub async fn recent(State(state): State<AppState>) -> AppResult<Json<RecentListings>> {
    let conn = state.db.get()?;
    let recent = listings::recent(&conn, listings::RECENT_LIMIT)?;
    let total_listings = listings::count(&conn)?;

    let seller_count = recent.iter().map(|l| l.owner_id).collect::<HashSet<_>>().len();
    Ok(Json(RecentListings {
        total_listings,
        seller_count,
        listings: recent.into_iter().map(ListingSummary::from).collect(),
    }))
}

#[derive(Debug, Serialize)]
pub struct MyListings {
    pub stats: listings::OwnerStats,
    pub listings: Vec<Listing>,
}

pub async fn mine(
    State(state): State<AppState>,
    Extension(AuthUserId(owner_id)): Extension<AuthUserId>,
) -> AppResult<Json<MyListings>> {
    let conn = state.db.get()?;
    let listings = listings::find_for_owner(&conn, owner_id)?;
    Ok(Json(MyListings {
        stats: listings::OwnerStats::from_listings(&listings),
        listings,
    }))
}

#[derive(Debug, Serialize)]
pub struct Seller {
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: Listing,
    pub seller: Option<Seller>,
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ListingDetail>> {
    let conn = state.db.get()?;
    let listing = listings::find_by_id(&conn, id)?
        .ok_or_else(|| AppError::NotFound("Listing not found".into()))?;
    let seller = users::find_by_id(&conn, listing.owner_id)?.map(|u| Seller {
        name: u.name,
        phone: u.phone,
    });
    Ok(Json(ListingDetail { listing, seller }))
}

pub async fn by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<Listing>> {
    let code = codes::extract(&code)
        .ok_or_else(|| AppError::BadRequest("Listing codes are 10 digits".into()))?;
    let conn = state.db.get()?;
    let listing = listings::find_by_code(&conn, &code)?
        .ok_or_else(|| AppError::NotFound("Listing not found".into()))?;
    Ok(Json(listing))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    /// Set when the query is a listing code; callers jump straight to it.
    pub exact_match: Option<i64>,
    pub listings: Vec<ListingSummary>,
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<SearchResponse>> {
    let query = params.q.trim().to_string();
    if query.is_empty() {
        return Err(AppError::BadRequest("Search query is required".into()));
    }

    let conn = state.db.get()?;
    let exact_match = match codes::extract(&query) {
        Some(code) => listings::find_by_code(&conn, &code)?.map(|l| l.id),
        None => None,
    };
    let listings = listings::search(&conn, &query)?
        .into_iter()
        .map(ListingSummary::from)
        .collect();

    Ok(Json(SearchResponse {
        query,
        exact_match,
        listings,
    }))
}
