use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;

use crate::db;
use crate::error::{AppError, ActionResult, AppResult, ErrorCode};
use crate::models::{
    timestamp, FuelType, GearType, Images, Listing, ListingStatus, ListingType, VehicleType,
};
use crate::services::codes;

const CODE_ATTEMPTS: usize = 5;
pub const SEARCH_LIMIT: i64 = 30;
pub const CATEGORY_LIMIT: i64 = 24;
pub const RECENT_LIMIT: i64 = 15;

/// Validated listing fields, shared by create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingInput {
    pub title: String,
    pub description: String,
    pub listing_type: ListingType,
    pub price: i64,
    pub vehicle_type: VehicleType,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub fuel_type: FuelType,
    pub gear_type: GearType,
    pub km: i64,
    pub color: Option<String>,
    pub city: String,
    pub district: Option<String>,
    pub images: Images,
    pub is_damaged: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OwnerStats {
    pub total: usize,
    pub active: usize,
    pub passive: usize,
    pub sold: usize,
}

impl OwnerStats {
    pub fn from_listings(listings: &[Listing]) -> Self {
        listings.iter().fold(Self::default(), |mut stats, listing| {
            stats.total += 1;
            match listing.status {
                ListingStatus::Active => stats.active += 1,
                ListingStatus::Passive => stats.passive += 1,
                ListingStatus::Sold => stats.sold += 1,
            }
            stats
        })
    }
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(err, _)
        if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
}

fn is_foreign_key_violation(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(err, _)
        if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}

/// Inserts a new ACTIVE listing owned by `owner_id` under a fresh code.
pub fn create(conn: &Connection, owner_id: i64, input: ListingInput) -> ActionResult<Listing> {
    let now = timestamp();

    for attempt in 1..=CODE_ATTEMPTS {
        let code = codes::generate();
        let result = conn.execute(
            "INSERT INTO listings (code, owner_id, title, description, listing_type, price, vehicle_type, brand, model, year, fuel_type, gear_type, km, color, city, district, images, is_damaged, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?20)",
            rusqlite::params![
                code,
                owner_id,
                input.title,
                input.description,
                input.listing_type,
                input.price,
                input.vehicle_type,
                input.brand,
                input.model,
                input.year,
                input.fuel_type,
                input.gear_type,
                input.km,
                input.color,
                input.city,
                input.district,
                input.images,
                input.is_damaged,
                ListingStatus::Active,
                now,
            ],
        );

        match result {
            Ok(_) => {
                let id = conn.last_insert_rowid();
                tracing::info!(listing_id = id, owner_id, %code, "Listing created");
                return Ok(Listing {
                    id,
                    code,
                    owner_id,
                    title: input.title,
                    description: input.description,
                    listing_type: input.listing_type,
                    price: input.price,
                    vehicle_type: input.vehicle_type,
                    brand: input.brand,
                    model: input.model,
                    year: input.year,
                    fuel_type: input.fuel_type,
                    gear_type: input.gear_type,
                    km: input.km,
                    color: input.color,
                    city: input.city,
                    district: input.district,
                    images: input.images,
                    is_damaged: input.is_damaged,
                    status: ListingStatus::Active,
                    created_at: now.clone(),
                    updated_at: now,
                });
            }
            Err(e) if is_unique_violation(&e) => {
                tracing::warn!(attempt, "Listing code collision, retrying");
            }
            // Session outlived its user.
            Err(e) if is_foreign_key_violation(&e) => {
                tracing::warn!(owner_id, "Listing owner does not exist");
                return Err(ErrorCode::Unauthorized.into());
            }
            Err(e) => return Err(AppError::Database(e).into()),
        }
    }

    tracing::error!(owner_id, "Could not allocate a unique listing code");
    Err(ErrorCode::Exists.into())
}

/// Overwrites a listing owned by `requester_id`.
///
/// A listing that does not exist and one owned by someone else are rejected
/// the same way. Concurrent updates are last-write-wins.
pub fn update(
    conn: &Connection,
    requester_id: i64,
    listing_id: i64,
    input: ListingInput,
) -> ActionResult<Listing> {
    let now = timestamp();
    let affected = conn.execute(
        "UPDATE listings SET title = ?1, description = ?2, listing_type = ?3, price = ?4, vehicle_type = ?5, brand = ?6, model = ?7, year = ?8, fuel_type = ?9, gear_type = ?10, km = ?11, color = ?12, city = ?13, district = ?14, images = ?15, is_damaged = ?16, updated_at = ?17
         WHERE id = ?18 AND owner_id = ?19",
        rusqlite::params![
            input.title,
            input.description,
            input.listing_type,
            input.price,
            input.vehicle_type,
            input.brand,
            input.model,
            input.year,
            input.fuel_type,
            input.gear_type,
            input.km,
            input.color,
            input.city,
            input.district,
            input.images,
            input.is_damaged,
            now,
            listing_id,
            requester_id,
        ],
    )?;

    if affected == 0 {
        tracing::warn!(listing_id, requester_id, "Listing update rejected");
        return Err(ErrorCode::Unauthorized.into());
    }

    tracing::info!(listing_id, "Listing updated");
    Ok(find_by_id(conn, listing_id)?
        .ok_or_else(|| AppError::NotFound("Listing not found".into()))?)
}

pub fn set_status(
    conn: &Connection,
    requester_id: i64,
    listing_id: i64,
    status: ListingStatus,
) -> ActionResult<()> {
    let affected = conn.execute(
        "UPDATE listings SET status = ?1, updated_at = ?2 WHERE id = ?3 AND owner_id = ?4",
        rusqlite::params![status, timestamp(), listing_id, requester_id],
    )?;

    if affected == 0 {
        tracing::warn!(listing_id, requester_id, "Listing status change rejected");
        return Err(ErrorCode::Unauthorized.into());
    }

    tracing::info!(listing_id, %status, "Listing status changed");
    Ok(())
}

pub fn delete(conn: &Connection, requester_id: i64, listing_id: i64) -> ActionResult<()> {
    let affected = conn.execute(
        "DELETE FROM listings WHERE id = ?1 AND owner_id = ?2",
        rusqlite::params![listing_id, requester_id],
    )?;

    if affected == 0 {
        tracing::warn!(listing_id, requester_id, "Listing delete rejected");
        return Err(ErrorCode::Unauthorized.into());
    }

    tracing::info!(listing_id, "Listing deleted");
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Option<Listing>> {
    let sql = format!("SELECT {} FROM listings WHERE id = ?1", Listing::COLUMNS);
    Ok(conn
        .query_row(&sql, rusqlite::params![id], Listing::from_row)
        .optional()?)
}

pub fn find_by_code(conn: &Connection, code: &str) -> AppResult<Option<Listing>> {
    let sql = format!("SELECT {} FROM listings WHERE code = ?1", Listing::COLUMNS);
    Ok(conn
        .query_row(&sql, rusqlite::params![code], Listing::from_row)
        .optional()?)
}

/// Listings owned by `owner_id`, newest first.
pub fn find_for_owner(conn: &Connection, owner_id: i64) -> AppResult<Vec<Listing>> {
    let sql = format!(
        "SELECT {} FROM listings WHERE owner_id = ?1 ORDER BY created_at DESC, id DESC",
        Listing::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params![owner_id], Listing::from_row)?;
    let listings: Result<Vec<_>, _> = rows.collect();
    Ok(listings?)
}

pub fn find_by_vehicle_type(conn: &Connection, vehicle_type: VehicleType) -> AppResult<Vec<Listing>> {
    let sql = format!(
        "SELECT {} FROM listings WHERE vehicle_type = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2",
        Listing::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params![vehicle_type, CATEGORY_LIMIT], Listing::from_row)?;
    let listings: Result<Vec<_>, _> = rows.collect();
    Ok(listings?)
}

/// Newest listings across all owners, for the home feed.
pub fn recent(conn: &Connection, limit: i64) -> AppResult<Vec<Listing>> {
    let sql = format!(
        "SELECT {} FROM listings ORDER BY created_at DESC, id DESC LIMIT ?1",
        Listing::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params![limit], Listing::from_row)?;
    let listings: Result<Vec<_>, _> = rows.collect();
    Ok(listings?)
}

pub fn count(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0))?)
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Substring match over the text fields, or an exact code match. Both sides
/// go through `fold_case`, so Turkish capitals match their lowercase forms.
pub fn search(conn: &Connection, query: &str) -> AppResult<Vec<Listing>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let pattern = format!("%{}%", escape_like(&db::fold_case(query)));
    let code = codes::extract(query);
    let sql = format!(
        "SELECT {} FROM listings
         WHERE fold_case(title) LIKE ?1 ESCAPE '\\'
            OR fold_case(description) LIKE ?1 ESCAPE '\\'
            OR fold_case(brand) LIKE ?1 ESCAPE '\\'
            OR fold_case(model) LIKE ?1 ESCAPE '\\'
            OR fold_case(city) LIKE ?1 ESCAPE '\\'
            OR code = ?2
         ORDER BY created_at DESC, id DESC
         LIMIT ?3",
        Listing::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params![pattern, code, SEARCH_LIMIT], Listing::from_row)?;
    let listings: Result<Vec<_>, _> = rows.collect();
    Ok(listings?)
}
