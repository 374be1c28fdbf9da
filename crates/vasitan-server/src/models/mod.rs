mod vehicle;

use std::ops::Deref;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

pub use vehicle::{FuelType, GearType, ListingStatus, ListingType, UnknownVariant, VehicleType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub const COLUMNS: &'static str =
        "id, email, password_hash, name, phone, created_at, updated_at";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            name: row.get(3)?,
            phone: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub created_at: String,
}

impl From<User> for UserPublic {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            phone: u.phone,
            created_at: u.created_at,
        }
    }
}

/// Ordered image references; index 0 is the cover. Stored as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Images(pub Vec<String>);

impl Images {
    pub fn cover(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }
}

impl Deref for Images {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ToSql for Images {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let json = serde_json::to_string(&self.0)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        Ok(ToSqlOutput::from(json))
    }
}

impl FromSql for Images {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        serde_json::from_str(value.as_str()?)
            .map(Images)
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: i64,
    pub code: String,
    pub owner_id: i64,
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
    pub status: ListingStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Listing {
    pub const COLUMNS: &'static str = "id, code, owner_id, title, description, listing_type, price, \
         vehicle_type, brand, model, year, fuel_type, gear_type, km, color, city, district, \
         images, is_damaged, status, created_at, updated_at";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            code: row.get(1)?,
            owner_id: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            listing_type: row.get(5)?,
            price: row.get(6)?,
            vehicle_type: row.get(7)?,
            brand: row.get(8)?,
            model: row.get(9)?,
            year: row.get(10)?,
            fuel_type: row.get(11)?,
            gear_type: row.get(12)?,
            km: row.get(13)?,
            color: row.get(14)?,
            city: row.get(15)?,
            district: row.get(16)?,
            images: row.get(17)?,
            is_damaged: row.get(18)?,
            status: row.get(19)?,
            created_at: row.get(20)?,
            updated_at: row.get(21)?,
        })
    }
}

/// Card-sized view used by search and category pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    pub id: i64,
    pub code: String,
    pub title: String,
    pub listing_type: ListingType,
    pub vehicle_type: VehicleType,
    pub price: i64,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub km: i64,
    pub city: String,
    pub district: Option<String>,
    pub cover_image: Option<String>,
    pub status: ListingStatus,
    pub created_at: String,
}

impl From<Listing> for ListingSummary {
    fn from(l: Listing) -> Self {
        Self {
            cover_image: l.images.cover().map(str::to_string),
            id: l.id,
            code: l.code,
            title: l.title,
            listing_type: l.listing_type,
            vehicle_type: l.vehicle_type,
            price: l.price,
            brand: l.brand,
            model: l.model,
            year: l.year,
            km: l.km,
            city: l.city,
            district: l.district,
            status: l.status,
            created_at: l.created_at,
        }
    }
}

pub fn timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}
