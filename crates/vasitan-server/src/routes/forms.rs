//! Form bodies and their conversion into typed commands.
//!
//! Every field defaults to empty so a missing field surfaces as the
//! categorical `missing` code instead of an extractor rejection.

use chrono::Datelike;
use serde::Deserialize;

use crate::error::ErrorCode;
use crate::models::{FuelType, GearType, ListingStatus, ListingType, VehicleType};
use crate::services::images;
use crate::services::listings::ListingInput;
use crate::services::users::{LoginCommand, RegisterCommand};

const MIN_YEAR: i32 = 1900;

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn required(value: &str) -> Result<String, ErrorCode> {
    non_empty(value.to_string()).ok_or(ErrorCode::Missing)
}

fn non_negative(value: &str) -> Result<i64, ErrorCode> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|n| *n >= 0)
        .ok_or(ErrorCode::Missing)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub name: String,
    pub phone: String,
}

impl RegisterForm {
    pub fn into_command(self) -> RegisterCommand {
        RegisterCommand {
            email: self.email.trim().to_string(),
            password: self.password.trim().to_string(),
            password_confirm: self.password_confirm.trim().to_string(),
            name: non_empty(self.name),
            phone: non_empty(self.phone),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn into_command(self) -> LoginCommand {
        LoginCommand {
            email: self.email.trim().to_string(),
            password: self.password.trim().to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListingForm {
    pub title: String,
    pub description: String,
    pub listing_type: String,
    pub price: String,
    pub vehicle_type: String,
    pub brand: String,
    pub model: String,
    pub year: String,
    pub fuel_type: String,
    pub gear_type: String,
    pub km: String,
    pub color: String,
    pub city: String,
    pub district: String,
    pub is_damaged: String,
    pub uploaded_images: Vec<String>,
    pub cover_image: String,
}

impl ListingForm {
    /// Validates the submission. Missing or malformed fields yield
    /// `missing`; unacceptable image data yields `invalid`.
    pub fn into_input(self, max_image_bytes: usize) -> Result<ListingInput, ErrorCode> {
        let listing_type = self
            .listing_type
            .trim()
            .parse::<ListingType>()
            .unwrap_or_default();
        let vehicle_type = self.vehicle_type.trim().parse::<VehicleType>().map_err(|_| ErrorCode::Missing)?;
        let fuel_type = self.fuel_type.trim().parse::<FuelType>().map_err(|_| ErrorCode::Missing)?;
        let gear_type = self.gear_type.trim().parse::<GearType>().map_err(|_| ErrorCode::Missing)?;

        let max_year = chrono::Utc::now().year() + 1;
        let year = self
            .year
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|y| (MIN_YEAR..=max_year).contains(y))
            .ok_or(ErrorCode::Missing)?;

        let input = ListingInput {
            title: required(&self.title)?,
            description: required(&self.description)?,
            listing_type,
            price: non_negative(&self.price)?,
            vehicle_type,
            brand: required(&self.brand)?,
            model: required(&self.model)?,
            year,
            fuel_type,
            gear_type,
            km: non_negative(&self.km)?,
            color: non_empty(self.color),
            city: required(&self.city)?,
            district: non_empty(self.district),
            images: images::normalize(
                &self.uploaded_images,
                Some(self.cover_image.as_str()),
                max_image_bytes,
            )?,
            is_damaged: self.is_damaged == "on",
        };

        if input.images.is_empty() {
            return Err(ErrorCode::Missing);
        }
        Ok(input)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusForm {
    pub status: String,
}

impl StatusForm {
    pub fn parse(&self) -> Result<ListingStatus, ErrorCode> {
        self.status.trim().parse().map_err(|_| ErrorCode::Invalid)
    }
}
