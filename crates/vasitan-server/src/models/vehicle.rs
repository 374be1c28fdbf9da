//! Fixed vocabularies stored as upper-case text columns.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

text_enum!(
    /// Sale or rental terms of a listing.
    ListingType {
        ForSale => "FOR_SALE",
        ForRent => "FOR_RENT",
        DailyRent => "DAILY_RENT",
    }
);

text_enum!(
    VehicleType {
        Automobile => "AUTOMOBILE",
        Motorcycle => "MOTORCYCLE",
        Suv => "SUV",
        Commercial => "COMMERCIAL",
        Truck => "TRUCK",
        Bus => "BUS",
        Other => "OTHER",
    }
);

text_enum!(
    FuelType {
        Gasoline => "GASOLINE",
        Diesel => "DIESEL",
        Lpg => "LPG",
        Hybrid => "HYBRID",
        Electric => "ELECTRIC",
        Other => "OTHER",
    }
);

text_enum!(
    GearType {
        Manual => "MANUAL",
        Automatic => "AUTOMATIC",
        SemiAutomatic => "SEMI_AUTOMATIC",
    }
);

text_enum!(
    /// Publication state. Owners move listings between these freely.
    ListingStatus {
        Active => "ACTIVE",
        Passive => "PASSIVE",
        Sold => "SOLD",
    }
);

impl Default for ListingType {
    fn default() -> Self {
        ListingType::ForSale
    }
}

impl Default for ListingStatus {
    fn default() -> Self {
        ListingStatus::Active
    }
}
