use serde::Serialize;

use crate::models::VehicleType;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub vehicle_type: VehicleType,
    pub slug: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

pub const CATEGORIES: &[Category] = &[
    Category {
        vehicle_type: VehicleType::Automobile,
        slug: "otomobil",
        label: "Otomobil",
        description: "Şehir içi ve uzun yol için sedan, hatchback ve coupe modeller.",
    },
    Category {
        vehicle_type: VehicleType::Suv,
        slug: "suv",
        label: "SUV",
        description: "Yüksek sürüş konforu ve aile ihtiyaçlarına uygun SUV modelleri.",
    },
    Category {
        vehicle_type: VehicleType::Motorcycle,
        slug: "motosiklet",
        label: "Motosiklet",
        description: "Şehirde hız ve özgürlük sunan motosiklet seçenekleri.",
    },
    Category {
        vehicle_type: VehicleType::Commercial,
        slug: "ticari",
        label: "Ticari",
        description: "İşinizi büyütecek panelvan, minibüs ve ticari araçlar.",
    },
    Category {
        vehicle_type: VehicleType::Truck,
        slug: "pickup-kamyon",
        label: "Kamyon / Pickup",
        description: "Güçlü taşıma kapasitesi sunan pickup ve kamyon modelleri.",
    },
    Category {
        vehicle_type: VehicleType::Bus,
        slug: "otobus",
        label: "Otobüs",
        description: "Yolcu taşımacılığı için hazır minibüs ve otobüs seçenekleri.",
    },
    Category {
        vehicle_type: VehicleType::Other,
        slug: "diger",
        label: "Diğer",
        description: "Klasik, off-road veya özel amaçlı tüm diğer araçlar.",
    },
];

pub fn find_by_slug(slug: &str) -> Option<&'static Category> {
    CATEGORIES
        .iter()
        .find(|category| category.slug.eq_ignore_ascii_case(slug.trim()))
}
