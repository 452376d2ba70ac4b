use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Fleet car. Read-only as far as the booking flow is concerned; prices are
/// decimal strings to keep money out of floating point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub image_url: Option<String>,
    pub price_per_day: String,
    pub currency: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewCar {
    pub slug: String,
    pub name: String,
    pub image_url: Option<String>,
    pub price_per_day: String,
    pub currency: String,
}
