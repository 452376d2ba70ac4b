use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A persisted reservation. `car_name` and `car_image_url` are a snapshot of
/// the car's display data taken at booking time; they are never re-synced if
/// the fleet record changes later.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub user_id: Option<String>,
    pub car_id: i64,
    pub car_name: String,
    pub car_image_url: Option<String>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub whatsapp: Option<String>,
    pub pickup_location: String,
    pub checkin_date: NaiveDateTime,
    pub checkout_date: NaiveDateTime,
    pub total_price: String,
    pub currency: String,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub ip_address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Everything needed to insert a booking. The store assigns `id`,
/// `created_at` and `updated_at`; `status` always starts as `pending`.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub user_id: Option<String>,
    pub car_id: i64,
    pub car_name: String,
    pub car_image_url: Option<String>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub whatsapp: Option<String>,
    pub pickup_location: String,
    pub checkin_date: NaiveDateTime,
    pub checkout_date: NaiveDateTime,
    pub total_price: String,
    pub currency: String,
    pub notes: Option<String>,
    pub ip_address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Lenient parse for rows coming back from the store.
    pub fn parse(s: &str) -> Self {
        match s {
            "confirmed" => BookingStatus::Confirmed,
            "cancelled" => BookingStatus::Cancelled,
            "completed" => BookingStatus::Completed,
            _ => BookingStatus::Pending,
        }
    }

    /// Strict parse for client-supplied status values.
    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    /// Legal lifecycle moves. Pending bookings are either confirmed or
    /// cancelled; confirmed bookings finish as completed or cancelled.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::{Cancelled, Completed, Confirmed, Pending};
        matches!(
            (*self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
        )
    }
}

/// Who is asking for a reservation. Exactly one of the two keys applies:
/// authenticated requesters are tracked by user id, guests by contact email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequesterIdentity {
    User(String),
    Guest(String),
}

impl RequesterIdentity {
    /// An authenticated user id always wins over the contact email.
    pub fn resolve(user_id: Option<String>, email: &str) -> Self {
        match user_id {
            Some(id) if !id.is_empty() => RequesterIdentity::User(id),
            _ => RequesterIdentity::Guest(email.to_string()),
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, RequesterIdentity::Guest(_))
    }
}
