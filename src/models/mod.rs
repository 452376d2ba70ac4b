pub mod admin;
pub mod booking;
pub mod car;

pub use admin::AdminRole;
pub use booking::{Booking, BookingDraft, BookingStatus, RequesterIdentity};
pub use car::{Car, NewCar};
