pub mod admin;
pub mod bookings;
pub mod cars;
pub mod health;
