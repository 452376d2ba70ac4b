pub mod authz;
pub mod overlap;
pub mod reservation;
