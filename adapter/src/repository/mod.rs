pub mod health;
pub mod reservation;
pub mod turf;
pub mod user;
