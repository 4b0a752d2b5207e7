pub mod health;
pub mod owner;
pub mod reservation;
pub mod turf;
pub mod user;
