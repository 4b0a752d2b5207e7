pub mod aggregation;
pub mod availability;
pub mod id;
pub mod occupancy;
pub mod reservation;
pub mod role;
pub mod slot;
pub mod turf;
pub mod user;
