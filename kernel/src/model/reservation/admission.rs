//! Admission rule for new reservations.
//!
//! Storage adapters call [`admit`] while holding their per-slot
//! serialization boundary, passing the occupancy they read under it. The
//! rule itself is pure. Request preconditions are re-checked here so every
//! store enforces them, not only the HTTP layer.

use crate::model::{
    id::ReservationId,
    reservation::{event::CreateReservation, Reservation, ReservationStatus},
    turf::Turf,
};
use shared::{
    config::BookingConfig,
    error::{AppError, AppResult},
};

pub fn admit(
    turf: &Turf,
    occupancy: i32,
    event: CreateReservation,
    booking: &BookingConfig,
) -> AppResult<Reservation> {
    event.validate(booking)?;

    if event.turf_id != turf.turf_id {
        return Err(AppError::InvalidRequest(format!(
            "reservation targets turf ({}) but turf ({}) was loaded",
            event.turf_id, turf.turf_id
        )));
    }

    let requested_total = occupancy.checked_add(event.players);
    if requested_total.map_or(true, |total| total > turf.capacity) {
        return Err(AppError::CapacityExceeded {
            occupancy,
            requested: event.players,
            capacity: turf.capacity,
        });
    }

    let total_amount = i64::from(event.players)
        .checked_mul(turf.price_per_player)
        .filter(|amount| *amount >= 0)
        .ok_or_else(|| {
            AppError::UnprocessableEntity(format!(
                "total amount for {} players at {} overflows",
                event.players, turf.price_per_player
            ))
        })?;

    Ok(Reservation {
        reservation_id: ReservationId::new(),
        turf_id: turf.turf_id,
        owner_id: turf.owner_id.clone(),
        user_id: event.reserved_by,
        date: event.date,
        slot: event.slot,
        players: event.players,
        price_per_player: turf.price_per_player,
        total_amount,
        status: ReservationStatus::Confirmed,
        created_at: event.reserved_at,
        cancelled_by: None,
        cancelled_at: None,
    })
}
