//! In-memory implementation of every repository trait.
//!
//! Used for local runs (`STORE_BACKEND=memory`) and tests. All writes take
//! the store's write guard, so the occupancy check and the insert of
//! [`ReservationRepository::reserve`] happen without interleaving.

use async_trait::async_trait;
use chrono::NaiveDate;
use kernel::model::{
    aggregation::YearMonth,
    id::{ReservationId, TurfId, UserId},
    occupancy::{occupancy_of, SlotKey, SlotOccupancy},
    reservation::{
        admission::admit,
        event::{CancelReservation, CreateReservation},
        Reservation, ReservationTurf, ReservationWithBooker, ReservationWithTurf,
    },
    turf::{
        event::{CreateTurf, DeleteTurf, UpdateTurf},
        Turf, TurfListFilter,
    },
    user::{event::RegisterUser, User},
};
use kernel::repository::{
    health::HealthCheckRepository, reservation::ReservationRepository, turf::TurfRepository,
    user::UserRepository,
};
use shared::{
    config::BookingConfig,
    error::{AppError, AppResult},
};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct StoreState {
    users: HashMap<UserId, User>,
    turfs: HashMap<TurfId, Turf>,
    reservations: HashMap<ReservationId, Reservation>,
}

impl StoreState {
    // ターフが存在する予約だけをターフ情報付きで返す
    fn with_turf(&self, reservation: &Reservation) -> Option<ReservationWithTurf> {
        self.turfs
            .get(&reservation.turf_id)
            .map(|turf| ReservationWithTurf {
                reservation: reservation.clone(),
                turf: ReservationTurf {
                    turf_id: turf.turf_id,
                    name: turf.name.clone(),
                    city: turf.city.clone(),
                    cover_image: turf.cover_image.clone(),
                },
            })
    }

    fn peak_occupancy(&self, turf_id: TurfId) -> i32 {
        let mut per_slot: HashMap<SlotKey, i32> = HashMap::new();
        for r in self
            .reservations
            .values()
            .filter(|r| r.turf_id == turf_id && r.is_confirmed())
        {
            *per_slot.entry(r.slot_key()).or_insert(0) += r.players;
        }
        per_slot.into_values().max().unwrap_or(0)
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
    booking: BookingConfig,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_booking_config(booking: BookingConfig) -> Self {
        Self {
            state: RwLock::default(),
            booking,
        }
    }
}

#[async_trait]
impl HealthCheckRepository for InMemoryStore {
    async fn check_db(&self) -> bool {
        true
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn register(&self, event: RegisterUser) -> AppResult<User> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .entry(event.user_id.clone())
            .and_modify(|user| user.name = event.name.clone())
            .or_insert_with(|| User {
                user_id: event.user_id,
                name: event.name,
                role: event.role,
            });
        Ok(user.clone())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }
}

#[async_trait]
impl TurfRepository for InMemoryStore {
    async fn create(&self, event: CreateTurf) -> AppResult<TurfId> {
        let turf = Turf {
            turf_id: TurfId::new(),
            owner_id: event.owner_id,
            name: event.name,
            city: event.city,
            price_per_player: event.price_per_player,
            capacity: event.capacity,
            sports: event.sports,
            description: event.description,
            cover_image: event.cover_image,
            gallery_images: event.gallery_images,
            map_link: event.map_link,
            created_at: chrono::Utc::now(),
        };
        let turf_id = turf.turf_id;
        self.state.write().await.turfs.insert(turf_id, turf);
        Ok(turf_id)
    }

    async fn find_all(&self, filter: TurfListFilter) -> AppResult<Vec<Turf>> {
        let state = self.state.read().await;
        let mut turfs: Vec<Turf> = state
            .turfs
            .values()
            .filter(|turf| filter.matches(turf))
            .cloned()
            .collect();
        turfs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(turfs)
    }

    async fn find_by_id(&self, turf_id: TurfId) -> AppResult<Option<Turf>> {
        Ok(self.state.read().await.turfs.get(&turf_id).cloned())
    }

    async fn find_by_owner(&self, owner_id: UserId) -> AppResult<Vec<Turf>> {
        let state = self.state.read().await;
        let mut turfs: Vec<Turf> = state
            .turfs
            .values()
            .filter(|turf| turf.is_owned_by(&owner_id))
            .cloned()
            .collect();
        turfs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(turfs)
    }

    async fn update(&self, event: UpdateTurf) -> AppResult<Turf> {
        let mut state = self.state.write().await;
        let mut turf = state
            .turfs
            .get(&event.turf_id)
            .cloned()
            .ok_or_else(|| AppError::EntityNotFound(format!("turf ({}) not found", event.turf_id)))?;
        let peak = state.peak_occupancy(turf.turf_id);

        // 検証に失敗したら元のターフは変更しない
        event.apply_to(&mut turf, peak)?;
        state.turfs.insert(turf.turf_id, turf.clone());
        Ok(turf)
    }

    async fn delete(&self, event: DeleteTurf) -> AppResult<()> {
        let mut state = self.state.write().await;
        let turf = state
            .turfs
            .get(&event.turf_id)
            .ok_or_else(|| AppError::EntityNotFound(format!("turf ({}) not found", event.turf_id)))?;
        if !turf.is_owned_by(&event.requested_user) {
            return Err(AppError::ForbiddenOperation);
        }
        state.turfs.remove(&event.turf_id);
        Ok(())
    }
}

#[async_trait]
impl ReservationRepository for InMemoryStore {
    async fn reserve(&self, event: CreateReservation) -> AppResult<Reservation> {
        let key = event.slot_key();
        // 判定から登録までを書き込みロックの中で行う
        let mut state = self.state.write().await;

        let turf = state
            .turfs
            .get(&event.turf_id)
            .ok_or_else(|| AppError::EntityNotFound(format!("turf ({}) not found", event.turf_id)))?;
        let occupancy = occupancy_of(state.reservations.values(), &key);
        let reservation = match admit(turf, occupancy, event, &self.booking) {
            Ok(reservation) => reservation,
            Err(e) => {
                tracing::info!(
                    turf_id = %key.turf_id,
                    date = %key.date,
                    slot = %key.slot,
                    occupancy,
                    capacity = turf.capacity,
                    "reservation rejected: {e}"
                );
                return Err(e);
            }
        };

        state
            .reservations
            .insert(reservation.reservation_id, reservation.clone());

        tracing::info!(
            reservation_id = %reservation.reservation_id,
            turf_id = %key.turf_id,
            date = %key.date,
            slot = %key.slot,
            players = reservation.players,
            occupancy = occupancy + reservation.players,
            "reservation confirmed"
        );

        Ok(reservation)
    }

    async fn cancel(&self, event: CancelReservation) -> AppResult<Reservation> {
        let mut state = self.state.write().await;
        let reservation = state
            .reservations
            .get_mut(&event.reservation_id)
            .ok_or_else(|| {
                AppError::EntityNotFound(format!(
                    "reservation ({}) not found",
                    event.reservation_id
                ))
            })?;
        reservation.cancel(&event.requested_user, event.cancelled_at)?;

        tracing::info!(
            reservation_id = %reservation.reservation_id,
            turf_id = %reservation.turf_id,
            date = %reservation.date,
            slot = %reservation.slot,
            players = reservation.players,
            "reservation cancelled"
        );

        Ok(reservation.clone())
    }

    async fn occupancy(&self, key: SlotKey) -> AppResult<i32> {
        Ok(occupancy_of(self.state.read().await.reservations.values(), &key))
    }

    async fn occupancy_by_date(&self, turf_id: TurfId, date: NaiveDate) -> AppResult<SlotOccupancy> {
        let state = self.state.read().await;
        Ok(SlotOccupancy::from_reservations(
            state
                .reservations
                .values()
                .filter(|r| r.turf_id == turf_id && r.date == date),
        ))
    }

    async fn find_by_id(&self, reservation_id: ReservationId) -> AppResult<Option<ReservationWithTurf>> {
        let state = self.state.read().await;
        Ok(state
            .reservations
            .get(&reservation_id)
            .and_then(|r| state.with_turf(r)))
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<ReservationWithTurf>> {
        let state = self.state.read().await;
        let mut reservations: Vec<ReservationWithTurf> = state
            .reservations
            .values()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| state.with_turf(r))
            .collect();
        reservations.sort_by(|a, b| b.reservation.created_at.cmp(&a.reservation.created_at));
        Ok(reservations)
    }

    async fn find_by_turfs_in_month(
        &self,
        turf_ids: Vec<TurfId>,
        month: YearMonth,
    ) -> AppResult<Vec<ReservationWithBooker>> {
        let state = self.state.read().await;
        let mut reservations: Vec<ReservationWithBooker> = state
            .reservations
            .values()
            .filter(|r| turf_ids.contains(&r.turf_id) && month.contains(r.date) && r.is_confirmed())
            .map(|r| ReservationWithBooker {
                reservation: r.clone(),
                booker_name: state.users.get(&r.user_id).map(|u| u.name.clone()),
            })
            .collect();
        reservations.sort_by(|a, b| {
            let (a, b) = (&a.reservation, &b.reservation);
            (a.date, a.slot, a.created_at).cmp(&(b.date, b.slot, b.created_at))
        });
        Ok(reservations)
    }
}
