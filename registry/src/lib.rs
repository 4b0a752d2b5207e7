use std::sync::Arc;

use adapter::database::ConnectionPool;
use adapter::memory::InMemoryStore;
use adapter::repository::{
    health::HealthCheckRepositoryImpl, reservation::ReservationRepositoryImpl,
    turf::TurfRepositoryImpl, user::UserRepositoryImpl,
};
use kernel::model::availability::BandPolicy;
use kernel::repository::{
    health::HealthCheckRepository, reservation::ReservationRepository, turf::TurfRepository,
    user::UserRepository,
};
use shared::config::BookingConfig;

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    turf_repository: Arc<dyn TurfRepository>,
    reservation_repository: Arc<dyn ReservationRepository>,
    user_repository: Arc<dyn UserRepository>,
    booking_config: Arc<BookingConfig>,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool, booking_config: BookingConfig) -> Self {
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let turf_repository = Arc::new(TurfRepositoryImpl::new(pool.clone()));
        let reservation_repository = Arc::new(ReservationRepositoryImpl::new(
            pool.clone(),
            booking_config.clone(),
        ));
        let user_repository = Arc::new(UserRepositoryImpl::new(pool.clone()));
        Self {
            health_check_repository,
            turf_repository,
            reservation_repository,
            user_repository,
            booking_config: Arc::new(booking_config),
        }
    }

    // すべてのリポジトリを 1 つのインメモリストアで賄う
    pub fn in_memory(booking_config: BookingConfig) -> Self {
        let store = Arc::new(InMemoryStore::with_booking_config(booking_config.clone()));
        Self {
            health_check_repository: store.clone(),
            turf_repository: store.clone(),
            reservation_repository: store.clone(),
            user_repository: store,
            booking_config: Arc::new(booking_config),
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn turf_repository(&self) -> Arc<dyn TurfRepository> {
        self.turf_repository.clone()
    }

    pub fn reservation_repository(&self) -> Arc<dyn ReservationRepository> {
        self.reservation_repository.clone()
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.user_repository.clone()
    }

    pub fn booking_config(&self) -> &BookingConfig {
        &self.booking_config
    }

    pub fn band_policy(&self) -> BandPolicy {
        BandPolicy::from(self.booking_config())
    }
}
