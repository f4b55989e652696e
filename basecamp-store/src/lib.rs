pub mod app_config;
pub mod database;
pub mod memory;
pub mod redis_repo;

pub mod booking_repo;
pub mod cart_repo;
pub mod equipment_repo;
pub mod event_repo;
pub mod payment_repo;
pub mod tour_repo;
pub mod user_repo;

use basecamp_core::repository::{
    BookingRepository, CartRepository, EquipmentRepository, EventRepository, PaymentRepository,
    TourRepository, UserRepository,
};
use sqlx::PgPool;
use std::sync::Arc;

pub use app_config::{Config, StorageBackend};
pub use database::DbClient;
pub use memory::MemoryStore;
pub use redis_repo::{RateLimiter, RedisClient};

/// One handle per repository seam, shared by every request.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub tours: Arc<dyn TourRepository>,
    pub events: Arc<dyn EventRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub equipment: Arc<dyn EquipmentRepository>,
    pub cart: Arc<dyn CartRepository>,
    pub payments: Arc<dyn PaymentRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(user_repo::StoreUserRepository::new(pool.clone())),
            tours: Arc::new(tour_repo::StoreTourRepository::new(pool.clone())),
            events: Arc::new(event_repo::StoreEventRepository::new(pool.clone())),
            bookings: Arc::new(booking_repo::StoreBookingRepository::new(pool.clone())),
            equipment: Arc::new(equipment_repo::StoreEquipmentRepository::new(pool.clone())),
            cart: Arc::new(cart_repo::StoreCartRepository::new(pool.clone())),
            payments: Arc::new(payment_repo::StorePaymentRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self::memory(Arc::new(MemoryStore::new()))
    }

    /// Every seam backed by the same store, so cross-table operations such
    /// as cart checkout see one consistent state.
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            tours: store.clone(),
            events: store.clone(),
            bookings: store.clone(),
            equipment: store.clone(),
            cart: store.clone(),
            payments: store,
        }
    }
}
