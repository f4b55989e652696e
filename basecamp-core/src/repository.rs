use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::{Booking, BookingStatus};
use crate::cart::CartItem;
use crate::equipment::{Equipment, EquipmentFilter};
use crate::event::Event;
use crate::payment::{Payment, PaymentStatus};
use crate::tour::Tour;
use crate::user::User;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Duplicate record: {0}")]
    Duplicate(String),
    #[error("Storage backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Result of persisting a review decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewUpdate {
    Applied,
    NotFound,
    /// Someone else reviewed the payment first; carries the stored status.
    AlreadyReviewed(PaymentStatus),
}

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `RepositoryError::Duplicate` when the email is taken.
    async fn create_user(&self, user: &User) -> RepoResult<()>;

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    async fn list_users(&self) -> RepoResult<Vec<User>>;

    /// Returns false when no user has this id.
    async fn update_user(&self, user: &User) -> RepoResult<bool>;
}

/// Repository trait for the tour catalog
#[async_trait]
pub trait TourRepository: Send + Sync {
    async fn create_tour(&self, tour: &Tour) -> RepoResult<()>;

    async fn get_tour(&self, id: Uuid) -> RepoResult<Option<Tour>>;

    async fn list_tours(&self) -> RepoResult<Vec<Tour>>;

    async fn update_tour(&self, tour: &Tour) -> RepoResult<bool>;

    async fn delete_tour(&self, id: Uuid) -> RepoResult<bool>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create_event(&self, event: &Event) -> RepoResult<()>;

    async fn get_event(&self, id: Uuid) -> RepoResult<Option<Event>>;

    async fn list_events(&self) -> RepoResult<Vec<Event>>;

    async fn delete_event(&self, id: Uuid) -> RepoResult<bool>;
}

/// Repository trait for tour bookings
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(&self, booking: &Booking) -> RepoResult<()>;

    async fn get_booking(&self, id: Uuid) -> RepoResult<Option<Booking>>;

    async fn list_bookings(&self) -> RepoResult<Vec<Booking>>;

    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Booking>>;

    async fn list_by_tour(&self, tour_id: Uuid) -> RepoResult<Vec<Booking>>;

    /// Returns the updated booking, or None when the id is unknown.
    async fn update_status(&self, id: Uuid, status: BookingStatus) -> RepoResult<Option<Booking>>;

    async fn delete_booking(&self, id: Uuid) -> RepoResult<bool>;
}

/// Repository trait for camping equipment inventory
#[async_trait]
pub trait EquipmentRepository: Send + Sync {
    async fn create_equipment(&self, equipment: &Equipment) -> RepoResult<()>;

    async fn get_equipment(&self, id: Uuid) -> RepoResult<Option<Equipment>>;

    async fn list_equipment(&self, filter: &EquipmentFilter) -> RepoResult<Vec<Equipment>>;

    async fn update_equipment(&self, equipment: &Equipment) -> RepoResult<bool>;

    async fn delete_equipment(&self, id: Uuid) -> RepoResult<bool>;
}

#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Items of one user's cart, oldest first.
    async fn list_items(&self, user_id: Uuid) -> RepoResult<Vec<CartItem>>;

    async fn get_item(&self, id: Uuid) -> RepoResult<Option<CartItem>>;

    async fn insert_item(&self, item: &CartItem) -> RepoResult<()>;

    async fn update_quantity(&self, id: Uuid, quantity: i32) -> RepoResult<Option<CartItem>>;

    async fn remove_item(&self, id: Uuid) -> RepoResult<bool>;

    /// Returns the number of removed lines.
    async fn clear(&self, user_id: Uuid) -> RepoResult<u64>;
}

/// Repository trait for submitted payments
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create_payment(&self, payment: &Payment) -> RepoResult<()>;

    async fn get_payment(&self, id: Uuid) -> RepoResult<Option<Payment>>;

    /// Newest first.
    async fn list_payments(&self) -> RepoResult<Vec<Payment>>;

    /// Newest first.
    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Payment>>;

    /// Persists status and review timestamp, but only while the stored
    /// payment is still `PENDING`.
    async fn update_review(&self, payment: &Payment) -> RepoResult<ReviewUpdate>;

    /// Records a cart payment and removes exactly the paid cart lines in one
    /// step. Returns false, recording nothing, when any of those lines is
    /// already gone.
    async fn checkout_cart(&self, payment: &Payment, line_ids: &[Uuid]) -> RepoResult<bool>;
}
