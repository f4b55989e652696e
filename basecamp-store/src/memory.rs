use async_trait::async_trait;
use basecamp_core::repository::*;
use basecamp_core::{
    Booking, BookingStatus, CartItem, Equipment, EquipmentFilter, Event, Payment, PaymentStatus, Tour,
    User,
};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local backend used by tests and the `memory` storage setting.
/// Orderings mirror the Postgres queries.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    tours: RwLock<HashMap<Uuid, Tour>>,
    events: RwLock<HashMap<Uuid, Event>>,
    bookings: RwLock<HashMap<Uuid, Booking>>,
    equipment: RwLock<HashMap<Uuid, Equipment>>,
    cart: RwLock<Vec<CartItem>>,
    payments: RwLock<HashMap<Uuid, Payment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: &User) -> RepoResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Duplicate("users_email_key".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn update_user(&self, user: &User) -> RepoResult<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl TourRepository for MemoryStore {
    async fn create_tour(&self, tour: &Tour) -> RepoResult<()> {
        self.tours.write().await.insert(tour.id, tour.clone());
        Ok(())
    }

    async fn get_tour(&self, id: Uuid) -> RepoResult<Option<Tour>> {
        Ok(self.tours.read().await.get(&id).cloned())
    }

    async fn list_tours(&self) -> RepoResult<Vec<Tour>> {
        let mut tours: Vec<Tour> = self.tours.read().await.values().cloned().collect();
        tours.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tours)
    }

    async fn update_tour(&self, tour: &Tour) -> RepoResult<bool> {
        let mut tours = self.tours.write().await;
        match tours.get_mut(&tour.id) {
            Some(existing) => {
                *existing = tour.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_tour(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.tours.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn create_event(&self, event: &Event) -> RepoResult<()> {
        self.events.write().await.insert(event.id, event.clone());
        Ok(())
    }

    async fn get_event(&self, id: Uuid) -> RepoResult<Option<Event>> {
        Ok(self.events.read().await.get(&id).cloned())
    }

    async fn list_events(&self) -> RepoResult<Vec<Event>> {
        let mut events: Vec<Event> = self.events.read().await.values().cloned().collect();
        events.sort_by_key(|e| e.starts_at);
        Ok(events)
    }

    async fn delete_event(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.events.write().await.remove(&id).is_some())
    }
}

impl MemoryStore {
    async fn bookings_matching<F>(&self, predicate: F) -> Vec<Booking>
    where
        F: Fn(&Booking) -> bool,
    {
        let bookings = self.bookings.read().await;
        let mut matching: Vec<Booking> = bookings.values().filter(|b| predicate(b)).cloned().collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn create_booking(&self, booking: &Booking) -> RepoResult<()> {
        self.bookings.write().await.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> RepoResult<Option<Booking>> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn list_bookings(&self) -> RepoResult<Vec<Booking>> {
        Ok(self.bookings_matching(|_| true).await)
    }

    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Booking>> {
        Ok(self.bookings_matching(|b| b.user_id == user_id).await)
    }

    async fn list_by_tour(&self, tour_id: Uuid) -> RepoResult<Vec<Booking>> {
        Ok(self.bookings_matching(|b| b.tour_id == tour_id).await)
    }

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> RepoResult<Option<Booking>> {
        let mut bookings = self.bookings.write().await;
        Ok(bookings.get_mut(&id).map(|booking| {
            booking.status = status;
            booking.updated_at = Utc::now();
            booking.clone()
        }))
    }

    async fn delete_booking(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.bookings.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl EquipmentRepository for MemoryStore {
    async fn create_equipment(&self, equipment: &Equipment) -> RepoResult<()> {
        self.equipment.write().await.insert(equipment.id, equipment.clone());
        Ok(())
    }

    async fn get_equipment(&self, id: Uuid) -> RepoResult<Option<Equipment>> {
        Ok(self.equipment.read().await.get(&id).cloned())
    }

    async fn list_equipment(&self, filter: &EquipmentFilter) -> RepoResult<Vec<Equipment>> {
        let equipment = self.equipment.read().await;
        let mut matching: Vec<Equipment> = equipment.values().filter(|e| filter.matches(e)).cloned().collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matching)
    }

    async fn update_equipment(&self, equipment: &Equipment) -> RepoResult<bool> {
        let mut all = self.equipment.write().await;
        match all.get_mut(&equipment.id) {
            Some(existing) => {
                *existing = equipment.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_equipment(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.equipment.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn list_items(&self, user_id: Uuid) -> RepoResult<Vec<CartItem>> {
        let cart = self.cart.read().await;
        Ok(cart.iter().filter(|i| i.user_id == user_id).cloned().collect())
    }

    async fn get_item(&self, id: Uuid) -> RepoResult<Option<CartItem>> {
        Ok(self.cart.read().await.iter().find(|i| i.id == id).cloned())
    }

    async fn insert_item(&self, item: &CartItem) -> RepoResult<()> {
        self.cart.write().await.push(item.clone());
        Ok(())
    }

    async fn update_quantity(&self, id: Uuid, quantity: i32) -> RepoResult<Option<CartItem>> {
        let mut cart = self.cart.write().await;
        Ok(cart.iter_mut().find(|i| i.id == id).map(|item| {
            item.quantity = quantity;
            item.clone()
        }))
    }

    async fn remove_item(&self, id: Uuid) -> RepoResult<bool> {
        let mut cart = self.cart.write().await;
        let before = cart.len();
        cart.retain(|i| i.id != id);
        Ok(cart.len() < before)
    }

    async fn clear(&self, user_id: Uuid) -> RepoResult<u64> {
        let mut cart = self.cart.write().await;
        let before = cart.len();
        cart.retain(|i| i.user_id != user_id);
        Ok((before - cart.len()) as u64)
    }
}

#[async_trait]
impl PaymentRepository for MemoryStore {
    async fn create_payment(&self, payment: &Payment) -> RepoResult<()> {
        self.payments.write().await.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn get_payment(&self, id: Uuid) -> RepoResult<Option<Payment>> {
        Ok(self.payments.read().await.get(&id).cloned())
    }

    async fn list_payments(&self) -> RepoResult<Vec<Payment>> {
        let mut payments: Vec<Payment> = self.payments.read().await.values().cloned().collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(payments)
    }

    async fn list_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .payments
            .read()
            .await
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(payments)
    }

    async fn update_review(&self, payment: &Payment) -> RepoResult<ReviewUpdate> {
        let mut payments = self.payments.write().await;
        let Some(existing) = payments.get_mut(&payment.id) else {
            return Ok(ReviewUpdate::NotFound);
        };
        if existing.status != PaymentStatus::Pending {
            return Ok(ReviewUpdate::AlreadyReviewed(existing.status));
        }

        existing.status = payment.status;
        existing.reviewed_at = payment.reviewed_at;
        Ok(ReviewUpdate::Applied)
    }

    async fn checkout_cart(&self, payment: &Payment, line_ids: &[Uuid]) -> RepoResult<bool> {
        // Cart before payments, the only place both are held.
        let mut cart = self.cart.write().await;
        let mut payments = self.payments.write().await;

        let owned = |item: &CartItem| item.user_id == payment.user_id && line_ids.contains(&item.id);
        if cart.iter().filter(|i| owned(*i)).count() != line_ids.len() {
            return Ok(false);
        }

        cart.retain(|i| !owned(i));
        payments.insert(payment.id, payment.clone());
        Ok(true)
    }
}
