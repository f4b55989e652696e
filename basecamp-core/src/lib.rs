pub mod user;
pub mod tour;
pub mod event;
pub mod booking;
pub mod equipment;
pub mod cart;
pub mod payment;
pub mod password;
pub mod repository;

pub use booking::{Booking, BookingStatus};
pub use cart::{CartItem, RentalPeriod};
pub use equipment::{Equipment, EquipmentDraft, EquipmentFilter};
pub use event::{Event, EventInput};
pub use payment::{Payment, PaymentKind, PaymentLine, PaymentStatus};
pub use tour::{Tour, TourInput};
pub use user::{Role, User, UserUpdate};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Collects field problems so a form can report all of them at once.
#[derive(Debug, Default)]
pub(crate) struct Problems(Vec<String>);

impl Problems {
    pub(crate) fn check(&mut self, ok: bool, message: &str) {
        if !ok {
            self.0.push(message.to_string());
        }
    }

    pub(crate) fn finish(self) -> CoreResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(CoreError::ValidationError(self.0.join("; ")))
        }
    }
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
