use basecamp_catalog::{quote_cart, quote_line, PricingError};
use basecamp_core::{CartItem, Event, Payment, PaymentKind, PaymentLine, Tour};
use uuid::Uuid;

use crate::validation::VerifiedCard;

/// Turns a cart, an event ticket order or a tour order into a pending
/// payment. Amounts are always computed server side.
pub struct Checkout;

impl Checkout {
    pub fn for_cart(user_id: Uuid, items: &[CartItem], card: VerifiedCard) -> Result<Payment, CheckoutError> {
        let quote = quote_cart(items)?;
        if quote.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let lines = quote
            .lines
            .into_iter()
            .map(|line| PaymentLine {
                description: line.name,
                unit_price_cents: line.quote.unit_price_cents,
                quantity: line.quote.quantity,
                days: line.quote.days,
                total_cents: line.quote.total_cents,
            })
            .collect();

        Ok(Payment::new(user_id, PaymentKind::Cart, None, lines, card.card_holder, card.last4))
    }

    pub fn for_event(user_id: Uuid, event: &Event, tickets: i32, card: VerifiedCard) -> Result<Payment, CheckoutError> {
        if let Some(capacity) = event.capacity {
            if tickets > capacity {
                return Err(CheckoutError::CapacityExceeded { requested: tickets, capacity });
            }
        }

        let quote = quote_line(event.price_cents, tickets, None)?;
        let line = PaymentLine {
            description: format!("{} ticket", event.title),
            unit_price_cents: quote.unit_price_cents,
            quantity: quote.quantity,
            days: None,
            total_cents: quote.total_cents,
        };

        Ok(Payment::new(user_id, PaymentKind::Event, Some(event.id), vec![line], card.card_holder, card.last4))
    }

    pub fn for_tour(user_id: Uuid, tour: &Tour, participants: i32, card: VerifiedCard) -> Result<Payment, CheckoutError> {
        if let Some(capacity) = tour.max_group_size {
            if participants > capacity {
                return Err(CheckoutError::CapacityExceeded { requested: participants, capacity });
            }
        }

        let quote = quote_line(tour.price_cents, participants, None)?;
        let line = PaymentLine {
            description: tour.title.clone(),
            unit_price_cents: quote.unit_price_cents,
            quantity: quote.quantity,
            days: None,
            total_cents: quote.total_cents,
        };

        Ok(Payment::new(user_id, PaymentKind::Tour, Some(tour.id), vec![line], card.card_holder, card.last4))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Requested {requested} places but only {capacity} are offered")]
    CapacityExceeded { requested: i32, capacity: i32 },

    #[error(transparent)]
    Pricing(#[from] PricingError),
}
