use basecamp_core::{Equipment, RentalPeriod};
use chrono::NaiveDate;

/// Rejects a cart request the stock cannot cover. `already_held` is what the
/// user's cart holds of this item outside the line being changed.
pub fn ensure_in_stock(
    equipment: &Equipment,
    already_held: i32,
    requested: i32,
) -> Result<(), InventoryError> {
    if requested < 1 {
        return Err(InventoryError::InvalidQuantity(requested));
    }
    if !equipment.available {
        return Err(InventoryError::Unavailable(equipment.name.clone()));
    }

    let remaining = equipment.quantity.saturating_sub(already_held).max(0);
    if requested > remaining {
        return Err(InventoryError::InsufficientInventory {
            requested,
            available: remaining,
        });
    }

    Ok(())
}

pub fn validate_rental(period: &RentalPeriod, today: NaiveDate) -> Result<(), InventoryError> {
    if period.end <= period.start {
        return Err(InventoryError::InvalidRentalPeriod(
            "rental_end must be after rental_start".to_string(),
        ));
    }
    if period.start.date_naive() < today {
        return Err(InventoryError::InvalidRentalPeriod(
            "rental_start must not be in the past".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(i32),

    #[error("{0} is not available")]
    Unavailable(String),

    #[error("Insufficient inventory: requested {requested}, available {available}")]
    InsufficientInventory {
        requested: i32,
        available: i32,
    },

    #[error("Invalid rental period: {0}")]
    InvalidRentalPeriod(String),
}
