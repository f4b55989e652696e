use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RentalPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A pending purchase or rental line. Name and unit price are snapshotted
/// from the equipment when the line is added.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub equipment_id: Uuid,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i32,
    pub is_rental: bool,
    pub rental_start: Option<DateTime<Utc>>,
    pub rental_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl CartItem {
    pub fn new(
        user_id: Uuid,
        equipment_id: Uuid,
        name: String,
        unit_price_cents: i64,
        quantity: i32,
        rental: Option<RentalPeriod>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            equipment_id,
            name,
            unit_price_cents,
            quantity,
            is_rental: rental.is_some(),
            rental_start: rental.map(|r| r.start),
            rental_end: rental.map(|r| r.end),
            created_at: Utc::now(),
        }
    }

    pub fn rental_period(&self) -> Option<RentalPeriod> {
        if !self.is_rental {
            return None;
        }
        match (self.rental_start, self.rental_end) {
            (Some(start), Some(end)) => Some(RentalPeriod { start, end }),
            _ => None,
        }
    }

    /// Two lines merge when they reference the same item in the same mode
    /// over the same dates.
    pub fn same_line(&self, equipment_id: Uuid, rental: Option<&RentalPeriod>) -> bool {
        self.equipment_id == equipment_id && self.rental_period().as_ref() == rental
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_same_line() {
        let start = Utc::now();
        let period = RentalPeriod { start, end: start + Duration::days(2) };
        let equipment_id = Uuid::new_v4();
        let item = CartItem::new(Uuid::new_v4(), equipment_id, "Stove".into(), 500, 1, Some(period));

        assert!(item.is_rental);
        assert!(item.same_line(equipment_id, Some(&period)));
        assert!(!item.same_line(equipment_id, None));

        let other = RentalPeriod { start, end: start + Duration::days(3) };
        assert!(!item.same_line(equipment_id, Some(&other)));
        assert!(!item.same_line(Uuid::new_v4(), Some(&period)));
    }
}
