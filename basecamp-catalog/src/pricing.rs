use basecamp_core::{CartItem, RentalPeriod};
use serde::Serialize;
use uuid::Uuid;

const SECONDS_PER_DAY: i64 = 86_400;

/// Billable days of a rental: whole days, partial days rounded up, never
/// less than one.
pub fn rental_days(period: &RentalPeriod) -> i64 {
    let seconds = (period.end - period.start).num_seconds();
    if seconds <= 0 {
        return 1;
    }
    let whole = seconds / SECONDS_PER_DAY;
    let days = if seconds % SECONDS_PER_DAY == 0 { whole } else { whole + 1 };
    days.max(1)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct LineQuote {
    pub unit_price_cents: i64,
    pub quantity: i32,
    pub days: Option<i64>,
    pub total_cents: i64,
}

/// Prices one cart line.
///
/// Purchases cost `price × quantity`; rentals cost
/// `price × quantity × rental_days`.
pub fn quote_line(
    unit_price_cents: i64,
    quantity: i32,
    rental: Option<&RentalPeriod>,
) -> Result<LineQuote, PricingError> {
    if unit_price_cents < 0 {
        return Err(PricingError::NegativePrice(unit_price_cents));
    }
    if quantity < 1 {
        return Err(PricingError::InvalidQuantity(quantity));
    }

    let days = rental.map(rental_days);
    let subtotal = unit_price_cents
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::Overflow)?;
    let total_cents = match days {
        Some(days) => subtotal.checked_mul(days).ok_or(PricingError::Overflow)?,
        None => subtotal,
    };

    Ok(LineQuote { unit_price_cents, quantity, days, total_cents })
}

#[derive(Debug, Clone, Serialize)]
pub struct QuotedItem {
    pub item_id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub quote: LineQuote,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartQuote {
    pub lines: Vec<QuotedItem>,
    pub total_cents: i64,
}

impl CartQuote {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

pub fn quote_cart(items: &[CartItem]) -> Result<CartQuote, PricingError> {
    let mut lines = Vec::with_capacity(items.len());
    let mut total_cents: i64 = 0;

    for item in items {
        let rental = item.rental_period();
        let quote = quote_line(item.unit_price_cents, item.quantity, rental.as_ref())?;
        total_cents = total_cents.checked_add(quote.total_cents).ok_or(PricingError::Overflow)?;
        lines.push(QuotedItem { item_id: item.id, name: item.name.clone(), quote });
    }

    Ok(CartQuote { lines, total_cents })
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("Price must not be negative: {0}")]
    NegativePrice(i64),

    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(i32),

    #[error("Amount is too large")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn period(hours: i64) -> RentalPeriod {
        let start = Utc.with_ymd_and_hms(2030, 7, 1, 9, 0, 0).unwrap();
        RentalPeriod { start, end: start + Duration::hours(hours) }
    }

    #[test]
    fn test_rental_days_rounds_up() {
        assert_eq!(rental_days(&period(24)), 1);
        assert_eq!(rental_days(&period(25)), 2);
        assert_eq!(rental_days(&period(72)), 3);
        assert_eq!(rental_days(&period(1)), 1);
    }

    #[test]
    fn test_rental_days_never_below_one() {
        assert_eq!(rental_days(&period(0)), 1);
        assert_eq!(rental_days(&period(-48)), 1);
    }

    #[test]
    fn test_purchase_line() {
        let quote = quote_line(2_500, 3, None).unwrap();
        assert_eq!(quote.total_cents, 7_500);
        assert_eq!(quote.days, None);
    }

    #[test]
    fn test_rental_line() {
        // 2.5 days bills as 3
        let quote = quote_line(1_000, 2, Some(&period(60))).unwrap();
        assert_eq!(quote.days, Some(3));
        assert_eq!(quote.total_cents, 6_000);
    }

    #[test]
    fn test_invalid_lines() {
        assert_eq!(quote_line(100, 0, None), Err(PricingError::InvalidQuantity(0)));
        assert_eq!(quote_line(-1, 1, None), Err(PricingError::NegativePrice(-1)));
        assert_eq!(quote_line(i64::MAX, 2, None), Err(PricingError::Overflow));
    }

    #[test]
    fn test_cart_total() {
        let user = Uuid::new_v4();
        let items = vec![
            CartItem::new(user, Uuid::new_v4(), "Lantern".into(), 1_200, 2, None),
            CartItem::new(user, Uuid::new_v4(), "Kayak".into(), 4_000, 1, Some(period(48))),
        ];
        let quote = quote_cart(&items).unwrap();
        assert_eq!(quote.lines.len(), 2);
        assert_eq!(quote.total_cents, 2_400 + 8_000);
        assert!(quote_cart(&[]).unwrap().is_empty());
    }
}
