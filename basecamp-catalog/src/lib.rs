pub mod pricing;
pub mod inventory;

pub use pricing::{quote_cart, quote_line, rental_days, CartQuote, LineQuote, PricingError};
pub use inventory::{ensure_in_stock, validate_rental, InventoryError};
