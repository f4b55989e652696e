pub mod validation;
pub mod review;
pub mod checkout;

pub use validation::{validate_card, CardDetails, CardValidationError, VerifiedCard};
pub use review::{PaymentReview, ReviewError};
pub use checkout::{Checkout, CheckoutError};
