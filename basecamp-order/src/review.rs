use basecamp_core::{Payment, PaymentStatus};
use chrono::Utc;

/// Admin review of submitted payments. Only a pending payment can be
/// approved or rejected, and only once.
pub struct PaymentReview;

impl PaymentReview {
    pub fn decide(payment: &mut Payment, decision: PaymentStatus) -> Result<(), ReviewError> {
        if decision == PaymentStatus::Pending {
            return Err(ReviewError::NotADecision(decision.to_string()));
        }

        if payment.status != PaymentStatus::Pending {
            return Err(ReviewError::InvalidTransition {
                from: payment.status.to_string(),
                to: decision.to_string(),
            });
        }

        payment.status = decision;
        payment.reviewed_at = Some(Utc::now());
        tracing::info!("Payment {} reviewed: {}", payment.id, decision);
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReviewError {
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("{0} is not a review decision")]
    NotADecision(String),
}
