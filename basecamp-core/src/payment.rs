use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::CoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentKind {
    Cart,
    Event,
    Tour,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
}

macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_uppercase().as_str() {
                    $($text => Ok($ty::$variant),)+
                    other => Err(CoreError::ValidationError(format!(
                        "Unknown {}: {}",
                        stringify!($ty),
                        other
                    ))),
                }
            }
        }
    };
}

text_enum!(PaymentKind { Cart => "CART", Event => "EVENT", Tour => "TOUR" });
text_enum!(PaymentStatus { Pending => "PENDING", Approved => "APPROVED", Rejected => "REJECTED" });

/// One purchased line, frozen at submission time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentLine {
    pub description: String,
    pub unit_price_cents: i64,
    pub quantity: i32,
    pub days: Option<i64>,
    pub total_cents: i64,
}

/// A submitted card payment awaiting admin review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: PaymentKind,
    pub reference_id: Option<Uuid>,
    pub lines: Vec<PaymentLine>,
    pub amount_cents: i64,
    pub card_holder: String,
    pub card_last4: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Payment {
    pub fn new(
        user_id: Uuid,
        kind: PaymentKind,
        reference_id: Option<Uuid>,
        lines: Vec<PaymentLine>,
        card_holder: String,
        card_last4: String,
    ) -> Self {
        let amount_cents = lines.iter().map(|l| l.total_cents).sum();
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            reference_id,
            lines,
            amount_cents,
            card_holder,
            card_last4,
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
            reviewed_at: None,
        }
    }
}
