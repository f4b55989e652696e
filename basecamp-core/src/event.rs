use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{is_blank, CoreResult, Problems};

/// A dated, ticketed activity that can be paid for directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub price_cents: i64,
    pub capacity: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub price_cents: i64,
    pub capacity: Option<i32>,
}

impl EventInput {
    pub fn validate(&self) -> CoreResult<()> {
        let mut problems = Problems::default();
        problems.check(!is_blank(&self.title), "title is required");
        problems.check(!is_blank(&self.location), "location is required");
        problems.check(self.price_cents >= 0, "price_cents must not be negative");
        problems.check(self.capacity.map_or(true, |c| c >= 1), "capacity must be at least 1");
        problems.finish()
    }
}

impl Event {
    pub fn from_input(input: EventInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title.trim().to_string(),
            description: input.description,
            location: input.location.trim().to_string(),
            starts_at: input.starts_at,
            price_cents: input.price_cents,
            capacity: input.capacity,
            created_at: Utc::now(),
        }
    }
}
