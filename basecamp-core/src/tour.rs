use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{is_blank, CoreResult, Problems};

/// A bookable travel package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tour {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub price_cents: i64,
    pub duration_days: i32,
    pub max_group_size: Option<i32>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin form for creating or replacing a tour.
#[derive(Debug, Clone, Deserialize)]
pub struct TourInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: String,
    pub price_cents: i64,
    pub duration_days: i32,
    pub max_group_size: Option<i32>,
    pub image_url: Option<String>,
}

impl TourInput {
    pub fn validate(&self) -> CoreResult<()> {
        let mut problems = Problems::default();
        problems.check(!is_blank(&self.title), "title is required");
        problems.check(!is_blank(&self.location), "location is required");
        problems.check(self.price_cents >= 0, "price_cents must not be negative");
        problems.check(self.duration_days >= 1, "duration_days must be at least 1");
        problems.check(
            self.max_group_size.map_or(true, |size| size >= 1),
            "max_group_size must be at least 1",
        );
        problems.finish()
    }
}

impl Tour {
    pub fn from_input(input: TourInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title.trim().to_string(),
            description: input.description,
            location: input.location.trim().to_string(),
            price_cents: input.price_cents,
            duration_days: input.duration_days,
            max_group_size: input.max_group_size,
            image_url: input.image_url,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, input: TourInput) {
        self.title = input.title.trim().to_string();
        self.description = input.description;
        self.location = input.location.trim().to_string();
        self.price_cents = input.price_cents;
        self.duration_days = input.duration_days;
        self.max_group_size = input.max_group_size;
        self.image_url = input.image_url;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> TourInput {
        TourInput {
            title: "Fjord Kayak Week".to_string(),
            description: "Paddle the western fjords".to_string(),
            location: "Bergen".to_string(),
            price_cents: 129_900,
            duration_days: 7,
            max_group_size: Some(12),
            image_url: None,
        }
    }

    #[test]
    fn test_valid_input() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn test_invalid_input_reports_every_field() {
        let bad = TourInput {
            title: " ".to_string(),
            price_cents: -1,
            duration_days: 0,
            max_group_size: Some(0),
            ..input()
        };
        let message = bad.validate().unwrap_err().to_string();
        assert!(message.contains("title"));
        assert!(message.contains("price_cents"));
        assert!(message.contains("duration_days"));
        assert!(message.contains("max_group_size"));
    }

    #[test]
    fn test_apply_keeps_identity() {
        let mut tour = Tour::from_input(input());
        let id = tour.id;
        tour.apply(TourInput { price_cents: 99_000, ..input() });
        assert_eq!(tour.id, id);
        assert_eq!(tour.price_cents, 99_000);
    }
}
