use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{CoreError, CoreResult, Problems};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            other => Err(CoreError::ValidationError(format!("Unknown booking status: {}", other))),
        }
    }
}

/// A user's reservation against a tour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tour_id: Uuid,
    pub travel_date: NaiveDate,
    pub participants: i32,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(user_id: Uuid, tour_id: Uuid, travel_date: NaiveDate, participants: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            tour_id,
            travel_date,
            participants,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Checks a booking request against the calendar and the tour's group limit.
pub fn validate_new_booking(
    travel_date: NaiveDate,
    participants: i32,
    today: NaiveDate,
    max_group_size: Option<i32>,
) -> CoreResult<()> {
    let mut problems = Problems::default();
    problems.check(travel_date >= today, "travel_date must not be in the past");
    problems.check(participants >= 1, "participants must be at least 1");
    if let Some(max) = max_group_size {
        problems.check(participants <= max, &format!("participants must not exceed {}", max));
    }
    problems.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_booking_is_pending() {
        let booking = Booking::new(Uuid::new_v4(), Uuid::new_v4(), day(2030, 6, 1), 2);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(serde_json::to_value(booking.status).unwrap(), "PENDING");
    }

    #[test]
    fn test_booking_rules() {
        let today = day(2030, 1, 10);
        assert!(validate_new_booking(today, 1, today, None).is_ok());
        assert!(validate_new_booking(day(2030, 1, 9), 1, today, None).is_err());
        assert!(validate_new_booking(today, 0, today, None).is_err());
        assert!(validate_new_booking(today, 5, today, Some(4)).is_err());
        assert!(validate_new_booking(today, 4, today, Some(4)).is_ok());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [BookingStatus::Pending, BookingStatus::Confirmed, BookingStatus::Cancelled] {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
        assert!("EXPIRED".parse::<BookingStatus>().is_err());
    }
}
