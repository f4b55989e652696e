use basecamp_shared::Masked;
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

const CARD_NUMBER_DIGITS: usize = 16;

/// Card form as submitted by the checkout page. Number and CVV stay masked
/// in logs and are never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct CardDetails {
    pub card_holder: String,
    pub card_number: Masked<String>,
    pub expiry: String,
    pub cvv: Masked<String>,
}

/// What survives validation: the holder name and the last four digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedCard {
    pub card_holder: String,
    pub last4: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid payment details: {}", .problems.join("; "))]
pub struct CardValidationError {
    pub problems: Vec<String>,
}

/// Validates the card form against `today`. Every failing field is reported.
pub fn validate_card(card: &CardDetails, today: NaiveDate) -> Result<VerifiedCard, CardValidationError> {
    let mut problems = Vec::new();

    let holder = card.card_holder.trim();
    if holder.is_empty() {
        problems.push("card holder is required".to_string());
    }

    let number = normalize_card_number(card.card_number.expose());
    if number.is_none() {
        problems.push(format!("card number must be exactly {} digits", CARD_NUMBER_DIGITS));
    }

    match parse_expiry(&card.expiry) {
        None => problems.push("expiry must be formatted MM/YY".to_string()),
        Some((year, month)) if (year, month) < (today.year(), today.month()) => {
            problems.push("card has expired".to_string());
        }
        Some(_) => {}
    }

    let cvv = card.cvv.expose().trim();
    if !(cvv.len() == 3 || cvv.len() == 4) || !cvv.bytes().all(|b| b.is_ascii_digit()) {
        problems.push("cvv must be 3 or 4 digits".to_string());
    }

    match number {
        Some(number) if problems.is_empty() => Ok(VerifiedCard {
            card_holder: holder.to_string(),
            last4: number[CARD_NUMBER_DIGITS - 4..].to_string(),
        }),
        _ => Err(CardValidationError { problems }),
    }
}

/// Strips spaces and dashes; the remainder must be exactly 16 ASCII digits.
fn normalize_card_number(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| *c != ' ' && *c != '-').collect();
    if digits.len() == CARD_NUMBER_DIGITS && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(digits)
    } else {
        None
    }
}

/// Parses `MM/YY` or `MM/YYYY` into (year, month).
fn parse_expiry(raw: &str) -> Option<(i32, u32)> {
    let (month, year) = raw.trim().split_once('/')?;
    let (month, year) = (month.trim(), year.trim());

    if month.is_empty() || month.len() > 2 || !month.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let month: u32 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    let year: i32 = match year.len() {
        2 => 2000 + year.parse::<i32>().ok()?,
        4 => year.parse().ok()?,
        _ => return None,
    };

    Some((year, month))
}
