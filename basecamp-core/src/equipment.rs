use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{is_blank, CoreError, CoreResult, Problems};

/// A rentable or purchasable camping inventory item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Equipment {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_cents: i64,
    pub rental_price_cents: i64,
    pub quantity: i32,
    pub available: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partially filled equipment form, as decoded from a multipart upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquipmentDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: Option<i64>,
    pub rental_price_cents: Option<i64>,
    pub quantity: Option<i32>,
    pub available: Option<bool>,
}

impl Equipment {
    /// Builds a new item. `name` and `price_cents` are required.
    pub fn from_draft(draft: EquipmentDraft) -> CoreResult<Self> {
        let name = match draft.name.as_deref() {
            Some(name) if !is_blank(name) => name.trim().to_string(),
            _ => return Err(CoreError::ValidationError("name is required".to_string())),
        };
        let price_cents = draft
            .price_cents
            .ok_or_else(|| CoreError::ValidationError("price_cents is required".to_string()))?;

        let now = Utc::now();
        let equipment = Self {
            id: Uuid::new_v4(),
            name,
            description: draft.description.unwrap_or_default(),
            category: draft.category.map(|c| c.trim().to_string()).unwrap_or_else(|| "general".to_string()),
            price_cents,
            rental_price_cents: draft.rental_price_cents.unwrap_or(0),
            quantity: draft.quantity.unwrap_or(0),
            available: draft.available.unwrap_or(true),
            image_url: None,
            created_at: now,
            updated_at: now,
        };
        equipment.validate()?;
        Ok(equipment)
    }

    /// Overlays the fields present in `draft`.
    pub fn apply(&mut self, draft: EquipmentDraft) -> CoreResult<()> {
        if let Some(name) = draft.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = draft.description {
            self.description = description;
        }
        if let Some(category) = draft.category {
            self.category = category.trim().to_string();
        }
        if let Some(price) = draft.price_cents {
            self.price_cents = price;
        }
        if let Some(price) = draft.rental_price_cents {
            self.rental_price_cents = price;
        }
        if let Some(quantity) = draft.quantity {
            self.quantity = quantity;
        }
        if let Some(available) = draft.available {
            self.available = available;
        }
        self.updated_at = Utc::now();
        self.validate()
    }

    fn validate(&self) -> CoreResult<()> {
        let mut problems = Problems::default();
        problems.check(!is_blank(&self.name), "name is required");
        problems.check(!is_blank(&self.category), "category must not be blank");
        problems.check(self.price_cents >= 0, "price_cents must not be negative");
        problems.check(self.rental_price_cents >= 0, "rental_price_cents must not be negative");
        problems.check(self.quantity >= 0, "quantity must not be negative");
        problems.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentFilter {
    pub category: Option<String>,
    pub available: Option<bool>,
}

impl EquipmentFilter {
    pub fn matches(&self, equipment: &Equipment) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |c| equipment.category.eq_ignore_ascii_case(c));
        let available_ok = self.available.map_or(true, |a| equipment.available == a);
        category_ok && available_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tent() -> EquipmentDraft {
        EquipmentDraft {
            name: Some("Two-person tent".to_string()),
            category: Some("Tents".to_string()),
            price_cents: Some(24_900),
            rental_price_cents: Some(1_500),
            quantity: Some(4),
            ..Default::default()
        }
    }

    #[test]
    fn test_draft_requires_name_and_price() {
        assert!(Equipment::from_draft(EquipmentDraft { name: None, ..tent() }).is_err());
        assert!(Equipment::from_draft(EquipmentDraft { price_cents: None, ..tent() }).is_err());

        let item = Equipment::from_draft(tent()).unwrap();
        assert!(item.available);
        assert_eq!(item.quantity, 4);
    }

    #[test]
    fn test_apply_only_overlays_present_fields() {
        let mut item = Equipment::from_draft(tent()).unwrap();
        item.apply(EquipmentDraft { quantity: Some(9), ..Default::default() }).unwrap();
        assert_eq!(item.quantity, 9);
        assert_eq!(item.name, "Two-person tent");

        assert!(item.apply(EquipmentDraft { price_cents: Some(-5), ..Default::default() }).is_err());
    }

    #[test]
    fn test_filter() {
        let item = Equipment::from_draft(tent()).unwrap();
        assert!(EquipmentFilter::default().matches(&item));
        assert!(EquipmentFilter { category: Some("tents".into()), available: Some(true) }.matches(&item));
        assert!(!EquipmentFilter { category: Some("stoves".into()), available: None }.matches(&item));
        assert!(!EquipmentFilter { category: None, available: Some(false) }.matches(&item));
    }
}
