use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Core catalog entity. `id` is the storage key; `sweet_id` is the business
/// key every API operation addresses records by.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Sweet {
    pub id: Uuid,
    pub sweet_id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: i32,
    pub description: Option<String>,
    /// External URL or a `/uploads/...` reference for an uploaded file.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── Request payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSweet {
    pub sweet_id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: i32,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl CreateSweet {
    pub fn validate(&self) -> AppResult<()> {
        if self.sweet_id.trim().is_empty() {
            return Err(AppError::BadRequest("sweetId must not be empty".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("name must not be empty".to_string()));
        }
        if self.category.trim().is_empty() {
            return Err(AppError::BadRequest("category must not be empty".to_string()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AppError::BadRequest("price must be >= 0".to_string()));
        }
        if self.quantity < 0 {
            return Err(AppError::BadRequest("quantity must be >= 0".to_string()));
        }
        Ok(())
    }
}

/// Partial update; `sweetId` is deliberately absent — the business key is
/// immutable once assigned.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSweet {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i32>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl UpdateSweet {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(AppError::BadRequest("name must not be empty".to_string()));
            }
        }
        if let Some(category) = &self.category {
            if category.trim().is_empty() {
                return Err(AppError::BadRequest("category must not be empty".to_string()));
            }
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                return Err(AppError::BadRequest("price must be >= 0".to_string()));
            }
        }
        if let Some(quantity) = self.quantity {
            if quantity < 0 {
                return Err(AppError::BadRequest("quantity must be >= 0".to_string()));
            }
        }
        Ok(())
    }
}

/// Body of the purchase and restock endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockChange {
    pub sweet_id: String,
    pub quantity: i32,
}

impl StockChange {
    pub fn validate(&self) -> AppResult<()> {
        if self.sweet_id.trim().is_empty() {
            return Err(AppError::BadRequest("sweetId must not be empty".to_string()));
        }
        if self.quantity <= 0 {
            return Err(AppError::BadRequest(
                "quantity must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

// ── Query parameters ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub name: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortQuery {
    pub sort_by: String,
    pub order: Option<String>,
}

/// Sortable attributes. `sortBy` is checked against this set before any SQL
/// is built, so arbitrary field names never reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Category,
    Price,
    Quantity,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "category" => Some(Self::Category),
            "price" => Some(Self::Price),
            "quantity" => Some(Self::Quantity),
            _ => None,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Category => "category",
            Self::Price => "price",
            Self::Quantity => "quantity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Missing order defaults to ascending; anything other than asc/desc is
    /// rejected.
    pub fn parse(s: Option<&str>) -> Option<Self> {
        match s {
            None => Some(Self::Asc),
            Some("asc") => Some(Self::Asc),
            Some("desc") => Some(Self::Desc),
            Some(_) => None,
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_payload() -> CreateSweet {
        CreateSweet {
            sweet_id: "1001".to_string(),
            name: "Kaju Katli".to_string(),
            category: "Nut-Based".to_string(),
            price: 50.0,
            quantity: 20,
            description: None,
            image: None,
        }
    }

    // ── Validation ─────────────────────────────────────────────────────────────

    #[test]
    fn valid_create_passes() {
        assert!(create_payload().validate().is_ok());
    }

    #[test]
    fn create_rejects_blank_sweet_id() {
        let mut p = create_payload();
        p.sweet_id = "  ".to_string();
        assert!(p.validate().is_err());
    }

    #[test]
    fn create_rejects_blank_name() {
        let mut p = create_payload();
        p.name = String::new();
        assert!(p.validate().is_err());
    }

    #[test]
    fn create_rejects_negative_price() {
        let mut p = create_payload();
        p.price = -0.01;
        assert!(p.validate().is_err());
    }

    #[test]
    fn create_rejects_nan_price() {
        let mut p = create_payload();
        p.price = f64::NAN;
        assert!(p.validate().is_err());
    }

    #[test]
    fn create_rejects_negative_quantity() {
        let mut p = create_payload();
        p.quantity = -1;
        assert!(p.validate().is_err());
    }

    #[test]
    fn create_allows_zero_price_and_quantity() {
        let mut p = create_payload();
        p.price = 0.0;
        p.quantity = 0;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn update_validates_only_present_fields() {
        let p = UpdateSweet {
            price: Some(12.5),
            ..Default::default()
        };
        assert!(p.validate().is_ok());

        let p = UpdateSweet {
            quantity: Some(-3),
            ..Default::default()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn update_ignores_supplied_sweet_id() {
        // unknown fields are dropped at deserialization, so the business key
        // cannot be rewritten through Update
        let p: UpdateSweet =
            serde_json::from_value(serde_json::json!({ "sweetId": "9999", "price": 5.0 }))
                .unwrap();
        assert_eq!(p.price, Some(5.0));
        assert!(p.name.is_none());
    }

    #[test]
    fn stock_change_requires_positive_quantity() {
        let p = StockChange {
            sweet_id: "1001".to_string(),
            quantity: 0,
        };
        assert!(p.validate().is_err());

        let p = StockChange {
            sweet_id: "1001".to_string(),
            quantity: 5,
        };
        assert!(p.validate().is_ok());
    }

    // ── Serde shape ────────────────────────────────────────────────────────────

    #[test]
    fn sweet_serializes_camel_case() {
        let sweet = Sweet {
            id: Uuid::new_v4(),
            sweet_id: "1001".to_string(),
            name: "Kaju Katli".to_string(),
            category: "Nut-Based".to_string(),
            price: 50.0,
            quantity: 20,
            description: None,
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let v = serde_json::to_value(&sweet).unwrap();
        assert_eq!(v["sweetId"], "1001");
        assert!(v.get("createdAt").is_some());
        assert!(v.get("updatedAt").is_some());
        assert!(v.get("sweet_id").is_none());
    }

    #[test]
    fn search_filters_deserialize_camel_case_bounds() {
        let f: SearchFilters =
            serde_json::from_value(serde_json::json!({ "minPrice": 10.0, "maxPrice": 60.0 }))
                .unwrap();
        assert_eq!(f.min_price, Some(10.0));
        assert_eq!(f.max_price, Some(60.0));
        assert!(f.name.is_none());
    }

    // ── Sort constraining ──────────────────────────────────────────────────────

    #[test]
    fn sort_field_parses_known_attributes() {
        assert_eq!(SortField::parse("price"), Some(SortField::Price));
        assert_eq!(SortField::parse("name"), Some(SortField::Name));
        assert_eq!(SortField::parse("category"), Some(SortField::Category));
        assert_eq!(SortField::parse("quantity"), Some(SortField::Quantity));
    }

    #[test]
    fn sort_field_rejects_unknown_attributes() {
        assert_eq!(SortField::parse("sweetId"), None);
        assert_eq!(SortField::parse("createdAt"), None);
        assert_eq!(SortField::parse("price; DROP TABLE sweets"), None);
    }

    #[test]
    fn sort_order_defaults_to_ascending() {
        assert_eq!(SortOrder::parse(None), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse(Some("asc")), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse(Some("desc")), Some(SortOrder::Desc));
        assert_eq!(SortOrder::parse(Some("sideways")), None);
    }
}
