use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Custom validator rejecting names that are empty after trimming
fn validate_not_blank(name: &str) -> Result<(), validator::ValidationError> {
    if name.trim().is_empty() {
        return Err(validator::ValidationError::new("blank_name"));
    }
    Ok(())
}

/// Category entity - a grouping products belong to
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// Unique identifier, assigned by the store
    pub id: i32,
    /// Display name
    pub name: String,
    /// Creation timestamp, never mutated
    pub created_date: DateTime<Utc>,
    /// Optimistic-concurrency token, incremented on every update
    pub version: i32,
}

/// Product entity - always belongs to exactly one category
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i32,
    pub name: String,
    /// Non-negative unit price
    pub price: f64,
    /// Foreign key to the owning category
    pub category_id: i32,
    pub created_date: DateTime<Utc>,
    pub version: i32,
}

/// Response view for a category.
///
/// Independent of the stored record; `product_count` is computed at query
/// time from the products referencing this category and is never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: i32,
    pub name: String,
    pub created_date: DateTime<Utc>,
    pub version: i32,
    /// Number of products currently referencing this category
    pub product_count: u64,
}

impl CategoryView {
    /// Project a category record into its response view
    pub fn project(category: Category, product_count: u64) -> Self {
        Self {
            id: category.id,
            name: category.name,
            created_date: category.created_date,
            version: category.version,
            product_count,
        }
    }
}

/// Response view for a product.
///
/// `category_name` is resolved through `category_id` at query time. A
/// missing category row (only possible through external tampering, the API
/// enforces referential integrity) serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub category_id: i32,
    pub created_date: DateTime<Utc>,
    pub version: i32,
    /// Name of the referenced category
    pub category_name: Option<String>,
}

impl ProductView {
    /// Project a product record into its response view
    pub fn project(product: Product, category_name: Option<String>) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            category_id: product.category_id,
            created_date: product.created_date,
            version: product.version,
            category_name,
        }
    }
}

/// One page of results plus the total page count for the active filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Ceiling of filtered count over page size; 0 when nothing matches
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 0,
        }
    }
}

/// DTO for creating a new category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 255), custom(function = validate_not_blank))]
    pub name: String,
}

/// DTO for updating an existing category (full-record replacement)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    /// Must match the id in the request path
    pub id: i32,
    #[validate(length(min = 1, max = 255), custom(function = validate_not_blank))]
    pub name: String,
    /// Version the update is based on; omitted means "latest read by the server"
    pub version: Option<i32>,
}

/// DTO for creating a new product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 255), custom(function = validate_not_blank))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    pub category_id: i32,
}

/// DTO for updating an existing product (full-record replacement)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    /// Must match the id in the request path
    pub id: i32,
    #[validate(length(min = 1, max = 255), custom(function = validate_not_blank))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    pub category_id: i32,
    /// Version the update is based on; omitted means "latest read by the server"
    pub version: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i32, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
            created_date: Utc::now(),
            version: 1,
        }
    }

    #[test]
    fn test_category_projection_copies_fields_and_attaches_count() {
        let source = category(3, "Beverages");
        let view = CategoryView::project(source.clone(), 7);

        assert_eq!(view.id, source.id);
        assert_eq!(view.name, source.name);
        assert_eq!(view.created_date, source.created_date);
        assert_eq!(view.version, source.version);
        assert_eq!(view.product_count, 7);
    }

    #[test]
    fn test_product_projection_resolves_category_name() {
        let product = Product {
            id: 1,
            name: "Cola".to_string(),
            price: 1.5,
            category_id: 3,
            created_date: Utc::now(),
            version: 1,
        };

        let view = ProductView::project(product.clone(), Some("Beverages".to_string()));
        assert_eq!(view.category_name.as_deref(), Some("Beverages"));
        assert_eq!(view.price, 1.5);

        let orphaned = ProductView::project(product, None);
        assert!(orphaned.category_name.is_none());
    }

    #[test]
    fn test_views_serialize_camel_case() {
        let view = CategoryView::project(category(1, "Snacks"), 0);
        let json = serde_json::to_value(&view).unwrap();

        assert!(json.get("createdDate").is_some());
        assert!(json.get("productCount").is_some());
        assert!(json.get("created_date").is_none());
    }

    #[test]
    fn test_broken_relation_serializes_as_null() {
        let view = ProductView {
            id: 1,
            name: "Orphan".to_string(),
            price: 2.0,
            category_id: 42,
            created_date: Utc::now(),
            version: 1,
            category_name: None,
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["categoryName"], serde_json::Value::Null);
    }

    #[test]
    fn test_blank_names_fail_validation() {
        let blank = CreateCategory {
            name: "   ".to_string(),
        };
        assert!(blank.validate().is_err());

        let empty = CreateCategory {
            name: String::new(),
        };
        assert!(empty.validate().is_err());

        let ok = CreateCategory {
            name: "Beverages".to_string(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_negative_price_fails_validation() {
        let input = CreateProduct {
            name: "Cola".to_string(),
            price: -0.01,
            category_id: 1,
        };
        assert!(input.validate().is_err());

        let free = CreateProduct {
            name: "Sample".to_string(),
            price: 0.0,
            category_id: 1,
        };
        assert!(free.validate().is_ok());
    }
}
