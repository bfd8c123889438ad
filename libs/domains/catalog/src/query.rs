//! Filter composition for catalog listings.
//!
//! Queries are pure descriptions of a filter. They can be evaluated in
//! memory against domain records or turned into a sea-orm [`Condition`];
//! both paths share the same normalization so results agree.

use sea_orm::ColumnTrait;
use sea_orm::sea_query::{Condition, Expr, Func, IntoColumnRef, LikeExpr, SimpleExpr};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::entity::{categories, products};
use crate::models::{Category, Product};

/// Normalized comparison key for names: trimmed, then lower-cased.
///
/// Shared by substring filters and name-uniqueness checks so that
/// `"Widget"` and `"  widget  "` always agree.
pub fn name_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Escape LIKE wildcards so the needle matches literally
fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// `LOWER(<column>) LIKE '%<escaped needle>%'` with backslash escaping
fn name_like<C>(column: C, needle: &str) -> SimpleExpr
where
    C: IntoColumnRef,
{
    let pattern = format!("%{}%", escape_like(needle));
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}

/// Filter criteria for category listings
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct CategoryQuery {
    /// Substring to match against category names, case-insensitively
    pub name: Option<String>,
}

impl CategoryQuery {
    /// The normalized search needle; empty or whitespace-only input means
    /// "no name filter"
    pub fn needle(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(name_key)
            .filter(|key| !key.is_empty())
    }

    /// In-memory evaluation of the filter
    pub fn matches(&self, category: &Category) -> bool {
        match self.needle() {
            Some(needle) => category.name.to_lowercase().contains(&needle),
            None => true,
        }
    }

    /// SQL evaluation of the filter
    pub fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(needle) = self.needle() {
            condition = condition.add(name_like(
                (categories::Entity, categories::Column::Name),
                &needle,
            ));
        }
        condition
    }
}

/// Filter criteria for product listings; all criteria compose with AND
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    /// Substring to match against product names, case-insensitively
    pub name: Option<String>,
    /// Exact match on the owning category
    pub category_id: Option<i32>,
}

impl ProductQuery {
    /// The normalized search needle; empty or whitespace-only input means
    /// "no name filter"
    pub fn needle(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(name_key)
            .filter(|key| !key.is_empty())
    }

    /// In-memory evaluation of the filter
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(needle) = self.needle() {
            if !product.name.to_lowercase().contains(&needle) {
                return false;
            }
        }
        if let Some(category_id) = self.category_id {
            if product.category_id != category_id {
                return false;
            }
        }
        true
    }

    /// SQL evaluation of the filter.
    ///
    /// The name column is table-qualified so the condition stays valid
    /// inside joined queries.
    pub fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(needle) = self.needle() {
            condition = condition.add(name_like(
                (products::Entity, products::Column::Name),
                &needle,
            ));
        }
        if let Some(category_id) = self.category_id {
            condition = condition.add(products::Column::CategoryId.eq(category_id));
        }
        condition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn category(name: &str) -> Category {
        Category {
            id: 1,
            name: name.to_string(),
            created_date: Utc::now(),
            version: 1,
        }
    }

    fn product(name: &str, category_id: i32) -> Product {
        Product {
            id: 1,
            name: name.to_string(),
            price: 1.0,
            category_id,
            created_date: Utc::now(),
            version: 1,
        }
    }

    #[test]
    fn test_name_key_trims_and_lowercases() {
        assert_eq!(name_key("  Widget  "), "widget");
        assert_eq!(name_key("WIDGET"), "widget");
        assert_eq!(name_key("Widget"), name_key("  widget  "));
    }

    #[test]
    fn test_blank_filter_means_no_filter() {
        for raw in [None, Some(""), Some("   ")] {
            let query = CategoryQuery {
                name: raw.map(str::to_string),
            };
            assert!(query.needle().is_none());
            assert!(query.matches(&category("Anything")));
        }
    }

    #[test]
    fn test_name_match_is_case_insensitive_substring() {
        let query = CategoryQuery {
            name: Some("  VERA ".to_string()),
        };
        assert!(query.matches(&category("Beverages")));
        assert!(!query.matches(&category("Snacks")));
    }

    #[test]
    fn test_product_filters_compose_with_and() {
        let query = ProductQuery {
            name: Some("cola".to_string()),
            category_id: Some(3),
        };

        assert!(query.matches(&product("Cherry Cola", 3)));
        assert!(!query.matches(&product("Cherry Cola", 4)));
        assert!(!query.matches(&product("Lemonade", 3)));
    }

    #[test]
    fn test_category_filter_alone() {
        let query = ProductQuery {
            name: None,
            category_id: Some(2),
        };
        assert!(query.matches(&product("Anything", 2)));
        assert!(!query.matches(&product("Anything", 5)));
    }

    #[test]
    fn test_like_wildcards_are_escaped() {
        assert_eq!(escape_like("50% off"), "50\\% off");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}
