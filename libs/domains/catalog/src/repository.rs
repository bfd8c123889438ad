//! Storage abstraction for categories and products

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    Category, CreateCategory, CreateProduct, Product, UpdateCategory, UpdateProduct,
};
use crate::pagination::PageBounds;
use crate::query::{name_key, CategoryQuery, ProductQuery};

/// Storage operations for the catalog.
///
/// Both collections sit behind one trait so the services share a single
/// collaborator and tests can mock one object.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // ===== Categories =====

    /// Inserts a new category and returns it with its assigned id.
    async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category>;

    async fn find_category(&self, id: i32) -> CatalogResult<Option<Category>>;

    /// Counts the categories matching the filter, before any paging.
    async fn count_categories(&self, query: &CategoryQuery) -> CatalogResult<u64>;

    /// Returns one page of matching categories, newest id first, each
    /// paired with the number of products referencing it.
    async fn list_categories(
        &self,
        query: &CategoryQuery,
        bounds: PageBounds,
    ) -> CatalogResult<Vec<(Category, u64)>>;

    /// Compare-and-swap update. Writes only when the stored version still
    /// equals `expected_version` and returns `None` when it does not.
    async fn update_category(
        &self,
        id: i32,
        input: UpdateCategory,
        expected_version: i32,
    ) -> CatalogResult<Option<Category>>;

    /// Deletes a category. Returns `false` when no row matched.
    async fn delete_category(&self, id: i32) -> CatalogResult<bool>;

    async fn count_products_in(&self, category_id: i32) -> CatalogResult<u64>;

    /// Whether some category already uses `key` (a normalized name),
    /// ignoring the row named by `exclude_id`.
    async fn category_name_taken(&self, key: &str, exclude_id: Option<i32>)
        -> CatalogResult<bool>;

    // ===== Products =====

    async fn create_product(&self, input: CreateProduct) -> CatalogResult<Product>;

    async fn find_product(&self, id: i32) -> CatalogResult<Option<Product>>;

    async fn count_products(&self, query: &ProductQuery) -> CatalogResult<u64>;

    /// Returns one page of matching products, newest id first, each paired
    /// with the name of its category.
    async fn list_products(
        &self,
        query: &ProductQuery,
        bounds: PageBounds,
    ) -> CatalogResult<Vec<(Product, Option<String>)>>;

    async fn update_product(
        &self,
        id: i32,
        input: UpdateProduct,
        expected_version: i32,
    ) -> CatalogResult<Option<Product>>;

    async fn delete_product(&self, id: i32) -> CatalogResult<bool>;

    async fn product_name_taken(&self, key: &str, exclude_id: Option<i32>)
        -> CatalogResult<bool>;
}

#[derive(Debug, Default)]
struct CatalogState {
    categories: HashMap<i32, Category>,
    products: HashMap<i32, Product>,
    next_category_id: i32,
    next_product_id: i32,
}

/// In-memory store for tests and for local runs without a database.
///
/// Clones share the underlying state, so one instance can back both
/// services. Ids are handed out sequentially starting at 1, and the
/// uniqueness and referential checks mirror the database constraints.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category> {
        let mut state = self.state.write().await;
        let key = name_key(&input.name);
        if state.categories.values().any(|c| name_key(&c.name) == key) {
            return Err(CatalogError::DuplicateName(input.name));
        }
        state.next_category_id += 1;
        let category = Category {
            id: state.next_category_id,
            name: input.name,
            created_date: Utc::now(),
            version: 1,
        };
        state.categories.insert(category.id, category.clone());
        info!(category_id = %category.id, "Created category");
        Ok(category)
    }

    async fn find_category(&self, id: i32) -> CatalogResult<Option<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.get(&id).cloned())
    }

    async fn count_categories(&self, query: &CategoryQuery) -> CatalogResult<u64> {
        let state = self.state.read().await;
        Ok(state.categories.values().filter(|c| query.matches(c)).count() as u64)
    }

    async fn list_categories(
        &self,
        query: &CategoryQuery,
        bounds: PageBounds,
    ) -> CatalogResult<Vec<(Category, u64)>> {
        let state = self.state.read().await;
        let mut matching: Vec<Category> = state
            .categories
            .values()
            .filter(|c| query.matches(c))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.id.cmp(&a.id));
        let page = matching
            .into_iter()
            .skip(bounds.offset as usize)
            .take(bounds.limit as usize)
            .map(|category| {
                let count = state
                    .products
                    .values()
                    .filter(|p| p.category_id == category.id)
                    .count() as u64;
                (category, count)
            })
            .collect();
        Ok(page)
    }

    async fn update_category(
        &self,
        id: i32,
        input: UpdateCategory,
        expected_version: i32,
    ) -> CatalogResult<Option<Category>> {
        let mut state = self.state.write().await;
        let key = name_key(&input.name);
        let duplicate = state
            .categories
            .values()
            .any(|c| c.id != id && name_key(&c.name) == key);
        let Some(stored) = state.categories.get_mut(&id) else {
            return Ok(None);
        };
        if stored.version != expected_version {
            return Ok(None);
        }
        if duplicate {
            return Err(CatalogError::DuplicateName(input.name));
        }
        stored.name = input.name;
        stored.version += 1;
        let updated = stored.clone();
        info!(category_id = %id, "Updated category");
        Ok(Some(updated))
    }

    async fn delete_category(&self, id: i32) -> CatalogResult<bool> {
        let mut state = self.state.write().await;
        let product_count = state
            .products
            .values()
            .filter(|p| p.category_id == id)
            .count() as u64;
        if product_count > 0 {
            return Err(CatalogError::CategoryInUse { id, product_count });
        }
        let removed = state.categories.remove(&id).is_some();
        if removed {
            info!(category_id = %id, "Deleted category");
        }
        Ok(removed)
    }

    async fn count_products_in(&self, category_id: i32) -> CatalogResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .products
            .values()
            .filter(|p| p.category_id == category_id)
            .count() as u64)
    }

    async fn category_name_taken(
        &self,
        key: &str,
        exclude_id: Option<i32>,
    ) -> CatalogResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .categories
            .values()
            .any(|c| exclude_id != Some(c.id) && name_key(&c.name) == key))
    }

    async fn create_product(&self, input: CreateProduct) -> CatalogResult<Product> {
        let mut state = self.state.write().await;
        if !state.categories.contains_key(&input.category_id) {
            return Err(CatalogError::CategoryMissing(input.category_id));
        }
        let key = name_key(&input.name);
        if state.products.values().any(|p| name_key(&p.name) == key) {
            return Err(CatalogError::DuplicateName(input.name));
        }
        state.next_product_id += 1;
        let product = Product {
            id: state.next_product_id,
            name: input.name,
            price: input.price,
            category_id: input.category_id,
            created_date: Utc::now(),
            version: 1,
        };
        state.products.insert(product.id, product.clone());
        info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    async fn find_product(&self, id: i32) -> CatalogResult<Option<Product>> {
        let state = self.state.read().await;
        Ok(state.products.get(&id).cloned())
    }

    async fn count_products(&self, query: &ProductQuery) -> CatalogResult<u64> {
        let state = self.state.read().await;
        Ok(state.products.values().filter(|p| query.matches(p)).count() as u64)
    }

    async fn list_products(
        &self,
        query: &ProductQuery,
        bounds: PageBounds,
    ) -> CatalogResult<Vec<(Product, Option<String>)>> {
        let state = self.state.read().await;
        let mut matching: Vec<Product> = state
            .products
            .values()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.id.cmp(&a.id));
        let page = matching
            .into_iter()
            .skip(bounds.offset as usize)
            .take(bounds.limit as usize)
            .map(|product| {
                let category_name = state
                    .categories
                    .get(&product.category_id)
                    .map(|c| c.name.clone());
                (product, category_name)
            })
            .collect();
        Ok(page)
    }

    async fn update_product(
        &self,
        id: i32,
        input: UpdateProduct,
        expected_version: i32,
    ) -> CatalogResult<Option<Product>> {
        let mut state = self.state.write().await;
        let key = name_key(&input.name);
        let duplicate = state
            .products
            .values()
            .any(|p| p.id != id && name_key(&p.name) == key);
        let category_exists = state.categories.contains_key(&input.category_id);
        let Some(stored) = state.products.get_mut(&id) else {
            return Ok(None);
        };
        if stored.version != expected_version {
            return Ok(None);
        }
        if !category_exists {
            return Err(CatalogError::CategoryMissing(input.category_id));
        }
        if duplicate {
            return Err(CatalogError::DuplicateName(input.name));
        }
        stored.name = input.name;
        stored.price = input.price;
        stored.category_id = input.category_id;
        stored.version += 1;
        let updated = stored.clone();
        info!(product_id = %id, "Updated product");
        Ok(Some(updated))
    }

    async fn delete_product(&self, id: i32) -> CatalogResult<bool> {
        let mut state = self.state.write().await;
        let removed = state.products.remove(&id).is_some();
        if removed {
            info!(product_id = %id, "Deleted product");
        }
        Ok(removed)
    }

    async fn product_name_taken(
        &self,
        key: &str,
        exclude_id: Option<i32>,
    ) -> CatalogResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .products
            .values()
            .any(|p| exclude_id != Some(p.id) && name_key(&p.name) == key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str) -> CreateCategory {
        CreateCategory {
            name: name.to_string(),
        }
    }

    fn product(name: &str, price: f64, category_id: i32) -> CreateProduct {
        CreateProduct {
            name: name.to_string(),
            price,
            category_id,
        }
    }

    #[tokio::test]
    async fn assigns_sequential_ids_starting_at_one() {
        let repo = InMemoryCatalog::new();
        let first = repo.create_category(category("Beverages")).await.unwrap();
        let second = repo.create_category(category("Snacks")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.version, 1);
    }

    #[tokio::test]
    async fn rejects_duplicate_category_name_ignoring_case_and_whitespace() {
        let repo = InMemoryCatalog::new();
        repo.create_category(category("Beverages")).await.unwrap();

        let err = repo
            .create_category(category("  beverages "))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateName(_)));
    }

    #[tokio::test]
    async fn update_with_stale_version_writes_nothing() {
        let repo = InMemoryCatalog::new();
        let created = repo.create_category(category("Beverages")).await.unwrap();

        let input = UpdateCategory {
            id: created.id,
            name: "Drinks".to_string(),
            version: Some(99),
        };
        let outcome = repo.update_category(created.id, input, 99).await.unwrap();
        assert!(outcome.is_none());

        let stored = repo.find_category(created.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Beverages");
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn update_with_current_version_bumps_it() {
        let repo = InMemoryCatalog::new();
        let created = repo.create_category(category("Beverages")).await.unwrap();

        let input = UpdateCategory {
            id: created.id,
            name: "Drinks".to_string(),
            version: Some(1),
        };
        let updated = repo
            .update_category(created.id, input, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Drinks");
        assert_eq!(updated.version, 2);
    }

    #[tokio::test]
    async fn create_product_requires_existing_category() {
        let repo = InMemoryCatalog::new();
        let err = repo.create_product(product("Cola", 1.5, 42)).await.unwrap_err();
        assert!(matches!(err, CatalogError::CategoryMissing(42)));
    }

    #[tokio::test]
    async fn delete_category_with_products_is_rejected() {
        let repo = InMemoryCatalog::new();
        let beverages = repo.create_category(category("Beverages")).await.unwrap();
        repo.create_product(product("Cola", 1.5, beverages.id))
            .await
            .unwrap();
        repo.create_product(product("Juice", 2.5, beverages.id))
            .await
            .unwrap();

        let err = repo.delete_category(beverages.id).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::CategoryInUse {
                product_count: 2,
                ..
            }
        ));
        assert!(repo.find_category(beverages.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_of_unknown_id_reports_no_match() {
        let repo = InMemoryCatalog::new();
        assert!(!repo.delete_category(999).await.unwrap());
        assert!(!repo.delete_product(999).await.unwrap());
    }

    #[tokio::test]
    async fn lists_newest_first_with_offset_and_limit() {
        let repo = InMemoryCatalog::new();
        let cat = repo.create_category(category("Beverages")).await.unwrap();
        for i in 1..=5 {
            repo.create_product(product(&format!("Item {i}"), 1.0, cat.id))
                .await
                .unwrap();
        }

        let bounds = PageBounds {
            offset: 1,
            limit: 2,
        };
        let page = repo
            .list_products(&ProductQuery::default(), bounds)
            .await
            .unwrap();
        let ids: Vec<i32> = page.iter().map(|(p, _)| p.id).collect();
        assert_eq!(ids, vec![4, 3]);
        assert_eq!(page[0].1.as_deref(), Some("Beverages"));
    }

    #[tokio::test]
    async fn name_taken_ignores_the_excluded_row() {
        let repo = InMemoryCatalog::new();
        let beverages = repo.create_category(category("Beverages")).await.unwrap();

        assert!(repo.category_name_taken("beverages", None).await.unwrap());
        assert!(
            !repo
                .category_name_taken("beverages", Some(beverages.id))
                .await
                .unwrap()
        );
        assert!(!repo.category_name_taken("snacks", None).await.unwrap());
    }

    #[tokio::test]
    async fn counts_follow_the_filter() {
        let repo = InMemoryCatalog::new();
        let beverages = repo.create_category(category("Beverages")).await.unwrap();
        let snacks = repo.create_category(category("Snacks")).await.unwrap();
        repo.create_product(product("Cola", 1.5, beverages.id))
            .await
            .unwrap();
        repo.create_product(product("Cold Brew", 4.0, beverages.id))
            .await
            .unwrap();
        repo.create_product(product("Chips", 2.0, snacks.id))
            .await
            .unwrap();

        let query = ProductQuery {
            name: Some("col".to_string()),
            category_id: Some(beverages.id),
        };
        assert_eq!(repo.count_products(&query).await.unwrap(), 2);

        let only_snacks = ProductQuery {
            name: None,
            category_id: Some(snacks.id),
        };
        assert_eq!(repo.count_products(&only_snacks).await.unwrap(), 1);
    }
}
