//! Business rules for categories and products
//!
//! The services own ordering of the checks: paging input is rejected
//! before any storage call, a path/payload id mismatch rejects the
//! request before anything is written, and uniqueness plus referential
//! checks run ahead of the write so the common failures surface as
//! domain errors rather than database ones.

use std::sync::Arc;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    CategoryView, CreateCategory, CreateProduct, Page, ProductView, UpdateCategory, UpdateProduct,
};
use crate::pagination::{total_pages, PageParams};
use crate::query::{name_key, CategoryQuery, ProductQuery};
use crate::repository::CatalogRepository;

/// Category operations on top of a [`CatalogRepository`].
pub struct CategoryService<R: CatalogRepository> {
    repository: Arc<R>,
}

impl<R: CatalogRepository> CategoryService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Creates a category. The name must be non-blank and free, ignoring
    /// case and surrounding whitespace.
    pub async fn create(&self, input: CreateCategory) -> CatalogResult<CategoryView> {
        let key = name_key(&input.name);
        if key.is_empty() {
            return Err(CatalogError::Validation(
                "name must not be blank".to_string(),
            ));
        }
        if self.repository.category_name_taken(&key, None).await? {
            return Err(CatalogError::DuplicateName(input.name));
        }
        let category = self.repository.create_category(input).await?;
        Ok(CategoryView::project(category, 0))
    }

    pub async fn get(&self, id: i32) -> CatalogResult<CategoryView> {
        let category = self
            .repository
            .find_category(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))?;
        let count = self.repository.count_products_in(id).await?;
        Ok(CategoryView::project(category, count))
    }

    /// Paged, filtered listing. `totalPages` comes from the filtered
    /// count, and a page beyond the last one yields empty items.
    pub async fn search(
        &self,
        query: CategoryQuery,
        params: PageParams,
    ) -> CatalogResult<Page<CategoryView>> {
        let bounds = params.bounds()?;
        let total = self.repository.count_categories(&query).await?;
        let rows = self.repository.list_categories(&query, bounds).await?;
        let items = rows
            .into_iter()
            .map(|(category, count)| CategoryView::project(category, count))
            .collect();
        Ok(Page {
            items,
            total_pages: total_pages(total, params.page_size as u64),
        })
    }

    /// Full-record update guarded by the record version. A missing
    /// `version` in the payload means "whatever is stored right now".
    pub async fn update(&self, path_id: i32, input: UpdateCategory) -> CatalogResult<CategoryView> {
        if path_id != input.id {
            return Err(CatalogError::IdMismatch {
                path_id,
                payload_id: input.id,
            });
        }
        let key = name_key(&input.name);
        if key.is_empty() {
            return Err(CatalogError::Validation(
                "name must not be blank".to_string(),
            ));
        }
        let current = self
            .repository
            .find_category(path_id)
            .await?
            .ok_or(CatalogError::CategoryNotFound(path_id))?;
        if self
            .repository
            .category_name_taken(&key, Some(path_id))
            .await?
        {
            return Err(CatalogError::DuplicateName(input.name));
        }
        let expected_version = input.version.unwrap_or(current.version);
        let updated = self
            .repository
            .update_category(path_id, input, expected_version)
            .await?
            .ok_or(CatalogError::ConcurrentModification {
                id: path_id,
                expected_version,
            })?;
        let count = self.repository.count_products_in(path_id).await?;
        Ok(CategoryView::project(updated, count))
    }

    /// Deletes a category, refusing while products still reference it.
    pub async fn delete(&self, id: i32) -> CatalogResult<()> {
        let product_count = self.repository.count_products_in(id).await?;
        if product_count > 0 {
            return Err(CatalogError::CategoryInUse { id, product_count });
        }
        if !self.repository.delete_category(id).await? {
            return Err(CatalogError::CategoryNotFound(id));
        }
        Ok(())
    }

    pub async fn product_count(&self, id: i32) -> CatalogResult<u64> {
        if self.repository.find_category(id).await?.is_none() {
            return Err(CatalogError::CategoryNotFound(id));
        }
        self.repository.count_products_in(id).await
    }

    /// Whether `raw` is already in use, ignoring case and surrounding
    /// whitespace. Blank input is a client error.
    pub async fn name_taken(&self, raw: &str) -> CatalogResult<bool> {
        let key = name_key(raw);
        if key.is_empty() {
            return Err(CatalogError::InvalidArgument(
                "name must not be blank".to_string(),
            ));
        }
        self.repository.category_name_taken(&key, None).await
    }
}

/// Product operations on top of a [`CatalogRepository`].
pub struct ProductService<R: CatalogRepository> {
    repository: Arc<R>,
}

impl<R: CatalogRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Creates a product. The category must exist and the name must be
    /// free, ignoring case and surrounding whitespace.
    pub async fn create(&self, input: CreateProduct) -> CatalogResult<ProductView> {
        let key = name_key(&input.name);
        if key.is_empty() {
            return Err(CatalogError::Validation(
                "name must not be blank".to_string(),
            ));
        }
        let category = self
            .repository
            .find_category(input.category_id)
            .await?
            .ok_or(CatalogError::CategoryMissing(input.category_id))?;
        if self.repository.product_name_taken(&key, None).await? {
            return Err(CatalogError::DuplicateName(input.name));
        }
        let product = self.repository.create_product(input).await?;
        Ok(ProductView::project(product, Some(category.name)))
    }

    pub async fn get(&self, id: i32) -> CatalogResult<ProductView> {
        let product = self
            .repository
            .find_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;
        let category_name = self
            .repository
            .find_category(product.category_id)
            .await?
            .map(|c| c.name);
        Ok(ProductView::project(product, category_name))
    }

    /// Paged listing filtered by name substring and/or category.
    pub async fn search(
        &self,
        query: ProductQuery,
        params: PageParams,
    ) -> CatalogResult<Page<ProductView>> {
        let bounds = params.bounds()?;
        let total = self.repository.count_products(&query).await?;
        let rows = self.repository.list_products(&query, bounds).await?;
        let items = rows
            .into_iter()
            .map(|(product, category_name)| ProductView::project(product, category_name))
            .collect();
        Ok(Page {
            items,
            total_pages: total_pages(total, params.page_size as u64),
        })
    }

    /// Full-record update guarded by the record version.
    pub async fn update(&self, path_id: i32, input: UpdateProduct) -> CatalogResult<ProductView> {
        if path_id != input.id {
            return Err(CatalogError::IdMismatch {
                path_id,
                payload_id: input.id,
            });
        }
        let key = name_key(&input.name);
        if key.is_empty() {
            return Err(CatalogError::Validation(
                "name must not be blank".to_string(),
            ));
        }
        let current = self
            .repository
            .find_product(path_id)
            .await?
            .ok_or(CatalogError::ProductNotFound(path_id))?;
        let category = self
            .repository
            .find_category(input.category_id)
            .await?
            .ok_or(CatalogError::CategoryMissing(input.category_id))?;
        if self
            .repository
            .product_name_taken(&key, Some(path_id))
            .await?
        {
            return Err(CatalogError::DuplicateName(input.name));
        }
        let expected_version = input.version.unwrap_or(current.version);
        let updated = self
            .repository
            .update_product(path_id, input, expected_version)
            .await?
            .ok_or(CatalogError::ConcurrentModification {
                id: path_id,
                expected_version,
            })?;
        Ok(ProductView::project(updated, Some(category.name)))
    }

    pub async fn delete(&self, id: i32) -> CatalogResult<()> {
        if !self.repository.delete_product(id).await? {
            return Err(CatalogError::ProductNotFound(id));
        }
        Ok(())
    }

    /// Whether `raw` is already in use, ignoring case and surrounding
    /// whitespace. Blank input is a client error.
    pub async fn name_taken(&self, raw: &str) -> CatalogResult<bool> {
        let key = name_key(raw);
        if key.is_empty() {
            return Err(CatalogError::InvalidArgument(
                "name must not be blank".to_string(),
            ));
        }
        self.repository.product_name_taken(&key, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Product};
    use crate::repository::MockCatalogRepository;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn stored_category(id: i32, name: &str, version: i32) -> Category {
        Category {
            id,
            name: name.to_string(),
            created_date: Utc::now(),
            version,
        }
    }

    fn stored_product(id: i32, name: &str, category_id: i32, version: i32) -> Product {
        Product {
            id,
            name: name.to_string(),
            price: 1.5,
            category_id,
            created_date: Utc::now(),
            version,
        }
    }

    #[tokio::test]
    async fn create_rejects_taken_name_without_inserting() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_category_name_taken()
            .with(eq("beverages"), eq(None::<i32>))
            .returning(|_, _| Ok(true));
        repo.expect_create_category().never();

        let service = CategoryService::new(repo);
        let err = service
            .create(CreateCategory {
                name: "  Beverages ".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateName(_)));
    }

    #[tokio::test]
    async fn create_rejects_blank_name_without_any_storage_call() {
        let repo = MockCatalogRepository::new();
        let service = CategoryService::new(repo);

        let err = service
            .create(CreateCategory {
                name: "   ".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn search_rejects_bad_paging_before_any_storage_call() {
        let repo = MockCatalogRepository::new();
        let service = CategoryService::new(repo);

        let params = PageParams {
            page: 0,
            page_size: 10,
        };
        let err = service
            .search(CategoryQuery::default(), params)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn search_total_pages_come_from_the_filtered_count() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_count_categories().returning(|_| Ok(25));
        repo.expect_list_categories().returning(|_, bounds| {
            assert_eq!(bounds.offset, 20);
            assert_eq!(bounds.limit, 10);
            Ok(vec![(stored_category(1, "Beverages", 1), 4)])
        });

        let service = CategoryService::new(repo);
        let params = PageParams {
            page: 3,
            page_size: 10,
        };
        let page = service
            .search(CategoryQuery::default(), params)
            .await
            .unwrap();
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].product_count, 4);
    }

    #[tokio::test]
    async fn update_with_mismatched_ids_touches_nothing() {
        let repo = MockCatalogRepository::new();
        let service = CategoryService::new(repo);

        let input = UpdateCategory {
            id: 7,
            name: "Drinks".to_string(),
            version: None,
        };
        let err = service.update(5, input).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::IdMismatch {
                path_id: 5,
                payload_id: 7,
            }
        ));
    }

    #[tokio::test]
    async fn update_maps_missed_compare_and_swap_to_conflict() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_find_category()
            .with(eq(5))
            .returning(|_| Ok(Some(stored_category(5, "Beverages", 2))));
        repo.expect_category_name_taken().returning(|_, _| Ok(false));
        repo.expect_update_category().returning(|_, _, _| Ok(None));

        let service = CategoryService::new(repo);
        let input = UpdateCategory {
            id: 5,
            name: "Drinks".to_string(),
            version: Some(1),
        };
        let err = service.update(5, input).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::ConcurrentModification {
                id: 5,
                expected_version: 1,
            }
        ));
    }

    #[tokio::test]
    async fn update_defaults_the_expected_version_to_the_stored_one() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_find_category()
            .returning(|_| Ok(Some(stored_category(5, "Beverages", 3))));
        repo.expect_category_name_taken().returning(|_, _| Ok(false));
        repo.expect_update_category()
            .withf(|id, _, expected| *id == 5 && *expected == 3)
            .returning(|id, input, expected| {
                Ok(Some(Category {
                    id,
                    name: input.name,
                    created_date: Utc::now(),
                    version: expected + 1,
                }))
            });
        repo.expect_count_products_in().returning(|_| Ok(0));

        let service = CategoryService::new(repo);
        let input = UpdateCategory {
            id: 5,
            name: "Drinks".to_string(),
            version: None,
        };
        let view = service.update(5, input).await.unwrap();
        assert_eq!(view.name, "Drinks");
        assert_eq!(view.version, 4);
    }

    #[tokio::test]
    async fn delete_refuses_categories_that_still_have_products() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_count_products_in().returning(|_| Ok(7));
        repo.expect_delete_category().never();

        let service = CategoryService::new(repo);
        let err = service.delete(3).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::CategoryInUse {
                id: 3,
                product_count: 7,
            }
        ));
    }

    #[tokio::test]
    async fn delete_of_unknown_category_is_not_found() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_count_products_in().returning(|_| Ok(0));
        repo.expect_delete_category().returning(|_| Ok(false));

        let service = CategoryService::new(repo);
        let err = service.delete(999).await.unwrap_err();
        assert!(matches!(err, CatalogError::CategoryNotFound(999)));
    }

    #[tokio::test]
    async fn check_name_rejects_blank_input_without_storage() {
        let repo = MockCatalogRepository::new();
        let service = CategoryService::new(repo);

        let err = service.name_taken("   ").await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn check_name_normalizes_before_asking_storage() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_category_name_taken()
            .with(eq("beverages"), eq(None::<i32>))
            .returning(|_, _| Ok(true));

        let service = CategoryService::new(repo);
        assert!(service.name_taken("  BEVERAGES ").await.unwrap());
    }

    #[tokio::test]
    async fn create_product_requires_an_existing_category() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_find_category().with(eq(42)).returning(|_| Ok(None));
        repo.expect_create_product().never();

        let service = ProductService::new(repo);
        let err = service
            .create(CreateProduct {
                name: "Cola".to_string(),
                price: 1.5,
                category_id: 42,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::CategoryMissing(42)));
    }

    #[tokio::test]
    async fn created_product_view_carries_the_category_name() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_find_category()
            .returning(|id| Ok(Some(stored_category(id, "Beverages", 1))));
        repo.expect_product_name_taken().returning(|_, _| Ok(false));
        repo.expect_create_product()
            .returning(|input| {
                Ok(Product {
                    id: 1,
                    name: input.name,
                    price: input.price,
                    category_id: input.category_id,
                    created_date: Utc::now(),
                    version: 1,
                })
            });

        let service = ProductService::new(repo);
        let view = service
            .create(CreateProduct {
                name: "Cola".to_string(),
                price: 1.5,
                category_id: 3,
            })
            .await
            .unwrap();
        assert_eq!(view.category_name.as_deref(), Some("Beverages"));
        assert_eq!(view.version, 1);
    }

    #[tokio::test]
    async fn product_get_resolves_the_category_name() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_find_product()
            .with(eq(9))
            .returning(|id| Ok(Some(stored_product(id, "Cola", 3, 1))));
        repo.expect_find_category()
            .with(eq(3))
            .returning(|id| Ok(Some(stored_category(id, "Beverages", 1))));

        let service = ProductService::new(repo);
        let view = service.get(9).await.unwrap();
        assert_eq!(view.name, "Cola");
        assert_eq!(view.category_name.as_deref(), Some("Beverages"));
    }

    #[tokio::test]
    async fn product_delete_of_unknown_id_is_not_found() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_delete_product().returning(|_| Ok(false));

        let service = ProductService::new(repo);
        let err = service.delete(999).await.unwrap_err();
        assert!(matches!(err, CatalogError::ProductNotFound(999)));
    }
}
