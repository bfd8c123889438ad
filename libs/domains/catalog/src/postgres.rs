//! PostgreSQL-backed implementation of [`CatalogRepository`]

use std::collections::HashMap;

use async_trait::async_trait;
use database::repository::BaseRepository;
use sea_orm::sea_query::{Expr, Func, IntoColumnRef, SimpleExpr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DeriveIden, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr,
};
use tracing::{info, warn};

use crate::entity::{categories, products};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    Category, CreateCategory, CreateProduct, Product, UpdateCategory, UpdateProduct,
};
use crate::pagination::PageBounds;
use crate::query::{CategoryQuery, ProductQuery};
use crate::repository::CatalogRepository;

#[derive(DeriveIden)]
struct Btrim;

/// Rows are unique on `LOWER(BTRIM(name))`; the lookup has to use the
/// same expression so it agrees with the index.
fn normalized_name_eq<C>(column: C, key: &str) -> SimpleExpr
where
    C: IntoColumnRef,
{
    Expr::expr(Func::lower(Func::cust(Btrim).arg(Expr::col(column)))).eq(key)
}

fn category_write_err(err: sea_orm::DbErr, name: String) -> CatalogError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => CatalogError::DuplicateName(name),
        _ => CatalogError::Database(err),
    }
}

fn product_write_err(err: sea_orm::DbErr, name: String, category_id: i32) -> CatalogError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => CatalogError::DuplicateName(name),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            CatalogError::CategoryMissing(category_id)
        }
        _ => CatalogError::Database(err),
    }
}

/// Catalog store on top of PostgreSQL.
///
/// Reads go through plain sea-orm selects; updates are compare-and-swap
/// on the `version` column, and constraint violations surface as the
/// matching domain errors instead of raw database ones.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    categories: BaseRepository<categories::Entity>,
    products: BaseRepository<products::Entity>,
}

impl PgCatalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            categories: BaseRepository::new(db.clone()),
            products: BaseRepository::new(db),
        }
    }

    fn db(&self) -> &DatabaseConnection {
        self.categories.db()
    }
}

#[async_trait]
impl CatalogRepository for PgCatalog {
    async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category> {
        let name = input.name.clone();
        let active = categories::ActiveModel::from(input);
        match self.categories.insert(active).await {
            Ok(model) => {
                info!(category_id = %model.id, "Created category");
                Ok(Category::from(model))
            }
            Err(err) => Err(category_write_err(err, name)),
        }
    }

    async fn find_category(&self, id: i32) -> CatalogResult<Option<Category>> {
        Ok(self.categories.find_by_id(id).await?.map(Category::from))
    }

    async fn count_categories(&self, query: &CategoryQuery) -> CatalogResult<u64> {
        Ok(categories::Entity::find()
            .filter(query.condition())
            .count(self.db())
            .await?)
    }

    async fn list_categories(
        &self,
        query: &CategoryQuery,
        bounds: PageBounds,
    ) -> CatalogResult<Vec<(Category, u64)>> {
        let rows = categories::Entity::find()
            .filter(query.condition())
            .order_by_desc(categories::Column::Id)
            .offset(bounds.offset)
            .limit(bounds.limit)
            .all(self.db())
            .await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        // One grouped query covers the whole page instead of a count per row.
        let ids: Vec<i32> = rows.iter().map(|model| model.id).collect();
        let counts: Vec<(i32, i64)> = products::Entity::find()
            .select_only()
            .column(products::Column::CategoryId)
            .column_as(products::Column::Id.count(), "count")
            .filter(products::Column::CategoryId.is_in(ids))
            .group_by(products::Column::CategoryId)
            .into_tuple()
            .all(self.db())
            .await?;
        let by_category: HashMap<i32, i64> = counts.into_iter().collect();

        Ok(rows
            .into_iter()
            .map(|model| {
                let count = by_category.get(&model.id).copied().unwrap_or(0) as u64;
                (Category::from(model), count)
            })
            .collect())
    }

    async fn update_category(
        &self,
        id: i32,
        input: UpdateCategory,
        expected_version: i32,
    ) -> CatalogResult<Option<Category>> {
        let name = input.name.clone();
        let result = categories::Entity::update_many()
            .col_expr(categories::Column::Name, Expr::value(input.name))
            .col_expr(categories::Column::Version, Expr::value(expected_version + 1))
            .filter(categories::Column::Id.eq(id))
            .filter(categories::Column::Version.eq(expected_version))
            .exec(self.db())
            .await;
        match result {
            Ok(res) if res.rows_affected == 0 => Ok(None),
            Ok(_) => {
                info!(category_id = %id, "Updated category");
                Ok(self.categories.find_by_id(id).await?.map(Category::from))
            }
            Err(err) => Err(category_write_err(err, name)),
        }
    }

    async fn delete_category(&self, id: i32) -> CatalogResult<bool> {
        match self.categories.delete_by_id(id).await {
            Ok(rows) => {
                if rows > 0 {
                    info!(category_id = %id, "Deleted category");
                }
                Ok(rows > 0)
            }
            Err(err) => match err.sql_err() {
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                    let product_count = self.count_products_in(id).await?;
                    Err(CatalogError::CategoryInUse { id, product_count })
                }
                _ => Err(CatalogError::Database(err)),
            },
        }
    }

    async fn count_products_in(&self, category_id: i32) -> CatalogResult<u64> {
        Ok(products::Entity::find()
            .filter(products::Column::CategoryId.eq(category_id))
            .count(self.db())
            .await?)
    }

    async fn category_name_taken(
        &self,
        key: &str,
        exclude_id: Option<i32>,
    ) -> CatalogResult<bool> {
        let mut select = categories::Entity::find()
            .filter(normalized_name_eq(categories::Column::Name, key));
        if let Some(id) = exclude_id {
            select = select.filter(categories::Column::Id.ne(id));
        }
        Ok(select.count(self.db()).await? > 0)
    }

    async fn create_product(&self, input: CreateProduct) -> CatalogResult<Product> {
        let name = input.name.clone();
        let category_id = input.category_id;
        let active = products::ActiveModel::from(input);
        match self.products.insert(active).await {
            Ok(model) => {
                info!(product_id = %model.id, "Created product");
                Ok(Product::from(model))
            }
            Err(err) => Err(product_write_err(err, name, category_id)),
        }
    }

    async fn find_product(&self, id: i32) -> CatalogResult<Option<Product>> {
        Ok(self.products.find_by_id(id).await?.map(Product::from))
    }

    async fn count_products(&self, query: &ProductQuery) -> CatalogResult<u64> {
        Ok(products::Entity::find()
            .filter(query.condition())
            .count(self.db())
            .await?)
    }

    async fn list_products(
        &self,
        query: &ProductQuery,
        bounds: PageBounds,
    ) -> CatalogResult<Vec<(Product, Option<String>)>> {
        let rows = products::Entity::find()
            .find_also_related(categories::Entity)
            .filter(query.condition())
            .order_by_desc(products::Column::Id)
            .offset(bounds.offset)
            .limit(bounds.limit)
            .all(self.db())
            .await?;
        Ok(rows
            .into_iter()
            .map(|(product, category)| {
                if category.is_none() {
                    warn!(product_id = product.id, "Product references a missing category");
                }
                (Product::from(product), category.map(|c| c.name))
            })
            .collect())
    }

    async fn update_product(
        &self,
        id: i32,
        input: UpdateProduct,
        expected_version: i32,
    ) -> CatalogResult<Option<Product>> {
        let name = input.name.clone();
        let category_id = input.category_id;
        let result = products::Entity::update_many()
            .col_expr(products::Column::Name, Expr::value(input.name))
            .col_expr(products::Column::Price, Expr::value(input.price))
            .col_expr(products::Column::CategoryId, Expr::value(input.category_id))
            .col_expr(products::Column::Version, Expr::value(expected_version + 1))
            .filter(products::Column::Id.eq(id))
            .filter(products::Column::Version.eq(expected_version))
            .exec(self.db())
            .await;
        match result {
            Ok(res) if res.rows_affected == 0 => Ok(None),
            Ok(_) => {
                info!(product_id = %id, "Updated product");
                Ok(self.products.find_by_id(id).await?.map(Product::from))
            }
            Err(err) => Err(product_write_err(err, name, category_id)),
        }
    }

    async fn delete_product(&self, id: i32) -> CatalogResult<bool> {
        let rows = self.products.delete_by_id(id).await?;
        if rows > 0 {
            info!(product_id = %id, "Deleted product");
        }
        Ok(rows > 0)
    }

    async fn product_name_taken(
        &self,
        key: &str,
        exclude_id: Option<i32>,
    ) -> CatalogResult<bool> {
        let mut select =
            products::Entity::find().filter(normalized_name_eq(products::Column::Name, key));
        if let Some(id) = exclude_id {
            select = select.filter(products::Column::Id.ne(id));
        }
        Ok(select.count(self.db()).await? > 0)
    }
}
