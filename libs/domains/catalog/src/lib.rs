//! Catalog Domain
//!
//! This module provides a complete domain implementation for managing a
//! product catalog: categories, the products inside them, and the paged
//! search both are served through.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Services   │  ← Business rules, check ordering, paging
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Records, views, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{
//!     handlers,
//!     repository::InMemoryCatalog,
//!     service::{CategoryService, ProductService},
//! };
//!
//! // One store shared by both services
//! let repository = InMemoryCatalog::new();
//! let categories = CategoryService::new(repository.clone());
//! let products = ProductService::new(repository);
//!
//! // Create Axum routers
//! let categories_router = handlers::categories_router(categories);
//! let products_router = handlers::products_router(products);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod postgres;
pub mod query;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{CatalogError, CatalogResult};
pub use models::{
    Category, CategoryView, CreateCategory, CreateProduct, Page, Product, ProductView,
    UpdateCategory, UpdateProduct,
};
pub use pagination::{PageParams, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
pub use postgres::PgCatalog;
pub use query::{CategoryQuery, ProductQuery};
pub use repository::{CatalogRepository, InMemoryCatalog};
pub use service::{CategoryService, ProductService};
