//! Database library providing a PostgreSQL connector and utilities
//!
//! This library wraps SeaORM connection management with retry logic,
//! health checks, migration running, and a thin generic repository base.
//!
//! # Examples
//!
//! ```ignore
//! use database::postgres::{self, PostgresConfig};
//! use migration::Migrator;
//!
//! let db = postgres::connect_from_config(PostgresConfig::new(db_url)).await?;
//! postgres::run_migrations::<Migrator>(&db, "catalog_api").await?;
//! ```

pub mod common;
pub mod postgres;
pub mod repository;

// Re-exports for convenience
pub use common::RetryConfig;
pub use repository::BaseRepository;
