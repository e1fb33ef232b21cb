//! Core data access for the product catalog.
//! This crate owns the product record, its validation rules and its SQLite
//! persistence.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use db::{init_db, DbError};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::product::{
    Category, DataValidationError, Product, ProductId, ProductValidationError,
};
pub use repo::product_repo::{
    ProductListQuery, ProductQuery, ProductRepository, RepoError, RepoResult,
    SqliteProductRepository,
};
pub use service::product_service::ProductService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
