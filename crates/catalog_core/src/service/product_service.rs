//! Product use-case service.
//!
//! # Responsibility
//! - Provide the record-manager entry points (`create`, `update`, `delete`,
//!   `all`, `find`, `find_by_*`) for core callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::product::{Category, DataValidationError, Product, ProductId};
use crate::repo::product_repo::{
    ProductListQuery, ProductQuery, ProductRepository, RepoResult,
};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Use-case service wrapper for product operations.
pub struct ProductService<R: ProductRepository> {
    repo: R,
}

impl<R: ProductRepository> ProductService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists an unpersisted product and assigns its id.
    pub fn create(&self, product: &mut Product) -> RepoResult<ProductId> {
        self.repo.create_product(product)
    }

    /// Overwrites the stored row for a persisted product.
    ///
    /// On success the record carries the price exactly as stored. Returns
    /// `RepoError::MissingId` for unpersisted products and
    /// `RepoError::NotFound` when the row is gone.
    pub fn update(&self, product: &mut Product) -> RepoResult<()> {
        self.repo.update_product(product)
    }

    pub fn delete(&self, product: &Product) -> RepoResult<()> {
        self.repo.delete_product(product)
    }

    /// Returns every product in insertion order.
    pub fn all(&self) -> RepoResult<Vec<Product>> {
        self.repo.list_products(&ProductListQuery::default())
    }

    pub fn find(&self, id: ProductId) -> RepoResult<Option<Product>> {
        self.repo.get_product(id)
    }

    pub fn find_by_name(&self, name: impl Into<String>) -> ProductQuery<'_, R> {
        ProductQuery::new(&self.repo, ProductListQuery::by_name(name))
    }

    pub fn find_by_availability(&self, available: bool) -> ProductQuery<'_, R> {
        ProductQuery::new(&self.repo, ProductListQuery::by_availability(available))
    }

    pub fn find_by_category(&self, category: Category) -> ProductQuery<'_, R> {
        ProductQuery::new(&self.repo, ProductListQuery::by_category(category))
    }

    pub fn find_by_price(&self, price: Decimal) -> ProductQuery<'_, R> {
        ProductQuery::new(&self.repo, ProductListQuery::by_price(price))
    }

    /// Same as `find_by_price` for textual input such as `"12.50"`.
    ///
    /// # Errors
    /// - Returns `DataValidationError` when `price` is not a decimal.
    pub fn find_by_price_str(
        &self,
        price: &str,
    ) -> Result<ProductQuery<'_, R>, DataValidationError> {
        let trimmed = price.trim().trim_matches('"');
        let parsed = Decimal::from_str(trimmed)
            .map_err(|_| DataValidationError::new(format!("invalid price `{price}`")))?;
        Ok(self.find_by_price(parsed))
    }

    /// Runs an arbitrary filter.
    pub fn query(&self, filter: ProductListQuery) -> ProductQuery<'_, R> {
        ProductQuery::new(&self.repo, filter)
    }

    /// Deletes every product; returns the number removed.
    pub fn remove_all(&self) -> RepoResult<usize> {
        self.repo.delete_all_products()
    }
}
