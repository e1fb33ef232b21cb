//! Catalog domain model.
//!
//! # Responsibility
//! - Define the product record and its category set.
//! - Own field validation and the JSON wire shape.

pub mod product;
