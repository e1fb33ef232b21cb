//! Product domain model.
//!
//! # Responsibility
//! - Define the canonical product record persisted by the catalog store.
//! - Validate field constraints before any write reaches SQLite.
//!
//! # Invariants
//! - `id` is `None` until the store assigns a surrogate key on create.
//! - `id` never changes once assigned.
//! - `price` is non-negative and is persisted with scale 2.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-assigned surrogate key.
pub type ProductId = i64;

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 250;
/// Persisted price scale (currency precision).
pub const PRICE_SCALE: u32 = 2;
/// Largest price representable with 14 significant digits at scale 2.
pub const MAX_PRICE: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Closed set of product categories.
///
/// Serialized with the upper-case names used by the persisted rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Unknown,
    Cloths,
    Food,
    Housewares,
    Automotive,
    Tools,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Unknown,
        Category::Cloths,
        Category::Food,
        Category::Housewares,
        Category::Automotive,
        Category::Tools,
    ];

    /// Returns the canonical upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Cloths => "CLOTHS",
            Self::Food => "FOOD",
            Self::Housewares => "HOUSEWARES",
            Self::Automotive => "AUTOMOTIVE",
            Self::Tools => "TOOLS",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DataValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| DataValidationError::new(format!("invalid category `{value}`")))
    }
}

/// Field-level constraint violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductValidationError {
    EmptyName,
    NameTooLong { chars: usize },
    DescriptionTooLong { chars: usize },
    NegativePrice(Decimal),
    PriceOutOfRange(Decimal),
}

impl Display for ProductValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "product name must not be empty"),
            Self::NameTooLong { chars } => write!(
                f,
                "product name has {chars} characters; at most {MAX_NAME_CHARS} allowed"
            ),
            Self::DescriptionTooLong { chars } => write!(
                f,
                "product description has {chars} characters; at most {MAX_DESCRIPTION_CHARS} allowed"
            ),
            Self::NegativePrice(price) => write!(f, "product price {price} must not be negative"),
            Self::PriceOutOfRange(price) => {
                write!(f, "product price {price} exceeds maximum {MAX_PRICE}")
            }
        }
    }
}

impl Error for ProductValidationError {}

/// Error raised when an external payload cannot be turned into a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataValidationError {
    message: String,
}

impl DataValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for DataValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid product data: {}", self.message)
    }
}

impl Error for DataValidationError {}

impl From<ProductValidationError> for DataValidationError {
    fn from(value: ProductValidationError) -> Self {
        Self::new(value.to_string())
    }
}

/// Canonical catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProductPayload")]
pub struct Product {
    /// `None` until the store assigns a key.
    pub id: Option<ProductId>,
    pub name: String,
    pub description: Option<String>,
    /// Serialized as a decimal string.
    pub price: Decimal,
    pub available: bool,
    pub category: Category,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ProductPayload {
    #[serde(default)]
    id: Option<ProductId>,
    name: String,
    #[serde(default)]
    description: Option<String>,
    price: Decimal,
    available: bool,
    category: Category,
}

impl TryFrom<ProductPayload> for Product {
    type Error = ProductValidationError;

    fn try_from(value: ProductPayload) -> Result<Self, Self::Error> {
        let product = Self {
            id: value.id,
            name: value.name,
            description: value.description,
            price: value.price,
            available: value.available,
            category: value.category,
        };
        product.validate()?;
        Ok(product)
    }
}

impl Product {
    /// Creates an unpersisted product (`id = None`).
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        price: Decimal,
        available: bool,
        category: Category,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description,
            price,
            available,
            category,
        }
    }

    /// Returns whether the store has assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Checks field constraints.
    ///
    /// # Errors
    /// - Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ProductValidationError> {
        if self.name.trim().is_empty() {
            return Err(ProductValidationError::EmptyName);
        }
        let name_chars = self.name.chars().count();
        if name_chars > MAX_NAME_CHARS {
            return Err(ProductValidationError::NameTooLong { chars: name_chars });
        }
        if let Some(description) = &self.description {
            let chars = description.chars().count();
            if chars > MAX_DESCRIPTION_CHARS {
                return Err(ProductValidationError::DescriptionTooLong { chars });
            }
        }
        if self.price < Decimal::ZERO {
            return Err(ProductValidationError::NegativePrice(self.price));
        }
        if self.price > MAX_PRICE {
            return Err(ProductValidationError::PriceOutOfRange(self.price));
        }
        Ok(())
    }

    /// Serializes to a JSON object keyed by field name.
    ///
    /// `price` is a decimal string and `category` the upper-case name.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Builds a product from a JSON object.
    ///
    /// The payload `id` is ignored; callers assign identity through the
    /// store, or copy it explicitly for updates.
    ///
    /// # Errors
    /// - Returns `DataValidationError` for missing fields, wrong types,
    ///   unknown categories or violated field constraints.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, DataValidationError> {
        let mut product = serde_json::from_value::<Product>(value.clone())
            .map_err(|err| DataValidationError::new(err.to_string()))?;
        product.id = None;
        Ok(product)
    }
}

/// Rounds a price to the persisted scale.
pub fn normalize_price(price: Decimal) -> Decimal {
    let mut normalized =
        price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    normalized.rescale(PRICE_SCALE);
    normalized
}

impl Display for Product {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "<Product {} id=[{id}]>", self.name),
            None => write!(f, "<Product {} id=[None]>", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_price, Category, MAX_PRICE};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!(Category::from_str("cloths").unwrap(), Category::Cloths);
        assert_eq!(Category::from_str(" TOOLS ").unwrap(), Category::Tools);
        assert!(Category::from_str("GADGETS").is_err());
    }

    #[test]
    fn normalize_price_pads_and_rounds_to_two_places() {
        assert_eq!(normalize_price(Decimal::new(125, 1)).to_string(), "12.50");
        assert_eq!(normalize_price(Decimal::new(12_345, 3)).to_string(), "12.35");
    }

    #[test]
    fn max_price_has_fourteen_digits() {
        assert_eq!(MAX_PRICE.to_string(), "999999999999.99");
    }
}
