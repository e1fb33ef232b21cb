//! Randomized product fixtures shared by integration tests.

#![allow(dead_code)]

use catalog_core::{Category, Product};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;

const NAMES: &[&str] = &[
    "Hat", "Pants", "Shirt", "Apple", "Banana", "Pots", "Towels", "Ford", "Chevy", "Hammer",
    "Wrench",
];

const DESCRIPTIONS: &[&str] = &[
    "Sturdy enough for daily use.",
    "Fresh from the morning delivery.",
    "Limited run, restocked weekly.",
    "Fits most standard sizes.",
    "Includes a one year warranty.",
];

/// Builds valid, unpersisted products with random field values.
pub struct ProductFactory;

impl ProductFactory {
    pub fn build() -> Product {
        let mut rng = rand::thread_rng();
        let description = if rng.gen_bool(0.8) {
            DESCRIPTIONS.choose(&mut rng).map(|text| text.to_string())
        } else {
            None
        };

        Product::new(
            *NAMES.choose(&mut rng).unwrap(),
            description,
            Decimal::new(rng.gen_range(50..=200_000), 2),
            rng.gen_bool(0.5),
            *Category::ALL.choose(&mut rng).unwrap(),
        )
    }

    pub fn build_batch(count: usize) -> Vec<Product> {
        (0..count).map(|_| Self::build()).collect()
    }
}
