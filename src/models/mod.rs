use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shown when a product row carries no usable image URL.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300?text=No+Image";

/// A single normalized product row. Immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique across the catalog.
    pub id: String,
    pub name: String,
    pub brand: String,
    pub category: Option<String>,
    /// Descriptive text / tags, feeds the content index.
    pub description: String,
    /// Always in [0, 5]; 0.0 when the source value was missing or invalid.
    pub rating: f32,
    /// First entry is the primary image. Never empty.
    pub image_urls: Vec<String>,
    pub price: Option<f64>,
}

impl Product {
    pub fn primary_image(&self) -> &str {
        self.image_urls
            .first()
            .map(String::as_str)
            .unwrap_or(PLACEHOLDER_IMAGE)
    }
}

/// The full product table, built once at startup and shared read-only by
/// every recommender.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    products: Vec<Product>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    /// Ids must already be unique; the loader deduplicates before calling.
    pub fn new(products: Vec<Product>) -> Self {
        let by_id = products
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.id.clone(), idx))
            .collect();
        Self { products, by_id }
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.by_id.get(id).map(|&idx| &self.products[idx])
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.products.iter()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }
}

/// One observed rating. `user_id` 0 is reserved for guests and never
/// produces personalized recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEvent {
    pub user_id: u32,
    pub product_id: String,
    pub rating: f32,
}

/// A catalog entry paired with the score that ranked it.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredProduct {
    pub product: Product,
    pub score: f32,
}

/// Ordered, deduplicated result list, at most `top_n` long.
pub type Recommendations = Vec<ScoredProduct>;
