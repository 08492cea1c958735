//! Global rating-based ranking.

use crate::models::{Catalog, Recommendations, ScoredProduct};
use tracing::debug;

/// Rank the whole catalog by rating descending and truncate to `top_n`.
///
/// Ties break on product id ascending so repeated calls on the same
/// catalog always return the same order.
pub fn top_rated(catalog: &Catalog, top_n: usize) -> Recommendations {
    let mut ranked: Vec<_> = catalog.iter().collect();
    ranked.sort_by(|a, b| {
        b.rating
            .partial_cmp(&a.rating)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    let result: Recommendations = ranked
        .into_iter()
        .take(top_n)
        .map(|p| ScoredProduct {
            score: p.rating,
            product: p.clone(),
        })
        .collect();

    debug!(
        catalog_size = catalog.len(),
        top_n,
        returned = result.len(),
        "Top-rated ranking completed"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Product, PLACEHOLDER_IMAGE};

    fn create_test_product(id: &str, rating: f32) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            brand: "Acme".to_string(),
            category: None,
            description: String::new(),
            rating,
            image_urls: vec![PLACEHOLDER_IMAGE.to_string()],
            price: None,
        }
    }

    fn create_test_catalog() -> Catalog {
        Catalog::new(vec![
            create_test_product("p2", 3.0),
            create_test_product("p1", 4.5),
            create_test_product("p3", 4.5),
            create_test_product("p4", 0.0),
        ])
    }

    #[test]
    fn test_sorted_by_rating_then_id() {
        let catalog = create_test_catalog();
        let result = top_rated(&catalog, 10);

        let ids: Vec<&str> = result.iter().map(|s| s.product.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3", "p2", "p4"]);
    }

    #[test]
    fn test_truncates_to_top_n() {
        let catalog = create_test_catalog();
        assert_eq!(top_rated(&catalog, 2).len(), 2);
        assert_eq!(top_rated(&catalog, 0).len(), 0);
        // top_n past the catalog size returns everything.
        assert_eq!(top_rated(&catalog, 100).len(), 4);
    }

    #[test]
    fn test_deterministic_across_calls() {
        let catalog = create_test_catalog();
        let first: Vec<String> = top_rated(&catalog, 4)
            .into_iter()
            .map(|s| s.product.id)
            .collect();
        let second: Vec<String> = top_rated(&catalog, 4)
            .into_iter()
            .map(|s| s.product.id)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::new(Vec::new());
        assert!(top_rated(&catalog, 5).is_empty());
    }

    #[test]
    fn test_blue_widget_scenario() {
        let catalog = Catalog::new(vec![
            Product {
                id: "1".to_string(),
                name: "Blue Widget".to_string(),
                brand: "Acme".to_string(),
                category: None,
                description: String::new(),
                rating: 4.5,
                image_urls: vec![PLACEHOLDER_IMAGE.to_string()],
                price: None,
            },
            Product {
                id: "2".to_string(),
                name: "Red Widget".to_string(),
                brand: "Acme".to_string(),
                category: None,
                description: String::new(),
                rating: 3.0,
                image_urls: vec![PLACEHOLDER_IMAGE.to_string()],
                price: None,
            },
        ]);

        let result = top_rated(&catalog, 1);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].product.id, "1");
    }
}
