//! User-based collaborative filtering.
//!
//! A dense user×item matrix is built once from the rating events; each
//! recommendation call finds the nearest neighbors of the target user by
//! cosine similarity and aggregates their ratings over products the
//! target has not rated yet.

use crate::config::CollaborativeConfig;
use crate::error::{EngineError, Result};
use crate::models::{Catalog, RatingEvent, Recommendations, ScoredProduct};
use crate::utils::score_key;
use ndarray::{Array2, ArrayView1};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Reserved for guests; never eligible for personalization.
pub const GUEST_USER_ID: u32 = 0;

/// Immutable user×item rating matrix. Rows are users, columns products,
/// cells the mean of all observed ratings for that pair (0.0 = unrated;
/// `rated` disambiguates genuine zero ratings).
#[derive(Debug)]
pub struct RatingMatrix {
    matrix: Array2<f32>,
    user_ids: Vec<u32>,
    user_index: BTreeMap<u32, usize>,
    product_ids: Vec<String>,
    rated: Vec<HashSet<usize>>,
}

impl RatingMatrix {
    /// Duplicate (user, product) events are aggregated by mean, which keeps
    /// the build independent of event order.
    pub fn build(events: &[RatingEvent]) -> Self {
        let mut sums: BTreeMap<(u32, String), (f32, u32)> = BTreeMap::new();
        for event in events {
            let cell = sums
                .entry((event.user_id, event.product_id.clone()))
                .or_insert((0.0, 0));
            cell.0 += event.rating;
            cell.1 += 1;
        }

        let mut user_index: BTreeMap<u32, usize> = BTreeMap::new();
        let mut product_index: BTreeMap<String, usize> = BTreeMap::new();
        for (user_id, product_id) in sums.keys() {
            let next = user_index.len();
            user_index.entry(*user_id).or_insert(next);
            let next = product_index.len();
            product_index.entry(product_id.clone()).or_insert(next);
        }

        let mut matrix = Array2::<f32>::zeros((user_index.len(), product_index.len()));
        let mut rated: Vec<HashSet<usize>> = vec![HashSet::new(); user_index.len()];
        for ((user_id, product_id), (sum, count)) in &sums {
            let row = user_index[user_id];
            let col = product_index[product_id];
            matrix[[row, col]] = sum / *count as f32;
            rated[row].insert(col);
        }

        let user_ids: Vec<u32> = user_index.keys().copied().collect();
        let mut product_ids = vec![String::new(); product_index.len()];
        for (product_id, &col) in &product_index {
            product_ids[col] = product_id.clone();
        }

        info!(
            users = user_ids.len(),
            products = product_ids.len(),
            events = events.len(),
            "Rating matrix built"
        );

        Self {
            matrix,
            user_ids,
            user_index,
            product_ids,
            rated,
        }
    }

    pub fn n_users(&self) -> usize {
        self.user_ids.len()
    }

    pub fn n_products(&self) -> usize {
        self.product_ids.len()
    }

    pub fn contains_user(&self, user_id: u32) -> bool {
        self.user_index.contains_key(&user_id)
    }

    fn row(&self, idx: usize) -> ArrayView1<'_, f32> {
        self.matrix.row(idx)
    }

    /// Cosine similarity between two users' rating vectors. Unknown users
    /// and zero-variance vectors score 0.0; symmetric by construction.
    pub fn user_similarity(&self, a: u32, b: u32) -> f32 {
        match (self.user_index.get(&a), self.user_index.get(&b)) {
            (Some(&ia), Some(&ib)) => cosine(self.row(ia), self.row(ib)),
            _ => 0.0,
        }
    }
}

/// Guarded cosine: vectors with zero norm never divide, they score 0.0.
fn cosine(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    a.dot(&b) / (norm_a * norm_b)
}

/// Rank products favored by the target user's nearest neighbors.
///
/// Fails with [`EngineError::ColdStart`] for guests and unknown users; a
/// known user with no qualifying neighbor gets an empty (successful)
/// result. Products the target already rated are excluded, as are rated
/// products missing from the catalog.
pub fn recommend_for_user(
    matrix: &RatingMatrix,
    catalog: &Catalog,
    user_id: u32,
    config: &CollaborativeConfig,
    top_n: usize,
) -> Result<Recommendations> {
    if user_id == GUEST_USER_ID || !matrix.contains_user(user_id) {
        return Err(EngineError::ColdStart { user_id });
    }
    let target = matrix.user_index[&user_id];

    // Nearest neighbors above the similarity floor.
    let mut neighbors: Vec<(usize, f32)> = (0..matrix.n_users())
        .filter(|&idx| idx != target)
        .map(|idx| (idx, cosine(matrix.row(target), matrix.row(idx))))
        .filter(|(_, sim)| *sim > config.min_similarity && *sim > 0.0)
        .collect();
    neighbors.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| matrix.user_ids[a.0].cmp(&matrix.user_ids[b.0]))
    });
    neighbors.truncate(config.k_neighbors);

    if neighbors.is_empty() {
        debug!(user_id, "No neighbors above similarity threshold");
        return Ok(Vec::new());
    }

    // Similarity-weighted mean of neighbor ratings per unseen product.
    let target_rated = &matrix.rated[target];
    let mut scored: Vec<(usize, f32)> = Vec::new();
    for col in 0..matrix.n_products() {
        if target_rated.contains(&col) {
            continue;
        }
        let mut weighted_sum = 0.0f32;
        let mut weight_total = 0.0f32;
        for &(neighbor, sim) in &neighbors {
            if matrix.rated[neighbor].contains(&col) {
                weighted_sum += sim * matrix.matrix[[neighbor, col]];
                weight_total += sim;
            }
        }
        if weight_total > 0.0 {
            scored.push((col, weighted_sum / weight_total));
        }
    }

    // Candidates absent from the catalog cannot be displayed, skip them.
    let mut candidates: Vec<(f32, &crate::models::Product)> = scored
        .into_iter()
        .filter_map(|(col, score)| catalog.get(&matrix.product_ids[col]).map(|p| (score, p)))
        .collect();
    candidates.sort_by(|a, b| {
        score_key(b.0)
            .cmp(&score_key(a.0))
            .then_with(|| {
                b.1.rating
                    .partial_cmp(&a.1.rating)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.1.id.cmp(&b.1.id))
    });

    let result: Recommendations = candidates
        .into_iter()
        .take(top_n)
        .map(|(score, p)| ScoredProduct {
            product: p.clone(),
            score,
        })
        .collect();

    debug!(
        user_id,
        neighbors = neighbors.len(),
        returned = result.len(),
        "Collaborative recommendation completed"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Product, PLACEHOLDER_IMAGE};

    fn event(user_id: u32, product_id: &str, rating: f32) -> RatingEvent {
        RatingEvent {
            user_id,
            product_id: product_id.to_string(),
            rating,
        }
    }

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

    fn widget_catalog() -> Catalog {
        Catalog::new(vec![
            create_test_product("p1", 4.5),
            create_test_product("p2", 3.0),
            create_test_product("p3", 4.0),
            create_test_product("p4", 2.0),
        ])
    }

    #[test]
    fn test_mean_aggregation_of_duplicates() {
        let matrix = RatingMatrix::build(&[
            event(1, "p1", 2.0),
            event(1, "p1", 4.0),
        ]);
        assert_eq!(matrix.matrix[[0, 0]], 3.0);
    }

    #[test]
    fn test_build_is_order_independent() {
        let forward = RatingMatrix::build(&[
            event(1, "p1", 5.0),
            event(2, "p2", 3.0),
            event(1, "p2", 4.0),
        ]);
        let reversed = RatingMatrix::build(&[
            event(1, "p2", 4.0),
            event(2, "p2", 3.0),
            event(1, "p1", 5.0),
        ]);
        assert_eq!(forward.matrix, reversed.matrix);
        assert_eq!(forward.product_ids, reversed.product_ids);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let matrix = RatingMatrix::build(&[
            event(1, "p1", 5.0),
            event(1, "p2", 3.0),
            event(2, "p1", 4.0),
            event(2, "p3", 2.0),
        ]);
        let ab = matrix.user_similarity(1, 2);
        let ba = matrix.user_similarity(2, 1);
        assert_eq!(ab, ba);
        assert!(ab > 0.0);
    }

    #[test]
    fn test_zero_variance_vector_scores_zero() {
        // User 3 only rated a product with value 0.0; their vector has zero
        // norm and must never produce NaN.
        let matrix = RatingMatrix::build(&[
            event(1, "p1", 5.0),
            event(3, "p1", 0.0),
        ]);
        let sim = matrix.user_similarity(1, 3);
        assert_eq!(sim, 0.0);
        assert!(!sim.is_nan());
    }

    #[test]
    fn test_guest_user_is_cold_start() {
        let matrix = RatingMatrix::build(&[event(1, "p1", 5.0)]);
        let catalog = widget_catalog();
        let err = recommend_for_user(
            &matrix,
            &catalog,
            GUEST_USER_ID,
            &CollaborativeConfig::default(),
            5,
        )
        .unwrap_err();
        assert!(err.is_cold_start());
    }

    #[test]
    fn test_unknown_user_is_cold_start() {
        let matrix = RatingMatrix::build(&[event(1, "p1", 5.0)]);
        let catalog = widget_catalog();
        let err =
            recommend_for_user(&matrix, &catalog, 99, &CollaborativeConfig::default(), 5)
                .unwrap_err();
        assert!(matches!(err, EngineError::ColdStart { user_id: 99 }));
    }

    #[test]
    fn test_rated_products_excluded() {
        // Users 1 and 2 agree on p1/p2; user 2 also rated p3. User 1 should
        // only be offered products they have not rated themselves.
        let matrix = RatingMatrix::build(&[
            event(1, "p1", 5.0),
            event(1, "p2", 3.0),
            event(2, "p1", 4.0),
            event(2, "p2", 3.0),
            event(2, "p3", 5.0),
        ]);
        let catalog = widget_catalog();

        let result =
            recommend_for_user(&matrix, &catalog, 1, &CollaborativeConfig::default(), 5)
                .unwrap();

        let ids: Vec<&str> = result.iter().map(|s| s.product.id.as_str()).collect();
        assert!(!ids.contains(&"p1"));
        assert!(!ids.contains(&"p2"));
        assert_eq!(ids, vec!["p3"]);
    }

    #[test]
    fn test_two_user_scenario_only_shared_history() {
        // Both users rated the same two products, so user 1 has no
        // unrated candidates left.
        let matrix = RatingMatrix::build(&[
            event(1, "p1", 5.0),
            event(1, "p2", 3.0),
            event(2, "p1", 4.0),
            event(2, "p2", 3.0),
        ]);
        let catalog = widget_catalog();

        let result =
            recommend_for_user(&matrix, &catalog, 1, &CollaborativeConfig::default(), 5)
                .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_no_neighbors_returns_empty() {
        // Users share no products; cosine over disjoint supports is 0.
        let matrix = RatingMatrix::build(&[
            event(1, "p1", 5.0),
            event(2, "p2", 4.0),
        ]);
        let catalog = widget_catalog();

        let result =
            recommend_for_user(&matrix, &catalog, 1, &CollaborativeConfig::default(), 5)
                .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_weighted_scores_rank_candidates() {
        // User 1 is closer to user 2 than to user 3. Both neighbors rated
        // p3 and p4 with opposite preferences, so the ranking must follow
        // the more similar neighbor.
        let matrix = RatingMatrix::build(&[
            event(1, "p1", 5.0),
            event(1, "p2", 4.0),
            event(2, "p1", 5.0),
            event(2, "p2", 4.0),
            event(2, "p3", 5.0),
            event(2, "p4", 2.0),
            event(3, "p1", 1.0),
            event(3, "p2", 5.0),
            event(3, "p3", 2.0),
            event(3, "p4", 5.0),
        ]);
        let catalog = widget_catalog();

        let result =
            recommend_for_user(&matrix, &catalog, 1, &CollaborativeConfig::default(), 5)
                .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].product.id, "p3");
        assert_eq!(result[1].product.id, "p4");
        assert!(result[0].score > result[1].score);
    }

    #[test]
    fn test_candidates_missing_from_catalog_skipped() {
        let matrix = RatingMatrix::build(&[
            event(1, "p1", 5.0),
            event(2, "p1", 5.0),
            event(2, "ghost", 5.0),
        ]);
        let catalog = widget_catalog();

        let result =
            recommend_for_user(&matrix, &catalog, 1, &CollaborativeConfig::default(), 5)
                .unwrap();
        assert!(result.iter().all(|s| s.product.id != "ghost"));
    }

    #[test]
    fn test_top_n_truncation() {
        let matrix = RatingMatrix::build(&[
            event(1, "p1", 5.0),
            event(2, "p1", 5.0),
            event(2, "p2", 5.0),
            event(2, "p3", 4.0),
            event(2, "p4", 3.0),
        ]);
        let catalog = widget_catalog();

        let result =
            recommend_for_user(&matrix, &catalog, 1, &CollaborativeConfig::default(), 2)
                .unwrap();
        assert_eq!(result.len(), 2);
    }
}
