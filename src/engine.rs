//! Facade bundling the catalog and both built models behind one handle.
//!
//! Construction happens once; every query afterwards is a pure read, so an
//! `Engine` can be shared across threads without locking.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::models::{Catalog, RatingEvent, Recommendations};
use crate::services::catalog::{load_catalog, load_rating_events};
use crate::services::collaborative::{recommend_for_user, RatingMatrix};
use crate::services::content::ContentIndex;
use crate::services::rating::top_rated;
use tracing::info;

#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    catalog: Catalog,
    content: ContentIndex,
    ratings: RatingMatrix,
}

impl Engine {
    /// Load the dataset from the configured paths and build both models.
    /// Fails fast with `DataLoad` on a bad source; nothing is half-built.
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        let catalog = load_catalog(&config.data.catalog_path)?;
        let events = match &config.data.ratings_path {
            Some(path) => load_rating_events(path)?,
            None => Vec::new(),
        };
        Ok(Self::new(catalog, &events, config))
    }

    /// Build from an already-loaded dataset.
    pub fn new(catalog: Catalog, events: &[RatingEvent], config: EngineConfig) -> Self {
        let content = ContentIndex::build(&catalog, &config.content);
        let ratings = RatingMatrix::build(events);
        info!(
            products = catalog.len(),
            users = ratings.n_users(),
            "Engine ready"
        );
        Self {
            config,
            catalog,
            content,
            ratings,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Globally top-rated products.
    pub fn top_rated(&self, top_n: usize) -> Recommendations {
        top_rated(&self.catalog, top_n)
    }

    /// Products textually similar to `query`.
    pub fn search(&self, query: &str, top_n: usize) -> Result<Recommendations> {
        self.content.query(&self.catalog, query, top_n)
    }

    /// Products favored by users with rating behavior similar to `user_id`.
    pub fn for_user(&self, user_id: u32, top_n: usize) -> Result<Recommendations> {
        recommend_for_user(
            &self.ratings,
            &self.catalog,
            user_id,
            &self.config.collaborative,
            top_n,
        )
    }

    pub fn default_top_n(&self) -> usize {
        self.config.default_top_n
    }
}
