pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::{CollaborativeConfig, ContentConfig, DataConfig, EngineConfig};
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use models::{Catalog, Product, RatingEvent, Recommendations, ScoredProduct};
pub use services::catalog::{load_catalog, load_rating_events};
pub use services::collaborative::{recommend_for_user, RatingMatrix};
pub use services::content::ContentIndex;
pub use services::rating::top_rated;
