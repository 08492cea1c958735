use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub data: DataConfig,
    pub content: ContentConfig,
    pub collaborative: CollaborativeConfig,
    /// List length callers get when they do not ask for a specific one.
    pub default_top_n: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    pub catalog_path: String,
    /// Optional user-rating table; without it the collaborative model is
    /// built empty and every user is a cold start.
    pub ratings_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    /// Drop common English words before indexing.
    pub use_stop_words: bool,
    /// Tokens shorter than this are discarded.
    pub min_token_len: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollaborativeConfig {
    /// Neighbors consulted per recommendation.
    pub k_neighbors: usize,
    /// Neighbors at or below this similarity are ignored.
    pub min_similarity: f32,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            use_stop_words: true,
            min_token_len: 2,
        }
    }
}

impl Default for CollaborativeConfig {
    fn default() -> Self {
        Self {
            k_neighbors: 10,
            min_similarity: 0.0,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                catalog_path: "clean_data.csv".to_string(),
                ratings_path: None,
            },
            content: ContentConfig::default(),
            collaborative: CollaborativeConfig::default(),
            default_top_n: 12,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        EngineConfig {
            data: DataConfig {
                catalog_path: env::var("CATALOG_PATH")
                    .unwrap_or_else(|_| "clean_data.csv".to_string()),
                ratings_path: env::var("RATINGS_PATH").ok(),
            },
            content: ContentConfig {
                use_stop_words: env::var("USE_STOP_WORDS")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .expect("USE_STOP_WORDS must be true or false"),
                min_token_len: env::var("MIN_TOKEN_LEN")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .expect("MIN_TOKEN_LEN must be a valid usize"),
            },
            collaborative: CollaborativeConfig {
                k_neighbors: env::var("K_NEIGHBORS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .expect("K_NEIGHBORS must be a valid usize"),
                min_similarity: env::var("MIN_SIMILARITY")
                    .unwrap_or_else(|_| "0.0".to_string())
                    .parse()
                    .expect("MIN_SIMILARITY must be a valid f32"),
            },
            default_top_n: env::var("DEFAULT_TOP_N")
                .unwrap_or_else(|_| "12".to_string())
                .parse()
                .expect("DEFAULT_TOP_N must be a valid usize"),
        }
    }
}
