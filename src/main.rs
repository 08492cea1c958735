//! Demo caller standing in for the presentation layer: loads the dataset,
//! runs the three recommenders and prints the sections a storefront would
//! render.

use mercato_engine::{Engine, EngineConfig, Recommendations};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = EngineConfig::from_env();
    info!(catalog_path = %config.data.catalog_path, "Starting mercato-demo");

    let engine = Engine::from_config(config)?;
    let top_n = engine.default_top_n();
    let as_json = std::env::var("FORMAT").map(|f| f == "json").unwrap_or(false);

    print_section("Highly Rated Products", &engine.top_rated(top_n), as_json);

    if let Ok(query) = std::env::var("QUERY") {
        match engine.search(&query, top_n) {
            Ok(results) if results.is_empty() => {
                println!("\n=== Similar Products ===\nNo products match \"{query}\"");
            }
            Ok(results) => print_section("Similar Products", &results, as_json),
            Err(err) => warn!(%err, "Search rejected"),
        }
    }

    if let Ok(user_id) = std::env::var("USER_ID") {
        let user_id: u32 = user_id.parse().unwrap_or(0);
        match engine.for_user(user_id, top_n) {
            Ok(results) => print_section("Recommended for You", &results, as_json),
            // Cold start is normal: guests and unknown users simply get no
            // personalized section.
            Err(err) if err.is_cold_start() => {
                info!(user_id, "No rating history, skipping personalized section");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn print_section(title: &str, results: &Recommendations, as_json: bool) {
    println!("\n=== {title} ===");
    if as_json {
        println!("{}", serde_json::to_string_pretty(results).expect("results serialize"));
        return;
    }
    for (rank, item) in results.iter().enumerate() {
        println!(
            "{:>2}. {} [{}] - {:.1}/5 (score {:.3})",
            rank + 1,
            item.product.name,
            item.product.brand,
            item.product.rating,
            item.score
        );
    }
    if results.is_empty() {
        println!("(no products)");
    }
}
