//! Dataset loading and normalization.
//!
//! Turns the raw product CSV into the canonical [`Catalog`] every
//! recommender reads. Column headers are matched case-insensitively
//! against a set of known aliases so the loader accepts the dataset in
//! the variants it ships in ("Name" vs "Product Name" and so on).

use crate::error::{EngineError, Result};
use crate::models::{Catalog, Product, RatingEvent, PLACEHOLDER_IMAGE};
use csv::StringRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

const ID_ALIASES: &[&str] = &["id", "uniq id", "product id", "prodid"];
const NAME_ALIASES: &[&str] = &["name", "product name"];
const BRAND_ALIASES: &[&str] = &["brand", "product brand"];
const CATEGORY_ALIASES: &[&str] = &["category", "product category"];
const DESCRIPTION_ALIASES: &[&str] = &["description", "tags", "product tags", "product description"];
const RATING_ALIASES: &[&str] = &["rating", "product rating"];
const IMAGE_ALIASES: &[&str] = &["imageurl", "image url", "image", "product image url"];
const PRICE_ALIASES: &[&str] = &["price", "list price", "product price"];

const USER_ALIASES: &[&str] = &["userid", "user id", "user"];
const EVENT_PRODUCT_ALIASES: &[&str] = &["productid", "product id", "product", "prodid", "id"];
const EVENT_RATING_ALIASES: &[&str] = &["rating", "ratingvalue", "rating value"];

/// Counts reported after a load; rows are kept or dropped per these rules,
/// never silently altered.
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    pub rows_read: usize,
    pub products: usize,
    pub dropped_missing_id: usize,
    pub dropped_duplicate_id: usize,
    pub clamped_ratings: usize,
}

/// Resolved column positions for the product table.
struct ProductColumns {
    id: Option<usize>,
    name: usize,
    brand: usize,
    category: Option<usize>,
    description: usize,
    rating: usize,
    image: usize,
    price: Option<usize>,
}

fn find_column(headers: &StringRecord, aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.trim().to_lowercase();
        aliases.iter().any(|a| h == *a)
    })
}

fn require_column(headers: &StringRecord, aliases: &[&str]) -> Result<usize> {
    find_column(headers, aliases).ok_or_else(|| {
        EngineError::DataLoad(format!(
            "required column missing (one of: {})",
            aliases.join(", ")
        ))
    })
}

impl ProductColumns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        Ok(Self {
            id: find_column(headers, ID_ALIASES),
            name: require_column(headers, NAME_ALIASES)?,
            brand: require_column(headers, BRAND_ALIASES)?,
            category: find_column(headers, CATEGORY_ALIASES),
            description: require_column(headers, DESCRIPTION_ALIASES)?,
            rating: require_column(headers, RATING_ALIASES)?,
            image: require_column(headers, IMAGE_ALIASES)?,
            price: find_column(headers, PRICE_ALIASES),
        })
    }
}

/// Trim and collapse internal whitespace runs to single spaces.
fn squish(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn field<'r>(record: &'r StringRecord, idx: usize) -> &'r str {
    record.get(idx).unwrap_or("").trim()
}

/// Out-of-range and non-numeric ratings become 0.0 so the product stays
/// visible without contributing a quality signal.
fn parse_rating(raw: &str, clamped: &mut usize) -> f32 {
    match raw.trim().parse::<f32>() {
        Ok(value) if (0.0..=5.0).contains(&value) => value,
        _ => {
            *clamped += 1;
            0.0
        }
    }
}

fn parse_images(raw: &str) -> Vec<String> {
    let urls: Vec<String> = raw
        .split('|')
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(String::from)
        .collect();
    if urls.is_empty() {
        vec![PLACEHOLDER_IMAGE.to_string()]
    } else {
        urls
    }
}

/// Load and normalize the product table from `path`.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let file = File::open(path.as_ref()).map_err(|e| {
        EngineError::DataLoad(format!("cannot open {}: {e}", path.as_ref().display()))
    })?;
    let (catalog, stats) = catalog_from_reader(file)?;
    info!(
        path = %path.as_ref().display(),
        products = stats.products,
        dropped_missing_id = stats.dropped_missing_id,
        dropped_duplicate_id = stats.dropped_duplicate_id,
        clamped_ratings = stats.clamped_ratings,
        "Catalog loaded"
    );
    Ok(catalog)
}

/// Reader-based variant used by `load_catalog` and by tests. Deterministic:
/// the same byte stream always yields a structurally identical catalog.
pub fn catalog_from_reader<R: Read>(reader: R) -> Result<(Catalog, LoadStats)> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = ProductColumns::resolve(&headers)?;

    let mut stats = LoadStats::default();
    let mut products: Vec<Product> = Vec::new();
    let mut seen_ids = std::collections::HashSet::new();

    for record in rdr.records() {
        let record = record?;
        stats.rows_read += 1;

        let name = squish(field(&record, columns.name));
        // Identity: explicit id column, else the name stands in.
        let id = columns
            .id
            .map(|idx| squish(field(&record, idx)))
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| name.clone());

        if id.is_empty() {
            stats.dropped_missing_id += 1;
            continue;
        }
        if !seen_ids.insert(id.clone()) {
            stats.dropped_duplicate_id += 1;
            continue;
        }

        let rating = parse_rating(field(&record, columns.rating), &mut stats.clamped_ratings);

        products.push(Product {
            id,
            name,
            brand: squish(field(&record, columns.brand)),
            category: columns
                .category
                .map(|idx| squish(field(&record, idx)))
                .filter(|c| !c.is_empty()),
            description: squish(field(&record, columns.description)),
            rating,
            image_urls: parse_images(field(&record, columns.image)),
            price: columns
                .price
                .and_then(|idx| field(&record, idx).parse::<f64>().ok()),
        });
    }

    if products.is_empty() {
        return Err(EngineError::DataLoad(
            "source contains no valid product rows".to_string(),
        ));
    }

    if stats.dropped_missing_id > 0 || stats.dropped_duplicate_id > 0 {
        warn!(
            dropped_missing_id = stats.dropped_missing_id,
            dropped_duplicate_id = stats.dropped_duplicate_id,
            "Dropped invalid product rows"
        );
    }

    stats.products = products.len();
    Ok((Catalog::new(products), stats))
}

/// Load the optional user-rating table feeding the collaborative model.
/// Rows with a non-numeric user id or rating are dropped and counted.
pub fn load_rating_events<P: AsRef<Path>>(path: P) -> Result<Vec<RatingEvent>> {
    let file = File::open(path.as_ref()).map_err(|e| {
        EngineError::DataLoad(format!("cannot open {}: {e}", path.as_ref().display()))
    })?;
    let events = rating_events_from_reader(file)?;
    info!(
        path = %path.as_ref().display(),
        events = events.len(),
        "Rating events loaded"
    );
    Ok(events)
}

pub fn rating_events_from_reader<R: Read>(reader: R) -> Result<Vec<RatingEvent>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let user_col = require_column(&headers, USER_ALIASES)?;
    let product_col = require_column(&headers, EVENT_PRODUCT_ALIASES)?;
    let rating_col = require_column(&headers, EVENT_RATING_ALIASES)?;

    let mut events = Vec::new();
    let mut dropped = 0usize;

    for record in rdr.records() {
        let record = record?;
        let user_id = field(&record, user_col).parse::<u32>();
        let rating = field(&record, rating_col).parse::<f32>();
        let product_id = squish(field(&record, product_col));

        match (user_id, rating) {
            (Ok(user_id), Ok(rating)) if !product_id.is_empty() => {
                events.push(RatingEvent {
                    user_id,
                    product_id,
                    rating: rating.clamp(0.0, 5.0),
                });
            }
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(dropped, "Dropped malformed rating events");
    }

    Ok(events)
}
