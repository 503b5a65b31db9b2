//! Statistics over a snapshot
//!
//! This module summarizes a set of records: overall counts and prices,
//! the rating distribution, and a per-category breakdown.

use crate::output::snapshot::read_snapshot;
use crate::record::NormalizedRecord;
use crate::PersistenceError;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Label used for records with no category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Per-category figures
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStatistics {
    pub category: String,
    pub count: u64,
    pub average_price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub average_rating: Option<f64>,
}

/// Snapshot statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotStatistics {
    /// Total number of records
    pub total_records: u64,

    /// Mean of all known prices, rounded to 2 decimals
    pub average_price: Option<f64>,

    /// Count of records per star rating
    pub ratings_distribution: BTreeMap<u8, u64>,

    /// Categories ordered by count (descending), then name
    pub categories: Vec<CategoryStatistics>,
}

#[derive(Default)]
struct CategoryAccumulator {
    count: u64,
    prices: Vec<f64>,
    ratings: Vec<f64>,
}

impl SnapshotStatistics {
    /// Computes statistics from records
    pub fn from_records(records: &[NormalizedRecord]) -> Self {
        let prices: Vec<f64> = records.iter().filter_map(|r| r.price).collect();

        let mut ratings_distribution = BTreeMap::new();
        let mut by_category: HashMap<&str, CategoryAccumulator> = HashMap::new();

        for record in records {
            if let Some(rating) = record.rating {
                *ratings_distribution.entry(rating).or_insert(0) += 1;
            }

            let name = record
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(UNCATEGORIZED);
            let entry = by_category.entry(name).or_default();
            entry.count += 1;
            entry.prices.extend(record.price);
            entry.ratings.extend(record.rating.map(f64::from));
        }

        let mut categories: Vec<_> = by_category
            .into_iter()
            .map(|(name, acc)| CategoryStatistics {
                category: name.to_string(),
                count: acc.count,
                average_price: mean(&acc.prices),
                min_price: acc.prices.iter().copied().reduce(f64::min),
                max_price: acc.prices.iter().copied().reduce(f64::max),
                average_rating: mean(&acc.ratings),
            })
            .collect();
        categories.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.category.to_lowercase().cmp(&b.category.to_lowercase()))
        });

        Self {
            total_records: records.len() as u64,
            average_price: mean(&prices),
            ratings_distribution,
            categories,
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    Some((avg * 100.0).round() / 100.0)
}

/// Loads statistics from a snapshot file
///
/// A missing snapshot produces empty statistics.
pub fn load_statistics(path: &Path) -> Result<SnapshotStatistics, PersistenceError> {
    let records = read_snapshot(path)?;
    Ok(SnapshotStatistics::from_records(&records))
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &SnapshotStatistics) {
    println!("=== Snapshot Statistics ===\n");

    println!("Overview:");
    println!("  Total records: {}", stats.total_records);
    match stats.average_price {
        Some(avg) => println!("  Average price: {:.2}", avg),
        None => println!("  Average price: n/a"),
    }
    println!();

    println!("Ratings:");
    for (rating, count) in &stats.ratings_distribution {
        let percentage = if stats.total_records > 0 {
            (*count as f64 / stats.total_records as f64) * 100.0
        } else {
            0.0
        };
        println!("  {} stars: {} ({:.1}%)", rating, count, percentage);
    }
    println!();

    if !stats.categories.is_empty() {
        println!("Categories ({}):", stats.categories.len());
        for cat in &stats.categories {
            println!(
                "  {}: {} records, price avg {} (min {}, max {}), rating avg {}",
                cat.category,
                cat.count,
                format_optional(cat.average_price),
                format_optional(cat.min_price),
                format_optional(cat.max_price),
                format_optional(cat.average_rating),
            );
        }
    }
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}
