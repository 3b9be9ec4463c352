//! Whiskey log data — purchases and tasting sessions.
//!
//! The collection lives in a TOML file.  It is only ever read: reloading it
//! is the refresh action behind the pull gesture.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;

use super::error::LoadError;
use super::gesture::{RefreshAction, RefreshFuture};

// ───────────────────────────────────────── entries ───────────

/// A bottle bought.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Purchase {
    pub bottle: String,
    #[serde(default)]
    pub distillery: Option<String>,
    pub date: NaiveDate,
    /// List price.
    pub price: f64,
    /// Percentage off the list price (0–100).
    #[serde(default)]
    pub discount_pct: Option<f64>,
    #[serde(default)]
    pub store: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl Purchase {
    /// Price actually paid after any discount.
    pub fn paid(&self) -> f64 {
        let discount = self.discount_pct.unwrap_or(0.0);
        self.price * (1.0 - discount / 100.0)
    }
}

/// One tasting session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tasting {
    pub bottle: String,
    pub date: NaiveDate,
    /// 0–100
    pub rating: u8,
    #[serde(default)]
    pub nose: Option<String>,
    #[serde(default)]
    pub palate: Option<String>,
    #[serde(default)]
    pub finish: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

// ───────────────────────────────────────── collection ────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Collection {
    #[serde(default, rename = "purchase")]
    pub purchases: Vec<Purchase>,
    #[serde(default, rename = "tasting")]
    pub tastings: Vec<Tasting>,
}

impl Collection {
    /// Parse and validate a collection; entries come back newest first.
    pub fn parse(path: &Path, contents: &str) -> Result<Self, LoadError> {
        let mut collection: Collection =
            toml::from_str(contents).map_err(|source| LoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        collection.validate()?;
        collection.purchases.sort_by(|a, b| b.date.cmp(&a.date));
        collection.tastings.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(collection)
    }

    fn validate(&self) -> Result<(), LoadError> {
        for p in &self.purchases {
            if !p.price.is_finite() || p.price < 0.0 {
                return Err(invalid(&p.bottle, format!("price {} is negative", p.price)));
            }
            if let Some(d) = p.discount_pct {
                if !(0.0..=100.0).contains(&d) {
                    return Err(invalid(&p.bottle, format!("discount {d}% outside 0–100")));
                }
            }
        }
        for t in &self.tastings {
            if t.rating > 100 {
                return Err(invalid(&t.bottle, format!("rating {} above 100", t.rating)));
            }
        }
        Ok(())
    }

    pub fn total_spent(&self) -> f64 {
        self.purchases.iter().map(Purchase::paid).sum()
    }

    pub fn average_rating(&self) -> Option<f64> {
        if self.tastings.is_empty() {
            return None;
        }
        let sum: u32 = self.tastings.iter().map(|t| u32::from(t.rating)).sum();
        Some(f64::from(sum) / self.tastings.len() as f64)
    }
}

fn invalid(bottle: &str, reason: String) -> LoadError {
    LoadError::InvalidEntry {
        bottle: bottle.to_string(),
        reason,
    }
}

// ───────────────────────────────────────── loading ───────────

/// Reads a collection file asynchronously.  Cheap to clone; one instance is
/// handed to the refresh runtime.
#[derive(Debug, Clone)]
pub struct CollectionLoader {
    pub path: PathBuf,
    /// Artificial latency before reading, for slow-backend demos.
    pub delay: Duration,
}

impl CollectionLoader {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub async fn load(&self) -> Result<Collection, LoadError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| LoadError::Io {
                path: self.path.clone(),
                source,
            })?;
        let collection = Collection::parse(&self.path, &contents)?;
        tracing::debug!(
            path = %self.path.display(),
            purchases = collection.purchases.len(),
            tastings = collection.tastings.len(),
            "collection loaded"
        );
        Ok(collection)
    }
}

impl RefreshAction for CollectionLoader {
    type Output = Collection;

    fn refresh(&self) -> RefreshFuture<Collection> {
        let loader = self.clone();
        Box::pin(async move { Ok(loader.load().await?) })
    }
}

/// Example file printed by `--print-sample`.
pub const SAMPLE_COLLECTION: &str = r#"# dram-pull collection
# Dates are YYYY-MM-DD.  Edit and pull down in either pane to reload.

[[purchase]]
bottle = "Lagavulin 16"
distillery = "Lagavulin"
date = "2024-03-02"
price = 89.99
discount_pct = 10
store = "Corner Wine & Spirits"

[[purchase]]
bottle = "Springbank 10"
distillery = "Springbank"
date = "2024-05-18"
price = 74.50

[[purchase]]
bottle = "Redbreast 12"
distillery = "Midleton"
date = "2023-12-09"
price = 65.00
note = "Holiday gift"

[[tasting]]
bottle = "Lagavulin 16"
date = "2024-03-09"
rating = 91
nose = "Peat smoke, iodine, dried fruit"
palate = "Sherry sweetness, brine"
finish = "Long, smoky"

[[tasting]]
bottle = "Springbank 10"
date = "2024-06-01"
rating = 87
nose = "Pear, light smoke"
note = "Better with a drop of water"
"#;
