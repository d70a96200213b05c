//! In-memory `ListingStore` for handler and router tests.

use crate::error::AppError;
use crate::model::{Listing, MarketSummary, PriceBucket, PropertyTypeCount, ZipStats};
use crate::sql::{Clause, Predicate};
use crate::store::ListingStore;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Evaluates `Predicate::clauses` the way the SQL renders them, over a fixed row set.
pub struct MemoryStore {
    rows: Vec<Listing>,
    pub healthy: bool,
    pub broken: bool,
    /// Every predicate received, tagged with the call that received it.
    pub calls: Mutex<Vec<(&'static str, Predicate)>>,
}

impl MemoryStore {
    pub fn new(rows: Vec<Listing>) -> Self {
        MemoryStore {
            rows,
            healthy: true,
            broken: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn fail_if_broken(&self) -> Result<(), AppError> {
        if self.broken {
            return Err(AppError::Db(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn matching(&self, predicate: &Predicate) -> Vec<&Listing> {
        self.rows
            .iter()
            .filter(|l| predicate.clauses.iter().all(|c| matches(c, l)))
            .collect()
    }

    /// Matching rows with a positive price, after recording the call.
    fn priced(&self, call: &'static str, predicate: &Predicate) -> Result<Vec<&Listing>, AppError> {
        self.calls.lock().unwrap().push((call, predicate.clone()));
        self.fail_if_broken()?;
        Ok(self
            .matching(predicate)
            .into_iter()
            .filter(|l| l.price > 0.0)
            .collect())
    }
}

/// Continuous median, as `percentile_cont(0.5)`.
fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

fn price_per_sqft(rows: &[&Listing]) -> Vec<f64> {
    rows.iter()
        .filter_map(|l| match l.square_feet {
            Some(sq) if sq > 0 => Some(l.price / sq as f64),
            _ => None,
        })
        .collect()
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches(clause: &Clause, l: &Listing) -> bool {
    match clause {
        Clause::City(v) => eq_ignore_case(&l.city, v),
        Clause::ZipCode(v) => l.zip_code == *v,
        Clause::MinPrice(v) => l.price >= *v,
        Clause::MaxPrice(v) => l.price <= *v,
        Clause::MinBedrooms(v) => l.bedrooms.is_some_and(|b| b >= *v),
        Clause::MinBathrooms(v) => l.bathrooms.is_some_and(|b| b >= *v),
        Clause::PropertyType(v) => l.property_type.as_deref().is_some_and(|t| eq_ignore_case(t, v)),
        Clause::Keyword(v) => {
            contains_ignore_case(&l.address, v)
                || l.description.as_deref().is_some_and(|d| contains_ignore_case(d, v))
                || contains_ignore_case(&l.city, v)
        }
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn count(&self, predicate: &Predicate) -> Result<i64, AppError> {
        self.calls.lock().unwrap().push(("count", predicate.clone()));
        self.fail_if_broken()?;
        Ok(self.matching(predicate).len() as i64)
    }

    async fn search(&self, predicate: &Predicate, limit: i64, offset: i64) -> Result<Vec<Listing>, AppError> {
        self.calls.lock().unwrap().push(("search", predicate.clone()));
        self.fail_if_broken()?;
        let mut rows = self.matching(predicate);
        rows.sort_by(|a, b| b.listing_date.cmp(&a.listing_date).then(b.id.cmp(&a.id)));
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Listing, AppError> {
        self.fail_if_broken()?;
        self.rows
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    async fn ping(&self) -> Result<(), AppError> {
        if self.healthy {
            Ok(())
        } else {
            Err(AppError::Db(sqlx::Error::PoolClosed))
        }
    }

    async fn summary(&self, predicate: &Predicate) -> Result<MarketSummary, AppError> {
        let rows = self.priced("summary", predicate)?;
        let beds: Vec<f64> = rows
            .iter()
            .filter_map(|l| l.bedrooms.filter(|b| *b > 0))
            .map(|b| b as f64)
            .collect();
        Ok(MarketSummary {
            count: rows.len() as i64,
            median_price: median(rows.iter().map(|l| l.price).collect()),
            median_price_per_sqft: median(price_per_sqft(&rows)),
            avg_beds: (!beds.is_empty()).then(|| beds.iter().sum::<f64>() / beds.len() as f64),
        })
    }

    async fn price_histogram(&self, predicate: &Predicate, bucket_size: i64) -> Result<Vec<PriceBucket>, AppError> {
        let rows = self.priced("price_histogram", predicate)?;
        let mut buckets: BTreeMap<i64, i64> = BTreeMap::new();
        for l in rows {
            let min = (l.price / bucket_size as f64).floor() as i64 * bucket_size;
            *buckets.entry(min).or_default() += 1;
        }
        Ok(buckets
            .into_iter()
            .map(|(bucket_min, count)| PriceBucket {
                bucket_min,
                bucket_max: bucket_min + bucket_size - 1,
                count,
            })
            .collect())
    }

    async fn median_by_zip(&self, predicate: &Predicate, limit: i64) -> Result<Vec<ZipStats>, AppError> {
        let rows = self.priced("median_by_zip", predicate)?;
        let mut by_zip: BTreeMap<&str, Vec<&Listing>> = BTreeMap::new();
        for l in rows {
            by_zip.entry(l.zip_code.as_str()).or_default().push(l);
        }
        let mut stats: Vec<ZipStats> = by_zip
            .into_iter()
            .map(|(zip, rows)| ZipStats {
                zip_code: zip.to_string(),
                count: rows.len() as i64,
                median_price: median(rows.iter().map(|l| l.price).collect()).unwrap_or_default(),
                median_price_per_sqft: median(price_per_sqft(&rows)),
            })
            .collect();
        stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.zip_code.cmp(&b.zip_code)));
        stats.truncate(limit as usize);
        Ok(stats)
    }

    async fn property_type_counts(&self, predicate: &Predicate) -> Result<Vec<PropertyTypeCount>, AppError> {
        self.calls.lock().unwrap().push(("property_type_counts", predicate.clone()));
        self.fail_if_broken()?;
        let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
        for l in self.matching(predicate) {
            if let Some(t) = l.property_type.as_deref().filter(|t| !t.is_empty()) {
                *counts.entry(t).or_default() += 1;
            }
        }
        Ok(counts
            .into_iter()
            .map(|(t, count)| PropertyTypeCount {
                property_type: t.to_string(),
                count,
            })
            .collect())
    }
}

fn base_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

/// A listing in `city` at `price`, listed `id` days after a fixed base date.
pub fn listing(id: i64, city: &str, price: f64) -> Listing {
    Listing {
        id,
        mls_number: format!("MLS{id:06}"),
        address: format!("{id} Main St"),
        city: city.to_string(),
        state: "TX".to_string(),
        zip_code: "78701".to_string(),
        price,
        bedrooms: Some(3),
        bathrooms: Some(2.5),
        square_feet: Some(1800),
        lot_size: Some(0.2),
        year_built: Some(2004),
        property_type: Some("Single Family".to_string()),
        description: Some("Quiet street".to_string()),
        photo_url: None,
        listing_date: base_date() + Duration::days(id),
        status: Some("Active".to_string()),
        latitude: Some(30.27),
        longitude: Some(-97.74),
    }
}
