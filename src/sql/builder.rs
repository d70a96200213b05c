//! Builds the parameterized listing predicate and the statements that wrap it.
//!
//! The predicate is computed once per request and shared by the count and page
//! statements, so both always filter the same rows.

use super::params::BindValue;
use crate::model::SearchFilters;

/// Every listing column with the type it is read as.
const LISTING_COLUMNS: &[(&str, &str)] = &[
    ("id", "int8"),
    ("mls_number", "text"),
    ("address", "text"),
    ("city", "text"),
    ("state", "text"),
    ("zip_code", "text"),
    ("price", "float8"),
    ("bedrooms", "int8"),
    ("bathrooms", "float8"),
    ("square_feet", "int8"),
    ("lot_size", "float8"),
    ("year_built", "int8"),
    ("property_type", "text"),
    ("description", "text"),
    ("photo_url", "text"),
    ("listing_date", "timestamptz"),
    ("status", "text"),
    ("latitude", "float8"),
    ("longitude", "float8"),
];

/// Quote identifier for PostgreSQL (safe: only from config).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Quote a possibly schema-qualified table name (`schema.table`).
pub fn qualified_table(name: &str) -> String {
    name.split('.').map(quoted).collect::<Vec<_>>().join(".")
}

/// SELECT list: each column cast to the type `Listing` decodes, aliased back to its name.
fn select_column_list() -> String {
    LISTING_COLUMNS
        .iter()
        .map(|(name, ty)| format!("{q}::{ty} AS {q}", q = quoted(name)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One active filter condition. Variants are listed in the order clauses are emitted.
#[derive(Clone, Debug, PartialEq)]
pub enum Clause {
    /// Case-insensitive exact match.
    City(String),
    ZipCode(String),
    MinPrice(f64),
    MaxPrice(f64),
    MinBedrooms(i64),
    MinBathrooms(f64),
    /// Case-insensitive exact match.
    PropertyType(String),
    /// Case-insensitive substring of address, description or city.
    Keyword(String),
}

/// Active clauses for `filters`, in emission order.
///
/// String filters apply when non-empty and numeric bounds when strictly
/// positive, so an explicit `0` behaves like "unset".
pub fn active_clauses(filters: &SearchFilters) -> Vec<Clause> {
    let mut out = Vec::new();
    if !filters.city.is_empty() {
        out.push(Clause::City(filters.city.clone()));
    }
    if !filters.zip_code.is_empty() {
        out.push(Clause::ZipCode(filters.zip_code.clone()));
    }
    if filters.min_price > 0.0 {
        out.push(Clause::MinPrice(filters.min_price));
    }
    if filters.max_price > 0.0 {
        out.push(Clause::MaxPrice(filters.max_price));
    }
    if filters.bedrooms > 0 {
        out.push(Clause::MinBedrooms(filters.bedrooms));
    }
    if filters.bathrooms > 0.0 {
        out.push(Clause::MinBathrooms(filters.bathrooms));
    }
    if !filters.property_type.is_empty() {
        out.push(Clause::PropertyType(filters.property_type.clone()));
    }
    if !filters.keyword.is_empty() {
        out.push(Clause::Keyword(filters.keyword.clone()));
    }
    out
}

/// WHERE-clause body plus its bind values, free of ORDER BY / LIMIT / OFFSET.
#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
    pub sql: String,
    pub params: Vec<BindValue>,
    /// The conditions `sql` was rendered from.
    pub clauses: Vec<Clause>,
}

impl Predicate {
    fn push_param(&mut self, v: impl Into<BindValue>) -> usize {
        self.params.push(v.into());
        self.params.len()
    }

    fn push_clause(&mut self, clause: &Clause) {
        let sql = match clause {
            Clause::City(v) => format!("LOWER(city) = LOWER(${})", self.push_param(v.as_str())),
            Clause::ZipCode(v) => format!("zip_code = ${}", self.push_param(v.as_str())),
            Clause::MinPrice(v) => format!("price >= ${}", self.push_param(*v)),
            Clause::MaxPrice(v) => format!("price <= ${}", self.push_param(*v)),
            Clause::MinBedrooms(v) => format!("bedrooms >= ${}", self.push_param(*v)),
            Clause::MinBathrooms(v) => format!("bathrooms >= ${}", self.push_param(*v)),
            Clause::PropertyType(v) => {
                format!("LOWER(property_type) = LOWER(${})", self.push_param(v.as_str()))
            }
            Clause::Keyword(v) => {
                let pattern = format!("%{}%", v);
                let a = self.push_param(pattern.clone());
                let b = self.push_param(pattern.clone());
                let c = self.push_param(pattern);
                format!(
                    "(LOWER(address) LIKE LOWER(${a}) OR LOWER(description) LIKE LOWER(${b}) OR LOWER(city) LIKE LOWER(${c}))"
                )
            }
        };
        self.sql.push_str(" AND ");
        self.sql.push_str(&sql);
    }
}

/// A full statement ready to bind and execute.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

/// Translate filters into a conjunctive predicate starting from `1=1`.
pub fn build_predicate(filters: &SearchFilters) -> Predicate {
    let clauses = active_clauses(filters);
    let mut p = Predicate {
        sql: "1=1".to_string(),
        params: Vec::new(),
        clauses: Vec::new(),
    };
    for clause in &clauses {
        p.push_clause(clause);
    }
    p.clauses = clauses;
    p
}

/// One page of listings, newest first (`id DESC` breaks ties). LIMIT and OFFSET are bound after the predicate's params.
pub fn select_page(table: &str, predicate: &Predicate, limit: i64, offset: i64) -> QueryBuf {
    let mut params = predicate.params.clone();
    params.push(BindValue::Int(limit));
    let limit_ph = params.len();
    params.push(BindValue::Int(offset));
    let offset_ph = params.len();
    QueryBuf {
        sql: format!(
            "SELECT {} FROM {} WHERE {} ORDER BY listing_date DESC, id DESC LIMIT ${} OFFSET ${}",
            select_column_list(),
            qualified_table(table),
            predicate.sql,
            limit_ph,
            offset_ph
        ),
        params,
    }
}

/// Row count for the same predicate, without ordering or paging.
pub fn select_count(table: &str, predicate: &Predicate) -> QueryBuf {
    QueryBuf {
        sql: format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            qualified_table(table),
            predicate.sql
        ),
        params: predicate.params.clone(),
    }
}

/// SELECT by primary key. Caller binds the id as `$1`.
pub fn select_by_id(table: &str) -> String {
    format!(
        "SELECT {} FROM {} WHERE id = $1",
        select_column_list(),
        qualified_table(table)
    )
}

/// Price statistics only consider listings with a positive price.
const PRICED: &str = "price > 0";

/// `price / square_feet` for rows with a positive square footage.
const PRICE_PER_SQFT: &str = "price::float8 / square_feet";

/// Summary statistics (count, medians, average beds) over the same predicate.
pub fn select_summary(table: &str, predicate: &Predicate) -> QueryBuf {
    QueryBuf {
        sql: format!(
            "SELECT COUNT(*) AS count, \
             percentile_cont(0.5) WITHIN GROUP (ORDER BY price::float8) AS median_price, \
             percentile_cont(0.5) WITHIN GROUP (ORDER BY {PRICE_PER_SQFT}) FILTER (WHERE square_feet > 0) AS median_price_per_sqft, \
             (AVG(bedrooms) FILTER (WHERE bedrooms > 0))::float8 AS avg_beds \
             FROM {} WHERE {} AND {PRICED}",
            qualified_table(table),
            predicate.sql
        ),
        params: predicate.params.clone(),
    }
}

/// Listing counts per price bucket of `bucket_size`, ascending. Empty buckets are omitted.
pub fn select_price_histogram(table: &str, predicate: &Predicate, bucket_size: i64) -> QueryBuf {
    let mut params = predicate.params.clone();
    params.push(BindValue::Int(bucket_size));
    let size_ph = params.len();
    QueryBuf {
        sql: format!(
            "SELECT bucket_min, (bucket_min + ${size_ph} - 1)::int8 AS bucket_max, COUNT(*) AS count \
             FROM (SELECT (FLOOR(price::float8 / ${size_ph}::float8) * ${size_ph})::int8 AS bucket_min \
             FROM {} WHERE {} AND {PRICED}) buckets \
             GROUP BY bucket_min ORDER BY bucket_min",
            qualified_table(table),
            predicate.sql
        ),
        params,
    }
}

/// Per-zip count and medians for the `limit` zips with the most listings.
pub fn select_median_by_zip(table: &str, predicate: &Predicate, limit: i64) -> QueryBuf {
    let mut params = predicate.params.clone();
    params.push(BindValue::Int(limit));
    let limit_ph = params.len();
    QueryBuf {
        sql: format!(
            "SELECT zip_code::text AS zip_code, COUNT(*) AS count, \
             percentile_cont(0.5) WITHIN GROUP (ORDER BY price::float8) AS median_price, \
             percentile_cont(0.5) WITHIN GROUP (ORDER BY {PRICE_PER_SQFT}) FILTER (WHERE square_feet > 0) AS median_price_per_sqft \
             FROM {} WHERE {} AND {PRICED} \
             GROUP BY zip_code ORDER BY 2 DESC, 1 ASC LIMIT ${limit_ph}",
            qualified_table(table),
            predicate.sql
        ),
        params,
    }
}

/// Listing count per non-empty property type, alphabetical.
pub fn select_property_type_counts(table: &str, predicate: &Predicate) -> QueryBuf {
    QueryBuf {
        sql: format!(
            "SELECT property_type::text AS property_type, COUNT(*) AS count \
             FROM {} WHERE {} AND property_type IS NOT NULL AND property_type <> '' \
             GROUP BY property_type ORDER BY property_type",
            qualified_table(table),
            predicate.sql
        ),
        params: predicate.params.clone(),
    }
}
