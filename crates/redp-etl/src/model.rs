//! Row types flowing through the crime-rate pipeline

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One flattened crime-rate observation
///
/// Produced by the flattener: one row per (zip code, crime type) pair found
/// in a source document. `snapshot_date` is the wall-clock date at
/// processing time, not the extract date that selected the source objects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrimeRateRow {
    /// Zip code from the document's `Overall.Zipcode` field
    pub zip_code: String,
    /// Crime type name, upper-cased
    pub crime_type: String,
    /// Rate value coerced to a float
    pub rate: f64,
    /// Date the row was produced
    pub snapshot_date: NaiveDate,
}

impl CrimeRateRow {
    pub fn new(
        zip_code: impl Into<String>,
        crime_type: impl Into<String>,
        rate: f64,
        snapshot_date: NaiveDate,
    ) -> Self {
        Self {
            zip_code: zip_code.into(),
            crime_type: crime_type.into(),
            rate,
            snapshot_date,
        }
    }
}

/// A `dim_location` reference row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct LocationDimensionRow {
    /// Surrogate key
    pub location_id: i64,
    /// Zip code the surrogate key stands for
    pub zip_code: String,
}

/// A `dim_date` reference row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DateDimensionRow {
    /// Surrogate key
    pub date_id: i64,
    /// Calendar date the surrogate key stands for
    pub date: NaiveDate,
}

/// A fully enriched fact row, ready for `FACT_CRIME_RATE`
///
/// The inner join of [`CrimeRateRow`] with the location and date dimensions;
/// the date dimension's key is carried under the snapshot-specific name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactRow {
    pub location_id: i64,
    pub crime_type: String,
    pub rate: f64,
    pub snapshot_date_id: i64,
}
