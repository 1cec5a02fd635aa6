//! Dimension table reads
//!
//! The fact variant resolves surrogate keys from two small reference
//! tables: `dim_location` (filtered to one state) and `dim_date` (filtered
//! to the snapshot date).

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::debug;

use crate::model::{DateDimensionRow, LocationDimensionRow};

/// Read the location dimension for one state
pub async fn fetch_location_dimension(
    pool: &PgPool,
    state: &str,
) -> Result<Vec<LocationDimensionRow>> {
    let rows = sqlx::query_as::<_, LocationDimensionRow>(
        "SELECT location_id, zip_code FROM dim_location WHERE state = $1",
    )
    .bind(state)
    .fetch_all(pool)
    .await
    .context("Failed to query location dimension")?;

    debug!(state = %state, rows = rows.len(), "Fetched location dimension");

    Ok(rows)
}

/// Read the date dimension entry (if any) for one calendar date
///
/// An empty result is not an error here; it surfaces downstream as fact
/// rows dropping out of the date join.
pub async fn fetch_date_dimension(pool: &PgPool, date: NaiveDate) -> Result<Vec<DateDimensionRow>> {
    let rows = sqlx::query_as::<_, DateDimensionRow>(
        "SELECT date_id, date FROM dim_date WHERE date = $1",
    )
    .bind(date)
    .fetch_all(pool)
    .await
    .context("Failed to query date dimension")?;

    debug!(date = %date, rows = rows.len(), "Fetched date dimension");

    Ok(rows)
}
