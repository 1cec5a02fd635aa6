//! Bulk loading into the destination tables
//!
//! Every invocation appends; there is no upsert or dedup, so re-running an
//! extract date duplicates its rows. Each load is a single multi-row
//! INSERT built with [`sqlx::QueryBuilder`].

use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;

use crate::model::{CrimeRateRow, FactRow};

/// Destination table for the dimension variant
pub const DIMENSION_TABLE: &str = "DIM_CRIME_RATE";

/// Destination table for the fact variant
pub const FACT_TABLE: &str = "FACT_CRIME_RATE";

/// Append flattened rows into `DIM_CRIME_RATE`
pub async fn load_dimension_rows(pool: &PgPool, rows: &[CrimeRateRow]) -> Result<u64> {
    if rows.is_empty() {
        return Ok(0);
    }

    let mut builder = dimension_insert(rows);
    let result = builder
        .build()
        .execute(pool)
        .await
        .with_context(|| format!("Failed to bulk-load {}", DIMENSION_TABLE))?;

    info!(table = DIMENSION_TABLE, rows = result.rows_affected(), "Bulk load complete");

    Ok(result.rows_affected())
}

/// Append enriched rows into `FACT_CRIME_RATE`
pub async fn load_fact_rows(pool: &PgPool, rows: &[FactRow]) -> Result<u64> {
    if rows.is_empty() {
        return Ok(0);
    }

    let mut builder = fact_insert(rows);
    let result = builder
        .build()
        .execute(pool)
        .await
        .with_context(|| format!("Failed to bulk-load {}", FACT_TABLE))?;

    info!(table = FACT_TABLE, rows = result.rows_affected(), "Bulk load complete");

    Ok(result.rows_affected())
}

fn dimension_insert(rows: &[CrimeRateRow]) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO {} (ZIP_CODE, CRIME_TYPE, RATE, AS_OF_DATE) ",
        DIMENSION_TABLE
    ));

    builder.push_values(rows, |mut b, row| {
        b.push_bind(&row.zip_code)
            .push_bind(&row.crime_type)
            .push_bind(row.rate)
            .push_bind(row.snapshot_date);
    });

    builder
}

fn fact_insert(rows: &[FactRow]) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO {} (LOCATION_ID, CRIME_TYPE, RATE, SNAPSHOT_DATE_ID) ",
        FACT_TABLE
    ));

    builder.push_values(rows, |mut b, row| {
        b.push_bind(row.location_id)
            .push_bind(&row.crime_type)
            .push_bind(row.rate)
            .push_bind(row.snapshot_date_id);
    });

    builder
}
