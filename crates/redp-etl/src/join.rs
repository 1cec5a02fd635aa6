//! Dimension joins for the fact-table variant
//!
//! Two sequential inner joins attach surrogate keys to flattened rows:
//! location by zip code, then date by snapshot date. Rows without a match
//! are dropped silently, which is what keeps unmapped zip codes (and
//! snapshot dates the warehouse has not seen yet) out of the fact table.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::model::{CrimeRateRow, DateDimensionRow, FactRow, LocationDimensionRow};

/// Inner-join rows against the location dimension on zip code
///
/// Returns each surviving row paired with its `location_id`, preserving
/// input order.
pub fn join_locations(
    rows: Vec<CrimeRateRow>,
    locations: &[LocationDimensionRow],
) -> Vec<(CrimeRateRow, i64)> {
    let by_zip: HashMap<&str, i64> = locations
        .iter()
        .map(|loc| (loc.zip_code.as_str(), loc.location_id))
        .collect();

    let total = rows.len();
    let joined: Vec<(CrimeRateRow, i64)> = rows
        .into_iter()
        .filter_map(|row| by_zip.get(row.zip_code.as_str()).copied().map(|id| (row, id)))
        .collect();

    debug!(
        input = total,
        matched = joined.len(),
        "Joined rows against location dimension"
    );

    joined
}

/// Inner-join location-keyed rows against the date dimension on snapshot date
///
/// The date surrogate key lands under the snapshot-specific name, producing
/// the final fact column set.
pub fn join_dates(rows: Vec<(CrimeRateRow, i64)>, dates: &[DateDimensionRow]) -> Vec<FactRow> {
    let by_date: HashMap<NaiveDate, i64> = dates
        .iter()
        .map(|dim| (dim.date, dim.date_id))
        .collect();

    let total = rows.len();
    let facts: Vec<FactRow> = rows
        .into_iter()
        .filter_map(|(row, location_id)| {
            by_date.get(&row.snapshot_date).copied().map(|date_id| FactRow {
                location_id,
                crime_type: row.crime_type,
                rate: row.rate,
                snapshot_date_id: date_id,
            })
        })
        .collect();

    debug!(
        input = total,
        matched = facts.len(),
        "Joined rows against date dimension"
    );

    facts
}
