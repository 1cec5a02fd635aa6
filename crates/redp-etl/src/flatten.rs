//! Crime document flattener
//!
//! Turns raw crime-statistic JSON documents into [`CrimeRateRow`]s. A
//! document looks like:
//!
//! ```json
//! {
//!   "Overall": { "Zipcode": "19801" },
//!   "Crime BreakDown": [
//!     { "Violent Crime Rates": { "Assault": "1.2", "Robbery": 0.5 } },
//!     { "Property Crime Rates": { "Burglary": "3.4" } }
//!   ]
//! }
//! ```
//!
//! Each breakdown entry carries one key whose name contains the substring
//! `"Crime Rates"`; its value maps crime-type names to rates encoded either
//! as JSON numbers or as numeric strings. Keys are scanned in document
//! declaration order and the first match wins.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use redp_common::{RedpError, Result};

use crate::model::CrimeRateRow;

/// Substring identifying the rate map inside a breakdown entry
pub const CRIME_RATES_MARKER: &str = "Crime Rates";

#[derive(Debug, Deserialize)]
struct CrimeDocument {
    #[serde(rename = "Overall")]
    overall: OverallSection,
    #[serde(rename = "Crime BreakDown")]
    crime_breakdown: Vec<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct OverallSection {
    #[serde(rename = "Zipcode")]
    zipcode: String,
}

/// Flattener for raw crime documents
///
/// The snapshot date is fixed at construction so every row produced by one
/// invocation carries the same date. Callers pass the wall-clock date at
/// processing time; the extract date that selected the objects plays no part
/// here.
pub struct CrimeFlattener {
    snapshot_date: NaiveDate,
}

impl CrimeFlattener {
    pub fn new(snapshot_date: NaiveDate) -> Self {
        Self { snapshot_date }
    }

    /// Flatten a batch of documents, preserving document order
    pub fn flatten_all(&self, payloads: &[Vec<u8>]) -> Result<Vec<CrimeRateRow>> {
        let mut rows = Vec::new();
        for payload in payloads {
            rows.extend(self.flatten_document(payload)?);
        }

        debug!(
            documents = payloads.len(),
            rows = rows.len(),
            "Flattened crime documents"
        );

        Ok(rows)
    }

    /// Flatten a single document into one row per crime type
    ///
    /// Fails if the payload is not valid JSON of the expected shape, if a
    /// breakdown entry has no key containing [`CRIME_RATES_MARKER`], or if a
    /// rate value cannot be coerced to a float.
    pub fn flatten_document(&self, payload: &[u8]) -> Result<Vec<CrimeRateRow>> {
        let doc: CrimeDocument = serde_json::from_slice(payload)?;
        let zip_code = doc.overall.zipcode;

        let mut rows = Vec::new();
        for entry in &doc.crime_breakdown {
            // First key containing the marker, in declaration order
            let marker_key = entry
                .keys()
                .find(|key| key.contains(CRIME_RATES_MARKER))
                .ok_or_else(|| {
                    RedpError::flatten(format!(
                        "no key containing \"{}\" in breakdown entry for zip {}",
                        CRIME_RATES_MARKER, zip_code
                    ))
                })?;

            let rates = entry[marker_key].as_object().ok_or_else(|| {
                RedpError::flatten(format!(
                    "\"{}\" for zip {} is not an object",
                    marker_key, zip_code
                ))
            })?;

            for (crime_type, value) in rates {
                let rate = coerce_rate(value).map_err(|err| {
                    RedpError::flatten(format!(
                        "rate for \"{}\" in zip {}: {}",
                        crime_type, zip_code, err
                    ))
                })?;

                rows.push(CrimeRateRow::new(
                    zip_code.clone(),
                    crime_type.to_uppercase(),
                    rate,
                    self.snapshot_date,
                ));
            }
        }

        Ok(rows)
    }
}

/// Coerce a JSON value to a float rate
///
/// Accepts JSON numbers and numeric strings; anything else is an error.
fn coerce_rate(value: &Value) -> std::result::Result<f64, String> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("number {} is not representable as f64", n)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("string \"{}\" is not numeric", s)),
        other => Err(format!("unexpected value type: {}", other)),
    }
}
