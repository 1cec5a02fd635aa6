//! End-to-end pipeline tests
//!
//! Run the full fetch → flatten → join → load sequence against an
//! in-memory object store and a recording warehouse, covering:
//! - both load targets
//! - inner-join drop semantics
//! - the empty-listing failure
//! - append-only (duplicate) loading across invocations

use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Local, NaiveDate};

use redp_etl::event::ExtractEvent;
use redp_etl::model::{CrimeRateRow, DateDimensionRow, FactRow, LocationDimensionRow};
use redp_etl::pipeline::{CrimeRatePipeline, LoadTarget};
use redp_etl::storage::{crime_prefix, ObjectFetcher};
use redp_etl::warehouse::WarehouseClient;

const EXTRACT_DATE: &str = "2024-01-15";

/// Object store backed by a plain map
struct InMemoryStore {
    objects: BTreeMap<String, Vec<u8>>,
}

impl InMemoryStore {
    fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
        }
    }

    fn with_object(mut self, key: &str, payload: &[u8]) -> Self {
        self.objects.insert(key.to_string(), payload.to_vec());
        self
    }
}

#[async_trait]
impl ObjectFetcher for InMemoryStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>> {
        self.objects
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such key: {}", key))
    }
}

/// Object store whose retrievals always fail
struct BrokenStore;

#[async_trait]
impl ObjectFetcher for BrokenStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(vec![format!("{}/part-0.json", prefix)])
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>> {
        Err(anyhow::anyhow!("connection reset while fetching {}", key))
    }
}

/// Warehouse that records every load instead of talking to a database
#[derive(Default)]
struct RecordingWarehouse {
    locations: Vec<LocationDimensionRow>,
    dates: Vec<DateDimensionRow>,
    dimension_rows: Mutex<Vec<CrimeRateRow>>,
    fact_rows: Mutex<Vec<FactRow>>,
}

impl RecordingWarehouse {
    fn with_dimensions(locations: Vec<LocationDimensionRow>, dates: Vec<DateDimensionRow>) -> Self {
        Self {
            locations,
            dates,
            ..Self::default()
        }
    }
}

#[async_trait]
impl WarehouseClient for &RecordingWarehouse {
    async fn location_dimension(&self, state: &str) -> Result<Vec<LocationDimensionRow>> {
        assert_eq!(state, "DE");
        Ok(self.locations.clone())
    }

    async fn date_dimension(&self, date: NaiveDate) -> Result<Vec<DateDimensionRow>> {
        Ok(self
            .dates
            .iter()
            .filter(|dim| dim.date == date)
            .cloned()
            .collect())
    }

    async fn load_dimension_rows(&self, rows: &[CrimeRateRow]) -> Result<u64> {
        self.dimension_rows.lock().unwrap().extend_from_slice(rows);
        Ok(rows.len() as u64)
    }

    async fn load_fact_rows(&self, rows: &[FactRow]) -> Result<u64> {
        self.fact_rows.lock().unwrap().extend_from_slice(rows);
        Ok(rows.len() as u64)
    }
}

fn wilmington_doc() -> Vec<u8> {
    br#"{
        "Overall": {"Zipcode": "19801"},
        "Crime BreakDown": [
            {"Violent Crime Rates": {"assault": "1.2", "robbery": "0.5"}}
        ]
    }"#
    .to_vec()
}

fn newark_doc() -> Vec<u8> {
    br#"{
        "Overall": {"Zipcode": "19711"},
        "Crime BreakDown": [
            {"Property Crime Rates": {"burglary": 3.4}}
        ]
    }"#
    .to_vec()
}

fn seeded_store() -> InMemoryStore {
    let prefix = crime_prefix(EXTRACT_DATE);
    InMemoryStore::new()
        .with_object(&format!("{}/part-0.json", prefix), &wilmington_doc())
        .with_object(&format!("{}/part-1.json", prefix), &newark_doc())
}

fn seeded_dimensions() -> (Vec<LocationDimensionRow>, Vec<DateDimensionRow>) {
    let locations = vec![
        LocationDimensionRow {
            location_id: 7,
            zip_code: "19801".to_string(),
        },
        LocationDimensionRow {
            location_id: 8,
            zip_code: "19711".to_string(),
        },
    ];
    let dates = vec![DateDimensionRow {
        date_id: 42,
        date: Local::now().date_naive(),
    }];
    (locations, dates)
}

#[tokio::test]
async fn test_dimension_variant_loads_flattened_rows() {
    let warehouse = RecordingWarehouse::default();
    let pipeline = CrimeRatePipeline::new(seeded_store(), &warehouse, "DE");

    let status = pipeline
        .run(&ExtractEvent::new(EXTRACT_DATE), LoadTarget::Dimension)
        .await
        .unwrap();

    assert_eq!(status.status_code, 200);

    let loaded = warehouse.dimension_rows.lock().unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[0].zip_code, "19801");
    assert_eq!(loaded[0].crime_type, "ASSAULT");
    assert_eq!(loaded[2].zip_code, "19711");
    assert_eq!(loaded[2].crime_type, "BURGLARY");

    // The dimension variant never touches the fact table
    assert!(warehouse.fact_rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_fact_variant_attaches_surrogate_keys() {
    let (locations, dates) = seeded_dimensions();
    let warehouse = RecordingWarehouse::with_dimensions(locations, dates);
    let pipeline = CrimeRatePipeline::new(seeded_store(), &warehouse, "DE");

    let status = pipeline
        .run(&ExtractEvent::new(EXTRACT_DATE), LoadTarget::Fact)
        .await
        .unwrap();

    assert_eq!(status.status_code, 200);

    let loaded = warehouse.fact_rows.lock().unwrap();
    assert_eq!(
        *loaded,
        vec![
            FactRow {
                location_id: 7,
                crime_type: "ASSAULT".to_string(),
                rate: 1.2,
                snapshot_date_id: 42,
            },
            FactRow {
                location_id: 7,
                crime_type: "ROBBERY".to_string(),
                rate: 0.5,
                snapshot_date_id: 42,
            },
            FactRow {
                location_id: 8,
                crime_type: "BURGLARY".to_string(),
                rate: 3.4,
                snapshot_date_id: 42,
            },
        ]
    );
}

#[tokio::test]
async fn test_fact_variant_drops_unmapped_zip_codes() {
    let (mut locations, dates) = seeded_dimensions();
    locations.retain(|loc| loc.zip_code == "19801");

    let warehouse = RecordingWarehouse::with_dimensions(locations, dates);
    let pipeline = CrimeRatePipeline::new(seeded_store(), &warehouse, "DE");

    pipeline
        .run(&ExtractEvent::new(EXTRACT_DATE), LoadTarget::Fact)
        .await
        .unwrap();

    let loaded = warehouse.fact_rows.lock().unwrap();
    assert_eq!(loaded.len(), 2);
    assert!(loaded.iter().all(|row| row.location_id == 7));
}

#[tokio::test]
async fn test_fact_variant_with_unpopulated_date_dimension_loads_nothing() {
    let (locations, _) = seeded_dimensions();
    let warehouse = RecordingWarehouse::with_dimensions(locations, Vec::new());
    let pipeline = CrimeRatePipeline::new(seeded_store(), &warehouse, "DE");

    let status = pipeline
        .run(&ExtractEvent::new(EXTRACT_DATE), LoadTarget::Fact)
        .await
        .unwrap();

    // Every row drops out of the date join; the load still succeeds
    assert_eq!(status.status_code, 200);
    assert!(warehouse.fact_rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_listing_fails_without_loading() {
    let warehouse = RecordingWarehouse::default();
    let pipeline = CrimeRatePipeline::new(InMemoryStore::new(), &warehouse, "DE");

    let err = pipeline
        .run(&ExtractEvent::new(EXTRACT_DATE), LoadTarget::Dimension)
        .await
        .unwrap_err();

    assert!(format!("{:#}", err).contains("no objects found"));
    assert!(warehouse.dimension_rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_retrieval_failure_propagates() {
    let warehouse = RecordingWarehouse::default();
    let pipeline = CrimeRatePipeline::new(BrokenStore, &warehouse, "DE");

    let err = pipeline
        .run(&ExtractEvent::new(EXTRACT_DATE), LoadTarget::Dimension)
        .await
        .unwrap_err();

    assert!(format!("{:#}", err).contains("connection reset"));
    assert!(warehouse.dimension_rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_reinvocation_appends_duplicate_rows() {
    let warehouse = RecordingWarehouse::default();
    let pipeline = CrimeRatePipeline::new(seeded_store(), &warehouse, "DE");
    let event = ExtractEvent::new(EXTRACT_DATE);

    pipeline.run(&event, LoadTarget::Dimension).await.unwrap();
    pipeline.run(&event, LoadTarget::Dimension).await.unwrap();

    // No idempotency: the second run appends the same rows again
    let loaded = warehouse.dimension_rows.lock().unwrap();
    assert_eq!(loaded.len(), 6);
    assert_eq!(loaded[0], loaded[3]);
}
