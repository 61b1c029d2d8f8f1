use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::domain::LeadError;

// Number of records converted per ingestion step. The host loop calls
// `Loader::ingest_batch` once per tick, so input handling and rendering stay
// responsive while large sources are loaded.
pub const INGEST_BATCH: usize = 512;

// Literal values that count as "no value" in the source data.
const EMPTY_SENTINELS: [&str; 3] = ["", "0", "-"];

/// One flat lead entry. Immutable once ingested; filtering and sorting only
/// ever produce new row orderings, never new records.
#[derive(Debug, Clone, Default)]
pub struct Record {
    values: HashMap<String, String>,
}

impl Record {
    /// Field value, with a missing field reading as the empty string.
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    /// True if the field holds an actual value and not an empty sentinel.
    pub fn has_value(&self, key: &str) -> bool {
        !EMPTY_SENTINELS.contains(&self.get(key))
    }

    pub fn values(&self) -> impl Iterator<Item = &String> {
        self.values.values()
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Record {
            values: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn from_object(object: serde_json::Map<String, Value>) -> Self {
        let values = object
            .into_iter()
            .map(|(key, value)| {
                let s = match value {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                (key, s)
            })
            .collect();
        Record { values }
    }
}

/// Holds the immutable data set. The filtered/sorted view is a row-index
/// mapping into `all()`, owned by the model, not the store.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    /// Parse the raw JSON document and prepare incremental ingestion.
    /// Anything other than an array of flat objects is a loading failure.
    pub fn load_json(bytes: &[u8]) -> Result<Loader, LeadError> {
        let document: Value = serde_json::from_slice(bytes)?;
        let Value::Array(entries) = document else {
            return Err(LeadError::LoadingFailed(
                "Expected a JSON array of lead objects".to_string(),
            ));
        };
        let mut objects = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                Value::Object(object) => objects.push(object),
                other => {
                    return Err(LeadError::LoadingFailed(format!(
                        "Expected a lead object, found: {other}"
                    )));
                }
            }
        }
        info!("Parsed {} lead entries, ingesting ...", objects.len());
        Ok(Loader {
            total: objects.len(),
            ingested: 0,
            pending: objects.into_iter(),
        })
    }

    pub fn all(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Ingestion progress, reported after every batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub ingested: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            100
        } else {
            (self.ingested * 100 / self.total) as u8
        }
    }
}

/// Incremental loader produced by `RecordStore::load_json`. Conversion runs
/// in fixed-size batches with a yield point between batches.
pub struct Loader {
    pending: std::vec::IntoIter<serde_json::Map<String, Value>>,
    total: usize,
    ingested: usize,
}

impl Loader {
    /// Ingest up to `INGEST_BATCH` records into the store, report progress
    /// and return whether ingestion is complete.
    pub fn ingest_batch(
        &mut self,
        store: &mut RecordStore,
        observer: &mut dyn FnMut(Progress),
    ) -> bool {
        for object in self.pending.by_ref().take(INGEST_BATCH) {
            store.records.push(Record::from_object(object));
            self.ingested += 1;
        }
        let progress = Progress {
            ingested: self.ingested,
            total: self.total,
        };
        debug!(
            "Ingested {}/{} records ({}%)",
            progress.ingested,
            progress.total,
            progress.percent()
        );
        observer(progress);
        self.ingested == self.total
    }
}
