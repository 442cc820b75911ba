use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{CalculationStore, StoreError, StoredCalculation};

type Key = (String, i32);

/// In-process [`CalculationStore`]. Writers for the same key are serialized
/// by the lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<Key, StoredCalculation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl CalculationStore for MemoryStore {
    async fn upsert(
        &self,
        record: StoredCalculation,
    ) -> Result<Option<StoredCalculation>, StoreError> {
        if record.taxpayer_id.trim().is_empty() {
            return Err(StoreError::InvalidKey("taxpayer_id is blank".to_string()));
        }
        if record.facts.taxpayer_id != record.taxpayer_id
            || record.facts.tax_year != record.tax_year
        {
            return Err(StoreError::InvalidKey(format!(
                "record key ({}, {}) does not match its facts ({}, {})",
                record.taxpayer_id, record.tax_year, record.facts.taxpayer_id, record.facts.tax_year
            )));
        }

        let key = (record.taxpayer_id.clone(), record.tax_year);
        let mut records = self.records.write().await;
        let previous = records.insert(key, record);
        debug!(replaced = previous.is_some(), "calculation upserted");
        Ok(previous)
    }

    async fn get(
        &self,
        taxpayer_id: &str,
        tax_year: i32,
    ) -> Result<StoredCalculation, StoreError> {
        self.records
            .read()
            .await
            .get(&(taxpayer_id.to_string(), tax_year))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                taxpayer_id: taxpayer_id.to_string(),
                tax_year,
            })
    }

    async fn list(
        &self,
        taxpayer_id: &str,
    ) -> Result<Vec<StoredCalculation>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.taxpayer_id == taxpayer_id)
            .cloned()
            .collect())
    }

    async fn delete(
        &self,
        taxpayer_id: &str,
        tax_year: i32,
    ) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .remove(&(taxpayer_id.to_string(), tax_year))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                taxpayer_id: taxpayer_id.to_string(),
                tax_year,
            })
    }
}
