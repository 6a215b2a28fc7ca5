//! Remote tabular store clients.
//!
//! [`TabularStore`] is the seam between the pipeline and whatever
//! holds the table: [`RestStore`] speaks PostgREST conventions over
//! blocking HTTP, [`MemoryStore`] keeps everything in-process for
//! tests and dry runs. Neither offers transactions, retries, or any
//! locking discipline; the caller must keep at most one upload in
//! flight at a time.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

use log::debug;
use serde_json::{Map as JsonMap, Value as JsonValue};
use url::Url;

use crate::{data::Record, error::StoreError};

/// A stored row as returned by `select_all`. The store may add columns
/// of its own (a primary key, timestamps), so rows come back as plain
/// JSON objects rather than [`Record`]s.
pub type StoredRow = JsonMap<String, JsonValue>;

pub trait TabularStore {
    /// Removes every row from `table`.
    fn delete_all(&self, table: &str) -> Result<(), StoreError>;

    /// Inserts one batch of records, returning how many the store
    /// actually accepted.
    fn insert_batch(&self, table: &str, records: &[Record]) -> Result<usize, StoreError>;

    /// Reads back the full contents of `table`.
    fn select_all(&self, table: &str) -> Result<Vec<StoredRow>, StoreError>;
}

/// PostgREST-style HTTP client (Supabase-compatible).
///
/// Constructed once per process from the project URL and service key,
/// then reused across uploads.
pub struct RestStore {
    base: Url,
    key: String,
    client: reqwest::blocking::Client,
}

impl RestStore {
    pub fn new(url: &str, key: &str) -> Result<Self, StoreError> {
        let base = Url::parse(url)
            .map_err(|err| StoreError::new(format!("invalid store URL '{url}': {err}")))?;
        Ok(Self {
            base,
            key: key.to_string(),
            client: reqwest::blocking::Client::new(),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        self.base
            .join(&format!("rest/v1/{table}"))
            .map_err(|err| StoreError::new(format!("invalid table name '{table}': {err}")))
    }

    fn check_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        let detail = body.trim();
        if detail.is_empty() {
            Err(StoreError::new(format!("store responded with {status}")))
        } else {
            Err(StoreError::new(format!("store responded with {status}: {detail}")))
        }
    }
}

impl TabularStore for RestStore {
    fn delete_all(&self, table: &str) -> Result<(), StoreError> {
        // PostgREST refuses an unfiltered DELETE; `id=neq.0` matches
        // every row of a serial-keyed table.
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("id", "neq.0");
        debug!("DELETE {url}");
        let response = self
            .client
            .delete(url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .send()?;
        Self::check_status(response)?;
        Ok(())
    }

    fn insert_batch(&self, table: &str, records: &[Record]) -> Result<usize, StoreError> {
        let url = self.table_url(table)?;
        debug!("POST {url} ({} record(s))", records.len());
        let response = self
            .client
            .post(url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Prefer", "return=representation")
            .json(records)
            .send()?;
        let response = Self::check_status(response)?;
        let inserted: Vec<JsonValue> = response.json()?;
        Ok(inserted.len())
    }

    fn select_all(&self, table: &str) -> Result<Vec<StoredRow>, StoreError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("select", "*");
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .send()?;
        let response = Self::check_status(response)?;
        Ok(response.json()?)
    }
}

/// In-process store used by tests and `--dry-run` uploads.
///
/// Insert failures can be injected by call number to exercise the
/// non-transactional replace-all path.
#[derive(Default)]
pub struct MemoryStore {
    tables: RefCell<HashMap<String, Vec<StoredRow>>>,
    fail_on_insert_call: Cell<Option<usize>>,
    insert_calls: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `call`-th (1-based) `insert_batch` call fail; earlier
    /// calls commit normally.
    pub fn fail_on_insert_call(&self, call: usize) {
        self.fail_on_insert_call.set(Some(call));
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.tables
            .borrow()
            .get(table)
            .map(Vec::len)
            .unwrap_or_default()
    }
}

impl TabularStore for MemoryStore {
    fn delete_all(&self, table: &str) -> Result<(), StoreError> {
        self.tables.borrow_mut().remove(table);
        Ok(())
    }

    fn insert_batch(&self, table: &str, records: &[Record]) -> Result<usize, StoreError> {
        let call = self.insert_calls.get() + 1;
        self.insert_calls.set(call);
        if self.fail_on_insert_call.get() == Some(call) {
            return Err(StoreError::new(format!(
                "injected failure on insert call {call}"
            )));
        }
        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let value = serde_json::to_value(record)
                .map_err(|err| StoreError::new(format!("serializing record: {err}")))?;
            match value {
                JsonValue::Object(map) => rows.push(map),
                other => {
                    return Err(StoreError::new(format!(
                        "record serialized to non-object JSON: {other}"
                    )));
                }
            }
        }
        let inserted = rows.len();
        self.tables
            .borrow_mut()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
        Ok(inserted)
    }

    fn select_all(&self, table: &str) -> Result<Vec<StoredRow>, StoreError> {
        Ok(self
            .tables
            .borrow()
            .get(table)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Scalar;

    fn record(name: &str) -> Record {
        Record::new(vec![("name", Some(Scalar::Text(name.to_string())))])
    }

    #[test]
    fn memory_store_round_trips_records() {
        let store = MemoryStore::new();
        store
            .insert_batch("planilhas", &[record("Ana"), record("Bia")])
            .unwrap();
        let rows = store.select_all("planilhas").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), Some(&JsonValue::from("Ana")));

        store.delete_all("planilhas").unwrap();
        assert!(store.select_all("planilhas").unwrap().is_empty());
    }

    #[test]
    fn memory_store_injects_failures_by_call_number() {
        let store = MemoryStore::new();
        store.fail_on_insert_call(2);
        assert_eq!(store.insert_batch("t", &[record("a")]).unwrap(), 1);
        assert!(store.insert_batch("t", &[record("b")]).is_err());
        assert_eq!(store.row_count("t"), 1);
    }
}
