//! Replace-all synchronization of the store with one upload.

use log::{debug, info};

use crate::{
    batch,
    data::Record,
    error::SyncError,
    normalize,
    schema::AliasBinding,
    source::RawTable,
    store::TabularStore,
};

/// What a successful upload committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    pub inserted: usize,
    pub batches: usize,
}

/// Runs the full pipeline for one upload: alias resolution,
/// projection, coercion, filtering, batching, then a replace-all
/// write. Halts on the first error; nothing is retried.
pub fn run_upload(
    store: &dyn TabularStore,
    table: &str,
    raw: &RawTable,
    batch_size: usize,
) -> Result<SyncOutcome, SyncError> {
    let binding = AliasBinding::resolve(&raw.headers)?;
    info!(
        "Bound column(s): {}",
        binding
            .fields()
            .iter()
            .map(|b| format!("{} ← '{}'", b.field.name, b.header))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut records = normalize::project_records(raw, &binding);
    normalize::coerce_integer_fields(&mut records, &binding);
    let records = normalize::filter_records(records)?;
    debug!("{} record(s) survived cleaning", records.len());

    let batches = batch::chunk_records(records, batch_size);
    replace_all(store, table, &batches)
}

/// Replaces the table contents: one delete-all, then one insert per
/// batch, in order.
///
/// Not transactional. An insert failure after the delete leaves the
/// store partially repopulated, and the returned `StorePartial` error
/// states exactly how much was committed. The caller must keep at most
/// one upload in flight at a time; interleaved replace-all sequences
/// would corrupt the table.
pub fn replace_all(
    store: &dyn TabularStore,
    table: &str,
    batches: &[Vec<Record>],
) -> Result<SyncOutcome, SyncError> {
    store.delete_all(table)?;
    debug!("Cleared table '{table}'");

    let mut inserted = 0usize;
    for (index, records) in batches.iter().enumerate() {
        match store.insert_batch(table, records) {
            Ok(count) => {
                inserted += count;
                debug!(
                    "Inserted batch {}/{} ({count} record(s))",
                    index + 1,
                    batches.len()
                );
            }
            Err(source) => {
                return Err(SyncError::StorePartial {
                    committed_batches: index,
                    total_batches: batches.len(),
                    committed_records: inserted,
                    source,
                });
            }
        }
    }
    Ok(SyncOutcome {
        inserted,
        batches: batches.len(),
    })
}
