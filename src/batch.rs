//! Splitting records into bounded insert batches.

use crate::data::Record;

/// Records per insert request unless overridden on the command line.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Splits `records` into consecutive batches of at most `size`
/// records, preserving order. The batches partition the input exactly;
/// only the last batch may be short. `size` must be non-zero.
pub fn chunk_records(records: Vec<Record>, size: usize) -> Vec<Vec<Record>> {
    assert!(size > 0, "batch size must be non-zero");
    let mut batches = Vec::with_capacity(records.len().div_ceil(size));
    let mut remaining = records;
    while remaining.len() > size {
        let rest = remaining.split_off(size);
        batches.push(remaining);
        remaining = rest;
    }
    if !remaining.is_empty() {
        batches.push(remaining);
    }
    batches
}
