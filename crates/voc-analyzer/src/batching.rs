//! Partitioning a record set into provider-sized batches

use voc_domain::Record;

/// A contiguous slice of the run input sent in one provider request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a> {
    /// Batch position, 0-based
    pub index: usize,

    /// Offset of the first record in the run input
    pub offset: usize,

    /// Records in input order
    pub records: &'a [Record],
}

impl Batch<'_> {
    /// Number of records in the batch
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch is empty (never true for batches from `partition`)
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Split records into order-preserving batches of at most `batch_size`.
///
/// Every record lands in exactly one batch; only the last batch may be short.
/// A `batch_size` of zero is treated as one.
pub fn partition(records: &[Record], batch_size: usize) -> Vec<Batch<'_>> {
    let batch_size = batch_size.max(1);
    records
        .chunks(batch_size)
        .enumerate()
        .map(|(index, chunk)| Batch {
            index,
            offset: index * batch_size,
            records: chunk,
        })
        .collect()
}
