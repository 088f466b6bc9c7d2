//! Progress hooks for bulk runs.
//!
//! [`AddressService::resolve_bulk`](crate::AddressService::resolve_bulk)
//! reports every processed row together with the running summary; how that
//! is shown is up to the caller.

use crate::bulk::{BulkResultRow, BulkSummary};

/// Receives bulk-run events. Called from the task driving the run, once per
/// row and in row order.
pub trait ProgressCallback: Send + Sync {
    /// A run over `total` input rows is starting.
    fn started(&self, total: usize);

    /// `row` was processed; `summary` already counts it.
    fn row_done(&self, row: &BulkResultRow, summary: &BulkSummary);

    /// Every row was processed.
    fn finished(&self, summary: &BulkSummary);
}

/// Ignores every event. Used when no callback is supplied.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn started(&self, _total: usize) {}
    fn row_done(&self, _row: &BulkResultRow, _summary: &BulkSummary) {}
    fn finished(&self, _summary: &BulkSummary) {}
}
