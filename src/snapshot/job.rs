//! Shared job machinery: options and the ordered unit runner.

use std::future::Future;

use futures_util::{StreamExt, future, stream};
use tokio_util::sync::CancellationToken;

use super::catalog::ImportLayout;
use super::error::SnapshotError;
use super::report::{OutcomeRecord, Report};

/// Tuning for one export or import job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOptions {
    concurrency: usize,
    layout: ImportLayout,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            layout: ImportLayout::default(),
        }
    }
}

impl JobOptions {
    /// Number of units processed at once over the shared connection (min 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_layout(mut self, layout: ImportLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn layout(&self) -> ImportLayout {
        self.layout
    }
}

/// Run `process` over every unit and collect the records in unit order.
///
/// Up to `concurrency` units are in flight at once, but records are yielded
/// in discovery order, never completion order. Cancellation stops new units
/// from starting; units already in flight run to completion.
pub(crate) async fn run_units<T, Fut, P>(
    units: Vec<T>,
    concurrency: usize,
    cancel: &CancellationToken,
    process: P,
) -> Result<Report, SnapshotError>
where
    P: FnMut(T) -> Fut,
    Fut: Future<Output = OutcomeRecord>,
{
    let total = units.len();

    let records: Vec<OutcomeRecord> = stream::iter(units)
        .take_while(|_| future::ready(!cancel.is_cancelled()))
        .map(process)
        .buffered(concurrency.max(1))
        .collect()
        .await;

    if records.len() < total {
        return Err(SnapshotError::Cancelled {
            completed: records.len(),
            total,
        });
    }

    Ok(records.into_iter().collect())
}
