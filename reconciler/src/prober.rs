// reconciler/src/prober.rs
use common::models::CertificateRecord;
use futures::stream::{self, StreamExt};

use crate::pinning::PinningService;

/// Probe every record's content concurrently, at most `concurrency` at a time.
///
/// The returned vector lines up with `records` index for index, whatever
/// order the probes complete in. Failed probes count as not live.
pub async fn probe_all<P>(pinning: &P, records: &[CertificateRecord], concurrency: usize) -> Vec<bool>
where
    P: PinningService + ?Sized,
{
    let mut liveness = vec![false; records.len()];

    let mut results = stream::iter(records.iter().enumerate())
        .map(|(index, record)| async move { (index, probe_one(pinning, &record.content_id).await) })
        .buffer_unordered(concurrency.max(1));

    while let Some((index, live)) = results.next().await {
        liveness[index] = live;
    }

    liveness
}

async fn probe_one<P>(pinning: &P, content_id: &str) -> bool
where
    P: PinningService + ?Sized,
{
    if content_id.trim().is_empty() {
        tracing::warn!("Skipping liveness probe for record with empty content id");
        return false;
    }

    match pinning.is_pinned(content_id).await {
        Ok(live) => {
            tracing::debug!(content_id, live, "Liveness probe finished");
            live
        },
        Err(e) => {
            tracing::warn!(content_id, "Liveness probe failed, treating as not live: {}", e);
            false
        }
    }
}
