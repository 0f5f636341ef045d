// reconciler/src/assembler.rs
use std::collections::{BTreeSet, HashSet};

use common::models::{CertificateRecord, DisplayList};
use common::ExclusionConfig;

/// Which records never reach the display list.
///
/// `content_ids` are dropped before any probing. `positions` index into the
/// list *after* the liveness filter, so which records they hit depends on
/// which ones are live.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionPolicy {
    positions: BTreeSet<usize>,
    content_ids: HashSet<String>,
}

impl ExclusionPolicy {
    pub fn new(
        positions: impl IntoIterator<Item = usize>,
        content_ids: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            positions: positions.into_iter().collect(),
            content_ids: content_ids.into_iter().collect(),
        }
    }

    /// Positions hidden by the legacy web client: 1, 2, 3, 4 and 7
    pub fn legacy() -> Self {
        Self::new([1, 2, 3, 4, 7], Vec::new())
    }

    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.positions.iter().copied()
    }

    pub fn excludes_content(&self, content_id: &str) -> bool {
        self.content_ids.contains(content_id)
    }

    /// Drop records whose content id is on the exclusion list
    pub fn without_excluded_ids(&self, records: Vec<CertificateRecord>) -> Vec<CertificateRecord> {
        if self.content_ids.is_empty() {
            return records;
        }
        records
            .into_iter()
            .filter(|r| !self.excludes_content(&r.content_id))
            .collect()
    }
}

impl From<&ExclusionConfig> for ExclusionPolicy {
    fn from(config: &ExclusionConfig) -> Self {
        Self::new(config.positions.iter().copied(), config.content_ids.iter().cloned())
    }
}

/// Build the display list from records and their liveness results.
///
/// Keeps live records, removes the policy's positions from that filtered
/// sequence, then sorts by issuance time. The sort is stable, so records with
/// equal timestamps keep their ledger order. A record without a matching
/// liveness result counts as not live.
pub fn assemble(records: Vec<CertificateRecord>, liveness: &[bool], policy: &ExclusionPolicy) -> DisplayList {
    if records.len() != liveness.len() {
        tracing::warn!(
            "Liveness results ({}) do not match records ({}), unmatched records treated as not live",
            liveness.len(),
            records.len()
        );
    }

    let live = records
        .into_iter()
        .zip(liveness.iter().copied().chain(std::iter::repeat(false)))
        .filter_map(|(record, live)| live.then_some(record));

    let mut kept: Vec<CertificateRecord> = live
        .enumerate()
        .filter(|(position, _)| !policy.positions.contains(position))
        .map(|(_, record)| record)
        .collect();

    kept.sort_by_key(CertificateRecord::issued_at_secs);

    DisplayList::from(kept)
}
