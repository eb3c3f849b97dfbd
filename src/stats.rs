//! Counts describing a reconciliation run.
//!
//! `Tally` counts keys and records for one classification bucket;
//! `Breakdown` holds one tally per bucket. `RunStats` combines the input
//! sizes, the breakdown and the disposition counts into what the summary
//! report prints.
use crate::index::Index;
use crate::reconcile::{Disposition, Reconciliation};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub keys: usize,
    pub records: usize,
}

impl Tally {
    /// Count one key carrying `records` records.
    pub fn add(&mut self, records: usize) {
        self.keys += 1;
        self.records += records;
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Breakdown {
    pub importing_only: Tally,
    pub master_only: Tally,
    pub agreeing: Tally,
    /// Records counted here include both sides of each conflict.
    pub conflicting: Tally,
}

impl Breakdown {
    pub fn total_keys(&self) -> usize {
        self.importing_only.keys
            + self.master_only.keys
            + self.agreeing.keys
            + self.conflicting.keys
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub importing_records: usize,
    pub master_records: usize,
    pub breakdown: Breakdown,
    pub kept_importing: usize,
    pub kept_master: usize,
    pub kept_both: usize,
    pub skipped: usize,
    pub output_records: usize,
}

pub fn calculate_statistics(
    importing: &Index,
    master: &Index,
    result: &Reconciliation,
) -> RunStats {
    RunStats {
        importing_records: importing.record_count(),
        master_records: master.record_count(),
        breakdown: result.breakdown,
        kept_importing: result.count(Disposition::KeepImporting),
        kept_master: result.count(Disposition::KeepMaster),
        kept_both: result.count(Disposition::KeepBoth),
        skipped: result.count(Disposition::Skip),
        output_records: result.records.len(),
    }
}
