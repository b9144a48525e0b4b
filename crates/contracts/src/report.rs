//! AlignmentReport - counters for one engine run

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{RejectReason, SourceStats, StreamKind};

/// Per-run counters so regressions are observable without inspecting output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentReport {
    /// Camera images evaluated; always `bundles_accepted + total_rejected()`
    pub images_seen: u64,

    /// Camera images skipped because their id was already evaluated
    #[serde(default)]
    pub duplicate_images: u64,

    /// Bundles handed to the sink
    pub bundles_accepted: u64,

    /// Rejections per reason
    pub rejected: BTreeMap<RejectReason, u64>,

    /// Events dispatched per stream
    pub events_dispatched: BTreeMap<StreamKind, u64>,

    /// Entries skipped while reading, per stream
    pub entries_skipped: BTreeMap<StreamKind, u64>,

    /// Records that arrived with a lower timestamp than their predecessor
    pub out_of_order: BTreeMap<StreamKind, u64>,
}

impl AlignmentReport {
    pub fn record_dispatch(&mut self, kind: StreamKind) {
        *self.events_dispatched.entry(kind).or_insert(0) += 1;
    }

    /// Count a camera image handed to the validator
    pub fn record_image(&mut self) {
        self.images_seen += 1;
    }

    pub fn record_duplicate(&mut self) {
        self.duplicate_images += 1;
    }

    pub fn record_rejection(&mut self, reason: RejectReason) {
        *self.rejected.entry(reason).or_insert(0) += 1;
    }

    pub fn record_acceptance(&mut self) {
        self.bundles_accepted += 1;
    }

    /// Fold a source's read statistics into the report
    pub fn record_source_stats(&mut self, kind: StreamKind, stats: SourceStats) {
        if stats.skipped > 0 {
            *self.entries_skipped.entry(kind).or_insert(0) += stats.skipped;
        }
        if stats.out_of_order > 0 {
            *self.out_of_order.entry(kind).or_insert(0) += stats.out_of_order;
        }
    }

    pub fn rejected_by(&self, reason: RejectReason) -> u64 {
        self.rejected.get(&reason).copied().unwrap_or(0)
    }

    pub fn total_rejected(&self) -> u64 {
        self.rejected.values().sum()
    }

    pub fn total_skipped(&self) -> u64 {
        self.entries_skipped.values().sum()
    }

    /// Accepted share of the seen images, as a percentage
    pub fn acceptance_rate(&self) -> f64 {
        if self.images_seen > 0 {
            self.bundles_accepted as f64 / self.images_seen as f64 * 100.0
        } else {
            0.0
        }
    }
}

impl fmt::Display for AlignmentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Alignment Report ===")?;
        writeln!(f, "Images seen: {}", self.images_seen)?;
        writeln!(
            f,
            "Bundles accepted: {} ({:.2}%)",
            self.bundles_accepted,
            self.acceptance_rate()
        )?;
        if self.duplicate_images > 0 {
            writeln!(f, "Duplicate images skipped: {}", self.duplicate_images)?;
        }
        writeln!(f, "Bundles rejected: {}", self.total_rejected())?;
        for reason in RejectReason::ALL {
            let count = self.rejected_by(reason);
            if count > 0 {
                writeln!(f, "  {}: {}", reason, count)?;
            }
        }
        writeln!(f, "Entries skipped: {}", self.total_skipped())?;
        for (kind, count) in &self.entries_skipped {
            writeln!(f, "  {}: {}", kind, count)?;
        }
        if !self.out_of_order.is_empty() {
            writeln!(f, "Out-of-order records:")?;
            for (kind, count) in &self.out_of_order {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }
        Ok(())
    }
}
