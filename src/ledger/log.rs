//! The append-only delivery log and its deduplicated views.
//!
//! Appends never overwrite: a correction is a new record at the same slot.
//! Readers that aggregate (scorecard rebuild, runtime recompute, replay
//! equivalence checks) go through [`DeliveryLog::deduplicated`], which keeps
//! only the latest legal delivery per slot while preserving every illegal
//! one. The raw entry sequence stays available for audit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::delivery::{Delivery, SlotKey, LEGAL_SUBINDEX};
use super::errors::{LedgerError, LedgerResult};

/// Append-only sequence of delivery records for one game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryLog {
    entries: Vec<Delivery>,
}

impl DeliveryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. The slot it lands in is whatever the record claims;
    /// supersession is resolved at read time, not write time.
    pub fn append(&mut self, delivery: Delivery) {
        self.entries.push(delivery);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Delivery> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&Delivery> {
        self.entries.last()
    }

    /// Remove and return the most recent record. This is the only mutation
    /// besides append, and it exists solely for undo.
    pub fn truncate_last(&mut self) -> LedgerResult<Delivery> {
        self.entries.pop().ok_or(LedgerError::Empty)
    }

    /// All records for one innings, raw (no dedup), in append order.
    pub fn for_innings(&self, innings: u32) -> Vec<&Delivery> {
        self.entries
            .iter()
            .filter(|d| d.effective_innings() == innings)
            .collect()
    }

    /// Records with no innings tag (pre-tag exports, defaulted to innings 1).
    pub fn legacy_untagged(&self) -> usize {
        self.entries.iter().filter(|d| d.innings.is_none()).count()
    }

    /// The deduplicated view across all innings: for each (innings, over,
    /// ball) slot the latest legal record wins; illegal records are never
    /// superseded. Append order is preserved.
    pub fn deduplicated(&self) -> Vec<&Delivery> {
        self.dedup_filter(None)
    }

    /// Deduplicated view restricted to one innings.
    pub fn deduplicated_for_innings(&self, innings: u32) -> Vec<&Delivery> {
        self.dedup_filter(Some(innings))
    }

    fn dedup_filter(&self, innings: Option<u32>) -> Vec<&Delivery> {
        let mut latest_legal: HashMap<(u32, u32, u32), usize> = HashMap::new();
        for (idx, d) in self.entries.iter().enumerate() {
            if d.is_legal() {
                latest_legal.insert(
                    (d.effective_innings(), d.over_number, d.ball_number),
                    idx,
                );
            }
        }
        self.entries
            .iter()
            .enumerate()
            .filter(|(idx, d)| {
                if let Some(inn) = innings {
                    if d.effective_innings() != inn {
                        return false;
                    }
                }
                if !d.is_legal() {
                    return true;
                }
                latest_legal[&(d.effective_innings(), d.over_number, d.ball_number)] == *idx
            })
            .map(|(_, d)| d)
            .collect()
    }

    /// Every record paired with its derived slot key. Subindices are not
    /// persisted; they fall out of scan order, which makes the keying stable
    /// for ledgers imported from files that never carried one.
    pub fn keyed(&self) -> Vec<(SlotKey, &Delivery)> {
        let mut illegal_seen: HashMap<(u32, u32, u32), u32> = HashMap::new();
        self.entries
            .iter()
            .map(|d| {
                let slot = (d.effective_innings(), d.over_number, d.ball_number);
                let subindex = if d.is_legal() {
                    LEGAL_SUBINDEX
                } else {
                    let n = illegal_seen.entry(slot).or_insert(0);
                    *n += 1;
                    *n
                };
                (
                    SlotKey {
                        innings: slot.0,
                        over: slot.1,
                        ball: slot.2,
                        subindex,
                    },
                    d,
                )
            })
            .collect()
    }

    /// Parse a ledger from a JSON array, skipping elements that do not
    /// deserialize as deliveries. Returns the log and the skip count so
    /// callers can surface how much of a foreign file was unusable.
    pub fn from_value_lenient(value: Value) -> LedgerResult<(Self, usize)> {
        let Value::Array(items) = value else {
            return Err(LedgerError::NotAnArray);
        };
        let mut log = DeliveryLog::new();
        let mut skipped = 0;
        for item in items {
            match serde_json::from_value::<Delivery>(item) {
                Ok(d) => log.append(d),
                Err(_) => skipped += 1,
            }
        }
        Ok((log, skipped))
    }
}

impl From<Vec<Delivery>> for DeliveryLog {
    fn from(entries: Vec<Delivery>) -> Self {
        Self { entries }
    }
}
