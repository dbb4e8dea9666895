use std::collections::HashSet;

use crate::{CaptureKey, TransferItem};

/// Deduplicating accumulator: every key ever added plus the ordered queue of
/// items not yet accepted by the agent.
///
/// Keys are never removed from the seen set, so an item that was already
/// submitted is not captured again when the page re-requests its listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptureStore {
    seen: HashSet<CaptureKey>,
    pending: Vec<TransferItem>,
}

impl CaptureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` without touching the store when the key was seen before.
    pub fn add(&mut self, item: TransferItem) -> bool {
        if !self.seen.insert(item.key()) {
            return false;
        }
        self.pending.push(item);
        true
    }

    /// Adds every item in order; returns how many were new.
    pub fn extend<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = TransferItem>,
    {
        let mut added = 0;
        for item in items {
            if self.add(item) {
                added += 1;
            }
        }
        added
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    pub fn contains(&self, key: &CaptureKey) -> bool {
        self.seen.contains(key)
    }

    pub fn pending(&self) -> &[TransferItem] {
        &self.pending
    }

    /// Snapshot of the pending queue in first-seen order. Does not clear it.
    pub fn drain(&self) -> Vec<TransferItem> {
        self.pending.clone()
    }

    /// Removes the given items from the pending queue by key.
    ///
    /// Items added after the snapshot was taken stay queued. Returns how many
    /// pending entries were removed.
    pub fn commit(&mut self, items: &[TransferItem]) -> usize {
        let submitted: HashSet<CaptureKey> = items.iter().map(TransferItem::key).collect();
        let before = self.pending.len();
        self.pending.retain(|item| !submitted.contains(&item.key()));
        before - self.pending.len()
    }
}
