//! The persisted feedback log.
//!
//! Stored as one JSON document:
//! `{feedbackItems: [...], lastTrainingDate, version}`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use super::FeedbackItem;
use crate::domain::foundation::{FeedbackId, Timestamp};

/// Current schema version of the persisted document.
pub const FEEDBACK_SCHEMA_VERSION: u32 = 1;

/// Raised when an item with an existing id is appended.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Feedback item '{0}' already exists")]
pub struct DuplicateFeedbackId(pub FeedbackId);

/// Whole-document state of the feedback log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackStoreState {
    #[serde(rename = "feedbackItems", default)]
    items: Vec<FeedbackItem>,
    #[serde(default)]
    last_training_date: Option<Timestamp>,
    #[serde(default = "default_version")]
    version: u32,
}

fn default_version() -> u32 {
    FEEDBACK_SCHEMA_VERSION
}

impl Default for FeedbackStoreState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            last_training_date: None,
            version: FEEDBACK_SCHEMA_VERSION,
        }
    }
}

impl FeedbackStoreState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item and returns the new total count.
    pub fn push(&mut self, item: FeedbackItem) -> Result<usize, DuplicateFeedbackId> {
        if self.items.iter().any(|existing| existing.id == item.id) {
            return Err(DuplicateFeedbackId(item.id));
        }
        self.items.push(item);
        Ok(self.items.len())
    }

    /// Items not yet applied, in insertion order.
    pub fn unprocessed(&self) -> Vec<FeedbackItem> {
        self.items.iter().filter(|i| !i.applied).cloned().collect()
    }

    /// Live count of unapplied items.
    pub fn unprocessed_count(&self) -> usize {
        self.items.iter().filter(|i| !i.applied).count()
    }

    /// Marks the given items applied and returns how many changed.
    ///
    /// Already-applied and unknown ids are ignored. `lastTrainingDate` is
    /// stamped only when at least one item changed, so repeating a call
    /// leaves the state untouched.
    pub fn mark_applied(&mut self, ids: &[FeedbackId], now: Timestamp) -> usize {
        let wanted: HashSet<&FeedbackId> = ids.iter().collect();
        let mut changed = 0;
        for item in self.items.iter_mut() {
            if !item.applied && wanted.contains(&item.id) {
                item.applied = true;
                changed += 1;
            }
        }
        if changed > 0 {
            self.last_training_date = Some(now);
        }
        changed
    }

    pub fn items(&self) -> &[FeedbackItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn last_training_date(&self) -> Option<Timestamp> {
        self.last_training_date
    }

    pub fn version(&self) -> u32 {
        self.version
    }
}
