//! Ephemeral dispatch batches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pulso_core::types::id::UserId;

use crate::notification::NotificationDraft;

/// Batch priority levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchPriority {
    /// Background sends that can wait for a window
    Low,
    /// Standard sends
    Normal,
    /// Time-sensitive sends
    High,
    /// Bypasses batching entirely
    Critical,
}

impl BatchPriority {
    /// Parse from string
    pub fn from_str_value(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Normal,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Whether this priority waits for a batch window at all.
    pub fn can_batch(&self) -> bool {
        !matches!(self, Self::Critical)
    }
}

/// Identifier of a dispatch batch: `batch_<epoch-millis>_<suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(String);

impl BatchId {
    /// Wrap an already-formatted batch id.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One (recipient, draft) pair queued for dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    /// The recipient user.
    pub user_id: UserId,
    /// The notification to send.
    pub draft: NotificationDraft,
}

/// A transient grouping of sends awaiting flush. Destroyed once its
/// items are handed to the delivery engine.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Batch identifier.
    pub id: BatchId,
    /// Queued items, in insertion order.
    pub items: Vec<BatchItem>,
    /// Dispatch priority.
    pub priority: BatchPriority,
    /// When the batch was opened.
    pub created_at: DateTime<Utc>,
}

impl Batch {
    /// Open a batch around an initial set of items.
    pub fn new(id: BatchId, items: Vec<BatchItem>, priority: BatchPriority) -> Self {
        Self {
            id,
            items,
            priority,
            created_at: Utc::now(),
        }
    }
}
