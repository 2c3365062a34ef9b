use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// One handled query and what came back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionRecord {
    pub id: Uuid,
    pub timestamp_utc: DateTime<Utc>,
    pub user_query: String,
    pub response: String,
    pub tool_used: String,
    pub elapsed_seconds: f64,
}

impl InteractionRecord {
    pub fn new(
        user_query: impl Into<String>,
        response: impl Into<String>,
        tool_used: impl Into<String>,
        elapsed_seconds: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp_utc: Utc::now(),
            user_query: user_query.into(),
            response: response.into(),
            tool_used: tool_used.into(),
            elapsed_seconds,
        }
    }
}

/// Ordered interaction history, bounded to `capacity` records. The oldest
/// record is evicted first.
#[derive(Debug, Clone)]
pub struct InteractionLog {
    records: VecDeque<InteractionRecord>,
    capacity: usize,
}

impl InteractionLog {
    pub const DEFAULT_CAPACITY: usize = 1000;

    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity.min(Self::DEFAULT_CAPACITY)),
            capacity,
        }
    }

    pub fn append(&mut self, record: InteractionRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Up to `n` most recent records, oldest first.
    pub fn last_n(&self, n: usize) -> Vec<InteractionRecord> {
        let skip = self.records.len().saturating_sub(n);
        self.records.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InteractionLog {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
