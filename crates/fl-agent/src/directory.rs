//! Remote-entity directory — read-only lookup of entities outside view.
//!
//! Backed by a database in production; the coordination core never calls it
//! and treats its records as opaque.  Behaviors that travel to out-of-view
//! targets use it to decide where to go.

use async_trait::async_trait;

use fl_core::{EntityKind, Position};

use crate::{DirectoryError, ShardId};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DirectoryQuery {
    /// Empty means any kind.
    pub kinds:       Vec<EntityKind>,
    /// `None` means any shard.
    pub shard:       Option<ShardId>,
    /// Only records seen within this many milliseconds of `now_ms`.
    pub max_age_ms:  u64,
    pub now_ms:      u64,
    pub limit:       usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DirectoryRecord {
    pub kind:         EntityKind,
    pub shard:        ShardId,
    pub position:     Position,
    pub hp:           u32,
    pub last_seen_ms: u64,
}

#[async_trait]
pub trait EntityDirectory: Send + Sync {
    /// Records matching `query`, most recently seen first.
    async fn find_recent(&self, query: &DirectoryQuery) -> Result<Vec<DirectoryRecord>, DirectoryError>;
}

/// In-memory directory over a fixed record list.
#[derive(Clone, Debug, Default)]
pub struct StaticDirectory {
    records: Vec<DirectoryRecord>,
}

impl StaticDirectory {
    pub fn new(records: Vec<DirectoryRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl EntityDirectory for StaticDirectory {
    async fn find_recent(&self, query: &DirectoryQuery) -> Result<Vec<DirectoryRecord>, DirectoryError> {
        if query.limit == 0 {
            return Err(DirectoryError::Query("limit must be > 0".into()));
        }
        let oldest = query.now_ms.saturating_sub(query.max_age_ms);
        let mut hits: Vec<DirectoryRecord> = self
            .records
            .iter()
            .filter(|r| query.kinds.is_empty() || query.kinds.contains(&r.kind))
            .filter(|r| query.shard.as_ref().is_none_or(|s| *s == r.shard))
            .filter(|r| r.last_seen_ms >= oldest)
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.last_seen_ms.cmp(&a.last_seen_ms));
        hits.truncate(query.limit);
        Ok(hits)
    }
}
