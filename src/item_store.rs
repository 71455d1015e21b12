//! Persistence boundary for todo items.
//!
//! The service only ever talks to `dyn ItemStore`, concrete stores live in
//! `memory_store` and `database_api`.

use crate::error::Error;
use crate::error::Result;
use crate::item_model::Item;
use crate::item_model::ItemId;
use crate::item_model::ItemPatch;
use crate::item_model::ItemStatus;
use crate::item_model::NewItem;
use std::time::Duration;
use std::time::Instant;

/// Per-request information handed to every store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    deadline: Option<Instant>,
}

impl RequestContext {
    /// No deadline.
    pub fn background() -> RequestContext {
        RequestContext { deadline: None }
    }

    pub fn with_timeout(timeout: Duration) -> RequestContext {
        RequestContext {
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn with_deadline(deadline: Instant) -> RequestContext {
        RequestContext {
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail with a persistence error once the deadline has passed.
    pub fn ensure_active(&self) -> Result<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Error::persistence(
                "Store deadline exceeded before the operation could run",
            )),
            _ => Ok(()),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        RequestContext::background()
    }
}

/// Row filter for counting and listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub exclude_status: Option<ItemStatus>,
}

impl ItemFilter {
    /// Everything except soft-deleted rows.
    pub fn visible() -> ItemFilter {
        ItemFilter {
            exclude_status: Some(ItemStatus::Deleted),
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.exclude_status != Some(item.status)
    }
}

/// Ordering by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Descending
    }
}

/// Abstract persistence for item rows.
///
/// Implementations must be safe to call from many requests at once.
/// Concurrent writes to the same id are not coordinated, the last one wins.
pub trait ItemStore: Send + Sync {
    /// Insert a row with the default status and return its new, never reused id.
    fn create(&self, ctx: &RequestContext, item: NewItem) -> Result<ItemId>;

    /// `NotFound` if no row has this id.
    fn fetch_by_id(&self, ctx: &RequestContext, id: ItemId) -> Result<Item>;

    /// Write the `Some` fields of `patch`. `NotFound` if no row has this id.
    fn update_fields(&self, ctx: &RequestContext, id: ItemId, patch: &ItemPatch) -> Result<()>;

    /// Permanently remove the row. `NotFound` if no row has this id.
    fn hard_delete(&self, ctx: &RequestContext, id: ItemId) -> Result<()>;

    fn count(&self, ctx: &RequestContext, filter: &ItemFilter) -> Result<i64>;

    /// One window of rows matching `filter`, ordered by id.
    fn list_page(
        &self,
        ctx: &RequestContext,
        filter: &ItemFilter,
        offset: i64,
        limit: i64,
        direction: SortDirection,
    ) -> Result<Vec<Item>>;
}
