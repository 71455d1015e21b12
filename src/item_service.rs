//! Business rules for todo items.
//!
//! `ItemService` is built once at startup with its store and configuration,
//! then shared by every request handler. It keeps no per-request state.

use crate::api_model::CreateItem;
use crate::api_model::ItemListing;
use crate::api_model::UpdateItem;
use crate::error::Error;
use crate::error::Result;
use crate::item_model::Item;
use crate::item_model::ItemId;
use crate::item_model::ItemPatch;
use crate::item_model::ItemStatus;
use crate::item_store::ItemFilter;
use crate::item_store::ItemStore;
use crate::item_store::RequestContext;
use crate::item_store::SortDirection;
use crate::pagination::Paging;
use crate::pagination::PagingRequest;
use crate::validation;
use crate::validation::EmptyFieldPolicy;
use chrono::Utc;
use log::debug;
use std::str::FromStr;
use std::sync::Arc;

/// What `delete_item` does to a row.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeleteMode {
    /// Remove the row permanently.
    Hard,
    /// Keep the row and set its status to `Deleted`.
    Soft,
}

impl Default for DeleteMode {
    fn default() -> Self {
        DeleteMode::Hard
    }
}

impl FromStr for DeleteMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "hard" => Ok(DeleteMode::Hard),
            "soft" => Ok(DeleteMode::Soft),
            other => Err(format!(
                "Unknown delete mode {}, expected `hard` or `soft`",
                other
            )),
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    pub delete_mode: DeleteMode,
    pub empty_field_policy: EmptyFieldPolicy,
}

#[derive(Clone)]
pub struct ItemService {
    store: Arc<dyn ItemStore>,
    config: ServiceConfig,
}

impl ItemService {
    pub fn new(store: Arc<dyn ItemStore>, config: ServiceConfig) -> ItemService {
        ItemService { store, config }
    }

    pub fn config(&self) -> ServiceConfig {
        self.config
    }

    /// Validate and insert a new item, returning its id.
    pub fn create_item(&self, ctx: &RequestContext, payload: CreateItem) -> Result<ItemId> {
        let new_item = validation::validate_creation(payload, Utc::now())?;
        let id = self.store.create(ctx, new_item)?;
        debug!("Created item {}", id);
        Ok(id)
    }

    /// With `DeleteMode::Soft`, items with status `Deleted` are reported as not found.
    /// With `DeleteMode::Hard` such items are returned as stored.
    pub fn get_item(&self, ctx: &RequestContext, id: &str) -> Result<Item> {
        let id = validation::parse_item_id(id)?;
        let item = self.store.fetch_by_id(ctx, id)?;
        self.visible(item)
    }

    /// Apply a partial update, see `EmptyFieldPolicy` for how empty strings are treated.
    ///
    /// Concurrent updates of one item are not coordinated: the last write wins.
    pub fn update_item(&self, ctx: &RequestContext, id: &str, payload: UpdateItem) -> Result<bool> {
        let id = validation::parse_item_id(id)?;
        let mut patch = validation::validate_update(payload, self.config.empty_field_policy)?;
        patch.updated_at = Some(Utc::now());
        self.ensure_not_soft_deleted(ctx, id)?;
        debug!("Updating item {} with {:?}", id, patch);
        self.store.update_fields(ctx, id, &patch)?;
        Ok(true)
    }

    pub fn delete_item(&self, ctx: &RequestContext, id: &str) -> Result<bool> {
        let id = validation::parse_item_id(id)?;
        match self.config.delete_mode {
            DeleteMode::Hard => self.store.hard_delete(ctx, id)?,
            DeleteMode::Soft => {
                self.ensure_not_soft_deleted(ctx, id)?;
                let patch = ItemPatch {
                    status: Some(ItemStatus::Deleted),
                    updated_at: Some(Utc::now()),
                    ..ItemPatch::default()
                };
                self.store.update_fields(ctx, id, &patch)?
            }
        }
        debug!("Deleted item {} ({:?})", id, self.config.delete_mode);
        Ok(true)
    }

    /// One page of non-deleted items, newest id first.
    ///
    /// The total and the page come from two separate store calls,
    /// so concurrent writes may make them disagree slightly.
    pub fn list_items(&self, ctx: &RequestContext, request: PagingRequest) -> Result<ItemListing> {
        let mut paging = Paging::normalize(request);
        let filter = ItemFilter::visible();
        paging.total = self.store.count(ctx, &filter)?;
        let data = self.store.list_page(
            ctx,
            &filter,
            paging.offset(),
            paging.limit,
            SortDirection::Descending,
        )?;
        Ok(ItemListing { data, paging })
    }

    fn visible(&self, item: Item) -> Result<Item> {
        if self.config.delete_mode == DeleteMode::Soft && item.status == ItemStatus::Deleted {
            return Err(Error::not_found(format!("Item {} not found", item.id)));
        }
        Ok(item)
    }

    /// In soft delete mode a `Deleted` row is gone for every operation, not only for reads.
    /// The check and the following write are separate store calls.
    fn ensure_not_soft_deleted(&self, ctx: &RequestContext, id: ItemId) -> Result<()> {
        if self.config.delete_mode == DeleteMode::Soft {
            self.visible(self.store.fetch_by_id(ctx, id)?)?;
        }
        Ok(())
    }
}
