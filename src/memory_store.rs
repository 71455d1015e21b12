use crate::error::Error;
use crate::error::Result;
use crate::item_model::Item;
use crate::item_model::ItemId;
use crate::item_model::ItemPatch;
use crate::item_model::ItemStatus;
use crate::item_model::NewItem;
use crate::item_store::ItemFilter;
use crate::item_store::ItemStore;
use crate::item_store::RequestContext;
use crate::item_store::SortDirection;
use log::debug;
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::sync::Mutex;

/// Process-local store, used with `--in-memory` and in tests.
#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: ItemId,
    items: BTreeMap<ItemId, Item>,
}

impl InMemoryItemStore {
    pub fn new() -> InMemoryItemStore {
        InMemoryItemStore::default()
    }
}

impl ItemStore for InMemoryItemStore {
    fn create(&self, ctx: &RequestContext, item: NewItem) -> Result<ItemId> {
        ctx.ensure_active()?;
        let mut state = self.state.lock()?;
        // Ids keep growing even after the newest row is deleted.
        state.last_id += 1;
        let id = state.last_id;
        debug!("Creating in-memory item {}", id);
        state.items.insert(
            id,
            Item {
                id,
                title: item.title,
                description: item.description,
                status: ItemStatus::default(),
                created_at: Some(item.created_at),
                updated_at: Some(item.updated_at),
            },
        );
        Ok(id)
    }

    fn fetch_by_id(&self, ctx: &RequestContext, id: ItemId) -> Result<Item> {
        ctx.ensure_active()?;
        let state = self.state.lock()?;
        state.items.get(&id).cloned().ok_or_else(|| not_found(id))
    }

    fn update_fields(&self, ctx: &RequestContext, id: ItemId, patch: &ItemPatch) -> Result<()> {
        ctx.ensure_active()?;
        let mut state = self.state.lock()?;
        let item = state.items.get_mut(&id).ok_or_else(|| not_found(id))?;
        patch.apply_to(item);
        Ok(())
    }

    fn hard_delete(&self, ctx: &RequestContext, id: ItemId) -> Result<()> {
        ctx.ensure_active()?;
        let mut state = self.state.lock()?;
        state.items.remove(&id).map(|_| ()).ok_or_else(|| not_found(id))
    }

    fn count(&self, ctx: &RequestContext, filter: &ItemFilter) -> Result<i64> {
        ctx.ensure_active()?;
        let state = self.state.lock()?;
        let count = state.items.values().filter(|item| filter.matches(item)).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    fn list_page(
        &self,
        ctx: &RequestContext,
        filter: &ItemFilter,
        offset: i64,
        limit: i64,
        direction: SortDirection,
    ) -> Result<Vec<Item>> {
        ctx.ensure_active()?;
        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        let state = self.state.lock()?;
        let matching = state.items.values().filter(|item| filter.matches(item));
        let page = match direction {
            SortDirection::Ascending => matching.skip(offset).take(limit).cloned().collect(),
            SortDirection::Descending => matching.rev().skip(offset).take(limit).cloned().collect(),
        };
        Ok(page)
    }
}

fn not_found(id: ItemId) -> Error {
    Error::not_found(format!("Item {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::Utc;

    fn new_item(title: &str) -> NewItem {
        let now = Utc::now();
        NewItem {
            title: title.to_string(),
            description: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let store = InMemoryItemStore::new();
        let ctx = RequestContext::background();
        let first = store.create(&ctx, new_item("a")).unwrap();
        let second = store.create(&ctx, new_item("b")).unwrap();
        store.hard_delete(&ctx, second).unwrap();
        let third = store.create(&ctx, new_item("c")).unwrap();
        assert_eq!((first, second, third), (1, 2, 3));
        assert_eq!(store.fetch_by_id(&ctx, first).unwrap().status, ItemStatus::Open);
    }

    #[test]
    fn missing_rows_are_not_found() {
        let store = InMemoryItemStore::new();
        let ctx = RequestContext::background();
        let patch = ItemPatch::default();
        assert_eq!(store.fetch_by_id(&ctx, 9).unwrap_err().kind, ErrorKind::NotFound);
        assert_eq!(
            store.update_fields(&ctx, 9, &patch).unwrap_err().kind,
            ErrorKind::NotFound
        );
        assert_eq!(store.hard_delete(&ctx, 9).unwrap_err().kind, ErrorKind::NotFound);
    }

    #[test]
    fn pages_respect_filter_and_direction() {
        let store = InMemoryItemStore::new();
        let ctx = RequestContext::background();
        for title in &["1", "2", "3", "4", "5"] {
            store.create(&ctx, new_item(title)).unwrap();
        }
        let deleted = ItemPatch {
            status: Some(ItemStatus::Deleted),
            ..ItemPatch::default()
        };
        store.update_fields(&ctx, 4, &deleted).unwrap();

        let filter = ItemFilter::visible();
        assert_eq!(store.count(&ctx, &filter).unwrap(), 4);
        assert_eq!(store.count(&ctx, &ItemFilter::default()).unwrap(), 5);

        let ids = |items: Vec<Item>| items.into_iter().map(|i| i.id).collect::<Vec<_>>();
        let desc = store
            .list_page(&ctx, &filter, 1, 2, SortDirection::Descending)
            .unwrap();
        assert_eq!(ids(desc), vec![3, 2]);
        let asc = store
            .list_page(&ctx, &filter, 0, 10, SortDirection::Ascending)
            .unwrap();
        assert_eq!(ids(asc), vec![1, 2, 3, 5]);
    }
}
