use crate::database_columns::column;
use crate::database_columns::select_list;
use crate::database_columns::ItemField;
use crate::database_columns::ITEMS_TABLE;
use crate::database_migrate_refinery;
use crate::error::Error;
use crate::error::ErrorContext;
use crate::error::Result;
use crate::item_model::Item;
use crate::item_model::ItemId;
use crate::item_model::ItemPatch;
use crate::item_model::NewItem;
use crate::item_store::ItemFilter;
use crate::item_store::ItemStore;
use crate::item_store::RequestContext;
use crate::item_store::SortDirection;
use crate::sql_converters::datetime_to_sqlite;
use crate::sql_converters::sqlite_row_to_item;
use lazy_static::lazy_static;
use log::debug;
use r2d2::Pool;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use rusqlite::OptionalExtension;
use std::path::Path;
use std::time::Instant;

pub type SqlitePool = Pool<SqliteConnectionManager>;
type Conn = PooledConnection<SqliteConnectionManager>;

lazy_static! {
    static ref INSERT_SQL: String = format!(
        "INSERT INTO {} ({}, {}, {}, {}) VALUES (?, ?, ?, ?);",
        ITEMS_TABLE,
        column(ItemField::Title),
        column(ItemField::Description),
        column(ItemField::CreatedAt),
        column(ItemField::UpdatedAt),
    );
    static ref SELECT_BY_ID_SQL: String = format!(
        "SELECT {} FROM {} WHERE {} = ?;",
        select_list(),
        ITEMS_TABLE,
        column(ItemField::Id),
    );
    static ref DELETE_SQL: String = format!(
        "DELETE FROM {} WHERE {} = ?;",
        ITEMS_TABLE,
        column(ItemField::Id),
    );
}

/// Open (creating if needed) a pooled SQLite database file.
pub fn open_pool(database_file: &Path, pool_size: u32) -> Result<SqlitePool> {
    if let Some(dir) = database_file.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(|err| {
                Error::persistence(format!(
                    "Failed to create database directory {}, {}",
                    dir.display(),
                    err
                ))
            })?;
        }
    }
    let manager = SqliteConnectionManager::file(database_file)
        .with_init(|c| c.execute_batch("PRAGMA busy_timeout = 5000;"));
    let pool = Pool::builder().max_size(pool_size.max(1)).build(manager)?;
    Ok(pool)
}

/// A private in-memory database. The pool holds a single connection,
/// otherwise every connection would see its own empty database.
pub fn open_in_memory_pool() -> Result<SqlitePool> {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager)?;
    Ok(pool)
}

/// `ItemStore` on top of SQLite.
pub struct SqliteItemStore {
    pool: SqlitePool,
}

impl SqliteItemStore {
    /// Wrap a pool and bring its schema up-to-date.
    pub fn new(pool: SqlitePool) -> Result<SqliteItemStore> {
        let mut conn = pool.get()?;
        database_migrate_refinery::migrate(&mut conn)?;
        Ok(SqliteItemStore { pool })
    }

    /// Borrow a connection, waiting no longer than the request deadline allows.
    fn connection(&self, ctx: &RequestContext) -> Result<Conn> {
        ctx.ensure_active()?;
        let conn = match ctx.deadline() {
            Some(deadline) => self
                .pool
                .get_timeout(deadline.saturating_duration_since(Instant::now()))?,
            None => self.pool.get()?,
        };
        Ok(conn)
    }
}

impl ItemStore for SqliteItemStore {
    fn create(&self, ctx: &RequestContext, item: NewItem) -> Result<ItemId> {
        let conn = self.connection(ctx)?;
        let mut stmt = conn
            .prepare_cached(&INSERT_SQL)
            .context_str("Failed to prepare/compile INSERT statement")?;
        let id = stmt
            .insert(params![
                item.title,
                item.description,
                datetime_to_sqlite(item.created_at),
                datetime_to_sqlite(item.updated_at)
            ])
            .context_str("Failed to execute insert_item with parameters")?;
        debug!("Inserted item {}", id);
        Ok(id)
    }

    fn fetch_by_id(&self, ctx: &RequestContext, id: ItemId) -> Result<Item> {
        let conn = self.connection(ctx)?;
        let mut stmt = conn.prepare_cached(&SELECT_BY_ID_SQL)?;
        let item = stmt
            .query_row(params![id], sqlite_row_to_item)
            .optional()
            .context(|| format!("Failed to read item {}", id))?;
        item.ok_or_else(|| not_found(id))
    }

    fn update_fields(&self, ctx: &RequestContext, id: ItemId, patch: &ItemPatch) -> Result<()> {
        let mut assignments = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(title) = &patch.title {
            assignments.push(assignment(ItemField::Title));
            values.push(Value::Text(title.clone()));
        }
        if let Some(description) = &patch.description {
            assignments.push(assignment(ItemField::Description));
            values.push(Value::Text(description.clone()));
        }
        if let Some(status) = patch.status {
            assignments.push(assignment(ItemField::Status));
            values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(updated_at) = patch.updated_at {
            assignments.push(assignment(ItemField::UpdatedAt));
            values.push(Value::Integer(datetime_to_sqlite(updated_at)));
        }
        if assignments.is_empty() {
            // Nothing to write, only report whether the row exists.
            return self.fetch_by_id(ctx, id).map(|_| ());
        }
        values.push(Value::Integer(id));

        let sql_query = format!(
            "UPDATE {} SET {} WHERE {} = ?;",
            ITEMS_TABLE,
            assignments.join(", "),
            column(ItemField::Id)
        );
        debug!("Executing update SQL: {}", sql_query);
        let conn = self.connection(ctx)?;
        let mut stmt = conn
            .prepare_cached(&sql_query)
            .context(|| format!("SQL query: {}", sql_query))?;
        let changed = stmt.execute(params_from_iter(values.iter()))?;
        if changed == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    fn hard_delete(&self, ctx: &RequestContext, id: ItemId) -> Result<()> {
        let conn = self.connection(ctx)?;
        let mut stmt = conn.prepare_cached(&DELETE_SQL)?;
        let changed = stmt.execute(params![id])?;
        if changed == 0 {
            return Err(not_found(id));
        }
        debug!("Permanently removed item {}", id);
        Ok(())
    }

    fn count(&self, ctx: &RequestContext, filter: &ItemFilter) -> Result<i64> {
        let (where_clause, values) = filter_clause(filter);
        let sql_query = format!("SELECT COUNT(*) FROM {}{};", ITEMS_TABLE, where_clause);
        let conn = self.connection(ctx)?;
        let mut stmt = conn
            .prepare_cached(&sql_query)
            .context(|| format!("SQL query: {}", sql_query))?;
        let count = stmt.query_row(params_from_iter(values.iter()), |row| row.get(0))?;
        Ok(count)
    }

    fn list_page(
        &self,
        ctx: &RequestContext,
        filter: &ItemFilter,
        offset: i64,
        limit: i64,
        direction: SortDirection,
    ) -> Result<Vec<Item>> {
        let (where_clause, mut values) = filter_clause(filter);
        let order = match direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        let sql_query = format!(
            "SELECT {} FROM {}{} ORDER BY {} {} LIMIT ? OFFSET ?;",
            select_list(),
            ITEMS_TABLE,
            where_clause,
            column(ItemField::Id),
            order
        );
        values.push(Value::Integer(limit.max(0)));
        values.push(Value::Integer(offset.max(0)));
        debug!("Executing list SQL: {}", sql_query);

        let conn = self.connection(ctx)?;
        let mut stmt = conn
            .prepare_cached(&sql_query)
            .context(|| format!("SQL query: {}", sql_query))?;
        let rows = stmt.query_map(params_from_iter(values.iter()), sqlite_row_to_item)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}

fn assignment(field: ItemField) -> String {
    format!("{} = ?", column(field))
}

fn filter_clause(filter: &ItemFilter) -> (String, Vec<Value>) {
    match filter.exclude_status {
        Some(status) => (
            format!(" WHERE {} <> ?", column(ItemField::Status)),
            vec![Value::Text(status.as_str().to_string())],
        ),
        None => (String::new(), Vec::new()),
    }
}

fn not_found(id: ItemId) -> Error {
    Error::not_found(format!("Item {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::item_model::ItemStatus;
    use chrono::TimeZone;
    use chrono::Utc;
    use std::time::Duration;

    fn test_store() -> SqliteItemStore {
        SqliteItemStore::new(open_in_memory_pool().unwrap()).unwrap()
    }

    fn new_item(title: &str, millis: i64) -> NewItem {
        let at = Utc.timestamp_millis(millis);
        NewItem {
            title: title.to_string(),
            description: format!("{} description", title),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn migrated_table_matches_column_mapping() {
        let pool = open_in_memory_pool().unwrap();
        let _store = SqliteItemStore::new(pool.clone()).unwrap();
        let conn = pool.get().unwrap();
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({});", ITEMS_TABLE))
            .unwrap();
        let names: Vec<String> = stmt
            .query_map(rusqlite::NO_PARAMS, |row| row.get(1))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(names.join(", "), select_list());
    }

    #[test]
    fn create_then_fetch() {
        let store = test_store();
        let ctx = RequestContext::background();
        let id = store.create(&ctx, new_item("A", 1_000)).unwrap();
        let item = store.fetch_by_id(&ctx, id).unwrap();
        assert_eq!(item.title, "A");
        assert_eq!(item.description, "A description");
        assert_eq!(item.status, ItemStatus::Open);
        assert_eq!(item.created_at, Some(Utc.timestamp_millis(1_000)));
        assert_eq!(item.created_at, item.updated_at);
    }

    #[test]
    fn update_writes_only_patched_columns() {
        let store = test_store();
        let ctx = RequestContext::background();
        let id = store.create(&ctx, new_item("A", 1_000)).unwrap();
        let patch = ItemPatch {
            status: Some(ItemStatus::Done),
            updated_at: Some(Utc.timestamp_millis(2_000)),
            ..ItemPatch::default()
        };
        store.update_fields(&ctx, id, &patch).unwrap();
        let item = store.fetch_by_id(&ctx, id).unwrap();
        assert_eq!(item.title, "A");
        assert_eq!(item.description, "A description");
        assert_eq!(item.status, ItemStatus::Done);
        assert_eq!(item.created_at, Some(Utc.timestamp_millis(1_000)));
        assert_eq!(item.updated_at, Some(Utc.timestamp_millis(2_000)));

        let err = store.update_fields(&ctx, id + 1, &patch).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        let err = store
            .update_fields(&ctx, id + 1, &ItemPatch::default())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn hard_delete_removes_row_and_ids_are_not_reused() {
        let store = test_store();
        let ctx = RequestContext::background();
        let first = store.create(&ctx, new_item("A", 1)).unwrap();
        let second = store.create(&ctx, new_item("B", 2)).unwrap();
        store.hard_delete(&ctx, second).unwrap();
        assert_eq!(
            store.fetch_by_id(&ctx, second).unwrap_err().kind,
            ErrorKind::NotFound
        );
        assert_eq!(
            store.hard_delete(&ctx, second).unwrap_err().kind,
            ErrorKind::NotFound
        );
        let third = store.create(&ctx, new_item("C", 3)).unwrap();
        assert!(third > second && second > first);
    }

    #[test]
    fn count_and_page_exclude_filtered_status() {
        let store = test_store();
        let ctx = RequestContext::background();
        for i in 1..=5 {
            store.create(&ctx, new_item(&i.to_string(), i)).unwrap();
        }
        let deleted = ItemPatch {
            status: Some(ItemStatus::Deleted),
            ..ItemPatch::default()
        };
        store.update_fields(&ctx, 2, &deleted).unwrap();

        let filter = ItemFilter::visible();
        assert_eq!(store.count(&ctx, &filter).unwrap(), 4);
        assert_eq!(store.count(&ctx, &ItemFilter::default()).unwrap(), 5);

        let page = store
            .list_page(&ctx, &filter, 0, 10, SortDirection::Descending)
            .unwrap();
        let ids: Vec<ItemId> = page.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![5, 4, 3, 1]);

        let page = store
            .list_page(&ctx, &filter, 2, 2, SortDirection::Ascending)
            .unwrap();
        let ids: Vec<ItemId> = page.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![4, 5]);
    }

    #[test]
    fn expired_deadline_never_reaches_the_database() {
        let store = test_store();
        let expired = RequestContext::with_deadline(Instant::now() - Duration::from_millis(1));
        let err = store.create(&expired, new_item("A", 1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Persistence);
        let ctx = RequestContext::background();
        assert_eq!(store.count(&ctx, &ItemFilter::default()).unwrap(), 0);
    }
}
