use crate::database_columns::column;
use crate::database_columns::ItemField;
use crate::item_model::Item;
use crate::item_model::ItemStatus;
use chrono::DateTime;
use chrono::TimeZone;
use chrono::Utc;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use rusqlite::Row;
use rusqlite::ToSql;

/// Timestamps are stored as milliseconds since the Unix epoch.
pub type DBTime = i64;

pub fn datetime_to_sqlite(dt: DateTime<Utc>) -> DBTime {
    dt.timestamp_millis()
}

pub fn sqlite_to_datetime(millis: Option<DBTime>) -> Option<DateTime<Utc>> {
    millis.and_then(|millis| Utc.timestamp_millis_opt(millis).single())
}

impl ToSql for ItemStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ItemStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err: String| FromSqlError::Other(err.into()))
    }
}

/// Read one item row. Columns are looked up by their mapped names.
pub fn sqlite_row_to_item(row: &Row) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(column(ItemField::Id))?,
        title: row.get(column(ItemField::Title))?,
        description: row.get(column(ItemField::Description))?,
        status: row.get(column(ItemField::Status))?,
        created_at: sqlite_to_datetime(row.get(column(ItemField::CreatedAt))?),
        updated_at: sqlite_to_datetime(row.get(column(ItemField::UpdatedAt))?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetimes_keep_millisecond_precision() {
        let dt = Utc.timestamp_millis(1_693_645_433_996);
        assert_eq!(sqlite_to_datetime(Some(datetime_to_sqlite(dt))), Some(dt));
        assert_eq!(sqlite_to_datetime(None), None);
    }

    #[test]
    fn status_round_trips_through_sqlite() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let status: ItemStatus = conn
            .query_row("SELECT ?;", rusqlite::params![ItemStatus::Doing], |row| row.get(0))
            .unwrap();
        assert_eq!(status, ItemStatus::Doing);

        let broken: rusqlite::Result<ItemStatus> =
            conn.query_row("SELECT 'Someday';", rusqlite::NO_PARAMS, |row| row.get(0));
        assert!(broken.is_err());
    }
}
