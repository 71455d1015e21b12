use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use std::str::FromStr;

pub type ItemId = i64;

/// Closed set of item statuses.
/// `Deleted` marks soft-removed rows and is never listed.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ItemStatus {
    Open,
    Doing,
    Done,
    Deleted,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Open => "Open",
            ItemStatus::Doing => "Doing",
            ItemStatus::Done => "Done",
            ItemStatus::Deleted => "Deleted",
        }
    }
}

impl Default for ItemStatus {
    fn default() -> Self {
        ItemStatus::Open
    }
}

impl core::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(ItemStatus::Open),
            "Doing" => Ok(ItemStatus::Doing),
            "Done" => Ok(ItemStatus::Done),
            "Deleted" => Ok(ItemStatus::Deleted),
            other => Err(format!(
                "Unknown item status {:?}, expected one of Open, Doing, Done, Deleted",
                other
            )),
        }
    }
}

/// A stored todo item, as returned to clients.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    pub status: ItemStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Validated input for inserting a row.
/// `status` is intentionally absent, stores apply their default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field-level change set. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ItemStatus>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ItemPatch {
    /// Apply the patch to an in-memory item.
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(title) = &self.title {
            item.title = title.clone();
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(status) = self.status {
            item.status = status;
        }
        if let Some(updated_at) = self.updated_at {
            item.updated_at = Some(updated_at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_parses_only_known_values() {
        assert_eq!("Doing".parse::<ItemStatus>(), Ok(ItemStatus::Doing));
        assert_eq!("Deleted".parse::<ItemStatus>(), Ok(ItemStatus::Deleted));
        assert!("doing".parse::<ItemStatus>().is_err());
        assert!("".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn item_wire_format() {
        let item = Item {
            id: 3,
            title: "Buy milk".to_string(),
            description: String::new(),
            status: ItemStatus::Open,
            created_at: None,
            updated_at: None,
        };
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({
                "id": 3,
                "title": "Buy milk",
                "description": "",
                "status": "Open",
                "created_at": null,
                "updated_at": null,
            })
        );
    }

    #[test]
    fn patch_touches_only_set_fields() {
        let mut item = Item {
            id: 1,
            title: "A".to_string(),
            description: "B".to_string(),
            status: ItemStatus::Open,
            created_at: None,
            updated_at: None,
        };
        let patch = ItemPatch {
            status: Some(ItemStatus::Done),
            ..ItemPatch::default()
        };
        patch.apply_to(&mut item);
        assert_eq!(item.title, "A");
        assert_eq!(item.description, "B");
        assert_eq!(item.status, ItemStatus::Done);
    }
}
