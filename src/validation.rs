//! Shape checks for incoming payloads and identifiers.
//!
//! Nothing here touches a store: a payload that fails validation is rejected
//! before any persistence call is made.

use crate::api_model::CreateItem;
use crate::api_model::UpdateItem;
use crate::error::Error;
use crate::error::Result;
use crate::item_model::ItemId;
use crate::item_model::ItemPatch;
use crate::item_model::ItemStatus;
use crate::item_model::NewItem;
use chrono::DateTime;
use chrono::Utc;
use std::str::FromStr;

/// How an update field submitted as an empty string is interpreted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EmptyFieldPolicy {
    /// Empty strings mean "not provided", the stored value is kept.
    /// A client therefore cannot clear a field to empty.
    Skip,
    /// Empty strings are applied literally (and validated like any value).
    Apply,
}

impl Default for EmptyFieldPolicy {
    fn default() -> Self {
        EmptyFieldPolicy::Skip
    }
}

impl FromStr for EmptyFieldPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "skip" => Ok(EmptyFieldPolicy::Skip),
            "apply" => Ok(EmptyFieldPolicy::Apply),
            other => Err(format!(
                "Unknown empty field policy {}, expected `skip` or `apply`",
                other
            )),
        }
    }
}

/// Parse an item id from its textual (path) form. Only positive integers are ids.
pub fn parse_item_id(raw: &str) -> Result<ItemId> {
    let id = raw
        .parse::<ItemId>()
        .map_err(|err| Error::invalid_argument(format!("Invalid item id {:?}, {}", raw, err)))?;
    if id <= 0 {
        return Err(Error::invalid_argument(format!(
            "Invalid item id {}, ids are positive integers",
            id
        )));
    }
    Ok(id)
}

pub fn validate_creation(payload: CreateItem, now: DateTime<Utc>) -> Result<NewItem> {
    if payload.title.trim().is_empty() {
        return Err(Error::validation("Item title must not be empty"));
    }
    Ok(NewItem {
        title: payload.title,
        description: payload.description,
        created_at: now,
        updated_at: now,
    })
}

/// Turn an update payload into a patch. `updated_at` is left for the caller.
pub fn validate_update(payload: UpdateItem, policy: EmptyFieldPolicy) -> Result<ItemPatch> {
    let title = provided(payload.title, policy);
    if let Some(title) = &title {
        if title.trim().is_empty() {
            return Err(Error::validation("Item title must not be empty"));
        }
    }
    let description = provided(payload.description, policy);
    let status = match provided(payload.status, policy) {
        Some(status) => Some(ItemStatus::from_str(&status).map_err(Error::validation)?),
        None => None,
    };
    Ok(ItemPatch {
        title,
        description,
        status,
        updated_at: None,
    })
}

fn provided(field: Option<String>, policy: EmptyFieldPolicy) -> Option<String> {
    match (field, policy) {
        (Some(value), EmptyFieldPolicy::Skip) if value.is_empty() => None,
        (field, _) => field,
    }
}
