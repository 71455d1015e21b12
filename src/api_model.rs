use crate::item_model::Item;
use crate::pagination::Paging;
use serde::Deserialize;
use serde::Serialize;

/// Body of `POST /v1/items`.
/// Missing fields default to empty so that validation, not decoding, reports them.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Body of `PATCH /v1/items/{id}`, every field is optional.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Result of a listing: one page of items and the normalized paging.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ItemListing {
    pub data: Vec<Item>,
    pub paging: Paging,
}

/// Success envelope, `{"data": ...}`.
#[derive(Serialize, Debug)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Failure envelope, `{"error": "..."}`.
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}
