// Request decoding glue between warp and `ItemService`.
// Every function here is transport-shaped on the way in and returns the
// service's typed result on the way out; encoding happens in `warp_api`.

use crate::api_model::CreateItem;
use crate::api_model::ItemListing;
use crate::api_model::UpdateItem;
use crate::error::Error;
use crate::error::Result;
use crate::item_model::Item;
use crate::item_model::ItemId;
use crate::item_service::ItemService;
use crate::item_store::RequestContext;
use crate::pagination::PagingRequest;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

pub fn create_item(service: &ItemService, ctx: &RequestContext, body: Bytes) -> Result<ItemId> {
    let payload: CreateItem = parse_json_body(&body)?;
    service.create_item(ctx, payload)
}

pub fn list_items(
    service: &ItemService,
    ctx: &RequestContext,
    query: HashMap<String, String>,
) -> Result<ItemListing> {
    let request = paging_request(&query)?;
    service.list_items(ctx, request)
}

pub fn get_item(service: &ItemService, ctx: &RequestContext, id: String) -> Result<Item> {
    service.get_item(ctx, &id)
}

pub fn update_item(
    service: &ItemService,
    ctx: &RequestContext,
    id: String,
    body: Bytes,
) -> Result<bool> {
    let payload: UpdateItem = parse_json_body(&body)?;
    service.update_item(ctx, &id, payload)
}

pub fn delete_item(service: &ItemService, ctx: &RequestContext, id: String) -> Result<bool> {
    service.delete_item(ctx, &id)
}

//
// helper functions:
//

fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let deserializer = &mut serde_json::Deserializer::from_slice(body);
    let payload = serde_path_to_error::deserialize(deserializer)?;
    Ok(payload)
}

/// Query values must be integers when present, the range is normalized later.
fn paging_request(query: &HashMap<String, String>) -> Result<PagingRequest> {
    Ok(PagingRequest {
        page: query_integer(query, "page")?,
        limit: query_integer(query, "limit")?,
    })
}

fn query_integer(query: &HashMap<String, String>, name: &str) -> Result<Option<i64>> {
    match query.get(name).map(|value| value.trim()) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<i64>().map(Some).map_err(|err| {
            Error::validation(format!(
                "Query parameter {} must be an integer, got {:?}, {}",
                name, value, err
            ))
        }),
    }
}
