extern crate todo_items;

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use todo_items::database_api;
use todo_items::database_api::SqliteItemStore;
use todo_items::item_service::ItemService;
use todo_items::item_service::ServiceConfig;
use todo_items::memory_store::InMemoryItemStore;
use todo_items::warp_api::item_routes;
use warp::http::StatusCode;

pub fn memory_service(config: ServiceConfig) -> Arc<ItemService> {
    Arc::new(ItemService::new(Arc::new(InMemoryItemStore::new()), config))
}

pub fn sqlite_service(config: ServiceConfig) -> Arc<ItemService> {
    let pool = database_api::open_in_memory_pool().expect("Failed to open in-memory SQLite");
    let store = SqliteItemStore::new(pool).expect("Failed to migrate in-memory SQLite");
    Arc::new(ItemService::new(Arc::new(store), config))
}

/// Send one request through the full route table and decode the JSON reply.
pub async fn send(
    service: &Arc<ItemService>,
    method: &str,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let routes = item_routes(service.clone(), Duration::from_secs(5));
    let mut request = warp::test::request().method(method).path(path);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request.reply(&routes).await;
    let status = response.status();
    let json = serde_json::from_slice(response.body()).unwrap_or(Value::Null);
    (status, json)
}
