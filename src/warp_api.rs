use crate::api_model::DataResponse;
use crate::api_model::ErrorResponse;
use crate::command_line_interface;
use crate::command_line_interface::CliOptions;
use crate::error::Result;
use crate::item_service::ItemService;
use crate::item_store::RequestContext;
use crate::warp_endpoints;
use bytes::Bytes;
use log::info;
use log::warn;
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use warp::http::StatusCode;
use warp::Filter;
use warp::Rejection;
use warp::Reply;

/// Request bodies larger than this are rejected by warp.
const MAX_BODY_BYTES: u64 = 64 * 1024;

/// Start web framework with specified APIs.
pub async fn run_server(cli_options: &CliOptions, service: ItemService) {
    let package_name = env!("CARGO_PKG_NAME").to_uppercase();
    info!("Starting {} HTTP server", package_name);

    let routes = item_routes(Arc::new(service), cli_options.store_timeout())
        .with(warp::log("todo_items::api"));
    let socket = SocketAddr::new(cli_options.address, cli_options.port);

    match (&cli_options.tls_pub_crt, &cli_options.tls_priv_key) {
        (Some(cert), Some(key)) => {
            info!("Listening on https://{}", socket);
            warp::serve(routes)
                .tls()
                .cert_path(cert)
                .key_path(key)
                .run(socket)
                .await
        }
        (cert, key) => {
            if cert.is_some() || key.is_some() {
                warn!("Both a certificate and a key file are needed for https, serving plain http");
            }
            info!("Listening on http://{}", socket);
            warp::serve(routes).run(socket).await
        }
    }
}

/// All routes of the service. `store_timeout` bounds the store work of each request.
pub fn item_routes(
    service: Arc<ItemService>,
    store_timeout: Duration,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    // Liveness check.
    let ping = warp::path("ping")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({ "message": "pong" })));

    // Get version of the running service.
    let version = warp::path("version")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::json(&command_line_interface::VERSION.as_str()));

    // Set API version
    let api_version_1 = warp::path("v1");

    // POST a single item.
    // Input: `{"title": ..., "description": ...}`.
    // Return id of the created item.
    let service_ref = service.clone();
    let create_item = api_version_1
        .and(warp::path("items"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .map(move |body: Bytes| {
            let ctx = RequestContext::with_timeout(store_timeout);
            let result = warp_endpoints::create_item(&service_ref, &ctx, body);
            respond_with_data(result)
        });

    // GET a page of items.
    // Query: `page`, `limit`, both optional and normalized.
    // Return `{"data": [...], "paging": {"page", "limit", "total"}}`.
    let service_ref = service.clone();
    let list_items = api_version_1
        .and(warp::path("items"))
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .map(move |query: HashMap<String, String>| {
            let ctx = RequestContext::with_timeout(store_timeout);
            let result = warp_endpoints::list_items(&service_ref, &ctx, query);
            respond(result)
        });

    // GET a single item.
    // Parameter:
    //     id: id of requested item, a positive integer.
    let service_ref = service.clone();
    let get_item = api_version_1
        .and(warp::path!("items" / String))
        .and(warp::get())
        .map(move |id: String| {
            let ctx = RequestContext::with_timeout(store_timeout);
            let result = warp_endpoints::get_item(&service_ref, &ctx, id);
            respond_with_data(result)
        });

    // PATCH (partially update) a single item
    // Input:
    //      - id of the item to be updated
    //      - json with any of `title`, `description`, `status`
    // See `ItemService::update_item` for more details
    let service_ref = service.clone();
    let update_item = api_version_1
        .and(warp::path!("items" / String))
        .and(warp::patch())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .map(move |id: String, body: Bytes| {
            let ctx = RequestContext::with_timeout(store_timeout);
            let result = warp_endpoints::update_item(&service_ref, &ctx, id, body);
            respond_with_data(result)
        });

    // DELETE a single item
    let service_ref = service;
    let delete_item = api_version_1
        .and(warp::path!("items" / String))
        .and(warp::delete())
        .map(move |id: String| {
            let ctx = RequestContext::with_timeout(store_timeout);
            let result = warp_endpoints::delete_item(&service_ref, &ctx, id);
            respond_with_data(result)
        });

    ping.or(version)
        .or(create_item)
        .or(list_items)
        .or(get_item)
        .or(update_item)
        .or(delete_item)
        .recover(handle_rejection)
}

/// Turn rejections raised by warp itself into the same `{"error": ...}` body
/// the endpoints use, keeping warp's status code. Unknown rejections pass through.
async fn handle_rejection(rejection: Rejection) -> std::result::Result<Box<dyn Reply>, Rejection> {
    // `find` searches every combined rejection, so specific ones go before 405.
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Route not found".to_string())
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("Request body is larger than {} bytes", MAX_BODY_BYTES),
        )
    } else if rejection.find::<warp::reject::LengthRequired>().is_some() {
        (
            StatusCode::LENGTH_REQUIRED,
            "Request body needs a Content-Length header".to_string(),
        )
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "HTTP method not allowed on this route".to_string(),
        )
    } else {
        return Err(rejection);
    };
    warn!("Request rejected with {}: {}", status, message);
    let body = ErrorResponse { error: message };
    Ok(Box::new(warp::reply::with_status(warp::reply::json(&body), status)))
}

/// Wrap a successful value as `{"data": value}`.
fn respond_with_data<T: Serialize>(result: Result<T>) -> Box<dyn Reply> {
    respond(result.map(|data| DataResponse { data }))
}

fn respond<T: Serialize>(result: Result<T>) -> Box<dyn Reply> {
    match result {
        Ok(body) => Box::new(warp::reply::json(&body)),
        Err(err) => {
            warn!("Request failed: {}", err);
            let body = ErrorResponse { error: err.msg };
            Box::new(warp::reply::with_status(
                warp::reply::json(&body),
                err.kind.status_code(),
            ))
        }
    }
}
