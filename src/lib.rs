// Library interface, used by the binary, integration tests and benches

pub mod api_model;
pub mod command_line_interface;
pub mod database_api;
pub mod database_columns;
pub mod database_migrate_refinery;
pub mod error;
pub mod item_model;
pub mod item_service;
pub mod item_store;
pub mod memory_store;
pub mod pagination;
pub mod sql_converters;
pub mod validation;
pub mod warp_api;
pub mod warp_endpoints;
