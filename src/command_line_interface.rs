use crate::item_service::DeleteMode;
use crate::item_service::ServiceConfig;
use crate::validation::EmptyFieldPolicy;
use lazy_static::lazy_static;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;
use structopt::clap::AppSettings;
use structopt::StructOpt;

#[derive(StructOpt, Debug, Clone)]
#[structopt(
    name = "Todo items, a small HTTP service for todo items.",
    setting = AppSettings::DeriveDisplayOrder,
    setting = AppSettings::UnifiedHelpMessage,
    version = VERSION.as_str(),
)]
pub struct CliOptions {
    /// Port to listen to.
    #[structopt(short, long, default_value = "3000", env = "TODO_PORT")]
    pub port: u16,

    /// Network interface to listen on.
    /// Use "0.0.0.0" to accept connections from other machines.
    #[structopt(
        short,
        long,
        default_value = "127.0.0.1",
        name = "NETWORK_INTERFACE",
        env = "TODO_ADDRESS"
    )]
    pub address: IpAddr,

    /// SQLite database file. Missing parent directories are created.
    #[structopt(
        short,
        long,
        default_value = "./data/db/todo_items.sqlite",
        name = "DATABASE_FILE",
        env = "TODO_DATABASE_FILE"
    )]
    pub database_file: PathBuf,

    /// Maximum number of pooled SQLite connections.
    #[structopt(long, default_value = "8", env = "TODO_DATABASE_POOL_SIZE")]
    pub database_pool_size: u32,

    /// Keep items in process memory instead of SQLite.
    /// Everything is lost when the process stops.
    #[structopt(long)]
    pub in_memory: bool,

    /// What deleting an item does:
    /// "hard" removes the row, "soft" keeps it with status "Deleted".
    /// Items with status "Deleted" are never listed in either mode.
    #[structopt(
        long,
        default_value = "hard",
        possible_values = &["hard", "soft"],
        env = "TODO_DELETE_MODE"
    )]
    pub delete_mode: DeleteMode,

    /// How empty strings in an update are treated:
    /// "skip" keeps the stored value (a field cannot be cleared),
    /// "apply" writes the empty string.
    #[structopt(
        long,
        default_value = "skip",
        possible_values = &["skip", "apply"],
        env = "TODO_EMPTY_FIELD_POLICY"
    )]
    pub empty_field_policy: EmptyFieldPolicy,

    /// Time budget, in milliseconds, for the store part of a single request.
    #[structopt(long, default_value = "5000", env = "TODO_STORE_TIMEOUT_MS")]
    pub store_timeout_ms: u64,

    /// File to read https public certificate from.
    /// Https is used only when both this and the key file are set.
    #[structopt(short = "c", long, name = "CERTIFICATE_FILE", env = "TODO_TLS_PUB_CRT")]
    pub tls_pub_crt: Option<PathBuf>,

    /// File to read https private key from.
    #[structopt(short = "k", long, name = "KEY_FILE", env = "TODO_TLS_PRIV_KEY")]
    pub tls_priv_key: Option<PathBuf>,
}

impl CliOptions {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            delete_mode: self.delete_mode,
            empty_field_policy: self.empty_field_policy,
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

/// Crate version plus `git describe` of the build.
pub fn get_project_version() -> String {
    format!("{} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_DESCRIBE"))
}

lazy_static! {
    pub static ref VERSION: String = get_project_version();
}
