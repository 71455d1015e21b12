use chrono::Utc;
use env_logger::Env;
use log::error;
use log::info;
use std::io::Write;
use std::sync::Arc;
use structopt::StructOpt;
use todo_items::command_line_interface::CliOptions;
use todo_items::database_api;
use todo_items::database_api::SqliteItemStore;
use todo_items::error::Result;
use todo_items::item_service::ItemService;
use todo_items::item_store::ItemStore;
use todo_items::memory_store::InMemoryItemStore;
use todo_items::warp_api;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().filter_or("RUST_LOG", "info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Utc::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    let cli_options = CliOptions::from_args();
    info!("Starting with options {:?}", cli_options);

    let store = open_store(&cli_options).unwrap_or_else(|err| {
        error!("Failed to open item store, {}", err);
        std::process::exit(1);
    });
    let service = ItemService::new(store, cli_options.service_config());

    // Start web framework
    warp_api::run_server(&cli_options, service).await;
}

fn open_store(cli_options: &CliOptions) -> Result<Arc<dyn ItemStore>> {
    if cli_options.in_memory {
        info!("Using in-memory item store, data is lost on exit");
        return Ok(Arc::new(InMemoryItemStore::new()));
    }
    info!(
        "Using SQLite item store at {}",
        cli_options.database_file.display()
    );
    let pool = database_api::open_pool(
        &cli_options.database_file,
        cli_options.database_pool_size,
    )?;
    Ok(Arc::new(SqliteItemStore::new(pool)?))
}
