use crate::error::Result;
use log::info;
use refinery::Runner;
use rusqlite::Connection;

pub mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("./res/migrations");
}

/// Run "refinery" migrations to bring the `todo_items` table up-to-date
pub fn migrate(conn: &mut Connection) -> Result<()> {
    let runner: Runner = embedded::migrations::runner();
    let report = runner.run(conn)?;
    for migration in report.applied_migrations() {
        info!("Applied database migration {}", migration);
    }
    Ok(())
}
