//! The `stats` command: read the store once, then hand the report to the
//! interactive statistics view.

use chrono::Utc;

use tomatui_core::storage::Database;

use crate::tui::stats_view::{self, StatsReport};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open_default()?;
    let report = StatsReport::load(&db, Utc::now().date_naive())?;
    drop(db);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(stats_view::run(report))?;
    Ok(())
}
