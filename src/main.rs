//! Binary entry point that glues the SQLite-backed catalog to the TUI.
use library_manager::{init_logging, open_store, run_app, App, Config};
use tracing::{error, info};

/// Resolve the data directory, open (and on first run seed) the store, then
/// run the Ratatui event loop until the user exits.
fn main() -> anyhow::Result<()> {
    let config = Config::resolve()?;
    init_logging(&config.log_path)?;
    info!(data_dir = %config.data_dir().display(), "starting library manager");

    let (conn, seeded) = open_store(&config.db_path).inspect_err(|err| {
        error!(error = ?err, "failed to open the store");
    })?;
    if !seeded.is_empty() {
        info!(books = seeded.books, loans = seeded.loans, "first run, store seeded");
    }

    let mut app = App::new(conn)?;
    run_app(&mut app).inspect_err(|err| error!(error = ?err, "terminal session failed"))
}
