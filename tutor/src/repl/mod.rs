//! Interactive REPL for the tutor
//!
//! Open a chapter, ask questions as plain input, and browse history with
//! slash commands.

mod session;

pub use session::ReplSession;

use std::path::PathBuf;

use eyre::Result;

use crate::config::Config;
use crate::genai::create_service;
use historystore::HistoryStore;

/// Run the interactive REPL
///
/// This is the main entry point for `tutor repl`.
pub async fn run_interactive(config: &Config, initial_file: Option<PathBuf>) -> Result<()> {
    // Validate API key early
    config.validate()?;

    let service =
        create_service(&config.genai).map_err(|e| eyre::eyre!("Failed to create answer service: {}", e))?;
    let store = HistoryStore::open(&config.storage.history_dir)?;

    let mut session = ReplSession::new(service, store);
    session.run(initial_file).await
}
