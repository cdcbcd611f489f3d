//! Tutor - document tutoring assistant
//!
//! CLI entry point: one-shot questions, history inspection, and the
//! interactive session.

use std::fs;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::debug;

use tutor::cli::{Cli, Command};
use tutor::config::Config;
use tutor::genai::create_service;
use tutor::render;
use tutor::repl;
use tutor::session::{DiagramState, SessionController, SessionState};
use historystore::HistoryStore;

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = match cli_log_level {
        Some(level) => EnvFilter::try_new(level).context(format!("Invalid log level: {}", level))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level.as_deref())?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    debug!(?cli.command, "starting");

    match cli.command {
        Command::Ask { file, question, diagram } => {
            config.validate()?;

            let service = create_service(&config.genai).map_err(|e| eyre::eyre!("{}", e))?;
            let store = HistoryStore::open(&config.storage.history_dir)?;
            let mut session = SessionController::new(service, store);

            session.select_document(&file);
            if session.state() == SessionState::Failed {
                if let Some(e) = session.error() {
                    eyre::bail!("{}", e);
                }
            }

            session.submit_question(&question).await;
            match session.state() {
                SessionState::AnswerReady => {
                    if let Some(answer) = session.answer() {
                        render::print_answer(answer);
                    }
                }
                SessionState::Failed => {
                    if let Some(e) = session.error() {
                        eyre::bail!("{}", e);
                    }
                }
                _ => {}
            }

            // Diagram failures are reported but never fail the answer
            if let Some(out) = diagram {
                session.request_diagram().await;
                match session.diagram() {
                    DiagramState::Ready(bytes) => {
                        fs::write(&out, bytes).context(format!("Failed to write {}", out.display()))?;
                        println!("{} Diagram written to {}", "✓".green(), out.display().to_string().cyan());
                    }
                    DiagramState::Failed(message) => {
                        eprintln!("{} Diagram generation failed: {}", "✗".red(), message);
                    }
                    _ => {}
                }
            }
        }
        Command::Repl { file } => {
            repl::run_interactive(&config, file).await?;
        }
        Command::History { file } => {
            let store = HistoryStore::open(&config.storage.history_dir)?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());
            let log = store.load(&name);
            println!("{}", name.cyan());
            render::print_history(&log);
        }
    }

    Ok(())
}
