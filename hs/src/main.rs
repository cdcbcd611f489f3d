use chrono::{Local, TimeZone};
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use historystore::HistoryStore;
use historystore::cli::Cli;
use historystore::config::Config;

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("historystore starting");

    match cli.command {
        historystore::cli::Command::List => {
            let store = HistoryStore::open(&config.store_path)?;
            let documents = store.list_documents()?;
            if documents.is_empty() {
                println!("No history stored");
            } else {
                for key in documents {
                    println!("{}", key);
                }
            }
        }
        historystore::cli::Command::Show { document } => {
            let store = HistoryStore::open(&config.store_path)?;
            let log = store.load(&document);
            if log.is_empty() {
                println!("No history for {}", document.cyan());
            } else {
                println!("{} ({} items, newest first)", document.cyan(), log.len());
                for item in &log {
                    let when = Local
                        .timestamp_millis_opt(item.timestamp)
                        .single()
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "?".to_string());
                    println!("  {} {}", when.dimmed(), item.question.bold());
                    println!("    {}", item.answer.one_line);
                }
            }
        }
        historystore::cli::Command::Clear { document } => {
            let store = HistoryStore::open(&config.store_path)?;
            store.clear(&document)?;
            println!("{} Cleared history: {}", "✓".green(), document);
        }
    }

    Ok(())
}
