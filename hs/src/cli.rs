//! CLI argument parsing for historystore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hs")]
#[command(author, version, about = "Per-document Q&A history store", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all documents with stored history
    List,

    /// Show the stored log for a document
    Show {
        /// Document name (e.g. chapter1.pdf)
        #[arg(required = true)]
        document: String,
    },

    /// Delete the stored log for a document
    Clear {
        /// Document name to clear
        #[arg(required = true)]
        document: String,
    },
}
