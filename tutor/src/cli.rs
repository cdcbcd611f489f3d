//! CLI argument parsing for the tutor

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tutor")]
#[command(author, version, about = "Ask questions against a textbook chapter", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (overrides RUST_LOG)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask a single question about a document
    Ask {
        /// Document to ask about (PDF chapter)
        #[arg(short, long)]
        file: PathBuf,

        /// The question
        #[arg(required = true)]
        question: String,

        /// Also render the answer's diagram to this path
        #[arg(long)]
        diagram: Option<PathBuf>,
    },

    /// Interactive tutoring session
    Repl {
        /// Document to open on startup
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show the stored history for a document
    History {
        /// Document whose history to show
        #[arg(short, long)]
        file: PathBuf,
    },
}
