//! HistoryStore - durable per-document Q&A history
//!
//! Stores the ordered log of past question/answer exchanges for each
//! document the tutor has seen. One JSON file per document, newest item
//! first. Corrupt or missing files read back as an empty log; a failed
//! write degrades history to session-only instead of failing the caller.
//!
//! # Architecture
//!
//! ```text
//! <history-dir>/
//! ├── history_chapter1_pdf.json
//! ├── history_chapter2_pdf.json
//! └── ...
//! ```
//!
//! # Example
//!
//! ```ignore
//! use historystore::{HistoryItem, HistoryStore, StructuredAnswer};
//!
//! let store = HistoryStore::open("~/.local/share/tutor/history")?;
//! let log = store.load("chapter1.pdf");
//! let log = store.append("chapter1.pdf", item, &log);
//! ```

pub mod cli;
pub mod config;
mod store;

pub use store::{HistoryItem, HistoryLog, HistoryStore, StructuredAnswer};

/// Prefix for history files, namespacing them within the store directory
pub const HISTORY_FILE_PREFIX: &str = "history_";
