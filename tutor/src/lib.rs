//! Tutor - document tutoring assistant
//!
//! Point the tutor at a textbook chapter (PDF) and ask questions about it.
//! Answers come back in a fixed four-part structure (one line, two lines,
//! five lines, diagram description) generated by a remote model that is
//! constrained to the supplied document. Each document keeps its own durable
//! question/answer history, and diagrams are rendered on demand from the
//! answer's diagram description.
//!
//! # Core Concepts
//!
//! - **Answers From The Document Only**: the model is instructed to answer
//!   strictly from the attached chapter, never general knowledge
//! - **All-Or-Nothing Answers**: a response missing any of the four fields
//!   is rejected, never shown or stored partially
//! - **Per-Document History**: switching documents swaps in that document's
//!   stored log; histories never merge
//! - **Best-Effort Persistence**: a failed history write degrades to
//!   session-only history rather than failing the question
//!
//! # Modules
//!
//! - [`genai`] - AnswerService trait and the Gemini implementation
//! - [`session`] - Session controller state machine
//! - [`document`] - Document loading and transport encoding
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface
//! - [`repl`] - Interactive front end

pub mod cli;
pub mod config;
pub mod document;
pub mod genai;
pub mod prompts;
pub mod render;
pub mod repl;
pub mod session;

// Re-export commonly used types
pub use config::{Config, GenAiConfig, StorageConfig};
pub use document::{Document, EncodeError, EncodedDocument};
pub use genai::{AnswerError, AnswerService, GeminiClient, create_service};
pub use historystore::{HistoryItem, HistoryLog, HistoryStore, StructuredAnswer};
pub use session::{DiagramState, SessionController, SessionError, SessionState};
