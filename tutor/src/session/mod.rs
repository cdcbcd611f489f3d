//! Session controller state machine
//!
//! Owns the current document, question, answer, and history, and sequences
//! the encoder, answer service, and history store. The presentation layer
//! (CLI or REPL) only reads the controller's state and issues commands.

mod controller;
mod error;

pub use controller::{DiagramState, SessionController, SessionState};
pub use error::SessionError;
