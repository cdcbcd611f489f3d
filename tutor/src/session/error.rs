//! Session error types

use thiserror::Error;

use crate::document::EncodeError;
use crate::genai::AnswerError;

/// Errors that fail a session cycle and are shown to the user
///
/// Storage failures never appear here; the history store absorbs them and
/// degrades to session-only history. Diagram failures stay localized to the
/// diagram display and never fail the session either.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The selected document could not be read
    #[error("failed to read the document: {0}")]
    Encoding(#[from] EncodeError),

    /// A question was submitted with no document loaded
    #[error("no document loaded; select a document first")]
    NoDocument,

    /// The answer request failed
    #[error("{0}")]
    Answer(#[from] AnswerError),
}
