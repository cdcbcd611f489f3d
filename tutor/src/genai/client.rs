//! AnswerService trait definition

use async_trait::async_trait;

use super::AnswerError;
use crate::document::EncodedDocument;
use historystore::StructuredAnswer;

/// Stateless answer service - each call is independent
///
/// This is the core abstraction over the remote model. The two operations
/// are deliberately decoupled: a diagram failure never invalidates a
/// successfully obtained text answer, and a diagram can be regenerated
/// without re-querying the document.
#[async_trait]
pub trait AnswerService: Send + Sync {
    /// Ask a question against an encoded document
    ///
    /// The request carries a fixed tutoring instruction, the question text,
    /// and the document as an attached payload. The response must satisfy
    /// the full four-field answer schema; anything less is an error.
    async fn request_answer(
        &self,
        document: &EncodedDocument,
        question: &str,
    ) -> Result<StructuredAnswer, AnswerError>;

    /// Render a diagram image for an answer's diagram description
    ///
    /// Returns the raw bytes of the first inline image in the response.
    async fn request_diagram(&self, description: &str) -> Result<Vec<u8>, AnswerError>;
}
