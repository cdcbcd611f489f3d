//! Generative-AI client module
//!
//! Provides the [`AnswerService`] abstraction and the Gemini REST
//! implementation behind it.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod gemini;

pub use client::AnswerService;
pub use error::AnswerError;
pub use gemini::GeminiClient;

use crate::config::GenAiConfig;

/// Create the answer service from configuration
pub fn create_service(config: &GenAiConfig) -> Result<Arc<dyn AnswerService>, AnswerError> {
    debug!(model = %config.model, image_model = %config.image_model, "create_service: called");
    Ok(Arc::new(GeminiClient::from_config(config)?))
}
