//! SessionController - the orchestrating state machine

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use super::SessionError;
use crate::document::{self, Document, EncodedDocument};
use crate::genai::AnswerService;
use historystore::{HistoryItem, HistoryLog, HistoryStore, StructuredAnswer};

/// Where the session is in its question cycle
///
/// No state is terminal; selecting a document or submitting a question
/// restarts the cycle from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ready for a document or a question
    Idle,
    /// Encoding a freshly selected document
    ReadingDocument,
    /// An answer request is in flight
    AwaitingAnswer,
    /// A structured answer is displayed
    AnswerReady,
    /// The last document read or answer request failed
    Failed,
}

/// Diagram lifecycle, independent of the answer cycle
///
/// A diagram failure never invalidates the answer it belongs to; it only
/// parks the diagram display in `Failed` until the user retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramState {
    Idle,
    Generating,
    Ready(Vec<u8>),
    Failed(String),
}

/// Owns session state and sequences encoder, answer service, and history
///
/// Collaborators are injected so tests can substitute a scripted service
/// and a tempdir-backed store. All transitions are applied from the single
/// control task; an in-flight answer is superseded by bumping a generation
/// counter, not by cancelling the network call.
pub struct SessionController {
    service: Arc<dyn AnswerService>,
    store: HistoryStore,
    state: SessionState,
    document_name: Option<String>,
    encoded: Option<EncodedDocument>,
    question: Option<String>,
    answer: Option<StructuredAnswer>,
    error: Option<SessionError>,
    history: HistoryLog,
    diagram: DiagramState,
    generation: u64,
}

impl SessionController {
    pub fn new(service: Arc<dyn AnswerService>, store: HistoryStore) -> Self {
        Self {
            service,
            store,
            state: SessionState::Idle,
            document_name: None,
            encoded: None,
            question: None,
            answer: None,
            error: None,
            history: HistoryLog::new(),
            diagram: DiagramState::Idle,
            generation: 0,
        }
    }

    // === Commands ===

    /// Select a document from disk
    ///
    /// Clears the previous question, answer, and error immediately, swaps in
    /// the new document's stored history, and caches the encoded form for
    /// reuse across questions. A read failure moves the session to `Failed`.
    pub fn select_document(&mut self, path: &Path) {
        debug!(path = %path.display(), "select_document: called");
        self.begin_select();

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.document_name = Some(name.clone());
        self.history = self.store.load(&name);

        match Document::from_path(path) {
            Ok(doc) => self.finish_select(doc),
            Err(e) => {
                self.state = SessionState::Failed;
                self.error = Some(SessionError::Encoding(e));
            }
        }
    }

    /// Select a document from already-loaded bytes
    pub fn select_document_bytes(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        let name = name.into();
        debug!(%name, len = bytes.len(), "select_document_bytes: called");
        self.begin_select();
        self.document_name = Some(name.clone());
        self.history = self.store.load(&name);
        self.finish_select(Document::new(name, bytes));
    }

    fn begin_select(&mut self) {
        self.bump_generation();
        self.state = SessionState::ReadingDocument;
        self.question = None;
        self.answer = None;
        self.error = None;
        self.diagram = DiagramState::Idle;
        self.encoded = None;
    }

    fn finish_select(&mut self, doc: Document) {
        self.encoded = Some(document::encode(&doc));
        self.state = SessionState::Idle;
        info!(document = %doc.name, history_len = self.history.len(), "Document ready");
    }

    /// Submit a question against the current document
    ///
    /// A whitespace-only question is a no-op: no transition, no service
    /// call. Without a cached document the session fails with `NoDocument`
    /// before the service is ever contacted.
    pub async fn submit_question(&mut self, question: &str) {
        let question = question.trim();
        if question.is_empty() {
            debug!("submit_question: empty question ignored");
            return;
        }

        let Some(doc) = self.encoded.clone() else {
            debug!("submit_question: no document cached");
            self.answer = None;
            self.error = Some(SessionError::NoDocument);
            self.state = SessionState::Failed;
            return;
        };

        // Prior answer/error clear when the new cycle begins, not when it
        // completes, so the presentation shows in-progress promptly.
        self.question = Some(question.to_string());
        self.answer = None;
        self.error = None;
        self.diagram = DiagramState::Idle;
        self.state = SessionState::AwaitingAnswer;
        let generation = self.bump_generation();

        let result = self.service.request_answer(&doc, question).await;
        self.apply_answer(generation, question.to_string(), result);
    }

    /// Apply an answer result if it is not stale
    ///
    /// The generation counter is compared at response arrival: a result for
    /// a superseded question or document is discarded without touching any
    /// state.
    fn apply_answer(
        &mut self,
        generation: u64,
        question: String,
        result: Result<StructuredAnswer, crate::genai::AnswerError>,
    ) {
        if generation != self.generation {
            debug!(generation, current = self.generation, "apply_answer: stale response discarded");
            return;
        }

        match result {
            Ok(answer) => {
                if let Some(name) = self.document_name.clone() {
                    let item = HistoryItem::new(question, answer.clone());
                    self.history = self.store.append(&name, item, &self.history);
                }
                self.answer = Some(answer);
                self.error = None;
                self.state = SessionState::AnswerReady;
            }
            Err(e) => {
                self.state = SessionState::Failed;
                self.error = Some(SessionError::Answer(e));
            }
        }
    }

    /// Restore a past exchange without contacting the service
    ///
    /// Viewing history never re-appends; the log length is unchanged.
    /// Returns false if no item has the given ID.
    pub fn select_history_item(&mut self, id: &str) -> bool {
        debug!(%id, "select_history_item: called");
        let Some(item) = self.history.iter().find(|item| item.id == id).cloned() else {
            return false;
        };

        self.question = Some(item.question);
        self.answer = Some(item.answer);
        self.error = None;
        self.diagram = DiagramState::Idle;
        self.state = SessionState::AnswerReady;
        true
    }

    /// Drop the current answer and return to idle
    pub fn clear_answer(&mut self) {
        debug!("clear_answer: called");
        self.question = None;
        self.answer = None;
        self.diagram = DiagramState::Idle;
        if self.state == SessionState::AnswerReady {
            self.state = SessionState::Idle;
        }
    }

    /// Fetch the diagram image for the current answer
    ///
    /// Failure is localized to the diagram display; the session state and
    /// the answer are untouched.
    pub async fn request_diagram(&mut self) {
        let Some(description) = self.answer.as_ref().map(|a| a.diagram_description.clone()) else {
            debug!("request_diagram: no answer to illustrate");
            return;
        };

        self.diagram = DiagramState::Generating;
        let generation = self.generation;

        let result = self.service.request_diagram(&description).await;

        if generation != self.generation {
            debug!("request_diagram: session moved on, result discarded");
            return;
        }

        self.diagram = match result {
            Ok(bytes) => DiagramState::Ready(bytes),
            Err(e) => DiagramState::Failed(e.to_string()),
        };
    }

    /// User-triggered retry of a failed diagram
    pub async fn retry_diagram(&mut self) {
        self.request_diagram().await;
    }

    fn bump_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    // === Read surface for the presentation layer ===

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn document_name(&self) -> Option<&str> {
        self.document_name.as_deref()
    }

    pub fn has_document(&self) -> bool {
        self.encoded.is_some()
    }

    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }

    pub fn answer(&self) -> Option<&StructuredAnswer> {
        self.answer.as_ref()
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn diagram(&self) -> &DiagramState {
        &self.diagram
    }
}
