//! Core HistoryStore implementation

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The four-field answer contract produced for every question
///
/// All fields are required. A response missing any of them never makes it
/// into a `HistoryItem`; schema validation is all-or-nothing at parse time.
/// Field names are serde-renamed to match the wire schema the remote model
/// is instructed to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredAnswer {
    /// A concise answer in exactly one sentence
    pub one_line: String,
    /// A slightly more descriptive answer, about two sentences
    pub two_lines: String,
    /// A detailed explanation roughly five sentences long
    pub five_lines: String,
    /// Text description of a diagram that explains the concept visually
    pub diagram_description: String,
}

/// One past question/answer exchange, immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    /// Unique item ID
    pub id: String,
    /// The question as the user asked it
    pub question: String,
    /// The full structured answer (diagram images are never stored;
    /// they are regenerated from `answer.diagram_description` on demand)
    pub answer: StructuredAnswer,
    /// Creation timestamp (unix ms)
    pub timestamp: i64,
}

impl HistoryItem {
    /// Create a new item with a fresh ID and the current timestamp
    pub fn new(question: impl Into<String>, answer: StructuredAnswer) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            question: question.into(),
            answer,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Ordered log of exchanges for one document, newest first
pub type HistoryLog = Vec<HistoryItem>;

/// File-backed history store, one JSON array per document
pub struct HistoryStore {
    /// Base path for storage
    base_path: PathBuf,
}

impl HistoryStore {
    /// Open or create a history store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create history store directory")?;
        debug!(?base_path, "Opened history store");
        Ok(Self { base_path })
    }

    /// Derive the storage key for a document name
    ///
    /// Deterministic: a fixed namespace prefix plus the document name with
    /// every non-alphanumeric byte mapped to '_', so "chapter1.pdf" and
    /// "chapter1_pdf" collide on purpose rather than escaping the directory.
    pub fn key_for(document: &str) -> String {
        let sanitized: String = document
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{}{}", crate::HISTORY_FILE_PREFIX, sanitized)
    }

    fn path_for(&self, document: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", Self::key_for(document)))
    }

    /// Load the stored log for a document
    ///
    /// A missing file or unparsable contents both yield an empty log.
    /// Corrupt data is treated as absent, never surfaced as a hard error.
    pub fn load(&self, document: &str) -> HistoryLog {
        let path = self.path_for(document);
        debug!(%document, path = %path.display(), "load: called");

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!(%document, error = %e, "load: no stored history, starting empty");
                return HistoryLog::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(log) => log,
            Err(e) => {
                warn!(%document, error = %e, "load: stored history is corrupt, resetting to empty");
                HistoryLog::new()
            }
        }
    }

    /// Prepend an item to the log and persist the result
    ///
    /// The updated log is always returned. If the write fails the failure is
    /// logged and history continues in-memory only for this session; callers
    /// never see a storage error.
    pub fn append(&self, document: &str, item: HistoryItem, log: &HistoryLog) -> HistoryLog {
        debug!(%document, item_id = %item.id, log_len = log.len(), "append: called");

        let mut updated = Vec::with_capacity(log.len() + 1);
        updated.push(item);
        updated.extend(log.iter().cloned());

        if let Err(e) = self.persist(document, &updated) {
            warn!(%document, error = %e, "append: persist failed, history is session-only");
        }

        updated
    }

    fn persist(&self, document: &str, log: &HistoryLog) -> Result<()> {
        let path = self.path_for(document);
        let content = serde_json::to_string(log)?;
        fs::write(&path, content).context(format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// List the storage keys of all documents with stored history
    pub fn list_documents(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();

        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && stem.starts_with(crate::HISTORY_FILE_PREFIX)
            {
                keys.push(stem.to_string());
            }
        }

        keys.sort();
        Ok(keys)
    }

    /// Delete the stored log for a document
    pub fn clear(&self, document: &str) -> Result<()> {
        let path = self.path_for(document);
        if path.exists() {
            fs::remove_file(&path)?;
            info!(%document, "Cleared stored history");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn answer(text: &str) -> StructuredAnswer {
        StructuredAnswer {
            one_line: text.to_string(),
            two_lines: format!("{} in two lines", text),
            five_lines: format!("{} in five lines", text),
            diagram_description: format!("{} diagram", text),
        }
    }

    #[test]
    fn test_load_missing_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = HistoryStore::open(temp.path()).unwrap();

        assert!(store.load("chapter1.pdf").is_empty());
    }

    #[test]
    fn test_append_prepends_and_persists() {
        let temp = TempDir::new().unwrap();
        let store = HistoryStore::open(temp.path()).unwrap();

        let log = store.load("chapter1.pdf");
        let log = store.append("chapter1.pdf", HistoryItem::new("first", answer("a")), &log);
        let log = store.append("chapter1.pdf", HistoryItem::new("second", answer("b")), &log);

        assert_eq!(log.len(), 2);
        assert_eq!(log[0].question, "second");
        assert_eq!(log[1].question, "first");

        // Reopen and verify the order survived the round trip
        let store = HistoryStore::open(temp.path()).unwrap();
        let reloaded = store.load("chapter1.pdf");
        assert_eq!(reloaded, log);
    }

    #[test]
    fn test_corrupt_file_resets_to_empty() {
        let temp = TempDir::new().unwrap();
        let store = HistoryStore::open(temp.path()).unwrap();

        let log = store.append("notes.pdf", HistoryItem::new("q", answer("a")), &HistoryLog::new());
        assert_eq!(log.len(), 1);

        let path = temp.path().join(format!("{}.json", HistoryStore::key_for("notes.pdf")));
        fs::write(&path, "{not json!").unwrap();

        assert!(store.load("notes.pdf").is_empty());
    }

    #[test]
    fn test_append_survives_write_failure() {
        let temp = TempDir::new().unwrap();
        let store = HistoryStore::open(temp.path()).unwrap();

        // Occupy the target file path with a directory so the write fails
        let path = temp.path().join(format!("{}.json", HistoryStore::key_for("chapter1.pdf")));
        fs::create_dir(&path).unwrap();

        let log = store.append("chapter1.pdf", HistoryItem::new("q", answer("a")), &HistoryLog::new());

        // The in-memory log keeps the item; history is session-only
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].question, "q");
        assert!(store.load("chapter1.pdf").is_empty());
    }

    #[test]
    fn test_documents_are_isolated() {
        let temp = TempDir::new().unwrap();
        let store = HistoryStore::open(temp.path()).unwrap();

        let log_a = store.append("a.pdf", HistoryItem::new("about a", answer("a")), &HistoryLog::new());
        store.append("b.pdf", HistoryItem::new("about b", answer("b")), &HistoryLog::new());

        assert_eq!(store.load("a.pdf"), log_a);
        assert_eq!(store.load("b.pdf").len(), 1);
        assert_eq!(store.load("b.pdf")[0].question, "about b");
    }

    #[test]
    fn test_key_derivation_is_deterministic() {
        assert_eq!(HistoryStore::key_for("chapter1.pdf"), "history_chapter1_pdf");
        assert_eq!(HistoryStore::key_for("chapter1.pdf"), HistoryStore::key_for("chapter1.pdf"));
        // Path separators cannot escape the store directory
        assert_eq!(HistoryStore::key_for("../../etc/passwd"), "history_______etc_passwd");
    }

    #[test]
    fn test_list_and_clear() {
        let temp = TempDir::new().unwrap();
        let store = HistoryStore::open(temp.path()).unwrap();

        store.append("a.pdf", HistoryItem::new("q", answer("a")), &HistoryLog::new());
        store.append("b.pdf", HistoryItem::new("q", answer("b")), &HistoryLog::new());

        let keys = store.list_documents().unwrap();
        assert_eq!(keys, vec!["history_a_pdf".to_string(), "history_b_pdf".to_string()]);

        store.clear("a.pdf").unwrap();
        let keys = store.list_documents().unwrap();
        assert_eq!(keys, vec!["history_b_pdf".to_string()]);
        assert!(store.load("a.pdf").is_empty());
    }

    #[test]
    fn test_structured_answer_wire_names() {
        let json = r#"{
            "oneLine": "one",
            "twoLines": "two",
            "fiveLines": "five",
            "diagramDescription": "diagram"
        }"#;
        let parsed: StructuredAnswer = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.one_line, "one");
        assert_eq!(parsed.diagram_description, "diagram");

        let back = serde_json::to_value(&parsed).unwrap();
        assert!(back.get("oneLine").is_some());
        assert!(back.get("one_line").is_none());
    }

    #[test]
    fn test_structured_answer_missing_field_rejected() {
        let json = r#"{"oneLine": "one", "twoLines": "two", "fiveLines": "five"}"#;
        assert!(serde_json::from_str::<StructuredAnswer>(json).is_err());
    }
}
