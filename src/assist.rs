//! Document assistant façade.
//!
//! Wires the pipeline end to end: upload a document (extract text, find
//! placeholders, run inference, seed a session), chat turn by turn until
//! every field is filled, then render through the gate. The surrounding
//! transport (HTTP or otherwise) is expected to be a thin layer over these
//! calls.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::document::TemplateDocument;
use crate::error::{AssistError, AssistResult};
use crate::extract;
use crate::infer::{enrich_placeholders, TypeInference};
use crate::model::{ConversationTurn, Placeholder, SessionState, SessionStatus};
use crate::render::{render_document, RenderSummary};
use crate::session::SessionStore;
use crate::turn::{TurnEngine, TurnOutcome, ValueExtractor};

/// Result of uploading a document.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub session_id: Uuid,
    pub placeholders: Vec<Placeholder>,
    /// Opening assistant message naming the detected fields.
    pub greeting: String,
}

/// The assembled resolution engine.
pub struct DocumentAssistant {
    store: Arc<dyn SessionStore>,
    inference: Arc<dyn TypeInference>,
    engine: TurnEngine,
    context_window: usize,
}

impl DocumentAssistant {
    pub fn new(
        store: Arc<dyn SessionStore>,
        inference: Arc<dyn TypeInference>,
        extractor: Arc<dyn ValueExtractor>,
    ) -> Self {
        Self {
            store,
            inference,
            engine: TurnEngine::new(extractor),
            context_window: extract::CONTEXT_WINDOW_CHARS,
        }
    }

    pub fn with_context_window(mut self, chars: usize) -> Self {
        self.context_window = chars;
        self
    }

    /// Ingest a document: extract text, detect placeholders, infer types,
    /// and open a session seeded with a greeting.
    pub async fn upload(&self, document: TemplateDocument) -> AssistResult<UploadOutcome> {
        let text = document.plain_text();
        if text.trim().is_empty() {
            return Err(AssistError::Extraction(
                "document contains no extractable text".to_string(),
            ));
        }

        let mut placeholders = extract::find_placeholders_with_window(&text, self.context_window);
        enrich_placeholders(&mut placeholders, self.inference.as_ref()).await;

        let greeting = greeting(&placeholders);
        let mut state = SessionState::new(document, placeholders.clone());
        state.push_turn(ConversationTurn::assistant(&greeting));

        let session_id = self.store.insert(state).await;
        info!(%session_id, fields = placeholders.len(), "session opened");

        Ok(UploadOutcome {
            session_id,
            placeholders,
            greeting,
        })
    }

    /// Process one chat turn. The session is locked for the duration, so
    /// concurrent turns against the same session serialize.
    pub async fn chat(&self, session_id: Uuid, message: &str) -> AssistResult<TurnOutcome> {
        let session = self
            .store
            .get(session_id)
            .await
            .ok_or(AssistError::SessionNotFound(session_id))?;
        let mut session = session.lock().await;
        Ok(self.engine.process(&mut session, message).await)
    }

    /// Current fill progress for a session.
    pub async fn status(&self, session_id: Uuid) -> AssistResult<SessionStatus> {
        let session = self
            .store
            .get(session_id)
            .await
            .ok_or(AssistError::SessionNotFound(session_id))?;
        let session = session.lock().await;
        Ok(session.status())
    }

    /// Re-open one field for correction. Returns whether a matching
    /// placeholder was found. A completed session becomes fillable again.
    pub async fn reset_field(&self, session_id: Uuid, name: &str) -> AssistResult<bool> {
        let session = self
            .store
            .get(session_id)
            .await
            .ok_or(AssistError::SessionNotFound(session_id))?;
        let mut session = session.lock().await;
        let found = session.placeholders.iter_mut().find(|p| p.answers_to(name));
        match found {
            Some(p) => {
                p.reset();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Render the completed document. Fails closed while any field is
    /// unfilled.
    pub async fn render(&self, session_id: Uuid) -> AssistResult<(TemplateDocument, RenderSummary)> {
        let session = self
            .store
            .get(session_id)
            .await
            .ok_or(AssistError::SessionNotFound(session_id))?;
        let session = session.lock().await;
        render_document(&session.document, &session.placeholders)
    }
}

/// Opening message: names the first few detected fields.
fn greeting(placeholders: &[Placeholder]) -> String {
    if placeholders.is_empty() {
        return "I've loaded your document but found no bracketed fields to fill.".to_string();
    }

    let shown: Vec<&str> = placeholders.iter().take(5).map(|p| p.raw_name.as_str()).collect();
    let more = if placeholders.len() > 5 {
        format!(" and {} more", placeholders.len() - 5)
    } else {
        String::new()
    };

    format!(
        "I've loaded your document and found {} field(s) to fill: {}{}. \
You can provide values one at a time or several together. How would you like to proceed?",
        placeholders.len(),
        shown.join(", "),
        more
    )
}
