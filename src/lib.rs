//! docfill — conversational placeholder resolution for legal documents.
//!
//! Uploaded documents are scanned for bracketed placeholders (for example
//! `[Company Name]`), each placeholder's expected value type is inferred
//! from its surrounding context, and values are collected from a user over
//! conversational turns before the document is re-rendered with every
//! placeholder substituted.
//!
//! ## Pipeline
//!
//! ```text
//! upload ──► extract ──► infer ──► session
//!                                     │
//!              ┌── per user turn ─────┤
//!              ▼                      │
//!        score (primary focus)        │
//!              ▼                      │
//!        value extraction ──► apply ──┘
//!                                     │ all filled
//!                                     ▼
//!                               render gate
//! ```
//!
//! The deterministic paths (keyword inference, match scoring, the state
//! machine, the render gate) are pure and fully testable offline; the LLM
//! strategies are optional decorators behind the same traits and always
//! degrade to the deterministic paths on failure.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docfill::{
//!     DocumentAssistant, InMemorySessionStore, KeywordInference, LlmValueExtractor,
//!     Settings, TemplateDocument, create_llm_client,
//! };
//!
//! let settings = Settings::from_env()?;
//! let client = create_llm_client(&settings.llm_config())?;
//! let assistant = DocumentAssistant::new(
//!     Arc::new(InMemorySessionStore::new()),
//!     Arc::new(KeywordInference),
//!     Arc::new(LlmValueExtractor::new(client)),
//! );
//!
//! let upload = assistant.upload(TemplateDocument::from_plain_text(text)).await?;
//! let turn = assistant.chat(upload.session_id, "The company is ABC Corp").await?;
//! ```

pub mod assist;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod infer;
pub mod llm;
pub mod model;
pub mod render;
pub mod score;
pub mod session;
pub mod turn;

pub use assist::{DocumentAssistant, UploadOutcome};
pub use config::Settings;
pub use document::{Block, Cell, Paragraph, Run, Table, TemplateDocument};
pub use error::{AssistError, AssistResult, TurnWarning};
pub use extract::{find_placeholders, find_placeholders_with_window, CONTEXT_WINDOW_CHARS};
pub use infer::{infer_keywords, Inference, KeywordInference, LlmInference, TypeInference};
pub use llm::{create_llm_client, LlmBackend, LlmClient, LlmConfig, LlmValueExtractor};
pub use model::{ConversationTurn, FieldType, Placeholder, Role, SessionState, SessionStatus};
pub use render::{render_document, RenderSummary};
pub use score::{best_match, match_score, MatchResult};
pub use session::{InMemorySessionStore, SessionStore, SharedSession};
pub use turn::{Extraction, TurnEngine, TurnOutcome, TurnPhase, ValueExtractor};
