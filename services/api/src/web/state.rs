//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use qa_core::services::{AnswerService, QuestionService};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
/// Handlers only see the service traits, so storage can be swapped or mocked freely.
#[derive(Clone)]
pub struct AppState {
    pub questions: Arc<dyn QuestionService>,
    pub answers: Arc<dyn AnswerService>,
    pub config: Arc<Config>,
}
