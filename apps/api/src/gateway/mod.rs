// AI Gateway: the single point of entry for all generative-AI calls.
// Four request/response operations, each failing with `GatewayError` on
// network or parse failure. No retries and no partial results: recovery is
// always user-initiated.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{JobListing, ResumeData, SearchResult, UserProfile};

pub mod extract;
pub mod gemini;
pub mod prompts;

pub use gemini::{GeminiClient, GeminiGateway, MODEL};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model returned empty content")]
    EmptyContent,
}

/// The gateway trait. `AppState` carries it as `Arc<dyn AiGateway>` so tests
/// can substitute a scripted backend.
#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Best-effort search; zero parseable jobs is a valid empty result.
    async fn search_jobs(
        &self,
        role: &str,
        location: &str,
        page: u32,
    ) -> Result<SearchResult, GatewayError>;

    async fn generate_profile(&self, job: Option<&JobListing>)
        -> Result<UserProfile, GatewayError>;

    async fn generate_resume_structure(
        &self,
        job: Option<&JobListing>,
        profile: &UserProfile,
    ) -> Result<ResumeData, GatewayError>;

    /// Returns the full replacement text.
    async fn rewrite_text(&self, current: &str, instruction: &str)
        -> Result<String, GatewayError>;
}
