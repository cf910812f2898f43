//! Gemini `generateContent` client and the production `AiGateway`.
//!
//! Model: gemini-2.5-flash (hardcoded, not configurable)
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::gateway::extract::{assign_job_ids, parse_job_array, strip_code_fences};
use crate::gateway::prompts::{
    DEFAULT_CITY, GENERIC_PROFILE_PROMPT, PROFILE_FOR_JOB_PROMPT_TEMPLATE,
    RESUME_GENERIC_CONTEXT, RESUME_JOB_CONTEXT_TEMPLATE, RESUME_PROMPT_TEMPLATE,
    REWRITE_PROMPT_TEMPLATE, SEARCH_JOBS_PROMPT_TEMPLATE,
};
use crate::gateway::{AiGateway, GatewayError};
use crate::models::{JobListing, ResumeData, SearchResult, Source, UserProfile};

/// The model used for all gateway calls.
pub const MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone, Copy, Default)]
pub struct CallOptions {
    /// Ground the answer in live web search results.
    pub google_search: bool,
    /// Ask for strict JSON output.
    pub json_mode: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeminiResponse {
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CandidateContent {
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroundingMetadata {
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GroundingChunk {
    pub web: Option<WebChunk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WebChunk {
    pub uri: String,
    pub title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageMetadata {
    pub prompt_token_count: u32,
    pub candidates_token_count: u32,
}

impl GeminiResponse {
    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Web citations from the first candidate's grounding metadata.
    pub fn sources(&self) -> Vec<Source> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|g| {
                g.grounding_chunks
                    .iter()
                    .filter_map(|chunk| chunk.web.as_ref())
                    .map(|web| Source {
                        title: web.title.clone(),
                        uri: web.uri.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Thin wrapper over the Gemini REST API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, MODEL)
    }

    /// Single attempt; failures surface to the caller unchanged.
    pub async fn call(
        &self,
        prompt: &str,
        options: CallOptions,
    ) -> Result<GeminiResponse, GatewayError> {
        let request_body = build_request(prompt, options);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API returned {}: {}", status, body);
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let gemini_response: GeminiResponse = response.json().await?;

        if let Some(usage) = &gemini_response.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(gemini_response)
    }

    /// Strict-JSON call deserialized into `T`.
    pub async fn call_json<T: DeserializeOwned>(&self, prompt: &str) -> Result<T, GatewayError> {
        let response = self
            .call(
                prompt,
                CallOptions {
                    json_mode: true,
                    ..Default::default()
                },
            )
            .await?;

        let text = response.text().ok_or(GatewayError::EmptyContent)?;
        serde_json::from_str(strip_code_fences(&text)).map_err(GatewayError::Parse)
    }
}

fn build_request(prompt: &str, options: CallOptions) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part { text: prompt }],
        }],
        tools: if options.google_search {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        },
        generation_config: options.json_mode.then_some(GenerationConfig {
            response_mime_type: "application/json",
        }),
    }
}

fn build_search_prompt(role: &str, location: &str, page: u32) -> String {
    SEARCH_JOBS_PROMPT_TEMPLATE
        .replace("{page}", &page.to_string())
        .replace("{location}", location)
        .replace("{role}", role)
}

fn fill_job_fields(template: &str, job: &JobListing) -> String {
    template
        .replace("{requirements}", &job.requirements.join(", "))
        .replace("{description}", &job.description)
        .replace("{company}", &job.company)
        .replace("{title}", &job.title)
}

fn build_profile_prompt(job: Option<&JobListing>) -> String {
    match job {
        Some(job) => fill_job_fields(PROFILE_FOR_JOB_PROMPT_TEMPLATE, job),
        None => GENERIC_PROFILE_PROMPT.to_string(),
    }
}

fn build_resume_prompt(job: Option<&JobListing>, profile: &UserProfile) -> String {
    let context = match job {
        Some(job) => fill_job_fields(RESUME_JOB_CONTEXT_TEMPLATE, job),
        None => RESUME_GENERIC_CONTEXT.to_string(),
    };
    let city = job
        .and_then(|j| j.location.split(' ').next())
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CITY);

    RESUME_PROMPT_TEMPLATE
        .replace("{city}", city)
        .replace("{context}", &context)
        .replace("{experience}", &profile.experience)
        .replace("{skills}", &profile.skills)
        .replace("{education}", &profile.education)
        .replace("{full_name}", &profile.full_name)
}

fn build_rewrite_prompt(current: &str, instruction: &str) -> String {
    REWRITE_PROMPT_TEMPLATE
        .replace("{instruction}", instruction)
        .replace("{content}", current)
}

/// Production gateway backed by Gemini.
#[derive(Clone)]
pub struct GeminiGateway {
    client: GeminiClient,
}

impl GeminiGateway {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AiGateway for GeminiGateway {
    async fn search_jobs(
        &self,
        role: &str,
        location: &str,
        page: u32,
    ) -> Result<SearchResult, GatewayError> {
        let prompt = build_search_prompt(role, location, page);
        let response = self
            .client
            .call(
                &prompt,
                CallOptions {
                    google_search: true,
                    ..Default::default()
                },
            )
            .await?;

        let mut jobs = parse_job_array(&response.text().unwrap_or_default());
        assign_job_ids(&mut jobs, page, chrono::Utc::now().timestamp_millis());
        let sources = response.sources();

        info!(
            "Search '{}' @ '{}' page {}: {} jobs, {} sources",
            role,
            location,
            page,
            jobs.len(),
            sources.len()
        );
        Ok(SearchResult { jobs, sources })
    }

    async fn generate_profile(
        &self,
        job: Option<&JobListing>,
    ) -> Result<UserProfile, GatewayError> {
        self.client.call_json(&build_profile_prompt(job)).await
    }

    async fn generate_resume_structure(
        &self,
        job: Option<&JobListing>,
        profile: &UserProfile,
    ) -> Result<ResumeData, GatewayError> {
        self.client
            .call_json(&build_resume_prompt(job, profile))
            .await
    }

    async fn rewrite_text(
        &self,
        current: &str,
        instruction: &str,
    ) -> Result<String, GatewayError> {
        let response = self
            .client
            .call(&build_rewrite_prompt(current, instruction), CallOptions::default())
            .await?;

        // An empty answer keeps the current text.
        let text = response
            .text()
            .map(|t| strip_code_fences(&t).to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| current.to_string());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> JobListing {
        JobListing {
            id: "j1".to_string(),
            title: "前端工程师".to_string(),
            company: "某科技".to_string(),
            location: "上海 浦东新区".to_string(),
            description: "负责 Web 前端".to_string(),
            requirements: vec!["React".to_string(), "3年经验".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_search_request_uses_google_search_tool() {
        let body = serde_json::to_value(build_request(
            "p",
            CallOptions {
                google_search: true,
                json_mode: false,
            },
        ))
        .unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "p");
        assert!(body["tools"][0]["google_search"].is_object());
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_json_request_sets_mime_type() {
        let body = serde_json::to_value(build_request(
            "p",
            CallOptions {
                json_mode: true,
                ..Default::default()
            },
        ))
        .unwrap();
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_response_text_and_sources() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "[{\"title\":"}, {"text": " \"A\"}]"}]},
                "groundingMetadata": {"groundingChunks": [
                    {"web": {"uri": "https://jobs.example.com/1", "title": "example.com"}},
                    {"retrievedContext": {}}
                ]}
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 20}
        }"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().as_deref(), Some("[{\"title\": \"A\"}]"));
        assert_eq!(
            response.sources(),
            vec![Source {
                title: "example.com".to_string(),
                uri: "https://jobs.example.com/1".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_response_has_no_text() {
        let response: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(response.text().is_none());
        assert!(response.sources().is_empty());
    }

    #[test]
    fn test_search_prompt_substitution() {
        let prompt = build_search_prompt("前端工程师", "上海", 2);
        assert!(prompt.contains("\"上海\" 地区关于 \"前端工程师\""));
        assert!(prompt.contains("第 2 页"));
        assert!(!prompt.contains("{role}"));
    }

    #[test]
    fn test_profile_prompt_with_and_without_job() {
        let tailored = build_profile_prompt(Some(&job()));
        assert!(tailored.contains("职位: 前端工程师"));
        assert!(tailored.contains("要求: React, 3年经验"));
        assert_eq!(build_profile_prompt(None), GENERIC_PROFILE_PROMPT);
    }

    #[test]
    fn test_resume_prompt_uses_first_location_token_as_city() {
        let profile = UserProfile {
            full_name: "王芳".to_string(),
            experience: "五年".to_string(),
            skills: "React".to_string(),
            education: "复旦".to_string(),
        };
        let prompt = build_resume_prompt(Some(&job()), &profile);
        assert!(prompt.contains("所在地: 上海\""));
        assert!(prompt.contains("\"fullName\": \"王芳\""));
        assert!(prompt.contains("量身定制"));

        let generic = build_resume_prompt(None, &profile);
        assert!(generic.contains("所在地: 城市\""));
        assert!(generic.contains("通用简历"));
    }

    #[test]
    fn test_rewrite_prompt() {
        let prompt = build_rewrite_prompt("# 王芳", "更专业");
        assert!(prompt.contains("指令: \"更专业\""));
        assert!(prompt.contains("# 王芳"));
    }
}
