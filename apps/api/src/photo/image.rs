use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde::Serialize;

use crate::errors::AppError;

/// A user photo encoded as an inline `data:` reference. Held in session
/// memory only; never uploaded anywhere.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoImage {
    pub content_type: String,
    pub data_url: String,
}

impl PhotoImage {
    pub fn from_bytes(content_type: Option<&str>, bytes: &[u8]) -> Result<Self, AppError> {
        let content_type = content_type
            .map(|c| c.trim().to_ascii_lowercase())
            .filter(|c| c.starts_with("image/"))
            .ok_or_else(|| AppError::Validation("photo must be an image file".to_string()))?;

        if bytes.is_empty() {
            return Err(AppError::Validation("photo file is empty".to_string()));
        }

        let data_url = format!("data:{content_type};base64,{}", B64.encode(bytes));
        Ok(Self {
            content_type,
            data_url,
        })
    }
}
