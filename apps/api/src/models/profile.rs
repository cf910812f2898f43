use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// User-supplied biographical summary used to condition résumé generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub full_name: String,
    pub experience: String,
    /// Comma separated.
    pub skills: String,
    pub education: String,
}

impl UserProfile {
    /// All four fields are required before generation.
    pub fn validate(&self) -> Result<(), AppError> {
        let missing: Vec<&str> = [
            ("fullName", &self.full_name),
            ("experience", &self.experience),
            ("skills", &self.skills),
            ("education", &self.education),
        ]
        .iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| *k)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "missing profile fields: {}",
                missing.join(", ")
            )))
        }
    }

    /// Placeholder used when AI auto-fill fails.
    pub fn fallback() -> Self {
        UserProfile {
            full_name: "李明".to_string(),
            education: "某知名大学 相关专业 本科".to_string(),
            skills: "沟通能力, 项目管理, 专业技能".to_string(),
            experience: "拥有相关行业工作经验，熟悉业务流程。".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_profile_is_complete() {
        assert!(UserProfile::fallback().validate().is_ok());
    }

    #[test]
    fn test_validate_lists_missing_fields() {
        let profile = UserProfile {
            full_name: "张三".to_string(),
            skills: "Rust".to_string(),
            ..Default::default()
        };
        match profile.validate() {
            Err(AppError::Validation(msg)) => {
                assert!(msg.contains("experience"));
                assert!(msg.contains("education"));
                assert!(!msg.contains("fullName"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
