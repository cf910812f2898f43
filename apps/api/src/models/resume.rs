use serde::{Deserialize, Serialize};

/// Structured résumé produced by the gateway, before text rendering.
/// Missing list fields deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeData {
    pub full_name: String,
    pub contact_info: String,
    pub summary: String,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<ProjectEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub role: String,
    pub company: String,
    pub period: String,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub degree: String,
    pub school: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_data_full_deserializes() {
        let json = r#"{
            "fullName": "王芳",
            "contactInfo": "电话: 138-xxxx-xxxx | 邮箱: example@email.com | 所在地: 上海",
            "summary": "五年前端经验",
            "skills": ["React", "TypeScript"],
            "experience": [
                {"role": "前端工程师", "company": "某科技", "period": "2019.07 - 2024.03",
                 "details": ["负责组件库建设", "性能优化提升 40%"]}
            ],
            "education": [{"degree": "计算机科学 本科", "school": "复旦大学", "year": "2019"}]
        }"#;
        let data: ResumeData = serde_json::from_str(json).unwrap();
        assert_eq!(data.full_name, "王芳");
        assert_eq!(data.experience[0].details.len(), 2);
        assert_eq!(data.education[0].school, "复旦大学");
        assert!(data.projects.is_empty());
    }

    #[test]
    fn test_resume_data_missing_lists_default_empty() {
        let data: ResumeData = serde_json::from_str(r#"{"fullName": "王芳"}"#).unwrap();
        assert!(data.skills.is_empty());
        assert!(data.experience.is_empty());
        assert!(data.education.is_empty());
    }
}
