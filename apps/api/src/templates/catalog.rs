use serde::Serialize;

pub const DEFAULT_TEMPLATE_ID: &str = "classic";

/// A named text-rendering strategy. The catalog is static and read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResumeTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Gradient stops; the renderer derives its palette from these.
    pub theme_color: &'static str,
}

static TEMPLATES: [ResumeTemplate; 3] = [
    ResumeTemplate {
        id: "classic",
        name: "经典通用",
        description: "结构清晰，适合大多数职位的标准格式",
        theme_color: "from-indigo-500 via-purple-500 to-pink-500",
    },
    ResumeTemplate {
        id: "modern",
        name: "精简现代",
        description: "紧凑布局，强调个人优势，适合互联网行业",
        theme_color: "from-blue-600 via-blue-400 to-cyan-400",
    },
    ResumeTemplate {
        id: "skill-focused",
        name: "技能导向",
        description: "优先展示核心技能，适合技术类岗位",
        theme_color: "from-emerald-500 via-teal-500 to-cyan-500",
    },
];

pub fn templates() -> &'static [ResumeTemplate] {
    &TEMPLATES
}

pub fn find_template(id: &str) -> Option<&'static ResumeTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_is_first() {
        assert_eq!(templates()[0].id, DEFAULT_TEMPLATE_ID);
    }

    #[test]
    fn test_find_template() {
        assert_eq!(find_template("modern").map(|t| t.name), Some("精简现代"));
        assert!(find_template("nope").is_none());
    }
}
