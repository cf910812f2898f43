//! Projects a `ResumeData` structure into Markdown text, one layout per template.
//! Unknown template ids fall back to the classic layout.

use crate::models::ResumeData;

pub fn render_markdown(data: &ResumeData, template_id: &str) -> String {
    match template_id {
        "modern" => render_modern(data),
        "skill-focused" => render_skill_focused(data),
        _ => render_classic(data),
    }
}

fn bullet_list(items: &[String], marker: &str) -> String {
    items
        .iter()
        .map(|item| format!("{marker} {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_classic(data: &ResumeData) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n# {}\n\n> {}\n", data.full_name, data.contact_info));
    out.push_str(&format!("\n## 个人简介\n{}\n", data.summary));
    out.push_str(&format!("\n## 核心技能\n{}\n", bullet_list(&data.skills, "*")));

    out.push_str("\n## 工作经历\n");
    let experience: Vec<String> = data
        .experience
        .iter()
        .map(|exp| {
            format!(
                "\n### {} | {}\n*{}*\n\n{}\n",
                exp.role,
                exp.company,
                exp.period,
                bullet_list(&exp.details, "*")
            )
        })
        .collect();
    out.push_str(&experience.join("\n"));

    if !data.projects.is_empty() {
        out.push_str("\n## 项目经历\n");
        for project in &data.projects {
            out.push_str(&format!("\n### {}\n{}\n", project.name, project.description));
        }
    }

    out.push_str("\n## 教育背景\n");
    let education: Vec<String> = data
        .education
        .iter()
        .map(|edu| format!("\n### {}\n{} | {}\n", edu.school, edu.degree, edu.year))
        .collect();
    out.push_str(&education.join("\n"));
    out
}

fn render_modern(data: &ResumeData) -> String {
    let contact = data
        .contact_info
        .split('|')
        .map(|info| format!("* {}", info.trim()))
        .collect::<Vec<_>>()
        .join(" ");

    let mut out = String::new();
    out.push_str(&format!("\n# {}\n{}\n\n---\n", data.full_name, contact));
    out.push_str(&format!("\n## 关于我\n> {}\n", data.summary));

    out.push_str("\n## 工作经历\n");
    let experience: Vec<String> = data
        .experience
        .iter()
        .map(|exp| {
            format!(
                "\n**{}** @ {}  \n_{}_\n\n{}\n",
                exp.role,
                exp.company,
                exp.period,
                bullet_list(&exp.details, "-")
            )
        })
        .collect();
    out.push_str(&experience.join("\n\n"));

    if !data.projects.is_empty() {
        out.push_str("\n## 项目经历\n");
        let projects: Vec<String> = data
            .projects
            .iter()
            .map(|p| format!("- **{}** - {}", p.name, p.description))
            .collect();
        out.push_str(&projects.join("\n"));
        out.push('\n');
    }

    out.push_str(&format!("\n## 技能专长\n{}\n", data.skills.join(" • ")));

    out.push_str("\n## 教育\n");
    let education: Vec<String> = data
        .education
        .iter()
        .map(|edu| format!("**{}** - {} ({})", edu.school, edu.degree, edu.year))
        .collect();
    out.push_str(&education.join("\n"));
    out.push('\n');
    out
}

fn render_skill_focused(data: &ResumeData) -> String {
    let skills = data
        .skills
        .iter()
        .map(|s| format!("* **{s}**"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut out = String::new();
    out.push_str(&format!("\n# {}\n{}\n", data.full_name, data.contact_info));
    out.push_str(&format!("\n## 核心竞争力\n{skills}\n"));
    out.push_str(&format!("\n## 职业目标\n{}\n", data.summary));

    out.push_str("\n## 职业经历\n");
    let experience: Vec<String> = data
        .experience
        .iter()
        .map(|exp| {
            format!(
                "\n### {}\n**{}** | {}\n\n{}\n",
                exp.role,
                exp.company,
                exp.period,
                bullet_list(&exp.details, "*")
            )
        })
        .collect();
    out.push_str(&experience.join("\n"));

    if !data.projects.is_empty() {
        out.push_str("\n## 项目经历\n");
        for project in &data.projects {
            out.push_str(&format!("* **{}**：{}\n", project.name, project.description));
        }
    }

    out.push_str("\n## 教育背景\n");
    let education: Vec<String> = data
        .education
        .iter()
        .map(|edu| format!("* {}，{}，{}", edu.school, edu.degree, edu.year))
        .collect();
    out.push_str(&education.join("\n"));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EducationEntry, ExperienceEntry, ProjectEntry};

    fn sample() -> ResumeData {
        ResumeData {
            full_name: "王芳".to_string(),
            contact_info: "电话: 138-0000-0000 | 邮箱: wf@example.com".to_string(),
            summary: "五年前端经验".to_string(),
            skills: vec!["React".to_string(), "TypeScript".to_string()],
            experience: vec![ExperienceEntry {
                role: "前端工程师".to_string(),
                company: "某科技".to_string(),
                period: "2019.07 - 2024.03".to_string(),
                details: vec!["搭建组件库".to_string(), "首屏性能提升 40%".to_string()],
            }],
            education: vec![EducationEntry {
                degree: "计算机科学 本科".to_string(),
                school: "复旦大学".to_string(),
                year: "2019".to_string(),
            }],
            projects: vec![],
        }
    }

    #[test]
    fn test_classic_layout() {
        let md = render_markdown(&sample(), "classic");
        assert!(md.contains("# 王芳"));
        assert!(md.contains("> 电话: 138-0000-0000 | 邮箱: wf@example.com"));
        assert!(md.contains("## 核心技能\n* React\n* TypeScript"));
        assert!(md.contains("### 前端工程师 | 某科技\n*2019.07 - 2024.03*"));
        assert!(md.contains("### 复旦大学\n计算机科学 本科 | 2019"));
        assert!(!md.contains("项目经历"));
    }

    #[test]
    fn test_modern_layout_splits_contact_and_uses_rule() {
        let md = render_markdown(&sample(), "modern");
        assert!(md.contains("* 电话: 138-0000-0000 * 邮箱: wf@example.com"));
        assert!(md.contains("\n---\n"));
        assert!(md.contains("React • TypeScript"));
        assert!(md.contains("**复旦大学** - 计算机科学 本科 (2019)"));
        assert!(md.contains("- 搭建组件库"));
    }

    #[test]
    fn test_skill_focused_puts_skills_first() {
        let md = render_markdown(&sample(), "skill-focused");
        let skills_at = md.find("## 核心竞争力").unwrap();
        let summary_at = md.find("## 职业目标").unwrap();
        assert!(skills_at < summary_at);
        assert!(md.contains("* **React**"));
        assert!(md.contains("* 复旦大学，计算机科学 本科，2019"));
    }

    #[test]
    fn test_unknown_template_falls_back_to_classic() {
        assert_eq!(
            render_markdown(&sample(), "does-not-exist"),
            render_markdown(&sample(), "classic")
        );
    }

    #[test]
    fn test_projects_rendered_when_present() {
        let mut data = sample();
        data.projects.push(ProjectEntry {
            name: "低代码平台".to_string(),
            description: "主导设计".to_string(),
        });
        for id in ["classic", "modern", "skill-focused"] {
            let md = render_markdown(&data, id);
            assert!(md.contains("## 项目经历"), "{id}");
            assert!(md.contains("低代码平台"), "{id}");
        }
    }
}
