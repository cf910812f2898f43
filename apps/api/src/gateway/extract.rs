//! Pulls structured data out of freeform model text.
//!
//! Search responses are free text (the google-search tool cannot be combined
//! with strict JSON mode), so the job array is located by bracket matching.
//! A malformed or missing array is a valid empty result, never an error.

use std::collections::HashSet;

use tracing::warn;

use crate::gateway::prompts::PLACEHOLDER_JOB_ID;
use crate::models::JobListing;

/// Strips ```json / ```markdown / ``` fences from model output.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json", "markdown", ...) up to the first newline.
    let body = match stripped.find('\n') {
        Some(nl) if stripped[..nl].chars().all(|c| c.is_ascii_alphanumeric()) => &stripped[nl + 1..],
        _ => stripped,
    };
    body.trim_end()
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or(body.trim())
}

/// End offset (exclusive) of the bracket group opened at `start`, honouring
/// JSON string literals.
fn matching_close(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// First balanced `[...]` in the text that parses as a JSON array of
/// objects. Citation markers such as `[1]` are valid JSON and are skipped.
pub fn extract_json_array(text: &str) -> Option<&str> {
    text.match_indices('[').find_map(|(start, _)| {
        let end = matching_close(text, start)?;
        let candidate = &text[start..end];
        match serde_json::from_str::<serde_json::Value>(candidate) {
            Ok(serde_json::Value::Array(items)) if items.iter().all(|v| v.is_object()) => {
                Some(candidate)
            }
            _ => None,
        }
    })
}

/// Parses the job array out of a search response. Anything unparseable
/// yields an empty list and a warning.
pub fn parse_job_array(text: &str) -> Vec<JobListing> {
    let Some(array) = extract_json_array(strip_code_fences(text)) else {
        warn!("No JSON array found in search response ({} chars)", text.len());
        return Vec::new();
    };

    match serde_json::from_str::<Vec<JobListing>>(array) {
        Ok(jobs) => jobs,
        Err(e) => {
            warn!("Failed to parse job array: {e}");
            Vec::new()
        }
    }
}

/// Gives every listing an id that is unique within the page. Missing,
/// placeholder and duplicate ids become `job-{page}-{index}-{stamp}`.
pub fn assign_job_ids(jobs: &mut [JobListing], page: u32, stamp_millis: i64) {
    let mut seen = HashSet::new();
    for (index, job) in jobs.iter_mut().enumerate() {
        let id = job.id.trim();
        if id.is_empty() || id == PLACEHOLDER_JOB_ID || seen.contains(id) {
            job.id = format!("job-{page}-{index}-{stamp_millis}");
        }
        seen.insert(job.id.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_markdown_fence() {
        let input = "```markdown\n# 王芳\n\n## 技能\n```";
        assert_eq!(strip_code_fences(input), "# 王芳\n\n## 技能");
    }

    #[test]
    fn test_strip_no_fences() {
        assert_eq!(strip_code_fences("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn test_extracts_array_surrounded_by_prose() {
        let text = r#"以下是搜索结果：
[{"id": "1", "title": "前端工程师", "tags": ["React [高级]"]}]
来源见 [1]。"#;
        let array = extract_json_array(text).unwrap();
        assert!(array.starts_with("[{"));
        assert!(array.ends_with("}]"));
    }

    #[test]
    fn test_skips_non_json_brackets() {
        let text = r#"see [note] then [{"title": "A"}]"#;
        assert_eq!(extract_json_array(text), Some(r#"[{"title": "A"}]"#));
    }

    #[test]
    fn test_skips_citation_markers_before_job_array() {
        let text = "根据搜索结果 [1]，以下是职位：\n[{\"id\": \"a\", \"title\": \"前端工程师\"}]";
        let jobs = parse_job_array(text);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "前端工程师");
    }

    #[test]
    fn test_citation_without_job_array_yields_empty() {
        assert!(parse_job_array("暂无职位 [1][2]").is_empty());
    }

    #[test]
    fn test_malformed_array_yields_empty() {
        assert!(parse_job_array(r#"[{"title": "A",]"#).is_empty());
        assert!(parse_job_array("抱歉，没有找到职位。").is_empty());
    }

    #[test]
    fn test_parse_job_array_from_fenced_text() {
        let text = "```json\n[{\"id\": \"x\", \"title\": \"Rust\"}, {\"title\": \"Go\"}]\n```";
        let jobs = parse_job_array(text);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[1].title, "Go");
    }

    #[test]
    fn test_assign_job_ids_replaces_missing_placeholder_and_duplicates() {
        let mut jobs = vec![
            JobListing {
                id: "abc".to_string(),
                ..Default::default()
            },
            JobListing {
                id: PLACEHOLDER_JOB_ID.to_string(),
                ..Default::default()
            },
            JobListing::default(),
            JobListing {
                id: "abc".to_string(),
                ..Default::default()
            },
        ];
        assign_job_ids(&mut jobs, 2, 1700);
        let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["abc", "job-2-1-1700", "job-2-2-1700", "job-2-3-1700"]);
    }
}
