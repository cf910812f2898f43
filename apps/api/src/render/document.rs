//! Markdown → visual tree.
//!
//! The text is split into a header (name and contact, laid out beside the
//! photo) and a body (sections, full width). Parsing covers the Markdown the
//! templates and the rewrite assistant produce: ATX headings, paragraphs,
//! bulleted and numbered lists, block quotes, horizontal rules, and inline
//! strong / emphasis / links.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::photo::{PhotoImage, PhotoPlacement};
use crate::render::theme::Theme;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    Text { text: String },
    Strong { text: String },
    Emphasis { text: String },
    Link { text: String, href: String },
    LineBreak,
}

/// Decorative icon chosen from a section heading's wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionIcon {
    Briefcase,
    AcademicCap,
    Lightning,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading {
        level: u8,
        content: Vec<Inline>,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<SectionIcon>,
    },
    Paragraph {
        content: Vec<Inline>,
    },
    List {
        ordered: bool,
        items: Vec<Vec<Inline>>,
    },
    Quote {
        content: Vec<Inline>,
    },
    Rule,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoFrame {
    pub data_url: Option<String>,
    pub placement: PhotoPlacement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentTree {
    pub theme: Theme,
    pub header: Vec<Block>,
    pub body: Vec<Block>,
    pub photo: PhotoFrame,
}

pub fn render_document(
    text: &str,
    photo: Option<&PhotoImage>,
    theme_color: &str,
    placement: PhotoPlacement,
) -> DocumentTree {
    let (header, body) = split_header_body(text);
    DocumentTree {
        theme: Theme::from_theme_color(theme_color),
        header: parse_blocks(header),
        body: parse_blocks(body),
        photo: PhotoFrame {
            data_url: photo.map(|p| p.data_url.clone()),
            placement,
        },
    }
}

fn section_split_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n##\s|\n---\n").expect("section split pattern is valid"))
}

/// Header is everything before the first second-level heading or rule;
/// the body keeps the delimiter. No delimiter → everything is header.
pub fn split_header_body(text: &str) -> (&str, &str) {
    match section_split_pattern().find(text) {
        Some(m) => text.split_at(m.start()),
        None => (text, ""),
    }
}

pub fn section_icon(heading: &str) -> Option<SectionIcon> {
    let text = heading.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| text.contains(w));

    if has(&["工作", "经历", "experience", "work"]) {
        Some(SectionIcon::Briefcase)
    } else if has(&["教育", "学历", "education", "university"]) {
        Some(SectionIcon::AcademicCap)
    } else if has(&["技能", "专长", "skill", "ability"]) {
        Some(SectionIcon::Lightning)
    } else if has(&["简介", "关于", "about", "profile"]) {
        Some(SectionIcon::User)
    } else {
        None
    }
}

enum Pending {
    Paragraph(Vec<String>),
    Quote(Vec<String>),
    List { ordered: bool, items: Vec<String> },
}

pub fn parse_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut pending: Option<Pending> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            flush(&mut pending, &mut blocks);
            continue;
        }

        if is_rule(line) {
            flush(&mut pending, &mut blocks);
            blocks.push(Block::Rule);
            continue;
        }

        if let Some((level, title)) = heading(line) {
            flush(&mut pending, &mut blocks);
            let icon = if level == 2 { section_icon(title) } else { None };
            blocks.push(Block::Heading {
                level,
                content: parse_inline(title),
                icon,
            });
            continue;
        }

        if let Some(quoted) = line.strip_prefix('>') {
            let quoted = quoted.trim_start().to_string();
            match &mut pending {
                Some(Pending::Quote(lines)) => lines.push(quoted),
                _ => {
                    flush(&mut pending, &mut blocks);
                    pending = Some(Pending::Quote(vec![quoted]));
                }
            }
            continue;
        }

        if let Some((ordered, item)) = list_item(line) {
            match &mut pending {
                Some(Pending::List { ordered: o, items }) if *o == ordered => {
                    items.push(item.to_string())
                }
                _ => {
                    flush(&mut pending, &mut blocks);
                    pending = Some(Pending::List {
                        ordered,
                        items: vec![item.to_string()],
                    });
                }
            }
            continue;
        }

        match &mut pending {
            Some(Pending::Paragraph(lines)) => lines.push(line.to_string()),
            _ => {
                flush(&mut pending, &mut blocks);
                pending = Some(Pending::Paragraph(vec![line.to_string()]));
            }
        }
    }

    flush(&mut pending, &mut blocks);
    blocks
}

fn flush(pending: &mut Option<Pending>, blocks: &mut Vec<Block>) {
    match pending.take() {
        None => {}
        Some(Pending::Paragraph(lines)) => blocks.push(Block::Paragraph {
            content: join_lines(&lines),
        }),
        Some(Pending::Quote(lines)) => blocks.push(Block::Quote {
            content: join_lines(&lines),
        }),
        Some(Pending::List { ordered, items }) => blocks.push(Block::List {
            ordered,
            items: items.iter().map(|i| parse_inline(i)).collect(),
        }),
    }
}

fn join_lines(lines: &[String]) -> Vec<Inline> {
    let mut out = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push(Inline::LineBreak);
        }
        out.extend(parse_inline(line));
    }
    out
}

fn is_rule(line: &str) -> bool {
    let compact: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3
        && matches!(compact[0], '-' | '*' | '_')
        && compact.iter().all(|c| *c == compact[0])
}

fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if rest.is_empty() {
        return Some((hashes as u8, ""));
    }
    rest.strip_prefix(|c: char| c.is_whitespace())
        .map(|title| (hashes as u8, title.trim()))
}

fn list_item(line: &str) -> Option<(bool, &str)> {
    for marker in ["* ", "- ", "+ "] {
        if let Some(item) = line.strip_prefix(marker) {
            return Some((false, item.trim_start()));
        }
    }
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        if let Some(item) = line[digits..].strip_prefix(". ") {
            return Some((true, item.trim_start()));
        }
    }
    None
}

pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix("**") {
            if let Some(end) = after.find("**").filter(|e| *e > 0) {
                flush_text(&mut buf, &mut out);
                out.push(Inline::Strong {
                    text: after[..end].to_string(),
                });
                rest = &after[end + 2..];
                continue;
            }
        } else if c == '*' || c == '_' {
            let after = &rest[1..];
            if let Some(end) = after.find(c).filter(|e| *e > 0) {
                flush_text(&mut buf, &mut out);
                out.push(Inline::Emphasis {
                    text: after[..end].to_string(),
                });
                rest = &after[end + 1..];
                continue;
            }
        } else if c == '[' {
            if let Some(close) = rest.find("](") {
                let after = &rest[close + 2..];
                if let Some(paren) = after.find(')') {
                    flush_text(&mut buf, &mut out);
                    out.push(Inline::Link {
                        text: rest[1..close].to_string(),
                        href: after[..paren].to_string(),
                    });
                    rest = &after[paren + 1..];
                    continue;
                }
            }
        }
        buf.push(c);
        rest = &rest[c.len_utf8()..];
    }

    flush_text(&mut buf, &mut out);
    out
}

fn flush_text(buf: &mut String, out: &mut Vec<Inline>) {
    if !buf.is_empty() {
        out.push(Inline::Text {
            text: std::mem::take(buf),
        });
    }
}

/// Concatenated visible text of a span list.
pub fn plain_text(spans: &[Inline]) -> String {
    spans
        .iter()
        .map(|s| match s {
            Inline::Text { text } | Inline::Strong { text } | Inline::Emphasis { text } => {
                text.as_str()
            }
            Inline::Link { text, .. } => text.as_str(),
            Inline::LineBreak => "\n",
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(t: &str) -> Inline {
        Inline::Text {
            text: t.to_string(),
        }
    }

    #[test]
    fn test_split_at_first_section_heading() {
        let md = "\n# 王芳\n\n> 电话\n\n## 个人简介\n五年经验\n\n## 技能\n";
        let (header, body) = split_header_body(md);
        assert_eq!(header, "\n# 王芳\n\n> 电话\n");
        assert!(body.starts_with("\n## 个人简介"));
    }

    #[test]
    fn test_split_at_rule() {
        let md = "# 王芳\n* 电话\n\n---\n\n## 关于我\n";
        let (header, body) = split_header_body(md);
        assert_eq!(header, "# 王芳\n* 电话\n");
        assert!(body.starts_with("\n---\n"));
    }

    #[test]
    fn test_no_delimiter_is_all_header() {
        let (header, body) = split_header_body("# Only a name");
        assert_eq!(header, "# Only a name");
        assert_eq!(body, "");
    }

    #[test]
    fn test_third_level_heading_does_not_split() {
        let (_, body) = split_header_body("# A\n### B\n");
        assert!(body.is_empty());
    }

    #[test]
    fn test_section_icons_bilingual() {
        assert_eq!(section_icon("工作经历"), Some(SectionIcon::Briefcase));
        assert_eq!(section_icon("Work Experience"), Some(SectionIcon::Briefcase));
        assert_eq!(section_icon("教育背景"), Some(SectionIcon::AcademicCap));
        assert_eq!(section_icon("EDUCATION"), Some(SectionIcon::AcademicCap));
        assert_eq!(section_icon("核心技能"), Some(SectionIcon::Lightning));
        assert_eq!(section_icon("个人简介"), Some(SectionIcon::User));
        assert_eq!(section_icon("About Me"), Some(SectionIcon::User));
        assert_eq!(section_icon("职业目标"), None);
    }

    #[test]
    fn test_parse_blocks_structure() {
        let md = "## 核心技能\n* React\n* **Rust**\n\n> 一句话\n> 第二句\n\n---\n1. 第一\n2. 第二\n";
        let blocks = parse_blocks(md);
        assert_eq!(blocks.len(), 5);
        assert_eq!(
            blocks[0],
            Block::Heading {
                level: 2,
                content: vec![text("核心技能")],
                icon: Some(SectionIcon::Lightning),
            }
        );
        match &blocks[1] {
            Block::List { ordered, items } => {
                assert!(!ordered);
                assert_eq!(items.len(), 2);
                assert_eq!(
                    items[1],
                    vec![Inline::Strong {
                        text: "Rust".to_string()
                    }]
                );
            }
            other => panic!("expected list, got {other:?}"),
        }
        assert_eq!(
            blocks[2],
            Block::Quote {
                content: vec![text("一句话"), Inline::LineBreak, text("第二句")],
            }
        );
        assert_eq!(blocks[3], Block::Rule);
        assert!(matches!(blocks[4], Block::List { ordered: true, .. }));
    }

    #[test]
    fn test_icon_only_on_second_level() {
        let blocks = parse_blocks("### 工作经历");
        assert!(matches!(blocks[0], Block::Heading { icon: None, level: 3, .. }));
    }

    #[test]
    fn test_emphasis_line_is_paragraph_not_list() {
        let blocks = parse_blocks("*2019.07 - 2024.03*");
        assert_eq!(
            blocks,
            vec![Block::Paragraph {
                content: vec![Inline::Emphasis {
                    text: "2019.07 - 2024.03".to_string()
                }]
            }]
        );
    }

    #[test]
    fn test_inline_link_and_unclosed_markers() {
        let spans = parse_inline("见 [作品集](https://example.com) 和 2*3");
        assert_eq!(
            spans,
            vec![
                text("见 "),
                Inline::Link {
                    text: "作品集".to_string(),
                    href: "https://example.com".to_string()
                },
                text(" 和 2*3"),
            ]
        );
    }

    #[test]
    fn test_render_document_is_deterministic() {
        let md = "\n# 王芳\n\n## 工作经历\n* 一\n";
        let a = render_document(md, None, "from-blue-600", PhotoPlacement::default());
        let b = render_document(md, None, "from-blue-600", PhotoPlacement::default());
        assert_eq!(a, b);
        assert_eq!(a.theme.name, "blue");
        assert_eq!(a.header.len(), 1);
        assert_eq!(a.body.len(), 2);
        assert!(a.photo.data_url.is_none());
    }

    #[test]
    fn test_plain_text() {
        let spans = parse_inline("**A** b _c_");
        assert_eq!(plain_text(&spans), "A b c");
    }
}
