//! Serializes a `DocumentTree` into HTML markup (the printable page body).
//! Class names are Tailwind utilities; the export page pulls Tailwind from its CDN.

use crate::render::document::{plain_text, Block, DocumentTree, Inline, SectionIcon};
use crate::render::theme::Theme;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Only web and mail links survive; anything else is rendered inert.
fn safe_href(href: &str) -> String {
    let lower = href.trim().to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("mailto:")
    {
        escape(href.trim())
    } else {
        "#".to_string()
    }
}

fn icon_glyph(icon: SectionIcon) -> &'static str {
    match icon {
        SectionIcon::Briefcase => "💼",
        SectionIcon::AcademicCap => "🎓",
        SectionIcon::Lightning => "⚡",
        SectionIcon::User => "👤",
    }
}

fn inline_html(spans: &[Inline], theme: &Theme) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Inline::Text { text } => out.push_str(&escape(text)),
            Inline::Strong { text } => out.push_str(&format!(
                r#"<strong class="font-bold {}">{}</strong>"#,
                theme.text,
                escape(text)
            )),
            Inline::Emphasis { text } => out.push_str(&format!("<em>{}</em>", escape(text))),
            Inline::Link { text, href } => out.push_str(&format!(
                r#"<a class="hover:underline font-medium {} break-all" href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                theme.link,
                safe_href(href),
                escape(text)
            )),
            Inline::LineBreak => out.push_str("<br>"),
        }
    }
    out
}

fn block_html(block: &Block, theme: &Theme) -> String {
    match block {
        Block::Heading {
            level: 1, content, ..
        } => format!(
            r#"<div class="mb-4 relative inline-block"><h1 class="text-4xl font-extrabold {} leading-tight tracking-tight break-words">{}</h1><div class="h-1.5 w-full bg-gradient-to-r {} opacity-30 mt-1 rounded-full"></div></div>"#,
            theme.text,
            inline_html(content, theme),
            escape(&theme.gradient)
        ),
        Block::Heading {
            level: 2,
            content,
            icon,
        } => {
            let icon_html = icon
                .map(|i| {
                    format!(
                        r#"<span class="{} mr-2 opacity-80" aria-hidden="true">{}</span>"#,
                        theme.accent,
                        icon_glyph(i)
                    )
                })
                .unwrap_or_default();
            format!(
                r#"<div class="flex items-center mt-8 mb-4 border-b-2 {} pb-1">{}<h2 class="text-lg font-bold uppercase tracking-wider {} break-words">{}</h2></div>"#,
                theme.border,
                icon_html,
                theme.text,
                inline_html(content, theme)
            )
        }
        Block::Heading { level, content, .. } => {
            let class = if *level == 3 {
                "text-base font-bold text-gray-800 mt-4 mb-2 break-words"
            } else {
                "text-sm font-semibold text-gray-600 mt-2 mb-1 break-words"
            };
            let tag = (*level).clamp(3, 6);
            format!(
                r#"<h{tag} class="{class}">{}</h{tag}>"#,
                inline_html(content, theme)
            )
        }
        Block::Paragraph { content } => format!(
            r#"<p class="mb-2 text-gray-700 leading-relaxed text-sm text-justify break-words">{}</p>"#,
            inline_html(content, theme)
        ),
        Block::List { ordered, items } => {
            let (tag, class) = if *ordered {
                ("ol", "list-decimal ml-5 mb-3 text-gray-700 space-y-1.5")
            } else {
                ("ul", "ml-1 mb-3 text-gray-700 space-y-1.5")
            };
            let items: String = items
                .iter()
                .map(|item| {
                    format!(
                        r#"<li class="relative pl-4 text-sm leading-6"><span class="absolute left-0 top-[0.6rem] w-1.5 h-1.5 rounded-full {}"></span><span class="break-words">{}</span></li>"#,
                        theme.bullet,
                        inline_html(item, theme)
                    )
                })
                .collect();
            format!(r#"<{tag} class="{class}">{items}</{tag}>"#)
        }
        Block::Quote { content } => format!(
            r#"<blockquote class="border-l-4 {} pl-4 py-3 pr-3 italic text-gray-600 my-5 {} rounded-r-lg text-sm break-words">{}</blockquote>"#,
            theme.border_dark,
            theme.bg,
            inline_html(content, theme)
        ),
        Block::Rule => format!(
            r#"<div class="relative clear-both py-4"><div class="border-t border-dashed {} w-full"></div></div>"#,
            theme.border
        ),
    }
}

fn blocks_html(blocks: &[Block], theme: &Theme) -> String {
    blocks.iter().map(|b| block_html(b, theme)).collect()
}

fn photo_html(tree: &DocumentTree) -> String {
    let p = tree.photo.placement;
    let style = format!(
        "width: {}px; height: {}px; margin-top: {}px; margin-right: {}px;",
        p.width, p.height, p.margin_top, p.margin_right
    );
    let inner = match &tree.photo.data_url {
        Some(url) => format!(
            r#"<img src="{}" alt="Profile" class="w-full h-full object-cover rounded-lg">"#,
            escape(url)
        ),
        None => r#"<div class="flex items-center justify-center h-full w-full text-slate-400 text-[10px]">上传照片</div>"#
            .to_string(),
    };
    format!(
        r#"<div class="shrink-0 relative" style="margin-right: -10px;"><div class="relative rounded-lg border border-gray-100" style="{style}">{inner}</div></div>"#
    )
}

/// Markup of the rendered document: header beside the photo, body below.
pub fn to_html(tree: &DocumentTree) -> String {
    let theme = &tree.theme;
    format!(
        concat!(
            r#"<div class="relative break-words flex flex-col font-sans w-full">"#,
            r#"<div class="h-6 -mx-[15mm] -mt-[15mm] mb-4 bg-gradient-to-r {gradient} opacity-90"></div>"#,
            r#"<div class="flex flex-row justify-between items-start mb-2 min-h-[140px]">"#,
            r#"<div class="flex-1 pr-8 min-w-0">{header}</div>{photo}</div>"#,
            r#"<div class="w-full">{body}</div>"#,
            r#"</div>"#
        ),
        gradient = escape(&theme.gradient),
        header = blocks_html(&tree.header, theme),
        photo = photo_html(tree),
        body = blocks_html(&tree.body, theme),
    )
}

/// Plain-text title for the export page, taken from the first heading.
pub fn document_title(tree: &DocumentTree) -> Option<String> {
    tree.header.iter().chain(tree.body.iter()).find_map(|b| match b {
        Block::Heading { content, .. } => Some(plain_text(content)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::{PhotoImage, PhotoPlacement};
    use crate::render::document::render_document;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_markup_contains_sections_and_icon() {
        let tree = render_document(
            "# 王芳\n\n## 工作经历\n* 搭建组件库\n",
            None,
            "from-emerald-500",
            PhotoPlacement::default(),
        );
        let html = to_html(&tree);
        assert!(html.contains("<h1"));
        assert!(html.contains("王芳"));
        assert!(html.contains("💼"));
        assert!(html.contains("搭建组件库"));
        assert!(html.contains("text-emerald-900"));
        assert!(html.contains("width: 151px; height: 189px;"));
        assert!(html.contains("上传照片"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let tree = render_document(
            "# <script>alert(1)</script>",
            None,
            "",
            PhotoPlacement::default(),
        );
        let html = to_html(&tree);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_unsafe_link_is_neutralised() {
        let tree = render_document("[x](javascript:alert(1))", None, "", PhotoPlacement::default());
        assert!(to_html(&tree).contains(r##"href="#""##));
    }

    #[test]
    fn test_photo_embedded_when_present() {
        let photo = PhotoImage::from_bytes(Some("image/png"), b"abc").unwrap();
        let tree = render_document("# A", Some(&photo), "", PhotoPlacement::default());
        assert!(to_html(&tree).contains(r#"src="data:image/png;base64,YWJj""#));
    }

    #[test]
    fn test_document_title() {
        let tree = render_document("\n# 王芳\n> x\n", None, "", PhotoPlacement::default());
        assert_eq!(document_title(&tree).as_deref(), Some("王芳"));
    }
}
