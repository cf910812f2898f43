//! User-triggered downloads: the editor text as Markdown, and a standalone
//! printable HTML page that opens the print dialog on load.

use crate::errors::AppError;
use crate::render::document::DocumentTree;
use crate::render::html::{document_title, escape, to_html};

#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
}

impl ExportFile {
    /// `Content-Disposition` value with an ASCII fallback and the UTF-8 name.
    pub fn content_disposition(&self) -> String {
        let ascii: String = self
            .file_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || "._-".contains(c) { c } else { '_' })
            .collect();
        format!(
            "attachment; filename=\"{ascii}\"; filename*=UTF-8''{}",
            urlencoding::encode(&self.file_name)
        )
    }
}

/// Whitespace runs collapse to a single underscore.
fn file_stem(full_name: &str) -> String {
    let stem = full_name.split_whitespace().collect::<Vec<_>>().join("_");
    if stem.is_empty() {
        "未命名".to_string()
    } else {
        stem
    }
}

pub fn markdown_export(full_name: &str, text: &str) -> Result<ExportFile, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Export("no résumé content to export".to_string()));
    }
    Ok(ExportFile {
        file_name: format!("{}_简历.md", file_stem(full_name)),
        content_type: "text/markdown; charset=utf-8",
        body: text.to_string(),
    })
}

const PRINT_STYLES: &str = r#"
    body { font-family: 'Inter', "Microsoft YaHei", sans-serif; background: #525252; margin: 0; padding: 20px; display: flex; justify-content: center; }
    .resume-paper {
        background: white;
        width: 210mm;
        min-height: 297mm;
        padding: 15mm;
        box-shadow: 0 10px 15px -3px rgba(0, 0, 0, 0.1);
        box-sizing: border-box;
        overflow-wrap: break-word;
    }
    @media print {
      body { margin: 0; padding: 0; background: white; display: block; }
      .resume-paper { width: 100%; margin: 0; padding: 15mm; box-shadow: none; min-height: auto; }
      h1, h2, h3, h4, p, li, blockquote { break-inside: avoid; }
      h2 { break-after: avoid; }
      @page { margin: 0; size: auto; }
      * { -webkit-print-color-adjust: exact !important; print-color-adjust: exact !important; }
    }
"#;

pub fn html_export(full_name: &str, tree: &DocumentTree) -> Result<ExportFile, AppError> {
    if tree.header.is_empty() && tree.body.is_empty() {
        return Err(AppError::Export("rendered document is empty".to_string()));
    }

    let title = if full_name.trim().is_empty() {
        document_title(tree).unwrap_or_default()
    } else {
        full_name.trim().to_string()
    };

    let body = format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title} - 简历</title>
  <script src="https://cdn.tailwindcss.com"></script>
  <link href="https://fonts.googleapis.com/css2?family=Inter:wght@300;400;500;600;700&display=swap" rel="stylesheet">
  <style>{styles}</style>
</head>
<body>
  <div class="resume-paper">
    {content}
  </div>
  <script>
    window.onload = () => {{
      setTimeout(() => {{ window.print(); }}, 1000);
    }};
  </script>
</body>
</html>
"#,
        title = escape(&title),
        styles = PRINT_STYLES,
        content = to_html(tree),
    );

    Ok(ExportFile {
        file_name: format!("{}_简历_打印版.html", file_stem(full_name)),
        content_type: "text/html; charset=utf-8",
        body,
    })
}
