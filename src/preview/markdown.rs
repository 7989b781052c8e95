// src/preview/markdown.rs
use super::*;

/// Light terminal rendering: headings underlined, bullets normalized, fenced code left as is.
pub struct MarkdownPreview {
    max_lines: usize,
}

impl MarkdownPreview {
    pub fn new() -> Self {
        MarkdownPreview { max_lines: 500 }
    }

    fn render(&self, content: &str) -> String {
        let mut out = Vec::new();
        let mut in_fence = false;
        for line in content.lines().take(self.max_lines) {
            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
                out.push(line.to_string());
                continue;
            }
            if in_fence {
                out.push(format!("  {}", line));
                continue;
            }
            let level = line.chars().take_while(|c| *c == '#').count();
            if (1..=6).contains(&level) && line[level..].starts_with(' ') {
                let title = line[level..].trim();
                let rule = if level == 1 { '═' } else { '─' };
                out.push(title.to_string());
                out.push(rule.to_string().repeat(title.chars().count()));
                continue;
            }
            let trimmed = line.trim_start();
            let indent = &line[..line.len() - trimmed.len()];
            match trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
                Some(item) => out.push(format!("{}• {}", indent, item)),
                None => out.push(line.to_string()),
            }
        }
        out.join("\n")
    }
}

impl PreviewProvider for MarkdownPreview {
    fn can_preview(&self, source: &PreviewSource) -> bool {
        source.content_type == "text/markdown" || source.extension() == "md"
    }

    fn generate_preview(&self, source: &PreviewSource) -> crate::Result<PreviewContent> {
        Ok(PreviewContent::Text(self.render(&String::from_utf8_lossy(source.bytes))))
    }
}
