// src/preview/text.rs
use super::*;
use crate::utils::format_json;

pub struct TextPreview {
    max_lines: usize,
    max_width: usize,
}

impl TextPreview {
    pub fn new() -> Self {
        TextPreview { max_lines: 500, max_width: 200 }
    }
}

impl PreviewProvider for TextPreview {
    fn can_preview(&self, source: &PreviewSource) -> bool {
        let text_extensions = ["txt", "json", "xml", "yaml", "yml", "toml", "ini", "cfg", "conf", "log", "csv", "rtf", "env"];
        source.content_type.starts_with("text/")
            || source.content_type == "application/json"
            || text_extensions.contains(&source.extension().as_str())
    }

    fn generate_preview(&self, source: &PreviewSource) -> crate::Result<PreviewContent> {
        let content = String::from_utf8_lossy(source.bytes);
        let is_json = source.content_type == "application/json" || source.extension() == "json";
        let body = if is_json {
            format_json(&content).unwrap_or_else(|_| content.into_owned())
        } else {
            content.into_owned()
        };
        Ok(PreviewContent::Text(truncate_lines(&body, self.max_lines, self.max_width)))
    }
}
