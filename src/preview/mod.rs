// src/preview/mod.rs
pub mod code;
pub mod image;
pub mod markdown;
pub mod text;

use crate::listing::FileCategory;
use crate::utils::format_size;

#[derive(Debug, Clone, PartialEq)]
pub enum PreviewContent {
    Text(String),
    Binary(String),
    Error(String),
}

/// Content fetched for one CID, with the hints available for picking a renderer.
pub struct PreviewSource<'a> {
    pub name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

impl PreviewSource<'_> {
    pub fn extension(&self) -> String {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default()
    }
}

pub trait PreviewProvider {
    fn can_preview(&self, source: &PreviewSource) -> bool;
    fn generate_preview(&self, source: &PreviewSource) -> crate::Result<PreviewContent>;
}

pub struct PreviewManager {
    providers: Vec<Box<dyn PreviewProvider + Send + Sync>>,
}

impl Default for PreviewManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewManager {
    pub fn new() -> Self {
        let mut manager = PreviewManager { providers: Vec::new() };
        manager.register(Box::new(markdown::MarkdownPreview::new()));
        manager.register(Box::new(text::TextPreview::new()));
        manager.register(Box::new(code::CodePreview::new()));
        manager.register(Box::new(image::ImagePreview::new()));
        manager
    }

    pub fn register(&mut self, provider: Box<dyn PreviewProvider + Send + Sync>) {
        self.providers.push(provider);
    }

    /// Never fails: unknown content gets a binary summary, provider errors an error panel.
    pub fn get_preview(&self, source: &PreviewSource) -> PreviewContent {
        for provider in &self.providers {
            if provider.can_preview(source) {
                return provider
                    .generate_preview(source)
                    .unwrap_or_else(|e| PreviewContent::Error(e.to_string()));
            }
        }
        PreviewContent::Binary(binary_summary(source.content_type, &source.extension(), source.bytes.len() as u64))
    }
}

/// One-line description shown for content without an inline renderer.
pub fn binary_summary(content_type: &str, extension: &str, size: u64) -> String {
    format!(
        "[{} {}, {}] press w to save",
        category_for(content_type, extension).label(),
        content_type,
        format_size(size)
    )
}

/// Category from the MIME type, falling back to the extension tables.
pub fn category_for(content_type: &str, extension: &str) -> FileCategory {
    let ct = content_type.to_lowercase();
    if ct == "directory" {
        FileCategory::Folder
    } else if ct.starts_with("image/") {
        FileCategory::Image
    } else if ct.starts_with("video/") {
        FileCategory::Video
    } else if ct.starts_with("audio/") {
        FileCategory::Audio
    } else if ct == "application/pdf" {
        FileCategory::Document
    } else if ct.starts_with("text/") || ct == "application/json" {
        FileCategory::Text
    } else {
        FileCategory::from_extension(extension)
    }
}

/// Extension matching a content type, with the leading dot; `""` when unknown.
pub fn extension_for_content_type(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "video/mp4" => ".mp4",
        "video/webm" => ".webm",
        "text/plain" => ".txt",
        "text/markdown" => ".md",
        "application/json" => ".json",
        "application/pdf" => ".pdf",
        "audio/mpeg" => ".mp3",
        "audio/wav" => ".wav",
        _ => "",
    }
}

/// Default name offered when saving `cid`.
pub fn suggested_filename(cid: &str, content_type: Option<&str>) -> String {
    let prefix: String = cid.chars().take(8).collect();
    let ext = content_type.map(extension_for_content_type).unwrap_or("");
    format!("{}{}", prefix, ext)
}

/// Validate a user-entered download filename.
pub fn validate_filename(name: &str) -> crate::Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(crate::Error::Validation("Please enter a filename".to_string()));
    }
    Ok(name.to_string())
}

pub(crate) fn truncate_lines(content: &str, max_lines: usize, max_width: usize) -> String {
    content
        .lines()
        .take(max_lines)
        .map(|l| l.chars().take(max_width).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
