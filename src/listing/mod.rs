// src/listing/mod.rs
pub mod entry;
pub mod stats;
pub mod view;

pub use entry::{normalize_listing, DirectoryEntry};
pub use stats::FolderStats;
pub use view::{ListingQuery, ListingView};

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SortBy {
    #[default]
    Name,
    Size,
    Type,
    Date,
}

impl SortBy {
    /// Unknown keys fall back to `Name`.
    pub fn parse(key: &str) -> Self {
        match key.trim().to_lowercase().as_str() {
            "size" => SortBy::Size,
            "type" => SortBy::Type,
            "date" | "modified" => SortBy::Date,
            _ => SortBy::Name,
        }
    }

    pub fn next(self) -> Self {
        match self {
            SortBy::Name => SortBy::Size,
            SortBy::Size => SortBy::Type,
            SortBy::Type => SortBy::Date,
            SortBy::Date => SortBy::Name,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortBy::Name => "name",
            SortBy::Size => "size",
            SortBy::Type => "type",
            SortBy::Date => "date",
        }
    }
}

impl From<String> for SortBy {
    fn from(key: String) -> Self {
        SortBy::parse(&key)
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum SortOrder {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl From<String> for SortOrder {
    fn from(order: String) -> Self {
        SortOrder::parse(&order)
    }
}

impl SortOrder {
    /// Unknown values fall back to `Ascending`.
    pub fn parse(order: &str) -> Self {
        match order.trim().to_lowercase().as_str() {
            "desc" | "descending" => SortOrder::Descending,
            _ => SortOrder::Ascending,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// Coarse content category derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    Folder,
    Image,
    Video,
    Audio,
    Document,
    Text,
    Other,
}

const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "gif", "webp", "svg", "ico", "bmp"];
const VIDEO_EXTENSIONS: [&str; 8] = ["mp4", "webm", "avi", "mov", "mkv", "wmv", "flv", "3gp"];
const AUDIO_EXTENSIONS: [&str; 7] = ["mp3", "wav", "ogg", "flac", "aac", "wma", "m4a"];
const DOCUMENT_EXTENSIONS: [&str; 7] = ["pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx"];
const TEXT_EXTENSIONS: [&str; 7] = ["txt", "md", "json", "xml", "csv", "log", "rtf"];

impl FileCategory {
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_lowercase();
        let ext = ext.as_str();
        if IMAGE_EXTENSIONS.contains(&ext) {
            FileCategory::Image
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            FileCategory::Video
        } else if AUDIO_EXTENSIONS.contains(&ext) {
            FileCategory::Audio
        } else if DOCUMENT_EXTENSIONS.contains(&ext) {
            FileCategory::Document
        } else if TEXT_EXTENSIONS.contains(&ext) {
            FileCategory::Text
        } else {
            FileCategory::Other
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileCategory::Folder => "folder",
            FileCategory::Image => "image",
            FileCategory::Video => "video",
            FileCategory::Audio => "audio",
            FileCategory::Document => "document",
            FileCategory::Text => "text",
            FileCategory::Other => "other",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            FileCategory::Folder => "📁",
            FileCategory::Image => "🖼",
            FileCategory::Video => "🎞",
            FileCategory::Audio => "♪",
            FileCategory::Document => "📄",
            FileCategory::Text => "📝",
            FileCategory::Other => "·",
        }
    }
}
