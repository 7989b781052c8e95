// src/listing/entry.rs
use super::FileCategory;
use crate::utils::{format_size, plural};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One file or subfolder inside a listed directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_dir: bool,
    pub size_bytes: u64,
    pub size_human: Option<String>,
    pub file_size: u64,
    pub item_count: Option<u64>,
    pub extension: String,
    pub modified_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub content_id: String,
    pub content_type: String,
    pub parent_cid: String,
    pub can_preview: bool,
}

impl DirectoryEntry {
    /// Build an entry from a loosely typed backend record. Never fails;
    /// missing or malformed fields fall back to defaults.
    pub fn from_raw(raw: &Value, parent: &str) -> Self {
        let name = str_field(raw, "name").unwrap_or_default();
        let content_type = str_field(raw, "type").unwrap_or_else(|| "unknown".to_string());
        let is_dir = truthy(raw.get("is_directory")) || content_type == "directory";
        let size_bytes = u64_field(raw, "size").unwrap_or(0);

        let size_human = str_field(raw, "size_human")
            .filter(|s| !s.is_empty())
            .or_else(|| (size_bytes > 0).then(|| format_size(size_bytes)));

        let file_size = u64_field(raw, "fileSize")
            .filter(|s| *s > 0)
            .unwrap_or(size_bytes);

        let extension = str_field(raw, "extension")
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| extension_of(&name));

        DirectoryEntry {
            extension,
            is_dir,
            size_bytes,
            size_human,
            file_size,
            item_count: u64_field(raw, "item_count"),
            modified_at: time_field(raw, "modified").or_else(|| time_field(raw, "last_modified")),
            created_at: time_field(raw, "created").or_else(|| time_field(raw, "created_at")),
            content_id: str_field(raw, "cid").unwrap_or_default(),
            parent_cid: str_field(raw, "parent_cid").unwrap_or_else(|| parent.to_string()),
            can_preview: truthy(raw.get("can_preview")),
            content_type,
            name,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    pub fn category(&self) -> FileCategory {
        if self.is_dir {
            FileCategory::Folder
        } else {
            FileCategory::from_extension(&self.extension)
        }
    }

    /// Timestamp used for date sorting, in epoch milliseconds.
    pub fn sort_timestamp(&self) -> i64 {
        self.modified_at
            .or(self.created_at)
            .map(|t| t.timestamp_millis())
            .unwrap_or(0)
    }

    pub fn display_size(&self) -> String {
        if self.is_dir {
            return match self.item_count {
                Some(count) => plural(count, "item"),
                None => "Folder".to_string(),
            };
        }
        if let Some(human) = self.size_human.as_deref() {
            if human != "0 B" {
                return human.to_string();
            }
        }
        if self.size_bytes > 0 {
            return format_size(self.size_bytes);
        }
        if self.file_size > 0 {
            return format_size(self.file_size);
        }
        "Unknown size".to_string()
    }
}

/// Normalize an `/ls` response body. A body without an `entries` array is an empty listing.
pub fn normalize_listing(body: &Value, parent: &str) -> Vec<DirectoryEntry> {
    body.get("entries")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(|e| DirectoryEntry::from_raw(e, parent)).collect())
        .unwrap_or_default()
}

fn extension_of(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

fn str_field(raw: &Value, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn u64_field(raw: &Value, key: &str) -> Option<u64> {
    match raw.get(key)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        _ => false,
    }
}

fn time_field(raw: &Value, key: &str) -> Option<DateTime<Utc>> {
    match raw.get(key)? {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

/// Accepts RFC 3339, naive ISO-8601 (treated as UTC), SQLite's `YYYY-MM-DD HH:MM:SS` and bare dates.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(t.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_raw_full_record() {
        let raw = json!({
            "name": "report.PDF",
            "cid": "QmChild",
            "size": 2048,
            "size_human": "2.0 KB",
            "type": "application/pdf",
            "is_directory": false,
            "extension": ".pdf",
            "can_preview": true,
            "parent_cid": "QmParent",
            "modified": "2024-03-01T10:00:00Z"
        });
        let entry = DirectoryEntry::from_raw(&raw, "QmQuery");
        assert_eq!(entry.name, "report.PDF");
        assert_eq!(entry.extension, "pdf");
        assert_eq!(entry.size_bytes, 2048);
        assert_eq!(entry.content_id, "QmChild");
        assert_eq!(entry.parent_cid, "QmParent");
        assert!(entry.can_preview);
        assert!(!entry.is_dir);
        assert!(entry.modified_at.is_some());
        assert_eq!(entry.category(), FileCategory::Document);
    }

    #[test]
    fn test_from_raw_degrades_to_defaults() {
        let entry = DirectoryEntry::from_raw(&json!({"size": "oops", "modified": 12}), "QmRoot");
        assert_eq!(entry.name, "");
        assert_eq!(entry.size_bytes, 0);
        assert_eq!(entry.extension, "");
        assert_eq!(entry.content_type, "unknown");
        assert_eq!(entry.parent_cid, "QmRoot");
        assert!(!entry.is_dir);
        assert!(entry.size_human.is_none());

        let entry = DirectoryEntry::from_raw(&json!(null), "QmRoot");
        assert_eq!(entry.name, "");
    }

    #[test]
    fn test_directory_detection() {
        let by_type = DirectoryEntry::from_raw(&json!({"name": "docs", "type": "directory"}), "");
        assert!(by_type.is_dir);
        // the gateway backend sometimes reports the raw `ipfs ls` output instead of a bool
        let by_string = DirectoryEntry::from_raw(&json!({"name": "docs", "is_directory": "Qm 12 a.txt"}), "");
        assert!(by_string.is_dir);
        assert_eq!(by_string.category(), FileCategory::Folder);
    }

    #[test]
    fn test_extension_derived_from_name() {
        let entry = DirectoryEntry::from_raw(&json!({"name": "archive.tar.GZ"}), "");
        assert_eq!(entry.extension, "gz");
        let entry = DirectoryEntry::from_raw(&json!({"name": "README"}), "");
        assert_eq!(entry.extension, "");
    }

    #[test]
    fn test_display_size_fallbacks() {
        let human = DirectoryEntry::from_raw(&json!({"name": "a", "size": 10, "size_human": "10 B"}), "");
        assert_eq!(human.display_size(), "10 B");

        let raw_size = DirectoryEntry::from_raw(&json!({"name": "a", "size": 2048, "size_human": "0 B"}), "");
        assert_eq!(raw_size.display_size(), "2.0 KB");

        let alt = DirectoryEntry::from_raw(&json!({"name": "a", "fileSize": 1024}), "");
        assert_eq!(alt.display_size(), "1.0 KB");

        let unknown = DirectoryEntry::from_raw(&json!({"name": "a"}), "");
        assert_eq!(unknown.display_size(), "Unknown size");
    }

    #[test]
    fn test_display_size_for_directories() {
        let counted = DirectoryEntry::from_raw(&json!({"name": "p", "is_directory": true, "item_count": 3, "size": 99}), "");
        assert_eq!(counted.display_size(), "3 items");
        let single = DirectoryEntry::from_raw(&json!({"name": "p", "is_directory": true, "item_count": 1}), "");
        assert_eq!(single.display_size(), "1 item");
        let bare = DirectoryEntry::from_raw(&json!({"name": "p", "is_directory": true}), "");
        assert_eq!(bare.display_size(), "Folder");
    }

    #[test]
    fn test_timestamp_fallbacks() {
        let entry = DirectoryEntry::from_raw(
            &json!({"name": "a", "last_modified": "2024-01-02T03:04:05.123", "created_at": "2023-05-06 07:08:09"}),
            "",
        );
        assert!(entry.modified_at.is_some());
        assert!(entry.created_at.is_some());
        assert!(entry.sort_timestamp() > 0);
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("2024-02-29").is_some());
    }

    #[test]
    fn test_normalize_listing() {
        let body = json!({"cid": "QmDir", "entries": [{"name": "a.txt"}, {"name": "b", "is_directory": true}]});
        let entries = normalize_listing(&body, "QmDir");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].parent_cid, "QmDir");
        assert!(normalize_listing(&json!({"error": "nope"}), "QmDir").is_empty());
    }
}
