// src/api/types.rs
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Accepts bools, non-empty strings and non-zero numbers as `true`.
fn truthy<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Bool(b) => b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::Array(_) | Value::Object(_) => true,
        Value::Null => false,
    })
}

/// Sizes arrive as ints, floats or null depending on the backing table.
fn lenient_u64<'de, D: Deserializer<'de>>(de: D) -> Result<u64, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64)).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Metadata {
    pub cid: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub size: u64,
    #[serde(rename = "type", default = "unknown")]
    pub content_type: String,
    #[serde(default, deserialize_with = "truthy")]
    pub is_dir: bool,
    #[serde(default)]
    pub gateway_used: Option<String>,
}

impl Metadata {
    pub fn is_text(&self) -> bool {
        matches!(self.content_type.as_str(), "text/plain" | "application/json" | "text/markdown")
    }
}

fn unknown() -> String {
    "unknown".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryItem {
    pub cid: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub cid: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default = "unknown")]
    pub content_type: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Upload {
    pub cid: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub file_size: u64,
    #[serde(default = "unknown")]
    pub file_type: String,
    #[serde(default)]
    pub visibility: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "size_human", default, skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroupCid {
    pub cid: String,
    #[serde(default)]
    pub added_at: Option<String>,
    #[serde(rename = "fileName", default)]
    pub file_name: String,
    #[serde(rename = "fileSize", default, deserialize_with = "lenient_u64")]
    pub file_size: u64,
    #[serde(rename = "fileType", default = "unknown")]
    pub file_type: String,
    #[serde(default)]
    pub size_human: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub cids: Vec<GroupCid>,
    #[serde(default)]
    pub cid_count: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedGroup {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenamedGroup {
    pub group_id: i64,
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AnalyticsTotals {
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub unique_cids: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RankedCid {
    pub cid: String,
    #[serde(default, alias = "views", alias = "downloads", alias = "activity")]
    pub count: u64,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceCount {
    #[serde(alias = "source", alias = "gateway")]
    pub label: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AnalyticsDashboard {
    #[serde(default)]
    pub period_days: u32,
    #[serde(default)]
    pub totals: AnalyticsTotals,
    #[serde(default)]
    pub top_viewed: Vec<RankedCid>,
    #[serde(default)]
    pub top_downloaded: Vec<RankedCid>,
    #[serde(default)]
    pub traffic_sources: Vec<SourceCount>,
    #[serde(default)]
    pub gateway_usage: Vec<SourceCount>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RealtimeAnalytics {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub recent_views: u64,
    #[serde(default)]
    pub recent_downloads: u64,
    #[serde(default)]
    pub active_sessions: u64,
    #[serde(default)]
    pub hot_cids: Vec<RankedCid>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Activity {
    pub action: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CidAnalytics {
    pub cid: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub period_days: u32,
    #[serde(default)]
    pub total_views: u64,
    #[serde(default)]
    pub total_downloads: u64,
    #[serde(default)]
    pub unique_users: u64,
    #[serde(default)]
    pub peak_day: Option<String>,
    #[serde(default)]
    pub peak_day_views: u64,
    #[serde(default)]
    pub recent_activity: Vec<Activity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Views,
    Downloads,
    Traffic,
}

impl ExportKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind.trim().to_lowercase().as_str() {
            "views" => Some(ExportKind::Views),
            "downloads" => Some(ExportKind::Downloads),
            "traffic" | "sources" => Some(ExportKind::Traffic),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExportKind::Views => "views",
            ExportKind::Downloads => "downloads",
            ExportKind::Traffic => "traffic",
        }
    }

    pub fn file_name(self, days: u32) -> String {
        format!("analytics_{}_{}days_uploaded_only.csv", self.as_str(), days)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrendingItem {
    pub cid: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResult {
    pub cid: String,
    #[serde(default)]
    pub visibility: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedFile {
    pub path: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub size: u64,
    #[serde(rename = "type", default = "unknown")]
    pub content_type: String,
    #[serde(default)]
    pub cid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderUploadResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub folder_cid: Option<String>,
    #[serde(default)]
    pub folder_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_size: u64,
    #[serde(default)]
    pub file_count: usize,
    #[serde(default)]
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBookmark {
    pub cid: String,
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub size: u64,
    pub timestamp: String,
}

impl From<NewBookmark> for Bookmark {
    fn from(b: NewBookmark) -> Self {
        Bookmark {
            cid: b.cid,
            title: b.title,
            content_type: b.content_type,
            size: b.size,
            size_human: None,
            timestamp: Some(b.timestamp),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUpload {
    pub cid: String,
    pub file_name: String,
    pub file_size: u64,
    pub file_type: String,
    pub visibility: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_accepts_string_is_dir() {
        let meta: Metadata = serde_json::from_value(json!({
            "cid": "QmDir", "size": 10, "type": "unknown", "is_dir": "QmChild 12 a.txt",
            "gateway_used": "local_ipfs_command"
        }))
        .unwrap();
        assert!(meta.is_dir);
        assert!(!meta.is_text());
    }

    #[test]
    fn test_metadata_text_types() {
        let meta: Metadata = serde_json::from_value(json!({"cid": "Qm", "type": "text/markdown"})).unwrap();
        assert!(meta.is_text());
        assert_eq!(meta.size, 0);
    }

    #[test]
    fn test_group_listing_shape() {
        let groups: Vec<Group> = serde_json::from_value(json!([{
            "id": 1, "name": "work", "created_at": "2024-01-01T00:00:00",
            "cids": [{"cid": "QmA", "added_at": "2024-01-02T00:00:00", "fileName": "File_QmA",
                      "fileSize": 0, "fileType": "unknown", "size_human": "0 B"}],
            "cid_count": 1
        }]))
        .unwrap();
        assert_eq!(groups[0].cids[0].file_name, "File_QmA");
        assert_eq!(groups[0].cid_count, 1);
    }

    #[test]
    fn test_dashboard_aliases() {
        let dash: AnalyticsDashboard = serde_json::from_value(json!({
            "period_days": 30,
            "totals": {"views": 5, "downloads": 2, "unique_cids": 1},
            "top_viewed": [{"cid": "QmA", "views": 5, "filename": "a.txt"}],
            "top_downloaded": [{"cid": "QmA", "downloads": 2, "filename": "a.txt"}],
            "traffic_sources": [{"source": "direct", "count": 4}],
            "gateway_usage": [{"gateway": "ipfs.io", "count": 5}]
        }))
        .unwrap();
        assert_eq!(dash.top_viewed[0].count, 5);
        assert_eq!(dash.top_downloaded[0].count, 2);
        assert_eq!(dash.traffic_sources[0].label, "direct");
        assert_eq!(dash.gateway_usage[0].label, "ipfs.io");
    }

    #[test]
    fn test_upload_round_trip_field_names() {
        let upload = NewUpload {
            cid: "QmA".to_string(),
            file_name: "a.txt".to_string(),
            file_size: 3,
            file_type: "text/plain".to_string(),
            visibility: "public".to_string(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
        };
        let value = serde_json::to_value(&upload).unwrap();
        assert_eq!(value["fileName"], "a.txt");
        assert_eq!(value["fileSize"], 3);

        let listed: Upload = serde_json::from_value(json!({
            "cid": "QmA", "fileName": "a.txt", "fileSize": 3.0, "fileType": "text/plain",
            "visibility": "public", "timestamp": null, "size_human": "3.0 B"
        }))
        .unwrap();
        assert_eq!(listed.file_size, 3);
        assert_eq!(listed.size_human.as_deref(), Some("3.0 B"));
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(ExportKind::Views.file_name(30), "analytics_views_30days_uploaded_only.csv");
        assert_eq!(ExportKind::parse("sources"), Some(ExportKind::Traffic));
        assert_eq!(ExportKind::parse("nope"), None);
    }
}
