// src/api/fake.rs
//! In-memory backend for unit tests.
use super::*;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeBackend {
    pub metadata: HashMap<String, Metadata>,
    pub listings: HashMap<String, Vec<DirectoryEntry>>,
    pub texts: HashMap<String, String>,
    pub fail_transport: bool,
    pub calls: Mutex<Vec<String>>,
    pub history: Mutex<Vec<HistoryItem>>,
    pub bookmarks: Mutex<Vec<Bookmark>>,
    pub uploads: Mutex<Vec<Upload>>,
    pub groups: Mutex<Vec<Group>>,
}

impl FakeBackend {
    pub fn with_file(mut self, cid: &str, content_type: &str, text: Option<&str>) -> Self {
        self.metadata.insert(
            cid.to_string(),
            Metadata { cid: cid.to_string(), size: 12, content_type: content_type.to_string(), is_dir: false, gateway_used: None },
        );
        if let Some(text) = text {
            self.texts.insert(cid.to_string(), text.to_string());
        }
        self
    }

    pub fn with_dir(mut self, cid: &str, entries: Vec<DirectoryEntry>) -> Self {
        self.metadata.insert(
            cid.to_string(),
            Metadata { cid: cid.to_string(), size: 0, content_type: "text/html".to_string(), is_dir: true, gateway_used: None },
        );
        self.listings.insert(cid.to_string(), entries);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail_transport {
            return Err(Error::Status(503));
        }
        Ok(())
    }

    fn group_mut<T>(&self, id: i64, f: impl FnOnce(&mut Group) -> Result<T>) -> Result<T> {
        let mut groups = self.groups.lock().unwrap();
        let group = groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| Error::Api("Group not found".to_string()))?;
        f(group)
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn metadata(&self, cid: &str) -> Result<Metadata> {
        self.record(format!("metadata {}", cid))?;
        self.metadata.get(cid).cloned().ok_or_else(|| Error::Api("Could not fetch metadata".to_string()))
    }

    async fn list(&self, cid: &str) -> Result<Vec<DirectoryEntry>> {
        self.record(format!("ls {}", cid))?;
        self.listings.get(cid).cloned().ok_or_else(|| Error::Api("Could not list directory contents".to_string()))
    }

    async fn content_text(&self, cid: &str) -> Result<String> {
        self.record(format!("content {}", cid))?;
        self.texts.get(cid).cloned().ok_or(Error::Status(404))
    }

    async fn content_bytes(&self, cid: &str) -> Result<Vec<u8>> {
        self.content_text(cid).await.map(String::into_bytes)
    }

    async fn download(&self, cid: &str, _filename: &str) -> Result<Vec<u8>> {
        self.content_bytes(cid).await
    }

    async fn history(&self) -> Result<Vec<HistoryItem>> {
        self.record("history".to_string())?;
        Ok(self.history.lock().unwrap().clone())
    }

    async fn save_history(&self, cid: &str) -> Result<()> {
        self.record(format!("save_history {}", cid))?;
        self.history.lock().unwrap().insert(0, HistoryItem { cid: cid.to_string(), timestamp: None });
        Ok(())
    }

    async fn delete_history(&self, cid: &str) -> Result<()> {
        self.record(format!("delete_history {}", cid))?;
        self.history.lock().unwrap().retain(|h| h.cid != cid);
        Ok(())
    }

    async fn bookmarks(&self) -> Result<Vec<Bookmark>> {
        self.record("bookmarks".to_string())?;
        Ok(self.bookmarks.lock().unwrap().clone())
    }

    async fn add_bookmark(&self, bookmark: &NewBookmark) -> Result<()> {
        self.record(format!("add_bookmark {}", bookmark.cid))?;
        self.bookmarks.lock().unwrap().insert(0, bookmark.clone().into());
        Ok(())
    }

    async fn delete_bookmark(&self, cid: &str) -> Result<()> {
        self.record(format!("delete_bookmark {}", cid))?;
        let mut bookmarks = self.bookmarks.lock().unwrap();
        let before = bookmarks.len();
        bookmarks.retain(|b| b.cid != cid);
        if bookmarks.len() == before {
            return Err(Error::Api("Bookmark not found".to_string()));
        }
        Ok(())
    }

    async fn uploads(&self) -> Result<Vec<Upload>> {
        self.record("uploads".to_string())?;
        Ok(self.uploads.lock().unwrap().clone())
    }

    async fn record_upload(&self, upload: &NewUpload) -> Result<()> {
        self.record(format!("record_upload {}", upload.cid))?;
        self.uploads.lock().unwrap().insert(
            0,
            Upload {
                cid: upload.cid.clone(),
                file_name: upload.file_name.clone(),
                file_size: upload.file_size,
                file_type: upload.file_type.clone(),
                visibility: upload.visibility.clone(),
                timestamp: Some(upload.timestamp.clone()),
                size_human: None,
            },
        );
        Ok(())
    }

    async fn delete_upload(&self, cid: &str) -> Result<()> {
        self.record(format!("delete_upload {}", cid))?;
        self.uploads.lock().unwrap().retain(|u| u.cid != cid);
        Ok(())
    }

    async fn upload_file(&self, path: &Path, _visibility: Visibility) -> Result<UploadResult> {
        self.record(format!("upload_file {}", path.display()))?;
        Ok(UploadResult { cid: "QmUploaded".to_string(), visibility: None })
    }

    async fn upload_folder(&self, root: &Path, _visibility: Visibility) -> Result<FolderUploadResult> {
        self.record(format!("upload_folder {}", root.display()))?;
        Ok(FolderUploadResult {
            success: true,
            folder_cid: Some("QmFolder".to_string()),
            folder_name: Some("site".to_string()),
            total_size: 7,
            file_count: 1,
            files: vec![UploadedFile {
                path: "site/index.html".to_string(),
                size: 7,
                content_type: "text/html".to_string(),
                cid: Some("QmIndex".to_string()),
            }],
        })
    }

    async fn groups(&self) -> Result<Vec<Group>> {
        self.record("groups".to_string())?;
        Ok(self.groups.lock().unwrap().clone())
    }

    async fn group(&self, id: i64) -> Result<Group> {
        self.record(format!("group {}", id))?;
        self.group_mut(id, |g| Ok(g.clone()))
    }

    async fn create_group(&self, name: &str) -> Result<CreatedGroup> {
        self.record(format!("create_group {}", name))?;
        let mut groups = self.groups.lock().unwrap();
        if groups.iter().any(|g| g.name == name) {
            return Err(Error::Api("Group name already exists".to_string()));
        }
        let id = groups.iter().map(|g| g.id).max().unwrap_or(0) + 1;
        groups.push(Group { id, name: name.to_string(), created_at: None, cids: Vec::new(), cid_count: 0 });
        Ok(CreatedGroup { id, name: name.to_string(), created_at: None })
    }

    async fn rename_group(&self, id: i64, name: &str) -> Result<RenamedGroup> {
        self.record(format!("rename_group {} {}", id, name))?;
        self.group_mut(id, |g| {
            let old_name = std::mem::replace(&mut g.name, name.to_string());
            Ok(RenamedGroup { group_id: id, old_name, new_name: name.to_string() })
        })
    }

    async fn delete_group(&self, id: i64) -> Result<()> {
        self.record(format!("delete_group {}", id))?;
        self.groups.lock().unwrap().retain(|g| g.id != id);
        Ok(())
    }

    async fn add_to_group(&self, id: i64, cid: &str) -> Result<()> {
        self.record(format!("add_to_group {} {}", id, cid))?;
        self.group_mut(id, |g| {
            if g.cids.iter().any(|c| c.cid == cid) {
                return Err(Error::Api("CID already exists in this group".to_string()));
            }
            g.cids.push(GroupCid {
                cid: cid.to_string(),
                added_at: None,
                file_name: String::new(),
                file_size: 0,
                file_type: "unknown".to_string(),
                size_human: None,
            });
            g.cid_count = g.cids.len();
            Ok(())
        })
    }

    async fn remove_from_group(&self, id: i64, cid: &str) -> Result<()> {
        self.record(format!("remove_from_group {} {}", id, cid))?;
        self.group_mut(id, |g| {
            g.cids.retain(|c| c.cid != cid);
            g.cid_count = g.cids.len();
            Ok(())
        })
    }

    async fn analytics_dashboard(&self, days: u32) -> Result<AnalyticsDashboard> {
        self.record(format!("dashboard {}", days))?;
        Ok(AnalyticsDashboard { period_days: days, ..Default::default() })
    }

    async fn analytics_realtime(&self) -> Result<RealtimeAnalytics> {
        self.record("realtime".to_string())?;
        Ok(RealtimeAnalytics { recent_views: 1, ..Default::default() })
    }

    async fn analytics_cid(&self, cid: &str, days: u32) -> Result<CidAnalytics> {
        self.record(format!("analytics_cid {} {}", cid, days))?;
        Err(Error::Api("Analytics only available for uploaded content".to_string()))
    }

    async fn analytics_export(&self, kind: ExportKind, days: u32) -> Result<String> {
        self.record(format!("export {} {}", kind.as_str(), days))?;
        Ok("CID,Timestamp\n".to_string())
    }

    async fn trending(&self) -> Result<Vec<TrendingItem>> {
        self.record("trending".to_string())?;
        Ok(Vec::new())
    }
}
