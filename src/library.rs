// src/library.rs
use crate::api::{Backend, Bookmark, Group, HistoryItem, Metadata, NewBookmark, TrendingItem, Upload};
use crate::cid::validate_cid;
use crate::Result;
use chrono::Utc;

/// Side-panel collections: history, bookmarks, uploads, groups and trending CIDs.
#[derive(Debug, Clone, Default)]
pub struct Library {
    pub history: Vec<HistoryItem>,
    pub bookmarks: Vec<Bookmark>,
    pub uploads: Vec<Upload>,
    pub groups: Vec<Group>,
    pub trending: Vec<TrendingItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookmarkChange {
    Add(NewBookmark),
    Remove(String),
}

impl BookmarkChange {
    pub async fn send(&self, backend: &dyn Backend) -> Result<()> {
        match self {
            BookmarkChange::Add(bookmark) => backend.add_bookmark(bookmark).await,
            BookmarkChange::Remove(cid) => backend.delete_bookmark(cid).await,
        }
    }
}

impl Library {
    /// Fetch every collection. Background refresh: failures are logged and leave the list empty.
    pub async fn fetch(backend: &dyn Backend) -> Self {
        let (history, bookmarks, uploads, groups, trending) = tokio::join!(
            backend.history(),
            backend.bookmarks(),
            backend.uploads(),
            backend.groups(),
            backend.trending(),
        );
        Library {
            history: or_log(history, "history"),
            bookmarks: or_log(bookmarks, "bookmarks"),
            uploads: or_log(uploads, "uploads"),
            groups: or_log(groups, "groups"),
            trending: or_log(trending, "trending"),
        }
    }

    pub fn is_bookmarked(&self, cid: &str) -> bool {
        self.bookmarks.iter().any(|b| b.cid == cid)
    }

    /// Per-CID analytics are only offered for content uploaded through the browser.
    pub fn is_uploaded(&self, cid: &str) -> bool {
        self.uploads.iter().any(|u| u.cid == cid)
    }

    pub fn bookmark_change(&self, cid: &str, meta: Option<&Metadata>) -> BookmarkChange {
        if self.is_bookmarked(cid) {
            return BookmarkChange::Remove(cid.to_string());
        }
        let prefix: String = cid.chars().take(8).collect();
        BookmarkChange::Add(NewBookmark {
            cid: cid.to_string(),
            title: format!("Content {}...", prefix),
            content_type: meta.map(|m| m.content_type.clone()).unwrap_or_else(|| "unknown".to_string()),
            size: meta.map(|m| m.size).unwrap_or(0),
            timestamp: Utc::now().to_rfc3339(),
        })
    }

    pub fn apply_bookmark_change(&mut self, change: &BookmarkChange) {
        match change {
            BookmarkChange::Add(bookmark) => self.bookmarks.insert(0, bookmark.clone().into()),
            BookmarkChange::Remove(cid) => self.remove_bookmark(cid),
        }
    }

    pub fn remove_history(&mut self, cid: &str) {
        self.history.retain(|h| h.cid != cid);
    }

    pub fn remove_bookmark(&mut self, cid: &str) {
        self.bookmarks.retain(|b| b.cid != cid);
    }

    pub fn remove_upload(&mut self, cid: &str) {
        self.uploads.retain(|u| u.cid != cid);
    }

    pub fn group(&self, id: i64) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn replace_group(&mut self, group: Group) {
        match self.groups.iter_mut().find(|g| g.id == group.id) {
            Some(existing) => *existing = group,
            None => self.groups.push(group),
        }
    }
}

fn or_log<T: Default>(result: Result<T>, what: &str) -> T {
    result.unwrap_or_else(|e| {
        log::error!("failed to fetch {}: {}", what, e);
        T::default()
    })
}

pub fn validate_group_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(crate::Error::Validation("Please enter a group name".to_string()));
    }
    Ok(name.to_string())
}

pub async fn create_group(backend: &dyn Backend, name: &str) -> Result<String> {
    let name = validate_group_name(name)?;
    let created = backend.create_group(&name).await?;
    log::info!("created group {} ({})", created.name, created.id);
    Ok(format!("Group \"{}\" created successfully!", created.name))
}

pub async fn rename_group(backend: &dyn Backend, id: i64, name: &str) -> Result<String> {
    let name = validate_group_name(name)?;
    let renamed = backend.rename_group(id, &name).await?;
    Ok(format!("Group renamed to \"{}\" successfully!", renamed.new_name))
}

/// Add a typed CID to a group; the CID is checked before any request is sent.
pub async fn add_cid_to_group(backend: &dyn Backend, id: i64, cid: &str) -> Result<String> {
    let cid = validate_cid(cid)?;
    backend.add_to_group(id, &cid).await?;
    Ok("CID added to group successfully!".to_string())
}
