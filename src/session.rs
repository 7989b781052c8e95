// src/session.rs
use crate::api::{Backend, Bookmark, HistoryItem, Metadata};
use crate::listing::{DirectoryEntry, FileCategory};
use crate::preview::{binary_summary, category_for, PreviewContent, PreviewManager, PreviewSource};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Largest non-text body fetched for inline preview.
pub const PREVIEW_LIMIT: u64 = 5 * 1024 * 1024;

/// Everything one metadata lookup produced for the content pane.
#[derive(Debug, Clone, Default)]
pub struct Loaded {
    pub generation: u64,
    pub query: String,
    pub meta: Option<Metadata>,
    pub entries: Vec<DirectoryEntry>,
    pub text: Option<String>,
    pub bytes: Option<Vec<u8>>,
    pub error: Option<String>,
    pub bookmarked: bool,
    /// Rendered file preview; `None` for folders and failed lookups.
    pub preview: Option<PreviewContent>,
    /// Refreshed history when this load recorded a new visit.
    pub history: Option<Vec<HistoryItem>>,
}

/// Loads CIDs against a backend, remembering which ones were already recorded in history.
pub struct Session {
    backend: Arc<dyn Backend>,
    saved_cids: Mutex<HashSet<String>>,
    generation: AtomicU64,
    last_query: Mutex<Option<String>>,
    previews: Arc<PreviewManager>,
}

impl Session {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Session {
            backend,
            saved_cids: Mutex::new(HashSet::new()),
            generation: AtomicU64::new(0),
            last_query: Mutex::new(None),
            previews: Arc::new(PreviewManager::new()),
        }
    }

    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    /// Claim a generation number for a new load; older ones become stale.
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    pub fn last_query(&self) -> Option<String> {
        self.last_query.lock().ok().and_then(|q| q.clone())
    }

    /// Record `cid` in history once per session. Returns whether a request was made.
    async fn save_history_once(&self, cid: &str) -> bool {
        let first_visit = match self.saved_cids.lock() {
            Ok(mut saved) => saved.insert(cid.to_string()),
            Err(_) => false,
        };
        if !first_visit {
            return false;
        }
        if let Err(e) = self.backend.save_history(cid).await {
            log::warn!("failed to save {} to history: {}", cid, e);
        }
        true
    }

    /// Claim a generation for reloading the last query; the one explicit retry path.
    pub fn begin_retry(&self) -> Option<(u64, String)> {
        let query = self.last_query()?;
        log::info!("retrying {}", query);
        Some((self.begin(), query))
    }

    pub async fn load_as(&self, generation: u64, query: &str, bookmarks: &[Bookmark]) -> Loaded {
        if let Ok(mut last) = self.last_query.lock() {
            *last = Some(query.to_string());
        }
        let mut loaded = Loaded { generation, query: query.to_string(), ..Default::default() };

        let meta = match self.backend.metadata(query).await {
            Ok(meta) => meta,
            Err(e) if e.is_user_facing() => {
                loaded.error = Some(e.to_string());
                return loaded;
            }
            Err(e) => {
                log::error!("metadata lookup for {} failed: {}", query, e);
                loaded.error = Some(format!("Failed to fetch CID data: {}", e));
                return loaded;
            }
        };

        if self.save_history_once(query).await {
            match self.backend.history().await {
                Ok(history) => loaded.history = Some(history),
                Err(e) => log::warn!("failed to refresh history: {}", e),
            }
        }
        loaded.bookmarked = bookmarks.iter().any(|b| b.cid == query);

        if meta.is_dir {
            match self.backend.list(query).await {
                Ok(entries) => loaded.entries = entries,
                Err(e) => log::warn!("failed to fetch directory listing for {}: {}", query, e),
            }
        }

        if meta.is_text() {
            match self.backend.content_text(query).await {
                Ok(text) => loaded.text = Some(text),
                Err(e) => log::warn!("failed to fetch text content for {}: {}", query, e),
            }
        } else if !meta.is_dir && wants_inline_bytes(&meta) {
            match self.backend.content_bytes(query).await {
                Ok(bytes) => loaded.bytes = Some(bytes),
                Err(e) => log::warn!("failed to fetch preview content for {}: {}", query, e),
            }
        }

        loaded.meta = Some(meta);
        loaded.preview = self.render_preview(&loaded).await;
        loaded
    }

    async fn render_preview(&self, loaded: &Loaded) -> Option<PreviewContent> {
        let meta = loaded.meta.as_ref().filter(|m| !m.is_dir)?;
        let name = loaded.query.rsplit('/').next().unwrap_or(&loaded.query).to_string();
        let content_type = meta.content_type.clone();
        let body = match (&loaded.text, &loaded.bytes) {
            (Some(text), _) => text.clone().into_bytes(),
            (None, Some(bytes)) => bytes.clone(),
            (None, None) => {
                let extension = PreviewSource { name: &name, content_type: &content_type, bytes: &[] }.extension();
                return Some(PreviewContent::Binary(binary_summary(&content_type, &extension, meta.size)));
            }
        };
        // Image rendering shells out to chafa and blocks.
        let previews = Arc::clone(&self.previews);
        let rendered = tokio::task::spawn_blocking(move || {
            previews.get_preview(&PreviewSource { name: &name, content_type: &content_type, bytes: &body })
        })
        .await;
        Some(rendered.unwrap_or_else(|e| PreviewContent::Error(e.to_string())))
    }
}

fn wants_inline_bytes(meta: &Metadata) -> bool {
    let small = meta.size > 0 && meta.size <= PREVIEW_LIMIT;
    small && matches!(category_for(&meta.content_type, ""), FileCategory::Image | FileCategory::Text)
}
