// src/upload.rs
use crate::api::{guess_mime, Backend, NewUpload};
use crate::config::Visibility;
use crate::Result;
use chrono::Utc;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub cid: String,
    pub name: String,
    pub size: u64,
    /// CIDs of individual files when a folder was uploaded.
    pub files: Vec<(String, String)>,
}

/// Upload a file or a whole directory, then record it in history and uploads.
pub async fn upload_path(backend: &dyn Backend, path: &Path, visibility: Visibility) -> Result<UploadSummary> {
    let metadata = tokio::fs::metadata(path).await?;
    if metadata.is_dir() {
        upload_folder(backend, path, visibility).await
    } else {
        upload_file(backend, path, metadata.len(), visibility).await
    }
}

async fn upload_file(backend: &dyn Backend, path: &Path, size: u64, visibility: Visibility) -> Result<UploadSummary> {
    let result = backend.upload_file(path, visibility).await?;
    if result.cid.trim().is_empty() {
        return Err(crate::Error::Api("No CID returned".to_string()));
    }
    let name = file_name(path);
    let file_type = guess_mime(path);
    record(backend, &result.cid, &name, size, &file_type, visibility).await;
    log::info!("uploaded {} as {}", name, result.cid);
    Ok(UploadSummary { cid: result.cid, name, size, files: Vec::new() })
}

async fn upload_folder(backend: &dyn Backend, root: &Path, visibility: Visibility) -> Result<UploadSummary> {
    let result = backend.upload_folder(root, visibility).await?;
    let folder_cid = match result.folder_cid.filter(|_| result.success) {
        Some(cid) => cid,
        None => return Err(crate::Error::Api("Folder upload failed".to_string())),
    };
    let name = result.folder_name.unwrap_or_else(|| file_name(root));
    record(backend, &folder_cid, &name, result.total_size, "folder", visibility).await;

    let mut files = Vec::new();
    for file in result.files {
        if let Some(cid) = file.cid {
            record(backend, &cid, &file.path, file.size, &file.content_type, visibility).await;
            files.push((file.path, cid));
        }
    }
    log::info!("uploaded folder {} as {} ({} files)", name, folder_cid, files.len());
    Ok(UploadSummary { cid: folder_cid, name, size: result.total_size, files })
}

/// Bookkeeping after an upload. Failures are logged, the upload itself already succeeded.
async fn record(backend: &dyn Backend, cid: &str, name: &str, size: u64, file_type: &str, visibility: Visibility) {
    if let Err(e) = backend.save_history(cid).await {
        log::warn!("failed to save {} to history: {}", cid, e);
    }
    let upload = NewUpload {
        cid: cid.to_string(),
        file_name: name.to_string(),
        file_size: size,
        file_type: file_type.to_string(),
        visibility: visibility.as_str().to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    if let Err(e) = backend.record_upload(&upload).await {
        log::warn!("failed to save upload {}: {}", cid, e);
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
