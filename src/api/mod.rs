// src/api/mod.rs
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use types::*;

use crate::cid::encode_query;
use crate::config::{Config, Visibility};
use crate::listing::{normalize_listing, DirectoryEntry};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::path::Path;
use walkdir::WalkDir;

/// Everything the browser needs from the gateway backend.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn metadata(&self, cid: &str) -> Result<Metadata>;
    async fn list(&self, cid: &str) -> Result<Vec<DirectoryEntry>>;
    async fn content_text(&self, cid: &str) -> Result<String>;
    async fn content_bytes(&self, cid: &str) -> Result<Vec<u8>>;
    async fn download(&self, cid: &str, filename: &str) -> Result<Vec<u8>>;

    async fn history(&self) -> Result<Vec<HistoryItem>>;
    async fn save_history(&self, cid: &str) -> Result<()>;
    async fn delete_history(&self, cid: &str) -> Result<()>;

    async fn bookmarks(&self) -> Result<Vec<Bookmark>>;
    async fn add_bookmark(&self, bookmark: &NewBookmark) -> Result<()>;
    async fn delete_bookmark(&self, cid: &str) -> Result<()>;

    async fn uploads(&self) -> Result<Vec<Upload>>;
    async fn record_upload(&self, upload: &NewUpload) -> Result<()>;
    async fn delete_upload(&self, cid: &str) -> Result<()>;
    async fn upload_file(&self, path: &Path, visibility: Visibility) -> Result<UploadResult>;
    async fn upload_folder(&self, root: &Path, visibility: Visibility) -> Result<FolderUploadResult>;

    async fn groups(&self) -> Result<Vec<Group>>;
    async fn group(&self, id: i64) -> Result<Group>;
    async fn create_group(&self, name: &str) -> Result<CreatedGroup>;
    async fn rename_group(&self, id: i64, name: &str) -> Result<RenamedGroup>;
    async fn delete_group(&self, id: i64) -> Result<()>;
    async fn add_to_group(&self, id: i64, cid: &str) -> Result<()>;
    async fn remove_from_group(&self, id: i64, cid: &str) -> Result<()>;

    async fn analytics_dashboard(&self, days: u32) -> Result<AnalyticsDashboard>;
    async fn analytics_realtime(&self) -> Result<RealtimeAnalytics>;
    async fn analytics_cid(&self, cid: &str, days: u32) -> Result<CidAnalytics>;
    async fn analytics_export(&self, kind: ExportKind, days: u32) -> Result<String>;

    async fn trending(&self) -> Result<Vec<TrendingItem>>;
}

pub struct ApiClient {
    base: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("cidtui/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(ApiClient { base: config.api_base().to_string(), client })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Direct link for downloading `cid` under `filename`.
    pub fn download_url(&self, cid: &str, filename: &str) -> String {
        self.url(&download_path(cid, filename))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        log::debug!("GET {}", path);
        let res = self.client.get(self.url(path)).send().await?;
        read_json(res).await
    }

    async fn send_json<T: DeserializeOwned>(&self, method: reqwest::Method, path: &str, body: &Value) -> Result<T> {
        log::debug!("{} {}", method, path);
        let res = self.client.request(method, self.url(path)).json(body).send().await?;
        read_json(res).await
    }

    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        log::debug!("GET {}", path);
        let res = self.client.get(self.url(path)).send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(error_from_body(status.as_u16(), &body));
        }
        Ok(res.bytes().await?.to_vec())
    }
}

fn download_path(cid: &str, filename: &str) -> String {
    format!("/content?cid={}&filename={}", encode_query(cid), encode_query(filename))
}

/// Decode a JSON body, mapping an `error` field or non-2xx status to an error.
async fn read_json<T: DeserializeOwned>(res: reqwest::Response) -> Result<T> {
    let status = res.status();
    let body = res.text().await?;
    let value = parse_body(status.as_u16(), &body)?;
    Ok(serde_json::from_value(value)?)
}

pub(crate) fn parse_body(status: u16, body: &str) -> Result<Value> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if !(200..300).contains(&status) => return Err(Error::Status(status)),
        Err(e) => return Err(e.into()),
    };
    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Err(Error::Api(message.to_string()));
    }
    if !(200..300).contains(&status) {
        return Err(Error::Status(status));
    }
    Ok(value)
}

fn error_from_body(status: u16, body: &str) -> Error {
    match parse_body(status, body) {
        Err(e) => e,
        Ok(_) => Error::Status(status),
    }
}

pub(crate) fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path).first_or_octet_stream().essence_str().to_string()
}

#[async_trait]
impl Backend for ApiClient {
    async fn metadata(&self, cid: &str) -> Result<Metadata> {
        self.get_json(&format!("/metadata?cid={}", encode_query(cid))).await
    }

    async fn list(&self, cid: &str) -> Result<Vec<DirectoryEntry>> {
        let body: Value = self.get_json(&format!("/ls?cid={}", encode_query(cid))).await?;
        Ok(normalize_listing(&body, cid))
    }

    async fn content_text(&self, cid: &str) -> Result<String> {
        let bytes = self.content_bytes(cid).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn content_bytes(&self, cid: &str) -> Result<Vec<u8>> {
        self.get_bytes(&format!("/content?cid={}", encode_query(cid))).await
    }

    async fn download(&self, cid: &str, filename: &str) -> Result<Vec<u8>> {
        self.get_bytes(&download_path(cid, filename)).await
    }

    async fn history(&self) -> Result<Vec<HistoryItem>> {
        self.get_json("/history").await
    }

    async fn save_history(&self, cid: &str) -> Result<()> {
        let _: Value = self.send_json(reqwest::Method::POST, "/history", &json!({ "cid": cid })).await?;
        Ok(())
    }

    async fn delete_history(&self, cid: &str) -> Result<()> {
        let _: Value = self.send_json(reqwest::Method::DELETE, "/history", &json!({ "cid": cid })).await?;
        Ok(())
    }

    async fn bookmarks(&self) -> Result<Vec<Bookmark>> {
        self.get_json("/bookmarks").await
    }

    async fn add_bookmark(&self, bookmark: &NewBookmark) -> Result<()> {
        let body = serde_json::to_value(bookmark)?;
        let _: Value = self.send_json(reqwest::Method::POST, "/bookmarks", &body).await?;
        Ok(())
    }

    async fn delete_bookmark(&self, cid: &str) -> Result<()> {
        let _: Value = self.send_json(reqwest::Method::DELETE, "/bookmarks", &json!({ "cid": cid })).await?;
        Ok(())
    }

    async fn uploads(&self) -> Result<Vec<Upload>> {
        self.get_json("/uploads").await
    }

    async fn record_upload(&self, upload: &NewUpload) -> Result<()> {
        let body = serde_json::to_value(upload)?;
        let _: Value = self.send_json(reqwest::Method::POST, "/uploads", &body).await?;
        Ok(())
    }

    async fn delete_upload(&self, cid: &str) -> Result<()> {
        let _: Value = self.send_json(reqwest::Method::DELETE, "/uploads", &json!({ "cid": cid })).await?;
        Ok(())
    }

    async fn upload_file(&self, path: &Path, visibility: Visibility) -> Result<UploadResult> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let part = Part::bytes(bytes).file_name(name).mime_str(&guess_mime(path))?;
        let form = Form::new().part("file", part).text("visibility", visibility.as_str());

        log::info!("uploading {} ({})", path.display(), visibility.as_str());
        let res = self.client.post(self.url("/upload")).multipart(form).send().await?;
        read_json(res).await
    }

    async fn upload_folder(&self, root: &Path, visibility: Visibility) -> Result<FolderUploadResult> {
        let folder_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "folder".to_string());

        let mut form = Form::new();
        let mut index = 0;
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let relative = format!("{}/{}", folder_name, relative.to_string_lossy().replace('\\', "/"));
            let bytes = tokio::fs::read(entry.path()).await?;
            let part = Part::bytes(bytes)
                .file_name(relative.clone())
                .mime_str(&guess_mime(entry.path()))?;
            form = form.part("files", part).text(format!("paths_{}", index), relative);
            index += 1;
        }
        if index == 0 {
            return Err(Error::Validation("No files selected".to_string()));
        }
        let form = form.text("visibility", visibility.as_str()).text("type", "folder");

        log::info!("uploading folder {} with {} files", root.display(), index);
        let res = self.client.post(self.url("/upload-folder")).multipart(form).send().await?;
        read_json(res).await
    }

    async fn groups(&self) -> Result<Vec<Group>> {
        self.get_json("/groups").await
    }

    async fn group(&self, id: i64) -> Result<Group> {
        self.get_json(&format!("/groups/{}", id)).await
    }

    async fn create_group(&self, name: &str) -> Result<CreatedGroup> {
        self.send_json(reqwest::Method::POST, "/groups", &json!({ "name": name })).await
    }

    async fn rename_group(&self, id: i64, name: &str) -> Result<RenamedGroup> {
        self.send_json(reqwest::Method::PUT, &format!("/groups/{}/rename", id), &json!({ "name": name }))
            .await
    }

    async fn delete_group(&self, id: i64) -> Result<()> {
        log::debug!("DELETE /groups/{}", id);
        let res = self.client.delete(self.url(&format!("/groups/{}", id))).send().await?;
        let _: Value = read_json(res).await?;
        Ok(())
    }

    async fn add_to_group(&self, id: i64, cid: &str) -> Result<()> {
        let _: Value = self
            .send_json(reqwest::Method::POST, &format!("/groups/{}/add", id), &json!({ "cid": cid }))
            .await?;
        Ok(())
    }

    async fn remove_from_group(&self, id: i64, cid: &str) -> Result<()> {
        let _: Value = self
            .send_json(reqwest::Method::POST, &format!("/groups/{}/remove", id), &json!({ "cid": cid }))
            .await?;
        Ok(())
    }

    async fn analytics_dashboard(&self, days: u32) -> Result<AnalyticsDashboard> {
        self.get_json(&format!("/analytics/dashboard?days={}", days)).await
    }

    async fn analytics_realtime(&self) -> Result<RealtimeAnalytics> {
        self.get_json("/analytics/realtime").await
    }

    async fn analytics_cid(&self, cid: &str, days: u32) -> Result<CidAnalytics> {
        self.get_json(&format!("/analytics/cid/{}?days={}", encode_query(cid), days)).await
    }

    async fn analytics_export(&self, kind: ExportKind, days: u32) -> Result<String> {
        let bytes = self
            .get_bytes(&format!("/analytics/export?type={}&days={}", kind.as_str(), days))
            .await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn trending(&self) -> Result<Vec<TrendingItem>> {
        self.get_json("/trending").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_body_error_field() {
        let err = parse_body(409, r#"{"error": "Group name already exists"}"#).unwrap_err();
        assert!(matches!(err, Error::Api(ref m) if m == "Group name already exists"));
        // an error field wins even on 200
        assert!(matches!(parse_body(200, r#"{"error": "Missing CID"}"#), Err(Error::Api(_))));
    }

    #[test]
    fn test_parse_body_status_without_json() {
        assert!(matches!(parse_body(502, "<html>Bad gateway</html>"), Err(Error::Status(502))));
        assert!(matches!(parse_body(404, r#"{"message": "gone"}"#), Err(Error::Status(404))));
    }

    #[test]
    fn test_parse_body_success() {
        let value = parse_body(200, r#"[{"cid": "QmA"}]"#).unwrap();
        assert!(value.is_array());
        assert!(matches!(parse_body(200, "not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_download_url_encodes_parameters() {
        let client = ApiClient::new(&Config { api_base: "http://gw.test/".to_string(), ..Config::default() }).unwrap();
        assert_eq!(client.base(), "http://gw.test");
        assert_eq!(
            client.download_url("QmA/b c", "my file.txt"),
            "http://gw.test/content?cid=QmA%2Fb%20c&filename=my%20file.txt"
        );
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("a.png")), "image/png");
        assert_eq!(guess_mime(Path::new("a.unknownext")), "application/octet-stream");
    }
}
