// src/analytics.rs
use crate::api::{Backend, CidAnalytics, ExportKind, RealtimeAnalytics};
use crate::library::Library;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

pub const PERIODS: [u32; 3] = [7, 30, 90];
pub const DEFAULT_PERIOD: u32 = 30;
pub const CID_DEFAULT_DAYS: u32 = 7;

/// Next dashboard period in the 7 / 30 / 90 cycle. Unknown values restart the cycle.
pub fn next_period(days: u32) -> u32 {
    match PERIODS.iter().position(|&p| p == days) {
        Some(i) => PERIODS[(i + 1) % PERIODS.len()],
        None => PERIODS[0],
    }
}

/// Per-CID analytics, refused locally for content that was not uploaded here.
pub async fn cid_analytics(backend: &dyn Backend, library: &Library, cid: &str, days: u32) -> Result<CidAnalytics> {
    if !library.is_uploaded(cid) {
        return Err(Error::Validation("Analytics only available for uploaded content".to_string()));
    }
    backend.analytics_cid(cid, days).await
}

/// Download a CSV export into `dir` and return the written path.
pub async fn export_csv(backend: &dyn Backend, kind: ExportKind, days: u32, dir: &Path) -> Result<PathBuf> {
    let csv = backend.analytics_export(kind, days).await?;
    let path = dir.join(kind.file_name(days));
    tokio::fs::write(&path, csv).await?;
    log::info!("exported {} analytics to {}", kind.as_str(), path.display());
    Ok(path)
}

/// Background task fetching realtime analytics on a fixed interval.
///
/// The first fetch happens immediately. Dropping the poller stops the task.
pub struct RealtimePoller {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RealtimePoller {
    pub fn start<M, F>(backend: Arc<dyn Backend>, period: Duration, tx: mpsc::UnboundedSender<M>, wrap: F) -> Self
    where
        M: Send + 'static,
        F: Fn(RealtimeAnalytics) -> M + Send + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        match backend.analytics_realtime().await {
                            Ok(data) => {
                                if tx.send(wrap(data)).is_err() {
                                    break;
                                }
                            }
                            Err(e) => log::warn!("realtime analytics failed: {}", e),
                        }
                    }
                }
            }
            log::debug!("realtime poller stopped");
        });
        RealtimePoller { shutdown_tx: Some(shutdown_tx), handle: Some(handle) }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.handle.take();
    }
}

impl Drop for RealtimePoller {
    fn drop(&mut self) {
        self.stop();
    }
}
