use crate::core::decompression::Extractor;
use crate::core::library::Library;
use crate::core::mod_manager::{self, InstallRequest};
use crate::core::updates::{self, Catalog};
use crate::models::error::SError;
use crate::models::mod_dto::{RemoteFile, SourceMetadata};
use crate::models::task_status::TaskStatus;
use crate::utils::file::FileUtils;
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Byte-stream download collaborator. `progress` receives whole percentages.
pub trait Downloader: Send + Sync {
    fn fetch(
        &self,
        url: &str,
        destination: &Utf8Path,
        timeout: Duration,
        progress: &mut dyn FnMut(u8),
    ) -> Result<(), SError>;
}

#[derive(Clone, Debug)]
pub struct DownloadJob {
    /// Shown in progress events; also the fallback mod name.
    pub label: String,
    pub file: RemoteFile,
    pub metadata: Option<SourceMetadata>,
}

fn send(tx: &UnboundedSender<TaskStatus>, status: TaskStatus) {
    if tx.send(status).is_err() {
        debug!("status receiver dropped");
    }
}

/// Downloads on the blocking pool and reports back through `tx`. Never touches library state.
pub fn spawn_download(
    downloader: Arc<dyn Downloader>,
    downloads_dir: Utf8PathBuf,
    job: DownloadJob,
    tx: UnboundedSender<TaskStatus>,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let file_name = Utf8Path::new(&job.file.filename)
            .file_name()
            .filter(|n| !n.is_empty())
            .unwrap_or("download.zip")
            .to_string();
        let destination = downloads_dir.join(file_name);

        let mut last = None;
        let mut progress = |percent: u8| {
            let percent = percent.min(100);
            if last != Some(percent) {
                last = Some(percent);
                send(
                    &tx,
                    TaskStatus::DownloadProgress {
                        label: job.label.clone(),
                        percent,
                    },
                );
            }
        };

        let fetched = std::fs::create_dir_all(&downloads_dir)
            .map_err(SError::from)
            .and_then(|_| {
                downloader.fetch(
                    &job.file.download_url,
                    &destination,
                    DOWNLOAD_TIMEOUT,
                    &mut progress,
                )
            });

        match fetched {
            Ok(()) => {
                info!("downloaded {} to {destination}", job.label);
                send(
                    &tx,
                    TaskStatus::DownloadFinished {
                        label: job.label,
                        path: destination,
                        metadata: job.metadata,
                    },
                );
            }
            Err(e) => {
                error!("download of {} failed: {e}", job.label);
                if let Err(ce) = FileUtils::remove_path(&destination) {
                    warn!("could not remove partial download {destination}: {ce}");
                }
                send(
                    &tx,
                    TaskStatus::DownloadFailed {
                        label: job.label,
                        message: e.to_string(),
                    },
                );
            }
        }
    })
}

/// Runs the catalog lookups on the blocking pool and posts one `UpdatesChecked`.
pub fn spawn_update_check(
    catalog: Arc<dyn Catalog>,
    tracked: Vec<(String, SourceMetadata)>,
    tx: UnboundedSender<TaskStatus>,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let checks = updates::collect_updates(catalog.as_ref(), &tracked);
        send(&tx, TaskStatus::UpdatesChecked(checks));
    })
}

/// Applies a background result on the coordinating side.
/// Returns the installed mod's folder name for finished downloads.
pub fn handle_event(
    lib: &mut Library,
    extractor: &dyn Extractor,
    event: TaskStatus,
) -> Result<Option<String>, SError> {
    match event {
        TaskStatus::UpdatesChecked(checks) => {
            updates::apply_update_checks(lib, &checks)?;
            Ok(None)
        }
        TaskStatus::DownloadFinished {
            label,
            path,
            metadata,
        } => {
            let replaces_update = metadata.as_ref().is_some_and(|m| is_pending_update(lib, m));
            let installed = match metadata {
                Some(latest) if replaces_update => {
                    updates::finish_update(lib, extractor, &path, &label, latest)?
                }
                metadata => mod_manager::install_from_archive(
                    lib,
                    extractor,
                    InstallRequest {
                        archive: path,
                        suggested_name: label,
                        is_downloaded_temp: true,
                        source_metadata: metadata,
                        image: None,
                        replace_existing: false,
                    },
                )?,
            };
            Ok(Some(installed))
        }
        TaskStatus::DownloadFailed { label, message } => {
            warn!("download '{label}' failed: {message}");
            Ok(None)
        }
        _ => Ok(None),
    }
}

fn is_pending_update(lib: &Library, incoming: &SourceMetadata) -> bool {
    incoming.id.is_some()
        && lib.state.mods.values().any(|r| {
            r.source_metadata
                .as_ref()
                .is_some_and(|m| m.update_available && m.id == incoming.id)
        })
}

/// Handles every event already queued, without waiting. Errors are logged and returned.
pub fn drain_pending(
    lib: &mut Library,
    extractor: &dyn Extractor,
    rx: &mut UnboundedReceiver<TaskStatus>,
) -> Vec<Result<Option<String>, SError>> {
    let mut results = Vec::new();
    while let Ok(event) = rx.try_recv() {
        let result = handle_event(lib, extractor, event);
        if let Err(e) = &result {
            error!("background result could not be applied: {e}");
        }
        results.push(result);
    }
    results
}
