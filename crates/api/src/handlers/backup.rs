//! Admin backups: JSON snapshots of the lending tables kept in the backup
//! directory.
//!
//! File names are always generated here or checked with
//! [`is_valid_backup_name`] before they touch the filesystem.

use std::path::PathBuf;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use sborrowhub_core::backup::{backup_file_name, is_valid_backup_name};
use sborrowhub_core::error::CoreError;
use sborrowhub_db::models::backup::{Snapshot, SnapshotCounts};
use sborrowhub_db::repositories::BackupRepo;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// A backup file on disk.
#[derive(Debug, Serialize)]
pub struct BackupInfo {
    pub name: String,
    pub size_bytes: u64,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct BackupCreated {
    #[serde(flatten)]
    pub info: BackupInfo,
    pub counts: SnapshotCounts,
}

#[derive(Debug, Serialize)]
pub struct RestoreResult {
    pub name: String,
    pub restored: SnapshotCounts,
}

fn io_error(context: &str, e: std::io::Error) -> AppError {
    AppError::InternalError(format!("{context}: {e}"))
}

/// Resolve a client-supplied name to a path inside the backup directory.
fn backup_path(state: &AppState, name: &str) -> AppResult<PathBuf> {
    if !is_valid_backup_name(name) {
        return Err(AppError::BadRequest(format!("Invalid backup name '{name}'")));
    }
    Ok(state.config.backup.dir.join(name))
}

fn backup_missing(name: &str) -> AppError {
    AppError::NotFound(format!("Backup '{name}' does not exist"))
}

async fn describe(name: String, path: &std::path::Path) -> AppResult<BackupInfo> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| io_error("Failed to stat backup", e))?;
    Ok(BackupInfo {
        name,
        size_bytes: meta.len(),
        modified_at: meta.modified().ok().map(DateTime::<Utc>::from),
    })
}

async fn read_snapshot(path: &std::path::Path, name: &str) -> AppResult<Snapshot> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(backup_missing(name)),
        Err(e) => return Err(io_error("Failed to read backup", e)),
    };
    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::BadRequest(format!("Backup '{name}' is not a valid snapshot: {e}")))
}

fn backup_exists(name: &str) -> AppError {
    AppError::Core(CoreError::Conflict(format!("Backup '{name}' already exists")))
}

/// Write `body` under a hidden partial name and rename it into place once it
/// is fully synced, so a failed write never leaves a listable backup behind.
async fn write_snapshot(dir: &std::path::Path, name: &str, body: &[u8]) -> AppResult<PathBuf> {
    let path = dir.join(name);
    let partial = dir.join(format!(".{name}.partial"));

    if tokio::fs::try_exists(&path)
        .await
        .map_err(|e| io_error("Failed to check backup file", e))?
    {
        return Err(backup_exists(name));
    }

    persist(&partial, &path, body).await.map_err(|e| match e {
        PersistError::Exists => backup_exists(name),
        PersistError::Io(e) => e,
    })?;
    Ok(path)
}

enum PersistError {
    Exists,
    Io(AppError),
}

/// Create `partial`, write and sync `body`, then rename it to `path`. The
/// partial file is removed if anything after its creation fails.
async fn persist(
    partial: &std::path::Path,
    path: &std::path::Path,
    body: &[u8],
) -> Result<(), PersistError> {
    let mut file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(partial)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(PersistError::Exists);
        }
        Err(e) => return Err(PersistError::Io(io_error("Failed to create backup file", e))),
    };

    let written = async {
        file.write_all(body)
            .await
            .map_err(|e| io_error("Failed to write backup", e))?;
        file.sync_all()
            .await
            .map_err(|e| io_error("Failed to flush backup", e))?;
        drop(file);
        tokio::fs::rename(partial, path)
            .await
            .map_err(|e| io_error("Failed to move backup into place", e))
    }
    .await;

    if let Err(e) = written {
        if let Err(cleanup) = tokio::fs::remove_file(partial).await {
            tracing::warn!(path = %partial.display(), error = %cleanup, "Failed to remove partial backup");
        }
        return Err(PersistError::Io(e));
    }
    Ok(())
}

/// POST /api/v1/admin/backups
///
/// Export a consistent snapshot and write it to a new file.
pub async fn create_backup(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<(StatusCode, Json<DataResponse<BackupCreated>>)> {
    let snapshot = BackupRepo::export(&state.pool).await?;
    let name = backup_file_name(snapshot.created_at);

    tokio::fs::create_dir_all(&state.config.backup.dir)
        .await
        .map_err(|e| io_error("Failed to create backup directory", e))?;

    let body = serde_json::to_vec_pretty(&snapshot)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize snapshot: {e}")))?;

    let path = write_snapshot(&state.config.backup.dir, &name, &body).await?;

    let counts = snapshot.counts();
    tracing::info!(backup = %name, ?counts, admin_id = admin.user_id, "Backup created");

    let info = describe(name, &path).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: BackupCreated { info, counts },
        }),
    ))
}

/// GET /api/v1/admin/backups
///
/// Newest first. A missing directory means no backups yet.
pub async fn list_backups(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<BackupInfo>>>> {
    let mut entries = match tokio::fs::read_dir(&state.config.backup.dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Json(DataResponse { data: Vec::new() }));
        }
        Err(e) => return Err(io_error("Failed to read backup directory", e)),
    };

    let mut backups = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| io_error("Failed to read backup directory", e))?
    {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if !is_valid_backup_name(&name) {
            continue;
        }
        backups.push(describe(name, &entry.path()).await?);
    }
    // Names embed the timestamp, so lexical order is chronological.
    backups.sort_by(|a, b| b.name.cmp(&a.name));

    Ok(Json(DataResponse { data: backups }))
}

/// GET /api/v1/admin/backups/{name}
///
/// The snapshot itself.
pub async fn get_backup(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(name): Path<String>,
) -> AppResult<Json<DataResponse<Snapshot>>> {
    let path = backup_path(&state, &name)?;
    let snapshot = read_snapshot(&path, &name).await?;
    Ok(Json(DataResponse { data: snapshot }))
}

/// DELETE /api/v1/admin/backups/{name}
pub async fn delete_backup(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(name): Path<String>,
) -> AppResult<StatusCode> {
    let path = backup_path(&state, &name)?;
    match tokio::fs::remove_file(&path).await {
        Ok(()) => {
            tracing::info!(backup = %name, admin_id = admin.user_id, "Backup deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(backup_missing(&name)),
        Err(e) => Err(io_error("Failed to delete backup", e)),
    }
}

/// POST /api/v1/admin/backups/{name}/restore
///
/// Replace all lending data with the snapshot, atomically.
pub async fn restore_backup(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(name): Path<String>,
) -> AppResult<Json<DataResponse<RestoreResult>>> {
    let path = backup_path(&state, &name)?;
    let snapshot = read_snapshot(&path, &name).await?;
    let restored = BackupRepo::restore(&state.pool, &snapshot).await?;

    tracing::warn!(backup = %name, ?restored, admin_id = admin.user_id, "Backup restored");
    Ok(Json(DataResponse {
        data: RestoreResult { name, restored },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn snapshot_is_moved_into_place_without_leftovers() {
        let dir = tempfile::TempDir::new().unwrap();
        let name = "backup-20260101T000000000Z.json";

        let path = write_snapshot(dir.path(), name, b"{}").await.unwrap();

        assert_eq!(path, dir.path().join(name));
        assert_eq!(std::fs::read(&path).unwrap(), b"{}");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn existing_backup_is_not_overwritten() {
        let dir = tempfile::TempDir::new().unwrap();
        let name = "backup-20260101T000000000Z.json";
        std::fs::write(dir.path().join(name), b"original").unwrap();

        let err = write_snapshot(dir.path(), name, b"{}").await.unwrap_err();

        assert!(matches!(err, AppError::Core(CoreError::Conflict(_))));
        assert_eq!(std::fs::read(dir.path().join(name)).unwrap(), b"original");
    }

    #[tokio::test]
    async fn failed_rename_removes_partial_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let partial = dir.path().join(".backup-20260101T000000000Z.json.partial");
        // A non-empty directory at the target makes the rename fail after the data is written.
        let target = dir.path().join("backup-20260101T000000000Z.json");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), b"x").unwrap();

        let result = persist(&partial, &target, b"{}").await;

        assert!(matches!(result, Err(PersistError::Io(_))));
        assert!(!partial.exists());
        assert!(target.is_dir());
    }

    #[test]
    fn partial_files_are_not_backup_names() {
        assert!(!is_valid_backup_name(".backup-20260101T000000000Z.json.partial"));
    }
}
