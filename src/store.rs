//! Persistence of reports and uploaded images.
//!
//! [`PersistenceStore`] is the contract a frontend saves through. [`FsReportStore`] implements it on
//! a local directory:
//!
//! ```text
//! <root>/reports/<uuid>.json     one StoredReport per file
//! <root>/images/<sha256>.<ext>   content addressed uploads
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::model::{ImageRef, ReportData};
use crate::render::assets::sniff_media_type;

/// Errors raised by a [`PersistenceStore`].
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed report record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("report {0} not found")]
    NotFound(Uuid),

    #[error("invalid file extension {0:?}, expected 1 to 8 ASCII letters or digits")]
    InvalidExtension(String),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// A persisted report together with its bookkeeping fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub brand_name: String,
    pub data: ReportData,
}

/// Listing entry without the report body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub id: Uuid,
    pub title: String,
    pub brand_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&StoredReport> for ReportSummary {
    fn from(stored: &StoredReport) -> Self {
        Self {
            id: stored.id,
            title: stored.title.clone(),
            brand_name: stored.brand_name.clone(),
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }
}

/// Storage backend for reports and their images.
pub trait PersistenceStore {
    fn create(&self, report: &ReportData) -> Result<StoredReport, StoreError>;

    fn update(&self, id: Uuid, report: &ReportData) -> Result<StoredReport, StoreError>;

    /// Lists stored reports, newest first.
    fn list(&self) -> Result<Vec<ReportSummary>, StoreError>;

    fn get(&self, id: Uuid) -> Result<StoredReport, StoreError>;

    /// Deletes a report. Returns `false` when it did not exist.
    fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Stores binary content and returns a URL that resolves to it.
    fn upload_binary(&self, bytes: &[u8], extension: &str) -> Result<String, StoreError>;
}

/// Directory-backed [`PersistenceStore`].
#[derive(Clone, Debug)]
pub struct FsReportStore {
    root: PathBuf,
}

impl FsReportStore {
    /// Opens (and creates if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self { root: root.into() };
        for dir in [store.reports_dir(), store.images_dir()] {
            fs::create_dir_all(&dir).map_err(io_error(&dir))?;
        }
        Ok(store)
    }

    /// Directory the store was opened on.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn reports_dir(&self) -> PathBuf {
        self.root.join("reports")
    }

    fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    fn record_path(&self, id: Uuid) -> PathBuf {
        self.reports_dir().join(format!("{id}.json"))
    }

    fn write_record(&self, stored: &StoredReport) -> Result<(), StoreError> {
        let path = self.record_path(stored.id);
        let json = serde_json::to_vec_pretty(stored)?;
        fs::write(&path, json).map_err(io_error(&path))?;
        info!("saved report {} to {}", stored.id, path.display());
        Ok(())
    }

    fn read_record(path: &Path) -> Result<StoredReport, StoreError> {
        let bytes = fs::read(path).map_err(io_error(path))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn record_title(report: &ReportData) -> String {
    let title = report.report_title.trim();
    if title.is_empty() {
        report.brand_name.clone()
    } else {
        title.to_owned()
    }
}

impl PersistenceStore for FsReportStore {
    fn create(&self, report: &ReportData) -> Result<StoredReport, StoreError> {
        let now = Utc::now();
        let stored = StoredReport {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            title: record_title(report),
            brand_name: report.brand_name.clone(),
            data: report.clone(),
        };
        self.write_record(&stored)?;
        Ok(stored)
    }

    fn update(&self, id: Uuid, report: &ReportData) -> Result<StoredReport, StoreError> {
        let mut stored = self.get(id)?;
        stored.updated_at = Utc::now();
        stored.title = record_title(report);
        stored.brand_name = report.brand_name.clone();
        stored.data = report.clone();
        self.write_record(&stored)?;
        Ok(stored)
    }

    fn list(&self) -> Result<Vec<ReportSummary>, StoreError> {
        let dir = self.reports_dir();
        let mut summaries = Vec::new();
        for entry in fs::read_dir(&dir).map_err(io_error(&dir))? {
            let path = entry.map_err(io_error(&dir))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match Self::read_record(&path) {
                Ok(stored) => summaries.push(ReportSummary::from(&stored)),
                Err(err) => warn!("skipping unreadable record {}: {err}", path.display()),
            }
        }
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    fn get(&self, id: Uuid) -> Result<StoredReport, StoreError> {
        let path = self.record_path(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(StoreError::NotFound(id)),
            Err(err) => return Err(io_error(&path)(err)),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let path = self.record_path(id);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("deleted report {id}");
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(io_error(&path)(err)),
        }
    }

    fn upload_binary(&self, bytes: &[u8], extension: &str) -> Result<String, StoreError> {
        let digest = Sha256::digest(bytes);
        let name: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
        let extension = checked_extension(extension)?;
        let path = self.images_dir().join(format!("{name}.{extension}"));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => file.write_all(bytes).map_err(io_error(&path))?,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                debug!("image {} already stored", path.display());
            }
            Err(err) => return Err(io_error(&path)(err)),
        }
        let absolute = fs::canonicalize(&path).map_err(io_error(&path))?;
        Ok(format!("file://{}", absolute.display()))
    }
}

/// Extensions become part of a file name inside `images/`, so only short alphanumeric ones pass.
fn checked_extension(extension: &str) -> Result<&str, StoreError> {
    let trimmed = extension.strip_prefix('.').unwrap_or(extension);
    let valid = (1..=8).contains(&trimmed.len())
        && trimmed.bytes().all(|byte| byte.is_ascii_alphanumeric());
    if valid {
        Ok(trimmed)
    } else {
        Err(StoreError::InvalidExtension(extension.to_owned()))
    }
}

/// File extension for an upload, taken from its media type or sniffed from the bytes.
fn upload_extension(bytes: &[u8], media_type: Option<&str>) -> &'static str {
    let media_type = media_type.unwrap_or_else(|| sniff_media_type(bytes));
    match media_type {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        _ => "bin",
    }
}

/// Uploads every pending image of `report` and swaps it for the returned URL.
///
/// Returns the number of uploaded images. On error the images converted so far stay converted.
pub fn prepare_for_persistence<S>(report: &mut ReportData, store: &S) -> Result<usize, StoreError>
where
    S: PersistenceStore + ?Sized,
{
    let mut uploaded = 0;
    for image in report.images_mut() {
        if let ImageRef::Pending { bytes, media_type } = image {
            let extension = upload_extension(bytes, media_type.as_deref());
            let url = store.upload_binary(bytes, extension)?;
            *image = ImageRef::Resolved(url);
            uploaded += 1;
        }
    }
    if uploaded > 0 {
        info!("uploaded {uploaded} pending images");
    }
    Ok(uploaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TempDir(PathBuf);

    impl TempDir {
        fn new() -> Self {
            Self(std::env::temp_dir().join(format!("report-store-{}", Uuid::new_v4())))
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn create_get_update_delete() {
        let dir = TempDir::new();
        let store = FsReportStore::open(&dir.0).expect("open store");

        let mut report = ReportData::new("Acme");
        let stored = store.create(&report).expect("create");
        assert_eq!(stored.title, "RP REPORT");
        assert_eq!(store.get(stored.id).expect("get").data, report);

        report.brand_name = "Acme Corp".to_owned();
        let updated = store.update(stored.id, &report).expect("update");
        assert_eq!(updated.created_at, stored.created_at);
        assert_eq!(updated.brand_name, "Acme Corp");

        assert!(store.delete(stored.id).expect("delete"));
        assert!(!store.delete(stored.id).expect("second delete"));
        assert!(matches!(store.get(stored.id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn list_is_newest_first() {
        let dir = TempDir::new();
        let store = FsReportStore::open(&dir.0).expect("open store");
        let first = store.create(&ReportData::new("First")).expect("first");
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = store.create(&ReportData::new("Second")).expect("second");

        let ids: Vec<_> = store.list().expect("list").iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn uploads_are_content_addressed() {
        let dir = TempDir::new();
        let store = FsReportStore::open(&dir.0).expect("open store");
        let a = store.upload_binary(b"same bytes", "png").expect("upload");
        let b = store.upload_binary(b"same bytes", ".png").expect("upload again");
        assert_eq!(a, b);
        assert!(a.starts_with("file://"));
        assert!(a.ends_with(".png"));
    }

    #[test]
    fn upload_rejects_path_like_extensions() {
        let dir = TempDir::new();
        let store = FsReportStore::open(&dir.0).expect("open store");
        for extension in ["../../x", "", "png/", "a.b", "toolongext", "p\\ng"] {
            assert!(
                matches!(
                    store.upload_binary(b"bytes", extension),
                    Err(StoreError::InvalidExtension(_))
                ),
                "accepted {extension:?}"
            );
        }
        assert_eq!(fs::read_dir(dir.0.join("images")).expect("images").count(), 0);
        assert!(!dir.0.join("x").exists());
    }

    #[test]
    fn get_separates_missing_from_unreadable() {
        let dir = TempDir::new();
        let store = FsReportStore::open(&dir.0).expect("open store");
        let id = Uuid::new_v4();
        assert!(matches!(store.get(id), Err(StoreError::NotFound(missing)) if missing == id));

        fs::create_dir(store.record_path(id)).expect("directory in place of a record");
        assert!(matches!(store.get(id), Err(StoreError::Io { .. })));
    }

    #[test]
    fn pending_images_become_urls() {
        let dir = TempDir::new();
        let store = FsReportStore::open(&dir.0).expect("open store");
        let mut report = ReportData::new("Acme");
        report.add_attachment(ImageRef::Pending {
            bytes: vec![1, 2, 3],
            media_type: Some("image/jpeg".to_owned()),
        });
        report.add_attachment(ImageRef::resolved("file:///already/there.png"));

        let uploaded = prepare_for_persistence(&mut report, &store).expect("prepare");
        assert_eq!(uploaded, 1);
        assert!(report.images().all(|image| !image.is_pending()));
        match &report.lampiran_images[0] {
            ImageRef::Resolved(url) => assert!(url.ends_with(".jpg")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
