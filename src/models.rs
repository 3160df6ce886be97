//! Data models for Quark drive API payloads and transfer records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Share id, passcode and folder parsed from a share link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareReference {
    pub share_id: String,
    pub passcode: String,
    pub parent_folder_id: String,
}

/// Common wrapper around every API response.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Whether the API reported success. Responses without a status count as successful.
    pub fn is_success(&self) -> bool {
        self.status.map_or(true, |s| s == 200)
    }
}

#[derive(Debug, Deserialize)]
pub struct StokenData {
    pub stoken: String,
}

/// An entry of a shared listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareItem {
    #[serde(rename = "file_name")]
    pub title: String,
    #[serde(default)]
    pub file_type: i64,
    pub fid: String,
    #[serde(default)]
    pub pdir_fid: String,
    #[serde(default)]
    pub share_fid_token: String,
}

impl ShareItem {
    pub fn is_folder(&self) -> bool {
        self.file_type == 0
    }
}

/// A paginated listing, used by share detail, file sort and search.
#[derive(Debug, Deserialize)]
pub struct ListData<T> {
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
}

/// A file or folder in the caller's own drive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileItem {
    pub fid: String,
    pub file_name: String,
    #[serde(default)]
    pub file_type: i64,
    #[serde(default)]
    pub pdir_fid: String,
    #[serde(default)]
    pub size: Option<u64>,
}

impl FileItem {
    pub fn is_folder(&self) -> bool {
        self.file_type == 0
    }
}

impl std::fmt::Display for FileItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size_str = if self.is_folder() {
            "<dir>".to_string()
        } else {
            self.size
                .map(format_size)
                .unwrap_or_else(|| "-".to_string())
        };
        write!(f, "{}\t{}\t{}", self.fid, size_str, self.file_name)
    }
}

/// Format bytes into human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[derive(Debug, Deserialize)]
pub struct TaskIdData {
    pub task_id: String,
}

/// Status code of a finished asynchronous task.
pub const TASK_DONE: i64 = 2;

/// State of an asynchronous remote task.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskData {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub save_as: Option<SaveAs>,
    #[serde(default)]
    pub share_id: Option<String>,
}

impl TaskData {
    pub fn is_done(&self) -> bool {
        self.status == TASK_DONE
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveAs {
    #[serde(default)]
    pub save_as_top_fids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ShareUrlData {
    pub share_url: String,
}

#[derive(Debug, Deserialize)]
pub struct MkdirData {
    pub fid: String,
}

/// A persisted transfer: the saved file and the share link created for it.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRecord {
    pub file_id: String,
    pub file_name: String,
    pub file_type: i64,
    pub share_link: String,
    /// Set by the database on insert.
    pub created_at: Option<NaiveDateTime>,
}

impl TransferRecord {
    pub fn new(
        file_id: impl Into<String>,
        file_name: impl Into<String>,
        file_type: i64,
        share_link: impl Into<String>,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            file_name: file_name.into(),
            file_type,
            share_link: share_link.into(),
            created_at: None,
        }
    }
}

/// Result of storing a share link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOutcome {
    /// The title was already recorded and no transfer happened.
    pub already_existed: bool,
    pub file_name: String,
    pub share_link: String,
    /// Record store error hit after the remote transfer succeeded. The
    /// transfer stands but no local record was written.
    pub store_error: Option<String>,
}

impl StoreOutcome {
    /// Whether a record for this transfer is in the store.
    pub fn persisted(&self) -> bool {
        self.store_error.is_none()
    }
}
