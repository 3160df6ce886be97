//! Quark drive web API client.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::auth::Credentials;
use crate::error::{QuarkError, Result, Stage};
use crate::models::{
    Envelope, FileItem, ListData, MkdirData, ShareItem, ShareReference, ShareUrlData, StokenData,
    TaskData, TaskIdData,
};
use crate::poll::PollPolicy;

/// Base URL for the drive PC API.
pub const PC_API_BASE: &str = "https://drive-pc.quark.cn/1/clouddrive";

/// Base URL the save endpoint is served from.
pub const SAVE_API_BASE: &str = "https://drive.quark.cn/1/clouddrive";

/// Query parameters every endpoint expects.
const CLIENT_QUERY: [(&str, &str); 3] = [("pr", "ucpro"), ("fr", "pc"), ("uc_param_str", "")];

/// Page size for listings. Only the first page is ever read.
const PAGE_SIZE: &str = "50";

/// Upper bound for a single API request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Quark drive endpoints used by transfers.
#[derive(Clone)]
pub struct QuarkClient {
    http: Client,
    pc_base: String,
    save_base: String,
}

impl QuarkClient {
    /// Create a client against the public API hosts.
    pub fn new(credentials: &Credentials) -> Result<Self> {
        Self::with_base_urls(credentials, PC_API_BASE, SAVE_API_BASE)
    }

    /// Create a client against custom API hosts.
    ///
    /// # Arguments
    /// * `pc_base` - Base URL for every endpoint except save
    /// * `save_base` - Base URL for the save endpoint
    pub fn with_base_urls(
        credentials: &Credentials,
        pc_base: impl Into<String>,
        save_base: impl Into<String>,
    ) -> Result<Self> {
        let http = Client::builder()
            .default_headers(credentials.headers()?)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| QuarkError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            pc_base: pc_base.into().trim_end_matches('/').to_string(),
            save_base: save_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Request a share token (`stoken`) for a share.
    pub async fn get_stoken(&self, share: &ShareReference) -> Result<String> {
        debug!(share_id = %share.share_id, "requesting share token");
        let request = self
            .http
            .post(format!("{}/share/sharepage/token", self.pc_base))
            .json(&json!({
                "pwd_id": share.share_id,
                "passcode": share.passcode,
            }));

        let data: StokenData = self.send(Stage::Auth, request).await?;
        Ok(data.stoken)
    }

    /// Fetch the first entry of the shared listing.
    pub async fn share_detail(&self, share: &ShareReference, stoken: &str) -> Result<ShareItem> {
        debug!(share_id = %share.share_id, pdir_fid = %share.parent_folder_id, "fetching share detail");
        let request = self
            .http
            .get(format!("{}/share/sharepage/detail", self.pc_base))
            .query(&[
                ("pwd_id", share.share_id.as_str()),
                ("stoken", stoken),
                ("pdir_fid", share.parent_folder_id.as_str()),
                ("force", "0"),
                ("_page", "1"),
                ("_size", PAGE_SIZE),
                ("_fetch_banner", "0"),
                ("_fetch_share", "0"),
                ("_fetch_total", "1"),
                ("_sort", "file_type:asc,updated_at:desc"),
            ]);

        let data: ListData<ShareItem> = self.send(Stage::Detail, request).await?;
        data.list
            .into_iter()
            .next()
            .ok_or_else(|| QuarkError::unexpected(Stage::Detail, "share listing is empty"))
    }

    /// Submit a task saving a shared item into `to_pdir_fid`. Returns the task id.
    pub async fn save(
        &self,
        share: &ShareReference,
        stoken: &str,
        item: &ShareItem,
        to_pdir_fid: &str,
    ) -> Result<String> {
        debug!(title = %item.title, to_pdir_fid, "submitting save task");
        let request = self
            .http
            .post(format!("{}/share/sharepage/save", self.save_base))
            .query(&[("__t", timestamp_millis())])
            .json(&json!({
                "fid_list": [item.fid],
                "fid_token_list": [item.share_fid_token],
                "to_pdir_fid": to_pdir_fid,
                "pwd_id": share.share_id,
                "stoken": stoken,
                "pdir_fid": "0",
                "scene": "link",
            }));

        let data: TaskIdData = self.send(Stage::Save, request).await?;
        Ok(data.task_id)
    }

    /// Query the state of an asynchronous task once.
    pub async fn task(&self, stage: Stage, task_id: &str, retry_index: u32) -> Result<TaskData> {
        let request = self
            .http
            .get(format!("{}/task", self.pc_base))
            .query(&[
                ("task_id", task_id.to_string()),
                ("retry_index", retry_index.to_string()),
                ("__t", timestamp_millis()),
            ]);

        self.send(stage, request).await
    }

    /// Poll a task until it finishes, within the limits of `policy`.
    pub async fn wait_task(&self, stage: Stage, task_id: &str, policy: &PollPolicy) -> Result<TaskData> {
        policy
            .run(stage, task_id, |attempt| self.task(stage, task_id, attempt))
            .await
    }

    /// Submit a task creating a public, non-expiring share. Returns the task id.
    pub async fn create_share(&self, fid: &str, title: &str) -> Result<String> {
        debug!(fid, title, "submitting share task");
        let request = self
            .http
            .post(format!("{}/share", self.pc_base))
            .json(&json!({
                "fid_list": [fid],
                "title": title,
                "url_type": 1,
                "expired_type": 1,
            }));

        let data: TaskIdData = self.send(Stage::Share, request).await?;
        Ok(data.task_id)
    }

    /// Get the public URL of a created share.
    pub async fn share_url(&self, share_id: &str) -> Result<String> {
        let request = self
            .http
            .post(format!("{}/share/password", self.pc_base))
            .json(&json!({ "share_id": share_id }));

        let data: ShareUrlData = self.send(Stage::Share, request).await?;
        Ok(data.share_url)
    }

    /// List the first page of a folder in the drive. The root folder is `"0"`.
    pub async fn list_dir(&self, pdir_fid: &str) -> Result<Vec<FileItem>> {
        let request = self
            .http
            .get(format!("{}/file/sort", self.pc_base))
            .query(&[
                ("pdir_fid", pdir_fid),
                ("_page", "1"),
                ("_size", PAGE_SIZE),
                ("_fetch_total", "1"),
                ("_fetch_sub_dirs", "0"),
                ("_sort", "file_type:asc,updated_at:desc"),
            ]);

        let data: ListData<FileItem> = self.send(Stage::Browse, request).await?;
        Ok(data.list)
    }

    /// Search the drive by file name.
    pub async fn search(&self, query: &str) -> Result<Vec<FileItem>> {
        let request = self
            .http
            .get(format!("{}/file/search", self.pc_base))
            .query(&[
                ("q", query),
                ("_page", "1"),
                ("_size", PAGE_SIZE),
                ("_fetch_total", "1"),
                ("_sort", "file_type:desc,updated_at:desc"),
                ("_is_hl", "1"),
            ]);

        let data: ListData<FileItem> = self.send(Stage::Browse, request).await?;
        Ok(data.list)
    }

    /// Submit a task deleting a file. Returns the task id.
    pub async fn delete(&self, fid: &str) -> Result<String> {
        debug!(fid, "submitting delete task");
        let request = self
            .http
            .post(format!("{}/file/delete", self.pc_base))
            .json(&json!({
                "action_type": 2,
                "filelist": [fid],
                "exclude_fids": [],
            }));

        let data: TaskIdData = self.send(Stage::Cleanup, request).await?;
        Ok(data.task_id)
    }

    /// Create a folder under `pdir_fid`. Returns the new folder id.
    pub async fn mkdir(&self, name: &str, pdir_fid: &str) -> Result<String> {
        let request = self
            .http
            .post(format!("{}/file", self.pc_base))
            .json(&json!({
                "pdir_fid": pdir_fid,
                "file_name": "",
                "dir_path": name,
                "dir_init_lock": false,
            }));

        let data: MkdirData = self.send(Stage::Browse, request).await?;
        Ok(data.fid)
    }

    /// Send a request and unwrap the `data` field of the response envelope.
    async fn send<T: DeserializeOwned>(&self, stage: Stage, request: RequestBuilder) -> Result<T> {
        let response = request
            .query(&CLIENT_QUERY)
            .send()
            .await
            .map_err(|e| QuarkError::http(stage, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| QuarkError::http(stage, e))?;

        let envelope: Envelope<Value> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(QuarkError::Api {
                    stage,
                    status: i64::from(status.as_u16()),
                    message: body,
                });
            }
            Err(e) => {
                return Err(QuarkError::unexpected(
                    stage,
                    format!("invalid response body: {}", e),
                ));
            }
        };

        if !status.is_success() || !envelope.is_success() {
            return Err(QuarkError::Api {
                stage,
                status: envelope
                    .status
                    .unwrap_or_else(|| i64::from(status.as_u16())),
                message: envelope.message.unwrap_or(body),
            });
        }

        let data = envelope
            .data
            .filter(|data| !data.is_null())
            .ok_or_else(|| QuarkError::unexpected(stage, "response has no data"))?;
        serde_json::from_value(data)
            .map_err(|e| QuarkError::unexpected(stage, format!("unexpected data: {}", e)))
    }
}

fn timestamp_millis() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}
