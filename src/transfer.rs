//! Transfer of shared files into the drive, with dedupe by title.

use tracing::{info, warn};

use crate::ad_filter::AdFilter;
use crate::client::QuarkClient;
use crate::config::Config;
use crate::error::{QuarkError, Result, Stage};
use crate::models::{StoreOutcome, TransferRecord};
use crate::poll::PollPolicy;
use crate::store::RecordStore;
use crate::url_parser::{parse_share_url, ROOT_FOLDER_ID};

/// Saves shared files into the drive and re-shares them.
///
/// Every title is transferred at most once: later requests for a recorded
/// title return the stored link after the token and detail calls.
pub struct Quark {
    client: QuarkClient,
    records: RecordStore,
    ad_filter: AdFilter,
    save_dir: Option<String>,
    poll: PollPolicy,
}

impl Quark {
    /// Create a transfer service saving into the drive root, without ad cleanup.
    pub fn new(client: QuarkClient, records: RecordStore) -> Self {
        Self {
            client,
            records,
            ad_filter: AdFilter::default(),
            save_dir: None,
            poll: PollPolicy::default(),
        }
    }

    /// Build a transfer service from configuration, opening the record database.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = QuarkClient::new(&config.credentials()?)?;
        let records = RecordStore::open(&config.db_path)?;
        Ok(Self::new(client, records)
            .with_ad_filter(AdFilter::new(&config.ad_keywords))
            .with_save_dir(config.save_dir().map(str::to_string))
            .with_poll_policy(config.poll_policy()))
    }

    pub fn with_ad_filter(mut self, ad_filter: AdFilter) -> Self {
        self.ad_filter = ad_filter;
        self
    }

    pub fn with_save_dir(mut self, save_dir: Option<String>) -> Self {
        self.save_dir = save_dir;
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn client(&self) -> &QuarkClient {
        &self.client
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    /// Save the target of a share link into the drive and share it again.
    ///
    /// Steps: share token, first listing entry, record lookup by title, save
    /// task, ad cleanup for folders, new share, record insert. A failed save
    /// or share aborts the call; a saved but unshared file stays in the drive.
    pub async fn store(&self, url: &str) -> Result<StoreOutcome> {
        let share = parse_share_url(url)?;
        let stoken = self.client.get_stoken(&share).await?;
        let item = self.client.share_detail(&share, &stoken).await?;

        match self.records.find_share_link(&item.title) {
            Ok(Some(share_link)) => {
                info!(title = %item.title, %share_link, "already transferred");
                return Ok(StoreOutcome {
                    already_existed: true,
                    file_name: item.title,
                    share_link,
                    store_error: None,
                });
            }
            Ok(None) => {}
            Err(e) => warn!(title = %item.title, error = %e, "record lookup failed, transferring anyway"),
        }

        let to_pdir_fid = self.save_dir.as_deref().unwrap_or(ROOT_FOLDER_ID);
        let task_id = self.client.save(&share, &stoken, &item, to_pdir_fid).await?;
        let task = self.client.wait_task(Stage::Save, &task_id, &self.poll).await?;
        let file_id = task
            .save_as
            .and_then(|save_as| save_as.save_as_top_fids.into_iter().next())
            .ok_or_else(|| QuarkError::unexpected(Stage::Save, "task result has no saved file id"))?;

        if item.is_folder() {
            self.remove_ads(&file_id).await;
        }

        let share_link = self.share(&file_id, &item.title).await?;

        let record = TransferRecord::new(&file_id, &item.title, item.file_type, &share_link);
        let store_error = match self.records.upsert(&record) {
            Ok(()) => None,
            Err(e) => {
                warn!(title = %item.title, error = %e, "failed to save transfer record");
                Some(e.to_string())
            }
        };

        info!(title = %item.title, %share_link, "transferred");
        Ok(StoreOutcome {
            already_existed: false,
            file_name: item.title,
            share_link,
            store_error,
        })
    }

    /// Store share links in order until `limit` new transfers were made.
    ///
    /// Failed links are logged and skipped. Titles that were already recorded
    /// are returned but do not count towards the limit.
    pub async fn store_batch<I, S>(&self, urls: I, limit: usize) -> Vec<StoreOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut outcomes = Vec::new();
        let mut transferred = 0;

        for url in urls {
            if transferred >= limit {
                break;
            }
            let url = url.as_ref();
            match self.store(url).await {
                Ok(outcome) => {
                    if !outcome.already_existed {
                        transferred += 1;
                    }
                    outcomes.push(outcome);
                }
                Err(e) => warn!(url, error = %e, "transfer failed"),
            }
        }

        outcomes
    }

    /// Delete advertisement files directly inside a saved folder.
    ///
    /// Failures are logged and skipped. Returns the number of deleted files.
    pub async fn remove_ads(&self, folder_id: &str) -> usize {
        if self.ad_filter.is_empty() {
            return 0;
        }

        let files = match self.client.list_dir(folder_id).await {
            Ok(files) => files,
            Err(e) => {
                warn!(folder_id, error = %e, "failed to list saved folder");
                return 0;
            }
        };

        let mut removed = 0;
        for file in files.iter().filter(|f| self.ad_filter.is_ad(&f.file_name)) {
            match self.delete_file(&file.fid).await {
                Ok(()) => {
                    info!(file_name = %file.file_name, "deleted ad file");
                    removed += 1;
                }
                Err(e) => warn!(file_name = %file.file_name, error = %e, "failed to delete ad file"),
            }
        }
        removed
    }

    /// Find a folder by name in the drive root, creating it if missing.
    pub async fn ensure_save_dir(&self, name: &str) -> Result<String> {
        let root = self.client.list_dir(ROOT_FOLDER_ID).await?;
        if let Some(dir) = root
            .into_iter()
            .find(|f| f.is_folder() && f.file_name == name)
        {
            return Ok(dir.fid);
        }

        let fid = self.client.mkdir(name, ROOT_FOLDER_ID).await?;
        info!(name, fid = %fid, "created save folder");
        Ok(fid)
    }

    async fn delete_file(&self, fid: &str) -> Result<()> {
        let task_id = self.client.delete(fid).await?;
        self.client
            .wait_task(Stage::Cleanup, &task_id, &self.poll)
            .await?;
        Ok(())
    }

    async fn share(&self, file_id: &str, title: &str) -> Result<String> {
        let task_id = self.client.create_share(file_id, title).await?;
        let task = self
            .client
            .wait_task(Stage::Share, &task_id, &self.poll)
            .await?;
        let share_id = task
            .share_id
            .ok_or_else(|| QuarkError::unexpected(Stage::Share, "task result has no share id"))?;
        self.client.share_url(&share_id).await
    }
}
