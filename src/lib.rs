//! quark_transfer - Save shared Quark drive links into your own drive.
//!
//! This library provides functionality to:
//! - Parse share links into share id, passcode and folder
//! - Save a share into your drive, removing advertisement files from folders
//! - Re-share saved files and remember the links, so each title is saved once
//! - Browse, search and create folders in your drive
//!
//! # Example
//!
//! ```no_run
//! use quark_transfer::{Config, Quark};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_file("config.json")?;
//!     let quark = Quark::from_config(&config)?;
//!
//!     let outcome = quark.store("https://pan.quark.cn/s/3a1b2c3d").await?;
//!     println!("{} {}", outcome.file_name, outcome.share_link);
//!
//!     Ok(())
//! }
//! ```

pub mod ad_filter;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod poll;
pub mod store;
pub mod transfer;
pub mod url_parser;

// Re-exports for convenience
pub use ad_filter::{is_ad, AdFilter};
pub use auth::Credentials;
pub use client::QuarkClient;
pub use config::Config;
pub use error::{QuarkError, Result, Stage};
pub use models::{ShareReference, StoreOutcome, TransferRecord};
pub use poll::PollPolicy;
pub use store::RecordStore;
pub use transfer::Quark;
pub use url_parser::parse_share_url;
