//! URL parser for extracting share references from Quark share links.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{QuarkError, Result};
use crate::models::ShareReference;

/// Host prefix every share link starts with.
static SHARE_PREFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://pan\.quark\.cn/s/").expect("Invalid share prefix regex")
});

/// Share id token at the start of the stripped link.
static SHARE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)").expect("Invalid share id regex"));

/// A bare share id passed without the link around it.
static RAW_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+$").expect("Invalid raw id regex"));

static PASSCODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]pwd=(\w+)").expect("Invalid passcode regex"));

/// Nested folder id in the fragment, e.g. `#/list/share/<fid>`.
static FOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#/list/share.*/(\w+)").expect("Invalid folder fragment regex")
});

/// Folder id used when a link points at the share root.
pub const ROOT_FOLDER_ID: &str = "0";

/// Parse a share link into its share id, passcode and folder id.
///
/// Supports the following formats:
/// - `https://pan.quark.cn/s/<ID>`
/// - `https://pan.quark.cn/s/<ID>?pwd=<CODE>`
/// - `https://pan.quark.cn/s/<ID>#/list/share/<FOLDER_ID>`
/// - Raw share id
///
/// A missing passcode becomes an empty string and a missing folder becomes
/// [`ROOT_FOLDER_ID`].
///
/// # Examples
///
/// ```
/// use quark_transfer::url_parser::parse_share_url;
///
/// let share = parse_share_url("https://pan.quark.cn/s/3a1b2c3d?pwd=x1y2").unwrap();
/// assert_eq!(share.share_id, "3a1b2c3d");
/// assert_eq!(share.passcode, "x1y2");
/// assert_eq!(share.parent_folder_id, "0");
/// ```
pub fn parse_share_url(url: &str) -> Result<ShareReference> {
    let trimmed = url.trim();

    let rest = match SHARE_PREFIX_REGEX.find(trimmed) {
        Some(prefix) => &trimmed[prefix.end()..],
        None if RAW_ID_REGEX.is_match(trimmed) => {
            return Ok(ShareReference {
                share_id: trimmed.to_string(),
                passcode: String::new(),
                parent_folder_id: ROOT_FOLDER_ID.to_string(),
            });
        }
        None => return Err(QuarkError::InvalidShareUrl(url.to_string())),
    };

    let share_id = SHARE_ID_REGEX
        .captures(rest)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| QuarkError::InvalidShareUrl(url.to_string()))?;

    let passcode = PASSCODE_REGEX
        .captures(rest)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let parent_folder_id = FOLDER_REGEX
        .captures(rest)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| ROOT_FOLDER_ID.to_string());

    Ok(ShareReference {
        share_id,
        passcode,
        parent_folder_id,
    })
}
