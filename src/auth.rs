//! Cookie session credentials for the Quark drive web API.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, ORIGIN, REFERER, USER_AGENT};

use crate::error::{QuarkError, Result};

/// Browser user agent the web API expects.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Origin of the drive web client.
const DRIVE_ORIGIN: &str = "https://pan.quark.cn";

/// Logged-in session cookie copied from the drive web client.
#[derive(Clone)]
pub struct Credentials {
    cookie: String,
}

impl Credentials {
    /// Create credentials from a raw `Cookie` header value.
    pub fn new(cookie: impl Into<String>) -> Result<Self> {
        let cookie = cookie.into().trim().to_string();
        if cookie.is_empty() {
            return Err(QuarkError::Config("cookie is empty".to_string()));
        }
        Ok(Self { cookie })
    }

    /// Headers sent with every API request.
    pub fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9"));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ORIGIN, HeaderValue::from_static(DRIVE_ORIGIN));
        headers.insert(REFERER, HeaderValue::from_static("https://pan.quark.cn/"));

        let mut cookie = HeaderValue::from_str(&self.cookie)
            .map_err(|_| QuarkError::Config("cookie contains invalid characters".to_string()))?;
        cookie.set_sensitive(true);
        headers.insert(COOKIE, cookie);

        Ok(headers)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("cookie", &"<redacted>").finish()
    }
}
