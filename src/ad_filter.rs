//! Advertisement file detection by keyword.

/// Case-insensitive keyword matcher for advertisement files.
#[derive(Debug, Clone, Default)]
pub struct AdFilter {
    keywords: Vec<String>,
}

impl AdFilter {
    /// Create a filter from configured keywords. Blank keywords are ignored.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        keywords.sort();
        keywords.dedup();
        Self { keywords }
    }

    /// Whether the file name contains any configured keyword.
    pub fn is_ad(&self, file_name: &str) -> bool {
        let name = file_name.to_lowercase();
        self.keywords.iter().any(|k| name.contains(k.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Check a file name against a keyword list without building a filter.
pub fn is_ad<S: AsRef<str>>(file_name: &str, keywords: &[S]) -> bool {
    let name = file_name.to_lowercase();
    keywords
        .iter()
        .map(|k| k.as_ref().trim())
        .filter(|k| !k.is_empty())
        .any(|k| name.contains(&k.to_lowercase()))
}
