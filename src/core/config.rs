use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_REDIRECTS: usize = 20;
pub const DEFAULT_INTERSTITIAL_MARKER: &str = "下载种子文件";
pub const DEFAULT_MEDIA_EXTS: &[&str] = &[
    ".mp4", ".mkv", ".ts", ".iso", ".rmvb", ".avi", ".mov", ".mpeg", ".mpg", ".wmv", ".3gp", ".asf",
    ".m4v", ".flv", ".m2ts", ".strm", ".tp", ".f4v",
];

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Directory downloaded `.torrent` files are written to.
    pub temp_dir: PathBuf,
    pub max_redirects: usize,
    /// Phrase that identifies a site's first-download confirmation page.
    pub interstitial_marker: String,
    /// Lower-case, dot-prefixed.
    pub media_exts: Vec<String>,
}

impl ResolverConfig {
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            interstitial_marker: DEFAULT_INTERSTITIAL_MARKER.to_string(),
            media_exts: DEFAULT_MEDIA_EXTS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_media_file(&self, file: &str) -> bool {
        Path::new(file)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_ascii_lowercase()))
            .map(|ext| self.media_exts.iter().any(|m| *m == ext))
            .unwrap_or(false)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new(std::env::temp_dir().join("torrent-resolver"))
    }
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    /// Proxy used by requests whose context sets `use_proxy`.
    pub proxy: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 60, proxy: None }
    }
}

/// Per-request credentials and identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub cookie: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub use_proxy: bool,
}
