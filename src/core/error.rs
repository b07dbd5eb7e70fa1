use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("cannot open link: {0}")]
    LinkUnreachable(String),

    #[error("rate limited, retry later")]
    RateLimited,

    #[error("download failed, status={0}")]
    HttpStatus(u16),

    #[error("no torrent data received")]
    EmptyPayload,

    #[error("first-download confirmation required, please download the torrent manually once on the site")]
    InterstitialBlocked,

    #[error("torrent data invalid, please confirm the link or manually download from the site.")]
    InvalidTorrentData,

    #[error("too many redirects (limit {limit}): {url}")]
    TooManyRedirects { url: String, limit: usize },

    #[error("failed to save torrent to {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum TorrentParseError {
    #[error("bencode: {0}")]
    Bencode(#[from] serde_bencode::Error),

    #[error("torrent has no name")]
    MissingName,
}

/// Why an automatic first-download confirmation did not go through.
#[derive(thiserror::Error, Debug)]
pub enum BypassError {
    #[error("no form on confirmation page")]
    NoForm,

    #[error("confirmation form has no input fields")]
    NoFields,

    #[error("form action is not a valid url: {0}")]
    BadAction(String),

    #[error("submit failed: {0:#}")]
    Transport(anyhow::Error),

    #[error("submit returned status {0}")]
    Status(u16),

    #[error("submit did not return a torrent: {0}")]
    NotATorrent(#[from] TorrentParseError),
}
