//! Resolves torrent links (URLs or magnets) into a magnet URI or a saved,
//! validated `.torrent`, and ranks resolved candidates.
//!
//! ```ignore
//! let client = Arc::new(ReqwestClient::new(&HttpConfig::default())?);
//! let resolver = TorrentResolver::new(client, Arc::new(BencodeParser::new()), ResolverConfig::default());
//! let result = resolver.resolve("https://pt.example/download.php?id=1", &RequestContext::default()).await;
//! ```

pub mod core;
pub mod plugins;

pub use crate::core::config::{HttpConfig, RequestContext, ResolverConfig};
pub use crate::core::episodes::torrent_episodes;
pub use crate::core::error::{BypassError, ResolveError, TorrentParseError};
pub use crate::core::model::{
    Candidate, HttpResponse, MediaIdentity, MediaMeta, MediaType, ResolutionResult, TorrentContent,
    TorrentDescriptor, TorrentInfo,
};
pub use crate::core::ranker::sort_group_candidates;
pub use crate::plugins::http::client::ReqwestClient;
pub use crate::plugins::media::parser::FilenameMetaParser;
pub use crate::plugins::registry::{HttpClient, MetadataExtractor, TorrentParser};
pub use crate::plugins::torrent::metainfo::BencodeParser;
pub use crate::plugins::torrent::resolver::TorrentResolver;
