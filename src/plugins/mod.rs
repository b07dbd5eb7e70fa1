pub mod http;
pub mod media;
pub mod registry;
pub mod torrent;
