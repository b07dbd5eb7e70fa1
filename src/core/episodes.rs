use crate::core::config::ResolverConfig;
use crate::plugins::registry::MetadataExtractor;
use std::collections::BTreeSet;

/// Union of the episode numbers found in a torrent's file list.
///
/// Files without a media extension, and files the extractor cannot place
/// at a starting episode (samples, extras), are ignored.
pub fn torrent_episodes(files: &[String], extractor: &dyn MetadataExtractor, config: &ResolverConfig) -> Vec<u32> {
    let mut episodes = BTreeSet::new();
    for file in files {
        if !config.is_media_file(file) {
            continue;
        }
        let meta = extractor.extract(file);
        if meta.begin_episode.is_none() {
            continue;
        }
        episodes.extend(meta.episodes);
    }
    episodes.into_iter().collect()
}
