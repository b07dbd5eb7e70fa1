use crate::core::model::Candidate;
use std::collections::HashSet;

/// Title, site priority, seeders, season count, episode count. Larger sorts first.
fn sort_key(c: &Candidate) -> (&str, u32, u32, usize, usize) {
    (
        c.torrent.title.as_str(),
        c.torrent.pri_order,
        c.torrent.seeders,
        c.media.seasons.len(),
        c.media.episodes.len(),
    )
}

/// Sorts candidates best-first and keeps only the best one per media identity.
///
/// Movies are identified by title, everything else by title plus the
/// season/episode span. Ties keep their input order.
pub fn sort_group_candidates(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    if candidates.is_empty() {
        return candidates;
    }

    candidates.sort_by(|a, b| sort_key(b).cmp(&sort_key(a)));

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.media.dedup_key()))
        .collect()
}
