use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::core::config::{RequestContext, ResolverConfig};
use crate::core::error::ResolveError;
use crate::core::model::{is_magnet, HttpResponse, ResolutionResult};
use crate::plugins::registry::{HttpClient, TorrentParser};
use crate::plugins::torrent::filename::local_filename;
use crate::plugins::torrent::interstitial;

/// What a final 200 response turned out to be.
enum Payload {
    Magnet(String),
    Interstitial,
    Torrent,
}

/// Turns a torrent link into a magnet URI or a saved, validated `.torrent`.
pub struct TorrentResolver {
    client: Arc<dyn HttpClient>,
    parser: Arc<dyn TorrentParser>,
    config: ResolverConfig,
}

impl TorrentResolver {
    pub fn new(client: Arc<dyn HttpClient>, parser: Arc<dyn TorrentParser>, config: ResolverConfig) -> Self {
        Self { client, parser, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Never fails: errors come back as a result with `error_message` set.
    pub async fn resolve(&self, url: &str, ctx: &RequestContext) -> ResolutionResult {
        match self.try_resolve(url, ctx).await {
            Ok(r) => r,
            Err(e) => {
                warn!("resolve {} failed: {}", url, e);
                ResolutionResult::failure(e.to_string())
            }
        }
    }

    async fn try_resolve(&self, url: &str, ctx: &RequestContext) -> Result<ResolutionResult, ResolveError> {
        if is_magnet(url) {
            return Ok(ResolutionResult::magnet(url));
        }

        let mut current = url.to_string();
        let mut hops = 0usize;
        let response = loop {
            let resp = self.client.get(&current, ctx).await.map_err(|e| {
                debug!("GET {} failed: {:#}", current, e);
                ResolveError::LinkUnreachable(current.clone())
            })?;
            if !resp.is_redirect() {
                break resp;
            }
            let location = match resp.header("location") {
                Some(l) => l.trim().to_string(),
                None => break resp,
            };
            if is_magnet(&location) {
                return Ok(ResolutionResult::magnet(location));
            }
            hops += 1;
            if hops > self.config.max_redirects {
                return Err(ResolveError::TooManyRedirects { url: current, limit: self.config.max_redirects });
            }
            let next = join_location(&current, &location);
            debug!("redirect {} -> {}", current, next);
            current = next;
        };

        let response = match self.classify(&response)? {
            Payload::Magnet(m) => return Ok(ResolutionResult::magnet(m)),
            Payload::Torrent => response,
            Payload::Interstitial => {
                let page = response.text();
                match interstitial::bypass(&*self.client, &*self.parser, &page, &current, ctx).await {
                    Ok(confirmed) => {
                        info!("first-download confirmation bypassed: {}", current);
                        confirmed
                    }
                    Err(e) => {
                        warn!("first-download confirmation could not be bypassed ({}): {}", e, current);
                        return Err(ResolveError::InterstitialBlocked);
                    }
                }
            }
        };

        self.save(&response, &current).await
    }

    fn classify(&self, resp: &HttpResponse) -> Result<Payload, ResolveError> {
        match resp.status {
            200 => {}
            429 => return Err(ResolveError::RateLimited),
            s => return Err(ResolveError::HttpStatus(s)),
        }
        if resp.body.is_empty() {
            return Err(ResolveError::EmptyPayload);
        }
        let text = resp.text();
        if is_magnet(&text) {
            return Ok(Payload::Magnet(text.trim().to_string()));
        }
        if text.contains(self.config.interstitial_marker.as_str()) {
            return Ok(Payload::Interstitial);
        }
        Ok(Payload::Torrent)
    }

    async fn save(&self, resp: &HttpResponse, url: &str) -> Result<ResolutionResult, ResolveError> {
        let path = self.config.temp_dir.join(local_filename(&resp.headers, url));
        let io_err = |source| ResolveError::Save { path: path.clone(), source };
        tokio::fs::create_dir_all(&self.config.temp_dir).await.map_err(io_err)?;
        tokio::fs::write(&path, &resp.body).await.map_err(io_err)?;

        let info = self.parser.parse(&resp.body).map_err(|e| {
            error!("torrent parse failed for {}: {}", url, e);
            ResolveError::InvalidTorrentData
        })?;
        let file_list = if info.files.len() <= 1 { vec![info.name.clone()] } else { info.files };

        Ok(ResolutionResult::torrent(path, resp.body.clone(), info.name, file_list))
    }
}

fn join_location(current: &str, location: &str) -> String {
    Url::parse(current)
        .and_then(|base| base.join(location))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| location.to_string())
}
