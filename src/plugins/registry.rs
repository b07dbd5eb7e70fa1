use async_trait::async_trait;
use crate::core::config::{HttpConfig, RequestContext, ResolverConfig};
use crate::core::error::TorrentParseError;
use crate::core::model::{HttpResponse, MediaMeta, TorrentInfo};
use clap::{ArgMatches, Command};
use std::collections::HashMap;

/// Transport used by the resolver. `Err` means no response at all.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET without following redirects.
    async fn get(&self, url: &str, ctx: &RequestContext) -> anyhow::Result<HttpResponse>;

    async fn post_form(
        &self,
        url: &str,
        ctx: &RequestContext,
        fields: &HashMap<String, String>,
    ) -> anyhow::Result<HttpResponse>;
}

pub trait TorrentParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<TorrentInfo, TorrentParseError>;
}

pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, filename: &str) -> MediaMeta;
}

#[derive(Debug, Clone, Default)]
pub struct ResolveCliConfig {
    pub request: RequestContext,
    pub http: HttpConfig,
    pub resolver: ResolverConfig,
}

pub trait CliPlugin: Send + Sync {
    fn name(&self) -> &'static str;
    fn augment_command(&self, cmd: Command) -> Command;
    fn apply_matches(&self, matches: &ArgMatches, cfg: &mut ResolveCliConfig) -> anyhow::Result<()>;
}

pub struct PluginRegistry {
    cli_plugins: Vec<Box<dyn CliPlugin>>,
}

impl PluginRegistry {
    pub fn with_defaults() -> Self {
        let mut reg = Self { cli_plugins: vec![] };
        reg.cli_plugins.push(Box::new(crate::plugins::http::cli::HttpCliPlugin::new()));
        reg.cli_plugins.push(Box::new(crate::plugins::torrent::cli::TorrentCliPlugin::new()));
        reg
    }

    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.cli_plugins.iter().map(|p| p.name()).collect()
    }

    pub fn augment_command(&self, cmd: Command) -> Command {
        self.cli_plugins
            .iter()
            .fold(cmd, |c, p| p.augment_command(c))
    }

    pub fn apply_matches(&self, matches: &ArgMatches, cfg: &mut ResolveCliConfig) -> anyhow::Result<()> {
        for p in &self.cli_plugins {
            p.apply_matches(matches, cfg)?;
        }
        Ok(())
    }
}
