use crate::plugins::registry::{CliPlugin, ResolveCliConfig};
use clap::{Arg, ArgAction, ArgMatches, Command};

pub struct TorrentCliPlugin;

impl TorrentCliPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl CliPlugin for TorrentCliPlugin {
    fn name(&self) -> &'static str {
        "torrent"
    }

    fn augment_command(&self, cmd: Command) -> Command {
        cmd.arg(
            Arg::new("torrent_temp_dir")
                .long("temp-dir")
                .help_heading("Torrent")
                .help("Directory downloaded .torrent files are saved to (default: system temp dir)")
                .num_args(1),
        )
        .arg(
            Arg::new("torrent_max_redirects")
                .long("max-redirects")
                .help_heading("Torrent")
                .help("Maximum redirect hops followed per link")
                .default_value("20")
                .num_args(1),
        )
        .arg(
            Arg::new("torrent_marker")
                .long("marker")
                .help_heading("Torrent")
                .help("Phrase that identifies a first-download confirmation page")
                .num_args(1),
        )
        .arg(
            Arg::new("torrent_media_ext")
                .long("media-ext")
                .help_heading("Torrent")
                .help("Media file extension counted when looking for episodes (repeatable, replaces the defaults), e.g. --media-ext mkv")
                .action(ArgAction::Append)
                .num_args(1),
        )
    }

    fn apply_matches(&self, matches: &ArgMatches, cfg: &mut ResolveCliConfig) -> anyhow::Result<()> {
        if let Some(v) = matches.get_one::<String>("torrent_temp_dir") {
            cfg.resolver.temp_dir = v.into();
        }
        if let Some(s) = matches.get_one::<String>("torrent_max_redirects") {
            cfg.resolver.max_redirects = s.parse()?;
        }
        if let Some(v) = matches.get_one::<String>("torrent_marker") {
            if v.trim().is_empty() {
                anyhow::bail!("--marker must not be empty");
            }
            cfg.resolver.interstitial_marker = v.clone();
        }
        if let Some(vs) = matches.get_many::<String>("torrent_media_ext") {
            cfg.resolver.media_exts = vs
                .map(|e| format!(".{}", e.trim().trim_start_matches('.').to_ascii_lowercase()))
                .collect();
        }
        Ok(())
    }
}
