use clap::{Arg, ArgAction, ArgMatches, Command};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use torrent_resolver::plugins::registry::{PluginRegistry, ResolveCliConfig};
use torrent_resolver::{
    torrent_episodes, BencodeParser, FilenameMetaParser, ReqwestClient, TorrentContent, TorrentResolver,
};

fn build_cli(registry: &PluginRegistry) -> Command {
    let resolve = Command::new("resolve")
        .about("Resolve a torrent link into a magnet or a saved .torrent file")
        .arg(
            Arg::new("url")
                .help("Torrent page/download URL or magnet link")
                .required(true)
                .num_args(1),
        );
    let resolve = registry.augment_command(resolve);

    let episodes = Command::new("episodes")
        .about("List the episode numbers found in a list of file names")
        .arg(
            Arg::new("files")
                .help("File names, e.g. as listed inside a torrent")
                .action(ArgAction::Append)
                .num_args(1..)
                .required(true),
        );
    let episodes = registry.augment_command(episodes);

    Command::new("torrent-resolver")
        .about("Resolve torrent links, bypassing first-download confirmation pages")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(resolve)
        .subcommand(episodes)
}

fn load_config(registry: &PluginRegistry, m: &ArgMatches) -> anyhow::Result<ResolveCliConfig> {
    let mut cfg = ResolveCliConfig::default();
    registry.apply_matches(m, &mut cfg)?;
    tracing::debug!("cli plugins: {:?}", registry.plugin_names());
    Ok(cfg)
}

async fn run_resolve(cfg: ResolveCliConfig, url: &str) -> anyhow::Result<bool> {
    let client = Arc::new(ReqwestClient::new(&cfg.http)?);
    let resolver = TorrentResolver::new(client, Arc::new(BencodeParser::new()), cfg.resolver);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} {wide_msg}")?.tick_chars("|/-\\ "));
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb.set_message(format!("resolving {}", url));
    let result = resolver.resolve(url, &cfg.request).await;
    pb.finish_and_clear();

    match &result.content {
        Some(TorrentContent::Magnet(m)) => println!("magnet: {}", m),
        Some(TorrentContent::Bytes(bytes)) => {
            if let Some(path) = &result.file_path {
                println!("saved: {} ({} bytes)", path.display(), bytes.len());
            }
            println!("name: {}", result.root_name);
            println!("files ({}):", result.file_list.len());
            for f in &result.file_list {
                println!("  {}", f);
            }
            let episodes = torrent_episodes(&result.file_list, &FilenameMetaParser::new(), resolver.config());
            if !episodes.is_empty() {
                println!("episodes: {:?}", episodes);
            }
        }
        None if result.error_message.is_empty() => eprintln!("error: nothing downloaded from {}", url),
        None => eprintln!("error: {}", result.error_message),
    }

    Ok(result.is_success())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let registry = PluginRegistry::with_defaults();
    let app = build_cli(&registry);
    let matches = app.get_matches();

    match matches.subcommand() {
        Some(("resolve", m)) => {
            let cfg = load_config(&registry, m)?;
            let url = m
                .get_one::<String>("url")
                .ok_or_else(|| anyhow::anyhow!("missing url"))?;
            if !run_resolve(cfg, url).await? {
                std::process::exit(1);
            }
        }
        Some(("episodes", m)) => {
            let cfg = load_config(&registry, m)?;
            let files: Vec<String> = m
                .get_many::<String>("files")
                .map(|vs| vs.cloned().collect())
                .unwrap_or_default();
            let episodes = torrent_episodes(&files, &FilenameMetaParser::new(), &cfg.resolver);
            println!("{:?}", episodes);
        }
        _ => {}
    }

    Ok(())
}
