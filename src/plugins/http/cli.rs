use crate::plugins::registry::{CliPlugin, ResolveCliConfig};
use clap::{Arg, ArgAction, ArgMatches, Command};

pub struct HttpCliPlugin;

impl HttpCliPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl CliPlugin for HttpCliPlugin {
    fn name(&self) -> &'static str {
        "http"
    }

    fn augment_command(&self, cmd: Command) -> Command {
        cmd.arg(
            Arg::new("http_cookie")
                .long("cookie")
                .help_heading("HTTP")
                .help("Cookie header sent to the site, e.g. --cookie 'uid=1; pass=xxx'")
                .num_args(1),
        )
        .arg(
            Arg::new("http_user_agent")
                .long("user-agent")
                .help_heading("HTTP")
                .help("HTTP User-Agent")
                .default_value("torrent-resolver/0.1")
                .num_args(1),
        )
        .arg(
            Arg::new("http_referer")
                .long("referer")
                .help_heading("HTTP")
                .help("Referer header")
                .num_args(1),
        )
        .arg(
            Arg::new("http_proxy")
                .long("proxy")
                .help_heading("HTTP")
                .help("Proxy url, e.g. http://127.0.0.1:7890 or socks5://host:port")
                .num_args(1),
        )
        .arg(
            Arg::new("http_use_proxy")
                .long("use-proxy")
                .help_heading("HTTP")
                .help("Send requests through --proxy")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("http_timeout_secs")
                .long("timeout-secs")
                .help_heading("HTTP")
                .help("HTTP timeout in seconds")
                .default_value("60")
                .num_args(1),
        )
    }

    fn apply_matches(&self, matches: &ArgMatches, cfg: &mut ResolveCliConfig) -> anyhow::Result<()> {
        if let Some(v) = matches.get_one::<String>("http_cookie") {
            cfg.request.cookie = Some(v.clone());
        }
        if let Some(v) = matches.get_one::<String>("http_user_agent") {
            cfg.request.user_agent = Some(v.clone());
        }
        if let Some(v) = matches.get_one::<String>("http_referer") {
            cfg.request.referer = Some(v.clone());
        }
        if let Some(v) = matches.get_one::<String>("http_proxy") {
            cfg.http.proxy = Some(v.clone());
        }
        cfg.request.use_proxy = matches.get_flag("http_use_proxy");
        if cfg.request.use_proxy && cfg.http.proxy.is_none() {
            anyhow::bail!("--use-proxy requires --proxy");
        }
        if let Some(s) = matches.get_one::<String>("http_timeout_secs") {
            cfg.http.timeout_secs = s.parse()?;
        }
        Ok(())
    }
}
