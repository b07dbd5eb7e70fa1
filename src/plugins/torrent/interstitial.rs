//! First-download confirmation pages.
//!
//! Some private trackers answer the first download of a torrent with an HTML
//! page asking the user to confirm. The page carries a form; submitting it
//! with its hidden fields returns the real `.torrent`.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

use crate::core::config::RequestContext;
use crate::core::error::BypassError;
use crate::core::model::HttpResponse;
use crate::plugins::registry::{HttpClient, TorrentParser};

static FORM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<form\b([^>]*)>(.*?)</form>").expect("Invalid form pattern"));

static INPUT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<input\b([^>]*)>").expect("Invalid input pattern"));

static ACTION_ATTR: LazyLock<Regex> = LazyLock::new(|| attr_pattern("action"));
static NAME_ATTR: LazyLock<Regex> = LazyLock::new(|| attr_pattern("name"));
static VALUE_ATTR: LazyLock<Regex> = LazyLock::new(|| attr_pattern("value"));

fn attr_pattern(attr: &str) -> Regex {
    Regex::new(&format!(r#"(?is)(?:^|\s){attr}\s*=\s*(?:"([^"]*)"|'([^']*)')"#)).expect("Invalid attribute pattern")
}

fn attr<'a>(pattern: &Regex, tag: &'a str) -> Option<&'a str> {
    let c = pattern.captures(tag)?;
    c.get(1).or_else(|| c.get(2)).map(|m| m.as_str())
}

fn unescape(s: &str) -> String {
    s.replace("&amp;", "&").replace("&quot;", "\"").replace("&#39;", "'")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmForm {
    pub action: String,
    pub fields: HashMap<String, String>,
}

/// Reads the first form on `page`. The action falls back to `url` when it is
/// missing or `?`, and relative actions are resolved against `url`.
pub fn scrape_form(page: &str, url: &str) -> Result<ConfirmForm, BypassError> {
    let form = FORM_PATTERN.captures(page).ok_or(BypassError::NoForm)?;
    let attrs = form.get(1).map(|m| m.as_str()).unwrap_or_default();
    let body = form.get(2).map(|m| m.as_str()).unwrap_or_default();

    let action = resolve_action(attr(&ACTION_ATTR, attrs).map(|a| unescape(a.trim())), url)?;

    let fields: HashMap<String, String> = INPUT_PATTERN
        .captures_iter(body)
        .filter_map(|c| {
            let tag = c.get(1)?.as_str();
            let name = attr(&NAME_ATTR, tag)?;
            let value = attr(&VALUE_ATTR, tag)?;
            Some((unescape(name), unescape(value)))
        })
        .collect();
    if fields.is_empty() {
        return Err(BypassError::NoFields);
    }

    Ok(ConfirmForm { action, fields })
}

fn resolve_action(action: Option<String>, url: &str) -> Result<String, BypassError> {
    match action.as_deref() {
        None | Some("") | Some("?") => Ok(url.to_string()),
        Some(a) if a.starts_with("http://") || a.starts_with("https://") => Ok(a.to_string()),
        Some(a) => Url::parse(url)
            .and_then(|base| base.join(a))
            .map(|u| u.to_string())
            .map_err(|_| BypassError::BadAction(a.to_string())),
    }
}

/// Submits the confirmation form once. Succeeds only when the answer is a
/// 200 whose body parses as a torrent.
pub async fn bypass(
    client: &dyn HttpClient,
    parser: &dyn TorrentParser,
    page: &str,
    url: &str,
    ctx: &RequestContext,
) -> Result<HttpResponse, BypassError> {
    let form = scrape_form(page, url)?;
    debug!("submitting download confirmation to {} with {} field(s)", form.action, form.fields.len());

    let resp = client
        .post_form(&form.action, ctx, &form.fields)
        .await
        .map_err(BypassError::Transport)?;
    if resp.status != 200 {
        return Err(BypassError::Status(resp.status));
    }

    parser.parse(&resp.body)?;
    Ok(resp)
}
