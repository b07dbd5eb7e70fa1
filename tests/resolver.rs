use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use torrent_resolver::{
    BencodeParser, HttpClient, HttpResponse, RequestContext, ResolverConfig, TorrentContent, TorrentResolver,
};

const CONFIRM_PAGE: &str = r#"<html><body>
<p>这是您第一次下载该种子，请点击下方按钮下载种子文件</p>
<form action="?" method="post">
  <input type="hidden" name="id" value="42">
  <input type="hidden" name="letdown" value="1">
</form></body></html>"#;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Get(String),
    Post(String, HashMap<String, String>),
}

/// Replies from a queue in order; an exhausted queue is a transport failure.
/// Every request's context is kept alongside its call.
#[derive(Clone, Default)]
struct ScriptedClient {
    replies: Arc<Mutex<VecDeque<Option<HttpResponse>>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    contexts: Arc<Mutex<Vec<RequestContext>>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Option<HttpResponse>>) -> Self {
        Self { replies: Arc::new(Mutex::new(replies.into())), ..Default::default() }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn contexts(&self) -> Vec<RequestContext> {
        self.contexts.lock().unwrap().clone()
    }

    fn record(&self, call: Call, ctx: &RequestContext) {
        self.calls.lock().unwrap().push(call);
        self.contexts.lock().unwrap().push(ctx.clone());
    }

    fn gets(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::Get(_))).count()
    }

    fn next(&self) -> anyhow::Result<HttpResponse> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .flatten()
            .ok_or_else(|| anyhow::anyhow!("connection refused"))
    }
}

#[async_trait]
impl HttpClient for ScriptedClient {
    async fn get(&self, url: &str, ctx: &RequestContext) -> anyhow::Result<HttpResponse> {
        self.record(Call::Get(url.to_string()), ctx);
        self.next()
    }

    async fn post_form(
        &self,
        url: &str,
        ctx: &RequestContext,
        fields: &HashMap<String, String>,
    ) -> anyhow::Result<HttpResponse> {
        self.record(Call::Post(url.to_string(), fields.clone()), ctx);
        self.next()
    }
}

fn reply(status: u16, headers: &[(&str, &str)], body: impl Into<Bytes>) -> Option<HttpResponse> {
    Some(HttpResponse {
        status,
        headers: headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        body: body.into(),
    })
}

fn redirect(location: &str) -> Option<HttpResponse> {
    reply(302, &[("location", location)], Bytes::new())
}

fn bstr(s: &str) -> String {
    format!("{}:{}", s.len(), s)
}

fn single_file_torrent(name: &str) -> Vec<u8> {
    format!(
        "d4:infod6:lengthi1024e{}{}12:piece lengthi16384e6:pieces20:aaaaaaaaaaaaaaaaaaaaee",
        bstr("name"),
        bstr(name)
    )
    .into_bytes()
}

fn multi_file_torrent(name: &str, files: &[&str]) -> Vec<u8> {
    let entries: String = files
        .iter()
        .map(|f| format!("d6:lengthi100e4:pathl{}ee", bstr(f)))
        .collect();
    format!(
        "d4:infod5:filesl{}e{}{}12:piece lengthi16384e6:pieces20:aaaaaaaaaaaaaaaaaaaaee",
        entries,
        bstr("name"),
        bstr(name)
    )
    .into_bytes()
}

fn resolver(client: &ScriptedClient, dir: &TempDir) -> TorrentResolver {
    TorrentResolver::new(Arc::new(client.clone()), Arc::new(BencodeParser::new()), ResolverConfig::new(dir.path()))
}

#[tokio::test]
async fn magnet_input_returns_without_requests() {
    let dir = TempDir::new().unwrap();
    let client = ScriptedClient::new(vec![]);
    let magnet = "magnet:?xt=urn:btih:0123456789abcdef0123456789abcdef01234567&dn=Show";

    let r = resolver(&client, &dir).resolve(magnet, &RequestContext::default()).await;

    assert_eq!(r.content, Some(TorrentContent::Magnet(magnet.to_string())));
    assert!(r.file_path.is_none());
    assert!(r.error_message.is_empty());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn redirect_chain_ending_in_magnet() {
    let dir = TempDir::new().unwrap();
    let magnet = "magnet:?xt=urn:btih:abc";
    let client = ScriptedClient::new(vec![
        redirect("https://b.example/step1"),
        redirect("/step2"),
        redirect(magnet),
    ]);

    let r = resolver(&client, &dir).resolve("https://a.example/dl?id=1", &RequestContext::default()).await;

    assert_eq!(r.magnet_uri(), Some(magnet));
    assert!(r.file_path.is_none());
    assert_eq!(
        client.calls(),
        vec![
            Call::Get("https://a.example/dl?id=1".into()),
            Call::Get("https://b.example/step1".into()),
            Call::Get("https://b.example/step2".into()),
        ]
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn endless_redirects_are_capped() {
    let dir = TempDir::new().unwrap();
    let replies = (0..30).map(|i| redirect(&format!("https://loop.example/{i}"))).collect();
    let client = ScriptedClient::new(replies);
    let mut config = ResolverConfig::new(dir.path());
    config.max_redirects = 5;
    let resolver = TorrentResolver::new(Arc::new(client.clone()), Arc::new(BencodeParser::new()), config);

    let r = resolver.resolve("https://loop.example/start", &RequestContext::default()).await;

    assert!(!r.is_success());
    assert!(r.error_message.contains("too many redirects"));
    assert_eq!(client.gets(), 6);
}

#[tokio::test]
async fn redirect_without_location_is_a_status_error() {
    let dir = TempDir::new().unwrap();
    let client = ScriptedClient::new(vec![reply(302, &[], Bytes::new())]);

    let r = resolver(&client, &dir).resolve("https://pt.example/dl", &RequestContext::default()).await;

    assert_eq!(r.error_message, "download failed, status=302");
    assert_eq!(client.gets(), 1);
}

#[tokio::test]
async fn unreachable_link() {
    let dir = TempDir::new().unwrap();
    let client = ScriptedClient::new(vec![None]);

    let r = resolver(&client, &dir).resolve("https://down.example/x", &RequestContext::default()).await;

    assert_eq!(r.error_message, "cannot open link: https://down.example/x");
    assert!(r.content.is_none());
}

#[tokio::test]
async fn rate_limited() {
    let dir = TempDir::new().unwrap();
    let client = ScriptedClient::new(vec![reply(429, &[], "slow down")]);

    let r = resolver(&client, &dir).resolve("https://pt.example/dl", &RequestContext::default()).await;

    assert_eq!(r.error_message, "rate limited, retry later");
    assert!(r.file_path.is_none());
    assert!(r.content.is_none());
    assert!(r.root_name.is_empty());
    assert!(r.file_list.is_empty());
}

#[tokio::test]
async fn other_status_and_empty_body() {
    let dir = TempDir::new().unwrap();
    let client = ScriptedClient::new(vec![reply(404, &[], "nope"), reply(200, &[], Bytes::new())]);
    let resolver = resolver(&client, &dir);

    let r = resolver.resolve("https://pt.example/a", &RequestContext::default()).await;
    assert_eq!(r.error_message, "download failed, status=404");

    let r = resolver.resolve("https://pt.example/b", &RequestContext::default()).await;
    assert_eq!(r.error_message, "no torrent data received");
}

#[tokio::test]
async fn magnet_in_body() {
    let dir = TempDir::new().unwrap();
    let client = ScriptedClient::new(vec![reply(200, &[], "magnet:?xt=urn:btih:feed\n")]);

    let r = resolver(&client, &dir).resolve("https://pt.example/m", &RequestContext::default()).await;

    assert_eq!(r.magnet_uri(), Some("magnet:?xt=urn:btih:feed"));
}

#[tokio::test]
async fn multi_file_torrent_is_saved_and_listed() {
    let dir = TempDir::new().unwrap();
    let bytes = multi_file_torrent("Show S01", &["E01.mkv", "E02.mkv", "E03.mkv"]);
    let client = ScriptedClient::new(vec![reply(
        200,
        &[("content-disposition", r#"attachment; filename="Show S01.torrent""#)],
        bytes.clone(),
    )]);

    let r = resolver(&client, &dir).resolve("https://pt.example/download.php?id=9", &RequestContext::default()).await;

    assert!(r.error_message.is_empty());
    assert_eq!(r.root_name, "Show S01");
    assert_eq!(r.file_list, vec!["Show S01/E01.mkv", "Show S01/E02.mkv", "Show S01/E03.mkv"]);
    assert_eq!(r.torrent_bytes().map(|b| b.to_vec()), Some(bytes.clone()));
    let path = r.file_path.unwrap();
    assert_eq!(path, dir.path().join("Show S01.torrent"));
    assert_eq!(std::fs::read(path).unwrap(), bytes);
}

#[tokio::test]
async fn single_file_torrent_lists_its_name() {
    let dir = TempDir::new().unwrap();
    let client = ScriptedClient::new(vec![reply(200, &[], single_file_torrent("Movie.2023.mkv"))]);

    let r = resolver(&client, &dir).resolve("https://dl.example/files/movie.torrent", &RequestContext::default()).await;

    assert_eq!(r.file_list, vec!["Movie.2023.mkv"]);
    assert_eq!(r.root_name, "Movie.2023.mkv");
    assert_eq!(r.file_path, Some(dir.path().join("movie.torrent")));
}

#[tokio::test]
async fn legacy_encoded_name_uses_utf8_variant() {
    let dir = TempDir::new().unwrap();
    // name = "中文" in GBK, name.utf-8 = "中文"
    let mut bytes = b"d4:infod6:lengthi1e4:name4:".to_vec();
    bytes.extend_from_slice(&[0xD6, 0xD0, 0xCE, 0xC4]);
    bytes.extend_from_slice(b"10:name.utf-86:");
    bytes.extend_from_slice("中文".as_bytes());
    bytes.extend_from_slice(b"ee");
    let client = ScriptedClient::new(vec![reply(200, &[], bytes)]);

    let r = resolver(&client, &dir).resolve("https://pt.example/cn.torrent", &RequestContext::default()).await;

    assert!(r.is_success(), "{}", r.error_message);
    assert_eq!(r.root_name, "中文");
    assert_eq!(r.file_list, vec!["中文"]);
}

#[tokio::test]
async fn dot_dot_disposition_is_saved_under_timestamp() {
    let dir = TempDir::new().unwrap();
    let client = ScriptedClient::new(vec![reply(
        200,
        &[("content-disposition", r#"attachment; filename="..""#)],
        single_file_torrent("Movie"),
    )]);

    let r = resolver(&client, &dir).resolve("https://pt.example/download.php?id=3", &RequestContext::default()).await;

    assert!(r.is_success(), "{}", r.error_message);
    let path = r.file_path.unwrap();
    assert_eq!(path.parent(), Some(dir.path()));
    assert!(path.is_file());
}

#[tokio::test]
async fn garbage_body_is_invalid_torrent() {
    let dir = TempDir::new().unwrap();
    let client = ScriptedClient::new(vec![reply(200, &[], "<html>login required</html>")]);

    let r = resolver(&client, &dir).resolve("https://pt.example/x.torrent", &RequestContext::default()).await;

    assert_eq!(r.error_message, "torrent data invalid, please confirm the link or manually download from the site.");
    assert!(r.content.is_none());
    assert!(r.file_path.is_none());
}

#[tokio::test]
async fn confirmation_page_is_bypassed() {
    let dir = TempDir::new().unwrap();
    let url = "https://pt.example/download.php?id=42";
    let client = ScriptedClient::new(vec![
        reply(200, &[("content-type", "text/html; charset=utf-8")], CONFIRM_PAGE),
        reply(200, &[("content-disposition", "attachment; filename=real.torrent")], single_file_torrent("Real")),
    ]);

    let r = resolver(&client, &dir).resolve(url, &RequestContext::default()).await;

    assert!(r.is_success(), "{}", r.error_message);
    assert_eq!(r.root_name, "Real");
    assert_eq!(r.file_path, Some(dir.path().join("real.torrent")));
    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[1],
        Call::Post(
            url.to_string(),
            HashMap::from([("id".to_string(), "42".to_string()), ("letdown".to_string(), "1".to_string())])
        )
    );
}

#[tokio::test]
async fn request_context_reaches_every_request() {
    let dir = TempDir::new().unwrap();
    let client = ScriptedClient::new(vec![
        redirect("/download.php?id=42"),
        reply(200, &[], CONFIRM_PAGE),
        reply(200, &[], single_file_torrent("Real")),
    ]);
    let ctx = RequestContext {
        cookie: Some("uid=1; pass=abc".into()),
        user_agent: Some("Mozilla/5.0".into()),
        referer: Some("https://pt.example/".into()),
        use_proxy: true,
    };

    let r = resolver(&client, &dir).resolve("https://pt.example/dl?id=42", &ctx).await;

    assert!(r.is_success(), "{}", r.error_message);
    assert!(matches!(client.calls().last(), Some(Call::Post(..))));
    assert_eq!(client.contexts(), vec![ctx.clone(), ctx.clone(), ctx]);
}

#[tokio::test]
async fn confirmation_bypass_failures_are_reported() {
    let blocked = "first-download confirmation required, please download the torrent manually once on the site";
    let cases = vec![
        vec![reply(200, &[], CONFIRM_PAGE), reply(200, &[], "<html>still not a torrent</html>")],
        vec![reply(200, &[], CONFIRM_PAGE), reply(403, &[], "forbidden")],
        vec![reply(200, &[], CONFIRM_PAGE), None],
        vec![reply(200, &[], "<p>请手动下载种子文件</p>")],
    ];

    for replies in cases {
        let dir = TempDir::new().unwrap();
        let client = ScriptedClient::new(replies);
        let r = resolver(&client, &dir).resolve("https://pt.example/d?id=1", &RequestContext::default()).await;
        assert_eq!(r.error_message, blocked);
        assert!(r.content.is_none());
    }
}
