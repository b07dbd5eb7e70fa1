use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, REFERER, USER_AGENT};
use std::collections::HashMap;
use std::time::Duration;

use crate::core::config::{HttpConfig, RequestContext};
use crate::core::model::HttpResponse;
use crate::plugins::registry::HttpClient;

pub struct ReqwestClient {
    direct: reqwest::Client,
    proxied: Option<reqwest::Client>,
}

impl ReqwestClient {
    pub fn new(cfg: &HttpConfig) -> anyhow::Result<Self> {
        let direct = Self::builder(cfg).build()?;
        let proxied = match &cfg.proxy {
            Some(p) => Some(Self::builder(cfg).proxy(reqwest::Proxy::all(p)?).build()?),
            None => None,
        };
        Ok(Self { direct, proxied })
    }

    fn builder(cfg: &HttpConfig) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(cfg.timeout_secs))
    }

    fn client_for(&self, ctx: &RequestContext) -> &reqwest::Client {
        match (&self.proxied, ctx.use_proxy) {
            (Some(p), true) => p,
            _ => &self.direct,
        }
    }

    fn build_headers(ctx: &RequestContext) -> anyhow::Result<HeaderMap> {
        let mut h = HeaderMap::new();
        if let Some(ua) = &ctx.user_agent {
            h.insert(USER_AGENT, HeaderValue::from_str(ua)?);
        }
        if let Some(cookie) = &ctx.cookie {
            h.insert(COOKIE, HeaderValue::from_str(cookie)?);
        }
        if let Some(referer) = &ctx.referer {
            h.insert(REFERER, HeaderValue::from_str(referer)?);
        }
        Ok(h)
    }

    async fn into_response(resp: reqwest::Response) -> anyhow::Result<HttpResponse> {
        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_ascii_lowercase(), latin1(v.as_bytes())))
            .collect();
        let body = resp.bytes().await?;
        Ok(HttpResponse { status, headers, body })
    }
}

/// Header bytes taken one-to-one as code points, so non-ASCII values survive
/// and can be re-decoded by whoever knows their real charset.
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str, ctx: &RequestContext) -> anyhow::Result<HttpResponse> {
        let resp = self.client_for(ctx)
            .get(url)
            .headers(Self::build_headers(ctx)?)
            .send()
            .await?;
        Self::into_response(resp).await
    }

    async fn post_form(
        &self,
        url: &str,
        ctx: &RequestContext,
        fields: &HashMap<String, String>,
    ) -> anyhow::Result<HttpResponse> {
        let resp = self.client_for(ctx)
            .post(url)
            .headers(Self::build_headers(ctx)?)
            .form(fields)
            .send()
            .await?;
        Self::into_response(resp).await
    }
}
