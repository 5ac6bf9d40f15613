//! Single-hop HTTP transport for the companion service.
//!
//! Redirects are not followed here: the session follows them itself so
//! it can absorb cookies set on intermediate hops.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 7_1_2 like Mac OS X) AppleWebKit/537.51.2 (KHTML, like Gecko) Mobile/11D257";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One outgoing request. Form values are secrets and print redacted.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub cookie_header: Option<String>,
    pub form: Option<Vec<(&'static str, SecretString)>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// `Location` header, when present.
    pub location: Option<String>,
    /// Every `Set-Cookie` header value, in order.
    pub set_cookies: Vec<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status) && self.location.is_some()
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

// ---------------------------------------------------------------------------
// reqwest implementation
// ---------------------------------------------------------------------------

pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Failed to build HTTP client for companion service")?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => self.http.get(&request.url),
            Method::Post => self.http.post(&request.url),
        };
        if let Some(cookie) = &request.cookie_header {
            builder = builder.header(reqwest::header::COOKIE, cookie);
        }
        if let Some(form) = &request.form {
            let exposed: Vec<(&str, &str)> = form
                .iter()
                .map(|(k, v)| (*k, v.expose_secret().as_str()))
                .collect();
            builder = builder.form(&exposed);
        }

        let resp = builder
            .send()
            .await
            .with_context(|| format!("Request to {} failed", request.url))?;

        let status = resp.status().as_u16();
        let headers = resp.headers();
        let location = headers
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let set_cookies: Vec<String> = headers
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();

        let body = resp
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", request.url))?;

        debug!(
            url = %request.url,
            status,
            cookies = set_cookies.len(),
            redirect = ?location,
            "Companion response"
        );

        Ok(HttpResponse {
            status,
            location,
            set_cookies,
            body,
        })
    }
}
