//! GoFile resolution via its anonymous-account API.
//!
//! The happy path creates a throwaway account, fetches the content node
//! with its token and reads the stored link/name/size. Any failure along
//! that path falls back to the deterministic store URL for the content id.

use crate::error::{Error, Result};
use crate::model::ResolutionResult;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://api.gofile.io";
// Public website token GoFile requires alongside the account token.
const WEBSITE_TOKEN: &str = "4fd6sg89d7s6";

lazy_static! {
    static ref CONTENT_ID_RE: Regex =
        Regex::new(r"gofile\.io/d/([A-Za-z0-9]+)").expect("valid gofile id regex");
}

pub(super) struct GofileResolver {
    http: reqwest::Client,
    api_base: String,
}

impl GofileResolver {
    pub(super) fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    pub(super) fn with_api_base(http: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into(),
        }
    }

    pub(super) async fn resolve(&self, url: &str) -> ResolutionResult {
        let Some(content_id) = CONTENT_ID_RE.captures(url).map(|c| c[1].to_string()) else {
            return ResolutionResult::failure(url, "No content id in GoFile URL");
        };

        match self.resolve_via_api(url, &content_id).await {
            Ok(result) => result,
            Err(e) => {
                debug!(%url, "GoFile API path failed ({e}), using fallback template");
                ResolutionResult::success(
                    url,
                    format!("https://store1.gofile.io/download/{content_id}"),
                )
            }
        }
    }

    async fn resolve_via_api(&self, url: &str, content_id: &str) -> Result<ResolutionResult> {
        let token = self.anonymous_token().await?;

        let content_url = format!(
            "{}/contents/{content_id}?wt={WEBSITE_TOKEN}&cache=true",
            self.api_base
        );
        let resp = self
            .http
            .get(&content_url)
            .bearer_auth(&token)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::UpstreamHttp {
                status: status.as_u16(),
                url: content_url,
            });
        }

        let body: Value = resp.json().await?;
        let children = body
            .pointer("/data/children")
            .and_then(Value::as_object)
            .ok_or_else(|| Error::ResolutionExhausted {
                url: url.to_string(),
            })?;

        let file = children
            .values()
            .find(|child| child.get("link").and_then(Value::as_str).is_some())
            .ok_or_else(|| Error::ResolutionExhausted {
                url: url.to_string(),
            })?;

        let mut result = ResolutionResult::success(
            url,
            file["link"].as_str().unwrap_or_default().to_string(),
        );
        result.filename = file
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);
        result.filesize = file
            .get("size")
            .and_then(Value::as_u64)
            .map(|bytes| format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0)));
        Ok(result)
    }

    async fn anonymous_token(&self) -> Result<String> {
        let accounts_url = format!("{}/accounts", self.api_base);
        let resp = self.http.post(&accounts_url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::UpstreamHttp {
                status: status.as_u16(),
                url: accounts_url,
            });
        }
        let body: Value = resp.json().await?;
        body.pointer("/data/token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Browser("GoFile account response missing token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> reqwest::Client {
        reqwest::Client::new()
    }

    #[tokio::test]
    async fn api_path_reads_link_name_size() {
        let mut server = mockito::Server::new_async().await;
        let _accounts = server
            .mock("POST", "/accounts")
            .with_status(200)
            .with_body(r#"{"status":"ok","data":{"token":"tok123"}}"#)
            .create_async()
            .await;
        let _contents = server
            .mock(
                "GET",
                mockito::Matcher::Regex(r"^/contents/AbC42".to_string()),
            )
            .match_query(mockito::Matcher::Any)
            .match_header("authorization", "Bearer tok123")
            .with_status(200)
            .with_body(
                r#"{"status":"ok","data":{"children":{"x1":{"link":"https://store4.gofile.io/download/x1/Movie.mkv","name":"Movie.mkv","size":1048576}}}}"#,
            )
            .create_async()
            .await;

        let resolver = GofileResolver::with_api_base(client(), server.url());
        let result = resolver.resolve("https://gofile.io/d/AbC42").await;
        assert!(result.success);
        assert_eq!(
            result.direct_url.as_deref(),
            Some("https://store4.gofile.io/download/x1/Movie.mkv")
        );
        assert_eq!(result.filename.as_deref(), Some("Movie.mkv"));
        assert_eq!(result.filesize.as_deref(), Some("1.00 MB"));
    }

    #[tokio::test]
    async fn api_failure_falls_back_to_template() {
        let mut server = mockito::Server::new_async().await;
        let _accounts = server
            .mock("POST", "/accounts")
            .with_status(500)
            .create_async()
            .await;

        let resolver = GofileResolver::with_api_base(client(), server.url());
        let result = resolver.resolve("https://gofile.io/d/AbC42").await;
        assert!(result.success);
        assert_eq!(
            result.direct_url.as_deref(),
            Some("https://store1.gofile.io/download/AbC42")
        );
        assert_eq!(result.original_url, "https://gofile.io/d/AbC42");
    }

    #[tokio::test]
    async fn unparseable_url_fails_as_value() {
        let resolver = GofileResolver::new(client());
        let result = resolver.resolve("https://gofile.io/folder/nope").await;
        assert!(!result.success);
        assert!(result.error.is_some());
    }
}
