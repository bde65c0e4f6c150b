//! GitHub contents API backend.
//!
//! Documents live at `data/<name>.json` on a configured branch. Reads use
//! `GET /repos/{owner}/{repo}/contents/{path}?ref={branch}`, which returns
//! the file base64-encoded together with its blob `sha`. Files above the
//! inline limit come back without content; those are fetched again with
//! the raw media type. Writes use `PUT` on the same URL, sending the `sha`
//! for updates and omitting it for creates.
//!
//! # Status mapping
//!
//! | HTTP | Error |
//! |------|-------|
//! | 401 | [`RemoteError::Unauthorized`] |
//! | 404 | [`RemoteError::NotFound`] |
//! | 409 | [`RemoteError::Conflict`] |
//! | 429, or 403 with `x-ratelimit-remaining: 0` | [`RemoteError::RateLimited`] |
//! | other non-2xx | [`RemoteError::Status`] |

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{RemoteError, RemoteFile, RemoteStore};
use crate::config::RemoteConfig;

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";
const API_VERSION: &str = "2022-11-28";

/// Blocking client for one repository and branch.
pub struct GitHubStore {
    client: Client,
    api_base: String,
    repo: String,
    branch: String,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

impl GitHubStore {
    pub fn new(
        token: &str,
        repo: &str,
        branch: &str,
        api_base: &str,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| RemoteError::Setup("access token contains invalid characters".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("campus-desk/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            repo: repo.trim().to_string(),
            branch: branch.trim().to_string(),
        })
    }

    /// Build a client when the config carries both a token and a repository.
    pub fn from_config(config: &RemoteConfig) -> Option<Result<Self, RemoteError>> {
        let (token, repo) = config.credentials()?;
        Some(Self::new(
            token,
            repo,
            &config.branch,
            &config.api_base,
            config.timeout(),
        ))
    }

    fn contents_url(&self, path: &str) -> String {
        format!("{}/repos/{}/contents/{}", self.api_base, self.repo, path)
    }

    fn fetch_raw(&self, path: &str) -> Result<Vec<u8>, RemoteError> {
        let resp = self
            .client
            .get(self.contents_url(path))
            .query(&[("ref", self.branch.as_str())])
            .header(ACCEPT, RAW_MEDIA_TYPE)
            .send()?;
        let resp = check_status(resp, path)?;
        Ok(resp.bytes()?.to_vec())
    }

    fn put(
        &self,
        path: &str,
        message: &str,
        content: &[u8],
        sha: Option<&str>,
    ) -> Result<(), RemoteError> {
        let body = PutRequest {
            message,
            content: STANDARD.encode(content),
            branch: &self.branch,
            sha,
        };
        let resp = self.client.put(self.contents_url(path)).json(&body).send()?;
        check_status(resp, path)?;
        Ok(())
    }
}

impl RemoteStore for GitHubStore {
    fn describe(&self) -> String {
        format!("github:{}@{}", self.repo, self.branch)
    }

    fn fetch(&self, path: &str) -> Result<RemoteFile, RemoteError> {
        let resp = self
            .client
            .get(self.contents_url(path))
            .query(&[("ref", self.branch.as_str())])
            .send()?;
        let resp = check_status(resp, path)?;
        let text = resp.text()?;
        let meta: ContentsResponse = serde_json::from_str(&text)
            .map_err(|e| RemoteError::Malformed(format!("contents response for {path}: {e}")))?;

        if let Some(kind) = meta.kind.as_deref() {
            if kind != "file" {
                return Err(RemoteError::Malformed(format!("{path} is a {kind}, not a file")));
            }
        }

        let inline = meta.content.as_deref().filter(|c| !c.trim().is_empty());
        let content = match (meta.encoding.as_deref(), inline) {
            (Some("base64"), Some(encoded)) => decode_base64(encoded)
                .map_err(|e| RemoteError::Malformed(format!("base64 content of {path}: {e}")))?,
            _ => self.fetch_raw(path)?,
        };

        Ok(RemoteFile {
            content,
            sha: meta.sha,
        })
    }

    fn create(&self, path: &str, message: &str, content: &[u8]) -> Result<(), RemoteError> {
        self.put(path, message, content, None)
    }

    fn update(
        &self,
        path: &str,
        message: &str,
        content: &[u8],
        sha: &str,
    ) -> Result<(), RemoteError> {
        self.put(path, message, content, Some(sha))
    }
}

/// GitHub wraps base64 content at 60 columns.
fn decode_base64(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact)
}

fn check_status(resp: Response, path: &str) -> Result<Response, RemoteError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let rate_limit_exhausted = resp
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0");

    match status {
        StatusCode::UNAUTHORIZED => Err(RemoteError::Unauthorized),
        StatusCode::NOT_FOUND => Err(RemoteError::NotFound(path.to_string())),
        StatusCode::CONFLICT => Err(RemoteError::Conflict(path.to_string())),
        StatusCode::TOO_MANY_REQUESTS => Err(RemoteError::RateLimited(status.as_u16())),
        StatusCode::FORBIDDEN if rate_limit_exhausted => {
            Err(RemoteError::RateLimited(status.as_u16()))
        }
        _ => {
            let body = resp.text().unwrap_or_default();
            Err(RemoteError::Status {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64_ignores_line_wrapping() {
        let encoded = "eyJrcGkiOiB7fX0=\n";
        assert_eq!(decode_base64(encoded).unwrap(), b"{\"kpi\": {}}");

        let wrapped = "W3si\nYSI6\nMX1d\n";
        assert_eq!(decode_base64(wrapped).unwrap(), b"[{\"a\":1}]");
    }

    #[test]
    fn test_decode_base64_rejects_garbage() {
        assert!(decode_base64("%%%not base64%%%").is_err());
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let mut cfg = RemoteConfig::default();
        assert!(GitHubStore::from_config(&cfg).is_none());

        cfg.token = Some("ghp_test".into());
        cfg.repo = Some("office/desk-data".into());
        let store = GitHubStore::from_config(&cfg).unwrap().unwrap();
        assert_eq!(store.describe(), "github:office/desk-data@main");
        assert_eq!(
            store.contents_url("data/schedules.json"),
            "https://api.github.com/repos/office/desk-data/contents/data/schedules.json"
        );
    }

    #[test]
    fn test_token_with_newline_is_setup_error() {
        let err = GitHubStore::new(
            "bad\ntoken",
            "a/b",
            "main",
            "https://api.github.com",
            Duration::from_secs(30),
        )
        .err()
        .unwrap();
        assert!(matches!(err, RemoteError::Setup(_)));
    }

    #[test]
    fn test_put_request_omits_sha_on_create() {
        let body = PutRequest {
            message: "Create schedules.json",
            content: STANDARD.encode(b"[]"),
            branch: "main",
            sha: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message": "Create schedules.json",
                "content": "W10=",
                "branch": "main"
            })
        );
    }
}
