// Async HTTP client for the gateway Admin API.
//
// Resource paths are passed as segment slices and appended to the admin
// base URL with proper percent-encoding, so natural keys such as
// `10.0.0.1:8080` (targets) never get mistaken for URL schemes.

use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::ErrorBody;
use crate::transport::TransportConfig;

/// Raw client for the Admin API.
///
/// Knows nothing about resource kinds: it builds URLs, sends form-encoded
/// bodies, and turns non-success statuses into [`Error::Api`]. Cloning is
/// cheap and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AdminClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url)
    }

    /// Wrap an existing `reqwest::Client` (caller manages headers and TLS).
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL can carry segments and ends with `/`.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(raw.to_owned()));
        }
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        url.set_query(None);
        Ok(url)
    }

    /// The admin base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append `segments` to the base URL.
    ///
    /// `trailing_slash` renders collection paths as `/services/` the way
    /// the Admin API documents them.
    pub fn url(&self, segments: &[&str], trailing_slash: bool) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
            if trailing_slash {
                path.push("");
            }
        }
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    pub async fn post_form<T: DeserializeOwned>(
        &self,
        url: Url,
        form: &[(String, String)],
    ) -> Result<T, Error> {
        debug!("POST {url}");
        trace!(?form, "form body");

        let resp = self.http.post(url).form(form).send().await?;
        self.handle_response(resp).await
    }

    pub async fn put_form<T: DeserializeOwned>(
        &self,
        url: Url,
        form: &[(String, String)],
    ) -> Result<T, Error> {
        debug!("PUT {url}");
        trace!(?form, "form body");

        let resp = self.http.put(url).form(form).send().await?;
        self.handle_response(resp).await
    }

    pub async fn patch_form<T: DeserializeOwned>(
        &self,
        url: Url,
        form: &[(String, String)],
    ) -> Result<T, Error> {
        debug!("PATCH {url}");
        trace!(?form, "form body");

        let resp = self.http.patch(url).form(form).send().await?;
        self.handle_response(resp).await
    }

    pub async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = preview(&body);
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "admin API error response");

        if let Some(body) = ErrorBody::parse(&raw) {
            Error::Api {
                status: status.as_u16(),
                message: body.summary().unwrap_or_else(|| status.to_string()),
                fields: body.fields,
            }
        } else {
            Error::Api {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    preview(&raw).to_owned()
                },
                fields: std::collections::BTreeMap::new(),
            }
        }
    }
}

/// First 200 characters of a response body, cut on a char boundary.
fn preview(body: &str) -> &str {
    body.char_indices()
        .nth(200)
        .map_or(body, |(end, _)| &body[..end])
}
