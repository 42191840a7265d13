//! HTTP transport for the exam backend.
//!
//! Every response is wrapped in a `{code, message, data, meta}` envelope;
//! `code == "SUCCESS"` marks success. Error responses use the same envelope,
//! and its `code` is what the exam session uses to tell an already-closed
//! attempt apart from a real failure.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use proctor_core::error::{ApiError, CODE_SUCCESS};
use proctor_core::model::{ListQuery, Page, PageMeta};

use crate::context::SessionContext;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the exam backend REST API.
///
/// Holds an explicit [`SessionContext`]; the access token is attached as a
/// bearer token to every request.
pub struct ApiClient {
    context: SessionContext,
    client: reqwest::Client,
    timeout_secs: u64,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    meta: Option<PageMeta>,
    #[serde(default)]
    errors: Vec<FieldError>,
}

#[derive(Deserialize)]
struct FieldError {
    #[serde(default)]
    message: String,
}

/// Successful envelope contents.
pub(crate) struct Decoded {
    pub data: Option<Value>,
    pub meta: Option<PageMeta>,
}

impl Decoded {
    /// Deserialize the `data` field, which must be present.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let data = self
            .data
            .ok_or_else(|| ApiError::InvalidResponse("response has no data".into()))?;
        serde_json::from_value(data)
            .map_err(|e| ApiError::InvalidResponse(format!("failed to parse response data: {e}")))
    }

    /// Rows of a list response. The backend puts them either directly in
    /// `data` or in `data.rows` with a `data.count` total.
    pub fn into_page<T: DeserializeOwned>(self) -> Result<Page<T>, ApiError> {
        let mut meta = self.meta.unwrap_or_default();
        let rows = match self.data {
            Some(Value::Array(rows)) => Value::Array(rows),
            Some(Value::Object(mut obj)) => {
                if meta.total_items == 0 {
                    meta.total_items = obj.get("count").and_then(Value::as_u64).unwrap_or(0);
                }
                obj.remove("rows").unwrap_or(Value::Array(vec![]))
            }
            _ => Value::Array(vec![]),
        };
        let rows: Vec<T> = serde_json::from_value(rows)
            .map_err(|e| ApiError::InvalidResponse(format!("failed to parse rows: {e}")))?;
        Ok(Page { rows, meta })
    }
}

impl ApiClient {
    pub fn new(context: SessionContext) -> Result<Self, ApiError> {
        Self::with_timeout(context, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(context: SessionContext, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            context,
            client,
            timeout_secs,
        })
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut SessionContext {
        &mut self.context
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.context.base_url.trim_end_matches('/');
        Url::parse(&format!("{base}{path}"))
            .map_err(|e| ApiError::InvalidResponse(format!("invalid URL {base}{path}: {e}")))
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path)?;
        Ok(self.authorize(self.client.request(method, url)))
    }

    /// Like [`ApiClient::request`], with list parameters in the query string.
    pub(crate) fn request_with_query(
        &self,
        method: Method,
        path: &str,
        query: &ListQuery,
    ) -> Result<RequestBuilder, ApiError> {
        let mut url = self.url(path)?;
        append_query(&mut url, query)?;
        Ok(self.authorize(self.client.request(method, url)))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.context.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub(crate) async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Decoded, ApiError> {
        let builder = self.request(method, path)?.json(body);
        self.send(builder, path).await
    }

    pub(crate) async fn send(&self, builder: RequestBuilder, path: &str) -> Result<Decoded, ApiError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.timeout_secs)
            } else {
                ApiError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("failed to read response: {e}")))?;
        decode(status, &body, path)
    }
}

/// Turn a status and body into envelope contents or an [`ApiError`].
fn decode(status: u16, body: &str, path: &str) -> Result<Decoded, ApiError> {
    let envelope = serde_json::from_str::<Envelope>(body).ok();

    if status >= 400 {
        let message = envelope
            .as_ref()
            .and_then(|e| {
                e.message
                    .clone()
                    .filter(|m| !m.is_empty())
                    .or_else(|| e.errors.first().map(|f| f.message.clone()))
            })
            .unwrap_or_else(|| body.to_string());

        if status == 401 {
            return Err(ApiError::Unauthorized(message));
        }
        return match envelope {
            Some(env) if !env.code.is_empty() => Err(ApiError::Rejected {
                status,
                code: env.code,
                message,
                details: env.data,
            }),
            _ if status == 404 => Err(ApiError::NotFound(path.to_string())),
            _ => Err(ApiError::Rejected {
                status,
                code: format!("http_{status}"),
                message,
                details: None,
            }),
        };
    }

    let envelope = envelope.ok_or_else(|| {
        ApiError::InvalidResponse(format!("expected a JSON envelope from {path}"))
    })?;
    if envelope.code != CODE_SUCCESS {
        return Err(ApiError::Rejected {
            status,
            code: envelope.code,
            message: envelope.message.unwrap_or_default(),
            details: envelope.data,
        });
    }
    Ok(Decoded {
        data: envelope.data,
        meta: envelope.meta,
    })
}

/// Append the set fields of `query` as URL parameters.
fn append_query(url: &mut Url, query: &ListQuery) -> Result<(), ApiError> {
    let Value::Object(params) = serde_json::to_value(query)
        .map_err(|e| ApiError::InvalidResponse(format!("failed to encode query: {e}")))?
    else {
        return Ok(());
    };
    if params.is_empty() {
        return Ok(());
    }
    let mut pairs = url.query_pairs_mut();
    for (key, value) in params {
        let value = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        pairs.append_pair(&key, &value);
    }
    Ok(())
}
