//! PostgREST-dialect HTTP implementation of the backend port, plus the
//! object-storage endpoints (upload / remove / sign).

use chrono::SecondsFormat;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{Backend, BackendConfig, BackendError, BackendResult, ConfigError, Filter, Row, SelectQuery};

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::Invalid("http client", e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url,
            key: config.key,
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.key).bearer_auth(&self.key)
    }

    async fn ensure_ok(resp: reqwest::Response) -> BackendResult<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        #[derive(Deserialize)]
        struct ErrorBody {
            code: Option<String>,
            message: Option<String>,
        }

        let text = resp.text().await.unwrap_or_default();
        let body: Option<ErrorBody> = serde_json::from_str(&text).ok();
        let (code, message) = match body {
            Some(b) => (b.code, b.message.unwrap_or_else(|| text.clone())),
            None => (None, text),
        };
        Err(BackendError::Rejected {
            status: status.as_u16(),
            code,
            message,
        })
    }

    async fn rows_from(resp: reqwest::Response) -> BackendResult<Vec<Row>> {
        resp.json::<Vec<Row>>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn single_row(resp: reqwest::Response) -> BackendResult<Row> {
        let mut rows = Self::rows_from(resp).await?;
        if rows.len() != 1 {
            return Err(BackendError::Decode(format!(
                "expected exactly one returned row, got {}",
                rows.len()
            )));
        }
        Ok(rows.remove(0))
    }
}

fn transport_error(e: reqwest::Error) -> BackendError {
    if e.is_decode() {
        BackendError::Decode(e.to_string())
    } else {
        // Connect failures, timeouts, dropped sockets: all unreachable-network
        // as far as the caller is concerned.
        BackendError::Network(e.to_string())
    }
}

/// Renders a PostgREST scalar literal. Values here are ids, booleans, numbers
/// and dates; none carry PostgREST-reserved characters.
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Compiles a [`SelectQuery`] into PostgREST query parameters.
pub(crate) fn rest_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];

    for filter in &query.filters {
        match filter {
            Filter::Eq(col, value) => {
                params.push((col.to_string(), format!("eq.{}", literal(value))));
            }
            Filter::In(col, values) => {
                let list: Vec<String> = values.iter().map(literal).collect();
                params.push((col.to_string(), format!("in.({})", list.join(","))));
            }
        }
    }

    if let Some(cursor) = &query.before {
        let t = cursor.created_at.to_rfc3339_opts(SecondsFormat::Micros, true);
        params.push((
            "or".to_string(),
            format!(
                "(created_at.lt.\"{t}\",and(created_at.eq.\"{t}\",id.lt.{id}))",
                id = cursor.id
            ),
        ));
    }

    if query.newest_first {
        params.push(("order".to_string(), "created_at.desc,id.desc".to_string()));
    }

    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }

    params
}

fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| match f {
            Filter::Eq(col, value) => (col.to_string(), format!("eq.{}", literal(value))),
            Filter::In(col, values) => {
                let list: Vec<String> = values.iter().map(literal).collect();
                (col.to_string(), format!("in.({})", list.join(",")))
            }
        })
        .collect()
}

impl Backend for HttpBackend {
    async fn select(&self, query: SelectQuery) -> BackendResult<Vec<Row>> {
        debug!(table = query.table, "select");
        let resp = self
            .authed(self.client.get(self.rest_url(query.table)))
            .query(&rest_params(&query))
            .send()
            .await
            .map_err(transport_error)?;
        Self::rows_from(Self::ensure_ok(resp).await?).await
    }

    async fn insert(&self, table: &'static str, row: Value) -> BackendResult<Row> {
        debug!(table, "insert");
        let resp = self
            .authed(self.client.post(self.rest_url(table)))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await
            .map_err(transport_error)?;
        Self::single_row(Self::ensure_ok(resp).await?).await
    }

    async fn upsert(
        &self,
        table: &'static str,
        row: Value,
        on_conflict: &'static [&'static str],
    ) -> BackendResult<Row> {
        debug!(table, "upsert");
        let resp = self
            .authed(self.client.post(self.rest_url(table)))
            .query(&[("on_conflict", on_conflict.join(","))])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&row)
            .send()
            .await
            .map_err(transport_error)?;
        Self::single_row(Self::ensure_ok(resp).await?).await
    }

    async fn update(
        &self,
        table: &'static str,
        filters: Vec<Filter>,
        patch: Value,
    ) -> BackendResult<Vec<Row>> {
        debug!(table, "update");
        let resp = self
            .authed(self.client.patch(self.rest_url(table)))
            .query(&filter_params(&filters))
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await
            .map_err(transport_error)?;
        Self::rows_from(Self::ensure_ok(resp).await?).await
    }

    async fn delete(&self, table: &'static str, filters: Vec<Filter>) -> BackendResult<()> {
        debug!(table, "delete");
        let resp = self
            .authed(self.client.delete(self.rest_url(table)))
            .query(&filter_params(&filters))
            .send()
            .await
            .map_err(transport_error)?;
        Self::ensure_ok(resp).await?;
        Ok(())
    }

    async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> BackendResult<()> {
        debug!(bucket, path, size = bytes.len(), "upload object");
        let resp = self
            .authed(self.client.post(self.object_url(bucket, path)))
            .header("Content-Type", mime.to_string())
            .body(bytes)
            .send()
            .await
            .map_err(transport_error)?;
        Self::ensure_ok(resp).await?;
        Ok(())
    }

    async fn remove_object(&self, bucket: &str, path: &str) -> BackendResult<()> {
        debug!(bucket, path, "remove object");
        let resp = self
            .authed(self.client.delete(self.object_url(bucket, path)))
            .send()
            .await
            .map_err(transport_error)?;
        Self::ensure_ok(resp).await?;
        Ok(())
    }

    async fn create_signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in_secs: u32,
    ) -> BackendResult<String> {
        #[derive(Deserialize)]
        struct SignResponse {
            #[serde(rename = "signedURL")]
            signed_url: String,
        }

        let url = format!("{}/storage/v1/object/sign/{}/{}", self.base_url, bucket, path);
        let resp = self
            .authed(self.client.post(url))
            .json(&serde_json::json!({ "expiresIn": expires_in_secs }))
            .send()
            .await
            .map_err(transport_error)?;
        let signed: SignResponse = Self::ensure_ok(resp)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(format!("{}/storage/v1{}", self.base_url, signed.signed_url))
    }
}
