//! Client for a running SiYuan kernel's HTTP API.

use crate::error::{Error, Result};
use crate::host::{Attrs, Block, Host, Query};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// SiYuan truncates statements without a LIMIT to its search limit (64 by default)
const SCAN_LIMIT: usize = 100_000;

/// Connection settings for a SiYuan kernel
#[derive(Debug, Clone)]
pub struct SiYuanSettings {
    pub base_url: String,
    pub token: Option<String>,
    pub notebook: String,
    pub timeout: Option<Duration>,
}

/// `{code, msg, data}` wrapper around every kernel response
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    msg: String,
    data: Option<T>,
}

#[derive(Serialize)]
struct CreateDocRequest<'a> {
    notebook: &'a str,
    path: &'a str,
    markdown: &'a str,
}

#[derive(Serialize)]
struct SetAttrsRequest<'a> {
    id: &'a str,
    attrs: &'a Attrs,
}

#[derive(Serialize)]
struct SqlRequest<'a> {
    stmt: &'a str,
}

pub struct SiYuanHost {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    notebook: String,
}

impl SiYuanHost {
    pub fn new(settings: &SiYuanSettings) -> Result<Self> {
        if settings.notebook.trim().is_empty() {
            return Err(Error::Config(
                "no notebook configured. Run 'friends config notebook <id>'".to_string(),
            ));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.token.clone().filter(|t| !t.is_empty()),
            notebook: settings.notebook.clone(),
        })
    }

    async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self.client.post(&url).json(body);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Token {}", token));
        }

        let response = request.send().await.map_err(|e| {
            log::error!("SiYuan request {} failed: {}", endpoint, e);
            Error::Http(e)
        })?;

        let envelope: Envelope<T> = response
            .error_for_status()
            .map_err(|e| {
                log::error!("SiYuan {} returned HTTP error: {}", endpoint, e);
                Error::Http(e)
            })?
            .json()
            .await
            .map_err(|e| {
                log::error!("SiYuan {} returned an unreadable body: {}", endpoint, e);
                Error::Http(e)
            })?;

        if envelope.code != 0 {
            log::error!(
                "SiYuan {} failed with code {}: {}",
                endpoint,
                envelope.code,
                envelope.msg
            );
            return Err(Error::Host {
                code: envelope.code,
                msg: envelope.msg,
            });
        }

        Ok(envelope.data)
    }
}

#[async_trait]
impl Host for SiYuanHost {
    async fn create_document(&self, hpath: &str, markdown: &str) -> Result<String> {
        let request = CreateDocRequest {
            notebook: &self.notebook,
            path: hpath,
            markdown,
        };
        let id: Option<String> = self.post("/api/filetree/createDocWithMd", &request).await?;

        id.filter(|id| !id.is_empty()).ok_or_else(|| Error::Host {
            code: 0,
            msg: format!("no document id returned for {}", hpath),
        })
    }

    async fn set_block_attrs(&self, block_id: &str, attrs: &Attrs) -> Result<()> {
        let request = SetAttrsRequest { id: block_id, attrs };
        let _: Option<serde_json::Value> = self.post("/api/attr/setBlockAttrs", &request).await?;
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Block>> {
        let stmt = query.with_default_limit(SCAN_LIMIT).to_inline_sql();
        log::debug!("SiYuan query: {}", stmt);

        let rows: Option<Vec<Block>> = self.post("/api/query/sql", &SqlRequest { stmt: &stmt }).await?;
        Ok(rows.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(server: &MockServer) -> SiYuanSettings {
        SiYuanSettings {
            base_url: server.uri(),
            token: Some("secret".to_string()),
            notebook: "20240101000000-notebk1".to_string(),
            timeout: Some(Duration::from_secs(5)),
        }
    }

    #[test]
    fn test_requires_notebook() {
        let err = SiYuanHost::new(&SiYuanSettings {
            base_url: "http://127.0.0.1:6806".to_string(),
            token: None,
            notebook: " ".to_string(),
            timeout: None,
        })
        .err()
        .unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_create_document() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/filetree/createDocWithMd"))
            .and(header("Authorization", "Token secret"))
            .and(body_partial_json(json!({
                "notebook": "20240101000000-notebk1",
                "path": "/Friends/Alice",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "msg": "",
                "data": "20240101093000-abcdefg",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let host = SiYuanHost::new(&settings(&server)).unwrap();
        let id = host.create_document("/Friends/Alice", "# Alice").await.unwrap();
        assert_eq!(id, "20240101093000-abcdefg");
    }

    #[tokio::test]
    async fn test_query_parses_rows() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/query/sql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "msg": "",
                "data": [{
                    "id": "20240101093000-abcdefg",
                    "type": "d",
                    "hpath": "/Friends/Alice",
                    "content": "Alice",
                    "ial": "{: id=\"20240101093000-abcdefg\" custom-friend-id=\"friend-alice\"}",
                    "created": "20240101093000",
                    "updated": "20240101093000",
                    "box": "20240101000000-notebk1"
                }],
            })))
            .mount(&server)
            .await;

        let host = SiYuanHost::new(&settings(&server)).unwrap();
        let rows = host
            .query(&Query::documents().path_prefix("/Friends/"))
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].hpath, "/Friends/Alice");
        assert_eq!(rows[0].attrs()["custom-friend-id"], "friend-alice");
    }

    #[tokio::test]
    async fn test_query_sends_limited_statement() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/query/sql"))
            .and(body_partial_json(json!({
                "stmt": "SELECT id, type, hpath, content, ial, created, updated FROM blocks WHERE type = 'd' LIMIT 100000",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0, "msg": "", "data": null,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let host = SiYuanHost::new(&settings(&server)).unwrap();
        let rows = host.query(&Query::documents()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_error_code_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/attr/setBlockAttrs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": -1,
                "msg": "block not found",
                "data": null,
            })))
            .mount(&server)
            .await;

        let host = SiYuanHost::new(&settings(&server)).unwrap();
        let err = host
            .set_block_attrs("missing", &Attrs::new())
            .await
            .unwrap_err();

        match err {
            Error::Host { code, msg } => {
                assert_eq!(code, -1);
                assert_eq!(msg, "block not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
