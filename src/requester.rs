//! The HTTP transport.

use std::time::Duration;

use http::{HeaderMap, Method, StatusCode};
use tracing::debug;

use crate::{ApiError, ApiErrorKind};

/// Sends requests over a shared connection pool. Cloning is cheap, and
/// clones share the pool.
#[derive(Debug, Clone)]
pub struct Requester {
    client: reqwest::Client,
}

impl Requester {
    /// Create a requester with an overall per-request timeout. If
    /// `verify_tls` is false, invalid TLS certificates are accepted.
    pub fn new(verify_tls: bool, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(|e| ApiError::with_source(ApiErrorKind::Request, e))?;

        Ok(Self { client })
    }

    /// Send a request, returning the status and the body text. Connection
    /// failures and timeouts are reported as [`ApiErrorKind::Http`].
    pub async fn execute(
        &self,
        req: http::Request<String>,
    ) -> Result<(StatusCode, String), ApiError> {
        let req: reqwest::Request = req
            .try_into()
            .map_err(|e| ApiError::with_source(ApiErrorKind::Request, e))?;

        debug!(method = %req.method(), url = %req.url(), "sending request");
        let resp = self.client.execute(req).await.map_err(transport_error)?;
        let status = resp.status();
        let body = resp.text().await.map_err(transport_error)?;

        debug!(%status, len = body.len(), "received response");
        Ok((status, body))
    }

    /// Send a POST request.
    pub async fn post(
        &self,
        url: &str,
        data: String,
        headers: HeaderMap,
    ) -> Result<(StatusCode, String), ApiError> {
        self.send(Method::POST, url, data, headers).await
    }

    /// Send a PUT request.
    pub async fn put(
        &self,
        url: &str,
        data: String,
        headers: HeaderMap,
    ) -> Result<(StatusCode, String), ApiError> {
        self.send(Method::PUT, url, data, headers).await
    }

    /// Send a GET request.
    pub async fn get(&self, url: &str, headers: HeaderMap) -> Result<(StatusCode, String), ApiError> {
        self.send(Method::GET, url, String::new(), headers).await
    }

    /// Send a DELETE request.
    pub async fn delete(
        &self,
        url: &str,
        headers: HeaderMap,
    ) -> Result<(StatusCode, String), ApiError> {
        self.send(Method::DELETE, url, String::new(), headers).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        data: String,
        headers: HeaderMap,
    ) -> Result<(StatusCode, String), ApiError> {
        let mut req = http::Request::builder()
            .method(method)
            .uri(url)
            .body(data)
            .map_err(|e| ApiError::with_source(ApiErrorKind::Request, e))?;

        *req.headers_mut() = headers;
        self.execute(req).await
    }
}

fn transport_error(e: reqwest::Error) -> ApiError {
    if e.is_connect() || e.is_timeout() {
        ApiError::with_source(ApiErrorKind::Http, e)
    } else {
        ApiError::with_source(ApiErrorKind::Request, e)
    }
}

#[cfg(test)]
mod test {
    use assert_matches::assert_matches;

    use super::*;
    use crate::testutil::{MockServer, refused_url};

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::AUTHORIZATION, "key".parse().unwrap());
        headers.insert(
            http::header::CONTENT_TYPE,
            "application/json".parse().unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn post_returns_status_and_body() -> anyhow::Result<()> {
        let server = MockServer::start(201, r#"{"status": "success"}"#).await?;
        let requester = Requester::new(true, Duration::from_secs(5))?;

        let (status, body) = requester
            .post(&server.url("/insert/"), r#"{"a": {"b": 1}}"#.to_owned(), headers())
            .await?;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, r#"{"status": "success"}"#);

        let req = server.request().await?;
        assert!(req.starts_with("POST /insert/ HTTP/1.1\r\n"));
        assert!(req.to_lowercase().contains("authorization: key\r\n"));
        assert!(req.ends_with(r#"{"a": {"b": 1}}"#));
        Ok(())
    }

    #[tokio::test]
    async fn other_methods() -> anyhow::Result<()> {
        let requester = Requester::new(true, Duration::from_secs(5))?;

        let server = MockServer::start(200, "{}").await?;
        requester.get(&server.url("/column/"), headers()).await?;
        assert!(server.request().await?.starts_with("GET /column/ "));

        let server = MockServer::start(200, "{}").await?;
        requester.delete(&server.url("/query/saved/q"), headers()).await?;
        assert!(server.request().await?.starts_with("DELETE /query/saved/q "));

        let server = MockServer::start(200, "{}").await?;
        requester
            .put(&server.url("/query/saved/q"), "{}".to_owned(), headers())
            .await?;
        assert!(server.request().await?.starts_with("PUT /query/saved/q "));
        Ok(())
    }

    #[tokio::test]
    async fn error_statuses_are_not_transport_errors() -> anyhow::Result<()> {
        let server = MockServer::start(400, r#"{"errors": [{"code": 2012}]}"#).await?;
        let requester = Requester::new(true, Duration::from_secs(5))?;

        let (status, body) = requester.get(&server.url("/"), headers()).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("2012"));
        Ok(())
    }

    #[tokio::test]
    async fn connection_refused() -> anyhow::Result<()> {
        let requester = Requester::new(true, Duration::from_secs(5))?;
        let refused = refused_url().await?;
        let result = requester.get(&refused, headers()).await;
        assert_matches!(result, Err(e) if e.kind() == ApiErrorKind::Http);
        Ok(())
    }

    #[tokio::test]
    async fn timeout() -> anyhow::Result<()> {
        let server = MockServer::silent().await?;
        let requester = Requester::new(true, Duration::from_millis(200))?;

        let result = requester.get(&server.url("/"), headers()).await;
        assert_matches!(result, Err(e) if e.kind() == ApiErrorKind::Http);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_url() -> anyhow::Result<()> {
        let requester = Requester::new(true, Duration::from_secs(5))?;
        let result = requester.get("not a url", headers()).await;
        assert_matches!(result, Err(e) if e.kind() == ApiErrorKind::Request);
        Ok(())
    }
}
