//! `reqwest` wrapper that runs every outgoing call inside an `outgoing_http`
//! span and records the response status on it.

use tracing::{field::Empty, Instrument, Level};

#[derive(Clone)]
pub struct TracedClient {
    inner: reqwest::Client,
}

impl TracedClient {
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    pub async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let span = tracing::span!(
            Level::INFO,
            "outgoing_http",
            http.method = %req.method(),
            http.url = %req.url(),
            http.status_code = Empty,
            error = Empty,
        );
        let fut = self.inner.execute(req);
        let result = fut.instrument(span.clone()).await;
        match &result {
            Ok(resp) => {
                span.record("http.status_code", resp.status().as_u16());
                if resp.status().is_client_error() || resp.status().is_server_error() {
                    span.record("error", true);
                }
            }
            Err(e) => {
                span.record("error", true);
                tracing::warn!(parent: &span, error = %e, "outgoing request failed");
            }
        }
        result
    }

    /// Builder for a request that is later passed to [`TracedClient::execute`].
    pub fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.inner.request(method, url)
    }

    pub async fn get(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        let req = self.inner.get(url).build()?;
        self.execute(req).await
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }
}

impl From<reqwest::Client> for TracedClient {
    fn from(c: reqwest::Client) -> Self {
        Self::new(c)
    }
}

impl Default for TracedClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn executes_built_requests() {
        let server = MockServer::start_async().await;
        let m = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/orders").header("x-request-tag", "1");
                then.status(200).json_body(serde_json::json!({"id": "order_1"}));
            })
            .await;

        let client = TracedClient::default();
        let req = client
            .request(reqwest::Method::POST, &server.url("/v1/orders"))
            .header("x-request-tag", "1")
            .build()
            .unwrap();
        let resp = client.execute(req).await.unwrap();
        assert!(resp.status().is_success());
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["id"], "order_1");
        m.assert_async().await;
    }

    #[tokio::test]
    async fn error_statuses_are_returned_not_raised() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404);
            })
            .await;
        let resp = TracedClient::default()
            .get(&server.url("/missing"))
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 404);
    }
}
