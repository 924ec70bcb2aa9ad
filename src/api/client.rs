use super::types::BaseResponse;
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// HTTP client for the interview platform backend.
///
/// Every endpoint answers with a [`BaseResponse`] envelope; the typed endpoint
/// wrappers live next to the features that use them (`catalog`, `interview`).
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Builds a client that forwards an existing login session cookie.
    pub fn with_session_cookie(base_url: &str, cookie: &str) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(cookie)
            .map_err(|e| ApiError::Decode(format!("Invalid session cookie: {}", e)))?;
        headers.insert(COOKIE, value);

        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> ApiResult<Self> {
        match config.session_cookie.as_deref() {
            Some(cookie) if !cookie.is_empty() => Self::with_session_cookie(&config.base_url, cookie),
            _ => Ok(Self::new(&config.base_url)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T, Q>(&self, path: &str, query: &Q) -> ApiResult<BaseResponse<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.client.get(&url).query(query).send().await?;
        read_envelope(response).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> ApiResult<BaseResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self.client.post(&url).json(body).send().await?;
        read_envelope(response).await
    }
}

async fn read_envelope<T: DeserializeOwned>(response: Response) -> ApiResult<BaseResponse<T>> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status(status));
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_unwraps_envelope() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/question/get/vo"))
            .and(query_param("id", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": { "title": "What is ownership?" },
                "message": "ok"
            })))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&mock_server.uri());
        let response: BaseResponse<Value> = client
            .get("/api/question/get/vo", &[("id", "42")])
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.into_data("question").unwrap()["title"], "What is ownership?");
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/questionBank/list/page/vo"))
            .and(body_json(json!({ "pageSize": 12 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": { "records": [], "total": 0 }
            })))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&mock_server.uri());
        let response: BaseResponse<Value> = client
            .post("/api/questionBank/list/page/vo", &json!({ "pageSize": 12 }))
            .await
            .unwrap();

        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/question/get/vo"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&mock_server.uri());
        let result: ApiResult<BaseResponse<Value>> =
            client.get("/api/question/get/vo", &[("id", "1")]).await;

        match result {
            Err(ApiError::Status(status)) => assert_eq!(status.as_u16(), 500),
            other => panic!("unexpected result: {:?}", other.map(|r| r.code)),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/question/get/vo"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(&mock_server.uri());
        let result: ApiResult<BaseResponse<Value>> =
            client.get("/api/question/get/vo", &[("id", "1")]).await;

        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn test_handle_connection_error() {
        // Use a port that's guaranteed not to be listening
        let client = ApiClient::new("http://127.0.0.1:59999");
        let result: ApiResult<BaseResponse<Value>> =
            client.get("/api/question/get/vo", &[("id", "1")]).await;

        assert!(matches!(result, Err(ApiError::Network(_))));
    }

    #[tokio::test]
    async fn test_session_cookie_is_forwarded() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/question/get/vo"))
            .and(header("cookie", "user=abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": 0, "data": {} })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ApiClient::with_session_cookie(&mock_server.uri(), "user=abc123").unwrap();
        let response: BaseResponse<Value> = client
            .get("/api/question/get/vo", &[("id", "1")])
            .await
            .unwrap();

        assert!(response.is_success());
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8101/");
        assert_eq!(client.base_url(), "http://localhost:8101");
    }
}
