use serde::Deserialize;

use super::client::UpstreamClient;
use super::error::FetchError;

#[derive(Debug, Deserialize)]
struct Viewer {
    login: String,
}

/// Look up the login of the token's owner, for reviewer matching when the
/// caller did not say who they are
pub async fn fetch_viewer_login(client: &UpstreamClient, token: &str) -> Result<String, FetchError> {
    client
        .get_json::<Viewer>(&client.viewer_url(), token)
        .await
        .map(|response| response.body.login)
        .map_err(FetchError::into_auth_if_bad_credentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::client::test_client;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_viewer_login() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer my-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"login": "alice", "id": 42})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        assert_eq!(fetch_viewer_login(&client, "my-token").await.unwrap(), "alice");
    }

    #[tokio::test]
    async fn test_fetch_viewer_login_bad_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = fetch_viewer_login(&client, "stale").await;
        assert!(matches!(result, Err(FetchError::Auth { .. })));
    }
}
