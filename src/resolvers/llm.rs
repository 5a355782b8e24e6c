use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AnswerConfig;
use crate::resolvers::ResolverError;

/// Returned whenever the answer backend is unreachable, slow, or confused.
pub const FALLBACK_ANSWER: &str =
    "Sorry, I'm having trouble thinking right now. Please try again later.";

#[derive(Debug, Serialize)]
struct AnswerRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnswerResponse {
    response: String,
}

/// Client for the generative answer backend: POST a prompt, get back text.
pub struct LlmClient {
    client: reqwest::Client,
    config: AnswerConfig,
}

impl LlmClient {
    pub fn new(config: AnswerConfig) -> Self {
        // 20s: generation is slow, but a mention cycle must not hang on it.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, config }
    }

    pub async fn fetch_answer(&self, prompt: &str) -> Result<String, ResolverError> {
        debug!("Requesting answer, prompt length: {} chars", prompt.len());

        let mut request = self.client.post(&self.config.url).json(&AnswerRequest { prompt });
        if let Some(key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::Status(status.as_u16()));
        }

        let payload: AnswerResponse = response
            .json()
            .await
            .map_err(|e| ResolverError::Malformed(e.to_string()))?;

        Ok(payload.response)
    }

    /// Like [`fetch_answer`](Self::fetch_answer), but degrades every failure
    /// to [`FALLBACK_ANSWER`] so the pipeline never branches on backend
    /// health.
    pub async fn answer_or_fallback(&self, prompt: &str) -> String {
        match self.fetch_answer(prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Answer backend failed, using fallback: {}", e);
                FALLBACK_ANSWER.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(url: &str, api_key: Option<&str>) -> LlmClient {
        LlmClient::new(AnswerConfig {
            url: format!("{}/generate", url),
            api_key: api_key.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_answer_roundtrip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(body_json(json!({"prompt": "Why is the sky blue?"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": "Rayleigh scattering."})),
            )
            .mount(&server)
            .await;

        let answer = client(&server.uri(), None)
            .fetch_answer("Why is the sky blue?")
            .await
            .unwrap();
        assert_eq!(answer, "Rayleigh scattering.");
    }

    #[tokio::test]
    async fn test_bearer_key_sent_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(header("Authorization", "Bearer sk-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "ok"})))
            .mount(&server)
            .await;

        let answer = client(&server.uri(), Some("sk-123"))
            .fetch_answer("hi")
            .await
            .unwrap();
        assert_eq!(answer, "ok");
    }

    #[tokio::test]
    async fn test_error_status_maps_to_kind() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client(&server.uri(), None).fetch_answer("hi").await.unwrap_err();
        assert!(matches!(err, ResolverError::Status(502)));
    }

    #[tokio::test]
    async fn test_fallback_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let answer = client(&server.uri(), None).answer_or_fallback("hi").await;
        assert_eq!(answer, FALLBACK_ANSWER);
    }
}
