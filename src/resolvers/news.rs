use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::NewsConfig;
use crate::resolvers::{Article, ResolverError};

#[derive(Debug, Deserialize)]
struct HeadlinesResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

// Titles and urls are nullable in the NewsAPI payload; entries missing
// either are dropped.
#[derive(Debug, Deserialize)]
struct RawArticle {
    title: Option<String>,
    url: Option<String>,
}

/// NewsAPI top-headlines client
pub struct NewsClient {
    client: reqwest::Client,
    config: NewsConfig,
}

impl NewsClient {
    pub fn new(config: NewsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, config }
    }

    /// Top US headlines, optionally filtered by a free-text topic.
    pub async fn fetch_headlines(
        &self,
        topic: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Article>, ResolverError> {
        let url = format!("{}/v2/top-headlines", self.config.base_url);

        let mut query: Vec<(&str, String)> = vec![
            ("apiKey", self.config.api_key.clone()),
            ("country", "us".to_string()),
            ("pageSize", limit.to_string()),
        ];
        if let Some(topic) = topic {
            query.push(("q", topic.to_string()));
        }

        debug!("Fetching headlines, topic: {:?}", topic);

        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::Status(status.as_u16()));
        }

        let payload: HeadlinesResponse = response
            .json()
            .await
            .map_err(|e| ResolverError::Malformed(e.to_string()))?;

        Ok(payload
            .articles
            .into_iter()
            .filter_map(|a| match (a.title, a.url) {
                (Some(title), Some(url)) => Some(Article { title, url }),
                _ => None,
            })
            .collect())
    }

    /// Like [`fetch_headlines`](Self::fetch_headlines), but degrades every
    /// failure to an empty list. "No headlines" is a user-facing outcome
    /// ("couldn't find news on that topic"), not a pipeline failure.
    pub async fn headlines_or_empty(&self, topic: Option<&str>, limit: u32) -> Vec<Article> {
        match self.fetch_headlines(topic, limit).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!("Headline fetch failed, treating as no results: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str) -> NewsClient {
        NewsClient::new(NewsConfig {
            base_url: base_url.to_string(),
            api_key: "news-key".to_string(),
        })
    }

    #[tokio::test]
    async fn test_headlines_parse_and_filter_incomplete() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .and(query_param("q", "chicago"))
            .and(query_param("country", "us"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "articles": [
                    {"title": "Big story", "url": "https://example.com/a"},
                    {"title": "No url here", "url": null},
                    {"title": "Second story", "url": "https://example.com/b"}
                ]
            })))
            .mount(&server)
            .await;

        let articles = client(&server.uri())
            .fetch_headlines(Some("chicago"), 3)
            .await
            .unwrap();

        assert_eq!(
            articles,
            vec![
                Article {
                    title: "Big story".to_string(),
                    url: "https://example.com/a".to_string()
                },
                Article {
                    title: "Second story".to_string(),
                    url: "https://example.com/b".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_error_status_maps_to_kind() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .fetch_headlines(None, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolverError::Status(500)));
    }

    #[tokio::test]
    async fn test_malformed_payload_maps_to_kind() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .fetch_headlines(None, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolverError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_or_empty_degrades_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let articles = client(&server.uri()).headlines_or_empty(None, 3).await;
        assert!(articles.is_empty());
    }
}
