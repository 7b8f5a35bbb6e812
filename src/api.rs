use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Startup news summary served by `GET /api/briefing`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Briefing {
    // `null` and a missing key both mean "no data yet"
    #[serde(default)]
    categories: Option<Vec<Category>>,
}

impl Briefing {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories: Some(categories),
        }
    }

    pub fn categories(&self) -> &[Category] {
        self.categories.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Article {
    pub zh_title: String,
    pub takeaway: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

/// The two calls the client makes against the news backend.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn briefing(&self) -> Result<Briefing>;
    async fn chat(&self, message: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct NewsClient {
    client: Client,
    base_url: String,
}

impl NewsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Client whose requests fail after `timeout`; `None` waits forever.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build().context("building HTTP client")?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_briefing(&self) -> Result<Briefing> {
        let url = format!("{}/api/briefing", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("briefing request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("briefing request returned {}", response.status()));
        }

        let briefing: Briefing = response
            .json()
            .await
            .context("briefing response was not valid JSON")?;
        Ok(briefing)
    }

    pub async fn send_chat(&self, message: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await
            .context("chat request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("chat request returned {}: {}", status, text));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("chat response was not valid JSON")?;
        Ok(chat_response.response)
    }
}

#[async_trait]
impl Backend for NewsClient {
    async fn briefing(&self) -> Result<Briefing> {
        self.fetch_briefing().await
    }

    async fn chat(&self, message: &str) -> Result<String> {
        self.send_chat(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_null_categories_mean_empty() {
        let missing: Briefing = serde_json::from_str("{}").unwrap();
        assert!(missing.categories().is_empty());

        let null: Briefing = serde_json::from_str(r#"{"categories":null}"#).unwrap();
        assert!(null.categories().is_empty());
    }

    #[test]
    fn category_without_articles_parses() {
        let briefing: Briefing =
            serde_json::from_str(r#"{"categories":[{"name":"Tech"}]}"#).unwrap();
        assert_eq!(briefing.categories()[0].name, "Tech");
        assert!(briefing.categories()[0].articles.is_empty());
    }

    #[test]
    fn article_without_takeaway_is_rejected() {
        let result = serde_json::from_str::<Briefing>(
            r#"{"categories":[{"name":"Tech","articles":[{"zh_title":"A"}]}]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let client = NewsClient::new("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }
}
