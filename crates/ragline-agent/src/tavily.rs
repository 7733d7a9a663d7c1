//! Tavily web search tool.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use ragline_core::{Error, Result};

use crate::tool::Tool;

const SEARCH_URL: &str = "https://api.tavily.com/search";

pub struct TavilySearch {
    client: Client,
    api_key: String,
    max_results: usize,
}

impl TavilySearch {
    pub fn new(client: Client, api_key: impl Into<String>, max_results: usize) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            max_results,
        }
    }
}

#[async_trait]
impl Tool for TavilySearch {
    fn name(&self) -> &str {
        "tavily_search"
    }

    fn description(&self) -> &str {
        "Search the web for up-to-date information. Input is a search query."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query",
                },
            },
            "required": ["query"],
        })
    }

    async fn call(&self, arguments: serde_json::Value) -> Result<String> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| Error::BadRequest("search tool requires a 'query' string".into()))?;

        let body = json!({
            "api_key": self.api_key,
            "query": query,
            "max_results": self.max_results,
        });

        let response = self
            .client
            .post(SEARCH_URL)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::upstream(format!("Tavily request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::upstream_status(
                status.as_u16(),
                format!("Tavily API error {}: {}", status, text),
            ));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::upstream(format!("Tavily response decode failed: {}", e)))?;

        // Hand the raw results array back to the model as text.
        Ok(parsed["results"].to_string())
    }
}
