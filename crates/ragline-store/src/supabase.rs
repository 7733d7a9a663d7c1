//! Supabase vector store client.
//!
//! Talks to a pre-provisioned `documents` table and `match_documents`
//! similarity RPC through the PostgREST API. Schema management is out of
//! scope; failures carry the raw response body.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use ragline_core::{Document, Error, Result, StoreConfig};

const TABLE_NAME: &str = "documents";
const QUERY_NAME: &str = "match_documents";

/// A row to upsert: chunk content, metadata, and its embedding.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRow {
    pub content: String,
    pub metadata: serde_json::Value,
    pub embedding: Vec<f32>,
}

/// One hit from the `match_documents` RPC.
#[derive(Debug, Deserialize)]
struct MatchRow {
    content: String,
    #[serde(default)]
    metadata: serde_json::Value,
    #[serde(default)]
    #[allow(dead_code)]
    similarity: Option<f64>,
}

pub struct SupabaseStore {
    client: Client,
    url: String,
    service_key: String,
}

impl SupabaseStore {
    pub fn new(client: Client, config: &StoreConfig) -> Self {
        Self {
            client,
            url: config.url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
        }
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.url, path)
    }

    /// Insert `(content, metadata, embedding)` rows into the documents table.
    pub async fn add_documents(&self, rows: &[DocumentRow]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        debug!("Inserting {} rows into {}", rows.len(), TABLE_NAME);

        let response = self
            .client
            .post(self.rest_url(TABLE_NAME))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await
            .map_err(|e| Error::Store(format!("insert request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Store(format!("insert failed ({}): {}", status, text)));
        }

        Ok(())
    }

    /// Similarity search via the `match_documents` RPC. Result order is the
    /// store's ranking order.
    pub async fn similarity_search(&self, embedding: &[f32], k: usize) -> Result<Vec<Document>> {
        let body = json!({
            "query_embedding": embedding,
            "match_count": k,
        });

        debug!("Similarity search, k={}", k);

        let response = self
            .client
            .post(self.rest_url(&format!("rpc/{}", QUERY_NAME)))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Store(format!("similarity search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Store(format!(
                "similarity search failed ({}): {}",
                status, text
            )));
        }

        let rows: Vec<MatchRow> = response
            .json()
            .await
            .map_err(|e| Error::Store(format!("similarity search decode failed: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|r| Document::new(r.content, r.metadata))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SupabaseStore {
        SupabaseStore::new(
            Client::new(),
            &StoreConfig {
                url: "https://example.supabase.co/".into(),
                service_key: "service-key".into(),
            },
        )
    }

    #[test]
    fn test_rest_url_trims_trailing_slash() {
        let store = store();
        assert_eq!(
            store.rest_url("documents"),
            "https://example.supabase.co/rest/v1/documents"
        );
        assert_eq!(
            store.rest_url("rpc/match_documents"),
            "https://example.supabase.co/rest/v1/rpc/match_documents"
        );
    }

    #[test]
    fn test_document_row_serialization() {
        let row = DocumentRow {
            content: "chunk text".into(),
            metadata: json!({"chunk": 0}),
            embedding: vec![0.1, 0.2],
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["content"], "chunk text");
        assert_eq!(value["metadata"]["chunk"], 0);
        assert_eq!(value["embedding"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_match_row_decodes_with_missing_metadata() {
        let row: MatchRow =
            serde_json::from_str(r#"{"content": "hello", "similarity": 0.9}"#).unwrap();
        assert_eq!(row.content, "hello");
        assert!(row.metadata.is_null());
    }
}
