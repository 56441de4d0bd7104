//! HTTP client for the indexing service's sync-job surface.
//!
//! The service is a remote API with three operations: start a data-source sync
//! job (which assigns the execution id), batch-put documents under that id,
//! and stop the job. This client speaks JSON over HTTP with an api-key header;
//! swap in another [`IndexClient`] implementation for a different backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::contract::IndexClient;
use crate::document::NormalizedDocument;
use crate::sync::{JobTarget, SyncJobContext};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("request to indexing service failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("indexing service returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("could not parse indexing service response: {0}")]
    Parse(#[from] serde_json::Error),
}

pub struct HttpIndexClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JobRequest<'a> {
    application_id: &'a str,
    data_source_id: &'a str,
    index_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartSyncJobResponse {
    execution_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchPutDocumentRequest<'a> {
    application_id: &'a str,
    data_source_sync_id: &'a str,
    index_id: &'a str,
    documents: &'a [NormalizedDocument],
}

impl HttpIndexClient {
    pub fn new(http: reqwest::Client, endpoint: String, api_key: String) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<String, IndexError> {
        let url = format!("{}{}", self.endpoint, path);
        debug!(url = %url, "Calling indexing service");
        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(IndexError::Status { status, body: text });
        }
        Ok(text)
    }
}

#[async_trait]
impl IndexClient for HttpIndexClient {
    async fn start_sync_job(&self, target: &JobTarget) -> Result<String, IndexError> {
        let request = JobRequest {
            application_id: &target.application_id,
            data_source_id: &target.data_source_id,
            index_id: &target.index_id,
        };
        let body = self.post_json("/sync-jobs/start", &request).await?;
        let response: StartSyncJobResponse = serde_json::from_str(&body)?;
        Ok(response.execution_id)
    }

    async fn batch_put_document(
        &self,
        context: &SyncJobContext,
        documents: &[NormalizedDocument],
    ) -> Result<(), IndexError> {
        let request = BatchPutDocumentRequest {
            application_id: &context.application_id,
            data_source_sync_id: &context.execution_id,
            index_id: &context.index_id,
            documents,
        };
        self.post_json("/documents/batch", &request).await?;
        Ok(())
    }

    async fn stop_sync_job(&self, target: &JobTarget) -> Result<(), IndexError> {
        let request = JobRequest {
            application_id: &target.application_id,
            data_source_id: &target.data_source_id,
            index_id: &target.index_id,
        };
        self.post_json("/sync-jobs/stop", &request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ContentType, DocumentAttribute, DocumentContent};

    #[test]
    fn start_response_parses_execution_id() {
        let body = r#"{ "executionId": "exec-42" }"#;
        let response: StartSyncJobResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.execution_id, "exec-42");
    }

    #[test]
    fn batch_request_serialises_job_identity_and_documents() {
        let context = SyncJobContext {
            application_id: "app-1".into(),
            data_source_id: "ds-1".into(),
            index_id: "idx-1".into(),
            execution_id: "exec-7".into(),
        };
        let documents = vec![NormalizedDocument {
            id: "a.pdf".into(),
            content_type: ContentType::Pdf,
            title: "a.pdf".into(),
            content: DocumentContent {
                blob: b"%PDF".to_vec(),
            },
            attributes: vec![DocumentAttribute::string("_category", "Documents")],
        }];
        let request = BatchPutDocumentRequest {
            application_id: &context.application_id,
            data_source_sync_id: &context.execution_id,
            index_id: &context.index_id,
            documents: &documents,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["applicationId"], "app-1");
        assert_eq!(value["dataSourceSyncId"], "exec-7");
        assert_eq!(value["indexId"], "idx-1");
        assert_eq!(value["documents"][0]["id"], "a.pdf");
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let client = HttpIndexClient::new(
            reqwest::Client::new(),
            "https://index.example.com/".into(),
            "key".into(),
        );
        assert_eq!(client.endpoint, "https://index.example.com");
    }
}
