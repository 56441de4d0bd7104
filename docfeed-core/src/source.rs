//! Source fetching and normalisation.
//!
//! [`fetch_bytes`] is the single authenticated GET primitive: bearer header,
//! caller-supplied extra headers, full body into memory. [`HttpSource`] builds
//! the concrete [`SourceAdapter`] for a list-then-download HTTP source on top
//! of it. No retry or backoff at this layer; callers decide whether a failed
//! fetch aborts the run or skips the document.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::Credential;
use crate::config::SourceSettings;
use crate::contract::SourceAdapter;
use crate::document::{DocumentAttribute, DocumentContent, NormalizedDocument};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

#[derive(Debug, Error)]
pub enum ListingError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("could not parse document listing: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Lightweight descriptor of one document known to the source.
/// Produced by listing, consumed once per document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteDocumentRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ListDocumentsResponse {
    documents: Vec<RemoteDocumentRef>,
}

/// Authenticated GET returning the full response body as raw bytes.
pub async fn fetch_bytes(
    http: &reqwest::Client,
    credential: &Credential,
    url: &str,
    extra_headers: &HashMap<String, String>,
) -> Result<Vec<u8>, FetchError> {
    let mut request = http.get(url).bearer_auth(&credential.access_token);
    for (name, value) in extra_headers {
        request = request.header(name, value);
    }

    let response = request.send().await.map_err(|e| FetchError::Http {
        url: url.to_string(),
        source: e,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = response.bytes().await.map_err(|e| FetchError::Http {
        url: url.to_string(),
        source: e,
    })?;
    debug!(url, bytes = body.len(), "Fetched source content");
    Ok(body.to_vec())
}

/// Concrete adapter for a list-then-download HTTP source.
///
/// Listing: GET `<list_url>` returning `{ "documents": [ { "name": .. } ] }`.
/// Content: GET `<document_url>?name=<name>` returning raw bytes.
pub struct HttpSource {
    http: reqwest::Client,
    settings: SourceSettings,
}

impl HttpSource {
    pub fn new(http: reqwest::Client, settings: SourceSettings) -> Self {
        Self { http, settings }
    }
}

#[async_trait]
impl SourceAdapter for HttpSource {
    async fn list_documents(
        &self,
        credential: &Credential,
    ) -> Result<Vec<RemoteDocumentRef>, ListingError> {
        let body = fetch_bytes(
            &self.http,
            credential,
            &self.settings.list_url,
            &self.settings.extra_headers,
        )
        .await?;
        let listing: ListDocumentsResponse = serde_json::from_slice(&body)?;
        info!(
            list_url = %self.settings.list_url,
            count = listing.documents.len(),
            "Listed remote documents"
        );
        Ok(listing.documents)
    }

    async fn fetch_content(
        &self,
        credential: &Credential,
        document: &RemoteDocumentRef,
    ) -> Result<Vec<u8>, FetchError> {
        let url = format!("{}?name={}", self.settings.document_url, document.name);
        fetch_bytes(&self.http, credential, &url, &self.settings.extra_headers).await
    }

    fn normalize(&self, document: &RemoteDocumentRef, content: Vec<u8>) -> NormalizedDocument {
        NormalizedDocument {
            id: document.name.clone(),
            content_type: self.settings.content_type,
            title: document.name.clone(),
            content: DocumentContent { blob: content },
            attributes: vec![DocumentAttribute::string(
                "_category",
                self.settings.category.clone(),
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{AttributeValue, ContentType};

    fn settings() -> SourceSettings {
        SourceSettings {
            list_url: "http://127.0.0.1:5000/getListDocs".into(),
            document_url: "http://127.0.0.1:5000/getDoc".into(),
            category: "Sales Invoices".into(),
            content_type: ContentType::Pdf,
            extra_headers: HashMap::new(),
        }
    }

    #[test]
    fn listing_response_parses_names() {
        let body = br#"{ "documents": [ { "name": "a.pdf" }, { "name": "b.pdf" } ] }"#;
        let listing: ListDocumentsResponse = serde_json::from_slice(body).unwrap();
        let names: Vec<_> = listing.documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["a.pdf", "b.pdf"]);
    }

    #[test]
    fn normalize_derives_identity_from_name_and_attaches_category() {
        let source = HttpSource::new(reqwest::Client::new(), settings());
        let reference = RemoteDocumentRef {
            name: "1001.pdf".into(),
        };

        let document = source.normalize(&reference, b"%PDF-1.4 invoice".to_vec());

        assert_eq!(document.id, "1001.pdf");
        assert_eq!(document.title, "1001.pdf");
        assert_eq!(document.content_type, ContentType::Pdf);
        assert_eq!(document.content.blob, b"%PDF-1.4 invoice".to_vec());
        assert_eq!(document.attributes.len(), 1);
        assert_eq!(document.attributes[0].name, "_category");
        assert_eq!(
            document.attributes[0].value,
            AttributeValue::StringValue("Sales Invoices".into())
        );
    }
}
