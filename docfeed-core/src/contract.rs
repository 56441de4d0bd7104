//! # contract: interfaces between the orchestrator and its collaborators
//!
//! This module defines the trait seams the sync orchestrator depends on:
//! [`TokenProvider`] for credential acquisition, [`SourceAdapter`] for the
//! remote content source, and [`IndexClient`] for the indexing service.
//!
//! ## Interface & Extensibility
//! - Implement [`SourceAdapter`] to connect a new source; the orchestrator
//!   never learns which source it is driving.
//! - Implement [`IndexClient`] to target a different indexing backend.
//! - All async methods return typed errors; see each error enum for variants.
//!
//! ## Mocking & Testing
//! - The traits are annotated for `mockall` so consumers can generate
//!   deterministic mocks for unit/integration tests (exported by default via
//!   the `test-export-mocks` feature).

use async_trait::async_trait;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::auth::{AuthError, Credential};
use crate::client::IndexError;
use crate::document::NormalizedDocument;
use crate::source::{FetchError, ListingError, RemoteDocumentRef};
use crate::sync::{JobTarget, SyncJobContext};

/// Trait for obtaining a bearer credential for the content source.
///
/// A run acquires the credential once up front and shares it read-only with
/// every fetch; providers may cache internally (see `auth::CachedTokenProvider`).
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Acquire a usable, non-expired credential.
    async fn acquire_token(&self) -> Result<Credential, AuthError>;
}

/// Trait for one concrete content source: enumeration, content retrieval and
/// normalisation into the canonical document shape.
///
/// `normalize` is pure: it receives already-fetched bytes plus the listing
/// entry and performs no I/O.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Enumerate the documents the source currently holds.
    async fn list_documents(
        &self,
        credential: &Credential,
    ) -> Result<Vec<RemoteDocumentRef>, ListingError>;

    /// Fetch one document's binary content, fully into memory.
    async fn fetch_content(
        &self,
        credential: &Credential,
        document: &RemoteDocumentRef,
    ) -> Result<Vec<u8>, FetchError>;

    /// Shape a listing entry plus its fetched bytes into the canonical document.
    fn normalize(&self, document: &RemoteDocumentRef, content: Vec<u8>) -> NormalizedDocument;
}

/// Trait for the indexing service's sync-job surface.
///
/// The service assigns the job-execution identifier at start; every batch put
/// must carry it. Implemented by the HTTP client and by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait IndexClient: Send + Sync {
    /// Start a data-source sync job, returning the assigned execution id.
    async fn start_sync_job(&self, target: &JobTarget) -> Result<String, IndexError>;

    /// Submit one batch (at most `batch::MAX_BATCH_SIZE` documents), tagged
    /// with the active job's identity.
    async fn batch_put_document(
        &self,
        context: &SyncJobContext,
        documents: &[NormalizedDocument],
    ) -> Result<(), IndexError>;

    /// Stop the data-source sync job.
    async fn stop_sync_job(&self, target: &JobTarget) -> Result<(), IndexError>;
}
