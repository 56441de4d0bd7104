//! High-level pipeline: orchestrates one tracked sync job end to end.
//!
//! This module provides the top-level orchestration for feeding a content
//! source into the indexing service under a single sync job. It implements a
//! coordinated pipeline that:
//!   - Starts a data-source sync job and captures the assigned execution id
//!   - Acquires a source credential once for the whole run
//!   - Lists remote documents and, per document: paces, fetches, normalises,
//!     and feeds the result into the batch uploader
//!   - Flushes the final partial batch
//!   - Stops the sync job on every exit path once it has been started
//!
//! # Major Types
//! - [`JobTarget`]: the {application, data source, index} identity of the job
//! - [`SyncJobContext`]: that identity plus the service-assigned execution id
//! - [`SyncReport`]: per-run counters for downstream audit
//!
//! # Responsibilities
//! - The stop call is the one non-negotiable ordering guarantee: whenever the
//!   start call succeeded, stop is attempted exactly once, regardless of
//!   pipeline completion, error, panic, or deadline expiry.
//! - Per-document fetch failures are skipped and counted, not propagated;
//!   credential or listing failures end the pipeline early (stop still runs).
//! - Invokes logging throughout for traceability (see tracing events)
//!
//! # Callable From
//! - Used by the CLI crate and by integration tests, with any combination of
//!   real or mock [`TokenProvider`] / [`SourceAdapter`] / [`IndexClient`]
//!
//! # Error Handling
//! Only a failed start aborts before any pipeline work: with no execution id
//! there is nothing to tag batches with and nothing to stop.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::auth::AuthError;
use crate::batch::BatchUploader;
use crate::client::IndexError;
use crate::contract::{IndexClient, SourceAdapter, TokenProvider};
use crate::ratelimit::RequestPacer;
use crate::source::ListingError;

/// Identity of one data-source sync job on the indexing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTarget {
    pub application_id: String,
    pub data_source_id: String,
    pub index_id: String,
}

/// One sync run's identity: the target plus the execution id assigned at
/// start. Created after a successful start, immutable, discarded after stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncJobContext {
    pub application_id: String,
    pub data_source_id: String,
    pub index_id: String,
    pub execution_id: String,
}

impl SyncJobContext {
    fn for_run(target: &JobTarget, execution_id: String) -> Self {
        Self {
            application_id: target.application_id.clone(),
            data_source_id: target.data_source_id.clone(),
            index_id: target.index_id.clone(),
            execution_id,
        }
    }
}

/// What one run did, for logging and audit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub documents_listed: usize,
    pub documents_uploaded: usize,
    pub documents_skipped: usize,
    pub batches_submitted: usize,
    pub batches_failed: usize,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("could not start sync job: {0}")]
    JobStart(#[source] IndexError),
    #[error("could not acquire a source credential: {0}")]
    Auth(#[from] AuthError),
    #[error("could not list remote documents: {0}")]
    Listing(#[from] ListingError),
    #[error("sync run exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),
    #[error("sync pipeline panicked")]
    Panicked,
}

/// Run one complete sync job against the indexing service.
///
/// Starts the job, drives credential→list→fetch→normalise→batch to completion
/// under the optional `deadline`, and stops the job afterwards whatever the
/// pipeline's outcome. A stop failure is logged and never masks the pipeline
/// result.
pub async fn run_sync<P, S, C>(
    target: &JobTarget,
    provider: &P,
    source: &S,
    client: &C,
    pacer: &RequestPacer,
    deadline: Option<Duration>,
) -> Result<SyncReport, SyncError>
where
    P: TokenProvider + ?Sized,
    S: SourceAdapter + ?Sized,
    C: IndexClient + ?Sized,
{
    info!(
        application_id = %target.application_id,
        data_source_id = %target.data_source_id,
        index_id = %target.index_id,
        "Starting data source sync job"
    );
    let execution_id = client
        .start_sync_job(target)
        .await
        .map_err(SyncError::JobStart)?;
    info!(execution_id = %execution_id, "Sync job started");
    let context = SyncJobContext::for_run(target, execution_id);

    // The pipeline runs guarded so that a panic or an expired deadline still
    // reaches the stop call below.
    let guarded = AssertUnwindSafe(run_pipeline(&context, provider, source, client, pacer))
        .catch_unwind();
    let outcome: Result<SyncReport, SyncError> = match deadline {
        Some(limit) => match tokio::time::timeout(limit, guarded).await {
            Err(_) => Err(SyncError::DeadlineExceeded(limit)),
            Ok(Err(_panic)) => Err(SyncError::Panicked),
            Ok(Ok(result)) => result,
        },
        None => match guarded.await {
            Err(_panic) => Err(SyncError::Panicked),
            Ok(result) => result,
        },
    };

    info!(execution_id = %context.execution_id, "Stopping data source sync job");
    if let Err(e) = client.stop_sync_job(target).await {
        error!(error = %e, "Could not stop sync job");
    }

    match &outcome {
        Ok(report) => info!(?report, "Sync run complete"),
        Err(e) => error!(error = %e, "Sync run failed"),
    }
    outcome
}

async fn run_pipeline<P, S, C>(
    context: &SyncJobContext,
    provider: &P,
    source: &S,
    client: &C,
    pacer: &RequestPacer,
) -> Result<SyncReport, SyncError>
where
    P: TokenProvider + ?Sized,
    S: SourceAdapter + ?Sized,
    C: IndexClient + ?Sized,
{
    // One credential per run, shared read-only across all fetches.
    let credential = provider.acquire_token().await?;

    let references = source.list_documents(&credential).await?;
    info!(count = references.len(), "Found documents to ingest");

    let mut uploader = BatchUploader::new(client, context);
    let mut skipped = 0usize;
    for reference in &references {
        pacer.acquire().await;
        let content = match source.fetch_content(&credential, reference).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    document = %reference.name,
                    error = %e,
                    "Skipping document after fetch failure"
                );
                skipped += 1;
                continue;
            }
        };
        let document = source.normalize(reference, content);
        info!(document = %document.id, "Adding document to upload batch");
        uploader.add(document).await;
    }
    uploader.flush().await;

    Ok(SyncReport {
        documents_listed: references.len(),
        documents_uploaded: uploader.submitted_documents(),
        documents_skipped: skipped,
        batches_submitted: uploader.submitted_batches(),
        batches_failed: uploader.failed_batches(),
    })
}
