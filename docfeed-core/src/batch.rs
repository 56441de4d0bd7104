//! Batched document upload.
//!
//! The indexing service accepts at most [`MAX_BATCH_SIZE`] documents per
//! batch-put call. [`BatchUploader`] keeps exactly one open batch: `add`
//! submits the open batch first whenever it is already full, so the bound is
//! enforced strictly before it would be exceeded, and `flush` submits whatever
//! non-empty remainder is left once the source is exhausted.
//!
//! A failed submission is logged and counted, not propagated: the run
//! continues and the counters surface the loss in the final report.

use tracing::{error, info};

use crate::contract::IndexClient;
use crate::document::NormalizedDocument;
use crate::sync::SyncJobContext;

/// Hard upper bound on documents per batch-put call.
pub const MAX_BATCH_SIZE: usize = 10;

pub struct BatchUploader<'a, C: IndexClient + ?Sized> {
    client: &'a C,
    context: &'a SyncJobContext,
    open: Vec<NormalizedDocument>,
    submitted_batches: usize,
    submitted_documents: usize,
    failed_batches: usize,
}

impl<'a, C: IndexClient + ?Sized> BatchUploader<'a, C> {
    pub fn new(client: &'a C, context: &'a SyncJobContext) -> Self {
        Self {
            client,
            context,
            open: Vec::new(),
            submitted_batches: 0,
            submitted_documents: 0,
            failed_batches: 0,
        }
    }

    /// Place a document into the open batch, submitting the batch first if it
    /// is already at the bound.
    pub async fn add(&mut self, document: NormalizedDocument) {
        if self.open.len() >= MAX_BATCH_SIZE {
            self.submit_open().await;
        }
        self.open.push(document);
    }

    /// Submit the open batch if non-empty. No-op on an empty batch.
    pub async fn flush(&mut self) {
        if !self.open.is_empty() {
            self.submit_open().await;
        }
    }

    pub fn submitted_batches(&self) -> usize {
        self.submitted_batches
    }

    pub fn submitted_documents(&self) -> usize {
        self.submitted_documents
    }

    pub fn failed_batches(&self) -> usize {
        self.failed_batches
    }

    async fn submit_open(&mut self) {
        let batch = std::mem::take(&mut self.open);
        let size = batch.len();
        match self.client.batch_put_document(self.context, &batch).await {
            Ok(()) => {
                self.submitted_batches += 1;
                self.submitted_documents += size;
                info!(
                    documents = size,
                    execution_id = %self.context.execution_id,
                    "Submitted document batch"
                );
            }
            Err(e) => {
                self.failed_batches += 1;
                error!(
                    error = %e,
                    documents = size,
                    execution_id = %self.context.execution_id,
                    "Batch submission failed, continuing with remaining documents"
                );
            }
        }
    }
}
