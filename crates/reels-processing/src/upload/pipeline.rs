//! Chunked upload pipeline
//!
//! One entry point drives the whole ingest path: validate, create the draft
//! record, push chunks sequentially with bounded retries, compose the final
//! object, then enqueue post-processing jobs in a single batch. The draft
//! record is the anchor: if anything after its creation fails, the record is
//! flipped to `failed` so a stuck `pending` row is never left behind.

use std::sync::Arc;

use reels_core::models::{
    ContentStatus, JobPayload, NewJob, Priority, ProcessingJob, ThumbnailPayload,
    TranscodePayload, TranscribePayload,
};
use reels_core::{AppError, ReelsConfig};
use reels_db::ports::{ContentStore, JobStore};
use reels_storage::{keys, Storage};

use crate::upload::session::UploadSession;
use crate::upload::{UploadOutcome, UploadProgress, UploadRequest};
use crate::validator::{extract_extension, UploadValidator};

/// Callback invoked after each committed chunk.
pub type ProgressFn = dyn Fn(UploadProgress) + Send + Sync;

pub struct UploadPipeline {
    storage: Arc<dyn Storage>,
    content: Arc<dyn ContentStore>,
    jobs: Arc<dyn JobStore>,
    validator: UploadValidator,
    chunk_size_bytes: usize,
    max_chunk_retries: u32,
    generate_thumbnails: bool,
    auto_transcribe: bool,
}

impl UploadPipeline {
    pub fn new(
        storage: Arc<dyn Storage>,
        content: Arc<dyn ContentStore>,
        jobs: Arc<dyn JobStore>,
        config: &ReelsConfig,
    ) -> Self {
        Self {
            storage,
            content,
            jobs,
            validator: UploadValidator::new(config),
            chunk_size_bytes: config.chunk_size_bytes,
            max_chunk_retries: config.max_chunk_retries,
            generate_thumbnails: config.generate_thumbnails,
            auto_transcribe: config.auto_transcribe,
        }
    }

    /// Run the full pipeline for one file.
    #[tracing::instrument(skip(self, request, on_progress), fields(
        filename = %request.filename,
        size_bytes = request.data.len()
    ))]
    pub async fn upload(
        &self,
        request: UploadRequest,
        on_progress: Option<&ProgressFn>,
    ) -> Result<UploadOutcome, AppError> {
        self.validator.validate(&request)?;

        let extension = extract_extension(&request.filename).ok_or_else(|| {
            AppError::InvalidInput(format!("Filename '{}' has no extension", request.filename))
        })?;
        let total_bytes = request.data.len() as i64;
        let content_type = request.metadata.content_type.clone();

        let mut metadata = request.metadata;
        metadata.file_size = total_bytes;
        let draft = self.content.create_draft(metadata).await?;
        tracing::info!(video_id = %draft.id, "Draft content record created");

        // Everything past the draft insert goes through one fallible path so
        // that a failure at any step flips the anchor record to failed.
        match self
            .transfer_and_finalize(
                draft.id,
                &extension,
                request.data,
                &content_type,
                total_bytes,
                on_progress,
            )
            .await
        {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                // Mark the anchor failed; the original error wins even if the
                // status write also fails.
                if let Err(status_err) = self
                    .content
                    .set_status(draft.id, ContentStatus::Failed)
                    .await
                {
                    tracing::error!(
                        video_id = %draft.id,
                        error = ?status_err,
                        "Failed to mark content as failed"
                    );
                }
                tracing::error!(video_id = %draft.id, error = ?e, "Upload failed");
                Err(e)
            }
        }
    }

    /// Transfer the bytes, persist the storage location, mark the record
    /// pending, and enqueue the processing jobs.
    async fn transfer_and_finalize(
        &self,
        video_id: uuid::Uuid,
        extension: &str,
        data: bytes::Bytes,
        content_type: &str,
        total_bytes: i64,
        on_progress: Option<&ProgressFn>,
    ) -> Result<UploadOutcome, AppError> {
        let (storage_key, storage_url, chunks_uploaded) = self
            .transfer(video_id, extension, data, content_type, on_progress)
            .await?;
        let content = self
            .content
            .set_storage(video_id, &storage_key, &storage_url, total_bytes)
            .await?;
        let content = self.content.set_status(content.id, ContentStatus::Pending).await?;
        let jobs = self.enqueue_jobs(&content.id, &storage_key).await?;
        tracing::info!(
            video_id = %content.id,
            chunks = chunks_uploaded,
            jobs = jobs.len(),
            "Upload finalized"
        );
        Ok(UploadOutcome {
            content,
            jobs,
            chunks_uploaded,
        })
    }

    /// Push all chunks, compose the final object, clean up the chunks.
    async fn transfer(
        &self,
        video_id: uuid::Uuid,
        extension: &str,
        data: bytes::Bytes,
        content_type: &str,
        on_progress: Option<&ProgressFn>,
    ) -> Result<(String, String, u32), AppError> {
        let mut session = UploadSession::new(data, self.chunk_size_bytes);
        let total_chunks = session.total_chunks();
        let mut chunk_keys = Vec::with_capacity(total_chunks as usize);

        for index in 0..total_chunks {
            let chunk = session.chunk(index).ok_or_else(|| {
                AppError::Internal(format!("Chunk {} out of range", index))
            })?;
            let key = keys::chunk_key(video_id, index as usize);
            self.upload_chunk_with_retry(&key, chunk, content_type).await?;
            chunk_keys.push(key);
            let progress = session.commit_chunk();
            tracing::debug!(
                video_id = %video_id,
                chunk = index + 1,
                total = total_chunks,
                percent = progress.percent,
                "Chunk committed"
            );
            if let Some(callback) = on_progress {
                callback(progress);
            }
        }

        let final_key = keys::final_key(video_id, extension);
        let url = self
            .storage
            .compose(&chunk_keys, &final_key, content_type)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        // Chunks are garbage once composed; a failed delete is only noise.
        for key in &chunk_keys {
            if let Err(e) = self.storage.delete(key).await {
                tracing::warn!(key = %key, error = ?e, "Failed to delete upload chunk");
            }
        }

        Ok((final_key, url, total_chunks))
    }

    async fn upload_chunk_with_retry(
        &self,
        key: &str,
        chunk: bytes::Bytes,
        content_type: &str,
    ) -> Result<(), AppError> {
        let max_attempts = self.max_chunk_retries.max(1);
        let mut last_error = None;
        for attempt in 1..=max_attempts {
            match self
                .storage
                .upload_with_key(key, chunk.clone(), content_type)
                .await
            {
                Ok(_) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        key = %key,
                        attempt,
                        max_attempts,
                        error = ?e,
                        "Chunk upload attempt failed"
                    );
                    last_error = Some(e);
                }
            }
        }
        Err(AppError::Storage(format!(
            "Chunk {} failed after {} attempts: {}",
            key,
            max_attempts,
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string())
        )))
    }

    /// One batch insert so workers never observe a partial job set.
    async fn enqueue_jobs(
        &self,
        video_id: &uuid::Uuid,
        storage_key: &str,
    ) -> Result<Vec<ProcessingJob>, AppError> {
        let mut batch = vec![NewJob {
            video_id: *video_id,
            job_type: TranscodePayload::job_type(),
            priority: Priority::High,
            payload: ProcessingJob::payload_from(&TranscodePayload {
                video_id: *video_id,
                storage_key: storage_key.to_string(),
            }),
        }];
        if self.generate_thumbnails {
            batch.push(NewJob {
                video_id: *video_id,
                job_type: ThumbnailPayload::job_type(),
                priority: Priority::Normal,
                payload: ProcessingJob::payload_from(&ThumbnailPayload {
                    video_id: *video_id,
                    storage_key: storage_key.to_string(),
                }),
            });
        }
        if self.auto_transcribe {
            batch.push(NewJob {
                video_id: *video_id,
                job_type: TranscribePayload::job_type(),
                priority: Priority::Low,
                payload: ProcessingJob::payload_from(&TranscribePayload {
                    video_id: *video_id,
                    storage_key: storage_key.to_string(),
                    language: None,
                }),
            });
        }
        self.jobs.create_batch(batch).await
    }
}
