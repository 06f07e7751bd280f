//! Reels ingest processing
//!
//! Upload validation and the chunked upload pipeline that turns a raw file
//! plus catalog metadata into a finalized content record with queued
//! post-processing jobs.

pub mod upload;
pub mod validator;

pub use upload::{UploadOutcome, UploadPipeline, UploadProgress, UploadRequest};
pub use validator::UploadValidator;
