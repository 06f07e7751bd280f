pub mod pipeline;
pub mod session;
pub mod types;

pub use pipeline::{ProgressFn, UploadPipeline};
pub use session::UploadSession;
pub use types::{UploadOutcome, UploadProgress, UploadRequest};
