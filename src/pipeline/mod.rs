//! Capture-to-result pipeline: image producer, liveness and worker.

mod liveness;
mod source;
mod worker;

pub use liveness::{ViewLifetime, ViewToken};
pub use source::{CapturedImage, collect_input_files, spawn_file_source};
pub use worker::{PendingClassification, WorkerHandle, WorkerStats, spawn_worker};
