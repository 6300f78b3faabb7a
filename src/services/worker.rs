//! Background worker for post-processing stored objects.
//!
//! Jobs are submitted fire-and-forget onto an in-process queue; a spawned
//! consumer task runs each job exactly once, with no retry. A job re-reads
//! the object's headers and records the byte size under `<id>:processed`
//! in the index. Failures never propagate to callers; they are folded into
//! the task's own result payload and logged.
//!
//! Nothing in the upload path enqueues jobs today. The queue exists as a
//! callable capability for future wiring.

use serde::Serialize;
use tokio::sync::mpsc;

use super::{kv_index::KvIndex, object_store::ObjectStore};

/// A queued post-processing job referencing an uploaded object.
#[derive(Debug, Clone)]
pub struct ProcessJob {
    pub file_id: String,
    pub folder: String,
}

/// Outcome of a single job run. Errors are a payload field, not a `Result`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TaskResult {
    Done { file_id: String, processed_size: i64 },
    Failed { error: String },
}

/// Run one post-processing job.
///
/// Reads the object's headers and writes the size under `<id>:processed`.
/// Any failure is returned as [`TaskResult::Failed`] and leaves the index
/// untouched.
pub async fn process_file(store: &ObjectStore, index: &KvIndex, job: &ProcessJob) -> TaskResult {
    let key = format!("{}/{}", job.folder, job.file_id);

    let stat = match store.stat_object(&key).await {
        Ok(stat) => stat,
        Err(err) => {
            return TaskResult::Failed {
                error: err.to_string(),
            };
        }
    };

    let result_key = format!("{}:processed", job.file_id);
    if let Err(err) = index.set(&result_key, &stat.size_bytes.to_string()).await {
        return TaskResult::Failed {
            error: err.to_string(),
        };
    }

    TaskResult::Done {
        file_id: job.file_id.clone(),
        processed_size: stat.size_bytes,
    }
}

/// Handle for submitting jobs to the worker.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<ProcessJob>,
}

impl JobQueue {
    /// Spawn the consumer task and return the queue handle.
    pub fn start(store: ObjectStore, index: KvIndex, depth: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<ProcessJob>(depth);

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match process_file(&store, &index, &job).await {
                    TaskResult::Done {
                        file_id,
                        processed_size,
                    } => {
                        tracing::info!(%file_id, processed_size, "processed file");
                    }
                    TaskResult::Failed { error } => {
                        tracing::warn!(file_id = %job.file_id, %error, "file processing failed");
                    }
                }
            }
        });

        Self { tx }
    }

    /// Submit a job fire-and-forget. A full or closed queue drops the job
    /// with a warning; completion is never reported back.
    pub fn enqueue(&self, job: ProcessJob) {
        if let Err(err) = self.tx.try_send(job) {
            tracing::warn!("failed to enqueue processing job: {}", err);
        }
    }
}
