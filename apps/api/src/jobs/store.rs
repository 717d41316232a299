use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::models::job::{JobRecord, JobStatus, LogEntry, TailorRequest, TailorResult};

/// In-memory job table shared by the handlers and the background runners.
#[derive(Clone)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<Uuid, JobRecord>>>,
    max_age: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

impl JobStore {
    pub fn new(max_age: Duration) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            max_age,
        }
    }

    /// Registers a pending job. Finished jobs past `max_age` are pruned first.
    pub async fn create(&self, request: TailorRequest) -> JobRecord {
        self.prune().await;
        let record = JobRecord::new(request);
        info!(
            "Created job {} for resume {}",
            record.id, record.request.original_resume_id
        );
        self.jobs.write().await.insert(record.id, record.clone());
        record
    }

    pub async fn get(&self, id: Uuid) -> Option<JobRecord> {
        self.jobs.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Removes terminal jobs older than `max_age`. Returns how many were removed.
    pub async fn prune(&self) -> usize {
        let Ok(max_age) = chrono::Duration::from_std(self.max_age) else {
            return 0;
        };
        let cutoff = Utc::now() - max_age;
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| !(job.status.is_terminal() && job.created_at < cutoff));
        let removed = before - jobs.len();
        if removed > 0 {
            debug!("Pruned {removed} expired job(s)");
        }
        removed
    }

    async fn update<F>(&self, id: Uuid, f: F)
    where
        F: FnOnce(&mut JobRecord),
    {
        match self.jobs.write().await.get_mut(&id) {
            Some(job) => f(job),
            None => warn!("Job {id} vanished before update"),
        }
    }

    /// Appends a log line to the job and mirrors it to tracing.
    pub async fn log(&self, id: Uuid, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Info => info!(job_id = %id, "{message}"),
            LogLevel::Warning => warn!(job_id = %id, "{message}"),
            LogLevel::Error => error!(job_id = %id, "{message}"),
        }
        self.update(id, |job| {
            job.logs.push(LogEntry {
                timestamp: Utc::now(),
                level: level.as_str().to_string(),
                message,
            })
        })
        .await;
    }

    pub async fn progress(&self, id: Uuid, progress: u8, message: &str) {
        self.update(id, |job| {
            job.status = JobStatus::Processing;
            job.progress = progress.min(100);
            job.message = message.to_string();
        })
        .await;
        self.log(id, LogLevel::Info, message).await;
    }

    pub async fn complete(&self, id: Uuid, result: TailorResult) {
        self.update(id, |job| {
            job.status = JobStatus::Completed;
            job.progress = 100;
            job.message = "Resume tailored successfully".to_string();
            job.completed_at = Some(Utc::now());
            job.result = Some(result);
        })
        .await;
        self.log(id, LogLevel::Info, "Job completed").await;
    }

    pub async fn fail(&self, id: Uuid, message: String, error: String) {
        self.log(id, LogLevel::Error, format!("Job failed: {error}")).await;
        self.update(id, |job| {
            job.status = JobStatus::Failed;
            job.progress = 0;
            job.message = message;
            job.completed_at = Some(Utc::now());
            job.error = Some(error);
        })
        .await;
    }
}
