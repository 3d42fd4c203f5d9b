//! Reference job runner.
//!
//! Runs batches of composition requests on a bounded rayon pool and tracks
//! each job through `pending -> processing -> completed | failed | cancelled`.

use std::sync::{Arc, Mutex, PoisonError};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use cantus_spec::{CodedError, ErrorKind, PipelineError};

use crate::pipeline::{CancellationToken, CompositionRequest, CompositionResult, Pipeline};

/// Lifecycle state of one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a job did not complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFailure {
    pub kind: ErrorKind,
    pub code: String,
    pub reason: String,
}

impl From<&PipelineError> for JobFailure {
    fn from(err: &PipelineError) -> Self {
        Self {
            kind: err.kind(),
            code: err.code().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Final report for one job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub id: usize,
    pub seed: u64,
    pub state: JobState,
    pub result: Option<CompositionResult>,
    pub failure: Option<JobFailure>,
}

/// Shared view of job states while a batch runs.
#[derive(Debug, Default)]
pub struct JobBoard {
    states: Mutex<Vec<JobState>>,
}

impl JobBoard {
    pub fn new(jobs: usize) -> Self {
        Self {
            states: Mutex::new(vec![JobState::Pending; jobs]),
        }
    }

    pub fn get(&self, id: usize) -> Option<JobState> {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .copied()
    }

    pub fn snapshot(&self) -> Vec<JobState> {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, id: usize, state: JobState) {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = states.get_mut(id) {
            *slot = state;
        }
    }
}

/// Runs composition jobs on a dedicated thread pool.
pub struct JobRunner {
    pipeline: Arc<Pipeline>,
    pool: ThreadPool,
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("workers", &self.pool.current_num_threads())
            .finish()
    }
}

impl JobRunner {
    /// Build a runner sized from the pipeline's job budget.
    pub fn new(pipeline: Pipeline) -> Result<Self, ThreadPoolBuildError> {
        let workers = pipeline.budget().jobs.max_workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("cantus-job-{}", i))
            .build()?;
        Ok(Self {
            pipeline: Arc::new(pipeline),
            pool,
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run a batch and return one report per request, in request order.
    pub fn run_batch(
        &self,
        requests: &[CompositionRequest],
        cancel: &CancellationToken,
    ) -> Vec<JobReport> {
        let board = JobBoard::new(requests.len());
        self.run_batch_on(requests, cancel, &board)
    }

    /// Like [`JobRunner::run_batch`], publishing state changes to `board`.
    pub fn run_batch_on(
        &self,
        requests: &[CompositionRequest],
        cancel: &CancellationToken,
        board: &JobBoard,
    ) -> Vec<JobReport> {
        info!(jobs = requests.len(), workers = self.workers(), "running batch");
        let reports: Vec<JobReport> = self.pool.install(|| {
            requests
                .par_iter()
                .enumerate()
                .map(|(id, request)| self.run_one(id, request, cancel, board))
                .collect()
        });
        let failed = reports
            .iter()
            .filter(|r| r.state == JobState::Failed)
            .count();
        info!(jobs = reports.len(), failed, "batch finished");
        reports
    }

    fn run_one(
        &self,
        id: usize,
        request: &CompositionRequest,
        cancel: &CancellationToken,
        board: &JobBoard,
    ) -> JobReport {
        let mut report = JobReport {
            id,
            seed: request.seed,
            state: JobState::Cancelled,
            result: None,
            failure: None,
        };
        if cancel.is_cancelled() {
            debug!(id, "job cancelled before start");
            board.set(id, JobState::Cancelled);
            return report;
        }

        board.set(id, JobState::Processing);
        match self.pipeline.compose(request, cancel) {
            Ok(result) => {
                report.state = JobState::Completed;
                report.result = Some(result);
            }
            Err(err) => {
                report.state = if err.kind() == ErrorKind::Cancelled {
                    JobState::Cancelled
                } else {
                    warn!(id, code = err.code(), "job failed: {}", err);
                    JobState::Failed
                };
                report.failure = Some(JobFailure::from(&err));
            }
        }
        board.set(id, report.state);
        report
    }
}
