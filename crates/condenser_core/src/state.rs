use crate::view_model::{AppViewModel, JobRowView};

pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Queued,
    Fetching,
    Chunking,
    Summarizing,
    Reducing,
    Writing,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResultKind {
    Success { summary_path: String },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub job_id: JobId,
    pub source: String,
    pub stage: Stage,
    pub bytes: Option<u64>,
    pub chunks: Option<u32>,
    pub tokens: Option<u32>,
    pub outcome: Option<JobResultKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    session: SessionState,
    jobs: Vec<JobRecord>,
    next_job_id: JobId,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub(crate) fn start_session(&mut self) {
        if self.session == SessionState::Idle {
            self.session = SessionState::Running;
        }
    }

    /// Register sources as queued jobs, skipping any source already known.
    /// Returns the newly enqueued `(job_id, source)` pairs.
    pub(crate) fn enqueue_sources(&mut self, sources: Vec<String>) -> Vec<(JobId, String)> {
        let mut enqueued = Vec::new();
        for source in sources {
            if self.jobs.iter().any(|job| job.source == source) {
                continue;
            }
            self.next_job_id += 1;
            let job_id = self.next_job_id;
            self.jobs.push(JobRecord {
                job_id,
                source: source.clone(),
                stage: Stage::Queued,
                bytes: None,
                chunks: None,
                tokens: None,
                outcome: None,
            });
            enqueued.push((job_id, source));
        }
        enqueued
    }

    pub(crate) fn apply_progress(
        &mut self,
        job_id: JobId,
        stage: Stage,
        bytes: Option<u64>,
        chunks: Option<u32>,
        tokens: Option<u32>,
    ) {
        if let Some(job) = self.jobs.iter_mut().find(|job| job.job_id == job_id) {
            job.stage = stage;
            if bytes.is_some() {
                job.bytes = bytes;
            }
            if chunks.is_some() {
                job.chunks = chunks;
            }
            if tokens.is_some() {
                job.tokens = tokens;
            }
        }
    }

    pub(crate) fn apply_done(&mut self, job_id: JobId, result: JobResultKind) {
        if let Some(job) = self.jobs.iter_mut().find(|job| job.job_id == job_id) {
            job.stage = Stage::Done;
            job.outcome = Some(result);
        }
        if self.session == SessionState::Running && self.all_jobs_settled() {
            self.session = SessionState::Finished;
        }
    }

    pub fn all_jobs_settled(&self) -> bool {
        !self.jobs.is_empty() && self.jobs.iter().all(|job| job.outcome.is_some())
    }

    pub fn view(&self) -> AppViewModel {
        let completed = self
            .jobs
            .iter()
            .filter(|job| matches!(job.outcome, Some(JobResultKind::Success { .. })))
            .count();
        let failed = self
            .jobs
            .iter()
            .filter(|job| matches!(job.outcome, Some(JobResultKind::Failed { .. })))
            .count();
        AppViewModel {
            session: self.session,
            job_count: self.jobs.len(),
            completed,
            failed,
            jobs: self
                .jobs
                .iter()
                .map(|job| JobRowView {
                    job_id: job.job_id,
                    source: job.source.clone(),
                    stage: job.stage,
                    bytes: job.bytes,
                    chunks: job.chunks,
                    tokens: job.tokens,
                    outcome: job.outcome.clone(),
                })
                .collect(),
        }
    }
}
