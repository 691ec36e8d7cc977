use crate::{JobId, JobResultKind, SessionState, Stage};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub job_count: usize,
    pub completed: usize,
    pub failed: usize,
    pub jobs: Vec<JobRowView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub source: String,
    pub stage: Stage,
    pub bytes: Option<u64>,
    pub chunks: Option<u32>,
    pub tokens: Option<u32>,
    pub outcome: Option<JobResultKind>,
}
