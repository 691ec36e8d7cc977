#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted raw source input (one transcript URL per line).
    SourcesSubmitted(String),
    /// Engine progress for a job.
    JobProgress {
        job_id: crate::JobId,
        stage: crate::Stage,
        bytes: Option<u64>,
        chunks: Option<u32>,
        tokens: Option<u32>,
    },
    /// Engine completion for a job.
    JobDone {
        job_id: crate::JobId,
        result: crate::JobResultKind,
    },
    /// Fallback for placeholder wiring.
    NoOp,
}
