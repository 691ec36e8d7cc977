use std::sync::Arc;

use engine_logging::engine_info;

use crate::chunk::split_text;
use crate::config::EngineSettings;
use crate::fetch::TranscriptFetcher;
use crate::output::{artifact_stem, label_from_url, ArtifactStore};
use crate::summarize::Summarizer;
use crate::token::TokenCounter;
use crate::{EngineError, EngineEvent, JobId, JobOutcome, JobProgress, ProgressSink, Stage};

/// Everything a job needs, injected once by the engine (or a test).
pub struct PipelineDeps {
    pub fetcher: Arc<dyn TranscriptFetcher>,
    pub counter: Arc<dyn TokenCounter>,
    pub summarizer: Summarizer,
    pub store: ArtifactStore,
    pub settings: EngineSettings,
}

fn progress(job_id: JobId, stage: Stage) -> JobProgress {
    JobProgress {
        job_id,
        stage,
        bytes: None,
        chunks: None,
        tokens: None,
    }
}

/// Drive one job through fetch → chunk → map summarize → reduce summarize →
/// write. Stages run strictly in sequence; the first failure ends the job and
/// no stage is retried.
pub async fn run_job(
    deps: &PipelineDeps,
    job_id: JobId,
    url: &str,
    sink: &dyn ProgressSink,
) -> Result<JobOutcome, EngineError> {
    sink.emit(EngineEvent::Progress(progress(job_id, Stage::Fetching)));
    let transcript = deps.fetcher.fetch(job_id, url, sink).await?;

    sink.emit(EngineEvent::Progress(JobProgress {
        bytes: Some(transcript.metadata.byte_len),
        ..progress(job_id, Stage::Chunking)
    }));
    let chunks = split_text(
        &transcript.text,
        deps.settings.max_chunk_tokens,
        deps.counter.as_ref(),
    )?;
    let transcript_tokens = deps.counter.count(&transcript.text)?;
    engine_info!(
        "job {}: {} tokens across {} chunks",
        job_id,
        transcript_tokens,
        chunks.len()
    );

    sink.emit(EngineEvent::Progress(JobProgress {
        chunks: Some(chunks.len() as u32),
        tokens: Some(transcript_tokens),
        ..progress(job_id, Stage::Summarizing)
    }));
    let partials = deps
        .summarizer
        .summarize_batch(&chunks, Some(&deps.settings.map_prompt))
        .await?;

    let stem = artifact_stem(&label_from_url(&transcript.metadata.final_url), url);
    deps.store.write_partials(&stem, &partials)?;

    sink.emit(EngineEvent::Progress(progress(job_id, Stage::Reducing)));
    let joined = partials.join("\n");
    let summary = deps
        .summarizer
        .summarize(&joined, Some(&deps.settings.reduce_prompt))
        .await?;

    sink.emit(EngineEvent::Progress(progress(job_id, Stage::Writing)));
    deps.store.write_transcript(&stem, &transcript.text)?;
    let summary_path = deps.store.write_summary(&stem, &summary)?;

    sink.emit(EngineEvent::Progress(progress(job_id, Stage::Done)));
    Ok(JobOutcome {
        final_url: transcript.metadata.final_url,
        chunk_count: chunks.len() as u32,
        transcript_tokens,
        summary_path,
        summary,
    })
}
