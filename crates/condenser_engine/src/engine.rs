use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

use crate::complete::OpenAiClient;
use crate::config::{ApiConfig, EngineSettings};
use crate::fetch::HttpTranscriptFetcher;
use crate::output::ArtifactStore;
use crate::pipeline::{run_job, PipelineDeps};
use crate::summarize::Summarizer;
use crate::token::TiktokenCounter;
use crate::{ChannelProgressSink, EngineEvent, JobId};

enum EngineCommand {
    Enqueue { job_id: JobId, url: String },
}

/// Handle to the engine's worker thread.
///
/// Commands go in over a channel; a dedicated thread owns the tokio runtime
/// and spawns one task per job, so several jobs can be in flight while each
/// one's stages stay sequential.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: ApiConfig, settings: EngineSettings, output_dir: PathBuf) -> Self {
        let counter = Arc::new(TiktokenCounter::new(config.model.clone()));
        let client = Arc::new(OpenAiClient::new(config));
        let deps = Arc::new(PipelineDeps {
            fetcher: Arc::new(HttpTranscriptFetcher::new(settings.fetch.clone())),
            counter,
            summarizer: Summarizer::new(client),
            store: ArtifactStore::new(output_dir),
            settings,
        });
        Self::with_deps(deps)
    }

    /// Build a handle over preconstructed dependencies (used by tests to
    /// substitute fetcher, counter, or completion client).
    pub fn with_deps(deps: Arc<PipelineDeps>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let deps = deps.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(deps.as_ref(), command, event_tx).await;
                });
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn enqueue(&self, job_id: JobId, url: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Enqueue {
            job_id,
            url: url.into(),
        });
    }

    /// Non-blocking event poll.
    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Block until the next event; `None` once the engine thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}

async fn handle_command(
    deps: &PipelineDeps,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Enqueue { job_id, url } => {
            let sink = ChannelProgressSink::new(event_tx.clone());
            let result = run_job(deps, job_id, &url, &sink).await;
            let _ = event_tx.send(EngineEvent::JobCompleted { job_id, result });
        }
    }
}
