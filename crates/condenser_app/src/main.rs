mod cli;
mod logging;

use anyhow::Context;
use condenser_core::{update, AppState, Effect, JobResultKind, Msg, SessionState, Stage};
use condenser_engine::{ApiConfig, EngineEvent, EngineHandle, EngineSettings};
use engine_logging::{engine_error, engine_info};

fn main() -> anyhow::Result<()> {
    let options = match cli::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}\n{}", cli::USAGE);
            std::process::exit(2);
        }
    };

    logging::initialize(logging::LogDestination::Both);

    // Credentials are checked before the engine exists: a missing key stops
    // the process before any fetch, chunk, or summarize work begins.
    let mut config = ApiConfig::from_env().context("completion service configuration")?;
    if let Some(model) = &options.model {
        config = config.with_model(model.clone());
    }

    let mut settings = EngineSettings::default();
    if let Some(max_tokens) = options.max_tokens {
        settings.max_chunk_tokens = max_tokens;
    }

    let engine = EngineHandle::new(config, settings, options.output_dir.clone());

    let mut state = AppState::new();
    let (next, effects) = update(state, Msg::SourcesSubmitted(options.sources.join("\n")));
    state = next;
    if effects.is_empty() {
        anyhow::bail!("no usable transcript URLs were given");
    }
    for effect in effects {
        match effect {
            Effect::EnqueueSource { job_id, url } => {
                engine_info!("job {}: queued {}", job_id, url);
                engine.enqueue(job_id, url);
            }
        }
    }

    while state.session() != SessionState::Finished {
        let Some(event) = engine.recv() else {
            anyhow::bail!("engine stopped unexpectedly");
        };
        let msg = handle_event(event);
        let (next, _) = update(state, msg);
        state = next;
    }

    let view = state.view();
    engine_info!(
        "session finished: {} succeeded, {} failed",
        view.completed,
        view.failed
    );
    if view.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Report an engine event to the user and translate it into a core message.
fn handle_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Progress(progress) => {
            let stage = map_stage(progress.stage);
            engine_info!("job {}: {:?}", progress.job_id, stage);
            Msg::JobProgress {
                job_id: progress.job_id,
                stage,
                bytes: progress.bytes,
                chunks: progress.chunks,
                tokens: progress.tokens,
            }
        }
        EngineEvent::JobCompleted { job_id, result } => match result {
            Ok(outcome) => {
                println!(
                    "{} -> {} ({} chunks, {} tokens)",
                    outcome.final_url,
                    outcome.summary_path.display(),
                    outcome.chunk_count,
                    outcome.transcript_tokens
                );
                println!("{}", outcome.summary);
                Msg::JobDone {
                    job_id,
                    result: JobResultKind::Success {
                        summary_path: outcome.summary_path.display().to_string(),
                    },
                }
            }
            Err(err) => {
                engine_error!("job {} failed: {}", job_id, err);
                Msg::JobDone {
                    job_id,
                    result: JobResultKind::Failed {
                        message: err.to_string(),
                    },
                }
            }
        },
    }
}

fn map_stage(stage: condenser_engine::Stage) -> Stage {
    match stage {
        condenser_engine::Stage::Queued => Stage::Queued,
        condenser_engine::Stage::Fetching => Stage::Fetching,
        condenser_engine::Stage::Chunking => Stage::Chunking,
        condenser_engine::Stage::Summarizing => Stage::Summarizing,
        condenser_engine::Stage::Reducing => Stage::Reducing,
        condenser_engine::Stage::Writing => Stage::Writing,
        condenser_engine::Stage::Done => Stage::Done,
    }
}
