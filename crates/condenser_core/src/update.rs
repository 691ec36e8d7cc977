use crate::{AppState, Effect, Msg, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SourcesSubmitted(raw) => {
            let sources = parse_sources(&raw);
            if sources.is_empty() || state.session() == SessionState::Finished {
                return (state, Vec::new());
            }

            let enqueued = state.enqueue_sources(sources);
            if enqueued.is_empty() {
                return (state, Vec::new());
            }

            state.start_session();
            enqueued
                .into_iter()
                .map(|(job_id, url)| Effect::EnqueueSource { job_id, url })
                .collect()
        }
        Msg::JobProgress {
            job_id,
            stage,
            bytes,
            chunks,
            tokens,
        } => {
            state.apply_progress(job_id, stage, bytes, chunks, tokens);
            Vec::new()
        }
        Msg::JobDone { job_id, result } => {
            state.apply_done(job_id, result);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn parse_sources(raw: &str) -> Vec<String> {
    let mut sources = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || sources.iter().any(|seen| seen == line) {
            continue;
        }
        sources.push(line.to_owned());
    }
    sources
}
