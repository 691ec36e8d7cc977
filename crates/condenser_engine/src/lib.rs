//! Condenser engine: transcript fetching, token-aware chunking, and the
//! map-reduce summarization pipeline.
mod chunk;
mod complete;
mod config;
mod decode;
mod engine;
mod fetch;
mod output;
mod persist;
mod pipeline;
mod summarize;
mod token;
mod types;

pub use chunk::{split_text, WordGroups, DEFAULT_MAX_TOKENS, WORD_GROUP_SIZE};
pub use complete::{
    Completion, CompletionClient, CompletionError, CompletionRequest, OpenAiClient, TokenUsage,
    FREQUENCY_PENALTY, PRESENCE_PENALTY, TEMPERATURE, TOP_P,
};
pub use config::{
    ApiConfig, ConfigError, EngineSettings, DEFAULT_API_BASE, DEFAULT_MODEL, ENV_API_BASE,
    ENV_API_KEY, ENV_MODEL,
};
pub use decode::{decode_transcript, DecodeError, DecodedText};
pub use engine::EngineHandle;
pub use fetch::{FetchSettings, HttpTranscriptFetcher, TranscriptFetcher};
pub use output::{artifact_stem, label_from_url, ArtifactStore};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{run_job, PipelineDeps};
pub use summarize::{clean_transcript, Summarizer, MAP_PROMPT, REDUCE_PROMPT};
pub use token::{TiktokenCounter, TokenCounter, TokenError, WhitespaceTokenCounter};
pub use types::{
    ChannelProgressSink, EngineError, EngineEvent, FetchError, FetchFailureKind, JobId, JobOutcome,
    JobProgress, ProgressSink, Stage, Transcript, TranscriptMetadata,
};
