use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::persist::{AtomicFileWriter, PersistError};

const MAX_LABEL_LEN: usize = 80;

/// Filesystem-safe, deterministic stem for a job's artifacts:
/// `{sanitized_label}--{short_hash(url)}`.
pub fn artifact_stem(label: &str, url: &str) -> String {
    format!("{}--{}", sanitize_label(label), short_hash(url))
}

/// Derive a human-readable label from a transcript URL: the last non-empty
/// path segment, with any extension removed. URLs without a path fall back
/// to `transcript`.
pub fn label_from_url(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let after_scheme = without_query
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(without_query);
    let trimmed = after_scheme.trim_end_matches('/');
    match trimmed.split_once('/') {
        Some((_, path)) => {
            let segment = path.rsplit('/').next().unwrap_or(path);
            let stem = segment.split('.').next().unwrap_or(segment);
            if stem.is_empty() {
                "transcript".to_string()
            } else {
                stem.to_string()
            }
        }
        None => "transcript".to_string(),
    }
}

fn sanitize_label(input: &str) -> String {
    let mut cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "transcript".to_string();
    }
    // Collapse runs of underscores left behind by replacement.
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }
    if compacted.len() > MAX_LABEL_LEN {
        compacted.truncate(MAX_LABEL_LEN);
    }
    if is_reserved_windows_name(&compacted) {
        compacted.push('_');
    }
    compacted
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

/// Writes a job's artifacts into the output directory: the raw transcript,
/// the ordered partial summaries as a JSON array, and the final summary.
pub struct ArtifactStore {
    writer: AtomicFileWriter,
}

impl ArtifactStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
        }
    }

    pub fn write_transcript(&self, stem: &str, text: &str) -> Result<PathBuf, PersistError> {
        self.writer.write(&format!("{stem}.txt"), text)
    }

    pub fn write_partials(&self, stem: &str, partials: &[String]) -> Result<PathBuf, PersistError> {
        let json = serde_json::to_string_pretty(partials)?;
        self.writer.write(&format!("{stem}.partials.json"), &json)
    }

    pub fn write_summary(&self, stem: &str, summary: &str) -> Result<PathBuf, PersistError> {
        self.writer.write(&format!("{stem}.md"), summary)
    }
}
