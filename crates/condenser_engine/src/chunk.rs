use engine_logging::engine_warn;

use crate::token::{TokenCounter, TokenError};

pub const WORD_GROUP_SIZE: usize = 50;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Lazy iterator over fixed-size groups of single-space-separated words.
///
/// The split keeps empty words (runs of spaces produce them); filtering
/// happens when a group is turned into a fragment. The last group may be
/// shorter than `size`.
pub struct WordGroups<'a> {
    words: std::str::Split<'a, char>,
    size: usize,
}

impl<'a> WordGroups<'a> {
    pub fn new(text: &'a str, size: usize) -> Self {
        Self {
            words: text.split(' '),
            size,
        }
    }
}

impl<'a> Iterator for WordGroups<'a> {
    type Item = Vec<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut group = Vec::with_capacity(self.size);
        for word in self.words.by_ref() {
            group.push(word);
            if group.len() == self.size {
                break;
            }
        }
        if group.is_empty() {
            None
        } else {
            Some(group)
        }
    }
}

/// Split `text` into chunks whose token count stays under `max_tokens`.
///
/// Greedy bin-packing over word groups of [`WORD_GROUP_SIZE`]: each group's
/// fragment either grows the current chunk, starts a new one, or — when the
/// fragment alone exceeds the budget — is dropped with a warning. Chunks come
/// out in source order. The group loop is sequential by design: every step
/// depends on the running accumulator.
pub fn split_text(
    text: &str,
    max_tokens: u32,
    counter: &dyn TokenCounter,
) -> Result<Vec<String>, TokenError> {
    let mut chunks = Vec::new();
    let mut accumulated: u32 = 0;
    let mut growing = String::new();

    for group in WordGroups::new(text, WORD_GROUP_SIZE) {
        let fragment = group
            .iter()
            .filter(|word| !word.trim().is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        if fragment.is_empty() {
            continue;
        }

        let tokens = counter.count(&fragment)?;
        if accumulated + tokens < max_tokens {
            growing.push_str(&fragment);
            growing.push(' ');
            accumulated += tokens;
        } else if tokens > max_tokens {
            engine_warn!(
                "dropping word group of {} tokens: exceeds chunk budget of {}",
                tokens,
                max_tokens
            );
        } else {
            flush(&mut chunks, &mut growing);
            growing.push_str(&fragment);
            accumulated = tokens;
        }
    }
    flush(&mut chunks, &mut growing);

    Ok(chunks)
}

fn flush(chunks: &mut Vec<String>, growing: &mut String) {
    let trimmed = growing.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    growing.clear();
}
