use once_cell::sync::OnceCell;
use thiserror::Error;
use tiktoken_rs::CoreBPE;

use crate::config::DEFAULT_MODEL;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("tokenizer backend failed for model {model}: {message}")]
    Backend { model: String, message: String },
}

pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> Result<u32, TokenError>;
}

/// Counts tokens with the BPE encoding of a fixed model.
///
/// The encoding is resolved lazily on first use. A failed resolution is
/// returned to the caller and the cell stays empty, so a later call attempts
/// the resolution again.
pub struct TiktokenCounter {
    model: String,
    bpe: OnceCell<CoreBPE>,
}

impl TiktokenCounter {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            bpe: OnceCell::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn encoding(&self) -> Result<&CoreBPE, TokenError> {
        self.bpe.get_or_try_init(|| {
            tiktoken_rs::get_bpe_from_model(&self.model).map_err(|err| TokenError::Backend {
                model: self.model.clone(),
                message: err.to_string(),
            })
        })
    }
}

impl Default for TiktokenCounter {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> Result<u32, TokenError> {
        let bpe = self.encoding()?;
        Ok(bpe.encode_with_special_tokens(text).len() as u32)
    }
}

/// Simple, deterministic whitespace tokenizer used by tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceTokenCounter;

impl TokenCounter for WhitespaceTokenCounter {
    fn count(&self, text: &str) -> Result<u32, TokenError> {
        Ok(text.split_whitespace().count() as u32)
    }
}
