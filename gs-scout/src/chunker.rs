//! Token-bounded overlapping windows over the raw game log
//!
//! The extraction model has a context limit, so long logs are cut into
//! windows of at most `W` tokens. Consecutive windows share exactly `O`
//! tokens (stride `W - O`) so a plate appearance straddling a cut is seen
//! whole by at least one extraction call. Duplicate extraction of such plays
//! is accepted; nothing downstream deduplicates them.

use crate::error::{ScoutError, ScoutResult};
use std::ops::Range;
use tiktoken_rs::CoreBPE;

/// Tokenization unit used to measure windows
pub trait Tokenizer: Send + Sync {
    /// Encoding name for logging
    fn name(&self) -> &str;

    fn encode(&self, text: &str) -> Vec<usize>;

    /// Text for a token run. A run that starts or ends inside a multi-token
    /// character decodes the partial bytes as U+FFFD.
    fn decode(&self, tokens: &[usize]) -> String;
}

/// `cl100k_base` BPE, the encoding of the gpt-3.5/gpt-4 model family
pub struct BpeTokenizer {
    bpe: CoreBPE,
}

impl BpeTokenizer {
    pub fn cl100k() -> ScoutResult<Self> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| ScoutError::Tokenizer(format!("cl100k_base unavailable: {}", e)))?;
        Ok(Self { bpe })
    }
}

impl Tokenizer for BpeTokenizer {
    fn name(&self) -> &str {
        "cl100k_base"
    }

    fn encode(&self, text: &str) -> Vec<usize> {
        self.bpe.encode_ordinary(text)
    }

    fn decode(&self, tokens: &[usize]) -> String {
        // Byte-level tokens: emoji and CJK characters span several of them
        String::from_utf8_lossy(&self.bpe._decode_native(tokens)).into_owned()
    }
}

/// One token per Unicode scalar value. Lossless and model-independent.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharTokenizer;

impl Tokenizer for CharTokenizer {
    fn name(&self) -> &str {
        "char"
    }

    fn encode(&self, text: &str) -> Vec<usize> {
        text.chars().map(|c| c as usize).collect()
    }

    fn decode(&self, tokens: &[usize]) -> String {
        tokens
            .iter()
            .map(|&t| {
                u32::try_from(t)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or(char::REPLACEMENT_CHARACTER)
            })
            .collect()
    }
}

/// A window of the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextWindow {
    /// Position in the window sequence, from 0
    pub index: usize,
    /// Token range of the source covered by this window
    pub tokens: Range<usize>,
    pub text: String,
}

/// Window parameters bound to a tokenizer
pub struct Chunker<'a> {
    tokenizer: &'a dyn Tokenizer,
    window: usize,
    overlap: usize,
}

impl<'a> Chunker<'a> {
    /// `window` is `W`, `overlap` is `O`; requires `0 <= O < W`
    pub fn new(
        tokenizer: &'a dyn Tokenizer,
        window: usize,
        overlap: usize,
    ) -> ScoutResult<Self> {
        if window == 0 {
            return Err(ScoutError::Config(
                "window size must be greater than 0".to_string(),
            ));
        }
        if overlap >= window {
            return Err(ScoutError::Config(format!(
                "overlap ({}) must be smaller than window size ({})",
                overlap, window
            )));
        }
        Ok(Self {
            tokenizer,
            window,
            overlap,
        })
    }

    pub fn stride(&self) -> usize {
        self.window - self.overlap
    }

    /// Lazily cut `text` into windows. The source is tokenized once up front;
    /// each window is decoded only when the iterator reaches it.
    pub fn windows<'t>(&self, text: &'t str) -> Windows<'a, 't> {
        Windows {
            tokenizer: self.tokenizer,
            source: text,
            tokens: self.tokenizer.encode(text),
            window: self.window,
            stride: self.stride(),
            next_start: Some(0),
            index: 0,
        }
    }
}

/// Iterator over [`TextWindow`]s. Single pass; not restartable.
pub struct Windows<'a, 't> {
    tokenizer: &'a dyn Tokenizer,
    source: &'t str,
    tokens: Vec<usize>,
    window: usize,
    stride: usize,
    next_start: Option<usize>,
    index: usize,
}

impl Windows<'_, '_> {
    /// Token count of the whole source
    pub fn total_tokens(&self) -> usize {
        self.tokens.len()
    }
}

impl Iterator for Windows<'_, '_> {
    type Item = TextWindow;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start?;
        let total = self.tokens.len();
        let end = (start + self.window).min(total);

        // Stop once a window reaches the end of the source
        self.next_start = if end < total {
            Some(start + self.stride)
        } else {
            None
        };

        let index = self.index;
        self.index += 1;

        // A window covering everything is the source itself, byte for byte
        let text = if start == 0 && end == total {
            self.source.to_string()
        } else {
            self.tokenizer.decode(&self.tokens[start..end])
        };

        Some(TextWindow {
            index,
            tokens: start..end,
            text,
        })
    }
}
