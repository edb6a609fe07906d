//! Content validation module
//!
//! This module turns a parsed page into tokens and decides whether the page is worth
//! keeping:
//! - Visible text extraction (script, style, head and metadata text is ignored)
//! - Tokenization and stop-word removal
//! - Information density thresholds
//! - SimHash fingerprints and the append-only near-duplicate index

mod fingerprint;
mod tokenizer;
mod validator;

pub use fingerprint::{Fingerprint, NearDuplicateIndex};
pub use tokenizer::{tokenize, visible_text, StopWords};
pub use validator::{ContentPolicy, ContentRejection, ContentValidator, Validation, Verdict};
