//! Top-level module for the character-level Markov model.
//!
//! This module provides a fixed-order character-level text generator:
//! - Per-context successor statistics (`SuccessorTally`)
//! - The trained model with its context table (`LanguageModel`)
//! - A serializable model summary (`ModelInfo`)

/// High-level language model: training, generation, and the dump.
///
/// Exposes model construction (seeded or unseeded), corpus training,
/// and text generation from an initial seed text.
pub mod language_model;

/// Per-context successor tally (`chr`/`count`/`p`/`cp` observations).
///
/// Accumulates successor counts during training and exposes a
/// sampling-ready cumulative distribution after finalization.
pub mod tally;

pub use language_model::{LanguageModel, ModelInfo, END_CHAR};
pub use tally::{CharObservation, SuccessorTally};
