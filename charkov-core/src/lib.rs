//! Fixed-order character-level Markov text generation library.
//!
//! This crate provides a small character-level language model:
//! - Per-context successor tallies with empirical probabilities
//! - A line-oriented trainer that builds a context table from a corpus
//! - A generator that extends a seed text by sampling successors
//! - A human-readable dump of the learned distributions
//!
//! Only the high-level API is exposed publicly. Low-level components
//! are kept internal to ensure consistency and prevent misuse.

/// Core model types and generation logic.
///
/// This module exposes the high-level model interface while keeping
/// internal representations private.
pub mod model;

/// I/O utilities (corpus file loading).
///
/// Not exposed
pub(crate) mod io;
