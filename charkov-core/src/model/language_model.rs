use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::Path;

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::tally::SuccessorTally;
use crate::io::read_file;

/// Sentinel recorded as the successor of the final window of a line.
///
/// The generator appends it like any other sampled character, so
/// generated text may contain it; the window that follows is virtually
/// never a key, which stops generation one step later.
pub const END_CHAR: char = '\0';

/// Serializable summary of a trained model.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ModelInfo {
	/// The window length `k` of the model.
	pub window_length: usize,
	/// Number of distinct contexts in the table.
	pub context_count: usize,
	/// Total number of (context, successor) observations.
	pub observation_count: usize,
}

/// A fixed-order character-level Markov language model.
///
/// The model maps every k-character context observed in a training
/// corpus to the empirical distribution over the character that
/// immediately follows it, then generates text by rolling a k-character
/// window and sampling successors.
///
/// # Responsibilities
/// - Build the context table from a corpus, line by line
/// - Finalize per-context probabilities at the end of training
/// - Generate text from an initial seed text
/// - Render a human-readable dump of the learned distributions
///
/// # Invariants
/// - `window_length` is always >= 1
/// - Every context key is exactly `window_length` characters long
/// - Every tally in the table is non-empty
///
/// # Notes
/// - Characters are Unicode scalar values; `window_length` and
///   generation lengths are measured in scalars, not bytes.
/// - The supported lifecycle is: construct, train once, then generate.
///   Training and generation must not overlap across threads; the
///   random source is owned by the model and advanced by every
///   `generate` call.
#[derive(Debug)]
pub struct LanguageModel {
	/// The window length `k` (number of conditioning characters).
	window_length: usize,

	/// Mapping from a k-character context to its successor tally.
	contexts: HashMap<String, SuccessorTally>,

	/// Uniform source for sampling, created once at construction.
	rng: SmallRng,
}

impl LanguageModel {
	/// Creates an untrained model with the given window length.
	///
	/// The random source is seeded from OS entropy, so repeated runs
	/// produce different texts.
	///
	/// # Errors
	/// Returns an error if `window_length < 1`.
	pub fn new(window_length: usize) -> Result<Self, String> {
		Self::with_rng(window_length, SmallRng::from_os_rng())
	}

	/// Creates an untrained model with a deterministically seeded
	/// random source.
	///
	/// Generating from two models built with the same corpus, window
	/// length, and seed produces identical texts. Good for debugging.
	///
	/// # Errors
	/// Returns an error if `window_length < 1`.
	pub fn with_seed(window_length: usize, seed: u64) -> Result<Self, String> {
		Self::with_rng(window_length, SmallRng::seed_from_u64(seed))
	}

	fn with_rng(window_length: usize, rng: SmallRng) -> Result<Self, String> {
		if window_length < 1 {
			return Err("window length must be >= 1".to_owned());
		}
		Ok(Self {
			window_length,
			contexts: HashMap::new(),
			rng,
		})
	}

	/// The window length `k` of this model.
	pub fn window_length(&self) -> usize {
		self.window_length
	}

	/// Number of distinct contexts in the table.
	pub fn context_count(&self) -> usize {
		self.contexts.len()
	}

	/// Whether the table holds no contexts.
	pub fn is_empty(&self) -> bool {
		self.contexts.is_empty()
	}

	/// Membership test for a context.
	pub fn contains(&self, context: &str) -> bool {
		self.contexts.contains_key(context)
	}

	/// The tally for a context, if the context was observed.
	pub fn tally(&self, context: &str) -> Option<&SuccessorTally> {
		self.contexts.get(context)
	}

	/// Returns a summary of the trained model.
	pub fn info(&self) -> ModelInfo {
		ModelInfo {
			window_length: self.window_length,
			context_count: self.contexts.len(),
			observation_count: self.contexts.values().map(|t| t.total_count()).sum(),
		}
	}

	/// Trains the model from the text file at `path` (the corpus).
	///
	/// Reads the corpus line by line and feeds every line through the
	/// training pass, then finalizes all probabilities.
	///
	/// # Errors
	/// Any I/O failure aborts training and is propagated; the model
	/// must then be considered unusable until retrained from scratch.
	pub fn train<P: AsRef<Path>>(&mut self, path: P) -> io::Result<()> {
		let lines = read_file(path)?;
		for line in &lines {
			self.observe_line(line);
		}
		self.finalize_all();
		Ok(())
	}

	/// Trains the model from an in-memory corpus.
	///
	/// Same pass as [`train`](Self::train), split on line breaks.
	pub fn train_text(&mut self, text: &str) {
		for line in text.lines() {
			self.observe_line(line);
		}
		self.finalize_all();
	}

	/// Emits the (context, successor) observations of one corpus line.
	///
	/// The line is whitespace-trimmed on both ends first. Every window
	/// of `window_length` characters contributes one observation; the
	/// final window of the line gets the [`END_CHAR`] sentinel as its
	/// successor. Lines shorter than the window emit nothing. Contexts
	/// never straddle a line break.
	fn observe_line(&mut self, line: &str) {
		let chars: Vec<char> = line.trim().chars().collect();
		if chars.len() < self.window_length {
			// Too short, no windows to observe
			return;
		}

		for i in 0..=chars.len() - self.window_length {
			let context: String = chars[i..i + self.window_length].iter().collect();
			let successor = match chars.get(i + self.window_length) {
				Some(c) => *c,
				None => END_CHAR,
			};
			self.contexts
				.entry(context)
				.or_insert_with(SuccessorTally::new)
				.update(successor);
		}
	}

	/// Finalizes the probabilities of every tally in the table.
	fn finalize_all(&mut self) {
		for tally in self.contexts.values_mut() {
			tally.finalize_probabilities();
		}
		debug!(
			"trained model: k={}, {} contexts, {} observations",
			self.window_length,
			self.contexts.len(),
			self.contexts.values().map(|t| t.total_count()).sum::<usize>()
		);
	}

	/// Returns the last `n` characters of a string.
	///
	/// Handles UTF-8 correctly (multibyte characters). If `n` exceeds
	/// the number of characters, the entire string is returned.
	fn last_n_chars(chars: &[char], n: usize) -> String {
		if n > chars.len() {
			return chars.iter().collect();
		}
		chars[chars.len() - n..].iter().collect()
	}

	/// Generates a text of up to `target_length` characters, starting
	/// from `initial_text`.
	///
	/// # Behavior
	/// - If `initial_text` is shorter than the window length, it is
	///   returned unchanged.
	/// - Otherwise the last `window_length` characters form the rolling
	///   window; one successor is sampled and appended per step until
	///   the output reaches `target_length` characters, or until the
	///   window is not a key in the table (a normal early stop, not an
	///   error).
	/// - Sampled characters are appended unconditionally, including the
	///   [`END_CHAR`] sentinel.
	///
	/// # Notes
	/// - Every call advances the model's random source, so two
	///   successive calls on the same model differ.
	/// - With the same corpus, window length, seed, and arguments, the
	///   output is identical across runs.
	pub fn generate(&mut self, initial_text: &str, target_length: usize) -> String {
		let mut output: Vec<char> = initial_text.chars().collect();
		if output.len() < self.window_length {
			return initial_text.to_owned();
		}

		let mut window = Self::last_n_chars(&output, self.window_length);
		while output.len() < target_length {
			let Some(tally) = self.contexts.get(&window) else {
				// Unknown window: stop and return what was produced
				break;
			};
			let u: f64 = self.rng.random();
			let Some(next) = tally.sample(u) else {
				break;
			};
			output.push(next);
			window = Self::last_n_chars(&output, self.window_length);
		}

		output.into_iter().collect()
	}
}

impl fmt::Display for LanguageModel {
	/// Human-readable dump: one `<context> : <tally>` line per context,
	/// keys sorted for a stable rendering.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut keys: Vec<&String> = self.contexts.keys().collect();
		keys.sort();
		for key in keys {
			writeln!(f, "{} : {}", key, self.contexts[key])?;
		}
		Ok(())
	}
}
