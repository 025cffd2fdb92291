use std::fmt;

use serde::Serialize;

/// One observed successor character and its statistics.
///
/// `p` and `cp` are meaningless until the owning tally has been
/// finalized; until then they are 0.0.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CharObservation {
	/// The successor character (may be the end-of-line sentinel).
	chr: char,
	/// Number of times this successor was observed. Always >= 1.
	count: usize,
	/// Empirical probability, `count / totalCount`.
	p: f64,
	/// Cumulative probability up to and including this observation.
	cp: f64,
}

impl CharObservation {
	fn new(chr: char) -> Self {
		Self { chr, count: 1, p: 0.0, cp: 0.0 }
	}

	/// The observed character.
	pub fn chr(&self) -> char {
		self.chr
	}

	/// How many times this successor was observed.
	pub fn count(&self) -> usize {
		self.count
	}

	/// Empirical probability (0.0 before finalization).
	pub fn p(&self) -> f64 {
		self.p
	}

	/// Cumulative probability (0.0 before finalization).
	pub fn cp(&self) -> f64 {
		self.cp
	}
}

/// The multiset of successors observed after one context.
///
/// A `SuccessorTally` accumulates, for a single k-character context,
/// every character seen immediately after it in the corpus. After
/// training, `finalize_probabilities` turns the raw counts into a
/// cumulative distribution that `sample` can draw from.
///
/// ## Responsibilities
/// - Accumulate successor occurrences during training
/// - Convert counts into `p`/`cp` values at the end of training
/// - Map a uniform draw in `[0, 1)` back to a successor character
///
/// ## Invariants
/// - No two observations share the same `chr`
/// - Every observation count is strictly positive
/// - A newly discovered successor is inserted at the FRONT of the
///   sequence; the order is observable through `cp` bands and thus
///   through sampling outcomes for a given draw
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct SuccessorTally {
	observations: Vec<CharObservation>,
}

impl SuccessorTally {
	/// Creates an empty tally.
	pub fn new() -> Self {
		Self { observations: Vec::new() }
	}

	/// Records one occurrence of the successor `chr`.
	///
	/// - If the character was seen before, its count is incremented.
	/// - Otherwise a new observation with count 1 is inserted at the
	///   front of the sequence.
	pub fn update(&mut self, chr: char) {
		match self.observations.iter_mut().find(|o| o.chr == chr) {
			Some(observation) => observation.count += 1,
			None => self.observations.insert(0, CharObservation::new(chr)),
		}
	}

	/// Number of distinct successors.
	pub fn len(&self) -> usize {
		self.observations.len()
	}

	/// Whether no successor has been recorded yet.
	pub fn is_empty(&self) -> bool {
		self.observations.is_empty()
	}

	/// Sum of all observation counts.
	pub fn total_count(&self) -> usize {
		self.observations.iter().map(|o| o.count).sum()
	}

	/// Iterates over the observations in sequence order.
	pub fn observations(&self) -> impl Iterator<Item = &CharObservation> {
		self.observations.iter()
	}

	/// Computes `p` and `cp` for every observation.
	///
	/// `p` is `count / totalCount`; `cp` is the prefix sum of `p` in
	/// sequence order, so the last observation ends numerically close
	/// to 1.0. Recomputes from the counts, so calling it again on a
	/// frozen tally yields the same values.
	pub fn finalize_probabilities(&mut self) {
		let total_count = self.total_count();
		if total_count == 0 {
			return;
		}

		let mut cumulative = 0.0;
		for observation in &mut self.observations {
			observation.p = observation.count as f64 / total_count as f64;
			cumulative += observation.p;
			observation.cp = cumulative;
		}
	}

	/// Maps a uniform draw `u` in `[0, 1)` to a successor character.
	///
	/// Scans the sequence in order and returns the first observation
	/// whose `cp` exceeds `u`. If floating-point drift left the final
	/// `cp` below `u`, the last observation is returned instead.
	///
	/// Returns `None` if the tally is empty.
	pub fn sample(&self, u: f64) -> Option<char> {
		for observation in &self.observations {
			if u < observation.cp {
				return Some(observation.chr);
			}
		}
		// Rounding at the u -> 1.0 boundary
		self.observations.last().map(|o| o.chr)
	}
}

impl fmt::Display for SuccessorTally {
	/// Renders each observation as `'chr'xCOUNT`, whitespace-separated,
	/// in sequence order. The sentinel and other non-printable
	/// characters are escaped.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut first = true;
		for observation in &self.observations {
			if !first {
				write!(f, " ")?;
			}
			write!(f, "{:?}x{}", observation.chr, observation.count)?;
			first = false;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn update_counts_and_front_inserts() {
		let mut tally = SuccessorTally::new();
		tally.update('a');
		tally.update('b');
		tally.update('a');
		tally.update('c');

		// Newest distinct successor first, counts accumulated in place
		let observed: Vec<(char, usize)> =
			tally.observations().map(|o| (o.chr(), o.count())).collect();
		assert_eq!(observed, vec![('c', 1), ('b', 1), ('a', 2)]);
		assert_eq!(tally.len(), 3);
		assert_eq!(tally.total_count(), 4);
	}

	#[test]
	fn finalize_sets_probabilities_and_cumulative_bands() {
		// Successors of "aa" in the corpus "aaaa": a, a, then end-of-line
		let mut tally = SuccessorTally::new();
		tally.update('a');
		tally.update('a');
		tally.update('\0');
		tally.finalize_probabilities();

		let observed: Vec<&CharObservation> = tally.observations().collect();
		assert_eq!(observed[0].chr(), '\0');
		assert!((observed[0].p() - 1.0 / 3.0).abs() < 1e-9);
		assert!((observed[0].cp() - 1.0 / 3.0).abs() < 1e-9);
		assert_eq!(observed[1].chr(), 'a');
		assert!((observed[1].p() - 2.0 / 3.0).abs() < 1e-9);
		assert!((observed[1].cp() - 1.0).abs() < 1e-9);

		let total_p: f64 = tally.observations().map(|o| o.p()).sum();
		assert!((total_p - 1.0).abs() < 1e-9);
	}

	#[test]
	fn finalize_is_idempotent() {
		let mut tally = SuccessorTally::new();
		tally.update('x');
		tally.update('y');
		tally.update('x');
		tally.finalize_probabilities();
		let once = tally.clone();
		tally.finalize_probabilities();
		assert_eq!(tally, once);
	}

	#[test]
	fn sample_respects_cumulative_bands() {
		let mut tally = SuccessorTally::new();
		tally.update('a');
		tally.update('a');
		tally.update('\0');
		tally.finalize_probabilities();

		// Bands: ['\0', 1/3), ['a', 1.0)
		assert_eq!(tally.sample(0.0), Some('\0'));
		assert_eq!(tally.sample(0.3), Some('\0'));
		assert_eq!(tally.sample(1.0 / 3.0), Some('a'));
		assert_eq!(tally.sample(0.9), Some('a'));
	}

	#[test]
	fn sample_falls_back_to_last_on_drift() {
		// Seven equal counts: the final cp lands slightly below 1.0
		let mut tally = SuccessorTally::new();
		for chr in "abcdefg".chars() {
			tally.update(chr);
		}
		tally.finalize_probabilities();

		let last = tally.observations().last().unwrap().chr();
		assert_eq!(tally.sample(0.999_999_999_999), Some(last));
	}

	#[test]
	fn sample_on_empty_tally_is_none() {
		let tally = SuccessorTally::new();
		assert_eq!(tally.sample(0.5), None);
	}

	#[test]
	fn display_shows_character_and_count_in_order() {
		let mut tally = SuccessorTally::new();
		tally.update('m');
		tally.update('m');
		tally.update('\0');
		tally.finalize_probabilities();

		let rendered = tally.to_string();
		let parts: Vec<&str> = rendered.split_whitespace().collect();
		assert_eq!(parts.len(), 2);
		assert_eq!(parts[0], "'\\0'x1");
		assert_eq!(parts[1], "'m'x2");
	}
}
