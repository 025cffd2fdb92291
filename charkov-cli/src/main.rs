use std::path::PathBuf;

use clap::Parser;
use log::info;

use charkov_core::model::LanguageModel;

#[derive(Parser, Debug)]
#[command(about = "Train a character-level Markov model and generate text.")]
struct Args {
	/// The training corpus (a text file, consumed line by line)
	corpus: PathBuf,

	/// The window length k (number of conditioning characters)
	#[arg(long, default_value = "2")]
	window: usize,

	/// Seed for the random source; omit for a non-deterministic seed
	#[arg(long)]
	seed: Option<u64>,

	/// Initial text to start generation from
	#[arg(long)]
	start: String,

	/// Target output length in characters
	#[arg(long, default_value = "50")]
	length: usize,

	/// Number of texts to generate
	#[arg(long, default_value = "1")]
	count: usize,

	/// Print the human-readable model dump before generating
	#[arg(long)]
	dump: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::init();
	let args = Args::parse();

	// Seeded for reproducible output, unseeded for production use
	let mut model = match args.seed {
		Some(seed) => LanguageModel::with_seed(args.window, seed)?,
		None => LanguageModel::new(args.window)?,
	};

	model.train(&args.corpus)?;
	info!(
		"trained on {}: {} contexts",
		args.corpus.display(),
		model.context_count()
	);

	if args.dump {
		print!("{}", model);
	}

	for _ in 0..args.count {
		// Output may contain the end-of-line sentinel; printed as-is
		println!("{}", model.generate(&args.start, args.length));
	}

	Ok(())
}
