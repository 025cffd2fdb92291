use std::path::PathBuf;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use log::info;
use serde::Deserialize;

use charkov_core::model::LanguageModel;

#[derive(Parser, Debug)]
#[command(about = "Serve a character-level Markov model over HTTP.")]
struct Args {
	/// The training corpus (a text file, consumed line by line)
	corpus: PathBuf,

	/// The window length k (number of conditioning characters)
	#[arg(long, default_value = "2")]
	window: usize,

	/// Seed for the random source; omit for a non-deterministic seed
	#[arg(long)]
	seed: Option<u64>,

	/// Address to bind the server to
	#[arg(long, default_value = "127.0.0.1:5000")]
	addr: String,
}

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	start: String,
	length: Option<usize>,
}

struct SharedData {
	model: LanguageModel,
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates a text from the model, starting from the `start` query
/// parameter and extending it to `length` characters (or until an
/// unknown window stops generation early).
///
/// Takes the model lock for writing: sampling advances the shared
/// random source.
#[get("/v1/generate")]
async fn get_generated(
	data: web::Data<Mutex<SharedData>>,
	query: web::Query<GenerateParams>,
) -> impl Responder {
	let length = query.length.unwrap_or(50);
	if query.start.is_empty() {
		return HttpResponse::BadRequest().body("Start text cannot be empty");
	}

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	HttpResponse::Ok().body(shared_data.model.generate(&query.start, length))
}

/// HTTP GET endpoint `/v1/info`
///
/// Returns the model summary (window length, context count,
/// observation count) as JSON.
#[get("/v1/info")]
async fn get_info(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().json(shared_data.model.info())
}

/// HTTP GET endpoint `/v1/dump`
///
/// Returns the human-readable model dump as plain text, one
/// `<context> : <tally>` line per context.
#[get("/v1/dump")]
async fn get_dump(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().body(shared_data.model.to_string())
}

/// Main entry point for the server.
///
/// Trains the model once at startup, wraps it in a `Mutex` for thread
/// safety, and starts an Actix-web HTTP server. The lock is required
/// even for generation because the model owns its random source.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();
	let args = Args::parse();

	let mut model = match args.seed {
		Some(seed) => LanguageModel::with_seed(args.window, seed),
		None => LanguageModel::new(args.window),
	}
	.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

	model.train(&args.corpus)?;
	info!(
		"trained on {}: {} contexts, serving on {}",
		args.corpus.display(),
		model.context_count(),
		args.addr
	);

	let shared_model = web::Data::new(Mutex::new(SharedData { model }));

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.service(get_generated)
			.service(get_info)
			.service(get_dump)
	})
	.bind(args.addr)?
	.run()
	.await
}
