use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use rs_zipf_core::AnalysisError;
use rs_zipf_core::analysis::{AnalysisConfig, CorpusReport, ScoreFn, analyze_many};
use rs_zipf_core::io::{list_files, normalize_folder};
use rs_zipf_core::sink::{ResultsSink, TextReportSink};
use rs_zipf_core::text::{Text, TextSource};

/// Startup settings, read from the environment.
struct ServerConfig {
	bind: String,
	data_dir: PathBuf,
	output_dir: PathBuf,
}

impl ServerConfig {
	/// - `ZIPF_BIND` (default `127.0.0.1:5000`)
	/// - `ZIPF_DATA_DIR` (default `./data`)
	/// - `ZIPF_OUTPUT_DIR` (default `<data dir>/output`)
	fn from_env() -> Self {
		let data_dir = normalize_folder(&env::var("ZIPF_DATA_DIR").unwrap_or_else(|_| "./data".to_owned()));
		let output_dir = env::var("ZIPF_OUTPUT_DIR")
			.map(PathBuf::from)
			.unwrap_or_else(|_| data_dir.join("output"));
		Self {
			bind: env::var("ZIPF_BIND").unwrap_or_else(|_| "127.0.0.1:5000".to_owned()),
			data_dir,
			output_dir,
		}
	}
}

/// Query parameters of `/v1/load_corpora`
#[derive(Deserialize)]
struct LoadParams {
	names: Option<String>, // comma separated, file stems in the data dir or http(s) URLs
	author: Option<String>,
	n_start: Option<usize>,
	n_end: Option<usize>,
	radius: Option<usize>,
	score: Option<String>,
	min_count: Option<u64>,
	export: Option<bool>,
}

#[derive(Deserialize)]
struct CorpusQuery {
	name: String,
	n: Option<usize>,
	min_count: Option<u64>,
	limit: Option<usize>,
}

#[derive(Serialize)]
struct NGramEntry {
	ngram: String,
	count: u64,
}

#[derive(Serialize)]
struct PartnerEntry<'a> {
	token: &'a str,
	collocations: usize,
}

struct SharedData {
	reports: HashMap<String, CorpusReport>,
}

struct Settings {
	data_dir: PathBuf,
	output_dir: PathBuf,
}

impl LoadParams {
	/// Builds the analysis configuration, defaults for missing values.
	fn config(&self) -> Result<AnalysisConfig, AnalysisError> {
		let mut config = AnalysisConfig::default();
		if self.n_start.is_some() || self.n_end.is_some() {
			config.set_ngram_range(self.n_start.unwrap_or(config.n_start()), self.n_end.unwrap_or(config.n_end()))?;
		}
		if let Some(radius) = self.radius {
			config.set_radius(radius)?;
		}
		if let Some(score) = &self.score {
			config.score_fn = ScoreFn::parse(score)?;
		}
		if let Some(min_count) = self.min_count {
			config.min_count = min_count;
		}
		Ok(config)
	}

	/// Resolves each requested name to a text.
	fn texts(&self, settings: &Settings) -> Result<Vec<Text>, String> {
		let names = match &self.names {
			Some(s) if !s.trim().is_empty() => s.trim(),
			_ => return Err("Missing or empty corpus name".to_owned()),
		};
		let author = self.author.as_deref().unwrap_or("Unknown");

		names
			.split(',')
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.map(|name| {
				let text = if name.starts_with("http://") || name.starts_with("https://") {
					let stem = name.rsplit('/').next().unwrap_or(name).trim_end_matches(".txt");
					Text::new(stem, TextSource::Url(name.to_owned()))
				} else {
					check_stem(name)?;
					Text::from_file(settings.data_dir.join(format!("{name}.txt")))
				};
				text.map(|t| t.with_author(author)).map_err(|e| e.to_string())
			})
			.collect()
	}
}

/// A corpus name must be a single file stem inside the data dir.
fn check_stem(name: &str) -> Result<(), String> {
	if name.contains(['/', '\\']) || name == "." || name == ".." {
		return Err(format!("Invalid corpus name '{name}': expected a file stem from /v1/corpora"));
	}
	Ok(())
}

fn error_response(error: &AnalysisError) -> HttpResponse {
	match error {
		AnalysisError::InvalidParameter { .. } => HttpResponse::BadRequest().body(error.to_string()),
		_ => HttpResponse::InternalServerError().body(error.to_string()),
	}
}

/// Runs `f` on the report named `name`, 404 if it was never loaded.
fn with_report<F>(data: &web::Data<Mutex<SharedData>>, name: &str, f: F) -> HttpResponse
where
	F: FnOnce(&CorpusReport) -> HttpResponse,
{
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Report lock failed"),
	};
	match shared_data.reports.get(name) {
		Some(report) => f(report),
		None => HttpResponse::NotFound().body(format!("Corpus {name} is not loaded")),
	}
}

#[get("/v1/corpora")]
async fn get_corpora(settings: web::Data<Settings>) -> impl Responder {
	match list_files(&settings.data_dir, "txt") {
		Ok(names) => HttpResponse::Ok().body(names.join("\n")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list corpora"),
	}
}

#[get("/v1/loaded_corpora")]
async fn get_loaded_corpora(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Report lock failed"),
	};
	let mut names: Vec<&str> = shared_data.reports.keys().map(String::as_str).collect();
	names.sort();
	HttpResponse::Ok().body(names.join("\n"))
}

/// HTTP PUT endpoint `/v1/load_corpora`
///
/// Analyzes every requested corpus (in parallel, off the async workers)
/// and stores the reports, replacing older ones with the same name.
/// With `export=true` the text reports are also written to the output dir.
#[put("/v1/load_corpora")]
async fn put_corpora(
	data: web::Data<Mutex<SharedData>>,
	settings: web::Data<Settings>,
	query: web::Query<LoadParams>,
) -> impl Responder {
	let config = match query.config() {
		Ok(c) => c,
		Err(e) => return error_response(&e),
	};
	let texts = match query.texts(&settings) {
		Ok(t) => t,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let results = match web::block(move || analyze_many(texts, &config)).await {
		Ok(r) => r,
		Err(_) => return HttpResponse::InternalServerError().body("Analysis task failed"),
	};

	let mut reports = Vec::with_capacity(results.len());
	for (name, result) in results {
		match result {
			Ok(report) => reports.push(report),
			Err(e) => {
				warn!("failed to analyze {name}: {e}");
				return error_response(&e);
			}
		}
	}

	if query.export.unwrap_or(false) {
		let mut sink = TextReportSink::new(&settings.output_dir);
		for report in &reports {
			if let Err(e) = sink.accept(report) {
				return error_response(&e);
			}
		}
	}

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Report lock failed"),
	};
	let names: Vec<String> = reports.iter().map(|r| r.name.clone()).collect();
	for report in reports {
		shared_data.reports.insert(report.name.clone(), report);
	}
	info!("loaded corpora: {}", names.join(", "));

	HttpResponse::Ok().body(format!("Corpora loaded successfully: {}", names.join(", ")))
}

#[get("/v1/zipf")]
async fn get_zipf(data: web::Data<Mutex<SharedData>>, query: web::Query<CorpusQuery>) -> impl Responder {
	with_report(&data, &query.name, |report| HttpResponse::Ok().json(&report.zipf))
}

/// HTTP GET endpoint `/v1/ngrams`
///
/// Most common n-grams of order `n` (default: first built order),
/// keeping counts >= `min_count` (default: the corpus configuration).
#[get("/v1/ngrams")]
async fn get_ngrams(data: web::Data<Mutex<SharedData>>, query: web::Query<CorpusQuery>) -> impl Responder {
	with_report(&data, &query.name, |report| {
		let n = query.n.unwrap_or(report.config.n_start());
		let Some(table) = report.ngram_table(n) else {
			return HttpResponse::BadRequest().body(format!(
				"n must be in {}..{}",
				report.config.n_start(),
				report.config.n_end()
			));
		};
		let entries: Vec<NGramEntry> = table
			.entries_at_least(query.min_count.unwrap_or(report.config.min_count))
			.into_iter()
			.take(query.limit.unwrap_or(usize::MAX))
			.map(|(ngram, count)| NGramEntry { ngram: ngram.to_string(), count })
			.collect();
		HttpResponse::Ok().json(entries)
	})
}

#[get("/v1/collocations")]
async fn get_collocations(data: web::Data<Mutex<SharedData>>, query: web::Query<CorpusQuery>) -> impl Responder {
	with_report(&data, &query.name, |report| {
		let min_count = query.min_count.unwrap_or(report.config.min_count);
		let pairs: Vec<_> = report
			.collocations
			.ranked()
			.into_iter()
			.filter(|p| p.count >= min_count)
			.take(query.limit.unwrap_or(100))
			.collect();
		HttpResponse::Ok().json(pairs)
	})
}

#[get("/v1/partners")]
async fn get_partners(data: web::Data<Mutex<SharedData>>, query: web::Query<CorpusQuery>) -> impl Responder {
	with_report(&data, &query.name, |report| {
		let entries: Vec<PartnerEntry> = report
			.collocations
			.partner_counts()
			.into_iter()
			.map(|(token, collocations)| PartnerEntry { token: token.as_str(), collocations })
			.collect();
		HttpResponse::Ok().json(entries)
	})
}

/// Main entry point for the server.
///
/// Starts with no corpus loaded; `PUT /v1/load_corpora` analyzes texts
/// from the data directory (or URLs) and keeps the reports in memory.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let config = ServerConfig::from_env();
	info!("data dir {}, listening on {}", config.data_dir.display(), config.bind);

	let shared_data = web::Data::new(Mutex::new(SharedData { reports: HashMap::new() }));
	let settings = web::Data::new(Settings { data_dir: config.data_dir, output_dir: config.output_dir });

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.app_data(settings.clone())
			.service(get_corpora)
			.service(get_loaded_corpora)
			.service(put_corpora)
			.service(get_zipf)
			.service(get_ngrams)
			.service(get_collocations)
			.service(get_partners)
	})
		.bind(config.bind.as_str())?
		.run()
		.await
}
