use rs_zipf_core::AnalysisError;
use rs_zipf_core::analysis::{
	AnalysisConfig, CollocationTable, FrequencyTable, NGramTable, ScoreFn, ZipfEvaluation, analyze_text, evaluate,
	tokenize,
};
use rs_zipf_core::sink::{BinarySink, ResultsSink, TextReportSink};
use rs_zipf_core::text::Text;

const OPENING: &str = "# Source: public domain\n\
It was the best of times, it was the worst of times, it was the age of wisdom, \
it was the age of foolishness, it was the epoch of belief, it was the epoch of \
incredulity, it was the season of Light, it was the season of Darkness.";

#[test]
fn frequency_and_ngram_sums_match_sequence_length() {
	let tokens = tokenize(OPENING);
	assert_eq!(tokens.len(), 48);

	let frequencies = FrequencyTable::count(&tokens);
	assert_eq!(frequencies.iter().map(|(_, c)| c).sum::<u64>(), 48);

	for n in 1..=tokens.len() {
		let table = NGramTable::build(&tokens, n).unwrap();
		assert_eq!(table.total(), (tokens.len() - n + 1) as u64);
	}
}

#[test]
fn most_frequent_words_rank_first() {
	let frequencies = FrequencyTable::count(&tokenize(OPENING));
	let top: Vec<(&str, u64)> = frequencies
		.ranked_tokens()
		.into_iter()
		.take(4)
		.map(|(t, p)| (t.as_str(), p.frequency()))
		.collect();
	assert_eq!(top, vec![("it", 8), ("was", 8), ("the", 8), ("of", 8)]);
}

#[test]
fn synthetic_zipf_text_fits_better_than_uniform_text() {
	// word k repeated 360 / k times
	let mut zipfian = String::new();
	for k in 1..=12_usize {
		for _ in 0..(360 / k) {
			zipfian.push_str(&format!("w{k} "));
		}
	}
	let uniform: String = (1..=12).flat_map(|k| std::iter::repeat_n(format!("w{k} "), 30)).collect();

	let zipf_eval = evaluate(&FrequencyTable::count(&tokenize(&zipfian)).rank_frequencies());
	let uniform_eval = evaluate(&FrequencyTable::count(&tokenize(&uniform)).rank_frequencies());

	let zipf_fit = zipf_eval.fit().unwrap();
	assert!(zipf_fit.correlation < -0.999);
	assert!(zipf_fit.log_mse < 1e-3);
	assert!(zipf_eval.goodness().unwrap() > uniform_eval.goodness().unwrap() + 0.9);
}

#[test]
fn invalid_parameters_are_rejected() {
	let tokens = tokenize("a b c");
	assert!(matches!(NGramTable::build(&tokens, 0), Err(AnalysisError::InvalidParameter { .. })));
	assert!(matches!(
		CollocationTable::build(&tokens, 0, ScoreFn::Pmi),
		Err(AnalysisError::InvalidParameter { .. })
	));
}

#[test]
fn empty_text_flows_through_without_errors() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("blank.txt");
	std::fs::write(&path, "\n   \n").unwrap();

	let report = analyze_text(&Text::from_file(&path).unwrap(), &AnalysisConfig::default()).unwrap();
	assert_eq!(report.token_count, 0);
	assert!(report.frequencies.is_empty());
	assert!(report.ngrams.iter().all(NGramTable::is_empty));
	assert!(report.collocations.is_empty());
	assert!(matches!(report.zipf, ZipfEvaluation::InsufficientData { .. }));
}

#[test]
fn file_to_sinks() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("two_cities.txt");
	std::fs::write(&path, OPENING).unwrap();

	let text = Text::from_file(&path).unwrap().with_author("Dickens");
	let mut config = AnalysisConfig::default();
	config.set_radius(1).unwrap();
	config.score_fn = ScoreFn::Npmi;
	let report = analyze_text(&text, &config).unwrap();

	assert_eq!(report.author, "Dickens");
	assert_eq!(report.collocations.count("it", "was"), 8);
	assert_eq!(report.collocations.count("was", "it"), 8);
	assert_eq!(report.ngram_table(2).unwrap().get(&["it", "was"]), 8);

	let output = dir.path().join("output");
	let mut text_sink = TextReportSink::new(&output);
	let mut binary_sink = BinarySink::new(&output);
	text_sink.accept(&report).unwrap();
	binary_sink.accept(&report).unwrap();

	let ngrams = std::fs::read_to_string(output.join("two_cities_n_grams_result.txt")).unwrap();
	assert!(ngrams.starts_with("N-grams analysis for \"two_cities\" by Dickens"));
	assert!(ngrams.contains("it was: 8\n"));
	assert_eq!(BinarySink::read(output.join("two_cities.bin")).unwrap(), report);
}
