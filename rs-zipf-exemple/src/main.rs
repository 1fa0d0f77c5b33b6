use std::env;

use rs_zipf_core::analysis::{AnalysisConfig, ScoreFn, ZipfEvaluation, analyze_text};
use rs_zipf_core::sink::{BinarySink, ResultsSink, TextReportSink};
use rs_zipf_core::text::Text;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Text to analyze, "./data/alice.txt" by default
    // The corpus name is the file name without extension
    let path = env::args().nth(1).unwrap_or_else(|| "./data/alice.txt".to_owned());
    let author = env::args().nth(2).unwrap_or_else(|| "Unknown".to_owned());
    let text = Text::from_file(&path)?.with_author(&author);
    println!("{text}");

    // Default configuration: bigrams and trigrams, window radius 2, PMI
    let mut config = AnalysisConfig::default();

    // Build 2-, 3- and 4-grams (the end is exclusive)
    config.set_ngram_range(2, 5)?;

    // Pair every word with the 3 words before and after it
    config.set_radius(3)?;

    // Normalized PMI is bounded in [-1, 1] (marginals over the pairs), easier to compare across texts
    config.score_fn = ScoreFn::Npmi;

    // Invalid values are rejected and leave the configuration untouched
    match config.set_radius(0) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Rejected: {e}"),
    }
    match config.set_ngram_range(1, 11) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Rejected: {e}"),
    }

    let report = analyze_text(&text, &config)?;

    println!("\n- - - - - ZIPF'S LAW ANALYSIS - - - - -\n");
    println!("{} tokens, {} distinct", report.token_count, report.vocabulary_size());
    match &report.zipf {
        ZipfEvaluation::Fitted(fit) => {
            println!("exponent {:.3}, correlation {:.4}, r² {:.4}", fit.exponent, fit.correlation, fit.r_squared);
            for ((token, point), zipf) in report.frequencies.ranked_tokens().iter().zip(&fit.points).take(10) {
                println!(
                    "{:>3}. {:<12} observed {:>6}  predicted {:>9.1}  f(1)/r {:>9.1}",
                    point.rank(), token.as_str(), point.frequency(), zipf.predicted, zipf.classic
                );
            }
        }
        ZipfEvaluation::InsufficientData { usable_points } => {
            println!("Not enough data to fit ({usable_points} usable ranks)");
        }
    }

    println!("\n\n- - - - - N-GRAMS ANALYSIS - - - - -\n");
    for table in &report.ngrams {
        println!("\n{}-GRAMs", table.n());
        println!("---------");
        for (ngram, count) in table.entries_at_least(config.min_count).into_iter().take(10) {
            println!("{ngram}: {count}");
        }
    }

    println!("\n\n- - - - - COLLOCATIONS ANALYSIS - - - - -\n");
    for (token, partners) in report.collocations.partner_counts().into_iter().take(10) {
        println!("{token} occurs in {partners} collocations");
    }
    println!();
    for pair in report.collocations.ranked().into_iter().filter(|p| p.count >= config.min_count).take(10) {
        println!("{} {}: {} ({:?})", pair.left, pair.right, pair.count, pair.association);
    }

    // Export the text reports and the binary report to ./data/output
    let mut sinks: Vec<Box<dyn ResultsSink>> = vec![
        Box::new(TextReportSink::new("./data/output")),
        Box::new(BinarySink::new("./data/output")),
    ];
    for sink in sinks.iter_mut() {
        sink.accept(&report)?;
    }

    Ok(())
}
