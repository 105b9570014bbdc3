mod classify;
mod entity;
#[cfg(feature = "onnx")]
mod onnx;
mod pipeline;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use classify::{InlineClassifier, LexiconClassifier};
use pipeline::DocumentOutcome;

#[derive(Parser)]
#[command(name = "wiretally", about = "Tally person/location mentions in news-wire SGML batches")]
struct Cli {
    /// Batch file of concatenated articles (omit for demo mode)
    input: Option<PathBuf>,

    /// Element whose text content is one article body
    #[arg(long, default_value = "BODY")]
    body_tag: String,

    /// Tab-separated TYPE<TAB>phrase gazetteer for the built-in classifier
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Max articles to process (default: all)
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Print the report as JSON instead of per-article tables
    #[arg(long)]
    json: bool,

    /// Directory holding model.onnx + tokenizer.json for the ONNX classifier
    #[cfg(feature = "onnx")]
    #[arg(long)]
    model_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let classifier = build_classifier(&cli)?;

    match &cli.input {
        Some(path) => {
            run_batch(&cli, path, classifier.as_ref())?;
            println!("\nDone in {}", format_duration(t0.elapsed()));
        }
        None => run_demo(classifier.as_ref())?,
    }

    Ok(())
}

fn build_classifier(cli: &Cli) -> Result<Box<dyn InlineClassifier>> {
    #[cfg(feature = "onnx")]
    if let Some(dir) = &cli.model_dir {
        info!("Loading ONNX classifier from {}", dir.display());
        return Ok(Box::new(onnx::OnnxClassifier::load(dir)?));
    }

    match &cli.lexicon {
        Some(path) => {
            let classifier = LexiconClassifier::from_path(path)?;
            info!("Loaded lexicon from {}", path.display());
            Ok(Box::new(classifier))
        }
        None => Ok(Box::new(LexiconClassifier::demo())),
    }
}

fn run_batch(cli: &Cli, path: &Path, classifier: &dyn InlineClassifier) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file {}", path.display()))?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len}")?
            .progress_chars("=> "),
    );

    let json = cli.json;
    let report = pipeline::run(
        &raw,
        &cli.body_tag,
        cli.limit,
        classifier,
        |index, total, outcome| {
            if pb.length() == Some(0) {
                pb.set_length(total as u64);
            }
            if !json {
                pb.suspend(|| print_document(index, total, outcome));
            }
            pb.inc(1);
        },
    )?;
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    let failed = report.failed();
    if failed > 0 {
        info!("{} of {} document(s) failed", failed, report.documents.len());
    }
    Ok(())
}

fn print_document(index: usize, total: usize, outcome: &DocumentOutcome) {
    println!("{} of {}...", index, total);
    match outcome {
        DocumentOutcome::Counts(counts) => {
            println!("Name(s):\t{}", render_counts(&counts.people));
            println!("Location(s):\t{}", render_counts(&counts.locations));
        }
        DocumentOutcome::Failed(err) => println!("Failed:\t{}", err),
    }
    println!();
}

const DEMO_SENTENCES: [&str; 2] = [
    "Good afternoon Beibei Yang, how are you today?",
    "I'm from EMC. Its headquarter is in Hopkinton MA USA.",
];

/// Exercise the classifier directly: plain transcripts first, then the
/// inline-tagged form of each sentence through the adapter.
fn run_demo(classifier: &dyn InlineClassifier) -> Result<()> {
    for sentence in DEMO_SENTENCES {
        println!("{}", classifier.classify_plain(sentence)?);
    }
    for sentence in DEMO_SENTENCES {
        println!("{}", classify::tag(sentence, classifier)?);
    }
    Ok(())
}

/// Render a count table as `{key: n, ...}` with keys sorted for stable output.
fn render_counts(table: &HashMap<String, u32>) -> String {
    let mut entries: Vec<_> = table.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    let inner: Vec<String> = entries.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
    format!("{{{}}}", inner.join(", "))
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_render_sorted() {
        let mut table = HashMap::new();
        table.insert("Nixon".to_string(), 2);
        table.insert("Beibei Yang".to_string(), 1);
        assert_eq!(render_counts(&table), "{Beibei Yang: 1, Nixon: 2}");
    }

    #[test]
    fn empty_counts_render_braces() {
        assert_eq!(render_counts(&HashMap::new()), "{}");
    }
}
