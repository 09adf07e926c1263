//! mbox-classify CLI: everything outside the classification core —
//! argument parsing, source validation, and report formatting.

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use mbox_classify::collection::{parse_match_count, Collection, CollectionStats, SyntheticCollection};
use mbox_classify::error::ClassifyError;
use mbox_classify::mailbox::Source;
use mbox_classify::scorer::{pick_winner, score_collections, total_emails};
use mbox_classify::vocabulary::Vocabulary;

const SPAM_LABEL: &str = "spam";

#[derive(Parser)]
#[command(
    name = "mbox-classify",
    version,
    about = "Classify an email against labeled mailbox collections using naive Bayes"
)]
struct Cli {
    /// Mailbox sources in training order; the last one is the email to
    /// classify. Use "-" for standard input.
    #[arg(required = true)]
    sources: Vec<String>,

    /// Print every collection's score before the winning label.
    #[arg(short, long)]
    verbose: bool,

    /// Emit the full report as JSON.
    #[arg(long)]
    json: bool,

    /// Synthetic spam collection: declared email count and geometric-mean
    /// per-word match count, e.g. "10:9" or "10:9/2".
    #[arg(long, value_name = "COUNT:MATCH")]
    spam: Option<String>,
}

#[derive(Debug, Serialize)]
struct Report {
    scores: Vec<ReportScore>,
    winner: String,
}

#[derive(Debug, Serialize)]
struct ReportScore {
    collection: String,
    /// Exact relative score, as `numerator/denominator`.
    exact: String,
    /// Approximate scaled probability, display only.
    probability: f64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("mbox-classify: {err:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let report = build_report(&cli)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    if cli.verbose {
        for score in &report.scores {
            println!("{}: {:.6e}", score.collection, score.probability);
        }
    }
    println!("{}", report.winner);
    Ok(())
}

fn build_report(cli: &Cli) -> Result<Report> {
    let synthetic = cli.spam.as_deref().map(parse_spam_descriptor).transpose()?;

    // One source is the target email; a run needs at least two training
    // classes, one of which the synthetic collection may provide.
    let minimum = if synthetic.is_some() { 2 } else { 3 };
    if cli.sources.len() < minimum {
        return Err(ClassifyError::Configuration(format!(
            "expected at least {minimum} mailbox sources, got {}",
            cli.sources.len()
        ))
        .into());
    }

    let sources: Vec<Source> = cli.sources.iter().map(|arg| Source::parse(arg)).collect();
    validate_sources(&sources)?;

    let Some((target, training)) = sources.split_last() else {
        return Err(ClassifyError::Configuration("no sources supplied".into()).into());
    };

    let email = target.open()?.next_email()?.unwrap_or_default();
    let vocabulary = Vocabulary::from_email(&email)
        .with_context(|| format!("classifying {}", target.display()))?;

    let mut collections: Vec<Collection> = Vec::with_capacity(training.len() + 1);
    for source in training {
        let mut reader = source.open()?;
        let stats = CollectionStats::collect(source.label(), &vocabulary, &mut reader)?;
        collections.push(Collection::Real(stats));
    }
    if let Some(synthetic) = synthetic {
        collections.push(Collection::Synthetic(synthetic));
    }

    let records = score_collections(&collections, &vocabulary);
    let winner = pick_winner(&records)
        .ok_or_else(|| ClassifyError::Configuration("no collections to score".into()))?;

    let total = total_emails(&collections);
    let class_count = collections.len();

    Ok(Report {
        winner: winner.label.clone(),
        scores: records
            .iter()
            .map(|record| ReportScore {
                collection: record.label.clone(),
                exact: record.score.to_string(),
                probability: record.approx_probability(total, class_count),
            })
            .collect(),
    })
}

/// Parse the `COUNT:MATCH` synthetic descriptor.
fn parse_spam_descriptor(arg: &str) -> Result<SyntheticCollection, ClassifyError> {
    let (count, match_count) = arg.split_once(':').ok_or_else(|| {
        ClassifyError::Configuration(format!(
            "synthetic descriptor must be COUNT:MATCH, got {arg:?}"
        ))
    })?;
    let count: u64 = count.trim().parse().map_err(|_| {
        ClassifyError::Configuration(format!("invalid synthetic email count {count:?}"))
    })?;
    let match_count = parse_match_count(match_count)?;
    SyntheticCollection::new(SPAM_LABEL, count, match_count)
}

fn validate_sources(sources: &[Source]) -> Result<(), ClassifyError> {
    let stdin_uses = sources
        .iter()
        .filter(|source| matches!(source, Source::Stdin))
        .count();
    if stdin_uses > 1 {
        return Err(ClassifyError::Configuration(
            "standard input may be used for at most one source".into(),
        ));
    }

    for source in sources {
        if let Source::File(path) = source {
            let metadata = std::fs::metadata(path).map_err(|err| {
                ClassifyError::Configuration(format!("{}: {err}", path.display()))
            })?;
            if !metadata.is_file() {
                return Err(ClassifyError::Configuration(format!(
                    "{} is not a regular file",
                    path.display()
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    fn cli(sources: Vec<String>, spam: Option<&str>) -> Cli {
        Cli {
            sources,
            verbose: false,
            json: false,
            spam: spam.map(str::to_owned),
        }
    }

    fn write_fixture(dir: &Path, name: &str, contents: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn cli_parses_flags_and_sources() {
        let cli = Cli::try_parse_from([
            "mbox-classify",
            "--spam",
            "10:9",
            "-v",
            "a.mbox",
            "b.mbox",
            "target.txt",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.spam.as_deref(), Some("10:9"));
        assert_eq!(cli.sources, vec!["a.mbox", "b.mbox", "target.txt"]);
    }

    #[test]
    fn spam_descriptor_parsing() {
        let spam = parse_spam_descriptor("10:9").unwrap();
        assert_eq!(spam.label(), "spam");
        assert_eq!(spam.email_count(), 10);

        assert!(parse_spam_descriptor("10:9/2").is_ok());
        assert!(parse_spam_descriptor("10:4.5").is_ok());

        // M > E, missing colon, bad count.
        assert!(parse_spam_descriptor("5:6").is_err());
        assert!(parse_spam_descriptor("10").is_err());
        assert!(parse_spam_descriptor("x:1").is_err());
        assert!(parse_spam_descriptor("-1:0").is_err());
    }

    #[test]
    fn too_few_sources_is_a_configuration_error() {
        let err = build_report(&cli(vec!["a".into(), "b".into()], None)).unwrap_err();
        assert!(err.to_string().contains("at least 3"));

        // With a synthetic collection only two sources are needed, so
        // one is too few.
        let err = build_report(&cli(vec!["a".into()], Some("10:9"))).unwrap_err();
        assert!(err.to_string().contains("at least 2"));
    }

    #[test]
    fn missing_source_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_fixture(dir.path(), "a.mbox", "hello\n");
        let b = write_fixture(dir.path(), "b.mbox", "foo\n");
        let missing = dir.path().join("missing.mbox").to_string_lossy().into_owned();

        let err = build_report(&cli(vec![a, b, missing], None)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ClassifyError>(),
            Some(ClassifyError::Configuration(_))
        ));
    }

    #[test]
    fn repeated_stdin_is_rejected() {
        let err = build_report(&cli(vec!["-".into(), "-".into(), "x".into()], None)).unwrap_err();
        assert!(err.to_string().contains("standard input"));
    }

    #[test]
    fn empty_target_email_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_fixture(dir.path(), "a.mbox", "hello\n");
        let b = write_fixture(dir.path(), "b.mbox", "foo\n");
        let target = write_fixture(dir.path(), "target.txt", "   \n");

        let err = build_report(&cli(vec![a, b, target], None)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ClassifyError>(),
            Some(ClassifyError::EmptyVocabulary)
        ));
    }

    #[test]
    fn end_to_end_two_collections() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_fixture(
            dir.path(),
            "a.mbox",
            "hello world\n\nFrom x@y z\n\nhello there\n",
        );
        let b = write_fixture(dir.path(), "b.mbox", "foo bar\n");
        let target = write_fixture(dir.path(), "target.txt", "hello foo\n");

        let report = build_report(&cli(vec![a, b, target], None)).unwrap();

        assert_eq!(report.winner, "a");
        let labels: Vec<&str> = report
            .scores
            .iter()
            .map(|score| score.collection.as_str())
            .collect();
        assert_eq!(labels, vec!["a", "b"]);
        assert_eq!(report.scores[0].exact, "9/16");
        assert_eq!(report.scores[1].exact, "4/9");
    }

    #[test]
    fn end_to_end_with_synthetic_collection() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_fixture(
            dir.path(),
            "a.mbox",
            "alpha beta\n\nFrom x@y z\n\nalpha beta\n\nFrom x@y z\n\nalpha beta\n",
        );
        let target = write_fixture(dir.path(), "target.txt", "alpha beta\n");

        let report = build_report(&cli(vec![a, target], Some("10:9"))).unwrap();

        assert_eq!(report.winner, "spam");
        assert_eq!(report.scores[0].exact, "64/25");
        assert_eq!(report.scores[1].exact, "275/36");
    }
}
