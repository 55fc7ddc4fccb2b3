//! Command-line interface for veritas.
//!
//! Provides commands for analysing documents, verifying content against the
//! ledger, browsing submissions and the audit trail, and filing deletion
//! requests.

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{ChatCompletionsOracle, FixtureOracle, SimilarityOracle};
use crate::core::access_log::{VERIFICATION_ENTITY, VERIFICATION_PURPOSE};
use crate::core::{
    AnalysisPipeline, AnalysisRequest, Archive, ScoreStats, SubmissionStore, VerificationResult,
};
use crate::domain::{AccessLog, Segment, Submission, SubmissionStatus};
use crate::integrity::{align, hash_bytes, offset_to_line_col, Alignment, Run};

/// veritas - content-integrity ledger
#[derive(Parser, Debug)]
#[command(name = "veritas")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the fingerprint of a document
    Hash {
        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Analyse a document and record it on the ledger
    Analyze {
        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Document title
        #[arg(short, long, default_value = "")]
        title: String,

        /// Record as a final submission instead of a draft
        #[arg(long = "final")]
        is_final: bool,

        /// Use a saved analysis JSON instead of calling the oracle
        #[arg(long)]
        analysis: Option<PathBuf>,
    },

    /// Highlight segments in a document without recording anything
    Align {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// JSON list of segments
        #[arg(short, long)]
        segments: PathBuf,

        /// Print the alignment as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether a document's exact content was recorded
    Verify {
        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// List submissions (newest first)
    Submissions {
        /// Maximum number of submissions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Only show submissions flagged for review (score above 20%)
        #[arg(long)]
        review: bool,
    },

    /// Remove a submission (ledger entries are kept)
    Remove {
        /// Submission ID
        submission_id: String,
    },

    /// Show the ledger (newest first)
    Ledger {
        /// Maximum number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// File a deletion request for a submission
    RequestDeletion {
        /// Submission ID
        submission_id: String,
    },

    /// List deletion requests
    Requests,

    /// Show the access log (newest first)
    Logs {
        /// Maximum number of records to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show similarity score statistics
    Stats,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Hash { input } => hash_document(input.as_deref()),
            Commands::Analyze {
                input,
                title,
                is_final,
                analysis,
            } => analyze_document(input.as_deref(), title, is_final, analysis).await,
            Commands::Align {
                input,
                segments,
                json,
            } => align_document(&input, &segments, json),
            Commands::Verify { input } => verify_document(input.as_deref()).await,
            Commands::Submissions { limit, review } => list_submissions(limit, review).await,
            Commands::Remove { submission_id } => remove_submission(&submission_id).await,
            Commands::Ledger { limit } => show_ledger(limit).await,
            Commands::RequestDeletion { submission_id } => request_deletion(&submission_id).await,
            Commands::Requests => list_requests().await,
            Commands::Logs { limit } => show_logs(limit).await,
            Commands::Stats => show_stats().await,
            Commands::Config => show_config(),
        }
    }
}

/// Read input bytes from a file or piped stdin
fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    if let Some(path) = path {
        return std::fs::read(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()));
    }

    if io::stdin().is_terminal() {
        anyhow::bail!("No input provided. Use --input <file> or pipe to stdin");
    }

    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .context("Failed to read from stdin")?;
    Ok(buffer)
}

fn read_text(path: Option<&Path>) -> Result<String> {
    let bytes = read_input(path)?;
    String::from_utf8(bytes).context("Input is not valid UTF-8 text")
}

fn hash_document(input: Option<&Path>) -> Result<()> {
    let bytes = read_input(input)?;
    let fingerprint = hash_bytes(&bytes)?;
    println!("{}", fingerprint);
    Ok(())
}

async fn analyze_document(
    input: Option<&Path>,
    title: String,
    is_final: bool,
    analysis: Option<PathBuf>,
) -> Result<()> {
    let config = crate::config::config()?;
    let status = if is_final {
        SubmissionStatus::Final
    } else {
        SubmissionStatus::Draft
    };
    let request = AnalysisRequest::from_bytes(title, read_input(input)?, status)?;

    let oracle: Box<dyn SimilarityOracle> = match analysis {
        Some(path) => Box::new(FixtureOracle::from_path(path)),
        None => Box::new(ChatCompletionsOracle::from_settings(&config.oracle)?),
    };

    let mut archive = Archive::open(&config.home).await?;
    let pipeline = AnalysisPipeline::from_settings(oracle, config.identity.clone(), &config.oracle);

    // On failure nothing is recorded and the input file is left as it was
    let outcome = pipeline
        .run(&mut archive, request)
        .await
        .context("Analysis failed; nothing was recorded")?;

    let submission = &outcome.submission;
    println!("Submission: {}", submission.id);
    println!("Title: {} (v{}, {})", submission.title, submission.version, submission.status);
    println!("Hash: {}", submission.hash);
    println!("Similarity: {:.1}%", submission.similarity_score);
    if !outcome.analysis.summary.is_empty() {
        println!("\n{}", outcome.analysis.summary);
    }

    print_alignment(&submission.content, &outcome.alignment);

    if !outcome.analysis.references.is_empty() {
        println!("\nReferences:");
        for reference in &outcome.analysis.references {
            println!("  - {} <{}>", reference.title, reference.url);
        }
    }

    Ok(())
}

fn align_document(input: &Path, segments_path: &Path, json: bool) -> Result<()> {
    let content = read_text(Some(input))?;
    let raw = std::fs::read_to_string(segments_path)
        .with_context(|| format!("Failed to read segments file: {}", segments_path.display()))?;
    let segments: Vec<Segment> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse segments file: {}", segments_path.display()))?;

    let alignment = align(&content, &segments);

    if json {
        println!("{}", serde_json::to_string_pretty(&alignment)?);
    } else {
        print_alignment(&content, &alignment);
    }
    Ok(())
}

fn print_alignment(content: &str, alignment: &Alignment) {
    println!(
        "\nSegments: {} highlighted, {} dropped",
        alignment.applied(),
        alignment.dropped()
    );

    for run in alignment.flagged() {
        if let Run::Flagged { range, segment, .. } = run {
            let pos = offset_to_line_col(content, range.start);
            println!(
                "  {}:{}  {:>3.0}%  \"{}\"{}",
                pos.line,
                pos.col,
                segment.similarity * 100.0,
                run.text(),
                segment
                    .source
                    .as_deref()
                    .map(|s| format!("  ({})", s))
                    .unwrap_or_default()
            );
        }
    }

    let rendered: String = alignment
        .runs()
        .iter()
        .map(|run| match run {
            Run::Plain { text, .. } => text.clone(),
            Run::Flagged { text, .. } => format!("[[{}]]", text),
        })
        .collect();
    println!("\n{}", rendered);
}

async fn verify_document(input: Option<&Path>) -> Result<()> {
    let content = read_text(input)?;
    let mut archive = Archive::open_default().await?;

    let result = archive.verifier().verify(&content);

    match &result {
        VerificationResult::Found {
            hash,
            entry,
            submission,
        } => {
            println!("AUTHENTIC: content is recorded on the ledger");
            println!("Hash: {}", hash);
            println!("Recorded: {} by {} ({})", entry.timestamp, entry.actor, entry.action);
            println!("Ledger submission: {}", entry.submission_id);
            match submission {
                Some(sub) => println!("Submission: {} \"{}\" v{}", sub.id, sub.title, sub.version),
                None => println!("Submission: no longer stored"),
            }
        }
        VerificationResult::NotFound { hash } => {
            println!("NOT FOUND: no ledger entry for this content");
            println!("Hash: {}", hash);
        }
    }

    archive
        .record_access(AccessLog::new(
            VERIFICATION_ENTITY,
            VERIFICATION_PURPOSE,
            format!("Hash: {}", result.hash().short()),
        ))
        .await?;

    Ok(())
}

/// Newest-first submissions, optionally only those flagged for review
fn select_submissions(store: &SubmissionStore, limit: usize, review: bool) -> Vec<&Submission> {
    if review {
        store.flagged_for_review().into_iter().take(limit).collect()
    } else {
        store.list(Some(limit)).iter().collect()
    }
}

async fn list_submissions(limit: usize, review: bool) -> Result<()> {
    let archive = Archive::open_default().await?;
    let submissions = select_submissions(archive.submissions(), limit, review);

    if submissions.is_empty() {
        println!("No submissions found.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<4}  {:<6}  {:>6}  {:<16}  TITLE",
        "ID", "VER", "STATUS", "SCORE", "HASH"
    );
    for sub in submissions {
        let pending = if archive.governance().pending_for(&sub.id).is_some() {
            "  [deletion pending]"
        } else {
            ""
        };
        println!(
            "{:<36}  {:<4}  {:<6}  {:>5.1}%  {:<16}  {}{}",
            sub.id,
            sub.version,
            sub.status.to_string(),
            sub.similarity_score,
            sub.hash.short(),
            sub.title,
            pending
        );
    }

    Ok(())
}

async fn remove_submission(submission_id: &str) -> Result<()> {
    let mut archive = Archive::open_default().await?;
    let removed = archive.remove_submission(submission_id).await?;
    println!("Removed {} \"{}\" (ledger entries kept)", removed.id, removed.title);
    Ok(())
}

async fn show_ledger(limit: usize) -> Result<()> {
    let archive = Archive::open_default().await?;
    let ledger = archive.ledger();

    if ledger.is_empty() {
        println!("Ledger is empty.");
        return Ok(());
    }

    for entry in ledger.recent(limit) {
        println!(
            "{}  {}  {:<16}  {:<36}  {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.hash,
            entry.action,
            entry.submission_id,
            entry.actor
        );
    }
    println!("\n{} entries total", ledger.len());
    Ok(())
}

async fn request_deletion(submission_id: &str) -> Result<()> {
    let mut archive = Archive::open_default().await?;
    let request = archive.file_deletion_request(submission_id).await?;
    println!(
        "Deletion request {} filed for {} ({})",
        request.id, request.submission_id, request.status
    );
    Ok(())
}

async fn list_requests() -> Result<()> {
    let archive = Archive::open_default().await?;
    let requests = archive.governance().requests();

    if requests.is_empty() {
        println!("No deletion requests.");
        return Ok(());
    }

    for request in requests {
        println!(
            "{}  {:<8}  {}  {}",
            request.request_date.format("%Y-%m-%d %H:%M:%S"),
            request.status.to_string(),
            request.id,
            request.submission_id
        );
    }
    Ok(())
}

async fn show_logs(limit: usize) -> Result<()> {
    let archive = Archive::open_default().await?;
    let log = archive.access_log();

    if log.is_empty() {
        println!("Access log is empty.");
        return Ok(());
    }

    for record in log.recent(limit) {
        println!(
            "{}  {:<20}  {:<24}  {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.entity,
            record.purpose,
            record.resource_id
        );
    }
    Ok(())
}

async fn show_stats() -> Result<()> {
    let archive = Archive::open_default().await?;
    let stats = archive.submissions().stats();

    println!("Submissions: {}", stats.total);
    println!("Mean similarity: {:.1}%", stats.mean_score);
    println!("Critical (>30%): {}", stats.critical);
    println!("Ledger entries: {}", archive.ledger().len());
    println!("\nDistribution:");
    for (label, count) in ScoreStats::BUCKET_LABELS.iter().zip(stats.histogram) {
        println!("  {:<7} {}", label, count);
    }
    Ok(())
}

fn show_config() -> Result<()> {
    let config = crate::config::config()?;

    println!("Home: {}", config.home.display());
    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none)"),
    }
    println!("Oracle endpoint: {}", config.oracle.endpoint);
    println!("Oracle model: {}", config.oracle.model);
    println!("Oracle timeout: {}s", config.oracle.timeout_seconds);
    println!("Max input chars: {}", config.oracle.max_input_chars);
    println!(
        "API key: {}",
        if config.oracle.api_key.is_some() { "set" } else { "not set" }
    );
    println!(
        "Identity: {} ({}, {:?})",
        config.identity.name, config.identity.id, config.identity.role
    );
    Ok(())
}
