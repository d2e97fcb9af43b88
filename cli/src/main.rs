// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Fraudbook CLI
//!
//! Entry point for the `fraudbook` binary. Parses CLI arguments, initializes
//! logging, loads a batch file and prints one JSON report on stdout.
//!
//! The binary supports four subcommands:
//!
//! - `sign`    — sign a batch through a processing line
//! - `detect`  — find the block size that best exposes reordered duplicates
//! - `rectify` — score built-in key functions by maximum probe chain length
//! - `book`    — file amounts in a processing book and apply removals

mod candidates;
mod cli;
mod input;
mod logging;
mod report;

use anyhow::{Context, Result};
use clap::Parser;

use fraudbook_engine::detection::{FraudDetection, ProbeTableConfig};
use fraudbook_engine::storage::ProcessingBook;
use fraudbook_engine::transaction::Transaction;

use cli::{BookArgs, Commands, FraudbookCli, InputArgs, RectifyArgs};
use input::Batch;
use report::{BookBody, CandidateScore, RectifyBody, Removal, Report, SignBody, SignedRecord};

fn main() -> Result<()> {
    let cli = FraudbookCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    let output = match cli.command {
        Commands::Sign(args) => sign(&args)?,
        Commands::Detect(args) => detect(&args)?,
        Commands::Rectify(args) => rectify(&args)?,
        Commands::Book(args) => book(&args)?,
    };
    println!("{}", output);
    Ok(())
}

/// Loads the input file and signs it if needed.
fn load_batch(args: &InputArgs) -> Result<Batch> {
    let records = input::load_records(&args.input)?;
    input::prepare_batch(records, args.critical)
        .with_context(|| format!("failed to sign batch from {}", args.input.display()))
}

fn signed_records(batch: &Batch) -> Vec<SignedRecord<'_>> {
    batch
        .transactions
        .iter()
        .zip(&batch.amounts)
        .map(|(transaction, &amount)| SignedRecord {
            transaction,
            amount,
        })
        .collect()
}

/// `fraudbook sign`: the signed batch in line order.
fn sign(args: &InputArgs) -> Result<String> {
    let batch = load_batch(args)?;
    let body = SignBody {
        line_signed: batch.line_signed,
        replaced_signatures: batch.replaced_signatures,
        records: signed_records(&batch),
    };
    let report = Report::new("sign", batch.transactions.len(), body);
    Ok(report.to_json()?)
}

/// `fraudbook detect`: the best block size and its score.
fn detect(args: &InputArgs) -> Result<String> {
    let batch = load_batch(args)?;
    let suspicion = FraudDetection::new(&batch.transactions)
        .detect_by_blocks()
        .context("duplicate detection failed")?;

    tracing::info!(
        block_size = suspicion.block_size,
        score = %suspicion.score,
        "detection finished"
    );
    let report = Report::new("detect", batch.transactions.len(), suspicion);
    Ok(report.to_json()?)
}

/// `fraudbook rectify`: MPCL of every requested key function.
fn rectify(args: &RectifyArgs) -> Result<String> {
    let batch = load_batch(&args.input)?;
    let probe_config = match args.initial_table_size {
        Some(minimum) => ProbeTableConfig::starting_at(minimum),
        None => ProbeTableConfig::default(),
    };
    let initial_table_size = probe_config.sizes().first().copied().unwrap_or_default();

    let functions: Vec<_> = args
        .candidates
        .iter()
        .copied()
        .map(|candidate| move |tx: &Transaction| candidate.key(tx))
        .collect();

    let result = FraudDetection::with_probe_config(&batch.transactions, probe_config)
        .rectify(&functions)
        .context("key function selection failed")?;

    let winner = args.candidates[result.index];
    tracing::info!(winner = %winner, mpcl = result.mpcl, "rectification finished");

    let body = RectifyBody {
        initial_table_size,
        winner: winner.to_string(),
        winner_index: result.index,
        mpcl: result.mpcl,
        candidates: args
            .candidates
            .iter()
            .zip(&result.mpcls)
            .map(|(candidate, &mpcl)| CandidateScore {
                name: candidate.to_string(),
                mpcl,
            })
            .collect(),
    };
    let report = Report::new("rectify", batch.transactions.len(), body);
    Ok(report.to_json()?)
}

/// `fraudbook book`: load amounts, apply removals, dump the book.
fn book(args: &BookArgs) -> Result<String> {
    let batch = load_batch(&args.input)?;
    let mut book = ProcessingBook::new();
    for (tx, &amount) in batch.transactions.iter().zip(&batch.amounts) {
        book.insert(tx, amount);
    }
    tracing::info!(
        size = book.len(),
        errors = book.error_count(),
        depth = book.depth(),
        "book loaded"
    );

    let mut removals = Vec::with_capacity(args.removals.len());
    for signature in &args.removals {
        // Lookups only read the signature.
        let probe = Transaction::new(0, "", "").with_signature(signature.clone());
        let removal = match book.remove(&probe) {
            Ok(amount) => Removal {
                signature: signature.to_string(),
                amount: Some(amount),
                error: None,
            },
            Err(err) => {
                tracing::warn!(%signature, "removal failed: {}", err);
                Removal {
                    signature: signature.to_string(),
                    amount: None,
                    error: Some(err.to_string()),
                }
            }
        };
        removals.push(removal);
    }

    let body = BookBody {
        size: book.len(),
        error_count: book.error_count(),
        depth: book.depth(),
        removals,
        entries: book.entries().into_iter().map(SignedRecord::from).collect(),
    };
    let report = Report::new("book", batch.transactions.len(), body);
    Ok(report.to_json()?)
}
