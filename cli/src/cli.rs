//! # CLI Interface
//!
//! Defines the command-line argument structure for `fraudbook` using
//! `clap` derive. Four subcommands share one input format: `sign`,
//! `detect`, `rectify` and `book`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use fraudbook_engine::transaction::Signature;

use crate::candidates::Candidate;
use crate::logging::LogFormat;

/// Fraudbook anti-fraud toolkit.
///
/// Signs transaction batches, looks for duplicate signatures hidden by
/// block reordering, picks the best-spreading key function, and files
/// amounts in a signature-indexed processing book.
#[derive(Parser, Debug)]
#[command(
    name = "fraudbook",
    about = "Fraudbook anti-fraud toolkit",
    version,
    propagate_version = true
)]
pub struct FraudbookCli {
    /// Default log directive when `RUST_LOG` is not set.
    #[arg(
        long,
        global = true,
        env = "FRAUDBOOK_LOG_LEVEL",
        default_value = "fraudbook=info,fraudbook_engine=info"
    )]
    pub log_level: String,

    /// Log output format. Logs always go to stderr.
    #[arg(
        long,
        global = true,
        env = "FRAUDBOOK_LOG_FORMAT",
        value_enum,
        ignore_case = true,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the fraudbook binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign a batch through a processing line and print it in line order.
    Sign(InputArgs),
    /// Report the block size that best exposes reordered duplicates.
    Detect(InputArgs),
    /// Score built-in key functions by maximum probe chain length.
    Rectify(RectifyArgs),
    /// Load the batch into a processing book and report its contents.
    Book(BookArgs),
}

/// Input shared by every subcommand.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// JSON file holding an array of transaction records.
    pub input: PathBuf,

    /// Timestamp of the critical transaction when the batch needs signing.
    ///
    /// The first record with this timestamp becomes the line's pivot.
    /// Defaults to the first record in the file.
    #[arg(long)]
    pub critical: Option<u64>,
}

/// Arguments for the `rectify` subcommand.
#[derive(Args, Debug)]
pub struct RectifyArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Comma-separated key functions to evaluate, in order.
    ///
    /// Accepted: timestamp, from-user, to-user, route, signature-prefix,
    /// signature-prefix-<n>, timestamp-mod-<n>.
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "timestamp,from-user,to-user,route,signature-prefix"
    )]
    pub candidates: Vec<Candidate>,

    /// Smallest table size the probe simulation may start from.
    #[arg(long)]
    pub initial_table_size: Option<usize>,
}

/// Arguments for the `book` subcommand.
#[derive(Args, Debug)]
pub struct BookArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Signature to remove after loading. Repeatable; applied in order.
    #[arg(long = "remove", value_name = "SIGNATURE")]
    pub removals: Vec<Signature>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        FraudbookCli::command().debug_assert();
    }

    #[test]
    fn rectify_defaults_to_every_builtin_candidate() {
        let cli = FraudbookCli::try_parse_from(["fraudbook", "rectify", "batch.json"]).unwrap();
        match cli.command {
            Commands::Rectify(args) => {
                assert_eq!(args.candidates.len(), 5);
                assert_eq!(args.candidates[0], Candidate::Timestamp);
                assert_eq!(args.initial_table_size, None);
            }
            other => panic!("expected rectify, got {other:?}"),
        }
    }

    #[test]
    fn book_collects_repeated_removals() {
        let cli = FraudbookCli::try_parse_from([
            "fraudbook",
            "--log-format",
            "json",
            "book",
            "batch.json",
            "--remove",
            "abc123",
            "--remove",
            "0bbzzz",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Commands::Book(args) => {
                let removals: Vec<&str> = args.removals.iter().map(Signature::as_str).collect();
                assert_eq!(removals, ["abc123", "0bbzzz"]);
            }
            other => panic!("expected book, got {other:?}"),
        }
    }

    #[test]
    fn illegal_removal_signature_is_rejected() {
        let result =
            FraudbookCli::try_parse_from(["fraudbook", "book", "batch.json", "--remove", "ABC"]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_candidate_is_rejected() {
        let result = FraudbookCli::try_parse_from([
            "fraudbook",
            "rectify",
            "batch.json",
            "--candidates",
            "timestamp,shoe-size",
        ]);
        assert!(result.is_err());
    }
}
