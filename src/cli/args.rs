//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::Layer;
use crate::validate::OutputFormat;

/// archlint - Validate layered C1/C2/C3 architecture documents.
#[derive(Debug, Parser)]
#[command(name = "archlint")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate one layer document against its parent
    Validate(ValidateArgs),

    /// Validate init, C1, C2, and C3 in order
    Chain(ChainArgs),
}

/// Options shared by every command that reads a knowledge base.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ReportArgs {
    /// Directory holding the layer documents
    #[arg(long, env = "ARCHLINT_KNOWLEDGE_ROOT")]
    pub knowledge_root: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Arguments for the `validate` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ValidateArgs {
    /// Layer to validate
    #[arg(value_enum)]
    pub layer: Layer,

    /// Document to validate, or `-` for stdin (default: stdin; init reads
    /// from the knowledge base)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Parent document (default: previous layer in the knowledge base)
    #[arg(long)]
    pub parent: Option<PathBuf>,

    #[command(flatten)]
    pub report: ReportArgs,
}

/// Arguments for the `chain` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ChainArgs {
    #[command(flatten)]
    pub report: ReportArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_validate_with_flags() {
        let cli = Cli::try_parse_from([
            "archlint",
            "--project",
            "/work",
            "validate",
            "c2",
            "--input",
            "c2.json",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.project, Some(PathBuf::from("/work")));
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.layer, Layer::C2);
        assert_eq!(args.input, Some(PathBuf::from("c2.json")));
        assert_eq!(args.report.format, Some(OutputFormat::Json));
    }

    #[test]
    fn layer_aliases() {
        let cli = Cli::try_parse_from(["archlint", "validate", "systems"]).unwrap();
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.layer, Layer::C1);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["archlint", "chain", "--debug"]).unwrap();
        assert!(cli.debug);
        assert!(matches!(cli.command, Commands::Chain(_)));
    }

    #[test]
    fn rejects_unknown_layer() {
        assert!(Cli::try_parse_from(["archlint", "validate", "c4"]).is_err());
    }
}
