//! Chain command implementation.
//!
//! The `archlint chain` command validates every layer document found in the
//! knowledge base, in generation order, each against the one before it.

use std::io;
use std::path::{Path, PathBuf};

use crate::cli::args::ChainArgs;
use crate::config::{DocumentSource, KnowledgeBase, Settings, ValidationConfig};
use crate::error::Result;
use crate::model::Layer;
use crate::validate::{ValidationReport, Validator};

use super::dispatcher::{Command, CommandResult, Streams};
use super::report::emit;

/// The chain command implementation.
pub struct ChainCommand {
    project_root: PathBuf,
    args: ChainArgs,
}

impl ChainCommand {
    /// Create a new chain command.
    pub fn new(project_root: &Path, args: ChainArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }

    /// Validate layers in order until one is missing or fails.
    pub fn run_chain(kb: &KnowledgeBase, settings: &Settings) -> Vec<ValidationReport> {
        let validator = Validator::with_builtins();
        let mut reports = Vec::new();

        for layer in Layer::ALL {
            let path = kb.document_path(layer);
            if !path.exists() {
                let reason = if layer == Layer::Init {
                    "No init.json file found - skipping validation".to_string()
                } else {
                    format!("No {} file found - chain ends here", layer.file_name())
                };
                tracing::debug!(%layer, path = %path.display(), "document missing");
                reports.push(ValidationReport::skipped(layer, reason));
                break;
            }

            let config = ValidationConfig::for_layer(layer, kb)
                .with_document(DocumentSource::File(path))
                .with_settings(settings.clone());
            let report = validator.run(&config, &mut io::empty());
            let halt = report.exit_code() >= 2;
            reports.push(report);
            if halt {
                tracing::debug!(%layer, "layer failed; halting chain");
                break;
            }
        }

        reports
    }
}

impl Command for ChainCommand {
    fn execute(&self, streams: &mut Streams<'_>) -> Result<CommandResult> {
        let settings = Settings::load(&self.project_root)?;
        let format = self.args.report.format.unwrap_or(settings.format);
        let kb = KnowledgeBase::resolve(
            &self.project_root,
            self.args.report.knowledge_root.as_deref(),
            &settings,
        );

        let reports = Self::run_chain(&kb, &settings);
        emit(format, &reports, true, streams)?;

        let exit_code = reports
            .iter()
            .map(ValidationReport::exit_code)
            .max()
            .unwrap_or(0);
        Ok(CommandResult::from_exit_code(exit_code))
    }
}
