//! Validate command implementation.
//!
//! The `archlint validate <layer>` command checks one document against its
//! parent and exits with the aggregated outcome.

use std::path::{Path, PathBuf};

use crate::cli::args::ValidateArgs;
use crate::config::{DocumentSource, KnowledgeBase, Settings, ValidationConfig};
use crate::error::Result;
use crate::model::Layer;
use crate::validate::{ValidationReport, Validator};

use super::dispatcher::{Command, CommandResult, Streams};
use super::report::emit;

/// The validate command implementation.
pub struct ValidateCommand {
    project_root: PathBuf,
    args: ValidateArgs,
}

impl ValidateCommand {
    /// Create a new validate command.
    pub fn new(project_root: &Path, args: ValidateArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }

    fn config(&self, kb: &KnowledgeBase, settings: Settings) -> ValidationConfig {
        let mut config = ValidationConfig::for_layer(self.args.layer, kb).with_settings(settings);
        if let Some(input) = &self.args.input {
            config = config.with_document(DocumentSource::from_arg(input));
        }
        if let Some(parent) = &self.args.parent {
            config = config.with_parent(parent);
        }
        config
    }
}

impl Command for ValidateCommand {
    fn execute(&self, streams: &mut Streams<'_>) -> Result<CommandResult> {
        let settings = Settings::load(&self.project_root)?;
        let format = self.args.report.format.unwrap_or(settings.format);
        let kb = KnowledgeBase::resolve(
            &self.project_root,
            self.args.report.knowledge_root.as_deref(),
            &settings,
        );
        let layer = self.args.layer;
        tracing::debug!(%layer, root = %kb.root().display(), "validating");

        // A project that has not been scanned yet has nothing to check.
        let init_path = kb.document_path(Layer::Init);
        let report = if layer == Layer::Init && self.args.input.is_none() && !init_path.exists()
        {
            ValidationReport::skipped(layer, "No init.json file found - skipping validation")
        } else {
            let config = self.config(&kb, settings);
            Validator::with_builtins().run(&config, &mut *streams.stdin)
        };

        emit(format, std::slice::from_ref(&report), false, streams)?;
        Ok(CommandResult::from_exit_code(report.exit_code()))
    }
}
