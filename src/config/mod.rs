//! Run configuration.
//!
//! Nothing in the validator reads the working directory or the environment
//! directly. Callers describe a run with a [`ValidationConfig`]:
//! - which layer is being validated
//! - where its document comes from ([`DocumentSource`])
//! - which parent document it must descend from
//! - the project [`Settings`]
//!
//! [`KnowledgeBase`] resolves the conventional file layout used when paths
//! are not given explicitly.
//!
//! # Example
//!
//! ```
//! use archlint::config::{KnowledgeBase, ValidationConfig, DocumentSource};
//! use archlint::model::Layer;
//!
//! let kb = KnowledgeBase::new("knowledge-base");
//! let config = ValidationConfig::for_layer(Layer::C2, &kb);
//!
//! assert_eq!(config.document, DocumentSource::Stdin);
//! assert_eq!(
//!     config.parent.as_deref(),
//!     Some(std::path::Path::new("knowledge-base/c1-systems.json"))
//! );
//! ```

pub mod settings;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::model::Layer;

pub use settings::{Settings, DEFAULT_KNOWLEDGE_ROOT, SETTINGS_FILE};

/// Where the document under validation is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Stdin,
    File(PathBuf),
}

impl DocumentSource {
    /// Parse a CLI value: `-` means standard input.
    pub fn from_arg(arg: &Path) -> Self {
        if arg == Path::new("-") {
            DocumentSource::Stdin
        } else {
            DocumentSource::File(arg.to_path_buf())
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSource::Stdin => write!(f, "<stdin>"),
            DocumentSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// The directory holding the layer documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBase {
    root: PathBuf,
}

impl KnowledgeBase {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve `root` against the project directory.
    pub fn in_project(project: &Path, root: &Path) -> Self {
        Self::new(project.join(root))
    }

    /// Pick the knowledge root for a project.
    ///
    /// An explicit root (flag or `ARCHLINT_KNOWLEDGE_ROOT`) wins over the
    /// settings file, which wins over the default.
    pub fn resolve(project: &Path, explicit: Option<&Path>, settings: &Settings) -> Self {
        let root = explicit.unwrap_or(settings.knowledge_root.as_path());
        Self::in_project(project, root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Conventional path of a layer's document.
    pub fn document_path(&self, layer: Layer) -> PathBuf {
        self.root.join(layer.file_name())
    }

    /// Conventional path of a layer's parent document.
    pub fn parent_path(&self, layer: Layer) -> Option<PathBuf> {
        layer.parent().map(|parent| self.document_path(parent))
    }
}

/// Everything one validation run needs.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub layer: Layer,
    pub document: DocumentSource,
    /// Parent document path; `None` only for the init layer.
    pub parent: Option<PathBuf>,
    pub settings: Settings,
}

impl ValidationConfig {
    /// Conventional configuration for `layer`.
    ///
    /// Init reads its document from the knowledge base; every other layer
    /// reads standard input and descends from the previous layer's file.
    pub fn for_layer(layer: Layer, kb: &KnowledgeBase) -> Self {
        let document = match layer {
            Layer::Init => DocumentSource::File(kb.document_path(layer)),
            _ => DocumentSource::Stdin,
        };
        Self {
            layer,
            document,
            parent: kb.parent_path(layer),
            settings: Settings::default(),
        }
    }

    pub fn with_document(mut self, document: DocumentSource) -> Self {
        self.document = document;
        self
    }

    pub fn with_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }
}
