use log::debug;
use std::path::{Path, PathBuf};

use crate::config::ExtractorConfig;
use crate::errors::Result;
use crate::imports::ImportResolver;
use crate::scope::{ClassNameMapping, ModuleScoper, ScopedNameGenerator};
use crate::source::SourceDocument;

/// Separator between names in the class list
pub const CLASS_SEPARATOR: &str = ",";

/// Everything one extraction produced
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Exported name -> generated name
    pub mapping: ClassNameMapping,

    /// Every stylesheet read, entry file first
    pub files: Vec<PathBuf>,

    /// Interpolated selectors that could not contribute a name
    pub dynamic_selectors: Vec<String>,
}

impl Extraction {
    /// The serialized class list
    pub fn class_list(&self) -> String {
        format_class_list(&self.mapping)
    }
}

/// Reads a CSS module, resolves its imports and collects its exported names
#[derive(Debug)]
pub struct ClassNameExtractor {
    config: ExtractorConfig,
    generator: ScopedNameGenerator,
}

impl ClassNameExtractor {
    /// Create a new extractor with default configuration
    pub fn new() -> Self {
        Self {
            config: ExtractorConfig::default(),
            generator: ScopedNameGenerator::default(),
        }
    }

    /// Create a new extractor with custom configuration
    pub fn with_config(config: ExtractorConfig) -> Result<Self> {
        let generator = ScopedNameGenerator::new(&config.scoped_name)?;
        Ok(Self { config, generator })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Read `path` and extract its names
    pub fn process_file(&self, path: &Path) -> Result<Extraction> {
        let document = SourceDocument::read(path)?;
        self.process_document(&document)
    }

    /// Extract the names of an already loaded document
    pub fn process_document(&self, document: &SourceDocument) -> Result<Extraction> {
        let mut resolver = ImportResolver::new(self.config.load_paths.clone());
        let sheet = resolver.resolve(document)?;
        debug!(
            "Resolved {} with {} imported file(s)",
            document.display_path(),
            resolver.resolved_files().len().saturating_sub(1)
        );

        let file_path = document.canonical_path().display().to_string();
        let scoped = ModuleScoper::new(&self.generator, self.config.mode, &document.stem(), &file_path).scope(&sheet);
        debug!("Collected {} exported names", scoped.mapping.len());

        Ok(Extraction {
            mapping: scoped.mapping,
            files: resolver.resolved_files().to_vec(),
            dynamic_selectors: scoped.dynamic_selectors,
        })
    }
}

impl Default for ClassNameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Sort the mapping's keys and join them with [`CLASS_SEPARATOR`]
pub fn format_class_list(mapping: &ClassNameMapping) -> String {
    mapping.sorted_keys().join(CLASS_SEPARATOR)
}
