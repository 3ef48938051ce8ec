use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::extractor::Extraction;

/// Version of the manifest format
pub const MANIFEST_VERSION: &str = "1.0.0";

/// Metadata for the generated manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Version of the manifest format
    pub version: String,

    /// Timestamp when the manifest was generated
    pub generated_at: DateTime<Utc>,

    /// Entry stylesheet
    pub input: String,

    /// Every stylesheet read, entry file first
    pub files: Vec<String>,

    /// Number of exported names
    pub classes_extracted: usize,

    /// Pattern local names were generated with
    pub scoped_name: String,

    /// Extractor version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extractor_version: Option<String>,
}

/// Complete manifest structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Metadata about the extraction
    pub metadata: ManifestMetadata,

    /// Exported name -> generated name, sorted by exported name
    pub classes: IndexMap<String, String>,

    /// Interpolated selectors that did not contribute a name
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_selectors: Vec<String>,
}

impl Manifest {
    /// Convert manifest to pretty JSON string
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Builder pattern for creating manifests
pub struct ManifestBuilder {
    input: PathBuf,
    scoped_name: String,
    generated_at: DateTime<Utc>,
}

impl ManifestBuilder {
    /// Create a new manifest builder for the given entry file
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            scoped_name: String::new(),
            generated_at: Utc::now(),
        }
    }

    /// Record the scoped-name pattern
    pub fn with_scoped_name(mut self, pattern: impl Into<String>) -> Self {
        self.scoped_name = pattern.into();
        self
    }

    /// Pin the generation timestamp
    pub fn with_generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Build the final manifest from an extraction
    pub fn build(self, extraction: &Extraction) -> Manifest {
        Manifest {
            metadata: ManifestMetadata {
                version: MANIFEST_VERSION.to_string(),
                generated_at: self.generated_at,
                input: self.input.display().to_string(),
                files: extraction.files.iter().map(|f| f.display().to_string()).collect(),
                classes_extracted: extraction.mapping.len(),
                scoped_name: self.scoped_name,
                extractor_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            },
            classes: extraction.mapping.sorted(),
            skipped_selectors: extraction.dynamic_selectors.clone(),
        }
    }
}
