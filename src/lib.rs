pub mod args;
pub mod config;
pub mod errors;
pub mod extractor;
pub mod imports;
pub mod manifest;
pub mod parser;
pub mod scope;
pub mod selector;
pub mod source;
pub mod tokenizer;

pub use args::ExtractArgs;
pub use config::ExtractorConfig;
pub use errors::{ExtractorError, Result};
pub use extractor::{format_class_list, ClassNameExtractor, Extraction};
pub use manifest::{Manifest, ManifestBuilder};
pub use scope::{ClassNameMapping, ScopedNameGenerator};
pub use selector::Scope;
pub use source::SourceDocument;

use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Result of the extraction process
#[derive(Debug)]
pub struct ExtractionResult {
    /// The sorted, comma-separated class list
    pub class_list: String,
    pub mapping: ClassNameMapping,
    pub total_classes: usize,
    /// Every stylesheet read, entry file first
    pub files: Vec<PathBuf>,
    pub processing_duration: Duration,
}

/// Main extractor entry point.
///
/// Resolves and scopes `args.input`, then writes the class list to
/// `args.output`. Nothing is written unless processing succeeds.
pub async fn extract(args: ExtractArgs) -> Result<ExtractionResult> {
    let start_time = Instant::now();

    // Validate arguments
    args.validate().map_err(ExtractorError::UsageError)?;

    let config = ExtractorConfig::from_args(&args)?;

    debug!("Input: {}", args.input.display());
    debug!("Output: {}", args.output.display());
    if !config.load_paths.is_empty() {
        debug!("Load paths: {:?}", config.load_paths);
    }

    // Import resolution and scoping run as one task the caller awaits
    let input = args.input.clone();
    let extraction = tokio::task::spawn_blocking(move || -> Result<(Extraction, String)> {
        let extractor = ClassNameExtractor::with_config(config)?;
        let extraction = extractor.process_file(&input)?;
        Ok((extraction, extractor.config().scoped_name.clone()))
    })
    .await
    .map_err(|e| ExtractorError::TaskError(e.to_string()))?;
    let (extraction, scoped_name) = extraction?;

    let class_list = extraction.class_list();
    let processing_duration = start_time.elapsed();

    if !args.dry_run {
        write_atomic(&args.output, &class_list).map_err(|e| ExtractorError::OutputError {
            path: args.output.display().to_string(),
            message: e.to_string(),
        })?;

        if let Some(manifest_path) = &args.manifest {
            let manifest = ManifestBuilder::new(&args.input)
                .with_scoped_name(scoped_name)
                .build(&extraction);
            write_atomic(manifest_path, &manifest.to_pretty_json()?).map_err(|e| ExtractorError::OutputError {
                path: manifest_path.display().to_string(),
                message: e.to_string(),
            })?;
        }
    }

    info!(
        "Extracted {} names from {} file(s) in {:.2}ms",
        extraction.mapping.len(),
        extraction.files.len(),
        processing_duration.as_secs_f64() * 1000.0
    );

    Ok(ExtractionResult {
        class_list,
        total_classes: extraction.mapping.len(),
        mapping: extraction.mapping,
        files: extraction.files,
        processing_duration,
    })
}

/// Write file atomically through a uniquely named temp file in the same
/// directory. The temp file is removed if anything fails before the rename.
fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> std::io::Result<()> {
    use std::io::Write;

    let path = path.as_ref();
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    fs::create_dir_all(parent)?;

    let mut file = tempfile::NamedTempFile::new_in(parent)?;
    file.write_all(content.as_bytes())?;
    file.as_file().sync_all()?;

    file.persist(path).map(|_| ()).map_err(|e| e.error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/classes.txt");

        write_atomic(&path, "a,b").unwrap();
        write_atomic(&path, "c").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "c");
        assert_eq!(fs::read_dir(dir.path().join("nested")).unwrap().count(), 1);
    }

    #[test]
    fn test_write_atomic_leaves_neighbours_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("classes.txt");
        fs::write(dir.path().join("classes.txt.tmp"), "keep me").unwrap();

        write_atomic(&path, "a").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a");
        assert_eq!(fs::read_to_string(dir.path().join("classes.txt.tmp")).unwrap(), "keep me");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_write_atomic_failure_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        // A directory where the output file should go makes the rename fail
        let path = dir.path().join("taken");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("inside.txt"), "x").unwrap();

        assert!(write_atomic(&path, "a").is_err());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_atomic_empty_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.txt");
        write_atomic(&path, "").unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }
}
