use clap::Parser;
use std::path::{Path, PathBuf};

/// Writes the class names a CSS/SCSS module exports, sorted and comma-separated
#[derive(Parser, Debug, Clone)]
#[command(name = "css-module-classes")]
#[command(version, about, long_about = None)]
pub struct ExtractArgs {
    /// Input stylesheet
    #[arg(value_name = "INPUT", help = "CSS or SCSS module to read")]
    pub input: PathBuf,

    /// Output class list
    #[arg(value_name = "OUTPUT", help = "File the sorted class list is written to (overwritten)")]
    pub output: PathBuf,

    /// Additional import search paths
    #[arg(
        short = 'I',
        long = "load-path",
        value_name = "DIR",
        help = "Directory searched by @import after the importing file's own directory"
    )]
    pub load_paths: Vec<PathBuf>,

    /// Pattern for generated local names
    #[arg(
        long = "scoped-name",
        value_name = "PATTERN",
        help = "Pattern for generated names, using [name], [local], [hash] and [hash:N]"
    )]
    pub scoped_name: Option<String>,

    /// Configuration file path (YAML or JSON)
    #[arg(
        short = 'c',
        long = "config",
        value_name = "PATH",
        help = "Path to configuration file (YAML or JSON format)"
    )]
    pub config: Option<PathBuf>,

    /// Output manifest file path (JSON)
    #[arg(
        short = 'm',
        long = "manifest",
        value_name = "PATH",
        help = "Also write the full name mapping as JSON"
    )]
    pub manifest: Option<PathBuf>,

    /// Dry run (don't write output files)
    #[arg(
        long = "dry-run",
        default_value_t = false,
        help = "Perform extraction but don't write output files"
    )]
    pub dry_run: bool,

    /// Verbose output
    #[arg(
        short = 'v',
        long = "verbose",
        default_value_t = false,
        help = "Enable verbose output"
    )]
    pub verbose: bool,
}

impl ExtractArgs {
    /// Arguments for a plain `<input> <output>` invocation
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            load_paths: Vec::new(),
            scoped_name: None,
            config: None,
            manifest: None,
            dry_run: false,
            verbose: false,
        }
    }

    /// Validate that the arguments are consistent
    pub fn validate(&self) -> Result<(), String> {
        if self.input.as_os_str().is_empty() || self.output.as_os_str().is_empty() {
            return Err("both <INPUT> and <OUTPUT> must be provided".to_string());
        }

        if same_file(&self.input, &self.output) {
            return Err("Input and output paths must be different".to_string());
        }

        if let Some(manifest) = &self.manifest {
            if same_file(manifest, &self.output) || same_file(manifest, &self.input) {
                return Err("Manifest path must differ from the input and output paths".to_string());
            }
        }

        Ok(())
    }
}

/// True if both paths name the same file, even when spelled differently
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (resolve(a), resolve(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Absolute form of `path`; a file that doesn't exist yet resolves through its parent
fn resolve(path: &Path) -> Option<PathBuf> {
    if let Ok(canonical) = path.canonicalize() {
        return Some(canonical);
    }
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    Some(parent.canonicalize().ok()?.join(path.file_name()?))
}
