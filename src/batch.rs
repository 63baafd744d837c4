//! Directory batch processing.
//!
//! Every `.pdf` file in the input directory is processed on its own; a file
//! that cannot be read is logged and skipped without affecting the others.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::analysis::{HeuristicConfig, OutlineAnalyzer};
use crate::detect::has_pdf_extension;
use crate::error::Result;
use crate::parser::ParseOptions;
use crate::render::{write_json, JsonFormat};

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Process documents on the rayon thread pool
    pub parallel: bool,
    /// Span collection options applied to every document
    pub parse: ParseOptions,
    /// Heuristic configuration applied to every document
    pub heuristics: HeuristicConfig,
    /// Output JSON format
    pub format: JsonFormat,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            parse: ParseOptions::new().lenient(),
            heuristics: HeuristicConfig::default(),
            format: JsonFormat::Pretty,
        }
    }
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    pub fn with_heuristics(mut self, config: HeuristicConfig) -> Self {
        self.heuristics = config;
        self
    }

    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }
}

/// A document whose outline was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedDocument {
    pub input: PathBuf,
    pub output: PathBuf,
    pub title_found: bool,
    pub headings: usize,
}

/// A document that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDocument {
    pub input: PathBuf,
    pub error: String,
}

/// Outcome of one document, reported to the progress callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    Written(ProcessedDocument),
    Failed(FailedDocument),
}

/// Summary of a batch run, in input file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: Vec<ProcessedDocument>,
    pub failed: Vec<FailedDocument>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// True when no document failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// List the PDF files of a directory (extension match is case-insensitive),
/// sorted by path.
pub fn list_pdf_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_pdf_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// `output_dir/<stem>.json` for an input file.
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let mut name = stem.to_os_string();
    name.push(".json");
    output_dir.join(name)
}

/// Extract and write the outline of one document.
pub fn process_document(
    input: &Path,
    output_dir: &Path,
    options: &BatchOptions,
    analyzer: &OutlineAnalyzer,
) -> Result<ProcessedDocument> {
    let outline = crate::extract_outline_file_with(input, &options.parse, analyzer)?;
    let output = output_path_for(input, output_dir);
    write_json(&outline, &output, options.format)?;

    log::info!(
        "{} -> {} ({} headings)",
        input.display(),
        output.display(),
        outline.outline.len()
    );

    Ok(ProcessedDocument {
        input: input.to_path_buf(),
        output,
        title_found: !outline.title.is_empty(),
        headings: outline.outline.len(),
    })
}

/// Process every PDF in `input_dir`, writing outlines to `output_dir`.
pub fn run_batch<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    output_dir: Q,
    options: &BatchOptions,
) -> Result<BatchReport> {
    run_batch_with_progress(input_dir, output_dir, options, |_| {})
}

/// [`run_batch`] with a callback invoked as each document finishes.
///
/// In parallel mode the callback runs on worker threads, in completion order.
pub fn run_batch_with_progress<P, Q, F>(
    input_dir: P,
    output_dir: Q,
    options: &BatchOptions,
    progress: F,
) -> Result<BatchReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    F: Fn(&DocumentOutcome) + Sync,
{
    let files = list_pdf_files(input_dir.as_ref())?;
    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir)?;

    log::info!(
        "Processing {} PDF files from {}",
        files.len(),
        input_dir.as_ref().display()
    );

    let analyzer = OutlineAnalyzer::with_config(options.heuristics.clone());
    let run_one = |path: &PathBuf| {
        let outcome = match process_document(path, output_dir, options, &analyzer) {
            Ok(done) => DocumentOutcome::Written(done),
            Err(e) => {
                if e.is_document_failure() {
                    log::error!("Skipping unreadable {}: {}", path.display(), e);
                } else {
                    log::error!("Skipping {}: {}", path.display(), e);
                }
                DocumentOutcome::Failed(FailedDocument {
                    input: path.clone(),
                    error: e.to_string(),
                })
            }
        };
        progress(&outcome);
        outcome
    };

    let outcomes: Vec<DocumentOutcome> = if options.parallel {
        files.par_iter().map(run_one).collect()
    } else {
        files.iter().map(run_one).collect()
    };

    let mut report = BatchReport::default();
    for outcome in outcomes {
        match outcome {
            DocumentOutcome::Written(done) => report.succeeded.push(done),
            DocumentOutcome::Failed(failed) => report.failed.push(failed),
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_list_pdf_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "A.PDF", "notes.txt", "c.Pdf"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let files = list_pdf_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["A.PDF", "b.pdf", "c.Pdf"]);
    }

    #[test]
    fn test_output_path_for() {
        let out = output_path_for(Path::new("/in/report.final.PDF"), Path::new("/out"));
        assert_eq!(out, PathBuf::from("/out/report.final.json"));
    }

    #[test]
    fn test_corrupt_files_are_skipped() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(input.path().join("broken.pdf"), b"not a pdf at all").unwrap();
        fs::write(input.path().join("future.pdf"), b"%PDF-9.9\n%%EOF").unwrap();

        let report = run_batch(input.path(), output.path(), &BatchOptions::new().sequential())
            .unwrap();
        assert_eq!(report.failed.len(), 2);
        assert!(report.succeeded.is_empty());
        assert!(!report.is_success());
        assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_input_dir_is_error() {
        let output = tempfile::tempdir().unwrap();
        assert!(run_batch("/definitely/not/here", output.path(), &BatchOptions::new()).is_err());
    }

    #[test]
    fn test_options_builder() {
        let options = BatchOptions::new()
            .sequential()
            .with_format(JsonFormat::Compact)
            .with_heuristics(HeuristicConfig::new().with_dedupe(false));
        assert!(!options.parallel);
        assert_eq!(options.format, JsonFormat::Compact);
        assert!(!options.heuristics.dedupe_headings);
        assert_eq!(options.parse.error_mode, crate::parser::ErrorMode::Lenient);
    }
}
