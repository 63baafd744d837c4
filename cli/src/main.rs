//! pdf-outline CLI - PDF title and heading extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdf_outline::batch::{list_pdf_files, run_batch_with_progress, DocumentOutcome};
use pdf_outline::render::{spans_to_json, to_json};
use pdf_outline::{
    collect_spans, extract_outline_file_with, BatchOptions, ErrorMode, HeuristicConfig,
    JsonFormat, OutlineAnalyzer, OverflowPolicy, PageSelection, ParseOptions,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "pdf-outline")]
#[command(version)]
#[command(about = "Extract the title and H1-H3 outline of PDF documents as JSON", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(flatten)]
    batch: BatchArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one JSON outline per PDF in a directory (default)
    Batch(BatchArgs),

    /// Extract the outline of a single PDF
    File {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        outline: OutlineArgs,
    },

    /// Dump the text spans collected from a PDF
    Spans {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Show heading scores instead of raw JSON
        #[arg(long)]
        scores: bool,

        #[command(flatten)]
        outline: OutlineArgs,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone)]
struct BatchArgs {
    /// Directory containing PDF files
    #[arg(value_name = "INPUT_DIR", env = "PDF_OUTLINE_INPUT", default_value = "/app/input")]
    input: PathBuf,

    /// Directory for JSON outlines
    #[arg(value_name = "OUTPUT_DIR", env = "PDF_OUTLINE_OUTPUT", default_value = "/app/output")]
    output: PathBuf,

    /// Process files one at a time
    #[arg(long)]
    sequential: bool,

    /// Output compact JSON
    #[arg(long)]
    compact: bool,

    #[command(flatten)]
    outline: OutlineArgs,
}

#[derive(Args, Clone, Default)]
struct OutlineArgs {
    /// JSON file with heuristic overrides
    #[arg(long, value_name = "FILE", env = "PDF_OUTLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Look at the first N spans of page 2 when page 1 has no title
    #[arg(long, value_name = "N")]
    title_fallback: Option<usize>,

    /// Emit heading styles ranked below the third as H3 instead of dropping them
    #[arg(long)]
    merge_overflow: bool,

    /// Keep headings whose text repeats an earlier heading
    #[arg(long)]
    keep_duplicates: bool,

    /// Pages a repeated line must appear on to count as a running header
    #[arg(long, value_name = "N")]
    min_repeat_pages: Option<usize>,

    /// Fail on unreadable pages instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,
}

impl OutlineArgs {
    fn heuristics(&self) -> Result<HeuristicConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => HeuristicConfig::from_json_file(path)?,
            None => HeuristicConfig::default(),
        };
        if let Some(spans) = self.title_fallback {
            config = config.with_title_fallback(spans);
        }
        if self.merge_overflow {
            config = config.with_overflow_policy(OverflowPolicy::MergeIntoH3);
        }
        if self.keep_duplicates {
            config = config.with_dedupe(false);
        }
        if let Some(pages) = self.min_repeat_pages {
            config = config.with_min_repeat_pages(pages);
        }
        Ok(config)
    }

    fn parse_options(&self) -> Result<ParseOptions, Box<dyn std::error::Error>> {
        let mode = if self.strict {
            ErrorMode::Strict
        } else {
            ErrorMode::Lenient
        };
        let mut options = ParseOptions::new().with_error_mode(mode);
        if let Some(p) = &self.pages {
            let selection =
                PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?;
            options = options.with_pages(selection);
        }
        Ok(options)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Batch(args)) => cmd_batch(&args),
        Some(Commands::File {
            input,
            output,
            compact,
            outline,
        }) => cmd_file(&input, output.as_deref(), compact, &outline),
        Some(Commands::Spans {
            input,
            output,
            scores,
            outline,
        }) => cmd_spans(&input, output.as_deref(), scores, &outline),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => cmd_batch(&cli.batch),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn cmd_batch(args: &BatchArgs) -> CliResult {
    let mut options = BatchOptions::new()
        .with_parse_options(args.outline.parse_options()?)
        .with_heuristics(args.outline.heuristics()?)
        .with_format(json_format(args.compact));
    if args.sequential {
        options = options.sequential();
    }

    let total = list_pdf_files(&args.input)
        .map_err(|e| format!("Cannot read {}: {}", args.input.display(), e))?
        .len();
    if total == 0 {
        println!(
            "{} {}",
            "No PDF files found in".yellow(),
            args.input.display()
        );
        return Ok(());
    }

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let report = run_batch_with_progress(&args.input, &args.output, &options, |outcome| {
        let name = match outcome {
            DocumentOutcome::Written(done) => &done.input,
            DocumentOutcome::Failed(failed) => &failed.input,
        };
        pb.set_message(
            name.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
        pb.inc(1);
    })?;

    pb.finish_with_message("Done!");

    println!(
        "\n{} {} written, {} skipped",
        "Outlines:".green().bold(),
        report.succeeded.len(),
        report.failed.len()
    );
    for (i, failed) in report.failed.iter().enumerate() {
        let branch = if i + 1 == report.failed.len() {
            "└─"
        } else {
            "├─"
        };
        println!(
            "  {} {}: {}",
            branch.dimmed(),
            failed.input.display(),
            failed.error.red()
        );
    }
    println!("{} {}", "Output directory:".bold(), args.output.display());

    Ok(())
}

fn cmd_file(input: &Path, output: Option<&Path>, compact: bool, args: &OutlineArgs) -> CliResult {
    let analyzer = OutlineAnalyzer::with_config(args.heuristics()?);
    let outline = extract_outline_file_with(input, &args.parse_options()?, &analyzer)?;
    let json = to_json(&outline, json_format(compact))?;

    if let Some(path) = output {
        fs::write(path, format!("{}\n", json))?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_spans(input: &Path, output: Option<&Path>, scores: bool, args: &OutlineArgs) -> CliResult {
    let spans = collect_spans(input, &args.parse_options()?)?;

    let rendered = if scores {
        let analysis = OutlineAnalyzer::with_config(args.heuristics()?).analyze_detailed(&spans);
        let mut lines = vec![format!(
            "body size {:.1}pt, {} spans, {} page furniture",
            analysis.profile.body_size(),
            spans.len(),
            analysis.furniture_count
        )];
        for (span, score) in analysis.content.iter().zip(&analysis.scores) {
            let level = if score.is_candidate {
                analysis
                    .assignment
                    .level_of(span.signature())
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "--".to_string())
            } else {
                String::new()
            };
            lines.push(format!(
                "p{:<3} {:>6.1} {:<12} {:.3} {:<3} {}",
                span.page,
                span.bbox.y0,
                span.signature().to_string(),
                score.score,
                level,
                span.text
            ));
        }
        lines.join("\n")
    } else {
        spans_to_json(&spans, JsonFormat::Pretty)?
    };

    if let Some(path) = output {
        fs::write(path, format!("{}\n", rendered))?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

fn cmd_version() {
    println!(
        "{} {}",
        "pdf-outline".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("PDF title and heading outline extractor");
    println!();
    println!("License: MIT");
}
