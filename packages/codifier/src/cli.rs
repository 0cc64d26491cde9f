//! Command-line interface for the codifier.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use walkdir::WalkDir;

use crate::codifier::Codifier;
use crate::error::{CodifierError, Result};
use crate::store::{JsonDirStore, MemoryStore};

/// Nomothesia Codifier - Apply Government Gazette amendments to a
/// versioned statute corpus.
#[derive(Parser)]
#[command(name = "nomothesia-codifier")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Codify every .txt issue under a directory.
    Codify {
        /// Directory of plain-text issues.
        directory: PathBuf,

        /// Corpus store directory (default: in-memory, discarded).
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Export each law's markdown into this directory afterwards.
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Apply one issue's amendments to the statute announced by another.
    Pair {
        /// Issue carrying the amendments.
        source: PathBuf,

        /// Issue announcing the target statute.
        target: PathBuf,

        /// Output file for the before/after markdown.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Codify {
            directory,
            store,
            export,
        } => codify_command(&directory, store.as_deref(), export.as_deref()),
        Commands::Pair {
            source,
            target,
            output,
        } => pair_command(&source, &target, output.as_deref()),
    }
}

fn issue_files(directory: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(directory)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort();
    files
}

/// Codify a directory of issues, warn-and-continue per issue.
fn codify_with<S: crate::store::CorpusStore>(
    codifier: &mut Codifier<S>,
    files: &[PathBuf],
    export: Option<&Path>,
) -> Result<()> {
    let pb = ProgressBar::new(files.len() as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.green} {pos}/{len} {msg}")
            .expect("valid template"),
    );

    let mut applied = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;
    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        pb.set_message(name.clone());

        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(issue = %name, error = %e, "issue unreadable; skipped");
                failed += 1;
                pb.inc(1);
                continue;
            }
        };
        match codifier.codify_issue(&name, &raw) {
            Ok(report) => {
                applied += report.applied;
                skipped += report.skipped;
            }
            Err(e @ (CodifierError::Io(_) | CodifierError::Json(_))) => {
                pb.finish_and_clear();
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(issue = %name, error = %e, "issue failed; batch continues");
                failed += 1;
            }
        }
        pb.inc(1);
    }

    let links = codifier.build_links()?;
    pb.finish_and_clear();

    println!(
        "{} {} issues: {} amendments applied, {} skipped, {} issues failed, {} links",
        style("Codified").green().bold(),
        files.len(),
        style(applied).cyan(),
        skipped,
        failed,
        links
    );

    if let Some(export_dir) = export {
        fs::create_dir_all(export_dir)?;
        let identifiers = codifier.store().law_identifiers()?;
        for identifier in &identifiers {
            let markdown = codifier.law_markdown(identifier)?;
            let file = export_dir.join(format!("{}.md", identifier.replace(['/', ' '], "_")));
            fs::write(file, markdown)?;
        }
        println!(
            "{} {} laws to {}",
            style("Exported").green().bold(),
            identifiers.len(),
            export_dir.display()
        );
    }

    Ok(())
}

/// Execute the codify command.
fn codify_command(directory: &Path, store: Option<&Path>, export: Option<&Path>) -> Result<()> {
    if !directory.is_dir() {
        return Err(CodifierError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Issue directory does not exist: {}", directory.display()),
        )));
    }
    let files = issue_files(directory);
    println!(
        "{} {} issues from {}",
        style("Codifying").bold(),
        style(files.len()).cyan(),
        directory.display()
    );

    match store {
        Some(root) => {
            let mut codifier = Codifier::new(JsonDirStore::open(root)?);
            codify_with(&mut codifier, &files, export)
        }
        None => {
            let mut codifier = Codifier::new(MemoryStore::new());
            codify_with(&mut codifier, &files, export)
        }
    }
}

/// Execute the pair command.
fn pair_command(source: &Path, target: &Path, output: Option<&Path>) -> Result<()> {
    let source_text = fs::read_to_string(source)?;
    let target_text = fs::read_to_string(target)?;
    let source_name = source.file_name().map(|n| n.to_string_lossy().into_owned());
    let target_name = target.file_name().map(|n| n.to_string_lossy().into_owned());

    let mut codifier = Codifier::new(MemoryStore::new());
    let outcome = codifier.codify_pair(
        (source_name.as_deref().unwrap_or("source"), &source_text),
        (target_name.as_deref().unwrap_or("target"), &target_text),
    )?;

    println!(
        "{} {}",
        style("Amended").green().bold(),
        style(&outcome.identifier).cyan()
    );

    let rendered = if outcome.before == outcome.after {
        outcome.before.clone()
    } else {
        format!(
            "# Αρχική έκδοση του {}\n{}\n# Έκδοση μετά τις τροποποιήσεις\n{}",
            outcome.identifier, outcome.before, outcome.after
        )
    };

    match output {
        Some(path) => {
            fs::write(path, rendered)?;
            println!("{} {}", style("Saved to:").green().bold(), path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
