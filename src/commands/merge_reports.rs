use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::{MergeMode, MergeReportsArgs};
use crate::config::MergeConfig;
use crate::model::REPORT_HEADER_PREFIXES;
use crate::util::{discover_files, ensure_parent_directory, file_name_string};

const FOLDER_RULE_WIDTH: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReportSource {
    pub folder_name: String,
    pub file_name: String,
    pub path: PathBuf,
}

pub fn run(args: MergeReportsArgs) -> Result<()> {
    let config = MergeConfig::from_args(&args)?;
    let mode = args.mode.unwrap_or_else(prompt_mode);
    info!(
        mode = mode.as_str(),
        folders = config.folders.len(),
        output = %config.output_path.display(),
        "merging report files"
    );

    let mut sources = collect_sources(&config.folders)?;
    if sources.is_empty() {
        warn!("no report files found, nothing written");
        return Ok(());
    }

    ensure_parent_directory(&config.output_path)?;
    let file = File::create(&config.output_path)
        .with_context(|| format!("failed to create {}", config.output_path.display()))?;
    let mut output = BufWriter::new(file);

    let folder_names = config.folders.iter().map(|folder| folder_name(folder)).collect::<Vec<_>>();
    let lines = match mode {
        MergeMode::Titled => {
            sources.sort_by(|left, right| {
                (&left.folder_name, &left.file_name).cmp(&(&right.folder_name, &right.file_name))
            });
            write_titled(&mut output, &sources, &folder_names, config.strip_headers)
        }
        MergeMode::Flat => {
            sources.sort_by(|left, right| left.path.cmp(&right.path));
            write_flat(&mut output, &sources, config.strip_headers)
        }
    }
    .with_context(|| format!("failed to write {}", config.output_path.display()))?;

    output
        .flush()
        .with_context(|| format!("failed to flush {}", config.output_path.display()))?;

    info!(
        path = %config.output_path.display(),
        files = sources.len(),
        lines,
        "report merge completed"
    );

    Ok(())
}

fn prompt_mode() -> MergeMode {
    use dialoguer::{Select, theme::ColorfulTheme};

    let choices = [
        "titled (folder and file headings)",
        "flat (content only)",
    ];
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select merge mode")
        .items(&choices)
        .default(0)
        .interact();

    match selection {
        Ok(1) => MergeMode::Flat,
        Ok(_) => MergeMode::Titled,
        Err(error) => {
            warn!(error = %error, "no merge mode selected, using titled");
            MergeMode::Titled
        }
    }
}

/// `*.txt` files directly inside each folder. Missing or empty folders are
/// logged and skipped.
pub(crate) fn collect_sources(folders: &[PathBuf]) -> Result<Vec<ReportSource>> {
    let mut sources = Vec::new();

    for folder in folders {
        if !folder.is_dir() {
            warn!(folder = %folder.display(), "folder does not exist, skipping");
            continue;
        }

        let files = match discover_files(folder, "txt") {
            Ok(files) => files,
            Err(error) => {
                let cause = format!("{error:#}");
                warn!(folder = %folder.display(), error = %cause, "failed to list folder, skipping");
                continue;
            }
        };
        if files.is_empty() {
            warn!(folder = %folder.display(), "no report files in folder");
            continue;
        }
        info!(folder = %folder.display(), files = files.len(), "found report files");

        let name = folder_name(folder);
        for path in files {
            let file_name = match file_name_string(&path) {
                Ok(file_name) => file_name,
                Err(error) => {
                    warn!(error = %error, "skipping report file with unreadable name");
                    continue;
                }
            };
            sources.push(ReportSource {
                folder_name: name.clone(),
                file_name,
                path,
            });
        }
    }

    Ok(sources)
}

fn folder_name(folder: &Path) -> String {
    folder
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| folder.display().to_string())
}

pub(crate) fn filter_report_lines(content: &str, strip_headers: bool) -> Vec<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            !strip_headers || !REPORT_HEADER_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
        })
        .collect()
}

/// Writes sources (already sorted by folder then file) with headings.
/// Returns the number of lines written.
pub(crate) fn write_titled(
    output: &mut impl Write,
    sources: &[ReportSource],
    folder_names: &[String],
    strip_headers: bool,
) -> Result<usize> {
    let mut rendered = format!(
        "# Merged report files\n# Total files: {}\n# Source folders: {}\n\n",
        sources.len(),
        folder_names.join(", ")
    );

    let mut current_folder: Option<&str> = None;
    for source in sources {
        if current_folder != Some(source.folder_name.as_str()) {
            if current_folder.is_some() {
                rendered.push_str(&format!("\n{}\n\n", "=".repeat(FOLDER_RULE_WIDTH)));
            }
            rendered.push_str(&format!("## Folder: {}\n\n", source.folder_name));
            current_folder = Some(source.folder_name.as_str());
        }

        rendered.push_str(&format!("### File: {}\n\n", source.file_name));

        match fs::read_to_string(&source.path) {
            Ok(content) => {
                for line in filter_report_lines(&content, strip_headers) {
                    rendered.push_str(line);
                    rendered.push('\n');
                }
            }
            Err(error) => {
                warn!(path = %source.path.display(), error = %error, "failed to read report file");
                rendered.push_str(&format!("[error: could not read file {}]\n\n", source.file_name));
            }
        }
    }

    output.write_all(rendered.as_bytes())?;
    Ok(rendered.lines().count())
}

/// Writes only the filtered lines. Unreadable files are logged and skipped.
pub(crate) fn write_flat(
    output: &mut impl Write,
    sources: &[ReportSource],
    strip_headers: bool,
) -> Result<usize> {
    let mut written = 0usize;

    for source in sources {
        let content = match fs::read_to_string(&source.path) {
            Ok(content) => content,
            Err(error) => {
                warn!(path = %source.path.display(), error = %error, "failed to read report file");
                continue;
            }
        };

        for line in filter_report_lines(&content, strip_headers) {
            writeln!(output, "{line}")?;
            written += 1;
        }
    }

    Ok(written)
}
