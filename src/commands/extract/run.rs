use std::path::Path;
use std::process::Command;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::cleanup::TextCleaner;
use super::ocr::ocr_pdf;
use super::quality::QualityVerdict;
use super::report::{report_path_for, write_report};
use super::sentences::{SentenceSplitter, process_sentences};
use super::text_layer::{extract_text_layer_pages, join_text_layer_pages};
use crate::cli::ExtractArgs;
use crate::config::ExtractConfig;
use crate::model::{
    DocumentOutcome, DocumentStatus, ExtractCounts, ExtractPaths, ExtractRunManifest,
    ExtractionMethod, ToolVersions,
};
use crate::util::{
    discover_files, ensure_directory, now_utc_string, sha256_file, utc_compact_string,
    write_json_pretty,
};

pub fn run(args: ExtractArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("extract-{}", utc_compact_string(started_ts));

    let config = ExtractConfig::from_args(&args)?;
    ensure_directory(&config.output_dir)?;
    let manifest_path = config.manifest_path.clone().unwrap_or_else(|| {
        config
            .output_dir
            .join(format!("extract_run_{}.json", utc_compact_string(started_ts)))
    });

    info!(
        input_dir = %config.input_dir.display(),
        output_dir = %config.output_dir.display(),
        run_id = %run_id,
        "starting extraction"
    );

    let pdf_paths = discover_files(&config.input_dir, "pdf")?;
    if pdf_paths.is_empty() {
        warn!(input_dir = %config.input_dir.display(), "no PDF files found");
        return Ok(());
    }
    info!(pdf_count = pdf_paths.len(), "discovered PDF files");

    let cleaner = TextCleaner::new(&config.cleanup_rules)?;
    let splitter = SentenceSplitter::new(config.sentences)?;
    debug!(
        rules = ?cleaner.rules().iter().map(|rule| rule.as_str()).collect::<Vec<_>>(),
        "cleanup rules enabled"
    );

    let tool_versions = collect_tool_versions();
    let mut warnings = Vec::new();
    let mut documents = Vec::with_capacity(pdf_paths.len());

    for pdf_path in &pdf_paths {
        let outcome = process_document(pdf_path, &config, &cleaner, &splitter, &mut warnings);
        documents.push(outcome);
    }

    let counts = summarize(&documents);
    let manifest = ExtractRunManifest {
        manifest_version: 1,
        run_id,
        status: "completed".to_string(),
        started_at,
        updated_at: now_utc_string(),
        tool_versions,
        paths: ExtractPaths {
            input_dir: config.input_dir.display().to_string(),
            output_dir: config.output_dir.display().to_string(),
            manifest_path: manifest_path.display().to_string(),
        },
        settings: config.settings(),
        counts,
        documents,
        warnings,
    };

    write_json_pretty(&manifest_path, &manifest)?;

    info!(path = %manifest_path.display(), "wrote extraction run manifest");
    info!(
        pdfs = manifest.counts.pdf_count,
        written = manifest.counts.written_count,
        ocr = manifest.counts.ocr_count,
        skipped = manifest.counts.skipped_count,
        sentences = manifest.counts.sentence_total,
        "extraction completed"
    );

    Ok(())
}

fn process_document(
    pdf_path: &Path,
    config: &ExtractConfig,
    cleaner: &TextCleaner,
    splitter: &SentenceSplitter,
    warnings: &mut Vec<String>,
) -> DocumentOutcome {
    let filename = pdf_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| pdf_path.display().to_string());
    info!(file = %filename, "processing document");

    let sha256 = match sha256_file(pdf_path) {
        Ok(digest) => Some(digest),
        Err(error) => {
            warn!(file = %filename, error = %error, "failed to hash document");
            None
        }
    };

    let mut outcome = DocumentOutcome {
        filename: filename.clone(),
        sha256,
        method: None,
        status: DocumentStatus::Skipped,
        sentence_count: 0,
        output_path: None,
        reason: None,
    };

    let (method, text) = match select_text(pdf_path, config, warnings) {
        Ok(selected) => selected,
        Err(verdict) => {
            error!(file = %filename, verdict = %verdict, "no usable text from text layer or OCR");
            outcome.reason = Some(format!("quality_gate:{verdict}"));
            return outcome;
        }
    };
    outcome.method = Some(method);

    let sentences = process_sentences(cleaner, splitter, &text);
    if sentences.is_empty() {
        warn!(file = %filename, method = method.label(), "no sentences survived filtering");
        outcome.status = DocumentStatus::NoSentences;
        return outcome;
    }

    let report_path = report_path_for(&config.output_dir, pdf_path);
    outcome.sentence_count = sentences.len();
    match write_report(&report_path, &filename, method, &sentences) {
        Ok(()) => {
            info!(
                file = %filename,
                method = method.label(),
                sentences = sentences.len(),
                path = %report_path.display(),
                "wrote sentence report"
            );
            outcome.status = DocumentStatus::Written;
            outcome.output_path = Some(report_path.display().to_string());
        }
        Err(error) => {
            error!(file = %filename, error = %error, "failed to save sentence report");
            warnings.push(format!("{filename}: {error:#}"));
            outcome.status = DocumentStatus::WriteFailed;
            outcome.reason = Some(format!("{error:#}"));
        }
    }

    outcome
}

/// Text layer first; OCR only when the text layer fails the quality gate.
/// Returns the OCR verdict when both attempts are rejected.
fn select_text(
    pdf_path: &Path,
    config: &ExtractConfig,
    warnings: &mut Vec<String>,
) -> std::result::Result<(ExtractionMethod, String), QualityVerdict> {
    let text_layer = match extract_text_layer_pages(pdf_path) {
        Ok(pages) => join_text_layer_pages(&pages),
        Err(error) => {
            warn!(pdf = %pdf_path.display(), error = %error, "text layer extraction failed");
            warnings.push(format!("{error:#}"));
            String::new()
        }
    };

    let verdict = config.quality.evaluate(&text_layer);
    if verdict.is_accepted() {
        return Ok((ExtractionMethod::TextLayer, text_layer));
    }
    warn!(
        pdf = %pdf_path.display(),
        verdict = %verdict,
        "text layer failed quality gate, switching to OCR"
    );

    let ocr_text = match ocr_pdf(pdf_path, &config.ocr) {
        Ok(text) => text,
        Err(error) => {
            warn!(pdf = %pdf_path.display(), error = %error, "OCR extraction failed");
            warnings.push(format!("{error:#}"));
            String::new()
        }
    };

    let verdict = config.quality.evaluate(&ocr_text);
    if verdict.is_accepted() {
        Ok((ExtractionMethod::Ocr, ocr_text))
    } else {
        Err(verdict)
    }
}

pub(super) fn summarize(documents: &[DocumentOutcome]) -> ExtractCounts {
    let mut counts = ExtractCounts {
        pdf_count: documents.len(),
        ..ExtractCounts::default()
    };

    for document in documents {
        if document.status != DocumentStatus::Written {
            counts.skipped_count += 1;
            continue;
        }
        counts.written_count += 1;
        counts.sentence_total += document.sentence_count;
        match document.method {
            Some(ExtractionMethod::TextLayer) => counts.text_layer_count += 1,
            Some(ExtractionMethod::Ocr) => counts.ocr_count += 1,
            None => {}
        }
    }

    counts
}

fn collect_tool_versions() -> ToolVersions {
    ToolVersions {
        pdftotext: command_version_optional("pdftotext", &["-v"]),
        pdftoppm: command_version_optional("pdftoppm", &["-v"]),
        tesseract: command_version_optional("tesseract", &["--version"]),
    }
}

fn command_version_optional(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let source = if stdout.trim().is_empty() {
        stderr.trim()
    } else {
        stdout.trim()
    };

    source
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
}
