use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::ConvertArgs;
use crate::config::ConvertConfig;
use crate::util::{discover_files, ensure_directory};

use super::record::AnnotationRecord;
use super::xml::AnnotationXmlWriter;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConversionStats {
    pub records: usize,
    pub skipped_lines: usize,
}

pub fn run(args: ConvertArgs) -> Result<()> {
    let config = ConvertConfig::from_args(&args)?;
    ensure_directory(&config.output_dir)?;

    let inputs = resolve_inputs(&config)?;
    if inputs.is_empty() {
        warn!(input_dir = %config.input_dir.display(), "no JSONL files to convert");
        return Ok(());
    }

    let mut converted = 0usize;
    let mut failed = 0usize;
    for input in &inputs {
        let output = output_path_for(&config.output_dir, input);
        match convert_file(input, &output) {
            Ok(stats) => {
                converted += 1;
                info!(
                    input = %input.display(),
                    output = %output.display(),
                    records = stats.records,
                    skipped_lines = stats.skipped_lines,
                    "converted annotations"
                );
            }
            Err(error) => {
                failed += 1;
                let cause = format!("{error:#}");
                warn!(input = %input.display(), error = %cause, "failed to convert file");
            }
        }
    }

    info!(files = converted, failed, "conversion completed");
    Ok(())
}

/// Named files are resolved against the input directory and missing ones are
/// skipped. Without names, every `*.jsonl` in the directory is converted.
fn resolve_inputs(config: &ConvertConfig) -> Result<Vec<PathBuf>> {
    if config.files.is_empty() {
        return discover_files(&config.input_dir, "jsonl");
    }

    let mut inputs = Vec::with_capacity(config.files.len());
    for name in &config.files {
        let path = config.input_dir.join(name);
        if path.is_file() {
            inputs.push(path);
        } else {
            warn!(path = %path.display(), "input file not found, skipping");
        }
    }
    Ok(inputs)
}

pub(crate) fn output_path_for(output_dir: &Path, input: &Path) -> PathBuf {
    let mut name = input.file_stem().map(|stem| stem.to_os_string()).unwrap_or_default();
    name.push(".xml");
    output_dir.join(name)
}

fn convert_file(input: &Path, output: &Path) -> Result<ConversionStats> {
    let file = File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let source = input.display().to_string();
    let (xml, stats) = jsonl_to_xml(BufReader::new(file), &source)?;

    fs::write(output, xml).with_context(|| format!("failed to write {}", output.display()))?;
    Ok(stats)
}

/// Converts JSONL annotation records into one `<annotations>` document.
/// Blank lines are ignored; lines that are not UTF-8 or not a JSON record are
/// logged and skipped.
pub(crate) fn jsonl_to_xml(reader: impl BufRead, source: &str) -> Result<(Vec<u8>, ConversionStats)> {
    let mut writer = AnnotationXmlWriter::begin()?;
    let mut stats = ConversionStats::default();

    for (index, raw) in reader.split(b'\n').enumerate() {
        let line_number = index + 1;
        let mut raw = raw.with_context(|| format!("failed to read {source} line {line_number}"))?;
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
        let line = match String::from_utf8(raw) {
            Ok(line) => line,
            Err(error) => {
                stats.skipped_lines += 1;
                warn!(source, line = line_number, error = %error, "skipping line that is not UTF-8");
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<AnnotationRecord>(&line) {
            Ok(record) => {
                writer.write_record(&record)?;
                stats.records += 1;
            }
            Err(error) => {
                stats.skipped_lines += 1;
                warn!(source, line = line_number, error = %error, "skipping malformed JSON line");
            }
        }
    }

    Ok((writer.finish()?, stats))
}
