use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::{ExtractionMethod, REPORT_COUNT_PREFIX, REPORT_FILE_PREFIX, REPORT_METHOD_PREFIX};

pub(crate) fn report_path_for(output_dir: &Path, pdf_path: &Path) -> PathBuf {
    let mut name = pdf_path
        .file_stem()
        .map(|stem| stem.to_os_string())
        .unwrap_or_else(|| "document".into());
    name.push(".txt");
    output_dir.join(name)
}

pub(crate) fn render_report(filename: &str, method: ExtractionMethod, sentences: &[String]) -> String {
    let mut report = format!(
        "{REPORT_FILE_PREFIX}{filename}\n{REPORT_METHOD_PREFIX}{}\n{REPORT_COUNT_PREFIX}{}\n\n",
        method.label(),
        sentences.len()
    );
    for sentence in sentences {
        report.push_str(sentence);
        report.push('\n');
    }
    report
}

pub(crate) fn write_report(
    path: &Path,
    filename: &str,
    method: ExtractionMethod,
    sentences: &[String],
) -> Result<()> {
    fs::write(path, render_report(filename, method, sentences))
        .with_context(|| format!("failed to write sentence report {}", path.display()))
}
