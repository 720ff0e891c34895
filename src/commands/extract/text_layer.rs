use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};

/// Reads the embedded text layer with `pdftotext` and returns one string per
/// page, trailing blank pages removed.
pub(crate) fn extract_text_layer_pages(pdf_path: &Path) -> Result<Vec<String>> {
    let output = Command::new("pdftotext")
        .arg("-enc")
        .arg("UTF-8")
        .arg(pdf_path)
        .arg("-")
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    let mut pages: Vec<String> = raw
        .split('\u{000C}')
        .map(|chunk| chunk.replace('\u{0000}', ""))
        .collect();

    while pages.last().is_some_and(|page| page.trim().is_empty()) {
        pages.pop();
    }

    Ok(pages)
}

/// Concatenates non-blank pages behind `--- Page N ---` markers, numbering
/// pages by their position in the document.
pub(crate) fn join_text_layer_pages(pages: &[String]) -> String {
    let mut text = String::new();
    for (index, page) in pages.iter().enumerate() {
        if page.trim().is_empty() {
            continue;
        }
        text.push_str(&format!("\n--- Page {} ---\n", index + 1));
        text.push_str(page);
    }
    text.trim().to_string()
}
