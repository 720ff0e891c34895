use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::config::OcrSettings;
use crate::util::discover_files;

pub(crate) fn command_available(program: &str) -> bool {
    Command::new(program).arg("--version").output().is_ok()
}

/// Rasterizes the configured page range and runs tesseract over each page in
/// order. A page that fails OCR is skipped; a rasterization failure is an
/// error for the whole document.
pub(crate) fn ocr_pdf(pdf_path: &Path, settings: &OcrSettings) -> Result<String> {
    if !command_available("pdftoppm") || !command_available("tesseract") {
        bail!("OCR requested for {} but pdftoppm/tesseract are unavailable", pdf_path.display());
    }

    let scratch = tempfile::Builder::new()
        .prefix("alpine_corpus_ocr_")
        .tempdir()
        .context("failed to create OCR scratch directory")?;

    info!(
        pdf = %pdf_path.display(),
        dpi = settings.dpi,
        first_page = settings.first_page,
        last_page = settings.last_page,
        "rasterizing pages for OCR"
    );
    let images = rasterize_pages(pdf_path, settings, scratch.path())?;
    if images.is_empty() {
        bail!("pdftoppm produced no page images for {}", pdf_path.display());
    }

    let mut pages = Vec::with_capacity(images.len());
    for (index, image) in images.iter().enumerate() {
        let page_number = settings.first_page as usize + index;
        info!(page = page_number, "running OCR");
        match recognize_page(image, settings) {
            Ok(text) => pages.push(text),
            Err(error) => {
                warn!(
                    pdf = %pdf_path.display(),
                    page = page_number,
                    error = %error,
                    "OCR failed for page"
                );
                pages.push(String::new());
            }
        }
    }

    Ok(join_ocr_pages(&pages, settings.first_page as usize))
}

fn rasterize_pages(pdf_path: &Path, settings: &OcrSettings, scratch: &Path) -> Result<Vec<PathBuf>> {
    let output = Command::new("pdftoppm")
        .arg("-r")
        .arg(settings.dpi.to_string())
        .arg("-f")
        .arg(settings.first_page.to_string())
        .arg("-l")
        .arg(settings.last_page.to_string())
        .arg("-png")
        .arg(pdf_path)
        .arg(scratch.join("page"))
        .output()
        .with_context(|| format!("failed to execute pdftoppm for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftoppm returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    discover_files(scratch, "png")
}

fn recognize_page(image_path: &Path, settings: &OcrSettings) -> Result<String> {
    let output = Command::new("tesseract")
        .arg(image_path)
        .arg("stdout")
        .arg("-l")
        .arg(&settings.lang)
        .arg("--oem")
        .arg("3")
        .arg("--psm")
        .arg("6")
        .arg("-c")
        .arg(format!("tessedit_char_whitelist={}", settings.whitelist))
        .output()
        .with_context(|| format!("failed to execute tesseract for {}", image_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "tesseract returned non-zero exit status for {}: {}",
            image_path.display(),
            stderr.trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).replace('\u{0000}', ""))
}

/// Same page-marker layout as the text layer, with a trailing newline after
/// each OCR page.
pub(crate) fn join_ocr_pages(pages: &[String], first_page: usize) -> String {
    let mut text = String::new();
    for (index, page) in pages.iter().enumerate() {
        if page.trim().is_empty() {
            continue;
        }
        text.push_str(&format!("\n--- Page {} ---\n", first_page + index));
        text.push_str(page);
        text.push('\n');
    }
    text.trim().to_string()
}
