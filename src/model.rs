use serde::Serialize;

/// Header line prefixes of a per-document sentence report.
pub const REPORT_FILE_PREFIX: &str = "# 文件：";
pub const REPORT_METHOD_PREFIX: &str = "# 提取方法：";
pub const REPORT_COUNT_PREFIX: &str = "# 句子数量：";

pub const REPORT_HEADER_PREFIXES: [&str; 3] =
    [REPORT_FILE_PREFIX, REPORT_METHOD_PREFIX, REPORT_COUNT_PREFIX];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    TextLayer,
    Ocr,
}

impl ExtractionMethod {
    /// Label written into report headers.
    pub fn label(self) -> &'static str {
        match self {
            Self::TextLayer => "pdftotext",
            Self::Ocr => "OCR",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Written,
    Skipped,
    NoSentences,
    WriteFailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentOutcome {
    pub filename: String,
    pub sha256: Option<String>,
    pub method: Option<ExtractionMethod>,
    pub status: DocumentStatus,
    pub sentence_count: usize,
    pub output_path: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolVersions {
    pub pdftotext: Option<String>,
    pub pdftoppm: Option<String>,
    pub tesseract: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractPaths {
    pub input_dir: String,
    pub output_dir: String,
    pub manifest_path: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractCounts {
    pub pdf_count: usize,
    pub written_count: usize,
    pub text_layer_count: usize,
    pub ocr_count: usize,
    pub skipped_count: usize,
    pub sentence_total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractSettings {
    pub min_text_chars: usize,
    pub min_alpha_ratio: f64,
    pub max_char_share: f64,
    pub ocr_dpi: u32,
    pub ocr_first_page: u32,
    pub ocr_last_page: u32,
    pub ocr_lang: String,
    pub min_sentence_chars: usize,
    pub max_sentence_chars: usize,
    pub cleanup_rules: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub tool_versions: ToolVersions,
    pub paths: ExtractPaths,
    pub settings: ExtractSettings,
    pub counts: ExtractCounts,
    pub documents: Vec<DocumentOutcome>,
    pub warnings: Vec<String>,
}
