use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "alpine-corpus",
    version,
    about = "Sentence extraction and entity annotation tooling for scanned journal archives"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract, clean and segment sentences from every PDF in a directory.
    Extract(ExtractArgs),
    /// Merge token XML and NER XML pairs into one annotated text report.
    MergeEntities(CorpusArgs),
    /// Link entities to sentences and write a per-year annotated report.
    LinkYearly(CorpusArgs),
    /// Convert line-delimited JSON annotation exports to XML.
    Convert(ConvertArgs),
    /// Concatenate sentence reports from several folders into one file.
    MergeReports(MergeReportsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Defaults to `<input-dir>/smart_extracted_sentences`.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = 50)]
    pub min_text_chars: usize,

    #[arg(long, default_value_t = 0.5)]
    pub min_alpha_ratio: f64,

    #[arg(long, default_value_t = 0.3)]
    pub max_char_share: f64,

    #[arg(long, default_value_t = 300)]
    pub ocr_dpi: u32,

    #[arg(long, default_value_t = 1)]
    pub ocr_first_page: u32,

    #[arg(long, default_value_t = 3)]
    pub ocr_last_page: u32,

    #[arg(long, default_value = "eng")]
    pub ocr_lang: String,

    #[arg(
        long,
        default_value = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789.,!?;:()[]\"'- "
    )]
    pub ocr_whitelist: String,

    #[arg(long, default_value_t = 10)]
    pub min_sentence_chars: usize,

    #[arg(long, default_value_t = 1000)]
    pub max_sentence_chars: usize,

    #[arg(long = "disable-rule", value_enum)]
    pub disabled_rules: Vec<CleanupRule>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, ValueEnum)]
pub enum CleanupRule {
    RejoinWrappedHyphens,
    JoinSplitNames,
    JoinLowercaseHyphens,
    CollapseSpacedLetters,
    CollapseWhitespace,
    StripDisallowed,
    DropShortLines,
}

impl CleanupRule {
    pub const ALL: [CleanupRule; 7] = [
        Self::RejoinWrappedHyphens,
        Self::JoinSplitNames,
        Self::JoinLowercaseHyphens,
        Self::CollapseSpacedLetters,
        Self::CollapseWhitespace,
        Self::StripDisallowed,
        Self::DropShortLines,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RejoinWrappedHyphens => "rejoin-wrapped-hyphens",
            Self::JoinSplitNames => "join-split-names",
            Self::JoinLowercaseHyphens => "join-lowercase-hyphens",
            Self::CollapseSpacedLetters => "collapse-spaced-letters",
            Self::CollapseWhitespace => "collapse-whitespace",
            Self::StripDisallowed => "strip-disallowed",
            Self::DropShortLines => "drop-short-lines",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CorpusArgs {
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Defaults to a report file inside the input directory.
    #[arg(long)]
    pub output_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    #[arg(long)]
    pub input_dir: PathBuf,

    /// File names inside the input directory; every `*.jsonl` file when omitted.
    #[arg(long = "file")]
    pub files: Vec<String>,

    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum MergeMode {
    /// Folder and file headings between sections.
    Titled,
    /// Content only.
    Flat,
}

impl MergeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Titled => "titled",
            Self::Flat => "flat",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct MergeReportsArgs {
    #[arg(long = "folder", required = true)]
    pub folders: Vec<PathBuf>,

    #[arg(long)]
    pub output_path: PathBuf,

    /// Prompts interactively when omitted.
    #[arg(long, value_enum)]
    pub mode: Option<MergeMode>,

    #[arg(long, default_value_t = false)]
    pub keep_headers: bool,
}
